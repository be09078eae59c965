//! `compose` (substitute one variable with an arbitrary BDD) and `veccompose`
//! (substitute many at once), grounded on `bddop.c`'s `bdd_compose`/`compose_rec`
//! and `bdd_veccompose`/`veccompose_rec`.

use crate::cache::CacheValue;
use crate::error::Result;
use crate::manager::Manager;
use crate::ops::apply::{cofactor, ite_rec};
use crate::pairs::PairTable;
use crate::reorder::{self, RecResult, ReorderRequested};
use crate::types::{Level, NodeId, VariableId};

const COMPOSE_TAG: i64 = 3000;
const VECCOMPOSE_TAG: i64 = 3001;

/// Substitutes `var` with `g` throughout `f`: `f[var := g]`.
pub fn compose(manager: &mut Manager, f: NodeId, var: VariableId, g: NodeId) -> Result<NodeId> {
    manager.check_poisoned()?;
    manager.node(f)?;
    manager.node(g)?;
    let level = manager.level_of(var)?;
    Ok(reorder::with_retry(manager, |m| compose_rec(m, f, level, g)))
}

fn compose_rec(manager: &mut Manager, f: NodeId, var_level: Level, g: NodeId) -> RecResult<NodeId> {
    let level_f = manager.level(f);
    if level_f > var_level {
        return Ok(f);
    }
    if let Some(CacheValue::Node(cached)) = manager.caches.replace.get(f, g, COMPOSE_TAG ^ var_level as i64) {
        manager.cache_stats.replace.record(true);
        return Ok(cached);
    }
    manager.cache_stats.replace.record(false);
    if manager.reorder_driver_mut().wants_interrupt() {
        return Err(ReorderRequested);
    }

    let result = if level_f < var_level {
        // `g` is not opaque here: it may sit above, at, or below `level_f`, so both
        // operands are cofactored at their shared minimum level and recombined there,
        // the same three-way split `apply_rec`/`appquant_rec` use for two diagrams
        // with independent top variables.
        let level_g = manager.level(g);
        let level = level_f.min(level_g);
        let (f_low, f_high) = cofactor(manager, f, level, level_f);
        let (g_low, g_high) = cofactor(manager, g, level, level_g);
        let low_res = compose_rec(manager, f_low, var_level, g_low)?;
        let _guard = manager.refstack.scoped(low_res);
        let high_res = compose_rec(manager, f_high, var_level, g_high)?;
        manager.make_node(level, low_res, high_res)
    } else {
        let (_, low, high) = manager.unpack(f);
        ite_rec(manager, g, high, low)?
    };
    manager
        .caches
        .replace
        .insert(f, g, COMPOSE_TAG ^ var_level as i64, CacheValue::Node(result));
    Ok(result)
}

/// Substitutes every variable that has an entry in `pairs` with its paired BDD,
/// simultaneously, in a single recursive pass.
pub fn veccompose(manager: &mut Manager, f: NodeId, pairs: &PairTable) -> Result<NodeId> {
    manager.check_poisoned()?;
    manager.node(f)?;
    let tag = VECCOMPOSE_TAG ^ (pairs.id() as i64);
    Ok(reorder::with_retry(manager, |m| veccompose_rec(m, f, pairs, tag)))
}

fn veccompose_rec(manager: &mut Manager, f: NodeId, pairs: &PairTable, tag: i64) -> RecResult<NodeId> {
    if f.is_terminal() {
        return Ok(f);
    }
    let level = manager.level(f);
    if level >= pairs.last_level {
        return Ok(f);
    }
    if let Some(CacheValue::Node(cached)) = manager.caches.replace.get(f, NodeId::UNDEFINED, tag) {
        manager.cache_stats.replace.record(true);
        return Ok(cached);
    }
    manager.cache_stats.replace.record(false);
    if manager.reorder_driver_mut().wants_interrupt() {
        return Err(ReorderRequested);
    }

    let (_, low, high) = manager.unpack(f);
    let low_res = veccompose_rec(manager, low, pairs, tag)?;
    let _guard = manager.refstack.scoped(low_res);
    let high_res = veccompose_rec(manager, high, pairs, tag)?;

    let replacement = pairs.get(level);
    let result = if replacement.is_undefined() {
        manager.make_node(level, low_res, high_res)
    } else {
        ite_rec(manager, replacement, high_res, low_res)?
    };
    manager.caches.replace.insert(f, NodeId::UNDEFINED, tag, CacheValue::Node(result));
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compose_substitutes_constant() {
        let mut m = Manager::new();
        m.set_varnum(2).unwrap();
        let v0 = m.ithvar(VariableId::from(0usize)).unwrap();
        let result = compose(&mut m, v0, VariableId::from(0usize), NodeId::TRUE).unwrap();
        assert_eq!(result, NodeId::TRUE);
    }

    #[test]
    fn veccompose_with_empty_table_is_identity() {
        let mut m = Manager::new();
        m.set_varnum(1).unwrap();
        let v0 = m.ithvar(VariableId::from(0usize)).unwrap();
        let table = PairTable::new(m.varnum());
        assert_eq!(veccompose(&mut m, v0, &table).unwrap(), v0);
    }

    #[test]
    fn compose_keeps_substituted_result_below_untouched_sibling() {
        use crate::ops::apply::{apply, Operator};

        let mut m = Manager::new();
        m.set_varnum(3).unwrap();
        let v0 = m.ithvar(VariableId::from(0usize)).unwrap();
        let v1 = m.ithvar(VariableId::from(1usize)).unwrap();
        let v2 = m.ithvar(VariableId::from(2usize)).unwrap();
        let f = apply(&mut m, Operator::And, v1, v2).unwrap();
        let result = compose(&mut m, f, VariableId::from(2usize), v0).unwrap();
        let expected = apply(&mut m, Operator::And, v0, v1).unwrap();
        assert_eq!(result, expected);
        let (_, _, high) = m.unpack(result);
        assert!(m.level(high) > m.level(result));
    }
}
