//! `restrict` (fix a set of variables to constant values) and `constrain`
//! (generalized cofactor), grounded on `bddop.c`'s `bdd_restrict`/`restrict_rec`
//! and `bdd_constrain`/`constrain_rec`.

use crate::cache::CacheValue;
use crate::error::Result;
use crate::manager::Manager;
use crate::ops::apply::cofactor;
use crate::reorder::{self, RecResult, ReorderRequested};
use crate::types::NodeId;
use crate::varset::{scan_cube, LiteralTable};

const RESTRICT_TAG: i64 = 1000;
const CONSTRAIN_TAG: i64 = 1001;

/// Fixes every variable in `var_cube` to the polarity its literal has there, and
/// leaves every other variable free.
pub fn restrict(manager: &mut Manager, f: NodeId, var_cube: NodeId) -> Result<NodeId> {
    manager.check_poisoned()?;
    manager.node(f)?;
    manager.node(var_cube)?;
    let table = scan_cube(manager, var_cube)?;
    Ok(reorder::with_retry(manager, |m| restrict_rec(m, f, var_cube, &table)))
}

fn restrict_rec(manager: &mut Manager, f: NodeId, cube: NodeId, table: &LiteralTable) -> RecResult<NodeId> {
    if f.is_terminal() {
        return Ok(f);
    }
    let level = manager.level(f);
    if level >= table.last_level {
        return Ok(f);
    }
    if let Some(CacheValue::Node(cached)) = manager.caches.misc.get(f, cube, RESTRICT_TAG) {
        manager.cache_stats.misc.record(true);
        return Ok(cached);
    }
    manager.cache_stats.misc.record(false);
    if manager.reorder_driver_mut().wants_interrupt() {
        return Err(ReorderRequested);
    }

    let (_, low, high) = manager.unpack(f);
    let result = match table.value[level as usize] {
        Some(true) => restrict_rec(manager, high, cube, table)?,
        Some(false) => restrict_rec(manager, low, cube, table)?,
        None => {
            let low_res = restrict_rec(manager, low, cube, table)?;
            let _guard = manager.refstack.scoped(low_res);
            let high_res = restrict_rec(manager, high, cube, table)?;
            manager.make_node(level, low_res, high_res)
        }
    };
    manager.caches.misc.insert(f, cube, RESTRICT_TAG, CacheValue::Node(result));
    Ok(result)
}

/// Generalized cofactor of `f` with respect to the constraint `c`: keeps `f`'s
/// behavior wherever `c` holds and is free to simplify elsewhere.
pub fn constrain(manager: &mut Manager, f: NodeId, c: NodeId) -> Result<NodeId> {
    manager.check_poisoned()?;
    manager.node(f)?;
    manager.node(c)?;
    Ok(reorder::with_retry(manager, |m| constrain_rec(m, f, c)))
}

fn constrain_rec(manager: &mut Manager, f: NodeId, c: NodeId) -> RecResult<NodeId> {
    if c.is_true() || f.is_terminal() {
        return Ok(f);
    }
    if c.is_false() {
        return Ok(NodeId::FALSE);
    }
    if let Some(CacheValue::Node(cached)) = manager.caches.misc.get(f, c, CONSTRAIN_TAG) {
        manager.cache_stats.misc.record(true);
        return Ok(cached);
    }
    manager.cache_stats.misc.record(false);
    if manager.reorder_driver_mut().wants_interrupt() {
        return Err(ReorderRequested);
    }

    let lf = manager.level(f);
    let lc = manager.level(c);
    let level = lf.min(lc);
    let (f_low, f_high) = cofactor(manager, f, level, lf);
    let (c_low, c_high) = cofactor(manager, c, level, lc);

    let result = if c_low.is_false() {
        constrain_rec(manager, f_high, c_high)?
    } else if c_high.is_false() {
        constrain_rec(manager, f_low, c_low)?
    } else {
        let low_res = constrain_rec(manager, f_low, c_low)?;
        let _guard = manager.refstack.scoped(low_res);
        let high_res = constrain_rec(manager, f_high, c_high)?;
        manager.make_node(level, low_res, high_res)
    };
    manager.caches.misc.insert(f, c, CONSTRAIN_TAG, CacheValue::Node(result));
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::apply::{apply, Operator};
    use crate::types::VariableId;
    use crate::varset::make_set;

    #[test]
    fn restrict_fixes_variable_to_literal_polarity() {
        let mut m = Manager::new();
        m.set_varnum(2).unwrap();
        let v0 = m.ithvar(VariableId::from(0usize)).unwrap();
        let v1 = m.ithvar(VariableId::from(1usize)).unwrap();
        let and01 = apply(&mut m, Operator::And, v0, v1).unwrap();
        let cube = make_set(&mut m, &[VariableId::from(0usize)]).unwrap();
        let result = restrict(&mut m, and01, cube).unwrap();
        assert_eq!(result, v1);
    }

    #[test]
    fn constrain_by_true_is_identity() {
        let mut m = Manager::new();
        m.set_varnum(1).unwrap();
        let v0 = m.ithvar(VariableId::from(0usize)).unwrap();
        assert_eq!(constrain(&mut m, v0, NodeId::TRUE).unwrap(), v0);
    }

    #[test]
    fn constrain_by_false_is_false() {
        let mut m = Manager::new();
        m.set_varnum(1).unwrap();
        let v0 = m.ithvar(VariableId::from(0usize)).unwrap();
        assert_eq!(constrain(&mut m, v0, NodeId::FALSE).unwrap(), NodeId::FALSE);
    }
}
