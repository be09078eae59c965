//! `simplify`: remove structure from `f` that is irrelevant everywhere the care
//! set `d` is false, cheaper than `constrain` at the cost of a weaker guarantee.
//! Grounded on `bddop.c`'s `bdd_simplify`/`simplify_rec`.

use crate::cache::CacheValue;
use crate::error::Result;
use crate::manager::Manager;
use crate::reorder::{self, RecResult, ReorderRequested};
use crate::types::NodeId;

const SIMPLIFY_TAG: i64 = 4000;

pub fn simplify(manager: &mut Manager, f: NodeId, d: NodeId) -> Result<NodeId> {
    manager.check_poisoned()?;
    manager.node(f)?;
    manager.node(d)?;
    Ok(reorder::with_retry(manager, |m| simplify_rec(m, f, d)))
}

fn simplify_rec(manager: &mut Manager, f: NodeId, d: NodeId) -> RecResult<NodeId> {
    if f.is_terminal() || d.is_true() {
        return Ok(f);
    }
    if d.is_false() {
        return Ok(NodeId::FALSE);
    }
    if let Some(CacheValue::Node(cached)) = manager.caches.misc.get(f, d, SIMPLIFY_TAG) {
        manager.cache_stats.misc.record(true);
        return Ok(cached);
    }
    manager.cache_stats.misc.record(false);
    if manager.reorder_driver_mut().wants_interrupt() {
        return Err(ReorderRequested);
    }

    let lf = manager.level(f);
    let ld = manager.level(d);
    let result = if lf == ld {
        let (_, f_low, f_high) = manager.unpack(f);
        let (_, d_low, d_high) = manager.unpack(d);
        if d_low.is_false() {
            simplify_rec(manager, f_high, d_high)?
        } else if d_high.is_false() {
            simplify_rec(manager, f_low, d_low)?
        } else {
            let low_res = simplify_rec(manager, f_low, d_low)?;
            let _guard = manager.refstack.scoped(low_res);
            let high_res = simplify_rec(manager, f_high, d_high)?;
            manager.make_node(lf, low_res, high_res)
        }
    } else if lf < ld {
        let (_, f_low, f_high) = manager.unpack(f);
        let low_res = simplify_rec(manager, f_low, d)?;
        let _guard = manager.refstack.scoped(low_res);
        let high_res = simplify_rec(manager, f_high, d)?;
        manager.make_node(lf, low_res, high_res)
    } else {
        let (_, d_low, d_high) = manager.unpack(d);
        if d_low.is_false() {
            simplify_rec(manager, f, d_high)?
        } else if d_high.is_false() {
            simplify_rec(manager, f, d_low)?
        } else {
            let low_res = simplify_rec(manager, f, d_low)?;
            let _guard = manager.refstack.scoped(low_res);
            let high_res = simplify_rec(manager, f, d_high)?;
            manager.make_node(ld, low_res, high_res)
        }
    };
    manager.caches.misc.insert(f, d, SIMPLIFY_TAG, CacheValue::Node(result));
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::VariableId;

    #[test]
    fn simplify_by_true_is_identity() {
        let mut m = Manager::new();
        m.set_varnum(1).unwrap();
        let v0 = m.ithvar(VariableId::from(0usize)).unwrap();
        assert_eq!(simplify(&mut m, v0, NodeId::TRUE).unwrap(), v0);
    }

    #[test]
    fn simplify_by_false_is_false() {
        let mut m = Manager::new();
        m.set_varnum(1).unwrap();
        let v0 = m.ithvar(VariableId::from(0usize)).unwrap();
        assert_eq!(simplify(&mut m, v0, NodeId::FALSE).unwrap(), NodeId::FALSE);
    }
}
