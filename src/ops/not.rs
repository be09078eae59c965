use crate::cache::CacheValue;
use crate::error::Result;
use crate::manager::Manager;
use crate::reorder::{self, RecResult, ReorderRequested};
use crate::types::NodeId;

const NOT_TAG: i64 = -1;

/// Negates `a`. Grounded on `bddop.c`'s `bdd_not`/`not_rec`.
pub fn not(manager: &mut Manager, a: NodeId) -> Result<NodeId> {
    manager.check_poisoned()?;
    manager.node(a)?;
    Ok(reorder::with_retry(manager, |m| not_rec(m, a)))
}

pub(crate) fn not_rec(manager: &mut Manager, a: NodeId) -> RecResult<NodeId> {
    if a.is_false() {
        return Ok(NodeId::TRUE);
    }
    if a.is_true() {
        return Ok(NodeId::FALSE);
    }
    if manager.reorder_driver_mut().wants_interrupt() {
        return Err(ReorderRequested);
    }
    if let Some(CacheValue::Node(cached)) = manager.caches.misc.get(a, NodeId::UNDEFINED, NOT_TAG) {
        manager.cache_stats.misc.record(true);
        return Ok(cached);
    }
    manager.cache_stats.misc.record(false);

    let (level, low, high) = manager.unpack(a);
    let low_res = not_rec(manager, low)?;
    let _guard = manager.refstack.scoped(low_res);
    let high_res = not_rec(manager, high)?;
    let result = manager.make_node(level, low_res, high_res);
    manager.caches.misc.insert(a, NodeId::UNDEFINED, NOT_TAG, CacheValue::Node(result));
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::VariableId;

    #[test]
    fn not_terminal() {
        let mut m = Manager::new();
        assert_eq!(not(&mut m, NodeId::TRUE).unwrap(), NodeId::FALSE);
        assert_eq!(not(&mut m, NodeId::FALSE).unwrap(), NodeId::TRUE);
    }

    #[test]
    fn not_is_involutive() {
        let mut m = Manager::new();
        m.set_varnum(1).unwrap();
        let v0 = m.ithvar(VariableId::from(0usize)).unwrap();
        let notted = not(&mut m, v0).unwrap();
        let back = not(&mut m, notted).unwrap();
        assert_eq!(back, v0);
        assert_ne!(notted, v0);
    }
}
