//! Variable replacement (renaming), grounded on `bddop.c`'s `bdd_replace`,
//! `replace_rec` and `bdd_correctify`.

use crate::cache::CacheValue;
use crate::error::{Error, Result};
use crate::manager::Manager;
use crate::reorder::{self, ReorderRequested};
use crate::types::{Level, NodeId, VariableId};

const REPLACE_TAG: i64 = 2000;

/// A variable-to-variable rename table, compiled from `(from, to)` pairs.
pub struct ReplacePairs {
    id: u64,
    to_level: Vec<Option<Level>>,
    pub(crate) last_level: Level,
}

static NEXT_ID: std::sync::atomic::AtomicU64 = std::sync::atomic::AtomicU64::new(1);

impl ReplacePairs {
    pub fn new(manager: &Manager, pairs: &[(VariableId, VariableId)]) -> Result<ReplacePairs> {
        let mut to_level = vec![None; manager.varnum()];
        let mut last_level: Level = 0;
        for &(from, to) in pairs {
            let from_level = manager.level_of(from)?;
            let to_level_value = manager.level_of(to)?;
            if (from_level as usize) >= to_level.len() {
                to_level.resize(from_level as usize + 1, None);
            }
            to_level[from_level as usize] = Some(to_level_value);
            last_level = last_level.max(from_level + 1);
        }
        let id = NEXT_ID.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        Ok(ReplacePairs { id, to_level, last_level })
    }

    fn get(&self, level: Level) -> Option<Level> {
        self.to_level.get(level as usize).copied().flatten()
    }
}

/// Replaces every variable named in `pairs` with its paired variable throughout `f`.
pub fn replace(manager: &mut Manager, f: NodeId, pairs: &ReplacePairs) -> Result<NodeId> {
    manager.check_poisoned()?;
    manager.node(f)?;
    let id_tag = REPLACE_TAG ^ (pairs.id as i64);
    let mut illegal = false;
    let result = reorder::with_retry(manager, |m| match replace_rec(m, f, pairs, id_tag) {
        Ok(r) => Ok(r),
        Err(Fault::Reorder) => Err(ReorderRequested),
        Err(Fault::Illegal) => {
            illegal = true;
            Ok(NodeId::FALSE)
        }
    });
    if illegal {
        return Err(Error::Replace);
    }
    Ok(result)
}

enum Fault {
    Reorder,
    Illegal,
}

impl From<ReorderRequested> for Fault {
    fn from(_: ReorderRequested) -> Self {
        Fault::Reorder
    }
}

fn replace_rec(manager: &mut Manager, f: NodeId, pairs: &ReplacePairs, tag: i64) -> std::result::Result<NodeId, Fault> {
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
        return Err(Fault::Reorder);
    }

    let (_, low, high) = manager.unpack(f);
    let low_res = replace_rec(manager, low, pairs, tag)?;
    let _guard = manager.refstack.scoped(low_res);
    let high_res = replace_rec(manager, high, pairs, tag)?;

    let target_level = pairs.get(level).unwrap_or(level);
    let result = correctify(manager, target_level, low_res, high_res)?;
    manager.caches.replace.insert(f, NodeId::UNDEFINED, tag, CacheValue::Node(result));
    Ok(result)
}

/// Rebuilds a node at `level` out of `(c1, c2)`, recursing past any levels that
/// substitution pushed the two children below, and erroring if `level` would
/// collide with a variable that already occurs in `c1`/`c2` — an illegal
/// substitution (the replaced variable order is no longer consistent).
fn correctify(manager: &mut Manager, level: Level, c1: NodeId, c2: NodeId) -> std::result::Result<NodeId, Fault> {
    let l1 = manager.level(c1);
    let l2 = manager.level(c2);
    if l1 > level && l2 > level {
        return Ok(manager.make_node(level, c1, c2));
    }
    if l1 == level || l2 == level {
        return Err(Fault::Illegal);
    }
    let deeper = l1.min(l2);
    let (c1_low, c1_high) = crate::ops::apply::cofactor(manager, c1, deeper, l1);
    let (c2_low, c2_high) = crate::ops::apply::cofactor(manager, c2, deeper, l2);
    let low_res = correctify(manager, level, c1_low, c2_low)?;
    let _guard = manager.refstack.scoped(low_res);
    let high_res = correctify(manager, level, c1_high, c2_high)?;
    Ok(manager.make_node(deeper, low_res, high_res))
}
