//! Variable replacement pairs, used by `replace`, `compose` and `veccompose`.
//!
//! Mirrors BuDDy's `bddPair`: a map from source variable to a substitute BDD (a
//! single literal for `replace`, an arbitrary BDD for `compose`/`veccompose`),
//! carrying an identity used to qualify operation-cache keys so unrelated pair
//! tables never collide, and the highest level any entry touches so recursion can
//! stop early once it walks below every substituted variable.

use crate::types::{NodeId, VariableId};
use std::collections::HashMap;

static NEXT_PAIR_ID: std::sync::atomic::AtomicU64 = std::sync::atomic::AtomicU64::new(1);

#[derive(Debug, Clone)]
pub struct PairTable {
    id: u64,
    /// `result[level]` is the replacement BDD for the variable at that level, or
    /// `NodeId::UNDEFINED` if that level is not substituted.
    result: Vec<NodeId>,
    /// Highest level touched by any entry; recursion may stop descending past it.
    pub last_level: u16,
}

impl PairTable {
    pub fn new(level_count: usize) -> PairTable {
        let id = NEXT_PAIR_ID.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        PairTable {
            id,
            result: vec![NodeId::UNDEFINED; level_count],
            last_level: 0,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn set(&mut self, level: u16, replacement: NodeId) {
        if (level as usize) >= self.result.len() {
            self.result.resize(level as usize + 1, NodeId::UNDEFINED);
        }
        self.result[level as usize] = replacement;
        self.last_level = self.last_level.max(level + 1);
    }

    pub fn get(&self, level: u16) -> NodeId {
        self.result
            .get(level as usize)
            .copied()
            .unwrap_or(NodeId::UNDEFINED)
    }

    pub fn is_identity_at(&self, level: u16) -> bool {
        self.get(level).is_undefined()
    }
}

/// Convenience builder used by `Manager::make_pair`/`make_pair_map`: a sparse
/// `var -> replacement` map before it is compiled down to a level-indexed table.
#[derive(Debug, Clone, Default)]
pub struct PairSpec {
    pub entries: HashMap<VariableId, NodeId>,
}

impl PairSpec {
    pub fn new() -> PairSpec {
        PairSpec::default()
    }

    pub fn insert(&mut self, var: VariableId, replacement: NodeId) {
        self.entries.insert(var, replacement);
    }
}
