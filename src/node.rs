//! The arena node record.
//!
//! Mirrors BuDDy's `BddNode` (`kernel.c`): the node array doubles as the unique
//! table's hash table. `hash` is the head of the collision chain for the bucket
//! whose index equals this slot's own position; `next` threads that chain, and is
//! repurposed to thread the free list once a slot is dead (`low == NodeId::UNDEFINED`
//! marks "free", matching BuDDy's `low == -1` sentinel).

use crate::types::{NodeId, VariableId, TERMINAL_LEVEL};

pub const MAX_REF: u32 = (1 << 22) - 1;

#[derive(Copy, Clone, Debug)]
pub struct Node {
    pub low: NodeId,
    pub high: NodeId,
    pub var: VariableId,
    pub level: u16,
    /// Saturating external reference count (BuDDy caps this at `MAXREF`).
    pub refcount: u32,
    /// Head of the hash bucket whose index is this slot's own position.
    pub hash: NodeId,
    /// Collision-chain thread while live; free-list thread while dead.
    pub next: NodeId,
    pub mark: bool,
}

impl Node {
    /// The two terminal nodes are created once, at fixed slots 0 and 1, and are
    /// never collected: both hold an artificial permanent reference.
    pub fn terminal(value: bool) -> Node {
        Node {
            low: if value { NodeId::TRUE } else { NodeId::FALSE },
            high: if value { NodeId::TRUE } else { NodeId::FALSE },
            var: VariableId::UNDEFINED,
            level: TERMINAL_LEVEL,
            refcount: 1,
            hash: NodeId::UNDEFINED,
            next: NodeId::UNDEFINED,
            mark: false,
        }
    }

    pub fn free(next: NodeId) -> Node {
        Node {
            low: NodeId::UNDEFINED,
            high: NodeId::UNDEFINED,
            var: VariableId::UNDEFINED,
            level: TERMINAL_LEVEL,
            refcount: 0,
            hash: NodeId::UNDEFINED,
            next,
            mark: false,
        }
    }

    #[inline]
    pub fn is_free(&self) -> bool {
        self.low.is_undefined()
    }

    #[inline]
    pub fn is_terminal(&self) -> bool {
        self.level == TERMINAL_LEVEL && !self.is_free()
    }
}
