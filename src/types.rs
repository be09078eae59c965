//! Newtype identifiers used throughout the engine.
//!
//! These mirror the teacher's `NodeId`/`VariableId` pattern: small `Copy` wrappers
//! around an integer with a reserved `UNDEFINED` sentinel, rather than raw indices
//! passed around as bare `usize`/`u32`.

use std::convert::TryFrom;

/// Index of a node inside the manager's arena.
///
/// `0` and `1` are reserved for the `FALSE`/`TRUE` terminals and are always present
/// at those positions. `NodeId::UNDEFINED` marks "no node" (e.g. an empty free list,
/// or a not-yet-computed cache slot).
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Ord, PartialOrd)]
pub struct NodeId(u32);

impl NodeId {
    pub const FALSE: NodeId = NodeId(0);
    pub const TRUE: NodeId = NodeId(1);
    pub const UNDEFINED: NodeId = NodeId(u32::MAX);

    #[inline]
    pub(crate) const fn new(index: u32) -> NodeId {
        NodeId(index)
    }

    #[inline]
    pub fn is_terminal(self) -> bool {
        self == Self::FALSE || self == Self::TRUE
    }

    #[inline]
    pub fn is_false(self) -> bool {
        self == Self::FALSE
    }

    #[inline]
    pub fn is_true(self) -> bool {
        self == Self::TRUE
    }

    #[inline]
    pub fn is_undefined(self) -> bool {
        self == Self::UNDEFINED
    }

    #[inline]
    pub(crate) fn index(self) -> usize {
        debug_assert!(!self.is_undefined());
        self.0 as usize
    }
}

impl From<NodeId> for u32 {
    fn from(value: NodeId) -> Self {
        value.0
    }
}

/// A propositional variable identity, stable across the lifetime of a [`crate::Manager`]
/// (unlike a *level*, which may change if variable reordering is ever performed).
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Ord, PartialOrd)]
pub struct VariableId(u16);

impl VariableId {
    pub const UNDEFINED: VariableId = VariableId(u16::MAX);

    #[inline]
    pub const fn new(index: u16) -> VariableId {
        VariableId(index)
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub fn is_undefined(self) -> bool {
        self == Self::UNDEFINED
    }
}

impl From<usize> for VariableId {
    fn from(value: usize) -> Self {
        debug_assert!(u16::try_from(value).is_ok());
        VariableId(value as u16)
    }
}

impl From<VariableId> for usize {
    fn from(value: VariableId) -> Self {
        value.index()
    }
}

/// A position in the variable order. The *level* a node sits at is what determines
/// the reduction/ordering invariants; the *variable* is just a stable name for it.
pub type Level = u16;

/// `NONTERMINAL_LEVEL` is the level assigned to both terminal nodes: strictly greater
/// than any real variable's level, so `ite` cofactoring always treats a terminal as
/// "below" every internal node.
pub const TERMINAL_LEVEL: Level = Level::MAX;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_id_terminals() {
        assert!(NodeId::FALSE.is_terminal());
        assert!(NodeId::TRUE.is_terminal());
        assert!(!NodeId::new(2).is_terminal());
        assert!(NodeId::UNDEFINED.is_undefined());
    }

    #[test]
    fn variable_id_roundtrip() {
        let v = VariableId::from(41usize);
        assert_eq!(usize::from(v), 41);
        assert!(!v.is_undefined());
        assert!(VariableId::UNDEFINED.is_undefined());
    }
}
