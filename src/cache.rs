//! Fixed-purpose, direct-mapped operation caches.
//!
//! Each of the six caches (apply/simplify, ite, quant, appex/appall/appuni,
//! replace/compose/veccompose, misc) is a leaky cache: a fixed-size table where a
//! collision simply overwrites the existing entry rather than chaining, the same
//! trade-off BuDDy's `BddCache` makes. Keys are 3-wide (`a`, `b`, `c`) so the same
//! cache can serve different operators by placing an operator/id tag in `c`. Hashing
//! reuses the teacher's `fxhash` dependency instead of `SipHash`.

use crate::types::NodeId;
use fxhash::hash64;

/// Either a node-handle result (apply, ite, replace, ...) or a floating point result
/// (satcountln), mirroring BuDDy's tagged `BddCacheData` union.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum CacheValue {
    Node(NodeId),
    Double(f64),
}

#[derive(Copy, Clone, Debug)]
struct Entry {
    a: NodeId,
    b: NodeId,
    c: i64,
    value: CacheValue,
    occupied: bool,
}

impl Entry {
    fn empty() -> Entry {
        Entry {
            a: NodeId::UNDEFINED,
            b: NodeId::UNDEFINED,
            c: 0,
            value: CacheValue::Node(NodeId::UNDEFINED),
            occupied: false,
        }
    }
}

/// A single direct-mapped cache keyed by `(a, b, c)`.
pub struct OpCache {
    slots: Vec<Entry>,
}

impl OpCache {
    pub fn with_size(size: usize) -> OpCache {
        let size = size.max(1);
        OpCache {
            slots: vec![Entry::empty(); size],
        }
    }

    fn slot(&self, a: NodeId, b: NodeId, c: i64) -> usize {
        let h = hash64(&(u32::from(a), u32::from(b), c));
        (h as usize) % self.slots.len()
    }

    pub fn get(&self, a: NodeId, b: NodeId, c: i64) -> Option<CacheValue> {
        let slot = &self.slots[self.slot(a, b, c)];
        if slot.occupied && slot.a == a && slot.b == b && slot.c == c {
            Some(slot.value)
        } else {
            None
        }
    }

    pub fn insert(&mut self, a: NodeId, b: NodeId, c: i64, value: CacheValue) {
        let idx = self.slot(a, b, c);
        self.slots[idx] = Entry {
            a,
            b,
            c,
            value,
            occupied: true,
        };
    }

    /// Discard every entry. Called unconditionally after every GC, since entries
    /// reference node identities that the sweep may have just reassigned.
    pub fn clear(&mut self) {
        for slot in &mut self.slots {
            slot.occupied = false;
        }
    }

    pub fn resize(&mut self, size: usize) {
        self.slots = vec![Entry::empty(); size.max(1)];
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }
}

/// The six fixed-purpose caches, one group per operator family, as in `bddop.c`.
pub struct Caches {
    pub apply: OpCache,
    pub ite: OpCache,
    pub quant: OpCache,
    pub appquant: OpCache,
    pub replace: OpCache,
    pub misc: OpCache,
}

impl Caches {
    pub fn with_size(size: usize) -> Caches {
        Caches {
            apply: OpCache::with_size(size),
            ite: OpCache::with_size(size),
            quant: OpCache::with_size(size),
            appquant: OpCache::with_size(size),
            replace: OpCache::with_size(size),
            misc: OpCache::with_size(size),
        }
    }

    pub fn clear_all(&mut self) {
        self.apply.clear();
        self.ite.clear();
        self.quant.clear();
        self.appquant.clear();
        self.replace.clear();
        self.misc.clear();
    }

    pub fn resize_all(&mut self, size: usize) {
        self.apply.resize(size);
        self.ite.resize(size);
        self.quant.resize(size);
        self.appquant.resize(size);
        self.replace.resize(size);
        self.misc.resize(size);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_get_roundtrip() {
        let mut cache = OpCache::with_size(16);
        let a = NodeId::new(3);
        let b = NodeId::new(4);
        cache.insert(a, b, 7, CacheValue::Node(NodeId::new(9)));
        assert_eq!(cache.get(a, b, 7), Some(CacheValue::Node(NodeId::new(9))));
        assert_eq!(cache.get(a, b, 8), None);
    }

    #[test]
    fn clear_empties_all_slots() {
        let mut cache = OpCache::with_size(4);
        cache.insert(NodeId::new(1), NodeId::new(2), 0, CacheValue::Node(NodeId::TRUE));
        cache.clear();
        assert_eq!(cache.get(NodeId::new(1), NodeId::new(2), 0), None);
    }
}
