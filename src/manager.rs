//! The engine: a single caller-owned value holding the node arena, the unique
//! table, the operation caches and all configuration — the idiomatic-Rust
//! replacement for BuDDy's process-wide globals (`kernel.c`). Multiple independent
//! `Manager`s may coexist in one process; each is entirely self-contained.

use crate::cache::Caches;
use crate::config::ManagerConfig;
use crate::error::{Error, Result};
use crate::node::{Node, MAX_REF};
use crate::prime;
use crate::reorder::{NoopReorderDriver, ReorderDriver};
use crate::refs::RefStack;
use crate::stats::{CacheStats, EngineStats};
use crate::types::{Level, NodeId, VariableId, TERMINAL_LEVEL};
use fxhash::hash64;

pub struct Manager {
    pub(crate) nodes: Vec<Node>,
    pub(crate) freepos: NodeId,
    pub(crate) freenum: usize,
    pub(crate) var2level: Vec<Level>,
    pub(crate) level2var: Vec<VariableId>,
    pub(crate) refstack: RefStack,
    pub(crate) caches: Caches,
    pub(crate) cache_stats: CacheStats,
    pub(crate) config: ManagerConfig,
    pub(crate) reorder_driver: Box<dyn ReorderDriver>,
    pub(crate) produced: u64,
    pub(crate) gc_count: u64,
    pub(crate) error_latched: bool,
    pub(crate) support_epoch: u32,
    pub(crate) support_seen: Vec<u32>,
}

fn triple_hash(level: Level, low: NodeId, high: NodeId) -> u64 {
    hash64(&(level, u32::from(low), u32::from(high)))
}

impl Manager {
    pub fn new() -> Manager {
        Manager::with_config(ManagerConfig::default())
    }

    pub fn with_config(config: ManagerConfig) -> Manager {
        let size = prime::next_prime_at_least(config.node_num.max(2));
        let mut nodes = Vec::with_capacity(size);
        nodes.push(Node::terminal(false));
        nodes.push(Node::terminal(true));
        for i in 2..size {
            nodes.push(Node::free(if i + 1 < size {
                NodeId::new((i + 1) as u32)
            } else {
                NodeId::UNDEFINED
            }));
        }
        let freepos = if size > 2 {
            NodeId::new(2)
        } else {
            NodeId::UNDEFINED
        };
        let cache_size = if config.cache_ratio > 0 {
            (size / config.cache_ratio).max(1)
        } else {
            config.cache_size
        };
        let mut manager = Manager {
            nodes,
            freepos,
            freenum: size.saturating_sub(2),
            var2level: Vec::new(),
            level2var: Vec::new(),
            refstack: RefStack::new(),
            caches: Caches::with_size(cache_size),
            cache_stats: CacheStats::default(),
            config,
            reorder_driver: Box::new(NoopReorderDriver),
            produced: 0,
            gc_count: 0,
            error_latched: false,
            support_epoch: 0,
            support_seen: Vec::new(),
        };
        manager.rehash_all();
        manager
    }

    pub fn set_reorder_driver(&mut self, driver: Box<dyn ReorderDriver>) {
        self.reorder_driver = driver;
    }

    pub fn reorder_driver_mut(&mut self) -> &mut dyn ReorderDriver {
        self.reorder_driver.as_mut()
    }

    // ---- configuration / variables ------------------------------------------------

    /// Sets the number of variables, level order identical to variable order
    /// (this crate implements no reordering, so `var2level`/`level2var` stay the
    /// identity map for the lifetime of the manager).
    pub fn set_varnum(&mut self, n: usize) -> Result<()> {
        if n == 0 || n > (VariableId::UNDEFINED.index()) {
            return Err(Error::Range);
        }
        if n < self.var2level.len() {
            return Err(Error::DecreaseVarNum);
        }
        self.extend_varnum(n - self.var2level.len())
    }

    pub fn extend_varnum(&mut self, extra: usize) -> Result<()> {
        let old = self.var2level.len();
        let new_total = old + extra;
        if new_total > VariableId::UNDEFINED.index() {
            return Err(Error::Range);
        }
        self.var2level.reserve(extra);
        self.level2var.reserve(extra);
        for i in old..new_total {
            self.var2level.push(i as Level);
            self.level2var.push(VariableId::from(i));
        }
        self.support_seen.resize(new_total, 0);
        Ok(())
    }

    pub fn varnum(&self) -> usize {
        self.var2level.len()
    }

    pub(crate) fn level_of(&self, var: VariableId) -> Result<Level> {
        self.var2level
            .get(var.index())
            .copied()
            .ok_or(Error::Var)
    }

    pub(crate) fn var_at_level(&self, level: Level) -> VariableId {
        self.level2var[level as usize]
    }

    pub fn ithvar(&mut self, var: VariableId) -> Result<NodeId> {
        self.check_poisoned()?;
        let level = self.level_of(var)?;
        let node = self.make_node(level, NodeId::FALSE, NodeId::TRUE);
        self.pin_literal(node);
        Ok(node)
    }

    pub fn nithvar(&mut self, var: VariableId) -> Result<NodeId> {
        self.check_poisoned()?;
        let level = self.level_of(var)?;
        let node = self.make_node(level, NodeId::TRUE, NodeId::FALSE);
        self.pin_literal(node);
        Ok(node)
    }

    /// Pins a literal node's refcount to `MAX_REF` so it is never swept by `gc`,
    /// matching `kernel.c`'s `bdd_setvarnum` pinning the `2n` literal nodes to
    /// `MAXREF` as soon as they are created.
    fn pin_literal(&mut self, node: NodeId) {
        if !node.is_terminal() {
            self.nodes[node.index()].refcount = MAX_REF;
        }
    }

    pub fn var(&self, node: NodeId) -> Result<VariableId> {
        let n = self.node(node)?;
        if n.is_terminal() {
            return Err(Error::IllegalBdd);
        }
        Ok(n.var)
    }

    pub fn low(&self, node: NodeId) -> Result<NodeId> {
        let n = self.node(node)?;
        if n.is_terminal() {
            return Err(Error::IllegalBdd);
        }
        Ok(n.low)
    }

    pub fn high(&self, node: NodeId) -> Result<NodeId> {
        let n = self.node(node)?;
        if n.is_terminal() {
            return Err(Error::IllegalBdd);
        }
        Ok(n.high)
    }

    pub(crate) fn node(&self, id: NodeId) -> Result<&Node> {
        if id.is_undefined() {
            return Err(Error::IllegalBdd);
        }
        self.nodes.get(id.index()).filter(|n| !n.is_free()).ok_or(Error::IllegalBdd)
    }

    /// Unpacks a known-valid, non-terminal node's `(level, low, high)` triple.
    /// Only call this from recursion over node ids already drawn from the arena;
    /// it does not validate user-supplied handles the way [`Manager::node`] does.
    pub(crate) fn unpack(&self, id: NodeId) -> (Level, NodeId, NodeId) {
        let n = &self.nodes[id.index()];
        (n.level, n.low, n.high)
    }

    pub(crate) fn level(&self, id: NodeId) -> Level {
        if id.is_terminal() {
            TERMINAL_LEVEL
        } else {
            self.nodes[id.index()].level
        }
    }

    // ---- reference counting ---------------------------------------------------------

    pub fn addref(&mut self, id: NodeId) -> Result<NodeId> {
        let n = self.node(id)?;
        if !n.is_terminal() {
            let n = &mut self.nodes[id.index()];
            n.refcount = (n.refcount + 1).min(MAX_REF);
        }
        Ok(id)
    }

    pub fn delref(&mut self, id: NodeId) -> Result<NodeId> {
        let n = self.node(id)?;
        if n.is_terminal() {
            return Ok(id);
        }
        if n.refcount == 0 {
            if self.config.strict_delref {
                return Err(Error::Deref);
            }
            return Ok(id);
        }
        if n.refcount != MAX_REF {
            self.nodes[id.index()].refcount -= 1;
        }
        Ok(id)
    }

    // ---- unique table -----------------------------------------------------------------

    /// The unique-table constructor: returns the canonical node for
    /// `(level, low, high)`, creating it if it doesn't already exist. Triggers a GC
    /// (and, if that doesn't free enough room, a table resize) when the free list
    /// is empty. If the table is still exhausted afterwards (e.g. `max_node_num` was
    /// reached), this latches the error condition and returns the `false` terminal,
    /// matching BuDDy's `bdd_makenode`/`bdd_error(BDD_NODENUM)` behavior.
    pub fn make_node(&mut self, level: Level, low: NodeId, high: NodeId) -> NodeId {
        if low == high {
            return low;
        }
        let size = self.nodes.len();
        let mut bucket = (triple_hash(level, low, high) as usize) % size;
        if let Some(found) = self.probe_bucket(bucket, level, low, high) {
            return found;
        }
        if self.freepos.is_undefined() {
            self.gc();
            if self.freenum * 100 < self.nodes.len() * self.config.min_free_nodes as usize {
                self.grow();
            }
            bucket = (triple_hash(level, low, high) as usize) % self.nodes.len();
            if let Some(found) = self.probe_bucket(bucket, level, low, high) {
                return found;
            }
        }
        if self.freepos.is_undefined() {
            self.error_latched = true;
            return NodeId::FALSE;
        }
        let slot = self.freepos;
        self.freepos = self.nodes[slot.index()].next;
        self.freenum -= 1;
        self.produced += 1;
        let var = self.var_at_level(level);
        let chain_next = self.nodes[bucket].hash;
        self.nodes[slot.index()] = Node {
            low,
            high,
            var,
            level,
            refcount: 0,
            hash: NodeId::UNDEFINED,
            next: chain_next,
            mark: false,
        };
        self.nodes[bucket].hash = slot;
        slot
    }

    fn probe_bucket(&self, bucket: usize, level: Level, low: NodeId, high: NodeId) -> Option<NodeId> {
        let mut cur = self.nodes[bucket].hash;
        while !cur.is_undefined() {
            let n = &self.nodes[cur.index()];
            if n.level == level && n.low == low && n.high == high {
                return Some(cur);
            }
            cur = n.next;
        }
        None
    }

    fn rehash_all(&mut self) {
        for n in &mut self.nodes {
            n.hash = NodeId::UNDEFINED;
        }
        let size = self.nodes.len();
        for i in 2..self.nodes.len() {
            if self.nodes[i].is_free() {
                continue;
            }
            let (level, low, high) = {
                let n = &self.nodes[i];
                (n.level, n.low, n.high)
            };
            let bucket = (triple_hash(level, low, high) as usize) % size;
            let next = self.nodes[bucket].hash;
            self.nodes[i].next = next;
            self.nodes[bucket].hash = NodeId::new(i as u32);
        }
    }

    fn grow(&mut self) {
        let old_size = self.nodes.len();
        if self.config.max_node_num > 0 && old_size >= self.config.max_node_num {
            return;
        }
        let target = if self.config.max_increase == 0 {
            old_size.saturating_mul(2)
        } else {
            old_size + self.config.max_increase
        };
        let capped = if self.config.max_node_num > 0 {
            target.min(self.config.max_node_num)
        } else {
            target
        };
        let new_size = prime::next_prime_at_least(capped.max(old_size + 1));
        if new_size <= old_size {
            return;
        }
        log::debug!("resizing node table {} -> {}", old_size, new_size);
        // The new range is threaded into a list on its own, with its tail pointing
        // at whatever was already the free list head, then spliced in as the new head.
        let old_free_head = self.freepos;
        for i in old_size..new_size {
            let next = if i + 1 < new_size {
                NodeId::new((i + 1) as u32)
            } else {
                old_free_head
            };
            self.nodes.push(Node::free(next));
        }
        self.freepos = NodeId::new(old_size as u32);
        self.freenum += new_size - old_size;
        let cache_size = if self.config.cache_ratio > 0 {
            (new_size / self.config.cache_ratio).max(1)
        } else {
            self.config.cache_size
        };
        self.caches.resize_all(cache_size);
        self.rehash_all();
    }

    // ---- garbage collection -------------------------------------------------------

    pub fn gc(&mut self) {
        log::debug!("running garbage collection, {} nodes live", self.nodes.len() - self.freenum);
        for n in &mut self.nodes {
            n.mark = false;
        }
        let roots: Vec<NodeId> = self
            .nodes
            .iter()
            .enumerate()
            .skip(2)
            .filter(|(_, n)| !n.is_free() && n.refcount > 0)
            .map(|(i, _)| NodeId::new(i as u32))
            .chain(self.refstack.iter().copied())
            .collect();
        for root in roots {
            self.mark_recursive(root);
        }
        self.freepos = NodeId::UNDEFINED;
        self.freenum = 0;
        for i in (2..self.nodes.len()).rev() {
            let (is_free, marked) = {
                let n = &self.nodes[i];
                (n.is_free(), n.mark)
            };
            if is_free || !marked {
                let next = self.freepos;
                self.nodes[i] = Node::free(next);
                self.freepos = NodeId::new(i as u32);
                self.freenum += 1;
            } else {
                self.nodes[i].mark = false;
            }
        }
        self.rehash_all();
        self.caches.clear_all();
        self.gc_count += 1;
    }

    fn mark_recursive(&mut self, id: NodeId) {
        if id.is_terminal() {
            return;
        }
        if self.nodes[id.index()].mark {
            return;
        }
        self.nodes[id.index()].mark = true;
        let (low, high) = {
            let n = &self.nodes[id.index()];
            (n.low, n.high)
        };
        self.mark_recursive(low);
        self.mark_recursive(high);
    }

    // ---- introspection --------------------------------------------------------------

    pub fn stats(&self) -> EngineStats {
        EngineStats {
            produced: self.produced,
            node_num: self.nodes.len(),
            max_node_num: self.config.max_node_num,
            free_nodes: self.freenum,
            var_num: self.varnum(),
            cache_size: self.caches.apply.capacity(),
            gc_count: self.gc_count,
        }
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache_stats
    }

    pub fn clear_error(&mut self) {
        self.error_latched = false;
    }

    pub fn is_poisoned(&self) -> bool {
        self.error_latched
    }

    pub(crate) fn check_poisoned(&self) -> Result<()> {
        if self.error_latched {
            Err(Error::Poisoned)
        } else {
            Ok(())
        }
    }
}

impl Default for Manager {
    fn default() -> Self {
        Manager::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager_with_vars(n: usize) -> Manager {
        let mut m = Manager::new();
        m.set_varnum(n).unwrap();
        m
    }

    #[test]
    fn terminals_are_distinct_and_fixed() {
        let m = Manager::new();
        assert!(m.node(NodeId::FALSE).unwrap().is_terminal());
        assert!(m.node(NodeId::TRUE).unwrap().is_terminal());
        assert_ne!(NodeId::FALSE, NodeId::TRUE);
    }

    #[test]
    fn make_node_reduces_equal_children() {
        let mut m = manager_with_vars(1);
        let r = m.make_node(0, NodeId::FALSE, NodeId::FALSE);
        assert_eq!(r, NodeId::FALSE);
    }

    #[test]
    fn make_node_is_canonical() {
        let mut m = manager_with_vars(2);
        let a = m.make_node(1, NodeId::FALSE, NodeId::TRUE);
        let b = m.make_node(1, NodeId::FALSE, NodeId::TRUE);
        assert_eq!(a, b);
    }

    #[test]
    fn ithvar_and_nithvar_are_complementary_shapes() {
        let mut m = manager_with_vars(1);
        let v0 = VariableId::from(0usize);
        let pos = m.ithvar(v0).unwrap();
        let neg = m.nithvar(v0).unwrap();
        assert_eq!(m.low(pos).unwrap(), NodeId::FALSE);
        assert_eq!(m.high(pos).unwrap(), NodeId::TRUE);
        assert_eq!(m.low(neg).unwrap(), NodeId::TRUE);
        assert_eq!(m.high(neg).unwrap(), NodeId::FALSE);
    }

    #[test]
    fn addref_delref_roundtrip() {
        let mut m = manager_with_vars(1);
        let v0 = VariableId::from(0usize);
        let node = m.ithvar(v0).unwrap();
        m.addref(node).unwrap();
        m.delref(node).unwrap();
    }

    #[test]
    fn ithvar_result_is_pinned_against_delref() {
        let mut m = manager_with_vars(1);
        let v0 = VariableId::from(0usize);
        let node = m.ithvar(v0).unwrap();
        // Literal nodes are pre-refcounted to MAX_REF, so a delref with no matching
        // addref is a no-op rather than an error, matching the documented "stable
        // literal handle" contract.
        assert_eq!(m.delref(node), Ok(node));
    }

    #[test]
    fn strict_delref_errors_on_unreferenced_node() {
        let mut m = manager_with_vars(2);
        let v0 = m.ithvar(VariableId::from(0usize)).unwrap();
        let v1 = m.ithvar(VariableId::from(1usize)).unwrap();
        let and01 = crate::ops::apply(&mut m, crate::ops::Operator::And, v0, v1).unwrap();
        assert_eq!(m.delref(and01), Err(Error::Deref));
    }

    #[test]
    fn gc_reclaims_unreferenced_nodes() {
        let mut m = manager_with_vars(2);
        let v0 = m.ithvar(VariableId::from(0usize)).unwrap();
        let v1 = m.ithvar(VariableId::from(1usize)).unwrap();
        // Unlike the pinned literal nodes themselves, a freshly built internal node
        // with no addref is fair game for collection.
        let _ = crate::ops::apply(&mut m, crate::ops::Operator::And, v0, v1).unwrap();
        let before = m.stats().free_nodes;
        m.gc();
        let after = m.stats().free_nodes;
        assert!(after >= before);
    }

    #[test]
    fn gc_keeps_referenced_nodes_alive() {
        let mut m = manager_with_vars(1);
        let v0 = VariableId::from(0usize);
        let node = m.ithvar(v0).unwrap();
        m.addref(node).unwrap();
        m.gc();
        assert!(m.node(node).is_ok());
        assert_eq!(m.low(node).unwrap(), NodeId::FALSE);
    }
}
