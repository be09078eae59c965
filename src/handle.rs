//! `Bdd`: an RAII handle pairing a [`NodeId`] with the [`Manager`] that owns it.
//!
//! The teacher's own `Bdd` type owns its node table outright and never needs
//! reference counting because each `Bdd` is a self-contained immutable value.
//! Here many `Bdd` handles share one mutable, garbage-collected [`Manager`], so
//! the handle has to keep the node alive by driving `addref`/`delref` the way a
//! hand-written caller would, freeing callers of a BuDDy-style engine from ever
//! calling `addref`/`delref` themselves.

use crate::error::Result;
use crate::manager::Manager;
use crate::types::NodeId;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// A reference-counted handle to a node living in a shared [`Manager`].
///
/// Cloning a `Bdd` calls [`Manager::addref`]; dropping the last clone calls
/// [`Manager::delref`]. The underlying node can never be collected while at
/// least one handle exists.
pub struct Bdd {
    manager: Rc<RefCell<Manager>>,
    node: NodeId,
}

impl Bdd {
    /// Wraps `node`, taking out a reference on it. `node` must already be a
    /// valid handle produced by `manager` (an `ithvar`/`apply`/... result).
    pub fn new(manager: Rc<RefCell<Manager>>, node: NodeId) -> Result<Bdd> {
        manager.borrow_mut().addref(node)?;
        Ok(Bdd { manager, node })
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn manager(&self) -> &Rc<RefCell<Manager>> {
        &self.manager
    }

    pub fn is_true(&self) -> bool {
        self.node.is_true()
    }

    pub fn is_false(&self) -> bool {
        self.node.is_false()
    }

    /// Rewraps a raw node produced from an operation on `self`'s manager,
    /// taking out a fresh reference. Used by the operator methods below so
    /// callers chain `Bdd` values instead of juggling `NodeId`s directly.
    fn lift(&self, node: NodeId) -> Result<Bdd> {
        Bdd::new(self.manager.clone(), node)
    }

    pub fn and(&self, other: &Bdd) -> Result<Bdd> {
        self.same_manager(other);
        let result = crate::ops::apply(&mut self.manager.borrow_mut(), crate::ops::Operator::And, self.node, other.node)?;
        self.lift(result)
    }

    pub fn or(&self, other: &Bdd) -> Result<Bdd> {
        self.same_manager(other);
        let result = crate::ops::apply(&mut self.manager.borrow_mut(), crate::ops::Operator::Or, self.node, other.node)?;
        self.lift(result)
    }

    pub fn xor(&self, other: &Bdd) -> Result<Bdd> {
        self.same_manager(other);
        let result = crate::ops::apply(&mut self.manager.borrow_mut(), crate::ops::Operator::Xor, self.node, other.node)?;
        self.lift(result)
    }

    pub fn not(&self) -> Result<Bdd> {
        let result = crate::ops::not(&mut self.manager.borrow_mut(), self.node)?;
        self.lift(result)
    }

    pub fn ite(&self, then_branch: &Bdd, else_branch: &Bdd) -> Result<Bdd> {
        self.same_manager(then_branch);
        self.same_manager(else_branch);
        let result = crate::ops::ite(&mut self.manager.borrow_mut(), self.node, then_branch.node, else_branch.node)?;
        self.lift(result)
    }

    fn same_manager(&self, other: &Bdd) {
        debug_assert!(
            Rc::ptr_eq(&self.manager, &other.manager),
            "combined two Bdd handles backed by different managers"
        );
    }
}

impl Clone for Bdd {
    fn clone(&self) -> Self {
        self.manager
            .borrow_mut()
            .addref(self.node)
            .expect("cloning a Bdd handle whose node is no longer registered");
        Bdd { manager: self.manager.clone(), node: self.node }
    }
}

impl Drop for Bdd {
    fn drop(&mut self) {
        let _ = self.manager.borrow_mut().delref(self.node);
    }
}

impl PartialEq for Bdd {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.manager, &other.manager) && self.node == other.node
    }
}

impl Eq for Bdd {}

impl fmt::Debug for Bdd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bdd").field("node", &self.node).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::VariableId;

    fn fresh_manager() -> Rc<RefCell<Manager>> {
        let mut m = Manager::new();
        m.set_varnum(2).unwrap();
        Rc::new(RefCell::new(m))
    }

    #[test]
    fn clone_and_drop_balance_refcount() {
        let manager = fresh_manager();
        let v0 = manager.borrow_mut().ithvar(VariableId::from(0usize)).unwrap();
        let handle = Bdd::new(manager.clone(), v0).unwrap();
        {
            let cloned = handle.clone();
            assert_eq!(cloned.node(), v0);
        }
        // the clone's Drop ran already; the node must still be alive via `handle`.
        assert!(!manager.borrow().is_poisoned());
    }

    #[test]
    fn and_combines_two_handles() {
        let manager = fresh_manager();
        let mut mgr = manager.borrow_mut();
        let v0 = mgr.ithvar(VariableId::from(0usize)).unwrap();
        let v1 = mgr.ithvar(VariableId::from(1usize)).unwrap();
        drop(mgr);
        let a = Bdd::new(manager.clone(), v0).unwrap();
        let b = Bdd::new(manager.clone(), v1).unwrap();
        let both = a.and(&b).unwrap();
        assert!(!both.is_false());
    }
}
