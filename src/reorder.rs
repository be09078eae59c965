//! The reorder-interruption contract.
//!
//! BuDDy lets a background reordering pass interrupt an in-flight recursive
//! operator via `setjmp`/`longjmp`, unwind to the top-level primitive, run the
//! reorder, and retry exactly once with reordering disabled for the duration of the
//! retry; a second failure degrades to returning the `false` terminal. This crate
//! replaces the longjmp with a `Result`-carried signal that every `*_rec` function
//! propagates with `?`, caught only at the public primitive boundary.
//!
//! The actual reorder heuristic (variable sifting, window permutation, ...) is out
//! of scope; [`ReorderDriver`] is the seam a caller could fill in, and
//! [`NoopReorderDriver`] — which never requests an interruption — is the default.

use crate::manager::Manager;
use crate::types::NodeId;

/// Signals that a recursive operator should unwind immediately because a reorder
/// pass wants to run. Propagated with `?` through every `*_rec` function.
#[derive(Debug, Copy, Clone)]
pub struct ReorderRequested;

pub type RecResult<T> = Result<T, ReorderRequested>;

/// A pluggable reorder pass. The engine calls [`ReorderDriver::maybe_reorder`]
/// between the first attempt and the retry of an interrupted primitive.
pub trait ReorderDriver {
    /// Called when an operation signals it wants to check whether a reorder should
    /// run before continuing. Returning `true` means "a reorder ran", which allows
    /// the harness to log that the retry follows a structural change; this crate
    /// never changes the variable order itself.
    fn maybe_reorder(&mut self) -> bool {
        false
    }

    /// Polled at every recursive step. Returning `true` unwinds the current
    /// primitive with [`ReorderRequested`]. The default never requests one, since
    /// this crate implements only the interruption contract, not a real heuristic.
    fn wants_interrupt(&mut self) -> bool {
        false
    }
}

/// The default driver: reordering is never triggered, matching this crate's
/// explicit scope (only the interruption/restart contract is implemented).
#[derive(Default)]
pub struct NoopReorderDriver;

impl ReorderDriver for NoopReorderDriver {}

/// Runs `attempt` up to twice: once normally, and if it signals
/// [`ReorderRequested`], once more after consulting the manager's reorder driver. A
/// second interruption is defined (per the harness contract) to fall back to the
/// `false` terminal rather than erroring, matching BuDDy's `firstReorder`
/// retry-once behavior. This is the one spot every public primitive funnels
/// through instead of repeating the "again:" retry label inline.
pub fn with_retry<F>(manager: &mut Manager, mut attempt: F) -> NodeId
where
    F: FnMut(&mut Manager) -> RecResult<NodeId>,
{
    match attempt(manager) {
        Ok(result) => result,
        Err(ReorderRequested) => {
            log::debug!("operation interrupted for reorder; retrying once");
            manager.reorder_driver.maybe_reorder();
            match attempt(manager) {
                Ok(result) => result,
                Err(ReorderRequested) => {
                    log::debug!("second interruption during retry; returning false terminal");
                    NodeId::FALSE
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn succeeds_without_interruption() {
        let mut m = Manager::new();
        let result = with_retry(&mut m, |_| Ok(NodeId::TRUE));
        assert_eq!(result, NodeId::TRUE);
    }

    #[test]
    fn retries_once_then_succeeds() {
        let mut m = Manager::new();
        let mut calls = 0;
        let result = with_retry(&mut m, |_| {
            calls += 1;
            if calls == 1 {
                Err(ReorderRequested)
            } else {
                Ok(NodeId::TRUE)
            }
        });
        assert_eq!(result, NodeId::TRUE);
        assert_eq!(calls, 2);
    }

    #[test]
    fn falls_back_to_false_on_repeated_interruption() {
        let mut m = Manager::new();
        let result = with_retry(&mut m, |_| Err(ReorderRequested));
        assert_eq!(result, NodeId::FALSE);
    }
}
