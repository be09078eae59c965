//! The recursive operator kernel (`bddop.c`'s `*_rec` family).
//!
//! Every public entry point here follows the same shape: validate arguments and
//! the poisoned-error latch, then run the actual recursion through
//! [`crate::reorder::with_retry`] so a signalled reorder interruption restarts the
//! whole operation exactly once, instead of repeating BuDDy's `again:` label by hand
//! at each call site.

mod apply;
mod compose;
mod not;
mod quantify;
mod replace;
mod restrict;
mod simplify;

pub use apply::{apply, ite, Operator};
pub use compose::{compose, veccompose};
pub use not::not;
pub use quantify::{appall, appex, appuni, exist, forall, unique, QuantOp};
pub use replace::{replace, ReplacePairs};
pub use restrict::{constrain, restrict};
pub use simplify::simplify;
