//! Stable error taxonomy for the engine.
//!
//! Every variant corresponds to one of BuDDy's `BDD_*` negative return codes; the
//! `Display` impl gives the equivalent of `bdd_errstring`.

use thiserror::Error;

/// Errors that a [`crate::Manager`] operation can report.
#[derive(Debug, Error, Copy, Clone, Eq, PartialEq)]
pub enum Error {
    #[error("out of memory")]
    Memory,

    #[error("unknown variable")]
    Var,

    #[error("value out of range")]
    Range,

    #[error("removing reference to a node that isn't referenced")]
    Deref,

    #[error("requested operation while another one was running")]
    Running,

    #[error("variable order is illegal for this operation")]
    Order,

    #[error("node table ran out of nodes")]
    NodeNum,

    #[error("variable count already set")]
    VarNum,

    #[error("illegal bdd argument")]
    IllegalBdd,

    #[error("illegal variable set")]
    VarSet,

    #[error("trying to decrease the number of variables")]
    DecreaseVarNum,

    #[error("substituting a variable that appears below the replacement site")]
    Replace,

    #[error("cache ratio is invalid")]
    CacheRatio,

    #[error("operation was interrupted for reordering and the retry failed as well")]
    ReorderFailed,

    #[error("max node increase must be non-negative")]
    Size,

    #[error("manager is in a latched error state; call clear_error() first")]
    Poisoned,
}

pub type Result<T> = std::result::Result<T, Error>;
