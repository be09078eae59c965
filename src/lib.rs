//! Reduced ordered binary decision diagrams with interleaved reference counting,
//! a mark-and-sweep collector, and a hook for interrupting any recursive
//! operation to run dynamic variable reordering.
//!
//! The engine lives entirely behind [`Manager`]: every node handle ([`NodeId`])
//! is only meaningful relative to the `Manager` that produced it, and a program
//! may run several independent `Manager`s at once. [`handle::Bdd`] wraps a node
//! and a shared, reference-counted `Manager` so callers who don't want to drive
//! `addref`/`delref` by hand don't have to.

mod cache;
pub mod config;
pub mod error;
mod handle;
mod manager;
mod node;
pub mod ops;
mod pairs;
mod prime;
pub mod query;
mod refs;
pub mod reorder;
mod stats;
mod types;
mod varset;

pub use config::ManagerConfig;
pub use error::{Error, Result};
pub use handle::Bdd;
pub use manager::Manager;
pub use ops::{
    appall, appex, appuni, apply, compose, constrain, exist, forall, ite, not, replace, restrict, simplify, unique,
    veccompose, Operator, QuantOp, ReplacePairs,
};
pub use pairs::{PairSpec, PairTable};
pub use query::{
    allsat, anodecount, build_cube, fullsatone, makeset, nodecount, pathcount, satcount, satcountln, satcountlnset,
    satcountset, satone, satoneset, scanset, support, varprofile,
};
pub use reorder::{NoopReorderDriver, ReorderDriver, ReorderRequested};
pub use stats::{CacheStat, CacheStats, EngineStats};
pub use types::{NodeId, VariableId};
pub use varset::{make_set, scan_cube, scan_set, LiteralTable};

/// The crate's own version, as published in `Cargo.toml`.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_matches_manifest() {
        assert_eq!(version(), env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn end_to_end_build_and_query() {
        let mut m = Manager::new();
        m.set_varnum(3).unwrap();
        let v0 = m.ithvar(VariableId::from(0usize)).unwrap();
        let v1 = m.ithvar(VariableId::from(1usize)).unwrap();
        let v2 = m.ithvar(VariableId::from(2usize)).unwrap();
        let v1_and_v2 = apply(&mut m, Operator::And, v1, v2).unwrap();
        let f = apply(&mut m, Operator::Or, v0, v1_and_v2).unwrap();
        assert_eq!(satcount(&mut m, f).unwrap(), 6.0);
        let sup = support(&mut m, f).unwrap();
        assert_eq!(scanset(&m, sup).unwrap().len(), 3);
    }
}
