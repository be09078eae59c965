//! Enumeration, counting and introspection queries: `satone`, `satoneset`,
//! `fullsatone`, `allsat`, `satcount`/`satcountln`/`pathcount` (and their
//! variable-subset variants), `nodecount`/`anodecount`, `varprofile`, `support`,
//! and the `scanset`/`makeset`/`build_cube` helpers. Grounded on `bddop.c`'s
//! `satone_rec`/`satoneset_rec`/`fullsatone_rec`/`allsat_rec`/`satcount_rec`/
//! `satcountln_rec`/`bdd_pathcount_rec`/`varprofile_rec`/`support_rec` and
//! `kernel.c`'s `bdd_scanset`/`bdd_makeset`.

use crate::cache::CacheValue;
use crate::error::{Error, Result};
use crate::manager::Manager;
use crate::ops::{apply, Operator};
use crate::reorder;
use crate::types::{Level, NodeId, VariableId};
use crate::varset::{make_set, scan_cube, scan_set};
use std::collections::HashSet;

pub use crate::varset::make_set as makeset;
pub use crate::varset::scan_set as scanset;

const SATCOUNT_TAG: i64 = 5000;
const SATCOUNTLN_TAG: i64 = 5001;
const PATHCOUNT_TAG: i64 = 5002;
const NEG_INFINITY_SENTINEL: f64 = -1.0;

/// Builds a minterm cube BDD from an integer value over `vars` (most-significant
/// variable first), grounded on `bdd_buildcube`/`bdd_ibuildcube`.
pub fn build_cube(manager: &mut Manager, value: u64, vars: &[VariableId]) -> Result<NodeId> {
    let mut result = NodeId::TRUE;
    for (i, &var) in vars.iter().enumerate().rev() {
        let bit = (value >> (vars.len() - 1 - i)) & 1 == 1;
        let level = manager.level_of(var)?;
        result = if bit {
            manager.make_node(level, NodeId::FALSE, result)
        } else {
            manager.make_node(level, result, NodeId::FALSE)
        };
    }
    Ok(result)
}

/// One satisfying assignment of `f`, as a minterm cube.
pub fn satone(manager: &mut Manager, f: NodeId) -> Result<NodeId> {
    manager.check_poisoned()?;
    manager.node(f)?;
    if f.is_false() {
        return Err(Error::IllegalBdd);
    }
    Ok(reorder::with_retry(manager, |m| satone_rec(m, f)))
}

fn satone_rec(manager: &mut Manager, f: NodeId) -> crate::reorder::RecResult<NodeId> {
    if f.is_terminal() {
        return Ok(f);
    }
    let (level, low, high) = manager.unpack(f);
    if low.is_false() {
        let high_res = satone_rec(manager, high)?;
        Ok(manager.make_node(level, NodeId::FALSE, high_res))
    } else {
        let low_res = satone_rec(manager, low)?;
        Ok(manager.make_node(level, low_res, NodeId::FALSE))
    }
}

/// Like [`satone`], but pads every variable in `var_set` that [`satone`] left
/// unconstrained with the polarity `pol` (`NodeId::TRUE` or `NodeId::FALSE`).
pub fn satoneset(manager: &mut Manager, f: NodeId, var_set: NodeId, pol: NodeId) -> Result<NodeId> {
    if !pol.is_true() && !pol.is_false() {
        return Err(Error::IllegalBdd);
    }
    let base = satone(manager, f)?;
    pad_with_varset(manager, base, var_set, pol)
}

/// Like [`satone`], but pads every variable the manager knows about (not just a
/// given set) with the `false` polarity, matching `bdd_fullsatone`.
pub fn fullsatone(manager: &mut Manager, f: NodeId) -> Result<NodeId> {
    manager.check_poisoned()?;
    let base = satone(manager, f)?;
    let all_vars: Vec<VariableId> = (0..manager.varnum()).map(VariableId::from).collect();
    let full_set = make_set(manager, &all_vars)?;
    pad_with_varset(manager, base, full_set, NodeId::FALSE)
}

fn pad_with_varset(manager: &mut Manager, cube: NodeId, var_set: NodeId, pol: NodeId) -> Result<NodeId> {
    let present = scan_cube(manager, cube)?;
    let wanted = scan_cube(manager, var_set)?;
    let mut result = cube;
    for level in (0..wanted.value.len() as Level).rev() {
        if wanted.value[level as usize].is_some() && present.value.get(level as usize).copied().flatten().is_none() {
            let var = manager.var_at_level(level);
            let literal = if pol.is_true() {
                manager.ithvar(var)?
            } else {
                manager.nithvar(var)?
            };
            result = apply(manager, Operator::And, result, literal)?;
        }
    }
    Ok(result)
}

/// Enumerates every satisfying assignment of `f`, calling `callback` with a
/// `varnum`-long profile (`Some(true)`/`Some(false)`/`None` for don't-care) for
/// each. Matches `bdd_allsat`'s convention of leaving untouched variables as
/// don't-care rather than expanding them into separate assignments.
pub fn allsat(manager: &mut Manager, f: NodeId, mut callback: impl FnMut(&[Option<bool>])) -> Result<()> {
    manager.check_poisoned()?;
    manager.node(f)?;
    let mut profile = vec![None; manager.varnum()];
    allsat_rec(manager, f, &mut profile, &mut callback);
    Ok(())
}

fn allsat_rec(manager: &Manager, f: NodeId, profile: &mut [Option<bool>], callback: &mut impl FnMut(&[Option<bool>])) {
    if f.is_false() {
        return;
    }
    if f.is_true() {
        callback(profile);
        return;
    }
    let (level, low, high) = manager.unpack(f);
    let var = manager.var_at_level(level).index();
    if !low.is_false() {
        profile[var] = Some(false);
        allsat_rec(manager, low, profile, callback);
    }
    if !high.is_false() {
        profile[var] = Some(true);
        allsat_rec(manager, high, profile, callback);
    }
    profile[var] = None;
}

/// Number of satisfying assignments over all `varnum` variables.
pub fn satcount(manager: &mut Manager, f: NodeId) -> Result<f64> {
    manager.check_poisoned()?;
    manager.node(f)?;
    if f.is_false() {
        return Ok(0.0);
    }
    let top_level = counting_level(manager, f);
    let rel = satcount_rec(manager, f);
    Ok(rel * 2f64.powi(top_level))
}

/// `manager.level()` reports terminal nodes at a sentinel past every real level,
/// which is correct for `min()`-based cofactoring but wrong for counting: here a
/// terminal child's level must be `varnum` itself, so the gap to it accounts for
/// exactly the variables actually skipped rather than the whole `u16` range.
fn counting_level(manager: &Manager, id: NodeId) -> i32 {
    if id.is_terminal() {
        manager.varnum() as i32
    } else {
        manager.level(id) as i32
    }
}

fn satcount_rec(manager: &mut Manager, f: NodeId) -> f64 {
    if f.is_false() {
        return 0.0;
    }
    if f.is_true() {
        return 1.0;
    }
    if let Some(CacheValue::Double(cached)) = manager.caches.misc.get(f, NodeId::UNDEFINED, SATCOUNT_TAG) {
        return cached;
    }
    let (level, low, high) = manager.unpack(f);
    let low_gap = counting_level(manager, low) - (level as i32) - 1;
    let high_gap = counting_level(manager, high) - (level as i32) - 1;
    let result = satcount_rec(manager, low) * 2f64.powi(low_gap) + satcount_rec(manager, high) * 2f64.powi(high_gap);
    manager.caches.misc.insert(f, NodeId::UNDEFINED, SATCOUNT_TAG, CacheValue::Double(result));
    result
}

/// `satcount` restricted to `var_set`: divides out variables in the manager that
/// are not members of `var_set`, per `bdd_satcountset`.
pub fn satcountset(manager: &mut Manager, f: NodeId, var_set: NodeId) -> Result<f64> {
    let full = satcount(manager, f)?;
    if full == 0.0 {
        return Ok(0.0);
    }
    let members = scan_set(manager, var_set)?.len();
    let unused = manager.varnum().saturating_sub(members);
    Ok((full / 2f64.powi(unused as i32)).max(1.0))
}

/// Base-2 logarithm of [`satcount`]; returns a negative sentinel for the zero
/// function so callers never need to special-case `log2(0)`.
pub fn satcountln(manager: &mut Manager, f: NodeId) -> Result<f64> {
    manager.check_poisoned()?;
    manager.node(f)?;
    if f.is_false() {
        return Ok(NEG_INFINITY_SENTINEL);
    }
    let top_level = counting_level(manager, f);
    Ok(satcountln_rec(manager, f) + top_level as f64)
}

fn satcountln_rec(manager: &mut Manager, f: NodeId) -> f64 {
    if f.is_false() {
        return NEG_INFINITY_SENTINEL;
    }
    if f.is_true() {
        return 0.0;
    }
    if let Some(CacheValue::Double(cached)) = manager.caches.misc.get(f, NodeId::UNDEFINED, SATCOUNTLN_TAG) {
        return cached;
    }
    let (level, low, high) = manager.unpack(f);
    let low_val = satcountln_rec(manager, low);
    let low_val = if low_val < 0.0 { None } else { Some(low_val + ((counting_level(manager, low) - level as i32 - 1) as f64)) };
    let high_val = satcountln_rec(manager, high);
    let high_val = if high_val < 0.0 { None } else { Some(high_val + ((counting_level(manager, high) - level as i32 - 1) as f64)) };
    let result = match (low_val, high_val) {
        (None, None) => NEG_INFINITY_SENTINEL,
        (Some(a), None) => a,
        (None, Some(b)) => b,
        (Some(a), Some(b)) => {
            let (hi, lo) = if a >= b { (a, b) } else { (b, a) };
            hi + (2f64.powf(lo - hi)).ln_1p() / std::f64::consts::LN_2
        }
    };
    manager.caches.misc.insert(f, NodeId::UNDEFINED, SATCOUNTLN_TAG, CacheValue::Double(result));
    result
}

pub fn satcountlnset(manager: &mut Manager, f: NodeId, var_set: NodeId) -> Result<f64> {
    let full = satcount(manager, f)?;
    if full == 0.0 {
        return Ok(NEG_INFINITY_SENTINEL);
    }
    satcountset(manager, f, var_set).map(|v| v.log2())
}

/// Number of distinct root-to-leaf paths that lead to `true`, without the
/// don't-care multiplier `satcount` applies.
pub fn pathcount(manager: &mut Manager, f: NodeId) -> Result<f64> {
    manager.check_poisoned()?;
    manager.node(f)?;
    Ok(pathcount_rec(manager, f))
}

fn pathcount_rec(manager: &mut Manager, f: NodeId) -> f64 {
    if f.is_false() {
        return 0.0;
    }
    if f.is_true() {
        return 1.0;
    }
    if let Some(CacheValue::Double(cached)) = manager.caches.misc.get(f, NodeId::UNDEFINED, PATHCOUNT_TAG) {
        return cached;
    }
    let (_, low, high) = manager.unpack(f);
    let result = pathcount_rec(manager, low) + pathcount_rec(manager, high);
    manager.caches.misc.insert(f, NodeId::UNDEFINED, PATHCOUNT_TAG, CacheValue::Double(result));
    result
}

/// Distinct nonterminal nodes reachable from `f`.
pub fn nodecount(manager: &Manager, f: NodeId) -> Result<usize> {
    manager.node(f)?;
    let mut visited = HashSet::new();
    count_dfs(manager, f, &mut visited);
    Ok(visited.len())
}

/// Distinct nonterminal nodes reachable from any root in `fs`, shared structure
/// counted once.
pub fn anodecount(manager: &Manager, fs: &[NodeId]) -> Result<usize> {
    let mut visited = HashSet::new();
    for &f in fs {
        manager.node(f)?;
        count_dfs(manager, f, &mut visited);
    }
    Ok(visited.len())
}

fn count_dfs(manager: &Manager, f: NodeId, visited: &mut HashSet<NodeId>) {
    if f.is_terminal() || !visited.insert(f) {
        return;
    }
    let (_, low, high) = manager.unpack(f);
    count_dfs(manager, low, visited);
    count_dfs(manager, high, visited);
}

/// Histogram of node counts per variable across the BDD rooted at `f`.
pub fn varprofile(manager: &Manager, f: NodeId) -> Result<Vec<usize>> {
    manager.node(f)?;
    let mut profile = vec![0usize; manager.varnum()];
    let mut visited = HashSet::new();
    varprofile_dfs(manager, f, &mut profile, &mut visited);
    Ok(profile)
}

fn varprofile_dfs(manager: &Manager, f: NodeId, profile: &mut [usize], visited: &mut HashSet<NodeId>) {
    if f.is_terminal() || !visited.insert(f) {
        return;
    }
    let (level, low, high) = manager.unpack(f);
    profile[manager.var_at_level(level).index()] += 1;
    varprofile_dfs(manager, low, profile, visited);
    varprofile_dfs(manager, high, profile, visited);
}

/// The set of variables `f` actually depends on, as a cube.
pub fn support(manager: &mut Manager, f: NodeId) -> Result<NodeId> {
    manager.check_poisoned()?;
    manager.node(f)?;
    manager.support_epoch = manager.support_epoch.wrapping_add(1);
    if manager.support_epoch == 0 {
        for seen in &mut manager.support_seen {
            *seen = 0;
        }
        manager.support_epoch = 1;
    }
    let epoch = manager.support_epoch;
    let mut visited = HashSet::new();
    let mut levels = Vec::new();
    support_dfs(manager, f, epoch, &mut visited, &mut levels);
    levels.sort_unstable();
    let mut result = NodeId::TRUE;
    for level in levels.into_iter().rev() {
        result = manager.make_node(level, NodeId::FALSE, result);
    }
    Ok(result)
}

fn support_dfs(manager: &mut Manager, f: NodeId, epoch: u32, visited: &mut HashSet<NodeId>, levels: &mut Vec<Level>) {
    if f.is_terminal() || !visited.insert(f) {
        return;
    }
    let (level, low, high) = manager.unpack(f);
    let var = manager.var_at_level(level).index();
    if manager.support_seen[var] != epoch {
        manager.support_seen[var] = epoch;
        levels.push(level);
    }
    support_dfs(manager, low, epoch, visited, levels);
    support_dfs(manager, high, epoch, visited, levels);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::{apply, Operator as Op};

    #[test]
    fn satone_of_true_is_true() {
        let mut m = Manager::new();
        assert_eq!(satone(&mut m, NodeId::TRUE).unwrap(), NodeId::TRUE);
    }

    #[test]
    fn satone_of_false_errors() {
        let mut m = Manager::new();
        assert_eq!(satone(&mut m, NodeId::FALSE), Err(Error::IllegalBdd));
    }

    #[test]
    fn satcount_of_single_variable_is_one() {
        let mut m = Manager::new();
        m.set_varnum(1).unwrap();
        let v0 = m.ithvar(VariableId::from(0usize)).unwrap();
        assert_eq!(satcount(&mut m, v0).unwrap(), 1.0);
    }

    #[test]
    fn satcount_of_tautology_is_full_space() {
        let mut m = Manager::new();
        m.set_varnum(2).unwrap();
        assert_eq!(satcount(&mut m, NodeId::TRUE).unwrap(), 4.0);
    }

    #[test]
    fn pathcount_ignores_dont_cares() {
        let mut m = Manager::new();
        m.set_varnum(2).unwrap();
        let v0 = m.ithvar(VariableId::from(0usize)).unwrap();
        // v0 alone has 1 path to true even though satcount is 2 (v1 is don't-care).
        assert_eq!(pathcount(&mut m, v0).unwrap(), 1.0);
        assert_eq!(satcount(&mut m, v0).unwrap(), 2.0);
    }

    #[test]
    fn nodecount_of_terminal_is_zero() {
        let m = Manager::new();
        assert_eq!(nodecount(&m, NodeId::TRUE).unwrap(), 0);
    }

    #[test]
    fn support_recovers_variables_used() {
        let mut m = Manager::new();
        m.set_varnum(3).unwrap();
        let v0 = m.ithvar(VariableId::from(0usize)).unwrap();
        let v2 = m.ithvar(VariableId::from(2usize)).unwrap();
        let f = apply(&mut m, Op::And, v0, v2).unwrap();
        let sup = support(&mut m, f).unwrap();
        let vars = scanset(&m, sup).unwrap();
        assert_eq!(vars, vec![VariableId::from(0usize), VariableId::from(2usize)]);
    }

    #[test]
    fn build_cube_matches_apply_based_construction() {
        let mut m = Manager::new();
        m.set_varnum(2).unwrap();
        let vars = vec![VariableId::from(0usize), VariableId::from(1usize)];
        // value 0b10: v0 true, v1 false.
        let cube = build_cube(&mut m, 0b10, &vars).unwrap();
        let v0 = m.ithvar(VariableId::from(0usize)).unwrap();
        let notv1 = m.nithvar(VariableId::from(1usize)).unwrap();
        let expected = apply(&mut m, Op::And, v0, notv1).unwrap();
        assert_eq!(cube, expected);
    }

    #[test]
    fn allsat_reports_dont_cares() {
        let mut m = Manager::new();
        m.set_varnum(2).unwrap();
        let v0 = m.ithvar(VariableId::from(0usize)).unwrap();
        let mut seen = Vec::new();
        allsat(&mut m, v0, |profile| seen.push(profile.to_vec())).unwrap();
        assert_eq!(seen, vec![vec![Some(true), None]]);
    }
}
