//! Quantification (`exist`, `forall`, `unique`) and the fused apply-then-quantify
//! primitives (`appex`, `appall`, `appuni`), grounded on `bddop.c`'s `bdd_exist`/
//! `quant_rec` and `bdd_appex`/`appquant_rec`.

use crate::cache::CacheValue;
use crate::error::Result;
use crate::manager::Manager;
use crate::ops::apply::{apply_rec, cofactor, Operator};
use crate::reorder::{self, RecResult, ReorderRequested};
use crate::types::NodeId;
use crate::varset::{scan_cube, LiteralTable};

/// Which connective combines the two cofactors of a quantified variable.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum QuantOp {
    Exist,
    Forall,
    Unique,
}

impl QuantOp {
    fn combinator(self) -> Operator {
        match self {
            QuantOp::Exist => Operator::Or,
            QuantOp::Forall => Operator::And,
            QuantOp::Unique => Operator::Xor,
        }
    }

    fn tag(self) -> i64 {
        match self {
            QuantOp::Exist => 0,
            QuantOp::Forall => 1,
            QuantOp::Unique => 2,
        }
    }
}

pub fn exist(manager: &mut Manager, f: NodeId, vars: NodeId) -> Result<NodeId> {
    quantify(manager, f, vars, QuantOp::Exist)
}

pub fn forall(manager: &mut Manager, f: NodeId, vars: NodeId) -> Result<NodeId> {
    quantify(manager, f, vars, QuantOp::Forall)
}

pub fn unique(manager: &mut Manager, f: NodeId, vars: NodeId) -> Result<NodeId> {
    quantify(manager, f, vars, QuantOp::Unique)
}

fn quantify(manager: &mut Manager, f: NodeId, vars: NodeId, qop: QuantOp) -> Result<NodeId> {
    manager.check_poisoned()?;
    manager.node(f)?;
    manager.node(vars)?;
    let table = scan_cube(manager, vars)?;
    let tag = (vars.into_tag() << 2) | qop.tag();
    Ok(reorder::with_retry(manager, |m| quant_rec(m, f, &table, qop, tag)))
}

fn quant_rec(manager: &mut Manager, f: NodeId, table: &LiteralTable, qop: QuantOp, tag: i64) -> RecResult<NodeId> {
    if f.is_terminal() {
        return Ok(f);
    }
    let level = manager.level(f);
    if level >= table.last_level {
        return Ok(f);
    }
    if let Some(CacheValue::Node(cached)) = manager.caches.quant.get(f, NodeId::UNDEFINED, tag) {
        manager.cache_stats.quant.record(true);
        return Ok(cached);
    }
    manager.cache_stats.quant.record(false);
    if manager.reorder_driver_mut().wants_interrupt() {
        return Err(ReorderRequested);
    }

    let (_, low, high) = manager.unpack(f);
    let low_res = quant_rec(manager, low, table, qop, tag)?;
    let _guard = manager.refstack.scoped(low_res);
    let high_res = quant_rec(manager, high, table, qop, tag)?;

    let result = if table.value[level as usize].is_some() {
        apply_rec(manager, qop.combinator(), low_res, high_res)?
    } else {
        manager.make_node(level, low_res, high_res)
    };
    manager.caches.quant.insert(f, NodeId::UNDEFINED, tag, CacheValue::Node(result));
    Ok(result)
}

trait IntoTag {
    fn into_tag(self) -> i64;
}
impl IntoTag for NodeId {
    fn into_tag(self) -> i64 {
        u32::from(self) as i64
    }
}

pub fn appex(manager: &mut Manager, a: NodeId, b: NodeId, op: Operator, vars: NodeId) -> Result<NodeId> {
    appquant(manager, a, b, op, vars, QuantOp::Exist)
}

pub fn appall(manager: &mut Manager, a: NodeId, b: NodeId, op: Operator, vars: NodeId) -> Result<NodeId> {
    appquant(manager, a, b, op, vars, QuantOp::Forall)
}

pub fn appuni(manager: &mut Manager, a: NodeId, b: NodeId, op: Operator, vars: NodeId) -> Result<NodeId> {
    appquant(manager, a, b, op, vars, QuantOp::Unique)
}

fn appquant(manager: &mut Manager, a: NodeId, b: NodeId, op: Operator, vars: NodeId, qop: QuantOp) -> Result<NodeId> {
    manager.check_poisoned()?;
    manager.node(a)?;
    manager.node(b)?;
    manager.node(vars)?;
    let table = scan_cube(manager, vars)?;
    let tag = (vars.into_tag() << 8) | ((op as i64) << 4) | (qop.tag() << 2);
    let quant_tag = (vars.into_tag() << 2) | qop.tag();
    Ok(reorder::with_retry(manager, |m| {
        appquant_rec(m, a, b, op, &table, qop, tag, quant_tag)
    }))
}

/// Idempotence and annihilator shortcuts for the operators `bddop.c`'s
/// `appquant_rec` special-cases (`bddop_and`/`or`/`xor`/`nand`/`nor`) before ever
/// looking at levels or the cache, so e.g. `appex(f, f, And, vars)` collapses
/// straight to `exist(f, vars)` instead of re-deriving the same answer one
/// cofactor pair at a time.
enum AppQuantShortcut {
    Terminal(NodeId),
    QuantifyOperand(NodeId),
}

fn appquant_shortcut(op: Operator, a: NodeId, b: NodeId) -> Option<AppQuantShortcut> {
    use AppQuantShortcut::*;
    use Operator::*;
    match op {
        And => {
            if a.is_false() || b.is_false() {
                Some(Terminal(NodeId::FALSE))
            } else if a == b {
                Some(QuantifyOperand(a))
            } else if a.is_true() {
                Some(QuantifyOperand(b))
            } else if b.is_true() {
                Some(QuantifyOperand(a))
            } else {
                None
            }
        }
        Or => {
            if a.is_true() || b.is_true() {
                Some(Terminal(NodeId::TRUE))
            } else if a == b {
                Some(QuantifyOperand(a))
            } else if a.is_false() {
                Some(QuantifyOperand(b))
            } else if b.is_false() {
                Some(QuantifyOperand(a))
            } else {
                None
            }
        }
        Xor => {
            if a == b {
                Some(Terminal(NodeId::FALSE))
            } else if a.is_false() {
                Some(QuantifyOperand(b))
            } else if b.is_false() {
                Some(QuantifyOperand(a))
            } else {
                None
            }
        }
        Nand => {
            if a.is_false() || b.is_false() {
                Some(Terminal(NodeId::TRUE))
            } else {
                None
            }
        }
        Nor => {
            if a.is_true() || b.is_true() {
                Some(Terminal(NodeId::FALSE))
            } else {
                None
            }
        }
        _ => None,
    }
}

fn appquant_rec(
    manager: &mut Manager,
    a: NodeId,
    b: NodeId,
    op: Operator,
    table: &LiteralTable,
    qop: QuantOp,
    tag: i64,
    quant_tag: i64,
) -> RecResult<NodeId> {
    if let Some(shortcut) = appquant_shortcut(op, a, b) {
        return match shortcut {
            AppQuantShortcut::Terminal(n) => Ok(n),
            AppQuantShortcut::QuantifyOperand(n) => quant_rec(manager, n, table, qop, quant_tag),
        };
    }

    let la = manager.level(a);
    let lb = manager.level(b);
    let level = la.min(lb);
    if level >= table.last_level {
        return apply_rec(manager, op, a, b);
    }
    if let Some(CacheValue::Node(cached)) = manager.caches.appquant.get(a, b, tag) {
        manager.cache_stats.appquant.record(true);
        return Ok(cached);
    }
    manager.cache_stats.appquant.record(false);
    if manager.reorder_driver_mut().wants_interrupt() {
        return Err(ReorderRequested);
    }

    let (a_low, a_high) = cofactor(manager, a, level, la);
    let (b_low, b_high) = cofactor(manager, b, level, lb);
    let low_res = appquant_rec(manager, a_low, b_low, op, table, qop, tag, quant_tag)?;
    let _guard = manager.refstack.scoped(low_res);
    let high_res = appquant_rec(manager, a_high, b_high, op, table, qop, tag, quant_tag)?;

    let result = if table.value[level as usize].is_some() {
        apply_rec(manager, qop.combinator(), low_res, high_res)?
    } else {
        manager.make_node(level, low_res, high_res)
    };
    manager.caches.appquant.insert(a, b, tag, CacheValue::Node(result));
    Ok(result)
}
