//! Decoding a "cube" BDD (a conjunction of distinct literals, no branching other
//! than the literal structure itself) into a level-indexed table. Used by
//! `restrict` (BuDDy's `bdd_scanset`-style walk that produced `restrictvarset`),
//! by quantification (`quantvarset`), and exposed directly as `Manager::scanset`.

use crate::error::{Error, Result};
use crate::manager::Manager;
use crate::types::{Level, NodeId};

/// `value[level]`: `Some(true)`/`Some(false)` if that level's variable occurs as a
/// positive/negative literal in the cube, `None` otherwise. `last_level` is one past
/// the highest level any literal touches, mirroring BuDDy's `*last` cache-pruning
/// fields (`restrictlast`, `quantlast`).
#[derive(Debug, PartialEq)]
pub struct LiteralTable {
    pub value: Vec<Option<bool>>,
    pub last_level: Level,
}

pub fn scan_cube(manager: &Manager, cube: NodeId) -> Result<LiteralTable> {
    let mut value = vec![None; manager.varnum()];
    let mut last_level: Level = 0;
    let mut cur = cube;
    while !cur.is_true() {
        if cur.is_false() {
            return Err(Error::VarSet);
        }
        let (level, low, high) = manager.unpack(cur);
        let (literal_value, next) = if low.is_false() && !high.is_false() {
            (true, high)
        } else if high.is_false() && !low.is_false() {
            (false, low)
        } else {
            return Err(Error::VarSet);
        };
        if (level as usize) >= value.len() {
            value.resize(level as usize + 1, None);
        }
        value[level as usize] = Some(literal_value);
        last_level = last_level.max(level + 1);
        cur = next;
    }
    Ok(LiteralTable { value, last_level })
}

/// Builds a conjunction-of-positive-literals cube from an explicit variable list,
/// grounded on `bdd_makeset`.
pub fn make_set(manager: &mut Manager, vars: &[crate::types::VariableId]) -> Result<NodeId> {
    let mut levels: Vec<Level> = Vec::with_capacity(vars.len());
    for &v in vars {
        levels.push(manager.level_of(v)?);
    }
    levels.sort_unstable();
    let mut result = NodeId::TRUE;
    for level in levels.into_iter().rev() {
        result = manager.make_node(level, NodeId::FALSE, result);
    }
    Ok(result)
}

/// The inverse of [`make_set`]: recovers the ascending variable list a cube
/// represents, grounded on `bdd_scanset`.
pub fn scan_set(manager: &Manager, cube: NodeId) -> Result<Vec<crate::types::VariableId>> {
    let table = scan_cube(manager, cube)?;
    let mut vars = Vec::new();
    for (level, entry) in table.value.iter().enumerate() {
        if entry.is_some() {
            vars.push(manager.var_at_level(level as Level));
        }
    }
    Ok(vars)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::VariableId;

    #[test]
    fn make_set_then_scan_set_roundtrips() {
        let mut m = Manager::new();
        m.set_varnum(4).unwrap();
        let vars = vec![VariableId::from(0usize), VariableId::from(2usize)];
        let cube = make_set(&mut m, &vars).unwrap();
        let recovered = scan_set(&m, cube).unwrap();
        assert_eq!(recovered, vars);
    }

    #[test]
    fn scan_cube_rejects_false() {
        let m = Manager::new();
        assert_eq!(scan_cube(&m, NodeId::FALSE), Err(Error::VarSet));
    }
}
