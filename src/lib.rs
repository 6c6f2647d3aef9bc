//! Cell-based boolean constraint engine for mapping view generation.
//!
//! Overlapping storage mapping fragments ("cells") are combined into an
//! operator tree; each fragment's applicability is a boolean condition
//! over finite-domain variables. This crate owns the symbolic algebra:
//! the constant and domain layers, the generic boolean AST with its
//! visitor framework, the literal hierarchy, the cell-tree rewrites, and
//! the lowering of leaves into CQL query blocks rendered both as text
//! and as an expression tree.

pub mod bool_expr;
pub mod cell_tree;
pub mod constants;
pub mod cql;
pub mod domain;
pub mod errorlog;
pub mod literals;
pub mod metadata;
pub mod result;
pub mod slots;
mod util;

use crate::cell_tree::{CellTreeNode, LoweringContext};
use crate::cql::CqlBlock;
use crate::errorlog::ErrorLog;
use crate::result::{Error, Result};

/// Lowers a cell tree into one query block per leaf: canonicalize the
/// tree shape, then lower each surviving leaf. Validation records
/// accumulate across the whole pass; the result is an error only when
/// something worse than a warning was logged.
pub fn generate_view_blocks(tree: CellTreeNode, ctx: &LoweringContext) -> Result<Vec<CqlBlock>> {
    let tree = cell_tree::flatten_associative(tree);
    let mut log = ErrorLog::new();
    let blocks: Vec<CqlBlock> = cell_tree::leaves(&tree)
        .into_iter()
        .enumerate()
        .map(|(i, leaf)| cell_tree::to_cql_block(leaf, ctx, &format!("T{}", i + 1), &mut log))
        .collect();
    if log.has_errors() {
        return Err(Error::Validation(log));
    }
    Ok(blocks)
}

#[cfg(test)]
mod test;
