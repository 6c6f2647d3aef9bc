//! The cell-tree algebra: leaves wrap one mapping fragment with its
//! applicability condition, internal nodes combine subtrees with set and
//! join operators, and rewrites keep the tree in a flat canonical shape
//! before leaves are lowered to query blocks.

pub mod definitions;
mod flatten;
mod lowering;

pub use definitions::{
    CellTreeNode, CellTreeOpType, FragmentQuery, LeafCellTreeNode, LeftCellWrapper, OpCellTreeNode,
};
pub use flatten::{flatten, flatten_associative, leaves};
pub use lowering::{to_cql_block, LoweringContext};

#[cfg(test)]
mod test;
