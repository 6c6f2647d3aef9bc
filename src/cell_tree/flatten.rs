//! Cell-tree rewrites: collapse degenerate single-child operator nodes
//! introduced by upstream cell splitting, then merge same-operator
//! children of associative operators into flat n-ary nodes instead of
//! nested binary chains.

use super::definitions::{CellTreeNode, LeafCellTreeNode, OpCellTreeNode};

/// Bottom-up single-child collapse: any internal node reduced to exactly
/// one child after recursing is replaced by that child.
pub fn flatten(node: CellTreeNode) -> CellTreeNode {
    match node {
        CellTreeNode::Op(op_node) => {
            let op = op_node.op;
            let children: Vec<CellTreeNode> = op_node.children.into_iter().map(flatten).collect();
            if children.len() == 1 {
                children.into_iter().next().unwrap()
            } else {
                CellTreeNode::Op(OpCellTreeNode::new(op, children))
            }
        }
        leaf => leaf,
    }
}

/// Runs `flatten` first, then merges a child's children directly into the
/// parent whenever both carry the same associative operator. Union and
/// inner join collapse; the sided joins stay nested.
pub fn flatten_associative(node: CellTreeNode) -> CellTreeNode {
    let node = flatten(node);
    match node {
        CellTreeNode::Op(op_node) => {
            let op = op_node.op;
            let children: Vec<CellTreeNode> = op_node
                .children
                .into_iter()
                .map(flatten_associative)
                .collect();
            let children = if op.is_associative() {
                children
                    .into_iter()
                    .flat_map(|child| match child {
                        CellTreeNode::Op(c) if c.op == op => c.children,
                        other => vec![other],
                    })
                    .collect()
            } else {
                children
            };
            CellTreeNode::Op(OpCellTreeNode::new(op, children))
        }
        leaf => leaf,
    }
}

/// Depth-first enumeration of every leaf, regardless of tree shape.
pub fn leaves(node: &CellTreeNode) -> Vec<&LeafCellTreeNode> {
    let mut out = Vec::new();
    collect_leaves(node, &mut out);
    out
}

fn collect_leaves<'a>(node: &'a CellTreeNode, out: &mut Vec<&'a LeafCellTreeNode>) {
    match node {
        CellTreeNode::Leaf(leaf) => out.push(leaf),
        CellTreeNode::Op(op_node) => {
            for child in &op_node.children {
                collect_leaves(child, out);
            }
        }
    }
}
