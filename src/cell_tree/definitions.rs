use crate::bool_expr::BoolExpression;
use crate::metadata::{CellLabel, MemberPath};
use crate::slots::ProjectedSlot;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CellTreeOpType {
    Leaf,
    Union,
    /// Full outer join.
    Foj,
    /// Left outer join.
    Loj,
    /// Inner join.
    Ij,
    /// Left anti semi join.
    Lasj,
}

impl CellTreeOpType {
    /// Only these operators may be collapsed into flat n-ary nodes; the
    /// join variants with sided semantics must stay nested.
    pub fn is_associative(&self) -> bool {
        matches!(self, CellTreeOpType::Union | CellTreeOpType::Ij)
    }
}

/// One mapping fragment as seen from the side being generated: its
/// source tag, target extent, the members it covers, its membership
/// condition, and the slots it supplies per projected position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeftCellWrapper {
    pub cell_label: CellLabel,
    pub right_extent: String,
    pub attributes: BTreeSet<MemberPath>,
    pub membership_condition: BoolExpression,
    /// Indexed by projected member position; `None` where the fragment
    /// does not supply a value.
    pub member_slots: Vec<Option<ProjectedSlot>>,
    /// Indexed by cell number; `None` where the fragment carries no
    /// condition for that cell's boolean marker.
    pub boolean_conditions: Vec<Option<BoolExpression>>,
}

/// The boolean applicability query a leaf derives from its wrapper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FragmentQuery {
    pub attributes: BTreeSet<MemberPath>,
    pub condition: BoolExpression,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellTreeNode {
    Leaf(LeafCellTreeNode),
    Op(OpCellTreeNode),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeafCellTreeNode {
    pub wrapper: LeftCellWrapper,
}

/// Internal node: immutable snapshot; rewrites build new instances.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpCellTreeNode {
    pub op: CellTreeOpType,
    pub children: Vec<CellTreeNode>,
}

impl OpCellTreeNode {
    pub fn new(op: CellTreeOpType, children: Vec<CellTreeNode>) -> Self {
        assert!(op != CellTreeOpType::Leaf, "operator node cannot carry the Leaf tag");
        assert!(!children.is_empty(), "operator node requires at least one child");
        OpCellTreeNode { op, children }
    }
}

impl CellTreeNode {
    pub fn leaf(wrapper: LeftCellWrapper) -> Self {
        CellTreeNode::Leaf(LeafCellTreeNode { wrapper })
    }

    pub fn op(op: CellTreeOpType, children: Vec<CellTreeNode>) -> Self {
        CellTreeNode::Op(OpCellTreeNode::new(op, children))
    }

    pub fn op_type(&self) -> CellTreeOpType {
        match self {
            CellTreeNode::Leaf(_) => CellTreeOpType::Leaf,
            CellTreeNode::Op(node) => node.op,
        }
    }
}

impl LeafCellTreeNode {
    /// Derived on demand; the wrapper itself stays untouched.
    pub fn fragment_query(&self) -> FragmentQuery {
        FragmentQuery {
            attributes: self.wrapper.attributes.clone(),
            condition: self.wrapper.membership_condition.clone().simplify(),
        }
    }
}
