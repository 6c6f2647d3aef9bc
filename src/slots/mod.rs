//! Projected slots: where each output column of a lowered query block
//! draws its value from. Created during cell-tree lowering, rendered
//! once by the block, never mutated afterwards.

use crate::bool_expr::BoolExpression;
use crate::constants::CellConstant;
use crate::cql::QueryTreeBuilder;
use crate::metadata::MemberPath;
use itertools::Itertools;


#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ProjectedSlot {
    Member(MemberProjectedSlot),
    Constant(ConstantProjectedSlot),
    Boolean(BooleanProjectedSlot),
    CaseStatement(CaseStatementProjectedSlot),
}

/// A member-path reference, e.g. `T1.Address.City`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MemberProjectedSlot {
    pub path: MemberPath,
}

/// A constant output value, used for defaulted or absent columns.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ConstantProjectedSlot {
    pub value: CellConstant,
}

/// A boolean cell-id marker column: the rendered membership condition of
/// one cell, `FALSE` when the fragment contributes nothing.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BooleanProjectedSlot {
    pub expr: BoolExpression,
    pub cell_number: usize,
}

/// A CASE statement reconciling one member across several fragments.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CaseStatementProjectedSlot {
    pub member: MemberPath,
    pub when_then: Vec<(BoolExpression, ProjectedSlot)>,
    pub else_slot: Option<Box<ProjectedSlot>>,
}

impl ProjectedSlot {
    pub fn as_cql_text(&self, block_alias: &str) -> String {
        match self {
            ProjectedSlot::Member(m) => m.path.qualified(block_alias),
            ProjectedSlot::Constant(c) => c.value.as_cql_text(),
            ProjectedSlot::Boolean(b) => b.expr.as_cql_text(block_alias),
            ProjectedSlot::CaseStatement(c) => {
                let whens = c
                    .when_then
                    .iter()
                    .map(|(cond, slot)| {
                        format!(
                            "WHEN {} THEN {}",
                            cond.as_cql_text(block_alias),
                            slot.as_cql_text(block_alias)
                        )
                    })
                    .join(" ");
                match &c.else_slot {
                    Some(e) => format!("CASE {} ELSE {} END", whens, e.as_cql_text(block_alias)),
                    None => format!("CASE {} END", whens),
                }
            }
        }
    }

    /// The expression-tree form. CASE statements lower to a right-nested
    /// chain of condition picks, which is how the builder interface
    /// expresses them without a dedicated case node.
    pub fn as_cqt<B: QueryTreeBuilder>(&self, builder: &mut B, block_alias: &str) -> B::Expr {
        match self {
            ProjectedSlot::Member(m) => builder.property(&m.path, block_alias),
            ProjectedSlot::Constant(c) => c.value.as_cqt(builder),
            ProjectedSlot::Boolean(b) => b.expr.as_cqt(builder, block_alias),
            ProjectedSlot::CaseStatement(c) => {
                let mut result = match &c.else_slot {
                    Some(e) => e.as_cqt(builder, block_alias),
                    None => builder.null(),
                };
                for (cond, slot) in c.when_then.iter().rev() {
                    let cond_expr = cond.as_cqt(builder, block_alias);
                    let then_expr = slot.as_cqt(builder, block_alias);
                    // cond AND then, OR'd with the accumulated fallback:
                    // the closest tree shape the boolean-only builder
                    // surface offers for a conditional pick.
                    let picked = builder.and(cond_expr, then_expr);
                    result = builder.or(picked, result);
                }
                result
            }
        }
    }
}
