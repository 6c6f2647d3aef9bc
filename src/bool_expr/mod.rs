//! Generic boolean AST, visitor framework, and the `BoolExpression`
//! facade wrapping the domain-tagged instantiation used everywhere else
//! in the engine.

pub mod definitions;
pub mod visitor;

mod as_cql;
mod compact_string;
mod fix_range;
mod is_final;
mod remap;
mod required_slots;
mod term_visitor;
mod user_string;

pub use as_cql::CqlRenderContext;
pub use definitions::{BoolExpr, DomainBoolExpr, DomainConstraint, DomainTerm, DomainVariable};
pub use term_visitor::terms;
pub use visitor::{Fold, Visitor};

use crate::cql::{Assignment, QueryTreeBuilder};
use crate::domain::MemberDomainMap;
use crate::literals::BoolLiteral;
use crate::metadata::MemberPath;
use std::collections::{BTreeMap, BTreeSet};


/// The engine's working boolean expression: a domain-tagged AST over
/// `BoolLiteral` with the transform suite exposed as methods.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BoolExpression {
    expr: DomainBoolExpr,
}

impl BoolExpression {
    pub fn true_() -> Self {
        BoolExpression {
            expr: BoolExpr::True,
        }
    }

    pub fn false_() -> Self {
        BoolExpression {
            expr: BoolExpr::False,
        }
    }

    pub fn from_literal(literal: BoolLiteral) -> Self {
        BoolExpression {
            expr: literal.domain_bool_expr(None),
        }
    }

    /// A literal term whose possible-value universe comes from the
    /// globally known member domains rather than the literal's own.
    pub fn from_literal_with_domains(literal: BoolLiteral, domain_map: &MemberDomainMap) -> Self {
        BoolExpression {
            expr: literal.domain_bool_expr(Some(domain_map)),
        }
    }

    pub fn from_expr(expr: DomainBoolExpr) -> Self {
        BoolExpression { expr }
    }

    pub fn inner(&self) -> &DomainBoolExpr {
        &self.expr
    }

    pub fn is_true(&self) -> bool {
        matches!(self.expr, BoolExpr::True)
    }

    pub fn is_false(&self) -> bool {
        matches!(self.expr, BoolExpr::False)
    }

    pub fn and_(exprs: Vec<BoolExpression>) -> Self {
        BoolExpression {
            expr: BoolExpr::and(exprs.into_iter().map(|e| e.expr).collect()),
        }
    }

    pub fn or_(exprs: Vec<BoolExpression>) -> Self {
        BoolExpression {
            expr: BoolExpr::or(exprs.into_iter().map(|e| e.expr).collect()),
        }
    }

    pub fn not_(self) -> Self {
        BoolExpression {
            expr: BoolExpr::not(self.expr),
        }
    }

    /// Constant folding: True/False children collapse through `And`/`Or`
    /// and double constants through `Not`.
    pub fn simplify(self) -> Self {
        BoolExpression {
            expr: simplify_expr(self.expr),
        }
    }

    pub fn fix_ranges(&self, domain_map: &MemberDomainMap) -> Self {
        BoolExpression {
            expr: fix_range::fix_ranges(self.expr.clone(), domain_map),
        }
    }

    pub fn remap_members(&self, remap: &BTreeMap<MemberPath, MemberPath>) -> Self {
        BoolExpression {
            expr: remap::remap_members(self.expr.clone(), remap),
        }
    }

    pub fn is_final(&self) -> bool {
        is_final::is_final(&self.expr)
    }

    pub fn required_slot_indices(
        &self,
        projection: &BTreeMap<MemberPath, usize>,
    ) -> BTreeSet<usize> {
        required_slots::required_slot_indices(&self.expr, projection)
    }

    pub fn terms(&self, allow_all_operators: bool) -> Vec<&DomainTerm> {
        term_visitor::terms(&self.expr, allow_all_operators)
    }

    pub fn as_cql_text(&self, block_alias: &str) -> String {
        as_cql::as_cql_text(&self.expr, block_alias)
    }

    pub fn as_cqt<B: QueryTreeBuilder>(&self, builder: &mut B, block_alias: &str) -> B::Expr {
        as_cql::as_cqt(&self.expr, builder, block_alias)
    }

    pub fn as_user_string(&self) -> String {
        user_string::as_user_string(&self.expr)
    }

    pub fn to_compact_string(&self) -> String {
        compact_string::to_compact_string(&self.expr)
    }

    /// Reference evaluation against a sample row; used to check that the
    /// two render targets denote the same predicate.
    pub fn evaluate(&self, row: &Assignment) -> bool {
        evaluate_expr(&self.expr, row)
    }
}

fn simplify_expr(expr: DomainBoolExpr) -> DomainBoolExpr {
    match expr {
        BoolExpr::And(children) => {
            let mut kept = Vec::new();
            for child in children.into_iter().map(simplify_expr) {
                match child {
                    BoolExpr::True => {}
                    BoolExpr::False => return BoolExpr::False,
                    other => kept.push(other),
                }
            }
            BoolExpr::and(kept)
        }
        BoolExpr::Or(children) => {
            let mut kept = Vec::new();
            for child in children.into_iter().map(simplify_expr) {
                match child {
                    BoolExpr::False => {}
                    BoolExpr::True => return BoolExpr::True,
                    other => kept.push(other),
                }
            }
            BoolExpr::or(kept)
        }
        BoolExpr::Not(child) => match simplify_expr(*child) {
            BoolExpr::True => BoolExpr::False,
            BoolExpr::False => BoolExpr::True,
            other => BoolExpr::not(other),
        },
        leaf => leaf,
    }
}

fn evaluate_expr(expr: &DomainBoolExpr, row: &Assignment) -> bool {
    match expr {
        BoolExpr::True => true,
        BoolExpr::False => false,
        BoolExpr::Term(term) => term.variable.identifier.satisfied_by(&term.range, row),
        BoolExpr::Not(child) => !evaluate_expr(child, row),
        BoolExpr::And(children) => children.iter().all(|c| evaluate_expr(c, row)),
        BoolExpr::Or(children) => children.iter().any(|c| evaluate_expr(c, row)),
    }
}
