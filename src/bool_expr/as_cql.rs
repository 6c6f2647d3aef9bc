//! Dual rendering of domain-tagged boolean expressions: textual CQL and
//! the expression-tree form built through `QueryTreeBuilder`. The two
//! paths share the literal-level rendering so they cannot drift.

use super::definitions::{BoolExpr, DomainBoolExpr};
use crate::cql::QueryTreeBuilder;
use itertools::Itertools;

/// Rendering context threaded through the recursion by argument.
/// `skip_is_not_null` is true only while no ancestor was `Or` or `Not`;
/// inside such a context a member restriction may not drop its
/// IS-NOT-NULL guard, because the surrounding expression is no longer
/// conjunction-biased.
#[derive(Debug, Clone, Copy)]
pub struct CqlRenderContext<'a> {
    pub block_alias: &'a str,
    pub skip_is_not_null: bool,
}

impl<'a> CqlRenderContext<'a> {
    pub fn new(block_alias: &'a str) -> Self {
        CqlRenderContext {
            block_alias,
            skip_is_not_null: true,
        }
    }

    fn guarded(self) -> Self {
        CqlRenderContext {
            skip_is_not_null: false,
            ..self
        }
    }
}

pub fn as_cql_text(expr: &DomainBoolExpr, block_alias: &str) -> String {
    render_text(expr, CqlRenderContext::new(block_alias))
}

fn render_text(expr: &DomainBoolExpr, ctx: CqlRenderContext) -> String {
    match expr {
        BoolExpr::True => "TRUE".to_string(),
        BoolExpr::False => "FALSE".to_string(),
        BoolExpr::Term(term) => {
            term.variable
                .identifier
                .render_cql_text(&term.range, &term.variable.domain, ctx)
        }
        BoolExpr::Not(child) => format!("NOT({})", render_text(child, ctx.guarded())),
        BoolExpr::And(children) => format!(
            "({})",
            children.iter().map(|c| render_text(c, ctx)).join(" AND ")
        ),
        BoolExpr::Or(children) => {
            let ctx = ctx.guarded();
            format!(
                "({})",
                children.iter().map(|c| render_text(c, ctx)).join(" OR ")
            )
        }
    }
}

pub fn as_cqt<B: QueryTreeBuilder>(
    expr: &DomainBoolExpr,
    builder: &mut B,
    block_alias: &str,
) -> B::Expr {
    render_cqt(expr, builder, CqlRenderContext::new(block_alias))
}

fn render_cqt<B: QueryTreeBuilder>(
    expr: &DomainBoolExpr,
    builder: &mut B,
    ctx: CqlRenderContext,
) -> B::Expr {
    match expr {
        BoolExpr::True => builder.true_(),
        BoolExpr::False => builder.false_(),
        BoolExpr::Term(term) => {
            term.variable
                .identifier
                .render_cqt(&term.range, &term.variable.domain, builder, ctx)
        }
        BoolExpr::Not(child) => {
            let inner = render_cqt(child, builder, ctx.guarded());
            builder.not(inner)
        }
        BoolExpr::And(children) => {
            assert!(!children.is_empty(), "And node must have children");
            let rendered: Vec<B::Expr> = children
                .iter()
                .map(|c| render_cqt(c, builder, ctx))
                .collect();
            rendered
                .into_iter()
                .reduce(|acc, e| builder.and(acc, e))
                .unwrap()
        }
        BoolExpr::Or(children) => {
            assert!(!children.is_empty(), "Or node must have children");
            let ctx = ctx.guarded();
            let rendered: Vec<B::Expr> = children
                .iter()
                .map(|c| render_cqt(c, builder, ctx))
                .collect();
            rendered
                .into_iter()
                .reduce(|acc, e| builder.or(acc, e))
                .unwrap()
        }
    }
}
