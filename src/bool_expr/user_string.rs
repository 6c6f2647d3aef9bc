use super::definitions::{BoolExpr, DomainBoolExpr};
use itertools::Itertools;

/// Human-readable rendering for diagnostics. A `Not` over a single term
/// asks the literal for its own negated form instead of wrapping textual
/// `NOT(...)` around the positive rendering.
pub fn as_user_string(expr: &DomainBoolExpr) -> String {
    match expr {
        BoolExpr::True => "TRUE".to_string(),
        BoolExpr::False => "FALSE".to_string(),
        BoolExpr::Term(term) => term.variable.identifier.render_user_string(&term.range, false),
        BoolExpr::Not(child) => match child.as_ref() {
            BoolExpr::Term(term) => {
                term.variable.identifier.render_user_string(&term.range, true)
            }
            _ => format!("NOT({})", as_user_string(child)),
        },
        BoolExpr::And(children) => format!(
            "({})",
            children.iter().map(as_user_string).join(" AND ")
        ),
        BoolExpr::Or(children) => {
            format!("({})", children.iter().map(as_user_string).join(" OR "))
        }
    }
}
