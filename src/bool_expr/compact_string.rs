use super::definitions::{BoolExpr, DomainBoolExpr};

/// Canonical order-independent rendering used for equality and
/// diagnostics comparison. Each `And`/`Or` child renders into its own
/// buffer and the buffers are sorted before joining, so two expressions
/// differing only in child order produce the same string.
pub fn to_compact_string(expr: &DomainBoolExpr) -> String {
    match expr {
        BoolExpr::True => "True".to_string(),
        BoolExpr::False => "False".to_string(),
        BoolExpr::Term(term) => term.variable.identifier.render_compact(&term.range),
        BoolExpr::Not(child) => format!("!({})", to_compact_string(child)),
        BoolExpr::And(children) => {
            let mut parts: Vec<String> = children.iter().map(to_compact_string).collect();
            parts.sort();
            format!("({})", parts.join(" AND "))
        }
        BoolExpr::Or(children) => {
            let mut parts: Vec<String> = children.iter().map(to_compact_string).collect();
            parts.sort();
            format!("({})", parts.join(" OR "))
        }
    }
}
