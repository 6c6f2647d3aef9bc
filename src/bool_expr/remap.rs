use super::definitions::{BoolExpr, DomainBoolExpr, DomainTerm};
use super::visitor::Visitor;
use crate::metadata::MemberPath;
use std::collections::BTreeMap;

struct RemapVisitor<'a> {
    remap: &'a BTreeMap<MemberPath, MemberPath>,
}

impl<'a> Visitor<DomainTerm> for RemapVisitor<'a> {
    fn visit_bool_expr(&mut self, node: DomainBoolExpr) -> DomainBoolExpr {
        match node {
            BoolExpr::Term(term) => {
                let remapped = term.variable.identifier.remap_members(self.remap);
                remapped.domain_bool_expr(None)
            }
            other => other.walk(self),
        }
    }
}

/// Substitutes member paths through every term's literal and re-derives
/// the domain-tagged expression from the remapped literal.
pub fn remap_members(
    expr: DomainBoolExpr,
    remap: &BTreeMap<MemberPath, MemberPath>,
) -> DomainBoolExpr {
    let mut v = RemapVisitor { remap };
    v.visit_bool_expr(expr)
}
