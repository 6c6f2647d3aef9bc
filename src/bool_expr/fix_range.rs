use super::definitions::{BoolExpr, DomainBoolExpr, DomainTerm};
use super::visitor::Visitor;
use crate::domain::MemberDomainMap;

struct FixRangeVisitor<'a> {
    domain_map: &'a MemberDomainMap,
}

impl<'a> Visitor<DomainTerm> for FixRangeVisitor<'a> {
    fn visit_bool_expr(&mut self, node: DomainBoolExpr) -> DomainBoolExpr {
        match node {
            BoolExpr::Term(term) => term
                .variable
                .identifier
                .fix_range(&term.range, self.domain_map),
            other => other.walk(self),
        }
    }
}

/// Rewrites every term against the now-known per-member domains: each
/// literal re-derives its expression with the map's universe standing in
/// for whatever partial universe it was built with.
pub fn fix_ranges(expr: DomainBoolExpr, domain_map: &MemberDomainMap) -> DomainBoolExpr {
    let mut v = FixRangeVisitor { domain_map };
    v.visit_bool_expr(expr)
}
