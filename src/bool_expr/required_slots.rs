use super::definitions::{BoolExpr, DomainBoolExpr};
use crate::metadata::MemberPath;
use std::collections::{BTreeMap, BTreeSet};

/// The projection-slot indices referenced by any term in the expression.
/// Returns the index set directly; callers project into whatever slot
/// bookkeeping they own.
pub fn required_slot_indices(
    expr: &DomainBoolExpr,
    projection: &BTreeMap<MemberPath, usize>,
) -> BTreeSet<usize> {
    let mut indices = BTreeSet::new();
    collect(expr, projection, &mut indices);
    indices
}

fn collect(
    expr: &DomainBoolExpr,
    projection: &BTreeMap<MemberPath, usize>,
    indices: &mut BTreeSet<usize>,
) {
    match expr {
        BoolExpr::True | BoolExpr::False => {}
        BoolExpr::Term(term) => {
            if let Some(member) = term.variable.identifier.restricted_member() {
                if let Some(&index) = projection.get(member) {
                    indices.insert(index);
                }
            }
        }
        BoolExpr::Not(child) => collect(child, projection, indices),
        BoolExpr::And(children) | BoolExpr::Or(children) => {
            for child in children {
                collect(child, projection, indices);
            }
        }
    }
}
