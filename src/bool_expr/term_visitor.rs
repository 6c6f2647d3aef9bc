use super::definitions::BoolExpr;

/// Depth-first enumeration of all term literals. Callers working with
/// conjunctions of positive terms must not see `Not` or `Or` nodes; pass
/// `allow_all_operators` to opt into the general shape.
pub fn terms<L>(expr: &BoolExpr<L>, allow_all_operators: bool) -> Vec<&L> {
    let mut out = Vec::new();
    collect(expr, allow_all_operators, &mut out);
    out
}

fn collect<'a, L>(expr: &'a BoolExpr<L>, allow_all_operators: bool, out: &mut Vec<&'a L>) {
    match expr {
        BoolExpr::True | BoolExpr::False => {}
        BoolExpr::Term(l) => out.push(l),
        BoolExpr::Not(child) => {
            debug_assert!(
                allow_all_operators,
                "term enumeration invoked on a tree containing Not"
            );
            collect(child, allow_all_operators, out);
        }
        BoolExpr::And(children) => {
            for child in children {
                collect(child, allow_all_operators, out);
            }
        }
        BoolExpr::Or(children) => {
            debug_assert!(
                allow_all_operators,
                "term enumeration invoked on a tree containing Or"
            );
            for child in children {
                collect(child, allow_all_operators, out);
            }
        }
    }
}
