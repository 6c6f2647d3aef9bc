//! Traversal abstractions over `BoolExpr`. `Visitor` is the rewriting
//! form: override only the cases you transform and let `walk` recurse
//! structurally through the rest. `Fold` is the general form: every case
//! must be handled and the output type is arbitrary.

use super::definitions::BoolExpr;

pub trait Visitor<L>: Sized {
    fn visit_bool_expr(&mut self, node: BoolExpr<L>) -> BoolExpr<L> {
        node.walk(self)
    }
}

impl<L> BoolExpr<L> {
    pub fn walk<V: Visitor<L>>(self, visitor: &mut V) -> BoolExpr<L> {
        match self {
            BoolExpr::Not(child) => BoolExpr::Not(Box::new(visitor.visit_bool_expr(*child))),
            BoolExpr::And(children) => BoolExpr::And(
                children
                    .into_iter()
                    .map(|c| visitor.visit_bool_expr(c))
                    .collect(),
            ),
            BoolExpr::Or(children) => BoolExpr::Or(
                children
                    .into_iter()
                    .map(|c| visitor.visit_bool_expr(c))
                    .collect(),
            ),
            leaf => leaf,
        }
    }
}

pub trait Fold<L> {
    type Output;

    fn fold_true(&mut self) -> Self::Output;
    fn fold_false(&mut self) -> Self::Output;
    fn fold_term(&mut self, literal: &L) -> Self::Output;
    fn fold_not(&mut self, child: &BoolExpr<L>) -> Self::Output;
    fn fold_and(&mut self, children: &[BoolExpr<L>]) -> Self::Output;
    fn fold_or(&mut self, children: &[BoolExpr<L>]) -> Self::Output;
}

impl<L> BoolExpr<L> {
    pub fn accept<F: Fold<L>>(&self, fold: &mut F) -> F::Output {
        match self {
            BoolExpr::True => fold.fold_true(),
            BoolExpr::False => fold.fold_false(),
            BoolExpr::Term(l) => fold.fold_term(l),
            BoolExpr::Not(child) => fold.fold_not(child),
            BoolExpr::And(children) => fold.fold_and(children),
            BoolExpr::Or(children) => fold.fold_or(children),
        }
    }
}
