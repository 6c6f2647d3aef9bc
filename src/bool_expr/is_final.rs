use super::definitions::{BoolExpr, DomainBoolExpr, DomainTerm};
use super::visitor::Fold;

/// Constant nodes are final but carry no vote; determined nodes carry
/// their literal's finality.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Finality {
    Constant,
    Determined(bool),
}

struct IsFinalFold;

impl IsFinalFold {
    fn combine(&mut self, children: &[BoolExpr<DomainTerm>]) -> Finality {
        let mut agreed: Option<bool> = None;
        for child in children {
            match child.accept(self) {
                Finality::Constant => {}
                Finality::Determined(b) => match agreed {
                    None => agreed = Some(b),
                    Some(prev) => assert_eq!(
                        prev, b,
                        "AND/OR children mix final and non-final literals; the expression is meaningless"
                    ),
                },
            }
        }
        match agreed {
            None => Finality::Constant,
            Some(b) => Finality::Determined(b),
        }
    }
}

impl Fold<DomainTerm> for IsFinalFold {
    type Output = Finality;

    fn fold_true(&mut self) -> Finality {
        Finality::Constant
    }
    fn fold_false(&mut self) -> Finality {
        Finality::Constant
    }
    fn fold_term(&mut self, literal: &DomainTerm) -> Finality {
        Finality::Determined(literal.variable.identifier.is_final())
    }
    fn fold_not(&mut self, child: &BoolExpr<DomainTerm>) -> Finality {
        child.accept(self)
    }
    fn fold_and(&mut self, children: &[BoolExpr<DomainTerm>]) -> Finality {
        self.combine(children)
    }
    fn fold_or(&mut self, children: &[BoolExpr<DomainTerm>]) -> Finality {
        self.combine(children)
    }
}

/// Whether every restriction in the expression has been completed against
/// its global domain. Mixing final and non-final children under one
/// `And`/`Or` is an invariant violation and panics.
pub fn is_final(expr: &DomainBoolExpr) -> bool {
    match expr.accept(&mut IsFinalFold) {
        Finality::Constant => true,
        Finality::Determined(b) => b,
    }
}
