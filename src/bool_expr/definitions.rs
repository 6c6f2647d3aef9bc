use crate::constants::CellConstant;
use crate::literals::BoolLiteral;
use std::collections::BTreeSet;

/// Generic boolean AST over a literal type `L`. `And`/`Or` nodes always
/// hold at least two children; the smart constructors collapse smaller
/// argument lists. Nodes are never mutated in place; every transform
/// builds new nodes.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BoolExpr<L> {
    True,
    False,
    Term(L),
    Not(Box<BoolExpr<L>>),
    And(Vec<BoolExpr<L>>),
    Or(Vec<BoolExpr<L>>),
}

impl<L> BoolExpr<L> {
    /// Conjunction. Zero children yield `True`, one child collapses to
    /// the child itself.
    pub fn and(children: Vec<BoolExpr<L>>) -> BoolExpr<L> {
        match children.len() {
            0 => BoolExpr::True,
            1 => children.into_iter().next().unwrap(),
            _ => BoolExpr::And(children),
        }
    }

    /// Disjunction. Zero children yield `False`, one child collapses to
    /// the child itself.
    pub fn or(children: Vec<BoolExpr<L>>) -> BoolExpr<L> {
        match children.len() {
            0 => BoolExpr::False,
            1 => children.into_iter().next().unwrap(),
            _ => BoolExpr::Or(children),
        }
    }

    pub fn not(child: BoolExpr<L>) -> BoolExpr<L> {
        BoolExpr::Not(Box::new(child))
    }
}

/// One boolean variable: a literal identifier together with the set of
/// all values it may take.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DomainVariable<L> {
    pub identifier: L,
    pub domain: BTreeSet<CellConstant>,
}

/// A term payload: "variable currently takes a value in `range`".
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DomainConstraint<L> {
    pub variable: DomainVariable<L>,
    pub range: BTreeSet<CellConstant>,
}

impl<L> DomainConstraint<L> {
    pub fn new(variable: DomainVariable<L>, range: BTreeSet<CellConstant>) -> Self {
        assert!(
            !range.is_empty(),
            "empty range must be expressed as the False boolean expression"
        );
        debug_assert!(
            range
                .iter()
                .filter(|c| !matches!(c, CellConstant::Negated(_)))
                .all(|c| variable.domain.contains(c)),
            "term range must be a subset of the variable domain"
        );
        DomainConstraint { variable, range }
    }
}

/// The domain-tagged instantiation the engine works with.
pub type DomainTerm = DomainConstraint<BoolLiteral>;
pub type DomainBoolExpr = BoolExpr<DomainTerm>;
