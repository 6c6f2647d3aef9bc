//! Symbolic constants appearing in mapping conditions: concrete scalar
//! literals, type tags, the null sentinel, and negated value sets. These
//! are the atoms the domain layer and the boolean literals range over.

use crate::{cql::QueryTreeBuilder, metadata::TypeRef};
use std::collections::BTreeSet;
use std::fmt;


/// One concrete literal value. Doubles and other non-totally-ordered
/// payloads are deliberately absent; mapping conditions only ever
/// discriminate on exact values.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ScalarValue {
    Bool(bool),
    Int(i64),
    Str(String),
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ScalarValue::Bool(b) => write!(f, "{b}"),
            ScalarValue::Int(i) => write!(f, "{i}"),
            ScalarValue::Str(s) => write!(f, "'{}'", s.replace('\'', "''")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CellConstant {
    /// The SQL/CLR null sentinel.
    Null,
    /// Marks "no value assigned"; must never reach rendered output.
    Undefined,
    /// "Any value not enumerated elsewhere"; blocks optimization and must
    /// never reach rendered output.
    AllOtherConstants,
    Scalar(ScalarValue),
    TypeTag(TypeRef),
    Negated(NegatedConstant),
}

/// "Anything except `elements`". The element set never contains a nested
/// `Negated`; constructing one is a caller bug.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NegatedConstant {
    elements: BTreeSet<CellConstant>,
}

impl CellConstant {
    /// Sugar for `Negated({Null})`.
    pub fn not_null() -> CellConstant {
        CellConstant::Negated(NegatedConstant::new([CellConstant::Null].into_iter().collect()))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellConstant::Null)
    }

    pub fn is_not_null(&self) -> bool {
        match self {
            CellConstant::Negated(n) => {
                n.elements.len() == 1 && n.elements.contains(&CellConstant::Null)
            }
            _ => false,
        }
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, CellConstant::Undefined)
    }

    /// Whether this constant asserts non-nullness, i.e. is a negated set
    /// containing `Null`.
    pub fn has_not_null(&self) -> bool {
        match self {
            CellConstant::Negated(n) => n.elements.contains(&CellConstant::Null),
            _ => false,
        }
    }

    /// Whether a row value satisfies this constant. `None` is the null
    /// value. Type tags never match a scalar assignment.
    pub fn matches(&self, value: Option<&ScalarValue>) -> bool {
        match self {
            CellConstant::Null => value.is_none(),
            CellConstant::Scalar(s) => value == Some(s),
            CellConstant::Negated(n) => n.elements.iter().all(|e| !e.matches(value)),
            // A type tag matches a row that carries the type name as its
            // discriminator value.
            CellConstant::TypeTag(t) => {
                matches!(value, Some(ScalarValue::Str(s)) if s == &t.name)
            }
            CellConstant::Undefined | CellConstant::AllOtherConstants => false,
        }
    }

    /// Textual CQL fragment for this constant as a comparison operand.
    pub fn as_cql_text(&self) -> String {
        match self {
            CellConstant::Null => "NULL".to_string(),
            CellConstant::Scalar(s) => s.to_string(),
            CellConstant::TypeTag(t) => t.name.clone(),
            _ => panic!("cannot render {self:?} as CQL text"),
        }
    }

    pub fn as_cqt<B: QueryTreeBuilder>(&self, builder: &mut B) -> B::Expr {
        match self {
            CellConstant::Null => builder.null(),
            CellConstant::Scalar(s) => builder.scalar(s),
            _ => panic!("cannot render {self:?} as a query expression"),
        }
    }

    pub fn to_user_string(&self) -> String {
        match self {
            CellConstant::Null => "NULL".to_string(),
            CellConstant::Scalar(s) => s.to_string(),
            CellConstant::TypeTag(t) => t.name.clone(),
            CellConstant::Negated(n) => {
                let inner = n.elements.iter().map(|e| e.to_user_string()).collect::<Vec<_>>();
                format!("NOT({})", inner.join(", "))
            }
            _ => panic!("cannot render {self:?} for user output"),
        }
    }

    pub fn to_compact_string(&self) -> String {
        match self {
            CellConstant::Null => "NULL".to_string(),
            CellConstant::Undefined => "?".to_string(),
            CellConstant::AllOtherConstants => "OTHER".to_string(),
            CellConstant::Scalar(s) => s.to_string(),
            CellConstant::TypeTag(t) => t.name.clone(),
            CellConstant::Negated(n) => {
                let inner = n.elements.iter().map(|e| e.to_compact_string()).collect::<Vec<_>>();
                format!("!({})", inner.join(","))
            }
        }
    }
}

/// Receives the pieces of a simplified negated-set rendering. The text
/// renderer and the expression-tree renderer each provide one; the
/// simplification below is shared so the two targets cannot drift.
pub trait NegationSink {
    fn emit_true(&mut self);
    fn emit_is_not_null(&mut self);
    fn emit_not_equal(&mut self, constant: &CellConstant);
}

impl NegatedConstant {
    pub fn new(elements: BTreeSet<CellConstant>) -> Self {
        assert!(
            !elements.iter().any(|e| matches!(e, CellConstant::Negated(_))),
            "negated constant must not contain a negated constant; flatten first"
        );
        assert!(!elements.is_empty(), "negated constant requires at least one element");
        NegatedConstant { elements }
    }

    pub fn elements(&self) -> &BTreeSet<CellConstant> {
        &self.elements
    }

    pub fn contains(&self, constant: &CellConstant) -> bool {
        self.elements.contains(constant)
    }

    /// Renders this negated set minimally. `positives` are the values the
    /// surrounding expression already asserts positively for the same
    /// member; each must occur in the negated set and is subtracted before
    /// rendering. An empty remainder means every possibility is accounted
    /// for and the rendering collapses to TRUE. `Null` in the remainder
    /// becomes an IS-NOT-NULL emission, as does a nullable member unless
    /// the caller's context makes the check redundant.
    pub fn emit_simplified<S: NegationSink>(
        &self,
        positives: &[CellConstant],
        member_nullable: bool,
        skip_is_not_null: bool,
        sink: &mut S,
    ) {
        let mut remainder = self.elements.clone();
        for p in positives {
            let removed = remainder.remove(p);
            assert!(removed, "positive value {p:?} not present in negated set");
        }
        if remainder.is_empty() {
            sink.emit_true();
            return;
        }
        let had_null = remainder.remove(&CellConstant::Null);
        if had_null || (member_nullable && !skip_is_not_null) {
            sink.emit_is_not_null();
        }
        for c in &remainder {
            assert!(
                !matches!(c, CellConstant::Undefined | CellConstant::AllOtherConstants),
                "cannot render {c:?} inside a negated set"
            );
            sink.emit_not_equal(c);
        }
    }
}
