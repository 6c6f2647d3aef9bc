//! The two render targets of the engine: textual CQL fragments and an
//! expression-tree form built through an opaque factory trait. Also the
//! lowered query-block shape (`CqlBlock`) that cell-tree leaves become.

use crate::bool_expr::BoolExpression;
use crate::constants::ScalarValue;
use crate::metadata::{MemberPath, TypeRef};
use crate::slots::ProjectedSlot;
use lazy_static::lazy_static;
use regex::RegexSet;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;


lazy_static! {
    static ref KEYWORDS: RegexSet = RegexSet::new([
        r"(?i)^and$",
        r"(?i)^as$",
        r"(?i)^case$",
        r"(?i)^cast$",
        r"(?i)^deref$",
        r"(?i)^else$",
        r"(?i)^end$",
        r"(?i)^false$",
        r"(?i)^from$",
        r"(?i)^in$",
        r"(?i)^is$",
        r"(?i)^join$",
        r"(?i)^not$",
        r"(?i)^null$",
        r"(?i)^of$",
        r"(?i)^only$",
        r"(?i)^or$",
        r"(?i)^relationship$",
        r"(?i)^select$",
        r"(?i)^then$",
        r"(?i)^true$",
        r"(?i)^union$",
        r"(?i)^when$",
        r"(?i)^where$",
        r"(?i)^with$",
    ])
    .unwrap();
}

fn ident_needs_delimiters(s: &str) -> bool {
    if KEYWORDS.is_match(s) {
        return true;
    }
    let mut chars = s.chars();
    match chars.next() {
        None => true,
        Some(c) if !(c.is_ascii_alphabetic() || c == '_') => true,
        Some(_) => chars.any(|c| !(c.is_ascii_alphanumeric() || c == '_')),
    }
}

/// Delimits an identifier with backticks when it collides with a keyword
/// or contains characters outside the plain identifier grammar.
pub fn quote_identifier(s: &str) -> String {
    if ident_needs_delimiters(s) {
        format!("`{}`", s.replace('`', "``"))
    } else {
        s.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("query block must project at least one slot")]
    EmptyProjection,
    #[error("WITH RELATIONSHIP requires at least one key column for end {0}")]
    RelationshipWithoutKeys(String),
}

type Result<T> = std::result::Result<T, Error>;

/// The opaque expression-tree factory the engine emits through. The
/// boolean-AST renderer calls only this interface and never builds
/// low-level nodes itself.
pub trait QueryTreeBuilder {
    type Expr: Clone;

    fn true_(&mut self) -> Self::Expr;
    fn false_(&mut self) -> Self::Expr;
    fn null(&mut self) -> Self::Expr;
    fn scalar(&mut self, value: &ScalarValue) -> Self::Expr;
    fn property(&mut self, member: &MemberPath, block_alias: &str) -> Self::Expr;
    /// A named boolean column, such as the `__from{N}` cell-id markers.
    fn boolean_column(&mut self, qualified_name: &str) -> Self::Expr;
    fn not(&mut self, e: Self::Expr) -> Self::Expr;
    fn and(&mut self, left: Self::Expr, right: Self::Expr) -> Self::Expr;
    fn or(&mut self, left: Self::Expr, right: Self::Expr) -> Self::Expr;
    fn equal(&mut self, left: Self::Expr, right: Self::Expr) -> Self::Expr;
    fn is_null(&mut self, e: Self::Expr) -> Self::Expr;
    fn is_of_only(&mut self, e: Self::Expr, ty: &TypeRef) -> Self::Expr;
    fn deref(&mut self, e: Self::Expr) -> Self::Expr;
    fn cast_to(&mut self, e: Self::Expr, ty: &TypeRef) -> Self::Expr;
}

/// In-crate expression tree, evaluable against sample row assignments.
/// Backs the dual-renderer equivalence tests and any caller that wants a
/// concrete tree instead of wiring its own factory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryExpr {
    True,
    False,
    Null,
    Scalar(ScalarValue),
    Property(String),
    Not(Box<QueryExpr>),
    And(Box<QueryExpr>, Box<QueryExpr>),
    Or(Box<QueryExpr>, Box<QueryExpr>),
    Equal(Box<QueryExpr>, Box<QueryExpr>),
    IsNull(Box<QueryExpr>),
    IsOfOnly(Box<QueryExpr>, TypeRef),
    Deref(Box<QueryExpr>),
    CastTo(Box<QueryExpr>, TypeRef),
}

/// A sample row: member paths (and boolean columns) to values, `None`
/// meaning null. Property names use the same rendering the builders use.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Assignment {
    values: BTreeMap<String, Option<ScalarValue>>,
}

impl Assignment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_member(mut self, member: &MemberPath, value: Option<ScalarValue>) -> Self {
        self.values.insert(member.to_string(), value);
        self
    }

    pub fn set_column(mut self, name: &str, value: ScalarValue) -> Self {
        self.values.insert(name.to_string(), Some(value));
        self
    }

    fn get(&self, name: &str) -> Option<&Option<ScalarValue>> {
        self.values.get(name)
    }

    pub(crate) fn member_value(&self, member: &MemberPath) -> Option<&Option<ScalarValue>> {
        self.values.get(&member.to_string())
    }

    pub(crate) fn column_value(&self, name: &str) -> Option<&Option<ScalarValue>> {
        self.values.get(name)
    }
}

impl QueryExpr {
    fn eval_value(&self, row: &Assignment) -> Option<ScalarValue> {
        match self {
            QueryExpr::Scalar(v) => Some(v.clone()),
            QueryExpr::Property(name) => row.get(name).cloned().flatten(),
            QueryExpr::Null => None,
            QueryExpr::True => Some(ScalarValue::Bool(true)),
            QueryExpr::False => Some(ScalarValue::Bool(false)),
            _ => None,
        }
    }

    /// Three-valued predicate evaluation; `None` is unknown/null. Type
    /// operations (`IsOfOnly`, `Deref`, `CastTo`) are not evaluable against
    /// a flat row and yield unknown.
    pub fn evaluate(&self, row: &Assignment) -> Option<bool> {
        match self {
            QueryExpr::True => Some(true),
            QueryExpr::False => Some(false),
            QueryExpr::Null => None,
            QueryExpr::Scalar(ScalarValue::Bool(b)) => Some(*b),
            QueryExpr::Scalar(_) => None,
            QueryExpr::Property(name) => match row.get(name) {
                Some(Some(ScalarValue::Bool(b))) => Some(*b),
                _ => None,
            },
            QueryExpr::Not(e) => e.evaluate(row).map(|b| !b),
            QueryExpr::And(l, r) => match (l.evaluate(row), r.evaluate(row)) {
                (Some(false), _) | (_, Some(false)) => Some(false),
                (Some(true), Some(true)) => Some(true),
                _ => None,
            },
            QueryExpr::Or(l, r) => match (l.evaluate(row), r.evaluate(row)) {
                (Some(true), _) | (_, Some(true)) => Some(true),
                (Some(false), Some(false)) => Some(false),
                _ => None,
            },
            QueryExpr::Equal(l, r) => {
                let (lv, rv) = (l.eval_value(row), r.eval_value(row));
                match (lv, rv) {
                    (Some(a), Some(b)) => Some(a == b),
                    _ => None,
                }
            }
            QueryExpr::IsNull(e) => Some(e.eval_value(row).is_none()),
            QueryExpr::IsOfOnly(..) | QueryExpr::Deref(_) | QueryExpr::CastTo(..) => None,
        }
    }
}

impl fmt::Display for QueryExpr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            QueryExpr::True => write!(f, "TRUE"),
            QueryExpr::False => write!(f, "FALSE"),
            QueryExpr::Null => write!(f, "NULL"),
            QueryExpr::Scalar(v) => write!(f, "{v}"),
            QueryExpr::Property(name) => write!(f, "{name}"),
            QueryExpr::Not(e) => write!(f, "NOT({e})"),
            QueryExpr::And(l, r) => write!(f, "({l} AND {r})"),
            QueryExpr::Or(l, r) => write!(f, "({l} OR {r})"),
            QueryExpr::Equal(l, r) => write!(f, "{l} = {r}"),
            QueryExpr::IsNull(e) => write!(f, "{e} IS NULL"),
            QueryExpr::IsOfOnly(e, t) => write!(f, "{e} IS OF (ONLY {t})"),
            QueryExpr::Deref(e) => write!(f, "Deref({e})"),
            QueryExpr::CastTo(e, t) => write!(f, "CAST({e} AS {t})"),
        }
    }
}

/// Factory producing the in-crate `QueryExpr` tree.
#[derive(Debug, Default)]
pub struct QueryExprBuilder;

impl QueryTreeBuilder for QueryExprBuilder {
    type Expr = QueryExpr;

    fn true_(&mut self) -> QueryExpr {
        QueryExpr::True
    }
    fn false_(&mut self) -> QueryExpr {
        QueryExpr::False
    }
    fn null(&mut self) -> QueryExpr {
        QueryExpr::Null
    }
    fn scalar(&mut self, value: &ScalarValue) -> QueryExpr {
        QueryExpr::Scalar(value.clone())
    }
    fn property(&mut self, member: &MemberPath, _block_alias: &str) -> QueryExpr {
        // Property names are keyed on the full member path so that one
        // assignment can drive expressions rendered under any alias.
        QueryExpr::Property(member.to_string())
    }
    fn boolean_column(&mut self, qualified_name: &str) -> QueryExpr {
        QueryExpr::Property(qualified_name.to_string())
    }
    fn not(&mut self, e: QueryExpr) -> QueryExpr {
        QueryExpr::Not(Box::new(e))
    }
    fn and(&mut self, left: QueryExpr, right: QueryExpr) -> QueryExpr {
        QueryExpr::And(Box::new(left), Box::new(right))
    }
    fn or(&mut self, left: QueryExpr, right: QueryExpr) -> QueryExpr {
        QueryExpr::Or(Box::new(left), Box::new(right))
    }
    fn equal(&mut self, left: QueryExpr, right: QueryExpr) -> QueryExpr {
        QueryExpr::Equal(Box::new(left), Box::new(right))
    }
    fn is_null(&mut self, e: QueryExpr) -> QueryExpr {
        QueryExpr::IsNull(Box::new(e))
    }
    fn is_of_only(&mut self, e: QueryExpr, ty: &TypeRef) -> QueryExpr {
        QueryExpr::IsOfOnly(Box::new(e), ty.clone())
    }
    fn deref(&mut self, e: QueryExpr) -> QueryExpr {
        QueryExpr::Deref(Box::new(e))
    }
    fn cast_to(&mut self, e: QueryExpr, ty: &TypeRef) -> QueryExpr {
        QueryExpr::CastTo(Box::new(e), ty.clone())
    }
}

/// A WITH RELATIONSHIP directive attached to a lowered block when a
/// collocated foreign-key association is detected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WithRelationship {
    pub association: String,
    pub to_end_role: String,
    pub to_extent: String,
    pub key_columns: Vec<String>,
}

/// One projected output column of a lowered block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotEntry {
    pub output_name: String,
    pub slot: ProjectedSlot,
}

/// The query block a cell-tree leaf lowers to: a projection over one
/// extent with a membership condition and optional relationship clauses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CqlBlock {
    pub block_alias: String,
    pub extent: String,
    pub slots: Vec<SlotEntry>,
    pub where_clause: BoolExpression,
    pub with_relationships: Vec<WithRelationship>,
}

impl CqlBlock {
    pub fn as_cql_text(&self) -> Result<String> {
        if self.slots.is_empty() {
            return Err(Error::EmptyProjection);
        }
        let projection = self
            .slots
            .iter()
            .map(|entry| {
                Ok(format!(
                    "{} AS {}",
                    entry.slot.as_cql_text(&self.block_alias),
                    quote_identifier(&entry.output_name)
                ))
            })
            .collect::<Result<Vec<_>>>()?
            .join(", ");
        let mut text = format!(
            "SELECT {} FROM {} AS {}",
            projection,
            quote_identifier(&self.extent),
            quote_identifier(&self.block_alias)
        );
        for rel in &self.with_relationships {
            if rel.key_columns.is_empty() {
                return Err(Error::RelationshipWithoutKeys(rel.to_end_role.clone()));
            }
            text.push_str(&format!(
                " WITH RELATIONSHIP {} TO {}",
                quote_identifier(&rel.association),
                quote_identifier(&rel.to_end_role)
            ));
        }
        if !self.where_clause.is_true() {
            text.push_str(&format!(
                " WHERE {}",
                self.where_clause.as_cql_text(&self.block_alias)
            ));
        }
        Ok(text)
    }
}
