//! The boolean atoms of the engine. A literal identifies one proposition
//! ("member takes a value in this set", "row came from cell N") and knows
//! how to turn itself into a domain-tagged term and how to render itself
//! to each target.

use crate::bool_expr::{BoolExpr, CqlRenderContext, DomainBoolExpr, DomainConstraint, DomainVariable};
use crate::constants::{CellConstant, NegationSink, ScalarValue};
use crate::cql::{Assignment, QueryTreeBuilder};
use crate::domain::{Domain, MemberDomainMap};
use crate::metadata::MemberPath;
use crate::slots::MemberProjectedSlot;
use itertools::Itertools;
use std::collections::{BTreeMap, BTreeSet};


#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BoolLiteral {
    /// `member ∈ values` over scalar constants.
    ScalarRestriction(MemberRestriction),
    /// `member IS OF (ONLY type)` discrimination over type tags.
    TypeRestriction(MemberRestriction),
    /// The true/false-valued "row came from cell N" marker, optionally
    /// qualified by the block it originates from.
    CellId(CellIdBoolean),
}

/// "Member ∈ values" with a possibly incomplete universe. Incomplete
/// restrictions (built before the member's full domain is known) support
/// equality, hashing, and identifier comparison only; they must be
/// completed before rendering or range fixing.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MemberRestriction {
    slot: MemberProjectedSlot,
    domain: Domain,
    complete: bool,
}

impl MemberRestriction {
    /// Single-value incomplete restriction: `member = value`.
    pub fn equal(slot: MemberProjectedSlot, value: CellConstant) -> Self {
        MemberRestriction {
            slot,
            domain: Domain::incomplete([value].into_iter().collect()),
            complete: false,
        }
    }

    /// Multi-value incomplete restriction: `member ∈ values`.
    pub fn within(slot: MemberProjectedSlot, values: BTreeSet<CellConstant>) -> Self {
        MemberRestriction {
            slot,
            domain: Domain::incomplete(values),
            complete: false,
        }
    }

    /// Complete restriction with an independently supplied universe.
    pub fn complete(
        slot: MemberProjectedSlot,
        values: BTreeSet<CellConstant>,
        universe: BTreeSet<CellConstant>,
    ) -> Self {
        MemberRestriction {
            slot,
            domain: Domain::new(values, universe),
            complete: true,
        }
    }

    pub fn make_complete(&self, universe: &BTreeSet<CellConstant>) -> Self {
        MemberRestriction {
            slot: self.slot.clone(),
            domain: self.domain.make_complete(universe),
            complete: true,
        }
    }

    pub fn member(&self) -> &MemberPath {
        &self.slot.path
    }

    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    fn assert_complete(&self, operation: &str) {
        assert!(
            self.complete,
            "{operation} requires a complete restriction for {}",
            self.slot.path
        );
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CellIdBoolean {
    pub cell_number: usize,
    pub qualifier: Option<String>,
}

impl CellIdBoolean {
    pub fn column_name(&self) -> String {
        match &self.qualifier {
            Some(q) => format!("{}._from{}", q, self.cell_number),
            None => format!("_from{}", self.cell_number),
        }
    }
}

fn bool_constant(b: bool) -> CellConstant {
    CellConstant::Scalar(ScalarValue::Bool(b))
}

fn two_element_bool_domain() -> BTreeSet<CellConstant> {
    [bool_constant(true), bool_constant(false)]
        .into_iter()
        .collect()
}

impl BoolLiteral {
    pub fn scalar_equal(member: MemberPath, value: CellConstant) -> Self {
        BoolLiteral::ScalarRestriction(MemberRestriction::equal(
            MemberProjectedSlot { path: member },
            value,
        ))
    }

    pub fn scalar_within(member: MemberPath, values: BTreeSet<CellConstant>) -> Self {
        BoolLiteral::ScalarRestriction(MemberRestriction::within(
            MemberProjectedSlot { path: member },
            values,
        ))
    }

    pub fn scalar_complete(
        member: MemberPath,
        values: BTreeSet<CellConstant>,
        universe: BTreeSet<CellConstant>,
    ) -> Self {
        BoolLiteral::ScalarRestriction(MemberRestriction::complete(
            MemberProjectedSlot { path: member },
            values,
            universe,
        ))
    }

    pub fn type_of(
        member: MemberPath,
        types: BTreeSet<CellConstant>,
        universe: BTreeSet<CellConstant>,
    ) -> Self {
        BoolLiteral::TypeRestriction(MemberRestriction::complete(
            MemberProjectedSlot { path: member },
            types,
            universe,
        ))
    }

    pub fn cell_id(cell_number: usize) -> Self {
        BoolLiteral::CellId(CellIdBoolean {
            cell_number,
            qualifier: None,
        })
    }

    pub fn qualified_cell_id<S: Into<String>>(cell_number: usize, qualifier: S) -> Self {
        BoolLiteral::CellId(CellIdBoolean {
            cell_number,
            qualifier: Some(qualifier.into()),
        })
    }

    /// Completes an incomplete member restriction against a global
    /// universe. Cell-id literals are always complete.
    pub fn make_complete(&self, universe: &BTreeSet<CellConstant>) -> Self {
        match self {
            BoolLiteral::ScalarRestriction(r) => {
                BoolLiteral::ScalarRestriction(r.make_complete(universe))
            }
            BoolLiteral::TypeRestriction(r) => {
                BoolLiteral::TypeRestriction(r.make_complete(universe))
            }
            BoolLiteral::CellId(_) => self.clone(),
        }
    }

    /// Whether this literal can appear in a final (fully reconciled)
    /// expression: any literal that is not a member restriction, or a
    /// restriction whose universe has been completed.
    pub fn is_final(&self) -> bool {
        match self {
            BoolLiteral::ScalarRestriction(r) | BoolLiteral::TypeRestriction(r) => r.complete,
            BoolLiteral::CellId(_) => true,
        }
    }

    /// Identifier equality: same variable regardless of the asserted
    /// range. Detects "same member, different value" collisions.
    pub fn is_identifier_eq(&self, other: &BoolLiteral) -> bool {
        match (self, other) {
            (BoolLiteral::ScalarRestriction(a), BoolLiteral::ScalarRestriction(b))
            | (BoolLiteral::TypeRestriction(a), BoolLiteral::TypeRestriction(b)) => {
                a.slot.path == b.slot.path
            }
            (BoolLiteral::CellId(a), BoolLiteral::CellId(b)) => {
                a.cell_number == b.cell_number && a.qualifier == b.qualifier
            }
            _ => false,
        }
    }

    /// The member path this literal restricts, if any.
    pub fn restricted_member(&self) -> Option<&MemberPath> {
        match self {
            BoolLiteral::ScalarRestriction(r) | BoolLiteral::TypeRestriction(r) => {
                Some(&r.slot.path)
            }
            BoolLiteral::CellId(_) => None,
        }
    }

    pub fn remap_members(&self, remap: &BTreeMap<MemberPath, MemberPath>) -> Self {
        let remap_restriction = |r: &MemberRestriction| MemberRestriction {
            slot: MemberProjectedSlot {
                path: remap
                    .get(&r.slot.path)
                    .cloned()
                    .unwrap_or_else(|| r.slot.path.clone()),
            },
            domain: r.domain.clone(),
            complete: r.complete,
        };
        match self {
            BoolLiteral::ScalarRestriction(r) => {
                BoolLiteral::ScalarRestriction(remap_restriction(r))
            }
            BoolLiteral::TypeRestriction(r) => BoolLiteral::TypeRestriction(remap_restriction(r)),
            BoolLiteral::CellId(_) => self.clone(),
        }
    }

    /// Builds the domain-tagged term for this literal. When a domain map
    /// is supplied the variable's universe comes from the globally known
    /// member domain, not from the literal's own (possibly incomplete)
    /// universe; this is how partial knowledge gets reconciled once all
    /// fragments have been seen.
    pub fn domain_bool_expr(&self, domain_map: Option<&MemberDomainMap>) -> DomainBoolExpr {
        match self {
            BoolLiteral::ScalarRestriction(r) | BoolLiteral::TypeRestriction(r) => {
                let universe = domain_map
                    .and_then(|m| m.get(&r.slot.path))
                    .map(|d| d.all_possible_values().clone())
                    .unwrap_or_else(|| r.domain.all_possible_values().clone());
                BoolExpr::Term(DomainConstraint::new(
                    DomainVariable {
                        identifier: self.clone(),
                        domain: universe,
                    },
                    r.domain.values().clone(),
                ))
            }
            BoolLiteral::CellId(_) => BoolExpr::Term(DomainConstraint::new(
                DomainVariable {
                    identifier: self.clone(),
                    domain: two_element_bool_domain(),
                },
                [bool_constant(true)].into_iter().collect(),
            )),
        }
    }

    /// Re-derives this literal's term for a corrected range against the
    /// globally known domains. Member restrictions must be complete. A
    /// cell-id literal takes a single-value range and wraps the positive
    /// term in `Not` when that value is `false`.
    pub fn fix_range(
        &self,
        range: &BTreeSet<CellConstant>,
        domain_map: &MemberDomainMap,
    ) -> DomainBoolExpr {
        match self {
            BoolLiteral::ScalarRestriction(r) => {
                r.assert_complete("fix_range");
                Self::fixed_restriction_term(r, range, domain_map, BoolLiteral::ScalarRestriction)
            }
            BoolLiteral::TypeRestriction(r) => {
                r.assert_complete("fix_range");
                Self::fixed_restriction_term(r, range, domain_map, BoolLiteral::TypeRestriction)
            }
            BoolLiteral::CellId(_) => {
                assert_eq!(
                    range.len(),
                    1,
                    "cell-id range must select exactly one of true/false"
                );
                let positive = self.domain_bool_expr(None);
                if range.contains(&bool_constant(false)) {
                    BoolExpr::not(positive)
                } else {
                    positive
                }
            }
        }
    }

    fn fixed_restriction_term(
        restriction: &MemberRestriction,
        range: &BTreeSet<CellConstant>,
        domain_map: &MemberDomainMap,
        wrap: fn(MemberRestriction) -> BoolLiteral,
    ) -> DomainBoolExpr {
        let universe = domain_map
            .get(&restriction.slot.path)
            .map(|d| d.all_possible_values().clone())
            .unwrap_or_else(|| restriction.domain.all_possible_values().clone());
        let rebuilt = MemberRestriction {
            slot: restriction.slot.clone(),
            domain: Domain::new(range.clone(), universe.clone()),
            complete: true,
        };
        let literal = wrap(rebuilt);
        BoolExpr::Term(DomainConstraint::new(
            DomainVariable {
                identifier: literal,
                domain: universe,
            },
            range.clone(),
        ))
    }

    pub fn render_cql_text(
        &self,
        range: &BTreeSet<CellConstant>,
        _universe: &BTreeSet<CellConstant>,
        ctx: CqlRenderContext,
    ) -> String {
        match self {
            BoolLiteral::ScalarRestriction(r) => {
                r.assert_complete("CQL rendering");
                render_scalar_text(&r.slot.path, range, ctx)
            }
            BoolLiteral::TypeRestriction(r) => {
                r.assert_complete("CQL rendering");
                render_type_text(&r.slot.path, range, ctx)
            }
            BoolLiteral::CellId(c) => c.column_name(),
        }
    }

    pub fn render_cqt<B: QueryTreeBuilder>(
        &self,
        range: &BTreeSet<CellConstant>,
        _universe: &BTreeSet<CellConstant>,
        builder: &mut B,
        ctx: CqlRenderContext,
    ) -> B::Expr {
        match self {
            BoolLiteral::ScalarRestriction(r) => {
                r.assert_complete("CQT rendering");
                render_scalar_cqt(&r.slot.path, range, builder, ctx)
            }
            BoolLiteral::TypeRestriction(r) => {
                r.assert_complete("CQT rendering");
                render_type_cqt(&r.slot.path, range, builder, ctx)
            }
            BoolLiteral::CellId(c) => builder.boolean_column(&c.column_name()),
        }
    }

    pub fn render_user_string(&self, range: &BTreeSet<CellConstant>, negated: bool) -> String {
        match self {
            BoolLiteral::ScalarRestriction(r) | BoolLiteral::TypeRestriction(r) => {
                let values = range.iter().map(|c| c.to_user_string()).join(", ");
                let op = if negated { "NOT IN" } else { "IN" };
                format!("{} {} {{{}}}", r.slot.path, op, values)
            }
            BoolLiteral::CellId(c) => {
                if negated {
                    format!("not from cell {}", c.cell_number)
                } else {
                    format!("from cell {}", c.cell_number)
                }
            }
        }
    }

    pub fn render_compact(&self, range: &BTreeSet<CellConstant>) -> String {
        match self {
            BoolLiteral::ScalarRestriction(r) | BoolLiteral::TypeRestriction(r) => {
                let values = range.iter().map(|c| c.to_compact_string()).join(",");
                format!("{}({})", r.slot.path, values)
            }
            BoolLiteral::CellId(c) => match &c.qualifier {
                Some(q) => format!("{}.from{}", q, c.cell_number),
                None => format!("from{}", c.cell_number),
            },
        }
    }

    /// Whether a sample row satisfies this literal for the given range.
    pub fn satisfied_by(&self, range: &BTreeSet<CellConstant>, row: &Assignment) -> bool {
        match self {
            BoolLiteral::ScalarRestriction(r) | BoolLiteral::TypeRestriction(r) => {
                let value = row
                    .member_value(&r.slot.path)
                    .and_then(|v| v.as_ref());
                range.iter().any(|c| c.matches(value))
            }
            BoolLiteral::CellId(c) => matches!(
                row.column_value(&c.column_name()),
                Some(Some(ScalarValue::Bool(true)))
            ),
        }
    }
}

struct TextNegationSink<'a> {
    member: &'a str,
    parts: Vec<String>,
}

impl<'a> NegationSink for TextNegationSink<'a> {
    fn emit_true(&mut self) {
        self.parts.push("TRUE".to_string());
    }
    fn emit_is_not_null(&mut self) {
        self.parts.push(format!("{} IS NOT NULL", self.member));
    }
    fn emit_not_equal(&mut self, constant: &CellConstant) {
        self.parts
            .push(format!("{} <> {}", self.member, constant.as_cql_text()));
    }
}

fn find_negated(range: &BTreeSet<CellConstant>) -> Option<&crate::constants::NegatedConstant> {
    range.iter().find_map(|c| match c {
        CellConstant::Negated(n) => Some(n),
        _ => None,
    })
}

fn positive_values(range: &BTreeSet<CellConstant>) -> Vec<CellConstant> {
    range
        .iter()
        .filter(|c| !matches!(c, CellConstant::Negated(_)))
        .cloned()
        .collect()
}

fn render_scalar_text(
    member: &MemberPath,
    range: &BTreeSet<CellConstant>,
    ctx: CqlRenderContext,
) -> String {
    let qualified = member.qualified(ctx.block_alias);
    if let Some(negated) = find_negated(range) {
        let positives = positive_values(range);
        let mut sink = TextNegationSink {
            member: &qualified,
            parts: vec![],
        };
        negated.emit_simplified(&positives, member.nullable, ctx.skip_is_not_null, &mut sink);
        let negated_text = if sink.parts.len() > 1 {
            format!("({})", sink.parts.join(" AND "))
        } else {
            sink.parts.pop().unwrap()
        };
        // A positive Null cannot ride on subtraction alone: a null row
        // never satisfies the rendered inequalities, so the IS NULL
        // disjunct must be emitted explicitly.
        if range.contains(&CellConstant::Null) {
            format!("({qualified} IS NULL OR {negated_text})")
        } else {
            negated_text
        }
    } else {
        let mut parts = Vec::new();
        if range.contains(&CellConstant::Null) {
            parts.push(format!("{qualified} IS NULL"));
        }
        let scalars: Vec<&CellConstant> = range
            .iter()
            .filter(|c| matches!(c, CellConstant::Scalar(_)))
            .collect();
        match scalars.len() {
            0 => {}
            1 => parts.push(format!("{qualified} = {}", scalars[0].as_cql_text())),
            _ => parts.push(format!(
                "{qualified} IN ({})",
                scalars.iter().map(|c| c.as_cql_text()).join(", ")
            )),
        }
        assert!(
            !parts.is_empty(),
            "scalar restriction range for {member} holds nothing renderable"
        );
        if parts.len() > 1 {
            format!("({})", parts.join(" OR "))
        } else {
            parts.pop().unwrap()
        }
    }
}

/// The type tags of a type-restriction range; anything else in the set is
/// a caller bug.
fn type_tags(constants: &BTreeSet<CellConstant>) -> Vec<&crate::metadata::TypeRef> {
    constants
        .iter()
        .map(|c| match c {
            CellConstant::TypeTag(t) => t,
            other => panic!("type restriction range holds non-type constant {other:?}"),
        })
        .collect()
}

fn render_type_text(
    member: &MemberPath,
    range: &BTreeSet<CellConstant>,
    ctx: CqlRenderContext,
) -> String {
    let qualified = member.qualified(ctx.block_alias);
    let join_is_of = |tags: Vec<&crate::metadata::TypeRef>| -> String {
        assert!(!tags.is_empty(), "type restriction range is empty");
        let parts: Vec<String> = tags
            .into_iter()
            .map(|t| format!("{qualified} IS OF (ONLY {})", t.name))
            .collect();
        if parts.len() > 1 {
            format!("({})", parts.join(" OR "))
        } else {
            parts.into_iter().next().unwrap()
        }
    };
    if let Some(negated) = find_negated(range) {
        format!("NOT({})", join_is_of(type_tags(negated.elements())))
    } else {
        join_is_of(type_tags(range))
    }
}

fn render_scalar_cqt<B: QueryTreeBuilder>(
    member: &MemberPath,
    range: &BTreeSet<CellConstant>,
    builder: &mut B,
    ctx: CqlRenderContext,
) -> B::Expr {
    if let Some(negated) = find_negated(range) {
        let positives = positive_values(range);
        let mut parts: Vec<B::Expr> = Vec::new();
        {
            let mut sink = CqtNegationSink {
                builder: &mut *builder,
                member,
                block_alias: ctx.block_alias,
                parts: &mut parts,
            };
            negated.emit_simplified(&positives, member.nullable, ctx.skip_is_not_null, &mut sink);
        }
        let negated_expr = parts
            .into_iter()
            .reduce(|acc, e| builder.and(acc, e))
            .expect("negated rendering emitted nothing");
        if range.contains(&CellConstant::Null) {
            let prop = builder.property(member, ctx.block_alias);
            let is_null = builder.is_null(prop);
            builder.or(is_null, negated_expr)
        } else {
            negated_expr
        }
    } else {
        let mut parts: Vec<B::Expr> = Vec::new();
        if range.contains(&CellConstant::Null) {
            let prop = builder.property(member, ctx.block_alias);
            parts.push(builder.is_null(prop));
        }
        for c in range.iter().filter(|c| matches!(c, CellConstant::Scalar(_))) {
            let prop = builder.property(member, ctx.block_alias);
            let value = c.as_cqt(builder);
            parts.push(builder.equal(prop, value));
        }
        parts
            .into_iter()
            .reduce(|acc, e| builder.or(acc, e))
            .unwrap_or_else(|| {
                panic!("scalar restriction range for {member} holds nothing renderable")
            })
    }
}

fn render_type_cqt<B: QueryTreeBuilder>(
    member: &MemberPath,
    range: &BTreeSet<CellConstant>,
    builder: &mut B,
    ctx: CqlRenderContext,
) -> B::Expr {
    fn join_is_of<B: QueryTreeBuilder>(
        tags: Vec<&crate::metadata::TypeRef>,
        member: &MemberPath,
        builder: &mut B,
        block_alias: &str,
    ) -> B::Expr {
        let parts: Vec<B::Expr> = tags
            .into_iter()
            .map(|t| {
                let prop = builder.property(member, block_alias);
                builder.is_of_only(prop, t)
            })
            .collect();
        parts
            .into_iter()
            .reduce(|acc, e| builder.or(acc, e))
            .expect("type restriction range is empty")
    }
    if let Some(negated) = find_negated(range) {
        let inner = join_is_of(type_tags(negated.elements()), member, builder, ctx.block_alias);
        builder.not(inner)
    } else {
        join_is_of(type_tags(range), member, builder, ctx.block_alias)
    }
}

struct CqtNegationSink<'a, B: QueryTreeBuilder> {
    builder: &'a mut B,
    member: &'a MemberPath,
    block_alias: &'a str,
    parts: &'a mut Vec<B::Expr>,
}

impl<'a, B: QueryTreeBuilder> NegationSink for CqtNegationSink<'a, B> {
    fn emit_true(&mut self) {
        let e = self.builder.true_();
        self.parts.push(e);
    }
    fn emit_is_not_null(&mut self) {
        let prop = self.builder.property(self.member, self.block_alias);
        let is_null = self.builder.is_null(prop);
        let e = self.builder.not(is_null);
        self.parts.push(e);
    }
    fn emit_not_equal(&mut self, constant: &CellConstant) {
        let prop = self.builder.property(self.member, self.block_alias);
        let value = constant.as_cqt(self.builder);
        let eq = self.builder.equal(prop, value);
        let e = self.builder.not(eq);
        self.parts.push(e);
    }
}
