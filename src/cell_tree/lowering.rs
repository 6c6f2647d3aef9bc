//! Leaf-to-query-block lowering. Two phases: first compute what every
//! required slot will render as (including synthesized defaults and
//! FALSE substitutes for absent boolean conditions), then construct the
//! final immutable block. The wrapper is never patched.

use super::definitions::LeafCellTreeNode;
use crate::bool_expr::BoolExpression;
use crate::constants::CellConstant;
use crate::cql::{CqlBlock, SlotEntry, WithRelationship};
use crate::errorlog::{ErrorLog, Record, ViewGenErrorCode};
use crate::metadata::{AssociationSet, DataSpace, Extent, MemberPath, Multiplicity};
use crate::slots::{BooleanProjectedSlot, ConstantProjectedSlot, MemberProjectedSlot, ProjectedSlot};
use std::collections::BTreeMap;

/// Everything lowering needs to know about the view being generated:
/// the projected member order, which positions are required, how many
/// cells participate (for the boolean marker columns), and the metadata
/// for foreign-key collocation checks.
#[derive(Debug, Clone)]
pub struct LoweringContext {
    pub projected_members: Vec<MemberPath>,
    pub required_member_slots: Vec<bool>,
    pub total_cell_count: usize,
    pub extents: BTreeMap<String, Extent>,
    pub associations: Vec<AssociationSet>,
}

pub fn to_cql_block(
    leaf: &LeafCellTreeNode,
    ctx: &LoweringContext,
    block_alias: &str,
    log: &mut ErrorLog,
) -> CqlBlock {
    debug_assert_eq!(ctx.projected_members.len(), ctx.required_member_slots.len());
    let wrapper = &leaf.wrapper;

    // Phase 1: plan every output column.
    let mut planned: Vec<(String, ProjectedSlot)> = Vec::new();
    for (i, member) in ctx.projected_members.iter().enumerate() {
        if !ctx.required_member_slots[i] {
            continue;
        }
        let slot = match wrapper.member_slots.get(i).and_then(|s| s.as_ref()) {
            Some(slot) => slot.clone(),
            None => ProjectedSlot::Constant(ConstantProjectedSlot {
                value: default_value_for(member, &wrapper.cell_label, log),
            }),
        };
        planned.push((member.accessor(), slot));
    }
    for n in 0..ctx.total_cell_count {
        let expr = wrapper
            .boolean_conditions
            .get(n)
            .and_then(|e| e.as_ref())
            .cloned()
            .unwrap_or_else(BoolExpression::false_);
        planned.push((
            format!("_from{n}"),
            ProjectedSlot::Boolean(BooleanProjectedSlot {
                expr,
                cell_number: n,
            }),
        ));
    }

    let (with_relationships, fk_slots) = collocated_relationships(wrapper.right_extent.as_str(), ctx);
    planned.extend(fk_slots);

    // Phase 2: construct the block.
    CqlBlock {
        block_alias: block_alias.to_string(),
        extent: wrapper.right_extent.clone(),
        slots: planned
            .into_iter()
            .map(|(output_name, slot)| SlotEntry { output_name, slot })
            .collect(),
        where_clause: wrapper.membership_condition.clone().simplify(),
        with_relationships,
    }
}

/// The synthesized constant for a required slot the fragment does not
/// supply: the member's declared default, null when nullable, and null
/// with a logged validation error otherwise.
fn default_value_for(
    member: &MemberPath,
    label: &crate::metadata::CellLabel,
    log: &mut ErrorLog,
) -> CellConstant {
    if let Some(default) = &member.default_value {
        return CellConstant::Scalar(default.clone());
    }
    if member.nullable {
        return CellConstant::Null;
    }
    log.add(Record::error(
        ViewGenErrorCode::NoDefaultValue,
        format!("no default value for required member {member}"),
        vec![label.clone()],
    ));
    CellConstant::Null
}

/// Collocated foreign-key detection for storage-space leaves: when an
/// association has exactly one non-many end mapped onto the same key
/// columns as this extent, and that end's owning type is assignable from
/// the extent's element type, emit its key columns as extra slots plus a
/// WITH RELATIONSHIP directive. Anything else skips silently.
fn collocated_relationships(
    extent_name: &str,
    ctx: &LoweringContext,
) -> (Vec<WithRelationship>, Vec<(String, ProjectedSlot)>) {
    let mut relationships = Vec::new();
    let mut slots = Vec::new();
    let extent = match ctx.extents.get(extent_name) {
        Some(e) if e.space == DataSpace::SSpace => e,
        _ => return (relationships, slots),
    };
    for assoc in &ctx.associations {
        let mut candidates = assoc.ends.iter().filter(|end| {
            end.multiplicity != Multiplicity::Many
                && end.key_columns == extent.key_members
                && end.owning_type.is_assignable_from(&extent.element_type)
        });
        let end = match (candidates.next(), candidates.next()) {
            (Some(end), None) => end,
            _ => continue,
        };
        relationships.push(WithRelationship {
            association: assoc.name.clone(),
            to_end_role: end.role.clone(),
            to_extent: end.extent.clone(),
            key_columns: end.key_columns.clone(),
        });
        for column in &end.key_columns {
            slots.push((
                column.clone(),
                ProjectedSlot::Member(MemberProjectedSlot {
                    path: MemberPath::scalar(extent.name.clone(), vec![column.as_str()], false),
                }),
            ));
        }
    }
    (relationships, slots)
}
