use crate::bool_expr::BoolExpression;
use crate::cell_tree::{CellTreeNode, CellTreeOpType, LeftCellWrapper, LoweringContext};
use crate::constants::{CellConstant, ScalarValue};
use crate::literals::BoolLiteral;
use crate::metadata::{CellLabel, MemberPath};
use crate::result::Error;
use crate::{generate_view_blocks, set};
use std::collections::BTreeMap;

fn int(i: i64) -> CellConstant {
    CellConstant::Scalar(ScalarValue::Int(i))
}

fn kind() -> MemberPath {
    MemberPath::scalar("Customers", vec!["kind"], false)
}

fn id() -> MemberPath {
    MemberPath::scalar("Customers", vec!["id"], false)
}

fn kind_is(i: i64) -> BoolExpression {
    BoolExpression::from_literal(BoolLiteral::scalar_complete(
        kind(),
        set![int(i)],
        set![int(1), int(2)],
    ))
}

fn fragment(cell_number: usize, condition: BoolExpression) -> CellTreeNode {
    let id_slot = crate::slots::ProjectedSlot::Member(crate::slots::MemberProjectedSlot {
        path: id(),
    });
    CellTreeNode::leaf(LeftCellWrapper {
        cell_label: CellLabel::new("Mapping.msl", 1, 1, cell_number),
        right_extent: "Customers".to_string(),
        attributes: set![id(), kind()],
        membership_condition: condition,
        member_slots: vec![Some(id_slot)],
        boolean_conditions: {
            let mut conditions = vec![None, None];
            conditions[cell_number] = Some(BoolExpression::true_());
            conditions
        },
    })
}

fn two_cell_ctx() -> LoweringContext {
    LoweringContext {
        projected_members: vec![id()],
        required_member_slots: vec![true],
        total_cell_count: 2,
        extents: BTreeMap::new(),
        associations: vec![],
    }
}

#[test]
fn every_leaf_becomes_one_block_with_sequential_aliases() {
    let tree = CellTreeNode::op(
        CellTreeOpType::Union,
        vec![fragment(0, kind_is(1)), fragment(1, kind_is(2))],
    );
    let blocks = generate_view_blocks(tree, &two_cell_ctx()).unwrap();
    assert_eq!(blocks.len(), 2);
    assert_eq!(blocks[0].block_alias, "T1");
    assert_eq!(blocks[1].block_alias, "T2");
    assert_eq!(
        blocks[0].as_cql_text().unwrap(),
        "SELECT T1.id AS id, TRUE AS _from0, FALSE AS _from1 \
         FROM Customers AS T1 WHERE T1.kind = 1"
    );
    assert_eq!(
        blocks[1].as_cql_text().unwrap(),
        "SELECT T2.id AS id, FALSE AS _from0, TRUE AS _from1 \
         FROM Customers AS T2 WHERE T2.kind = 2"
    );
}

#[test]
fn degenerate_nesting_is_canonicalized_before_lowering() {
    let tree = CellTreeNode::op(
        CellTreeOpType::Union,
        vec![
            CellTreeNode::op(CellTreeOpType::Union, vec![fragment(0, kind_is(1))]),
            fragment(1, kind_is(2)),
        ],
    );
    let blocks = generate_view_blocks(tree, &two_cell_ctx()).unwrap();
    assert_eq!(blocks.len(), 2);
}

#[test]
fn validation_errors_surface_as_one_failure() {
    let mut ctx = two_cell_ctx();
    ctx.projected_members = vec![id(), kind()];
    ctx.required_member_slots = vec![true, true];
    let tree = CellTreeNode::op(
        CellTreeOpType::Union,
        vec![fragment(0, kind_is(1)), fragment(1, kind_is(2))],
    );
    // Neither fragment supplies `kind`, which is non-nullable and has no
    // default, so both leaves log an error.
    match generate_view_blocks(tree, &ctx) {
        Err(Error::Validation(log)) => {
            assert!(log.has_errors());
            assert_eq!(log.len(), 2);
        }
        other => panic!("expected a validation failure, got {other:?}"),
    }
}
