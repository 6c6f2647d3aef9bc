use super::*;
use crate::bool_expr::BoolExpression;
use crate::constants::{CellConstant, ScalarValue};
use crate::cql::WithRelationship;
use crate::errorlog::{ErrorLog, ViewGenErrorCode};
use crate::literals::BoolLiteral;
use crate::metadata::{
    AssociationEnd, AssociationSet, CellLabel, DataSpace, Extent, MemberPath, Multiplicity, TypeRef,
};
use crate::slots::{BooleanProjectedSlot, ConstantProjectedSlot, MemberProjectedSlot, ProjectedSlot};
use crate::{map, set};
use std::collections::BTreeMap;

fn int(i: i64) -> CellConstant {
    CellConstant::Scalar(ScalarValue::Int(i))
}

fn kind() -> MemberPath {
    MemberPath::scalar("Customers", vec!["kind"], false)
}

fn kind_is(i: i64) -> BoolExpression {
    BoolExpression::from_literal(BoolLiteral::scalar_complete(
        kind(),
        set![int(i)],
        set![int(1), int(2), int(3)],
    ))
}

fn wrapper(cell_number: usize) -> LeftCellWrapper {
    LeftCellWrapper {
        cell_label: CellLabel::new("Mapping.msl", 10, 2, cell_number),
        right_extent: "Customers".to_string(),
        attributes: set![kind()],
        membership_condition: kind_is(1),
        member_slots: vec![],
        boolean_conditions: vec![],
    }
}

fn leaf(cell_number: usize) -> CellTreeNode {
    CellTreeNode::leaf(wrapper(cell_number))
}

fn cell_numbers(node: &CellTreeNode) -> Vec<usize> {
    leaves(node)
        .into_iter()
        .map(|l| l.wrapper.cell_label.cell_number)
        .collect()
}

mod flattening {
    use super::*;

    #[test]
    fn single_child_operator_collapses_to_the_child() {
        let tree = CellTreeNode::op(CellTreeOpType::Union, vec![leaf(0)]);
        assert_eq!(flatten(tree), leaf(0));
    }

    #[test]
    fn collapse_works_bottom_up() {
        let tree = CellTreeNode::op(
            CellTreeOpType::Loj,
            vec![CellTreeNode::op(CellTreeOpType::Union, vec![leaf(0)])],
        );
        assert_eq!(flatten(tree), leaf(0));
    }

    #[test]
    fn flatten_is_idempotent() {
        let tree = CellTreeNode::op(
            CellTreeOpType::Ij,
            vec![
                CellTreeNode::op(CellTreeOpType::Union, vec![leaf(0), leaf(1)]),
                CellTreeNode::op(CellTreeOpType::Lasj, vec![leaf(2)]),
            ],
        );
        let once = flatten(tree);
        assert_eq!(flatten(once.clone()), once);
    }

    #[test]
    fn associative_children_merge_into_the_parent() {
        let tree = CellTreeNode::op(
            CellTreeOpType::Ij,
            vec![
                CellTreeNode::op(CellTreeOpType::Ij, vec![leaf(0), leaf(1)]),
                leaf(2),
            ],
        );
        let flat = flatten_associative(tree);
        match &flat {
            CellTreeNode::Op(op) => {
                assert_eq!(op.op, CellTreeOpType::Ij);
                assert_eq!(op.children.len(), 3);
            }
            other => panic!("expected an operator node, got {other:?}"),
        }
        assert_eq!(cell_numbers(&flat), vec![0, 1, 2]);
    }

    #[test]
    fn nested_unions_merge_on_both_sides() {
        let tree = CellTreeNode::op(
            CellTreeOpType::Union,
            vec![
                CellTreeNode::op(CellTreeOpType::Union, vec![leaf(0), leaf(1)]),
                CellTreeNode::op(CellTreeOpType::Union, vec![leaf(2), leaf(3)]),
            ],
        );
        let flat = flatten_associative(tree);
        match &flat {
            CellTreeNode::Op(op) => assert_eq!(op.children.len(), 4),
            other => panic!("expected an operator node, got {other:?}"),
        }
    }

    #[test]
    fn different_operators_stay_nested() {
        let tree = CellTreeNode::op(
            CellTreeOpType::Ij,
            vec![
                CellTreeNode::op(CellTreeOpType::Union, vec![leaf(0), leaf(1)]),
                leaf(2),
            ],
        );
        let flat = flatten_associative(tree);
        match &flat {
            CellTreeNode::Op(op) => {
                assert_eq!(op.op, CellTreeOpType::Ij);
                assert_eq!(op.children.len(), 2);
                assert_eq!(op.children[0].op_type(), CellTreeOpType::Union);
            }
            other => panic!("expected an operator node, got {other:?}"),
        }
    }

    #[test]
    fn sided_joins_never_merge() {
        let tree = CellTreeNode::op(
            CellTreeOpType::Loj,
            vec![
                CellTreeNode::op(CellTreeOpType::Loj, vec![leaf(0), leaf(1)]),
                leaf(2),
            ],
        );
        let flat = flatten_associative(tree);
        match &flat {
            CellTreeNode::Op(op) => {
                assert_eq!(op.children.len(), 2);
                assert_eq!(op.children[0].op_type(), CellTreeOpType::Loj);
            }
            other => panic!("expected an operator node, got {other:?}"),
        }
    }

    #[test]
    fn leaves_enumerate_depth_first() {
        let tree = CellTreeNode::op(
            CellTreeOpType::Foj,
            vec![
                CellTreeNode::op(CellTreeOpType::Union, vec![leaf(3), leaf(1)]),
                leaf(2),
            ],
        );
        assert_eq!(cell_numbers(&tree), vec![3, 1, 2]);
    }
}

mod fragment_queries {
    use super::*;

    #[test]
    fn condition_is_simplified_on_derivation() {
        let mut w = wrapper(0);
        w.membership_condition =
            BoolExpression::and_(vec![BoolExpression::true_(), kind_is(1)]);
        let node = LeafCellTreeNode { wrapper: w.clone() };
        let query = node.fragment_query();
        assert_eq!(query.condition, kind_is(1));
        assert_eq!(query.attributes, w.attributes);
        // The wrapper itself keeps the original condition.
        assert_eq!(
            node.wrapper.membership_condition,
            BoolExpression::and_(vec![BoolExpression::true_(), kind_is(1)])
        );
    }
}

mod lowering {
    use super::*;

    fn id_member() -> MemberPath {
        MemberPath::scalar("Customers", vec!["id"], false)
    }

    fn name_member() -> MemberPath {
        MemberPath::scalar("Customers", vec!["name"], true)
    }

    fn id_slot() -> ProjectedSlot {
        ProjectedSlot::Member(MemberProjectedSlot { path: id_member() })
    }

    fn basic_ctx(projected: Vec<MemberPath>, cells: usize) -> LoweringContext {
        let required = vec![true; projected.len()];
        LoweringContext {
            projected_members: projected,
            required_member_slots: required,
            total_cell_count: cells,
            extents: BTreeMap::new(),
            associations: vec![],
        }
    }

    #[test]
    fn supplied_slots_are_projected_under_their_accessor() {
        let mut w = wrapper(0);
        w.member_slots = vec![Some(id_slot())];
        w.boolean_conditions = vec![Some(kind_is(1))];
        let node = LeafCellTreeNode { wrapper: w };
        let mut log = ErrorLog::new();
        let block = to_cql_block(&node, &basic_ctx(vec![id_member()], 1), "T1", &mut log);
        assert!(log.is_empty());
        assert_eq!(block.block_alias, "T1");
        assert_eq!(block.extent, "Customers");
        assert_eq!(block.slots.len(), 2);
        assert_eq!(block.slots[0].output_name, "id");
        assert_eq!(block.slots[0].slot, id_slot());
        assert_eq!(block.slots[1].output_name, "_from0");
        assert_eq!(
            block.slots[1].slot,
            ProjectedSlot::Boolean(BooleanProjectedSlot {
                expr: kind_is(1),
                cell_number: 0,
            })
        );
    }

    #[test]
    fn nullable_member_without_a_slot_defaults_to_null() {
        let node = LeafCellTreeNode { wrapper: wrapper(0) };
        let mut log = ErrorLog::new();
        let block = to_cql_block(&node, &basic_ctx(vec![name_member()], 0), "T1", &mut log);
        assert!(log.is_empty());
        assert_eq!(
            block.slots[0].slot,
            ProjectedSlot::Constant(ConstantProjectedSlot {
                value: CellConstant::Null,
            })
        );
    }

    #[test]
    fn declared_default_beats_null() {
        let member = id_member().with_default(ScalarValue::Int(7));
        let node = LeafCellTreeNode { wrapper: wrapper(0) };
        let mut log = ErrorLog::new();
        let block = to_cql_block(&node, &basic_ctx(vec![member], 0), "T1", &mut log);
        assert!(log.is_empty());
        assert_eq!(
            block.slots[0].slot,
            ProjectedSlot::Constant(ConstantProjectedSlot { value: int(7) })
        );
    }

    #[test]
    fn missing_required_member_without_default_is_logged() {
        let node = LeafCellTreeNode { wrapper: wrapper(0) };
        let mut log = ErrorLog::new();
        let block = to_cql_block(&node, &basic_ctx(vec![id_member()], 0), "T1", &mut log);
        assert!(log.has_errors());
        assert_eq!(log.records()[0].code, ViewGenErrorCode::NoDefaultValue);
        assert_eq!(log.records()[0].sources, vec![wrapper(0).cell_label]);
        // Lowering still produces a block; the caller decides what to do
        // with the log.
        assert_eq!(block.slots.len(), 1);
    }

    #[test]
    fn unrequired_members_are_skipped() {
        let mut ctx = basic_ctx(vec![id_member(), name_member()], 0);
        ctx.required_member_slots = vec![false, true];
        let node = LeafCellTreeNode { wrapper: wrapper(0) };
        let mut log = ErrorLog::new();
        let block = to_cql_block(&node, &ctx, "T1", &mut log);
        assert_eq!(block.slots.len(), 1);
        assert_eq!(block.slots[0].output_name, "name");
    }

    #[test]
    fn absent_boolean_conditions_project_false() {
        let mut w = wrapper(0);
        w.boolean_conditions = vec![Some(kind_is(1))];
        let node = LeafCellTreeNode { wrapper: w };
        let mut log = ErrorLog::new();
        let block = to_cql_block(&node, &basic_ctx(vec![], 2), "T1", &mut log);
        assert_eq!(block.slots.len(), 2);
        assert_eq!(block.slots[1].output_name, "_from1");
        assert_eq!(
            block.slots[1].slot,
            ProjectedSlot::Boolean(BooleanProjectedSlot {
                expr: BoolExpression::false_(),
                cell_number: 1,
            })
        );
    }

    #[test]
    fn where_clause_is_the_simplified_membership_condition() {
        let mut w = wrapper(0);
        w.membership_condition =
            BoolExpression::and_(vec![kind_is(1), BoolExpression::true_()]);
        w.member_slots = vec![Some(id_slot())];
        let node = LeafCellTreeNode { wrapper: w };
        let mut log = ErrorLog::new();
        let block = to_cql_block(&node, &basic_ctx(vec![id_member()], 0), "T1", &mut log);
        assert_eq!(block.where_clause, kind_is(1));
    }
}

mod collocation {
    use super::*;

    fn orders_extent() -> Extent {
        Extent {
            name: "Orders".to_string(),
            element_type: TypeRef::new("Order"),
            key_members: vec!["id".to_string()],
            space: DataSpace::SSpace,
        }
    }

    fn fk_association(order_multiplicity: Multiplicity) -> AssociationSet {
        AssociationSet {
            name: "FK_Order_Customer".to_string(),
            ends: vec![
                AssociationEnd {
                    role: "Order".to_string(),
                    extent: "Orders".to_string(),
                    owning_type: TypeRef::new("Order"),
                    multiplicity: order_multiplicity,
                    key_columns: vec!["id".to_string()],
                },
                AssociationEnd {
                    role: "Customer".to_string(),
                    extent: "Customers".to_string(),
                    owning_type: TypeRef::new("Customer"),
                    multiplicity: Multiplicity::Many,
                    key_columns: vec!["customer_id".to_string()],
                },
            ],
        }
    }

    fn orders_ctx(associations: Vec<AssociationSet>, space: DataSpace) -> LoweringContext {
        let mut extent = orders_extent();
        extent.space = space;
        LoweringContext {
            projected_members: vec![],
            required_member_slots: vec![],
            total_cell_count: 0,
            extents: map! { "Orders".to_string() => extent },
            associations,
        }
    }

    fn orders_leaf() -> LeafCellTreeNode {
        let mut w = wrapper(0);
        w.right_extent = "Orders".to_string();
        LeafCellTreeNode { wrapper: w }
    }

    #[test]
    fn unique_non_many_end_over_the_key_produces_a_relationship() {
        let ctx = orders_ctx(vec![fk_association(Multiplicity::One)], DataSpace::SSpace);
        let mut log = ErrorLog::new();
        let block = to_cql_block(&orders_leaf(), &ctx, "T1", &mut log);
        assert_eq!(
            block.with_relationships,
            vec![WithRelationship {
                association: "FK_Order_Customer".to_string(),
                to_end_role: "Order".to_string(),
                to_extent: "Orders".to_string(),
                key_columns: vec!["id".to_string()],
            }]
        );
        assert_eq!(block.slots.len(), 1);
        assert_eq!(block.slots[0].output_name, "id");
        assert_eq!(
            block.slots[0].slot,
            ProjectedSlot::Member(MemberProjectedSlot {
                path: MemberPath::scalar("Orders", vec!["id"], false),
            })
        );
    }

    #[test]
    fn many_end_is_never_a_candidate() {
        let ctx = orders_ctx(vec![fk_association(Multiplicity::Many)], DataSpace::SSpace);
        let mut log = ErrorLog::new();
        let block = to_cql_block(&orders_leaf(), &ctx, "T1", &mut log);
        assert!(block.with_relationships.is_empty());
        assert!(block.slots.is_empty());
        assert!(log.is_empty());
    }

    #[test]
    fn ambiguous_candidates_skip_silently() {
        let mut assoc = fk_association(Multiplicity::One);
        assoc.ends[1].multiplicity = Multiplicity::ZeroOrOne;
        assoc.ends[1].key_columns = vec!["id".to_string()];
        assoc.ends[1].owning_type = TypeRef::new("Order");
        let ctx = orders_ctx(vec![assoc], DataSpace::SSpace);
        let mut log = ErrorLog::new();
        let block = to_cql_block(&orders_leaf(), &ctx, "T1", &mut log);
        assert!(block.with_relationships.is_empty());
        assert!(log.is_empty());
    }

    #[test]
    fn conceptual_space_extents_are_ignored() {
        let ctx = orders_ctx(vec![fk_association(Multiplicity::One)], DataSpace::CSpace);
        let mut log = ErrorLog::new();
        let block = to_cql_block(&orders_leaf(), &ctx, "T1", &mut log);
        assert!(block.with_relationships.is_empty());
    }

    #[test]
    fn derived_owning_types_still_match() {
        let order = TypeRef::new("Order");
        let mut assoc = fk_association(Multiplicity::One);
        assoc.ends[0].owning_type = order.clone();
        let mut ctx = orders_ctx(vec![assoc], DataSpace::SSpace);
        ctx.extents.get_mut("Orders").unwrap().element_type =
            TypeRef::derived_from("RushOrder", &order);
        let mut log = ErrorLog::new();
        let block = to_cql_block(&orders_leaf(), &ctx, "T1", &mut log);
        assert_eq!(block.with_relationships.len(), 1);
    }
}
