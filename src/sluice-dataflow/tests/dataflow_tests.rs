//! Integration tests for sluice-dataflow
//!
//! Random edit sequences check that the graph stays acyclic and
//! link-consistent whatever the caller throws at it.

use common_error::SluiceError;
use proptest::prelude::*;
use sluice_dataflow::debug::{check_links, draw};
use sluice_dataflow::{
    Comparison, Dataflow, DataflowBuilder, DataflowOp, FacetOp, NodeId, NodeKind, Predicate,
};

fn arb_op() -> impl Strategy<Value = DataflowOp> {
    prop_oneof![
        ("[a-c]", 0i64..3).prop_map(|(field, value)| {
            DataflowOp::filter(Predicate::new(field, Comparison::Eq, value))
        }),
        "[a-c]".prop_map(|g| DataflowOp::facet(FacetOp::new([g]))),
        "[a-c]".prop_map(|name| DataflowOp::output(name)),
    ]
}

#[derive(Debug, Clone)]
enum Edit {
    Connect(prop::sample::Index, prop::sample::Index),
    Disconnect(prop::sample::Index, prop::sample::Index),
    Remove(prop::sample::Index),
}

fn arb_edit() -> impl Strategy<Value = Edit> {
    prop_oneof![
        4 => (any::<prop::sample::Index>(), any::<prop::sample::Index>())
            .prop_map(|(a, b)| Edit::Connect(a, b)),
        2 => (any::<prop::sample::Index>(), any::<prop::sample::Index>())
            .prop_map(|(a, b)| Edit::Disconnect(a, b)),
        1 => any::<prop::sample::Index>().prop_map(Edit::Remove),
    ]
}

fn pick(graph: &Dataflow, index: &prop::sample::Index) -> Option<NodeId> {
    let ids = graph.node_ids();
    if ids.is_empty() {
        None
    } else {
        Some(ids[index.index(ids.len())])
    }
}

#[test]
fn test_builder_graph_is_consistent() {
    let mut builder = DataflowBuilder::new();
    let cars = builder.source("cars");
    let facet = builder.facet(cars, FacetOp::new(["origin"])).unwrap();
    let f = builder
        .filter(facet, Predicate::new("year", Comparison::Ge, 1970i64))
        .unwrap();
    let out = builder.output("main", &[f]).unwrap();
    let graph = builder.build();

    assert!(check_links(&graph, &graph.node_ids()));
    assert_eq!(graph.topological_order().unwrap(), vec![out, f, facet, cars]);
    assert_eq!(graph.get(out).unwrap().kind(), NodeKind::Output);
}

#[test]
fn test_cycle_rejection_leaves_graph_unchanged() {
    let mut builder = DataflowBuilder::new();
    let s = builder.source("s");
    let a = builder
        .filter(s, Predicate::new("a", Comparison::Gt, 0i64))
        .unwrap();
    let b = builder
        .filter(a, Predicate::new("b", Comparison::Gt, 0i64))
        .unwrap();
    let mut graph = builder.build();
    let before = graph.clone();

    // b is an ancestor of a, so a may not consume b.
    let err = graph.connect(a, b).unwrap_err();
    assert!(matches!(err, SluiceError::Cycle { .. }));
    assert_eq!(graph, before);
    assert!(graph.check_links());
}

#[test]
fn test_disconnect_absent_edge() {
    let mut graph = Dataflow::new();
    let a = graph.add_source("a");
    let b = graph.add_source("b");

    let err = graph.disconnect(a, b).unwrap_err();
    assert!(matches!(err, SluiceError::EdgeNotFound { parent, child }
        if parent == a.as_u64() && child == b.as_u64()));
    assert!(err.is_recoverable());
}

#[test]
fn test_unknown_nodes() {
    let mut graph = Dataflow::new();
    let a = graph.add_source("a");
    let ghost = NodeId::new(1000);

    assert!(matches!(
        graph.connect(ghost, a).unwrap_err(),
        SluiceError::NodeNotFound(1000)
    ));
    assert!(matches!(
        graph.remove_node(ghost).unwrap_err(),
        SluiceError::NodeNotFound(1000)
    ));
}

#[test]
fn test_draw_lists_reachable_nodes() {
    let mut builder = DataflowBuilder::new();
    let s = builder.source("s");
    let a = builder
        .filter(s, Predicate::new("a", Comparison::Lt, 3i64))
        .unwrap();
    let b = builder
        .filter(s, Predicate::new("b", Comparison::Lt, 3i64))
        .unwrap();
    let out = builder.output("o", &[a, b]).unwrap();
    let graph = builder.build();

    let dot = draw(&graph, &graph.roots());
    for id in [s, a, b, out] {
        assert!(dot.contains(&format!("\"{}\" [label", id.as_u64())));
    }
    assert_eq!(dot.matches("->").count(), 4);
}

proptest! {
    #[test]
    fn test_random_edits_keep_graph_valid(
        ops in prop::collection::vec(arb_op(), 1..10),
        edits in prop::collection::vec(arb_edit(), 0..40),
    ) {
        let mut graph = Dataflow::new();
        for op in ops {
            graph.add_node(op, &[]).unwrap();
        }

        for edit in edits {
            let before = graph.clone();
            let result = match &edit {
                Edit::Connect(a, b) => match (pick(&graph, a), pick(&graph, b)) {
                    (Some(a), Some(b)) => graph.connect(a, b),
                    _ => Ok(()),
                },
                Edit::Disconnect(a, b) => match (pick(&graph, a), pick(&graph, b)) {
                    (Some(a), Some(b)) => graph.disconnect(a, b),
                    _ => Ok(()),
                },
                Edit::Remove(a) => match pick(&graph, a) {
                    Some(a) => graph.remove_node(a).map(|_| ()),
                    None => Ok(()),
                },
            };

            if result.is_err() {
                prop_assert_eq!(&graph, &before);
            }
            prop_assert!(graph.check_links());
            prop_assert!(graph.topological_order().is_ok());
        }
    }

    #[test]
    fn test_topological_order_puts_consumers_first(
        ops in prop::collection::vec(arb_op(), 1..10),
        pairs in prop::collection::vec(
            (any::<prop::sample::Index>(), any::<prop::sample::Index>()),
            0..30,
        ),
    ) {
        let mut graph = Dataflow::new();
        for op in ops {
            graph.add_node(op, &[]).unwrap();
        }
        for (a, b) in &pairs {
            if let (Some(a), Some(b)) = (pick(&graph, a), pick(&graph, b)) {
                let _ = graph.connect(a, b);
            }
        }

        let order = graph.topological_order().unwrap();
        prop_assert_eq!(order.len(), graph.len());
        let position = |id: NodeId| order.iter().position(|x| *x == id).unwrap();
        for node in graph.nodes() {
            for child in node.children() {
                prop_assert!(position(node.id()) < position(*child));
            }
        }
    }
}
