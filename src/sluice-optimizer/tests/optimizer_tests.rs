//! Integration tests for sluice-optimizer
//!
//! End-to-end scenarios for the default rule set plus property tests over
//! randomly generated acyclic dataflows.

use proptest::prelude::*;
use sluice_dataflow::{
    AggregateFn, AggregateOp, Comparison, Dataflow, DataflowBuilder, DataflowOp, FacetOp,
    NodeKind, Predicate,
};
use sluice_optimizer::{Optimizer, OptimizerConfig, Rewrite, optimize};

fn filter_x(p: i64) -> DataflowOp {
    DataflowOp::filter(Predicate::new("x", Comparison::Eq, p))
}

fn count_kind(graph: &Dataflow, kind: NodeKind) -> usize {
    graph.nodes().filter(|node| node.kind() == kind).count()
}

#[test]
fn test_end_to_end_duplicates_and_dead_node() {
    let mut graph = Dataflow::new();
    let f1 = graph.add_node(filter_x(5), &[]).unwrap();
    let f2 = graph.add_node(filter_x(5), &[]).unwrap();
    let root = graph.add_node(DataflowOp::output("R"), &[f1, f2]).unwrap();
    let dead = graph.add_node(filter_x(9), &[]).unwrap();

    let report = optimize(&mut graph).unwrap();

    assert_eq!(count_kind(&graph, NodeKind::Filter), 1);
    assert!(!graph.contains(dead));
    assert_eq!(graph.get(root).unwrap().single_child(), Some(f1));
    assert_eq!(report.rewrites_applied, 2);
    assert!(report.converged);
    assert!(report.warning().is_none());
    assert!(report.passes <= 5);
}

#[test]
fn test_duplicate_merge_redirects_all_consumers() {
    let mut builder = DataflowBuilder::new();
    let s = builder.source("cars");
    let f1 = builder
        .filter(s, Predicate::new("x", Comparison::Eq, 5i64))
        .unwrap();
    let f2 = builder
        .filter(s, Predicate::new("x", Comparison::Eq, 5i64))
        .unwrap();
    let a = builder.output("a", &[f1]).unwrap();
    let b = builder.output("b", &[f2]).unwrap();
    let c = builder.output("c", &[f2]).unwrap();
    let mut graph = builder.build();

    let report = optimize(&mut graph).unwrap();

    assert_eq!(count_kind(&graph, NodeKind::Filter), 1);
    let survivor = if graph.contains(f1) { f1 } else { f2 };
    let consumers = graph.get(survivor).unwrap().parents().clone();
    assert_eq!(consumers.into_iter().collect::<Vec<_>>(), vec![a, b, c]);
    assert_eq!(report.applied_by("DuplicateMerge"), 1);
    assert!(graph.check_links());
}

#[test]
fn test_dead_nodes_gone_after_one_pass() {
    let mut builder = DataflowBuilder::new();
    let s = builder.source("cars");
    let f = builder
        .filter(s, Predicate::new("x", Comparison::Gt, 1i64))
        .unwrap();
    let agg = builder
        .aggregate(f, AggregateOp::new(["x"]).with_field(AggregateFn::Count, "x", "n"))
        .unwrap();
    let other = builder.source("unused");
    let mut graph = builder.build();

    let report = Optimizer::default().optimize_once(&mut graph).unwrap();

    // The aggregate chain dies from the top down within the same pass.
    for id in [s, f, agg, other] {
        assert!(!graph.contains(id));
    }
    assert!(graph.is_empty());
    assert_eq!(report.applied_by("DeadNodeElimination"), 4);
}

#[test]
fn test_long_dead_chain_converges() {
    let mut graph = Dataflow::new();
    let mut top = graph.add_source("s");
    for i in 0..1500 {
        top = graph.add_node(filter_x(i), &[top]).unwrap();
    }

    let optimizer = Optimizer::with_config(
        Optimizer::default_rules(),
        OptimizerConfig::default().with_max_passes(2),
    );
    let report = optimizer.optimize(&mut graph).unwrap();

    assert!(graph.is_empty());
    assert_eq!(report.rewrites_applied, 1501);
    assert_eq!(report.passes, 2);
    assert!(report.converged);
    assert!(report.warning().is_none());
}

#[test]
fn test_reordering_enables_merge() {
    let mut builder = DataflowBuilder::new();
    let s = builder.source("s");
    let pa = Predicate::new("a", Comparison::Gt, 0i64);
    let pb = Predicate::new("b", Comparison::Gt, 0i64);

    // out1 reads b(a(s)), out2 reads a(b(s)).
    let fa1 = builder.filter(s, pa.clone()).unwrap();
    let fb1 = builder.filter(fa1, pb.clone()).unwrap();
    let out1 = builder.output("one", &[fb1]).unwrap();
    let fb2 = builder.filter(s, pb).unwrap();
    let fa2 = builder.filter(fb2, pa).unwrap();
    let out2 = builder.output("two", &[fa2]).unwrap();
    let mut graph = builder.build();

    let report = optimize(&mut graph).unwrap();

    assert!(report.converged);
    assert_eq!(graph.len(), 5);
    assert_eq!(count_kind(&graph, NodeKind::Filter), 2);
    assert_eq!(graph.get(out1).unwrap().single_child(), Some(fb1));
    assert_eq!(graph.get(out2).unwrap().single_child(), Some(fb1));
    assert_eq!(graph.get(fb1).unwrap().single_child(), Some(fa1));
    assert_eq!(graph.get(fa1).unwrap().single_child(), Some(s));
    assert_eq!(report.applied_by("FilterReordering"), 1);
    assert_eq!(report.applied_by("DuplicateMerge"), 2);
}

#[test]
fn test_merge_then_hoist_above_facet() {
    let mut builder = DataflowBuilder::new();
    let s = builder.source("cars");
    let facet = builder.facet(s, FacetOp::new(["origin"])).unwrap();
    let year = Predicate::new("year", Comparison::Ge, 1970i64);
    let f1 = builder.filter(facet, year.clone()).unwrap();
    let f2 = builder.filter(facet, year).unwrap();
    let out1 = builder.output("left", &[f1]).unwrap();
    let out2 = builder.output("right", &[f2]).unwrap();
    let mut graph = builder.build();

    let report = optimize(&mut graph).unwrap();

    assert!(report.converged);
    assert_eq!(report.rewrites_applied, 2);
    assert_eq!(report.applied_by("DuplicateMerge"), 1);
    assert_eq!(report.applied_by("FilterHoisting"), 1);
    assert_eq!(graph.get(out1).unwrap().single_child(), Some(facet));
    assert_eq!(graph.get(out2).unwrap().single_child(), Some(facet));
    assert_eq!(graph.get(facet).unwrap().single_child(), Some(f1));
    assert_eq!(graph.get(f1).unwrap().single_child(), Some(s));
    assert!(!graph.contains(f2));
}

#[test]
fn test_cell_dependent_filter_stays_behind_facet() {
    let mut builder = DataflowBuilder::new();
    let s = builder.source("cars");
    let facet = builder
        .facet(s, FacetOp::new(["origin"]).with_cell_fields(["cell_total"]))
        .unwrap();
    let f = builder
        .filter(facet, Predicate::new("cell_total", Comparison::Gt, 3i64))
        .unwrap();
    let out = builder.output("main", &[f]).unwrap();
    let mut graph = builder.build();
    let before = graph.clone();

    let report = optimize(&mut graph).unwrap();

    assert_eq!(report.rewrites_applied, 0);
    assert_eq!(report.passes, 1);
    assert_eq!(graph, before);
    assert_eq!(graph.get(out).unwrap().single_child(), Some(f));
}

#[test]
fn test_trace_records_every_rewrite() {
    let mut graph = Dataflow::new();
    let f1 = graph.add_node(filter_x(5), &[]).unwrap();
    let f2 = graph.add_node(filter_x(5), &[]).unwrap();
    graph.add_node(DataflowOp::output("R"), &[f1, f2]).unwrap();

    let optimizer = Optimizer::with_config(
        Optimizer::default_rules(),
        OptimizerConfig::default().with_trace(true).with_check_links(true),
    );
    let report = optimizer.optimize(&mut graph).unwrap();

    assert_eq!(report.trace.len(), report.rewrites_applied);
    assert_eq!(report.trace[0].rewrite, Rewrite::MergedInto(f1));
    assert_eq!(report.trace[0].node, f2);
    assert_eq!(report.trace[0].pass, 1);
}

// =========================================================================
// Random dataflows
// =========================================================================

fn arb_op() -> impl Strategy<Value = DataflowOp> {
    prop_oneof![
        3 => ("[ab]", 0i64..2).prop_map(|(field, value)| {
            DataflowOp::filter(Predicate::new(field, Comparison::Eq, value))
        }),
        1 => "[ab]".prop_map(|name| DataflowOp::source(name)),
        1 => prop_oneof![
            Just(FacetOp::new(["g"])),
            Just(FacetOp::new(["g"]).with_cell_fields(["a"])),
        ]
        .prop_map(DataflowOp::facet),
        1 => Just(DataflowOp::aggregate(AggregateOp::new(["a"]))),
        1 => "[ab]".prop_map(|name| DataflowOp::output(name)),
    ]
}

/// Nodes only read from nodes created before them, so the result is acyclic.
fn arb_dataflow() -> impl Strategy<Value = Dataflow> {
    prop::collection::vec(
        (arb_op(), prop::collection::vec(any::<prop::sample::Index>(), 0..3)),
        1..14,
    )
    .prop_map(|specs| {
        let mut graph = Dataflow::new();
        let mut ids = Vec::new();
        for (op, picks) in specs {
            let producers = if ids.is_empty() || matches!(op, DataflowOp::Source(_)) {
                Vec::new()
            } else {
                let mut producers: Vec<_> = picks.iter().map(|p| ids[p.index(ids.len())]).collect();
                producers.sort();
                producers.dedup();
                producers
            };
            if let Ok(id) = graph.add_node(op, &producers) {
                ids.push(id);
            }
        }
        graph
    })
}

proptest! {
    #[test]
    fn test_optimize_terminates_and_keeps_links(mut graph in arb_dataflow()) {
        let outputs = count_kind(&graph, NodeKind::Output);

        let report = optimize(&mut graph).unwrap();

        prop_assert!(report.passes <= 5);
        prop_assert!(report.converged);
        prop_assert!(graph.check_links());
        prop_assert!(graph.topological_order().is_ok());
        prop_assert_eq!(count_kind(&graph, NodeKind::Output), outputs);
    }

    #[test]
    fn test_optimize_is_idempotent(mut graph in arb_dataflow()) {
        optimize(&mut graph).unwrap();
        let once = graph.clone();

        let second = optimize(&mut graph).unwrap();

        prop_assert_eq!(second.rewrites_applied, 0);
        prop_assert_eq!(second.passes, 1);
        prop_assert_eq!(&graph, &once);
    }

    #[test]
    fn test_no_dead_nodes_survive(mut graph in arb_dataflow()) {
        optimize(&mut graph).unwrap();

        for node in graph.nodes() {
            prop_assert!(node.is_root() || !node.parents().is_empty());
        }
    }

    #[test]
    fn test_no_mergeable_siblings_survive(mut graph in arb_dataflow()) {
        optimize(&mut graph).unwrap();

        for node in graph.nodes().filter(|n| !n.is_root()) {
            for parent in node.parents() {
                let parent = graph.get(*parent).unwrap();
                for sibling in parent.children() {
                    let sibling = graph.get(*sibling).unwrap();
                    if sibling.id() != node.id() && !sibling.is_root() {
                        prop_assert!(
                            !(sibling.equals(node) && sibling.children() == node.children())
                        );
                    }
                }
            }
        }
    }
}
