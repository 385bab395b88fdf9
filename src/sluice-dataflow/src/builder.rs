//! Fluent construction of dataflows.

use common_error::SluiceResult;

use crate::graph::Dataflow;
use crate::identifiers::NodeId;
use crate::ops::{AggregateOp, DataflowOp, FacetOp, Predicate};

/// Builder for constructing dataflows node by node.
///
/// Each method adds one node and returns its id so that later nodes can read
/// from it.
#[derive(Debug, Clone, Default)]
pub struct DataflowBuilder {
    graph: Dataflow,
}

impl DataflowBuilder {
    /// Start from an empty dataflow.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a source.
    pub fn source(&mut self, name: impl Into<String>) -> NodeId {
        self.graph.add_source(name)
    }

    /// Add a filter reading from `input`.
    pub fn filter(&mut self, input: NodeId, predicate: Predicate) -> SluiceResult<NodeId> {
        self.graph.add_node(DataflowOp::filter(predicate), &[input])
    }

    /// Add an aggregate reading from `input`.
    pub fn aggregate(&mut self, input: NodeId, aggregate: AggregateOp) -> SluiceResult<NodeId> {
        self.graph.add_node(DataflowOp::aggregate(aggregate), &[input])
    }

    /// Add a facet reading from `input`.
    pub fn facet(&mut self, input: NodeId, facet: FacetOp) -> SluiceResult<NodeId> {
        self.graph.add_node(DataflowOp::facet(facet), &[input])
    }

    /// Add an output reading from `inputs`.
    pub fn output(&mut self, name: impl Into<String>, inputs: &[NodeId]) -> SluiceResult<NodeId> {
        self.graph.add_node(DataflowOp::output(name), inputs)
    }

    /// Add an arbitrary operator.
    pub fn node(&mut self, op: DataflowOp, producers: &[NodeId]) -> SluiceResult<NodeId> {
        self.graph.add_node(op, producers)
    }

    /// Connect two existing nodes.
    pub fn connect(&mut self, parent: NodeId, child: NodeId) -> SluiceResult<&mut Self> {
        self.graph.connect(parent, child)?;
        Ok(self)
    }

    /// The dataflow built so far.
    pub fn graph(&self) -> &Dataflow {
        &self.graph
    }

    /// Finish building.
    pub fn build(self) -> Dataflow {
        self.graph
    }
}
