//! Dead node elimination.

use common_error::SluiceResult;
use sluice_dataflow::{Dataflow, NodeId};

use super::rule::{Rewrite, RewriteRule};

/// Remove nodes whose output nobody consumes.
///
/// A node with no parents that is not of a root kind contributes nothing to
/// any output. Removing it may leave its producers unconsumed in turn; they
/// are picked up when the walk restarts.
pub struct DeadNodeElimination;

impl RewriteRule for DeadNodeElimination {
    fn name(&self) -> &'static str {
        "DeadNodeElimination"
    }

    fn description(&self) -> &'static str {
        "Remove non-output nodes that have no consumers"
    }

    fn matches(&self, node: NodeId, graph: &Dataflow) -> bool {
        graph
            .node(node)
            .is_some_and(|n| !n.is_root() && n.is_unconsumed())
    }

    fn apply(&self, node: NodeId, graph: &mut Dataflow) -> SluiceResult<Rewrite> {
        if !self.matches(node, graph) {
            return Ok(Rewrite::Unchanged);
        }
        graph.remove_node(node)?;
        Ok(Rewrite::Removed)
    }
}
