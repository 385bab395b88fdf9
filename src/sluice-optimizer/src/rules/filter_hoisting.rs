//! Filter hoisting across facets.

use common_error::SluiceResult;
use sluice_dataflow::{Dataflow, NodeId};

use super::rule::{Rewrite, RewriteRule};

/// Move filters from behind a facet to in front of it.
///
/// A filter that reads a facet's cells repeats its work once per cell.
/// When the filter is the facet's only consumer and its predicate reads no
/// per-cell field, filtering before the partitioning gives the same rows in
/// every cell, so the two nodes trade places.
///
/// # Example
///
/// Before:
/// ```text
/// Output[main]
///   └─ Filter[year > 1970]
///        └─ Facet[by origin]
///             └─ Source[cars]
/// ```
///
/// After:
/// ```text
/// Output[main]
///   └─ Facet[by origin]
///        └─ Filter[year > 1970]
///             └─ Source[cars]
/// ```
pub struct FilterHoisting;

impl FilterHoisting {
    /// The facet below `node` that the filter may move in front of.
    fn hoistable_facet(node: NodeId, graph: &Dataflow) -> Option<NodeId> {
        let filter_node = graph.node(node)?;
        let filter = filter_node.op().as_filter()?;
        let facet_id = filter_node.single_child()?;
        let facet_node = graph.node(facet_id)?;
        let facet = facet_node.op().as_facet()?;

        if facet_node.single_parent() != Some(node) || facet.is_cell_field(filter.field()) {
            return None;
        }
        Some(facet_id)
    }
}

impl RewriteRule for FilterHoisting {
    fn name(&self) -> &'static str {
        "FilterHoisting"
    }

    fn description(&self) -> &'static str {
        "Run row filters before facet partitioning when they read no per-cell state"
    }

    fn matches(&self, node: NodeId, graph: &Dataflow) -> bool {
        Self::hoistable_facet(node, graph).is_some()
    }

    fn apply(&self, node: NodeId, graph: &mut Dataflow) -> SluiceResult<Rewrite> {
        let Some(facet) = Self::hoistable_facet(node, graph) else {
            return Ok(Rewrite::Unchanged);
        };

        graph.swap_with_child(node, facet)?;
        Ok(Rewrite::Replaced(facet))
    }
}
