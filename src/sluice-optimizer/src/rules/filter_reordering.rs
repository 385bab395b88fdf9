//! Canonical ordering of filter chains.

use common_error::SluiceResult;
use sluice_dataflow::{Dataflow, NodeId};

use super::rule::{Rewrite, RewriteRule};

/// Sort adjacent filters into canonical order.
///
/// Filters commute, so a chain of them can be put in any order. Putting the
/// smaller predicate nearer the source makes two chains with the same
/// filters in different orders identical, which lets [`DuplicateMerge`]
/// fold them on a later visit.
///
/// Only exclusive links are reordered: the lower filter must have the upper
/// one as its only consumer, otherwise other consumers would lose rows.
///
/// [`DuplicateMerge`]: super::DuplicateMerge
pub struct FilterReordering;

impl FilterReordering {
    /// The filter below `node` that should trade places with it.
    fn out_of_order_producer(node: NodeId, graph: &Dataflow) -> Option<NodeId> {
        let upper_node = graph.node(node)?;
        let upper = upper_node.op().as_filter()?;
        let lower_id = upper_node.single_child()?;
        let lower_node = graph.node(lower_id)?;
        let lower = lower_node.op().as_filter()?;

        if lower_node.single_parent() != Some(node) || lower.predicate <= upper.predicate {
            return None;
        }
        Some(lower_id)
    }
}

impl RewriteRule for FilterReordering {
    fn name(&self) -> &'static str {
        "FilterReordering"
    }

    fn description(&self) -> &'static str {
        "Order chained filters by predicate so equal chains can be merged"
    }

    fn matches(&self, node: NodeId, graph: &Dataflow) -> bool {
        Self::out_of_order_producer(node, graph).is_some()
    }

    fn apply(&self, node: NodeId, graph: &mut Dataflow) -> SluiceResult<Rewrite> {
        let Some(lower) = Self::out_of_order_producer(node, graph) else {
            return Ok(Rewrite::Unchanged);
        };

        graph.swap_with_child(node, lower)?;
        Ok(Rewrite::Replaced(lower))
    }
}
