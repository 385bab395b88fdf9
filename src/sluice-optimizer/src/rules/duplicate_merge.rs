//! Duplicate merge.

use std::collections::BTreeSet;

use common_error::SluiceResult;
use sluice_dataflow::{Dataflow, NodeId};

use super::rule::{Rewrite, RewriteRule};

/// Merge sibling nodes that compute the same thing.
///
/// Two nodes are duplicates when they are equal (same kind, same parameters)
/// and read from exactly the same producers. They must also be siblings:
/// they share a consumer, or they share their (non-empty) producers. The
/// later node is folded into the earliest duplicate: its consumers are
/// redirected to the survivor and the node is removed. Root nodes are never
/// merged.
pub struct DuplicateMerge;

impl DuplicateMerge {
    /// The earliest node that `node` can be merged into.
    fn survivor(node: NodeId, graph: &Dataflow) -> Option<NodeId> {
        let current = graph.node(node)?;
        if current.is_root() {
            return None;
        }

        let mut siblings = BTreeSet::new();
        for parent in current.parents() {
            if let Some(p) = graph.node(*parent) {
                siblings.extend(p.children().iter().copied());
            }
        }
        for child in current.children() {
            if let Some(c) = graph.node(*child) {
                siblings.extend(c.parents().iter().copied());
            }
        }

        siblings
            .into_iter()
            .filter(|candidate| *candidate < node)
            .find(|candidate| {
                graph.node(*candidate).is_some_and(|other| {
                    !other.is_root()
                        && other.equals(current)
                        && other.children() == current.children()
                })
            })
    }
}

impl RewriteRule for DuplicateMerge {
    fn name(&self) -> &'static str {
        "DuplicateMerge"
    }

    fn description(&self) -> &'static str {
        "Merge equal sibling nodes that read from the same producers"
    }

    fn matches(&self, node: NodeId, graph: &Dataflow) -> bool {
        Self::survivor(node, graph).is_some()
    }

    fn apply(&self, node: NodeId, graph: &mut Dataflow) -> SluiceResult<Rewrite> {
        let Some(survivor) = Self::survivor(node, graph) else {
            return Ok(Rewrite::Unchanged);
        };

        graph.redirect_parents(node, survivor)?;
        graph.remove_node(node)?;
        Ok(Rewrite::MergedInto(survivor))
    }
}
