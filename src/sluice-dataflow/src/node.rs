//! Dataflow nodes.

use std::collections::BTreeSet;

use crate::identifiers::NodeId;
use crate::ops::{DataflowOp, NodeKind};

/// A node in a dataflow graph.
///
/// `parents` are the nodes that consume this node's output and `children`
/// are the nodes it reads from. Both sides of every edge are recorded; the
/// owning [`Dataflow`](crate::Dataflow) keeps them in agreement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataflowNode {
    pub(crate) id: NodeId,
    pub(crate) op: DataflowOp,
    pub(crate) parents: BTreeSet<NodeId>,
    pub(crate) children: BTreeSet<NodeId>,
}

impl DataflowNode {
    pub(crate) fn new(id: NodeId, op: DataflowOp) -> Self {
        Self {
            id,
            op,
            parents: BTreeSet::new(),
            children: BTreeSet::new(),
        }
    }

    /// The node's identity.
    pub const fn id(&self) -> NodeId {
        self.id
    }

    /// The operator this node runs.
    pub const fn op(&self) -> &DataflowOp {
        &self.op
    }

    /// The operator's kind tag.
    pub const fn kind(&self) -> NodeKind {
        self.op.kind()
    }

    /// Consumers of this node.
    pub const fn parents(&self) -> &BTreeSet<NodeId> {
        &self.parents
    }

    /// Producers this node reads from.
    pub const fn children(&self) -> &BTreeSet<NodeId> {
        &self.children
    }

    /// Whether the node is of a root kind.
    pub const fn is_root(&self) -> bool {
        self.kind().is_root()
    }

    /// Whether nothing consumes this node.
    pub fn is_unconsumed(&self) -> bool {
        self.parents.is_empty()
    }

    /// The only producer, if there is exactly one.
    pub fn single_child(&self) -> Option<NodeId> {
        single(&self.children)
    }

    /// The only consumer, if there is exactly one.
    pub fn single_parent(&self) -> Option<NodeId> {
        single(&self.parents)
    }

    /// Same kind and semantically equal parameters.
    ///
    /// Identity and links are ignored; two equal nodes compute the same thing
    /// when fed the same producers.
    pub fn equals(&self, other: &Self) -> bool {
        self.op == other.op
    }
}

fn single(set: &BTreeSet<NodeId>) -> Option<NodeId> {
    let mut iter = set.iter();
    match (iter.next(), iter.next()) {
        (Some(id), None) => Some(*id),
        _ => None,
    }
}
