//! The dataflow graph.
//!
//! A [`Dataflow`] owns every node in an arena keyed by [`NodeId`]. All edits go
//! through methods that check their preconditions first and only then touch
//! both ends of the affected edges, so a failed call leaves the graph exactly
//! as it was and the two link directions never disagree.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, BTreeSet, HashSet};

use common_display::{DisplayTree, TreeNode};
use common_error::{SluiceError, SluiceResult};
use log::{trace, warn};

use crate::debug;
use crate::identifiers::NodeId;
use crate::node::DataflowNode;
use crate::ops::DataflowOp;

/// A directed acyclic graph of dataflow operators.
///
/// Edges point from consumers (parents) to producers (children). Nodes of a
/// root kind are the graph's outputs.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Dataflow {
    pub(crate) nodes: BTreeMap<NodeId, DataflowNode>,
    next_id: u64,
}

impl Dataflow {
    /// Create an empty dataflow.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node reading from `producers` and return its fresh identity.
    ///
    /// Producers are validated before anything is inserted. Sources read
    /// from nothing, so giving one producers is an error.
    pub fn add_node(&mut self, op: DataflowOp, producers: &[NodeId]) -> SluiceResult<NodeId> {
        for producer in producers {
            self.get(*producer)?;
        }
        if matches!(op, DataflowOp::Source(_)) && !producers.is_empty() {
            return Err(SluiceError::invalid_parameter(
                "source nodes cannot read from producers",
            ));
        }

        self.next_id += 1;
        let id = NodeId::new(self.next_id);
        let mut node = DataflowNode::new(id, op);
        node.children.extend(producers.iter().copied());
        for producer in &node.children {
            if let Some(child) = self.nodes.get_mut(producer) {
                child.parents.insert(id);
            }
        }
        trace!("Added node {id} {}", node.op);
        self.nodes.insert(id, node);

        Ok(id)
    }

    /// Add a source node. Sources read from nothing, so this cannot fail.
    pub fn add_source(&mut self, name: impl Into<String>) -> NodeId {
        self.next_id += 1;
        let id = NodeId::new(self.next_id);
        let node = DataflowNode::new(id, DataflowOp::source(name));
        trace!("Added node {id} {}", node.op);
        self.nodes.insert(id, node);
        id
    }

    /// Look up a node.
    pub fn node(&self, id: NodeId) -> Option<&DataflowNode> {
        self.nodes.get(&id)
    }

    /// Look up a node, failing with `NodeNotFound`.
    pub fn get(&self, id: NodeId) -> SluiceResult<&DataflowNode> {
        self.nodes
            .get(&id)
            .ok_or_else(|| SluiceError::node_not_found(id))
    }

    /// Whether the node belongs to this graph.
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the graph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterate over all nodes in id order.
    pub fn nodes(&self) -> impl Iterator<Item = &DataflowNode> {
        self.nodes.values()
    }

    /// All node ids in id order.
    pub fn node_ids(&self) -> Vec<NodeId> {
        self.nodes.keys().copied().collect()
    }

    /// Nodes of a root kind.
    pub fn roots(&self) -> Vec<NodeId> {
        self.nodes
            .values()
            .filter(|node| node.is_root())
            .map(DataflowNode::id)
            .collect()
    }

    /// Whether two nodes compute the same thing (see [`DataflowNode::equals`]).
    pub fn equals(&self, a: NodeId, b: NodeId) -> SluiceResult<bool> {
        Ok(self.get(a)?.equals(self.get(b)?))
    }

    /// Whether `descendant` can be reached from `ancestor` by following
    /// producer links. A node is not its own ancestor.
    pub fn is_ancestor(&self, ancestor: NodeId, descendant: NodeId) -> bool {
        let mut stack: Vec<NodeId> = match self.nodes.get(&ancestor) {
            Some(node) => node.children.iter().copied().collect(),
            None => return false,
        };
        let mut seen = HashSet::new();

        while let Some(id) = stack.pop() {
            if id == descendant {
                return true;
            }
            if !seen.insert(id) {
                continue;
            }
            if let Some(node) = self.nodes.get(&id) {
                stack.extend(node.children.iter().copied());
            }
        }

        false
    }

    /// Make `parent` consume `child`.
    ///
    /// Fails with `Cycle` when `child` already reaches `parent` (or they are
    /// the same node). Connecting an existing edge changes nothing.
    pub fn connect(&mut self, parent: NodeId, child: NodeId) -> SluiceResult<()> {
        self.get(child)?;
        if self.get(parent)?.children.contains(&child) {
            warn!("Attempt to connect {parent} -> {child} twice");
            return Ok(());
        }
        if parent == child || self.is_ancestor(child, parent) {
            return Err(SluiceError::cycle(parent, child));
        }

        self.link(parent, child);
        Ok(())
    }

    /// Remove the edge `parent -> child`.
    pub fn disconnect(&mut self, parent: NodeId, child: NodeId) -> SluiceResult<()> {
        self.get(child)?;
        if !self.get(parent)?.children.contains(&child) {
            return Err(SluiceError::edge_not_found(parent, child));
        }

        self.unlink(parent, child);
        Ok(())
    }

    /// Remove a node together with every edge touching it.
    pub fn remove_node(&mut self, id: NodeId) -> SluiceResult<DataflowNode> {
        let node = self
            .nodes
            .remove(&id)
            .ok_or_else(|| SluiceError::node_not_found(id))?;

        for parent in &node.parents {
            if let Some(p) = self.nodes.get_mut(parent) {
                p.children.remove(&id);
            }
        }
        for child in &node.children {
            if let Some(c) = self.nodes.get_mut(child) {
                c.parents.remove(&id);
            }
        }
        trace!("Removed node {id} {}", node.op);

        Ok(node)
    }

    /// Move every consumer of `from` over to `to`.
    ///
    /// All new edges are checked for cycles before any of them is made.
    pub fn redirect_parents(&mut self, from: NodeId, to: NodeId) -> SluiceResult<()> {
        self.get(to)?;
        let parents: Vec<NodeId> = self.get(from)?.parents.iter().copied().collect();

        for parent in &parents {
            if *parent == to || self.is_ancestor(to, *parent) {
                return Err(SluiceError::cycle(*parent, to));
            }
        }

        for parent in parents {
            self.unlink(parent, from);
            self.link(parent, to);
        }
        Ok(())
    }

    /// Exchange `upper` with its only producer `lower`.
    ///
    /// `upper` must be the only consumer of `lower` and `lower` the only
    /// producer of `upper`. Afterwards `lower` serves the former consumers of
    /// `upper`, and `upper` reads what `lower` used to read. Reordering inside
    /// such a chain cannot close a cycle.
    pub fn swap_with_child(&mut self, upper: NodeId, lower: NodeId) -> SluiceResult<()> {
        let upper_node = self.get(upper)?;
        let lower_node = self.get(lower)?;
        if upper_node.single_child() != Some(lower) || lower_node.single_parent() != Some(upper) {
            return Err(SluiceError::invalid_rewrite(format!(
                "{lower} is not the exclusive single producer of {upper}"
            )));
        }

        let parents = upper_node.parents.clone();
        let children = lower_node.children.clone();

        for parent in &parents {
            if let Some(p) = self.nodes.get_mut(parent) {
                p.children.remove(&upper);
                p.children.insert(lower);
            }
        }
        for child in &children {
            if let Some(c) = self.nodes.get_mut(child) {
                c.parents.remove(&lower);
                c.parents.insert(upper);
            }
        }
        if let Some(u) = self.nodes.get_mut(&upper) {
            u.parents = BTreeSet::from([lower]);
            u.children = children;
        }
        if let Some(l) = self.nodes.get_mut(&lower) {
            l.parents = parents;
            l.children = BTreeSet::from([upper]);
        }

        Ok(())
    }

    /// Order every node so that consumers come before their producers.
    ///
    /// Ties are broken by id, which makes the order deterministic.
    pub fn topological_order(&self) -> SluiceResult<Vec<NodeId>> {
        let mut pending: BTreeMap<NodeId, usize> = self
            .nodes
            .values()
            .map(|node| (node.id, node.parents.len()))
            .collect();
        let mut ready: BTreeSet<NodeId> = pending
            .iter()
            .filter(|&(_, degree)| *degree == 0)
            .map(|(&id, _)| id)
            .collect();

        let mut sorted = Vec::with_capacity(self.nodes.len());
        while let Some(id) = ready.pop_first() {
            sorted.push(id);
            for child in &self.get(id)?.children {
                let degree = pending
                    .get_mut(child)
                    .ok_or_else(|| SluiceError::node_not_found(*child))?;
                *degree -= 1;
                if *degree == 0 {
                    ready.insert(*child);
                }
            }
        }

        if sorted.len() != self.nodes.len() {
            let stuck = pending
                .iter()
                .find(|&(_, degree)| *degree > 0)
                .map(|(id, _)| *id);
            return Err(SluiceError::internal(format!(
                "dataflow contains a cycle through {}",
                stuck.map_or_else(|| "?".to_string(), |id| id.to_string())
            )));
        }

        Ok(sorted)
    }

    /// Every node reachable from `roots` through producer links, roots included.
    pub fn reachable_from(&self, roots: &[NodeId]) -> BTreeSet<NodeId> {
        let mut seen = BTreeSet::new();
        let mut stack: Vec<NodeId> = roots.to_vec();

        while let Some(id) = stack.pop() {
            let Some(node) = self.nodes.get(&id) else {
                continue;
            };
            if seen.insert(id) {
                stack.extend(node.children.iter().copied());
            }
        }

        seen
    }

    /// Whether every edge is recorded on both of its ends.
    pub fn check_links(&self) -> bool {
        debug::check_links(self, &self.node_ids())
    }

    /// Tree rendering of everything below `id`.
    pub fn explain_node(&self, id: NodeId) -> SluiceResult<String> {
        self.get(id)?;
        let expanded = RefCell::new(BTreeSet::new());
        Ok(DisplayTree::new(&NodeView::new(self, id, &expanded)).to_string())
    }

    /// Tree rendering of the whole graph, one tree per unconsumed node.
    ///
    /// A shared producer is expanded under its first consumer only; later
    /// occurrences are marked `(see above)`, so the output stays linear in
    /// the number of edges.
    pub fn explain(&self) -> String {
        let expanded = RefCell::new(BTreeSet::new());
        let mut output = String::from("Dataflow:\n");
        for node in self.nodes.values().filter(|node| node.is_unconsumed()) {
            let view = NodeView::new(self, node.id, &expanded);
            output.push_str(&DisplayTree::new(&view).to_string());
        }
        output
    }

    fn link(&mut self, parent: NodeId, child: NodeId) {
        if let Some(p) = self.nodes.get_mut(&parent) {
            p.children.insert(child);
        }
        if let Some(c) = self.nodes.get_mut(&child) {
            c.parents.insert(parent);
        }
    }

    fn unlink(&mut self, parent: NodeId, child: NodeId) {
        if let Some(p) = self.nodes.get_mut(&parent) {
            p.children.remove(&child);
        }
        if let Some(c) = self.nodes.get_mut(&child) {
            c.parents.remove(&parent);
        }
    }
}

/// Borrowed handle that renders one node and its producers as a tree.
///
/// Whether the node was already expanded is decided the first time the
/// printer asks for its name, which happens in output order.
struct NodeView<'a> {
    graph: &'a Dataflow,
    id: NodeId,
    expanded: &'a RefCell<BTreeSet<NodeId>>,
    repeat: Cell<Option<bool>>,
}

impl<'a> NodeView<'a> {
    fn new(graph: &'a Dataflow, id: NodeId, expanded: &'a RefCell<BTreeSet<NodeId>>) -> Self {
        Self {
            graph,
            id,
            expanded,
            repeat: Cell::new(None),
        }
    }

    fn is_repeat(&self) -> bool {
        if let Some(repeat) = self.repeat.get() {
            return repeat;
        }
        let repeat = !self.expanded.borrow_mut().insert(self.id);
        self.repeat.set(Some(repeat));
        repeat
    }
}

impl TreeNode for NodeView<'_> {
    fn name(&self) -> String {
        self.is_repeat();
        match self.graph.node(self.id) {
            Some(node) => format!("{} {}", node.id, node.op),
            None => format!("{} <missing>", self.id),
        }
    }

    fn children(&self) -> Vec<Box<dyn TreeNode + '_>> {
        if self.is_repeat() {
            return Vec::new();
        }
        self.graph
            .node(self.id)
            .map(|node| {
                node.children
                    .iter()
                    .map(|child| {
                        Box::new(NodeView::new(self.graph, *child, self.expanded))
                            as Box<dyn TreeNode + '_>
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    fn details(&self) -> Option<String> {
        let shared = self.is_repeat()
            && self
                .graph
                .node(self.id)
                .is_some_and(|node| !node.children.is_empty());
        shared.then(|| "see above".to_string())
    }
}
