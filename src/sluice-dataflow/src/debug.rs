//! Debugging aids: link consistency checking, tree dumps and graphviz output.

use common_display::truncate_string;
use log::{Level, debug as log_debug, log_enabled};

use crate::graph::Dataflow;
use crate::identifiers::NodeId;

/// Longest node label emitted by [`draw`].
const MAX_LABEL_LEN: usize = 48;

/// Check that every edge touching `nodes` is recorded on both ends.
///
/// A listed node must exist, each of its children must list it as a parent
/// and each of its parents must list it as a child. Costs
/// O(nodes × average degree).
pub fn check_links(graph: &Dataflow, nodes: &[NodeId]) -> bool {
    match find_broken_link(graph, nodes) {
        Some(problem) => {
            log_debug!("Inconsistent dataflow links: {problem}");
            false
        }
        None => true,
    }
}

/// Describe the first inconsistent link among `nodes`, if any.
pub fn find_broken_link(graph: &Dataflow, nodes: &[NodeId]) -> Option<String> {
    for id in nodes {
        let Some(node) = graph.node(*id) else {
            return Some(format!("{id} is not in the dataflow"));
        };
        for child in node.children() {
            match graph.node(*child) {
                None => return Some(format!("{id} reads from missing node {child}")),
                Some(c) if !c.parents().contains(id) => {
                    return Some(format!("{child} does not list consumer {id}"));
                }
                Some(_) => {}
            }
        }
        for parent in node.parents() {
            match graph.node(*parent) {
                None => return Some(format!("{id} is consumed by missing node {parent}")),
                Some(p) if !p.children().contains(id) => {
                    return Some(format!("{parent} does not list producer {id}"));
                }
                Some(_) => {}
            }
        }
    }
    None
}

/// Log the subtree below `node` at debug level.
pub fn debug(graph: &Dataflow, node: NodeId) {
    if !log_enabled!(Level::Debug) {
        return;
    }
    match graph.explain_node(node) {
        Ok(tree) => log_debug!("Dataflow below {node}:\n{tree}"),
        Err(e) => log_debug!("Cannot print {node}: {e}"),
    }
}

/// Render everything reachable from `roots` as a graphviz digraph.
///
/// Edges follow the direction data moves, from producer to consumer.
pub fn draw(graph: &Dataflow, roots: &[NodeId]) -> String {
    let reachable = graph.reachable_from(roots);
    let mut output = String::from("digraph DataFlow {\n  rankdir = TB;\n  node [shape = box];\n");

    for id in &reachable {
        let Some(node) = graph.node(*id) else {
            continue;
        };
        let label = truncate_string(&format!("{} {}", id, node.op()), MAX_LABEL_LEN);
        let shape = if node.is_root() { " shape = doubleoctagon" } else { "" };
        output.push_str(&format!(
            "  \"{}\" [label = \"{}\"{shape}];\n",
            id.as_u64(),
            escape(&label)
        ));
    }
    for id in &reachable {
        let Some(node) = graph.node(*id) else {
            continue;
        };
        for child in node.children() {
            output.push_str(&format!("  \"{}\" -> \"{}\";\n", child.as_u64(), id.as_u64()));
        }
    }

    output.push_str("}\n");
    output
}

fn escape(label: &str) -> String {
    label.replace('\\', "\\\\").replace('"', "\\\"")
}
