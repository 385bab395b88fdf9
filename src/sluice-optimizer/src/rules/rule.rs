//! Rewrite rule trait and optimization report.
//!
//! A rule looks at one node in the context of its graph and either leaves the
//! graph alone or performs one local structural edit.

use std::collections::BTreeMap;
use std::fmt;

use common_display::indent;
use common_error::{SluiceResult, SluiceWarning};
use sluice_dataflow::{Dataflow, NodeId};

/// A local graph rewrite.
///
/// # Contract
///
/// - `matches` is a pure query; it never changes the graph.
/// - `apply` re-checks its preconditions and returns [`Rewrite::Unchanged`]
///   when they no longer hold, so applying a rule that has stopped matching
///   leaves the graph as it is.
/// - Side effects are confined to the graph passed in.
pub trait RewriteRule: Send + Sync {
    /// Get the name of this rule.
    fn name(&self) -> &'static str;

    /// Get a description of what this rule does.
    fn description(&self) -> &'static str {
        "No description available"
    }

    /// Whether the rule would change the graph at `node`.
    fn matches(&self, node: NodeId, graph: &Dataflow) -> bool;

    /// Rewrite the graph at `node`.
    fn apply(&self, node: NodeId, graph: &mut Dataflow) -> SluiceResult<Rewrite>;
}

/// The outcome of applying a rule to a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rewrite {
    /// Nothing changed.
    Unchanged,
    /// The node was removed from the graph.
    Removed,
    /// The node was removed and its consumers now read from the given node.
    MergedInto(NodeId),
    /// The given node now occupies the position the rewritten node held.
    Replaced(NodeId),
}

impl Rewrite {
    /// Whether the graph was changed.
    pub const fn is_change(&self) -> bool {
        !matches!(self, Self::Unchanged)
    }
}

impl fmt::Display for Rewrite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unchanged => write!(f, "unchanged"),
            Self::Removed => write!(f, "removed"),
            Self::MergedInto(id) => write!(f, "merged into {id}"),
            Self::Replaced(id) => write!(f, "replaced by {id}"),
        }
    }
}

/// A trace entry for a single applied rewrite.
#[derive(Debug, Clone)]
pub struct RuleTrace {
    /// The name of the rule that was applied.
    pub rule_name: String,
    /// The pass the rewrite happened in (1-based).
    pub pass: usize,
    /// The node the rule was applied to.
    pub node: NodeId,
    /// What the rule did.
    pub rewrite: Rewrite,
    /// The graph before the rewrite (as explain string).
    pub before: String,
    /// The graph after the rewrite (as explain string).
    pub after: String,
}

impl RuleTrace {
    /// Create a new trace entry.
    pub fn new(
        rule_name: impl Into<String>,
        pass: usize,
        node: NodeId,
        rewrite: Rewrite,
        before: impl Into<String>,
        after: impl Into<String>,
    ) -> Self {
        Self {
            rule_name: rule_name.into(),
            pass,
            node,
            rewrite,
            before: before.into(),
            after: after.into(),
        }
    }
}

/// Summary of an optimizer run.
#[derive(Debug, Clone, Default)]
pub struct OptimizationReport {
    /// Number of passes executed.
    pub passes: usize,
    /// Total number of rewrites applied.
    pub rewrites_applied: usize,
    /// Whether a pass finished without any rewrite.
    pub converged: bool,
    /// Rewrites applied per rule name.
    pub per_rule: BTreeMap<&'static str, usize>,
    /// Detailed trace of applied rewrites (if tracing was enabled).
    pub trace: Vec<RuleTrace>,
}

impl OptimizationReport {
    /// The non-convergence warning, if the pass cap was hit.
    pub fn warning(&self) -> Option<SluiceWarning> {
        if self.converged {
            None
        } else {
            Some(SluiceWarning::NonConvergence {
                passes: self.passes,
            })
        }
    }

    /// Rewrites applied by the named rule.
    pub fn applied_by(&self, rule_name: &str) -> usize {
        self.per_rule.get(rule_name).copied().unwrap_or(0)
    }

    pub(crate) fn record(&mut self, rule_name: &'static str) {
        self.rewrites_applied += 1;
        *self.per_rule.entry(rule_name).or_default() += 1;
    }

    /// Format the trace as a human-readable string.
    pub fn format_trace(&self) -> String {
        let mut output = String::new();
        output.push_str(&format!(
            "Optimization completed in {} passes, {} rewrites applied{}\n",
            self.passes,
            self.rewrites_applied,
            if self.converged { "" } else { " (not converged)" }
        ));

        if self.trace.is_empty() {
            output.push_str("  (no trace available)\n");
        } else {
            for (i, entry) in self.trace.iter().enumerate() {
                output.push_str(&format!(
                    "\n--- Rewrite {} (pass {}): {} on {}, {} ---\n",
                    i + 1,
                    entry.pass,
                    entry.rule_name,
                    entry.node,
                    entry.rewrite
                ));
                output.push_str("Before:\n");
                output.push_str(&indent(&entry.before, "  "));
                output.push_str("\nAfter:\n");
                output.push_str(&indent(&entry.after, "  "));
                output.push('\n');
            }
        }

        output
    }
}
