//! Rewrite rules for dataflow graphs.
//!
//! Every rule is a local edit around one node. The default rule set, in
//! priority order:
//!
//! 1. **Dead node elimination**: drop nodes nobody consumes
//! 2. **Duplicate merge**: fold equal siblings that read the same producers
//! 3. **Filter hoisting**: run filters before facet partitioning
//! 4. **Filter reordering**: put filter chains in canonical order
//!
//! Reordering never undoes hoisting and neither creates nodes, so repeated
//! application reaches a fixed point.

mod dead_node_elimination;
mod duplicate_merge;
mod filter_hoisting;
mod filter_reordering;
mod optimizer;
mod rule;

pub use dead_node_elimination::DeadNodeElimination;
pub use duplicate_merge::DuplicateMerge;
pub use filter_hoisting::FilterHoisting;
pub use filter_reordering::FilterReordering;
pub use optimizer::{Optimizer, OptimizerConfig};
pub use rule::{OptimizationReport, Rewrite, RewriteRule, RuleTrace};
