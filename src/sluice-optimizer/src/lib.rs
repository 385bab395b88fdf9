//! Fixed-point optimizer for Sluice dataflows.
//!
//! Rewrites a [`Dataflow`] in place with an ordered set of local rules until
//! no rule applies or the pass cap is reached.
//!
//! # Example
//!
//! ```rust
//! use sluice_dataflow::{Comparison, Dataflow, DataflowOp, Predicate};
//!
//! let mut graph = Dataflow::new();
//! let p = Predicate::new("x", Comparison::Eq, 5i64);
//! let a = graph.add_node(DataflowOp::filter(p.clone()), &[]).unwrap();
//! let b = graph.add_node(DataflowOp::filter(p), &[]).unwrap();
//! graph.add_node(DataflowOp::output("r"), &[a, b]).unwrap();
//!
//! let report = sluice_optimizer::optimize(&mut graph).unwrap();
//! assert!(report.converged);
//! assert_eq!(graph.len(), 2);
//! ```

mod rules;

pub use rules::{
    DeadNodeElimination, DuplicateMerge, FilterHoisting, FilterReordering, OptimizationReport,
    Optimizer, OptimizerConfig, Rewrite, RewriteRule, RuleTrace,
};

use common_error::SluiceResult;
use sluice_dataflow::Dataflow;

/// Optimize a dataflow using the default optimizer.
pub fn optimize(graph: &mut Dataflow) -> SluiceResult<OptimizationReport> {
    Optimizer::default().optimize(graph)
}
