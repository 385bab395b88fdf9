//! Sluice - fixed-point dataflow graph optimizer
//!
//! Sluice takes a directed acyclic graph of dataflow operators and rewrites
//! it in place with an ordered set of local rules (dead node elimination,
//! duplicate merging, filter hoisting and filter reordering) until nothing
//! changes or a pass cap is hit.

#![forbid(unsafe_code)]
#![allow(clippy::module_name_repetitions)]

// Re-export workspace crates
pub use common_config as config;
pub use common_display as display;
pub use common_error as error;
pub use sluice_dataflow as dataflow;
pub use sluice_optimizer as optimizer;

pub use common_error::{SluiceError, SluiceResult, SluiceWarning};
pub use sluice_dataflow::{Dataflow, DataflowBuilder, NodeId};
pub use sluice_optimizer::{OptimizationReport, Optimizer, optimize};

/// Sluice version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
