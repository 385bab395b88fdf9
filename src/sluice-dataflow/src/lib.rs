//! Dataflow graph model for Sluice.
//!
//! A dataflow is a directed acyclic graph of operators. Every node knows both
//! its consumers (parents) and its producers (children); the [`Dataflow`]
//! arena keeps those two views consistent and rejects any edge that would
//! close a cycle.
//!
//! # Example
//!
//! ```rust
//! use sluice_dataflow::{Comparison, DataflowBuilder, Predicate};
//!
//! let mut builder = DataflowBuilder::new();
//! let cars = builder.source("cars");
//! let usa = builder
//!     .filter(cars, Predicate::new("origin", Comparison::Eq, "USA"))
//!     .unwrap();
//! builder.output("main", &[usa]).unwrap();
//!
//! let graph = builder.build();
//! assert!(graph.check_links());
//! println!("{}", graph.explain());
//! ```

mod builder;
pub mod debug;
mod graph;
mod identifiers;
mod node;
pub mod ops;

pub use builder::DataflowBuilder;
pub use graph::Dataflow;
pub use identifiers::NodeId;
pub use node::DataflowNode;
pub use ops::{
    AggregateField, AggregateFn, AggregateOp, Comparison, DataflowOp, FacetOp, FilterOp, Literal,
    NodeKind, OutputOp, Predicate, SourceOp,
};
