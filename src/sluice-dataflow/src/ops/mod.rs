//! Dataflow operators.
//!
//! The operator set is closed: every node carries exactly one [`DataflowOp`],
//! and rules dispatch on its parameter-free [`NodeKind`] tag.

mod aggregate;
mod facet;
mod filter;
mod io;

pub use aggregate::{AggregateField, AggregateFn, AggregateOp};
pub use facet::FacetOp;
pub use filter::{Comparison, FilterOp, Literal, Predicate};
pub use io::{OutputOp, SourceOp};

use std::fmt;

use serde::{Deserialize, Serialize};

/// The kind tag of a dataflow operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    /// Produces data from a named source.
    Source,
    /// Drops rows that fail a predicate.
    Filter,
    /// Groups and summarizes rows.
    Aggregate,
    /// Partitions rows into per-cell branches.
    Facet,
    /// A named result of the dataflow.
    Output,
}

impl NodeKind {
    /// Root kinds are never eliminated or merged by the optimizer.
    pub const fn is_root(self) -> bool {
        matches!(self, Self::Output)
    }

    /// Get the name of this kind.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Source => "Source",
            Self::Filter => "Filter",
            Self::Aggregate => "Aggregate",
            Self::Facet => "Facet",
            Self::Output => "Output",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A dataflow operator together with its parameters.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DataflowOp {
    /// Read a named source.
    Source(SourceOp),
    /// Filter rows.
    Filter(FilterOp),
    /// Aggregate rows.
    Aggregate(AggregateOp),
    /// Partition rows into facet cells.
    Facet(FacetOp),
    /// Emit a named output.
    Output(OutputOp),
}

impl DataflowOp {
    /// Create a source operator.
    pub fn source(name: impl Into<String>) -> Self {
        Self::Source(SourceOp::new(name))
    }

    /// Create a filter operator.
    pub fn filter(predicate: Predicate) -> Self {
        Self::Filter(FilterOp::new(predicate))
    }

    /// Create an aggregate operator.
    pub fn aggregate(aggregate: AggregateOp) -> Self {
        Self::Aggregate(aggregate)
    }

    /// Create a facet operator.
    pub fn facet(facet: FacetOp) -> Self {
        Self::Facet(facet)
    }

    /// Create an output operator.
    pub fn output(name: impl Into<String>) -> Self {
        Self::Output(OutputOp::new(name))
    }

    /// Get the kind tag of this operator.
    pub const fn kind(&self) -> NodeKind {
        match self {
            Self::Source(_) => NodeKind::Source,
            Self::Filter(_) => NodeKind::Filter,
            Self::Aggregate(_) => NodeKind::Aggregate,
            Self::Facet(_) => NodeKind::Facet,
            Self::Output(_) => NodeKind::Output,
        }
    }

    /// Get the filter parameters if this is a filter.
    pub const fn as_filter(&self) -> Option<&FilterOp> {
        match self {
            Self::Filter(op) => Some(op),
            _ => None,
        }
    }

    /// Get the facet parameters if this is a facet.
    pub const fn as_facet(&self) -> Option<&FacetOp> {
        match self {
            Self::Facet(op) => Some(op),
            _ => None,
        }
    }
}

impl fmt::Display for DataflowOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Source(op) => write!(f, "Source[{}]", op.name),
            Self::Filter(op) => write!(f, "Filter[{}]", op.predicate),
            Self::Aggregate(op) => write!(f, "Aggregate[{op}]"),
            Self::Facet(op) => write!(f, "Facet[{op}]"),
            Self::Output(op) => write!(f, "Output[{}]", op.name),
        }
    }
}
