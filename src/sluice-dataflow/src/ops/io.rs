//! Source and output operators.

use serde::{Deserialize, Serialize};

/// Source operator - reads a named dataset.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SourceOp {
    /// Dataset name.
    pub name: String,
}

impl SourceOp {
    /// Create a new source.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Output operator - a named result consumed outside the dataflow.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OutputOp {
    /// Output name.
    pub name: String,
}

impl OutputOp {
    /// Create a new output.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}
