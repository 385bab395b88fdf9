//! Facet operator.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Facet operator - partitions rows into cells, one branch per group.
///
/// `cell_fields` names the fields that only exist inside a cell (per-cell
/// summaries, cell geometry). A predicate over one of them depends on
/// per-branch state and cannot run before the partitioning.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FacetOp {
    /// Partitioning fields.
    pub groupby: Vec<String>,
    /// Fields defined per facet cell.
    #[serde(default)]
    pub cell_fields: Vec<String>,
}

impl FacetOp {
    /// Create a facet over the given fields.
    pub fn new<I, S>(groupby: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            groupby: groupby.into_iter().map(Into::into).collect(),
            cell_fields: Vec::new(),
        }
    }

    /// Declare fields that are only defined per cell.
    pub fn with_cell_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.cell_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Whether the field is per-cell state.
    pub fn is_cell_field(&self, field: &str) -> bool {
        self.cell_fields.iter().any(|f| f == field)
    }
}

impl fmt::Display for FacetOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "by {}", self.groupby.join(", "))
    }
}
