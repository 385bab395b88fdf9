//! Aggregate operator.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Aggregate operator - groups rows and computes summary fields.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AggregateOp {
    /// Grouping fields.
    pub groupby: Vec<String>,
    /// Computed summary fields.
    pub fields: Vec<AggregateField>,
}

impl AggregateOp {
    /// Create an aggregate with the given grouping fields and no summaries.
    pub fn new<I, S>(groupby: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            groupby: groupby.into_iter().map(Into::into).collect(),
            fields: Vec::new(),
        }
    }

    /// Add a summary field.
    pub fn with_field(
        mut self,
        func: AggregateFn,
        field: impl Into<String>,
        alias: impl Into<String>,
    ) -> Self {
        self.fields.push(AggregateField {
            func,
            field: field.into(),
            alias: alias.into(),
        });
        self
    }
}

impl fmt::Display for AggregateOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "by {}", self.groupby.join(", "))?;
        for field in &self.fields {
            write!(f, "; {}({}) as {}", field.func, field.field, field.alias)?;
        }
        Ok(())
    }
}

/// A single computed summary field.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AggregateField {
    /// Aggregation function.
    pub func: AggregateFn,
    /// Input field.
    pub field: String,
    /// Output field name.
    pub alias: String,
}

/// Aggregation functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AggregateFn {
    /// Row count.
    Count,
    /// Sum.
    Sum,
    /// Arithmetic mean.
    Mean,
    /// Minimum.
    Min,
    /// Maximum.
    Max,
}

impl fmt::Display for AggregateFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Count => "count",
            Self::Sum => "sum",
            Self::Mean => "mean",
            Self::Min => "min",
            Self::Max => "max",
        };
        f.write_str(name)
    }
}
