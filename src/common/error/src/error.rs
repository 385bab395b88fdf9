//! Core error types for Sluice.

use thiserror::Error;

/// Result type alias using `SluiceError`.
pub type SluiceResult<T> = std::result::Result<T, SluiceError>;

/// Core error type for Sluice operations.
///
/// Node identities are carried as raw `u64` values so that this crate stays
/// independent of the graph crate.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SluiceError {
    /// Adding the edge `parent -> child` would close a cycle.
    #[error("CycleError: connecting #{parent} -> #{child} would create a cycle")]
    Cycle {
        /// The consuming node.
        parent: u64,
        /// The producing node.
        child: u64,
    },

    /// The edge `parent -> child` does not exist.
    #[error("EdgeNotFoundError: no edge #{parent} -> #{child}")]
    EdgeNotFound {
        /// The consuming node.
        parent: u64,
        /// The producing node.
        child: u64,
    },

    /// A node id does not belong to the graph.
    #[error("NodeNotFound: #{0}")]
    NodeNotFound(u64),

    /// Parent and child sets disagree somewhere in the graph.
    #[error("InconsistentLinks: {0}")]
    InconsistentLinks(String),

    /// A rewrite rule was asked to do something it cannot do.
    #[error("InvalidRewrite: {0}")]
    InvalidRewrite(String),

    /// Invalid value provided.
    #[error("ValueError: {0}")]
    ValueError(String),

    /// Invalid parameter provided.
    #[error("InvalidParameter: {0}")]
    InvalidParameter(String),

    /// Internal error (bug in Sluice).
    #[error("InternalError: {0}")]
    InternalError(String),

    /// IO error.
    #[error("IoError: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("SerdeJsonError: {0}")]
    SerdeJsonError(#[from] serde_json::Error),
}

impl SluiceError {
    /// Create a new `Cycle` error.
    pub fn cycle(parent: impl Into<u64>, child: impl Into<u64>) -> Self {
        Self::Cycle {
            parent: parent.into(),
            child: child.into(),
        }
    }

    /// Create a new `EdgeNotFound` error.
    pub fn edge_not_found(parent: impl Into<u64>, child: impl Into<u64>) -> Self {
        Self::EdgeNotFound {
            parent: parent.into(),
            child: child.into(),
        }
    }

    /// Create a new `NodeNotFound` error.
    pub fn node_not_found(id: impl Into<u64>) -> Self {
        Self::NodeNotFound(id.into())
    }

    /// Create a new `InconsistentLinks` error.
    pub fn inconsistent_links<S: Into<String>>(msg: S) -> Self {
        Self::InconsistentLinks(msg.into())
    }

    /// Create a new `InvalidRewrite` error.
    pub fn invalid_rewrite<S: Into<String>>(msg: S) -> Self {
        Self::InvalidRewrite(msg.into())
    }

    /// Create a new `ValueError`.
    pub fn value_error<S: Into<String>>(msg: S) -> Self {
        Self::ValueError(msg.into())
    }

    /// Create a new `InvalidParameter` error.
    pub fn invalid_parameter<S: Into<String>>(msg: S) -> Self {
        Self::InvalidParameter(msg.into())
    }

    /// Create a new `InternalError`.
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        Self::InternalError(msg.into())
    }

    /// Whether the error is a structural rejection the caller can recover from
    /// by choosing a different edit.
    pub const fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::EdgeNotFound { .. } | Self::NodeNotFound(_) | Self::InvalidParameter(_)
        )
    }
}

/// Non-fatal conditions reported alongside a successful result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SluiceWarning {
    /// The optimizer hit its pass cap before reaching a fixed point.
    #[error("NonConvergenceWarning: no fixed point after {passes} passes")]
    NonConvergence {
        /// Passes executed before giving up.
        passes: usize,
    },
}

/// Ensure a condition holds, returning an `InternalError` if not.
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $msg:expr) => {
        if !$cond {
            return Err($crate::SluiceError::InternalError($msg.to_string()));
        }
    };
    ($cond:expr, $variant:ident: $($msg:tt)*) => {
        if !$cond {
            return Err($crate::SluiceError::$variant(format!($($msg)*)));
        }
    };
}

/// Return early with a `ValueError`.
#[macro_export]
macro_rules! value_err {
    ($($arg:tt)*) => {
        return Err($crate::SluiceError::ValueError(format!($($arg)*)))
    };
}
