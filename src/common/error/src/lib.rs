//! Error types and result aliases for Sluice.
//!
//! Every fallible graph operation returns [`SluiceResult`]. Structural errors
//! are raised before the graph is touched, so an `Err` never leaves a
//! dataflow half edited.

mod error;

pub use error::{SluiceError, SluiceResult, SluiceWarning};
