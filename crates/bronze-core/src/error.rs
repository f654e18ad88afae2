//! Error types for the option registry.

use thiserror::Error;

use crate::registry::OptionKind;

/// Registry faults.
///
/// These signal data or programming faults (a closed option set asked about a
/// value it does not know, or a missing applicability entry), never user input
/// mistakes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("unrecognized {kind} value: {value}")]
    Unrecognized { kind: OptionKind, value: String },

    #[error("registry has no entry for {0}")]
    MissingEntry(String),
}

pub type Result<T> = std::result::Result<T, Error>;
