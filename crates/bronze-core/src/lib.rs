//! Core domain types for Bronze layer ingestion sources.
//!
//! This crate contains:
//! - The option registry (source types, CDC modes, load types, ...) and
//!   per-source-type field applicability
//! - The typed source configuration model and its defaults
//! - Registry fault errors

pub mod error;
pub mod registry;
pub mod source;

pub use error::{Error, Result};
pub use registry::{Lookup, OptionInfo, OptionKind};
pub use source::SourceConfig;
