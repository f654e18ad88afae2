//! Configuration engine for Bronze ingestion sources.
//!
//! This crate handles:
//! - Validation of source configurations
//! - Path-addressed patching
//! - YAML source documents
//! - Environment placeholder interpolation

pub mod cron;
pub mod document;
pub mod environment;
pub mod error;
pub mod patch;
pub mod validate;

pub use cron::{CronError, CronExpression};
pub use document::{SourceDocument, from_document, to_document};
pub use environment::{Environment, placeholders};
pub use error::{ConfigError, ConfigResult};
pub use patch::{apply_patch, apply_patches};
pub use validate::{ValidationIssue, ValidationResult, invariant_violations, validate};
