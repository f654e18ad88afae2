//! API server for Bronze source configurations.
//!
//! Provides the HTTP REST API over a directory of YAML source documents.

pub mod error;
pub mod routes;
pub mod settings;
pub mod state;
pub mod store;

pub use settings::Settings;
pub use state::AppState;
