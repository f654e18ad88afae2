//! Server settings from the environment.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;

pub const DEFAULT_SOURCES_DIR: &str = "conf/sources";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";

#[derive(Debug, Clone)]
pub struct Settings {
    /// Directory of `<name>.yaml` source documents.
    pub sources_dir: PathBuf,
    pub bind_addr: SocketAddr,
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let sources_dir = lookup("BRONZE_SOURCES_DIR")
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_SOURCES_DIR.to_string());
        let bind_addr = lookup("BRONZE_BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_addr
            .parse()
            .with_context(|| format!("invalid BRONZE_BIND_ADDR: {}", bind_addr))?;

        Ok(Self {
            sources_dir: PathBuf::from(sources_dir),
            bind_addr,
        })
    }
}
