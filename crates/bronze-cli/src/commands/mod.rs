//! CLI command implementations.

pub mod sources;

use std::path::Path;

use anyhow::{Context, Result, bail};
use bronze_config::{Environment, apply_patch, from_document, placeholders, to_document};
use bronze_core::registry::{self, SourceType};
use bronze_core::{OptionKind, SourceConfig};
use serde_json::Value;

fn read_source(path: &Path) -> Result<SourceConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read source document: {}", path.display()))?;
    from_document(&content)
        .with_context(|| format!("Failed to parse source document: {}", path.display()))
}

/// Build a defaulted configuration for `init`.
fn initial_config(
    source_type: &str,
    name: Option<String>,
    table: Option<String>,
) -> Result<SourceConfig> {
    let source_type: SourceType = source_type.parse()?;
    let mut config = SourceConfig::create_default(source_type);
    config.name = name.unwrap_or_else(|| format!("new_{}_source", source_type));
    config.target.table = table.unwrap_or_else(|| config.name.clone());
    Ok(config)
}

pub fn init(source_type: &str, name: Option<String>, table: Option<String>) -> Result<()> {
    let config = initial_config(source_type, name, table)?;
    print!("{}", to_document(&config)?);
    Ok(())
}

pub fn validate(path: &Path) -> Result<()> {
    let config = read_source(path)?;
    let result = bronze_config::validate(&config)?;

    for warning in &result.warnings {
        println!("warning: {}", warning);
    }
    for error in &result.errors {
        println!("error: {}", error);
    }

    if !result.valid {
        println!("{} error(s) in {}", result.errors.len(), config.name);
        std::process::exit(1);
    }
    println!("Source '{}' is valid", config.name);
    Ok(())
}

pub fn render(path: &Path, env_file: Option<&Path>) -> Result<()> {
    let config = read_source(path)?;
    let environment = match env_file {
        Some(file) => Environment::load(file)
            .with_context(|| format!("Failed to load environment: {}", file.display()))?,
        None => Environment::default(),
    };

    let rendered = environment.render(&config)?;
    let unresolved = placeholders(&rendered);
    if !unresolved.is_empty() {
        tracing::warn!(?unresolved, "Placeholders left unresolved");
    }
    print!("{}", to_document(&rendered)?);
    Ok(())
}

/// Parse a command-line value as JSON, falling back to a plain string.
fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

pub fn set(path: &Path, field: &str, value: &str, in_place: bool) -> Result<()> {
    let config = read_source(path)?;
    let updated = apply_patch(&config, field, parse_value(value))
        .with_context(|| format!("Failed to set {}", field))?;
    let text = to_document(&updated)?;

    if in_place {
        std::fs::write(path, text)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!("Updated {} in {}", field, path.display());
    } else {
        print!("{}", text);
    }
    Ok(())
}

pub fn options(kind: Option<&str>) -> Result<()> {
    let kinds: Vec<OptionKind> = match kind {
        Some(kind) => match OptionKind::ALL.iter().find(|k| k.as_str() == kind) {
            Some(k) => vec![*k],
            None => bail!(
                "Unknown option set '{}'. Available: {}",
                kind,
                OptionKind::ALL
                    .iter()
                    .map(|k| k.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        },
        None => OptionKind::ALL.to_vec(),
    };

    for kind in kinds {
        println!("{}:", kind.as_str());
        for option in registry::options(kind) {
            println!("  {:<20} {}", option.value, option.description);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_config_is_parseable() {
        let config = initial_config("api", Some("crm_contacts".into()), None).unwrap();
        assert_eq!(config.target.table, "crm_contacts");
        let text = to_document(&config).unwrap();
        assert_eq!(from_document(&text).unwrap(), config);
    }

    #[test]
    fn test_initial_config_rejects_unknown_type() {
        assert!(initial_config("ftp", None, None).is_err());
    }

    #[test]
    fn test_parse_value() {
        assert_eq!(parse_value("42"), Value::from(42));
        assert_eq!(parse_value("true"), Value::Bool(true));
        assert_eq!(parse_value("dbo.Orders"), Value::String("dbo.Orders".into()));
        assert_eq!(parse_value("\"5\""), Value::String("5".into()));
    }

    #[test]
    fn test_read_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("orders.yaml");
        let config = initial_config("jdbc", Some("erp_orders".into()), Some("orders".into())).unwrap();
        std::fs::write(&path, to_document(&config).unwrap()).unwrap();
        assert_eq!(read_source(&path).unwrap().name, "erp_orders");
        assert!(read_source(&dir.path().join("missing.yaml")).is_err());
    }
}
