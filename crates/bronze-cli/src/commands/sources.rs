//! Remote source management against the API server.

use std::path::Path;

use anyhow::{Context, Result, bail};
use bronze_config::{SourceDocument, from_document};
use reqwest::{Response, StatusCode};
use serde_json::Value;

fn sources_url(api_url: &str) -> String {
    format!("{}/api/v1/sources", api_url.trim_end_matches('/'))
}

/// Turn a non-success response into an error carrying the server's message.
async fn check(response: Response) -> Result<Value> {
    let status = response.status();
    let body: Value = response.json().await.unwrap_or(Value::Null);
    if status.is_success() {
        return Ok(body);
    }

    let message = body["error"].as_str().unwrap_or("request failed").to_string();
    if let Some(errors) = body["errors"].as_array() {
        for error in errors {
            eprintln!(
                "  {}: {}",
                error["path"].as_str().unwrap_or(""),
                error["message"].as_str().unwrap_or("")
            );
        }
    }
    bail!("{} ({})", message, status)
}

pub async fn list(api_url: &str, source_type: Option<String>, domain: Option<String>) -> Result<()> {
    let mut query = Vec::new();
    if let Some(t) = source_type {
        query.push(("source_type", t));
    }
    if let Some(d) = domain {
        query.push(("domain", d));
    }

    let response = reqwest::Client::new()
        .get(sources_url(api_url))
        .query(&query)
        .send()
        .await
        .context("Failed to reach API server")?;
    let body = check(response).await?;

    println!("{:<32} {:<8} {:<12} TARGET", "NAME", "TYPE", "LOAD");
    for source in body["sources"].as_array().into_iter().flatten() {
        println!(
            "{:<32} {:<8} {:<12} {}",
            source["name"].as_str().unwrap_or(""),
            source["source_type"].as_str().unwrap_or(""),
            source["load_type"].as_str().unwrap_or(""),
            source["target_table"].as_str().unwrap_or("")
        );
    }
    println!("{} source(s)", body["total"]);
    Ok(())
}

pub async fn get(api_url: &str, name: &str) -> Result<()> {
    let response = reqwest::get(format!("{}/{}", sources_url(api_url), name))
        .await
        .context("Failed to reach API server")?;
    let body = check(response).await?;
    print!("{}", body["raw_yaml"].as_str().unwrap_or(""));
    Ok(())
}

/// PUT payload for an existing source.
///
/// Omitted keys would leave the server's values in place, so a schedule or
/// tags removed locally are sent explicitly as `null` and `{}`.
fn update_body(document: Value) -> Value {
    let mut document = document;
    if let Some(fields) = document.as_object_mut() {
        fields.remove("name");
        fields.remove("source_type");
        fields.entry("schedule").or_insert(Value::Null);
        fields
            .entry("tags")
            .or_insert_with(|| Value::Object(serde_json::Map::new()));
    }
    document
}

/// Create the source, or update it when the name already exists.
pub async fn push(api_url: &str, path: &Path) -> Result<()> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read source document: {}", path.display()))?;
    let config = from_document(&content)
        .with_context(|| format!("Failed to parse source document: {}", path.display()))?;
    let document = serde_json::to_value(SourceDocument::from_config(&config))?;

    let client = reqwest::Client::new();
    let response = client
        .post(sources_url(api_url))
        .json(&document)
        .send()
        .await
        .context("Failed to reach API server")?;

    if response.status() != StatusCode::CONFLICT {
        let body = check(response).await?;
        println!("{}", body["message"].as_str().unwrap_or("created"));
        return Ok(());
    }

    let response = client
        .put(format!("{}/{}", sources_url(api_url), config.name))
        .json(&update_body(document))
        .send()
        .await
        .context("Failed to reach API server")?;
    let body = check(response).await?;
    println!("{}", body["message"].as_str().unwrap_or("updated"));
    Ok(())
}

pub async fn delete(api_url: &str, name: &str) -> Result<()> {
    let response = reqwest::Client::new()
        .delete(format!("{}/{}", sources_url(api_url), name))
        .send()
        .await
        .context("Failed to reach API server")?;
    let body = check(response).await?;
    println!("{}", body["message"].as_str().unwrap_or("deleted"));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bronze_core::SourceConfig;
    use bronze_core::registry::SourceType;

    #[test]
    fn test_sources_url() {
        assert_eq!(
            sources_url("http://localhost:8000/"),
            "http://localhost:8000/api/v1/sources"
        );
    }

    #[test]
    fn test_update_body_clears_removed_fields() {
        let mut config = SourceConfig::create_default(SourceType::Jdbc);
        config.name = "erp_orders".to_string();
        config.target.table = "orders".to_string();
        let document = serde_json::to_value(SourceDocument::from_config(&config)).unwrap();

        let body = update_body(document);
        assert_eq!(body["schedule"], Value::Null);
        assert!(body.as_object().unwrap().contains_key("schedule"));
        assert_eq!(body["tags"], serde_json::json!({}));
        assert!(body.get("name").is_none());
        assert!(body.get("source_type").is_none());
        assert_eq!(body["target"]["table"], "orders");
    }
}
