//! Source configuration endpoints.

use std::collections::BTreeMap;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use bronze_config::{
    ConfigError, SourceDocument, ValidationIssue, ValidationResult, apply_patches, to_document,
    validate,
};
use bronze_core::SourceConfig;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::AppState;
use crate::error::ApiError;
use crate::store::StoredSource;

/// Top-level fields a PUT may change. `name` and `source_type` are fixed
/// once a source exists and may only be repeated unchanged.
const UPDATABLE_FIELDS: &[&str] = &[
    "description",
    "enabled",
    "tags",
    "connection",
    "extract",
    "target",
    "schedule",
];

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_sources).post(create_source))
        .route(
            "/{name}",
            get(get_source).put(update_source).delete(delete_source),
        )
        .route("/{name}/validate", post(validate_source))
}

/// Reject configs that fail validation.
fn ensure_valid(config: &SourceConfig) -> Result<ValidationResult, ApiError> {
    let result = validate(config)?;
    if result.valid {
        Ok(result)
    } else {
        Err(ApiError::invalid(result.errors))
    }
}

#[derive(Debug, Deserialize)]
struct ListSourcesQuery {
    source_type: Option<String>,
    /// Matches the `domain` tag.
    domain: Option<String>,
    enabled: Option<bool>,
}

#[derive(Debug, Serialize)]
struct SourceSummary {
    name: String,
    source_type: &'static str,
    description: String,
    enabled: bool,
    tags: BTreeMap<String, String>,
    target_table: String,
    cdc_mode: Option<&'static str>,
    load_type: &'static str,
    schedule: Option<String>,
    updated_at: DateTime<Utc>,
}

impl From<&StoredSource> for SourceSummary {
    fn from(stored: &StoredSource) -> Self {
        let config = &stored.config;
        Self {
            name: config.name.clone(),
            source_type: config.source_type().as_str(),
            description: config.description.clone(),
            enabled: config.enabled,
            tags: config.tags.clone(),
            target_table: config.target_table(),
            cdc_mode: config
                .target
                .cdc
                .enabled
                .then(|| config.target.cdc.mode.as_str()),
            load_type: config.load.load_type().as_str(),
            schedule: config
                .schedule
                .as_ref()
                .and_then(|s| s.cron_expression.clone()),
            updated_at: stored.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
struct ListSourcesResponse {
    sources: Vec<SourceSummary>,
    total: usize,
}

async fn list_sources(
    State(state): State<AppState>,
    Query(query): Query<ListSourcesQuery>,
) -> Result<Json<ListSourcesResponse>, ApiError> {
    let stored = state.source_repo.list().await?;
    let sources: Vec<SourceSummary> = stored
        .iter()
        .filter(|s| {
            query
                .source_type
                .as_deref()
                .is_none_or(|t| s.config.source_type().as_str() == t)
        })
        .filter(|s| {
            query
                .domain
                .as_deref()
                .is_none_or(|d| s.config.tags.get("domain").map(String::as_str) == Some(d))
        })
        .filter(|s| query.enabled.is_none_or(|e| s.config.enabled == e))
        .map(SourceSummary::from)
        .collect();
    Ok(Json(ListSourcesResponse {
        total: sources.len(),
        sources,
    }))
}

#[derive(Debug, Serialize)]
struct SourceDetailResponse {
    #[serde(flatten)]
    document: SourceDocument,
    raw_yaml: String,
    yaml_path: String,
    updated_at: DateTime<Utc>,
}

impl From<StoredSource> for SourceDetailResponse {
    fn from(stored: StoredSource) -> Self {
        Self {
            document: SourceDocument::from_config(&stored.config),
            raw_yaml: stored.raw_yaml,
            yaml_path: stored.yaml_path.display().to_string(),
            updated_at: stored.updated_at,
        }
    }
}

async fn get_source(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<SourceDetailResponse>, ApiError> {
    let stored = state.source_repo.get(&name).await?;
    Ok(Json(stored.into()))
}

#[derive(Debug, Serialize)]
struct SourceWriteResponse {
    name: String,
    yaml_path: String,
    message: String,
    warnings: Vec<ValidationIssue>,
}

async fn create_source(
    State(state): State<AppState>,
    Json(doc): Json<SourceDocument>,
) -> Result<(StatusCode, Json<SourceWriteResponse>), ApiError> {
    let config = doc.into_config()?;
    let result = ensure_valid(&config)?;
    let stored = state.source_repo.create(&config).await?;
    tracing::info!(name = %config.name, source_type = %config.source_type(), "Created source");

    Ok((
        StatusCode::CREATED,
        Json(SourceWriteResponse {
            name: config.name.clone(),
            yaml_path: stored.yaml_path.display().to_string(),
            message: format!("source '{}' created", config.name),
            warnings: result.warnings,
        }),
    ))
}

async fn update_source(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(mut body): Json<serde_json::Map<String, Value>>,
) -> Result<Json<SourceWriteResponse>, ApiError> {
    let current = state.source_repo.get(&name).await?;

    // A full document may echo its identity back; only a change is rejected.
    let source_type = current.config.source_type().as_str();
    for (field, stored) in [("name", name.as_str()), ("source_type", source_type)] {
        match body.remove(field) {
            None => {}
            Some(Value::String(value)) if value == stored => {}
            Some(_) => {
                return Err(ApiError::BadRequest(format!(
                    "field '{}' cannot be changed",
                    field
                )));
            }
        }
    }
    if let Some(field) = body
        .keys()
        .find(|k| !UPDATABLE_FIELDS.contains(&k.as_str()))
    {
        return Err(ApiError::BadRequest(format!(
            "field '{}' cannot be updated",
            field
        )));
    }

    let config = apply_patches(&current.config, body)?;
    let result = ensure_valid(&config)?;
    let stored = state.source_repo.update(&config).await?;
    tracing::info!(%name, "Updated source");

    Ok(Json(SourceWriteResponse {
        name: name.clone(),
        yaml_path: stored.yaml_path.display().to_string(),
        message: format!("source '{}' updated", name),
        warnings: result.warnings,
    }))
}

#[derive(Debug, Serialize)]
struct DeleteResponse {
    name: String,
    message: String,
}

async fn delete_source(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<DeleteResponse>, ApiError> {
    state.source_repo.delete(&name).await?;
    tracing::info!(%name, "Deleted source");
    Ok(Json(DeleteResponse {
        message: format!("source '{}' deleted", name),
        name,
    }))
}

#[derive(Debug, Serialize)]
struct ValidateResponse {
    #[serde(flatten)]
    result: ValidationResult,
    yaml_preview: Option<String>,
}

/// Validate a candidate document without persisting it.
async fn validate_source(
    Path(name): Path<String>,
    Json(mut doc): Json<SourceDocument>,
) -> Result<Json<ValidateResponse>, ApiError> {
    if doc.name.is_none() {
        doc.name = Some(name);
    }

    let response = match doc.into_config() {
        Ok(config) => ValidateResponse {
            result: validate(&config)?,
            yaml_preview: Some(to_document(&config)?),
        },
        Err(ConfigError::Registry(e)) => return Err(e.into()),
        Err(err) => ValidateResponse {
            result: ValidationResult {
                valid: false,
                errors: vec![ValidationIssue {
                    path: err.path().unwrap_or_default().to_string(),
                    message: err.to_string(),
                }],
                warnings: Vec::new(),
            },
            yaml_preview: None,
        },
    };
    Ok(Json(response))
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Method, Request};
    use serde_json::json;
    use tower::ServiceExt;

    use super::*;
    use crate::routes;

    async fn send(
        app: &Router,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json");
        let request = match body {
            Some(body) => request.body(Body::from(body.to_string())).unwrap(),
            None => request.body(Body::empty()).unwrap(),
        };
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    fn erp_orders() -> Value {
        json!({
            "name": "erp_orders",
            "source_type": "jdbc",
            "tags": {"domain": "sales"},
            "connection": {"host": "erp.internal", "port": 1433},
            "extract": {"table": "dbo.Orders"},
            "target": {"catalog": "main", "schema": "bronze", "table": "orders"}
        })
    }

    fn app() -> (tempfile::TempDir, Router) {
        let dir = tempfile::tempdir().unwrap();
        let app = routes::router(AppState::from_dir(dir.path()));
        (dir, app)
    }

    #[tokio::test]
    async fn test_create_then_get_and_list() {
        let (_dir, app) = app();
        let (status, body) = send(&app, Method::POST, "/api/v1/sources", Some(erp_orders())).await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
        assert_eq!(body["name"], "erp_orders");
        assert!(body["yaml_path"].as_str().unwrap().ends_with("erp_orders.yaml"));

        let (status, body) = send(&app, Method::GET, "/api/v1/sources/erp_orders", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["connection"]["host"], "erp.internal");
        let config = bronze_config::from_document(body["raw_yaml"].as_str().unwrap()).unwrap();
        assert_eq!(body["raw_yaml"], to_document(&config).unwrap());

        let (status, body) = send(&app, Method::GET, "/api/v1/sources", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 1);
        assert_eq!(body["sources"][0]["target_table"], "main.bronze.orders");
        assert_eq!(body["sources"][0]["load_type"], "full");
        assert!(body["sources"][0]["cdc_mode"].is_null());
    }

    #[tokio::test]
    async fn test_list_filters() {
        let (_dir, app) = app();
        send(&app, Method::POST, "/api/v1/sources", Some(erp_orders())).await;
        let (_, body) = send(&app, Method::GET, "/api/v1/sources?source_type=api", None).await;
        assert_eq!(body["total"], 0);
        let (_, body) = send(&app, Method::GET, "/api/v1/sources?domain=sales&enabled=true", None).await;
        assert_eq!(body["total"], 1);
    }

    #[tokio::test]
    async fn test_duplicate_create_conflicts() {
        let (_dir, app) = app();
        send(&app, Method::POST, "/api/v1/sources", Some(erp_orders())).await;
        let (status, body) = send(&app, Method::POST, "/api/v1/sources", Some(erp_orders())).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert!(body["error"].as_str().unwrap().contains("erp_orders"));
    }

    #[tokio::test]
    async fn test_invalid_create_is_unprocessable() {
        let (_dir, app) = app();
        let mut doc = erp_orders();
        doc["target"]["cdc"] = json!({"enabled": true, "mode": "upsert"});
        let (status, body) = send(&app, Method::POST, "/api/v1/sources", Some(doc)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["errors"][0]["path"], "target.cdc.primary_keys");

        let mut doc = erp_orders();
        doc["extract"]["kafka_topic"] = json!("orders");
        let (status, body) = send(&app, Method::POST, "/api/v1/sources", Some(doc)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["errors"][0]["path"], "extract.kafka_topic");

        let (_, body) = send(&app, Method::GET, "/api/v1/sources", None).await;
        assert_eq!(body["total"], 0);
    }

    #[tokio::test]
    async fn test_update_applies_partial_document() {
        let (_dir, app) = app();
        send(&app, Method::POST, "/api/v1/sources", Some(erp_orders())).await;

        let patch = json!({
            "description": "Orders from the ERP",
            "schedule": {"cron_expression": "0 0 6 * * ?", "timezone": "Europe/Berlin"}
        });
        let (status, body) = send(&app, Method::PUT, "/api/v1/sources/erp_orders", Some(patch)).await;
        assert_eq!(status, StatusCode::OK, "{}", body);

        let (_, body) = send(&app, Method::GET, "/api/v1/sources/erp_orders", None).await;
        assert_eq!(body["description"], "Orders from the ERP");
        assert_eq!(body["schedule"]["cron_expression"], "0 0 6 * * ?");
        assert_eq!(body["extract"]["table"], "dbo.Orders");

        let bad = json!({"schedule": {"cron_expression": "not a cron"}});
        let (status, body) = send(&app, Method::PUT, "/api/v1/sources/erp_orders", Some(bad)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["errors"][0]["path"], "schedule.cron_expression");

        let (status, _) = send(
            &app,
            Method::PUT,
            "/api/v1/sources/erp_orders",
            Some(json!({"source_type": "api"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(
            &app,
            Method::PUT,
            "/api/v1/sources/unknown_source",
            Some(json!({"enabled": false})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_update_accepts_full_document() {
        let (_dir, app) = app();
        send(&app, Method::POST, "/api/v1/sources", Some(erp_orders())).await;

        let mut doc = erp_orders();
        doc["description"] = json!("Orders from the ERP");
        let (status, body) = send(&app, Method::PUT, "/api/v1/sources/erp_orders", Some(doc)).await;
        assert_eq!(status, StatusCode::OK, "{}", body);
        let (_, body) = send(&app, Method::GET, "/api/v1/sources/erp_orders", None).await;
        assert_eq!(body["description"], "Orders from the ERP");

        let mut renamed = erp_orders();
        renamed["name"] = json!("erp_orders_v2");
        let (status, body) = send(&app, Method::PUT, "/api/v1/sources/erp_orders", Some(renamed)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("name"));

        let mut retyped = erp_orders();
        retyped["source_type"] = json!("api");
        let (status, _) = send(&app, Method::PUT, "/api/v1/sources/erp_orders", Some(retyped)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_delete() {
        let (_dir, app) = app();
        send(&app, Method::POST, "/api/v1/sources", Some(erp_orders())).await;
        let (status, body) = send(&app, Method::DELETE, "/api/v1/sources/erp_orders", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "erp_orders");
        let (status, _) = send(&app, Method::GET, "/api/v1/sources/erp_orders", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_validate_preview() {
        let (_dir, app) = app();
        let doc = json!({
            "source_type": "api",
            "extract": {"base_url": "https://crm.example.com", "auth": {"type": "oauth2"}},
            "target": {"catalog": "main", "schema": "bronze", "table": "contacts"}
        });
        let (status, body) = send(&app, Method::POST, "/api/v1/sources/preview/validate", Some(doc)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["valid"], false);
        let paths: Vec<&str> = body["errors"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|e| e["path"].as_str())
            .collect();
        assert!(paths.contains(&"extract.auth.token_url"));
        assert!(body["yaml_preview"].as_str().unwrap().contains("name: preview"));

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/v1/sources/preview/validate",
            Some(json!({"source_type": "jdbc"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["valid"], false);
        assert_eq!(body["errors"][0]["path"], "target");
        assert!(body["yaml_preview"].is_null());

        let (_, body) = send(&app, Method::GET, "/api/v1/sources", None).await;
        assert_eq!(body["total"], 0);
    }

    #[tokio::test]
    async fn test_options_and_health() {
        let (_dir, app) = app();
        let (status, body) = send(&app, Method::GET, "/api/v1/options", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["source_types"][0]["value"], "jdbc");
        assert_eq!(body["cdc_modes"].as_array().unwrap().len(), 3);
        assert_eq!(body["source_type_fields"]["jdbc"]["groups"][0], "connection");

        let (status, body) = send(&app, Method::GET, "/health/ready", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ready");
    }
}
