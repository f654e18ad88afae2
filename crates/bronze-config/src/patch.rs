//! Path-addressed edits of a source configuration.
//!
//! A patch is a dot path such as `target.cdc.mode` plus a JSON value. Each
//! path is matched to a typed setter; the input config is cloned first and
//! never mutated. Paths that do not apply to the config's source type are
//! rejected rather than stored as inert data.

use std::collections::BTreeMap;
use std::str::FromStr;

use bronze_core::registry::{self, AuthType, LoadType, PaginationType, SourceType};
use bronze_core::source::{
    ApiAuth, ApiExtract, FileExtract, JdbcConnection, JdbcExtract, LandingConfig, Load, Pagination,
    PaginationStyle, ScheduleConfig, SourceConfig, SourceKind, StreamExtract, TargetConfig,
    Watermark,
};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::document::{
    self, AuthDocument, CdcDocument, ConnectionDocument, ExtractDocument, LandingDocument,
    MetadataColumnDocument, PaginationDocument, QualityDocument, ScheduleDocument,
    SchemaEvolutionDocument, TargetDocument, WatermarkDocument,
};
use crate::{ConfigError, ConfigResult};

/// Apply one patch, returning the edited copy.
pub fn apply_patch(config: &SourceConfig, path: &str, value: Value) -> ConfigResult<SourceConfig> {
    let mut next = config.clone();
    set(&mut next, path, value)?;
    tracing::debug!(name = %next.name, path, "Applied patch");
    Ok(next)
}

/// Apply patches in order. Either all apply or the error of the first failing
/// one is returned.
pub fn apply_patches<I, P>(config: &SourceConfig, patches: I) -> ConfigResult<SourceConfig>
where
    I: IntoIterator<Item = (P, Value)>,
    P: AsRef<str>,
{
    let mut next = config.clone();
    let mut applied = 0;
    for (path, value) in patches {
        set(&mut next, path.as_ref(), value)?;
        applied += 1;
    }
    tracing::debug!(name = %next.name, applied, "Applied patch batch");
    Ok(next)
}

fn decode<T: DeserializeOwned>(path: &str, value: Value) -> ConfigResult<T> {
    if value.is_null() {
        return Err(ConfigError::NotNullable(path.to_string()));
    }
    serde_json::from_value(value).map_err(|e| ConfigError::invalid(path, e.to_string()))
}

fn decode_opt<T: DeserializeOwned>(path: &str, value: Value) -> ConfigResult<Option<T>> {
    if value.is_null() {
        return Ok(None);
    }
    decode(path, value).map(Some)
}

/// Collections treat `null` as empty.
fn decode_or_default<T: DeserializeOwned + Default>(path: &str, value: Value) -> ConfigResult<T> {
    Ok(decode_opt(path, value)?.unwrap_or_default())
}

fn option<T>(path: &str, value: Value) -> ConfigResult<T>
where
    T: FromStr<Err = bronze_core::Error>,
{
    let raw: String = decode(path, value)?;
    raw.parse().map_err(|_| ConfigError::UnknownOption {
        field: path.to_string(),
        value: raw,
    })
}

/// Set or remove one key of a string map.
fn set_entry(map: &mut BTreeMap<String, String>, path: &str, key: &str, value: Value) -> ConfigResult<()> {
    match decode_opt::<String>(path, value)? {
        Some(v) => {
            map.insert(key.to_string(), v);
        }
        None => {
            map.remove(key);
        }
    }
    Ok(())
}

fn set(config: &mut SourceConfig, path: &str, value: Value) -> ConfigResult<()> {
    let parts: Vec<&str> = path.split('.').collect();
    let source_type = config.source_type();

    match parts.as_slice() {
        ["name"] => config.name = decode(path, value)?,
        ["description"] => config.description = decode_or_default(path, value)?,
        ["enabled"] => config.enabled = decode(path, value)?,
        ["tags"] => config.tags = decode_or_default(path, value)?,
        ["tags", key] => set_entry(&mut config.tags, path, key, value)?,

        ["source_type"] => {
            let next: SourceType = option(path, value)?;
            if next != source_type {
                tracing::debug!(from = %source_type, to = %next, "Switching source type");
                config.source = SourceKind::default_for(next);
            }
        }

        ["connection", rest @ ..] => {
            let SourceKind::Jdbc { connection, .. } = &mut config.source else {
                return Err(ConfigError::Inapplicable {
                    field: "connection".to_string(),
                    source_type,
                });
            };
            set_connection(connection, rest, path, value)?;
        }

        ["extract"] => {
            let doc: ExtractDocument = decode(path, value)?;
            let (connection, landing) = match &config.source {
                SourceKind::Jdbc { connection, .. } => {
                    (ConnectionDocument::from_model(connection), None)
                }
                SourceKind::File { landing, .. } => (
                    ConnectionDocument::default(),
                    Some(LandingDocument::from_model(landing)),
                ),
                _ => (ConnectionDocument::default(), None),
            };
            let (source, load) = document::build_source(source_type, connection, doc, landing)?;
            config.source = source;
            config.load = load;
        }
        ["extract", "load_type"] => {
            config.load = match option::<LoadType>(path, value)? {
                LoadType::Full => Load::Full,
                LoadType::Incremental => match std::mem::take(&mut config.load) {
                    Load::Full => Load::Incremental { watermark: None },
                    incremental => incremental,
                },
            };
        }
        ["extract", "watermark", rest @ ..] => set_watermark(&mut config.load, rest, path, value)?,
        ["extract", field, rest @ ..] => {
            if !registry::is_known_extract_field(field) {
                return Err(ConfigError::UnknownPath(path.to_string()));
            }
            if !registry::source_type_entry(source_type)?.allows_extract_field(field) {
                return Err(ConfigError::Inapplicable {
                    field: format!("extract.{}", field),
                    source_type,
                });
            }
            match &mut config.source {
                SourceKind::Jdbc { extract, .. } => set_jdbc(extract, field, rest, path, value)?,
                SourceKind::File { extract, .. } => set_file(extract, field, rest, path, value)?,
                SourceKind::Api(extract) => set_api(extract, field, rest, path, value)?,
                SourceKind::Stream(extract) => set_stream(extract, field, rest, path, value)?,
            }
        }

        ["target"] => {
            let mut doc: TargetDocument = decode(path, value)?;
            let landing = doc.landing.take();
            let target = doc.into_model()?;
            if let Some(landing) = landing {
                replace_landing(&mut config.source, source_type, landing)?;
            }
            config.target = target;
        }
        ["target", "landing", rest @ ..] => {
            set_landing(&mut config.source, source_type, rest, path, value)?
        }
        ["target", rest @ ..] => set_target(&mut config.target, rest, path, value)?,

        ["schedule"] => {
            config.schedule = decode_opt::<ScheduleDocument>(path, value)?
                .map(ScheduleDocument::into_model)
                .transpose()?;
        }
        ["schedule", field] => {
            let schedule = config.schedule.get_or_insert_with(ScheduleConfig::default);
            match *field {
                "cron_expression" => schedule.cron_expression = decode_opt(path, value)?,
                "timezone" => schedule.timezone = decode(path, value)?,
                "pause_status" => schedule.pause_status = option(path, value)?,
                _ => return Err(ConfigError::UnknownPath(path.to_string())),
            }
        }

        _ => return Err(ConfigError::UnknownPath(path.to_string())),
    }
    Ok(())
}

fn set_connection(
    connection: &mut JdbcConnection,
    rest: &[&str],
    path: &str,
    value: Value,
) -> ConfigResult<()> {
    match rest {
        [] => {
            *connection = decode_opt::<ConnectionDocument>(path, value)?
                .map(ConnectionDocument::into_model)
                .unwrap_or_default()
        }
        ["host"] => connection.host = decode_opt(path, value)?,
        ["port"] => connection.port = decode_opt(path, value)?,
        ["database"] => connection.database = decode_opt(path, value)?,
        ["driver"] => connection.driver = decode_opt(path, value)?,
        ["url"] => connection.url = decode_opt(path, value)?,
        ["secret_scope"] => connection.secret_scope = decode_opt(path, value)?,
        ["secret_key_user"] => connection.secret_key_user = decode_opt(path, value)?,
        ["secret_key_password"] => connection.secret_key_password = decode_opt(path, value)?,
        ["properties"] => connection.properties = decode_or_default(path, value)?,
        ["properties", key] => set_entry(&mut connection.properties, path, key, value)?,
        _ => return Err(ConfigError::UnknownPath(path.to_string())),
    }
    Ok(())
}

fn set_watermark(load: &mut Load, rest: &[&str], path: &str, value: Value) -> ConfigResult<()> {
    let Load::Incremental { watermark } = load else {
        // Clearing an absent watermark is a no-op.
        if rest.is_empty() && value.is_null() {
            return Ok(());
        }
        return Err(ConfigError::invalid(
            "extract.watermark",
            "watermark is only allowed for incremental loads",
        ));
    };

    match rest {
        [] => {
            *watermark = decode_opt::<WatermarkDocument>(path, value)?
                .map(WatermarkDocument::into_model)
                .transpose()?
        }
        [field] => {
            let watermark = watermark.get_or_insert_with(Watermark::default);
            match *field {
                "column" => watermark.column = decode(path, value)?,
                "type" => watermark.watermark_type = option(path, value)?,
                "default_value" => watermark.default_value = decode_opt(path, value)?,
                _ => return Err(ConfigError::UnknownPath(path.to_string())),
            }
        }
        _ => return Err(ConfigError::UnknownPath(path.to_string())),
    }
    Ok(())
}

fn set_jdbc(
    extract: &mut JdbcExtract,
    field: &str,
    rest: &[&str],
    path: &str,
    value: Value,
) -> ConfigResult<()> {
    match (field, rest) {
        ("table", []) => extract.table = decode_opt(path, value)?,
        ("query", []) => extract.query = decode_opt(path, value)?,
        ("partition_column", []) => extract.partition_column = decode_opt(path, value)?,
        ("num_partitions", []) => extract.num_partitions = decode(path, value)?,
        ("fetch_size", []) => extract.fetch_size = decode(path, value)?,
        _ => return Err(ConfigError::UnknownPath(path.to_string())),
    }
    Ok(())
}

fn set_file(
    extract: &mut FileExtract,
    field: &str,
    rest: &[&str],
    path: &str,
    value: Value,
) -> ConfigResult<()> {
    match (field, rest) {
        ("path", []) => extract.path = decode_opt(path, value)?,
        ("format", []) => extract.format = decode(path, value)?,
        ("format_options", []) => extract.format_options = decode_or_default(path, value)?,
        ("format_options", [key]) => set_entry(&mut extract.format_options, path, key, value)?,
        ("auto_loader", []) => extract.auto_loader = decode(path, value)?,
        ("checkpoint_path", []) => extract.checkpoint_path = decode_opt(path, value)?,
        _ => return Err(ConfigError::UnknownPath(path.to_string())),
    }
    Ok(())
}

fn set_api(
    extract: &mut ApiExtract,
    field: &str,
    rest: &[&str],
    path: &str,
    value: Value,
) -> ConfigResult<()> {
    match (field, rest) {
        ("base_url", []) => extract.base_url = decode_opt(path, value)?,
        ("endpoint", []) => extract.endpoint = decode_opt(path, value)?,
        ("method", []) => extract.method = decode(path, value)?,
        ("headers", []) => extract.headers = decode_or_default(path, value)?,
        ("headers", [key]) => set_entry(&mut extract.headers, path, key, value)?,
        ("params", []) => extract.params = decode_or_default(path, value)?,
        ("params", [key]) => set_entry(&mut extract.params, path, key, value)?,
        ("timeout_seconds", []) => extract.timeout_seconds = decode(path, value)?,
        ("max_retries", []) => extract.max_retries = decode(path, value)?,
        ("retry_backoff_factor", []) => extract.retry_backoff_factor = decode(path, value)?,
        ("response_root_path", []) => extract.response_root_path = decode(path, value)?,
        ("auth", rest) => set_auth(&mut extract.auth, rest, path, value)?,
        ("pagination", rest) => set_pagination(&mut extract.pagination, rest, path, value)?,
        _ => return Err(ConfigError::UnknownPath(path.to_string())),
    }
    Ok(())
}

fn set_auth(auth: &mut Option<ApiAuth>, rest: &[&str], path: &str, value: Value) -> ConfigResult<()> {
    let field = match rest {
        [] => {
            *auth = decode_opt::<AuthDocument>(path, value)?
                .map(AuthDocument::into_model)
                .transpose()?;
            return Ok(());
        }
        [field] => *field,
        _ => return Err(ConfigError::UnknownPath(path.to_string())),
    };

    if field == "type" {
        let auth_type: AuthType = option(path, value)?;
        let next = match auth.as_ref() {
            Some(current) => current.convert(auth_type),
            None => ApiAuth::default_for(auth_type),
        };
        *auth = Some(next);
        return Ok(());
    }

    let auth = auth.get_or_insert_with(|| ApiAuth::default_for(AuthType::default()));
    let auth_type = auth.auth_type();
    let not_used = || ConfigError::invalid(path, format!("not used by {} auth", auth_type));
    match (auth, field) {
        (ApiAuth::None, "secret_scope") => return Err(not_used()),
        (
            ApiAuth::Oauth2 { secret_scope, .. }
            | ApiAuth::ApiKey { secret_scope, .. }
            | ApiAuth::Bearer { secret_scope, .. },
            "secret_scope",
        ) => *secret_scope = decode_opt(path, value)?,
        (ApiAuth::Oauth2 { token_url, .. }, "token_url") => *token_url = decode_opt(path, value)?,
        (
            ApiAuth::Oauth2 {
                secret_key_client_id,
                ..
            },
            "secret_key_client_id",
        ) => *secret_key_client_id = decode_opt(path, value)?,
        (
            ApiAuth::Oauth2 {
                secret_key_client_secret,
                ..
            },
            "secret_key_client_secret",
        ) => *secret_key_client_secret = decode_opt(path, value)?,
        (
            ApiAuth::ApiKey {
                secret_key_token, ..
            }
            | ApiAuth::Bearer {
                secret_key_token, ..
            },
            "secret_key_token",
        ) => *secret_key_token = decode_opt(path, value)?,
        (
            ApiAuth::ApiKey { header_name, .. } | ApiAuth::Bearer { header_name, .. },
            "header_name",
        ) => *header_name = decode(path, value)?,
        (ApiAuth::Bearer { header_prefix, .. }, "header_prefix") => {
            *header_prefix = decode(path, value)?
        }
        (
            _,
            "token_url" | "secret_key_client_id" | "secret_key_client_secret" | "secret_key_token"
            | "header_name" | "header_prefix",
        ) => return Err(not_used()),
        _ => return Err(ConfigError::UnknownPath(path.to_string())),
    }
    Ok(())
}

fn set_pagination(
    pagination: &mut Option<Pagination>,
    rest: &[&str],
    path: &str,
    value: Value,
) -> ConfigResult<()> {
    let field = match rest {
        [] => {
            *pagination = decode_opt::<PaginationDocument>(path, value)?
                .map(PaginationDocument::into_model)
                .transpose()?;
            return Ok(());
        }
        [field] => *field,
        _ => return Err(ConfigError::UnknownPath(path.to_string())),
    };

    let pagination =
        pagination.get_or_insert_with(|| Pagination::default_for(PaginationType::default()));
    let pagination_type = pagination.style.pagination_type();
    match field {
        "type" => {
            let next: PaginationType = option(path, value)?;
            if next != pagination_type {
                pagination.style = switch_style(&pagination.style, next);
            }
            return Ok(());
        }
        "page_size" => {
            pagination.page_size = decode(path, value)?;
            return Ok(());
        }
        "max_pages" => {
            pagination.max_pages = decode_opt(path, value)?;
            return Ok(());
        }
        "data_response_path" => {
            pagination.data_response_path = decode(path, value)?;
            return Ok(());
        }
        _ => {}
    }

    match (&mut pagination.style, field) {
        (PaginationStyle::Offset { offset_param, .. }, "offset_param") => {
            *offset_param = decode(path, value)?
        }
        (
            PaginationStyle::Offset { limit_param, .. } | PaginationStyle::LinkHeader { limit_param },
            "limit_param",
        ) => *limit_param = decode(path, value)?,
        (PaginationStyle::Cursor { cursor_param, .. }, "cursor_param") => {
            *cursor_param = decode(path, value)?
        }
        (
            PaginationStyle::Cursor {
                cursor_response_path,
                ..
            },
            "cursor_response_path",
        ) => *cursor_response_path = decode_opt(path, value)?,
        (_, "offset_param" | "limit_param" | "cursor_param" | "cursor_response_path") => {
            return Err(ConfigError::invalid(
                path,
                format!("not used by {} pagination", pagination_type),
            ));
        }
        _ => return Err(ConfigError::UnknownPath(path.to_string())),
    }
    Ok(())
}

/// New pagination style, keeping the limit parameter when both styles have one.
fn switch_style(current: &PaginationStyle, next: PaginationType) -> PaginationStyle {
    let limit = match current {
        PaginationStyle::Offset { limit_param, .. } | PaginationStyle::LinkHeader { limit_param } => {
            Some(limit_param.clone())
        }
        PaginationStyle::Cursor { .. } => None,
    };
    let mut style = PaginationStyle::default_for(next);
    if let (
        PaginationStyle::Offset { limit_param, .. } | PaginationStyle::LinkHeader { limit_param },
        Some(limit),
    ) = (&mut style, limit)
    {
        *limit_param = limit;
    }
    style
}

fn set_stream(
    extract: &mut StreamExtract,
    field: &str,
    rest: &[&str],
    path: &str,
    value: Value,
) -> ConfigResult<()> {
    match (field, rest) {
        ("kafka_bootstrap_servers", []) => extract.kafka_bootstrap_servers = decode_opt(path, value)?,
        ("kafka_topic", []) => extract.kafka_topic = decode_opt(path, value)?,
        ("kafka_consumer_group", []) => extract.kafka_consumer_group = decode_opt(path, value)?,
        ("kafka_options", []) => extract.kafka_options = decode_or_default(path, value)?,
        ("kafka_options", [key]) => set_entry(&mut extract.kafka_options, path, key, value)?,
        ("event_hub_connection_string_key", []) => {
            extract.event_hub_connection_string_key = decode_opt(path, value)?
        }
        ("event_hub_consumer_group", []) => extract.event_hub_consumer_group = decode(path, value)?,
        ("checkpoint_path", []) => extract.checkpoint_path = decode_opt(path, value)?,
        ("starting_offsets", []) => extract.starting_offsets = decode(path, value)?,
        _ => return Err(ConfigError::UnknownPath(path.to_string())),
    }
    Ok(())
}

fn set_target(target: &mut TargetConfig, rest: &[&str], path: &str, value: Value) -> ConfigResult<()> {
    match rest {
        ["catalog"] => target.catalog = decode(path, value)?,
        ["schema"] => target.schema = decode(path, value)?,
        ["table"] => target.table = decode(path, value)?,
        ["partition_by"] => target.partition_by = decode_or_default(path, value)?,
        ["z_order_by"] => target.z_order_by = decode_or_default(path, value)?,
        ["table_properties"] => target.table_properties = decode_or_default(path, value)?,
        ["table_properties", key] => set_entry(&mut target.table_properties, path, key, value)?,
        ["metadata_columns"] => {
            target.metadata_columns = decode_or_default::<Vec<MetadataColumnDocument>>(path, value)?
                .into_iter()
                .map(MetadataColumnDocument::into_model)
                .collect()
        }

        ["schema_evolution"] => {
            target.schema_evolution = decode_opt::<SchemaEvolutionDocument>(path, value)?
                .map(SchemaEvolutionDocument::into_model)
                .transpose()?
                .unwrap_or_default()
        }
        ["schema_evolution", "mode"] => target.schema_evolution.mode = option(path, value)?,
        ["schema_evolution", "rescued_data_column"] => {
            target.schema_evolution.rescued_data_column = decode(path, value)?
        }

        ["quality"] => {
            target.quality = decode_opt::<QualityDocument>(path, value)?
                .map(QualityDocument::into_model)
                .unwrap_or_default()
        }
        ["quality", "enabled"] => target.quality.enabled = decode(path, value)?,
        ["quality", "quarantine_threshold_pct"] => {
            target.quality.quarantine_threshold_pct = decode_opt(path, value)?
        }
        ["quality", "dead_letter_table_suffix"] => {
            target.quality.dead_letter_table_suffix = decode(path, value)?
        }

        ["cdc"] => {
            target.cdc = decode_opt::<CdcDocument>(path, value)?
                .map(CdcDocument::into_model)
                .transpose()?
                .unwrap_or_default()
        }
        ["cdc", "enabled"] => target.cdc.enabled = decode(path, value)?,
        ["cdc", "mode"] => target.cdc.mode = option(path, value)?,
        ["cdc", "primary_keys"] => target.cdc.primary_keys = decode_or_default(path, value)?,
        ["cdc", "sequence_column"] => target.cdc.sequence_column = decode_opt(path, value)?,
        ["cdc", "exclude_columns_from_hash"] => {
            target.cdc.exclude_columns_from_hash = decode_or_default(path, value)?
        }
        ["cdc", "delete_condition_column"] => {
            target.cdc.delete_condition_column = decode_opt(path, value)?
        }
        ["cdc", "delete_condition_value"] => {
            target.cdc.delete_condition_value = decode_opt(path, value)?
        }

        _ => return Err(ConfigError::UnknownPath(path.to_string())),
    }
    Ok(())
}

fn landing_mut(source: &mut SourceKind, source_type: SourceType) -> ConfigResult<&mut LandingConfig> {
    match source {
        SourceKind::File { landing, .. } => Ok(landing),
        _ => Err(ConfigError::Inapplicable {
            field: "target.landing".to_string(),
            source_type,
        }),
    }
}

/// An empty landing block is accepted for every source type.
fn replace_landing(
    source: &mut SourceKind,
    source_type: SourceType,
    doc: LandingDocument,
) -> ConfigResult<()> {
    if doc.is_empty() && source_type != SourceType::File {
        return Ok(());
    }
    *landing_mut(source, source_type)? = doc.into_model();
    Ok(())
}

fn set_landing(
    source: &mut SourceKind,
    source_type: SourceType,
    rest: &[&str],
    path: &str,
    value: Value,
) -> ConfigResult<()> {
    let landing = landing_mut(source, source_type)?;
    match rest {
        [] => {
            *landing = decode_opt::<LandingDocument>(path, value)?
                .map(LandingDocument::into_model)
                .unwrap_or_default()
        }
        ["path"] => landing.path = decode_opt(path, value)?,
        ["archive_path"] => landing.archive_path = decode_opt(path, value)?,
        ["retention_days"] => landing.retention_days = decode(path, value)?,
        ["cleanup_enabled"] => landing.cleanup_enabled = decode(path, value)?,
        _ => return Err(ConfigError::UnknownPath(path.to_string())),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bronze_core::registry::{CdcMode, PauseStatus};
    use bronze_core::source::CdcConfig;
    use serde_json::json;

    fn jdbc() -> SourceConfig {
        let mut config = SourceConfig::create_default(SourceType::Jdbc);
        config.name = "erp_orders".to_string();
        config.target.table = "orders".to_string();
        config
    }

    #[test]
    fn test_patch_leaves_input_untouched() {
        let before = jdbc();
        let snapshot = before.clone();
        let after = apply_patch(&before, "target.cdc.mode", json!("upsert")).unwrap();
        assert_eq!(before, snapshot);
        assert_eq!(after.target.cdc.mode, CdcMode::Upsert);
        assert_eq!(after.target.table, "orders");
    }

    #[test]
    fn test_scalar_paths() {
        let config = apply_patches(
            &jdbc(),
            [
                ("description", json!("ERP orders")),
                ("connection.host", json!("erp.internal")),
                ("connection.port", json!(1433)),
                ("extract.table", json!("dbo.Orders")),
                ("tags.domain", json!("sales")),
                ("target.table_properties.delta.appendOnly", json!("true")),
            ],
        );
        // Map keys cannot contain dots.
        assert!(matches!(config, Err(ConfigError::UnknownPath(_))));

        let config = apply_patches(
            &jdbc(),
            [
                ("description", json!("ERP orders")),
                ("connection.host", json!("erp.internal")),
                ("connection.port", json!(1433)),
                ("extract.table", json!("dbo.Orders")),
                ("tags.domain", json!("sales")),
            ],
        )
        .unwrap();
        assert_eq!(config.description, "ERP orders");
        assert_eq!(config.tags.get("domain").map(String::as_str), Some("sales"));
        match &config.source {
            SourceKind::Jdbc {
                connection,
                extract,
            } => {
                assert_eq!(connection.host.as_deref(), Some("erp.internal"));
                assert_eq!(connection.port, Some(1433));
                assert_eq!(extract.table.as_deref(), Some("dbo.Orders"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_inapplicable_path_rejected() {
        let err = apply_patch(&jdbc(), "extract.kafka_topic", json!("orders")).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Inapplicable { ref field, source_type: SourceType::Jdbc } if field == "extract.kafka_topic"
        ));
        let err = apply_patch(&jdbc(), "target.landing.path", json!("/landing")).unwrap_err();
        assert_eq!(err.path(), Some("target.landing"));

        let file = SourceConfig::create_default(SourceType::File);
        let err = apply_patch(&file, "connection.host", json!("db")).unwrap_err();
        assert_eq!(err.path(), Some("connection"));
    }

    #[test]
    fn test_unknown_path_rejected() {
        let err = apply_patch(&jdbc(), "extract.kafka_topics", json!("x")).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownPath(ref p) if p == "extract.kafka_topics"));
        assert!(matches!(
            apply_patch(&jdbc(), "target.nope", json!(1)),
            Err(ConfigError::UnknownPath(_))
        ));
    }

    #[test]
    fn test_batch_is_atomic() {
        let before = jdbc();
        let err = apply_patches(
            &before,
            [
                ("extract.table", json!("dbo.Orders")),
                ("target.cdc.mode", json!("merge_into")),
            ],
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::UnknownOption { ref field, .. } if field == "target.cdc.mode"));
        match &before.source {
            SourceKind::Jdbc { extract, .. } => assert!(extract.table.is_none()),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_schedule_replaced_as_one_block() {
        let config = apply_patch(
            &jdbc(),
            "schedule",
            json!({"cron_expression": "0 0 6 * * ?", "timezone": "Europe/Berlin", "pause_status": "PAUSED"}),
        )
        .unwrap();
        let schedule = config.schedule.clone().unwrap();
        assert_eq!(schedule.cron_expression.as_deref(), Some("0 0 6 * * ?"));
        assert_eq!(schedule.timezone, "Europe/Berlin");
        assert_eq!(schedule.pause_status, PauseStatus::Paused);

        let cleared = apply_patch(&config, "schedule", Value::Null).unwrap();
        assert!(cleared.schedule.is_none());
    }

    #[test]
    fn test_missing_intermediate_created() {
        let config = apply_patch(&jdbc(), "schedule.timezone", json!("America/New_York")).unwrap();
        let schedule = config.schedule.unwrap();
        assert_eq!(schedule.timezone, "America/New_York");
        assert!(schedule.cron_expression.is_none());

        let api = SourceConfig::create_default(SourceType::Api);
        let api = apply_patch(&api, "extract.pagination.page_size", json!(250)).unwrap();
        match api.source {
            SourceKind::Api(extract) => {
                let pagination = extract.pagination.unwrap();
                assert_eq!(pagination.page_size, 250);
                assert_eq!(pagination.style.pagination_type(), PaginationType::Offset);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_load_type_toggles_watermark() {
        let incremental = apply_patches(
            &jdbc(),
            [
                ("extract.load_type", json!("incremental")),
                ("extract.watermark.column", json!("modified_at")),
            ],
        )
        .unwrap();
        assert_eq!(
            incremental.load.watermark().map(|w| w.column.as_str()),
            Some("modified_at")
        );

        let full = apply_patch(&incremental, "extract.load_type", json!("full")).unwrap();
        assert_eq!(full.load, Load::Full);
        let err = apply_patch(&full, "extract.watermark.column", json!("x")).unwrap_err();
        assert_eq!(err.path(), Some("extract.watermark"));
        assert!(apply_patch(&full, "extract.watermark", Value::Null).is_ok());
    }

    #[test]
    fn test_source_type_switch_redefaults_source() {
        let config = apply_patches(
            &jdbc(),
            [
                ("extract.table", json!("dbo.Orders")),
                ("target.cdc.enabled", json!(true)),
                ("source_type", json!("stream")),
                ("extract.kafka_topic", json!("orders")),
            ],
        )
        .unwrap();
        assert_eq!(config.source_type(), SourceType::Stream);
        assert!(config.target.cdc.enabled);
        match config.source {
            SourceKind::Stream(extract) => {
                assert_eq!(extract.kafka_topic.as_deref(), Some("orders"));
                assert_eq!(extract.starting_offsets, "earliest");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_auth_type_switch_carries_scope() {
        let api = SourceConfig::create_default(SourceType::Api);
        let api = apply_patches(
            &api,
            [
                ("extract.auth.type", json!("bearer")),
                ("extract.auth.secret_scope", json!("crm")),
                ("extract.auth.type", json!("oauth2")),
            ],
        )
        .unwrap();
        match &api.source {
            SourceKind::Api(extract) => {
                let auth = extract.auth.as_ref().unwrap();
                assert_eq!(auth.auth_type(), AuthType::Oauth2);
                assert_eq!(auth.secret_scope(), Some("crm"));
            }
            other => panic!("unexpected {:?}", other),
        }
        let err = apply_patch(&api, "extract.auth.header_prefix", json!("Token")).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn test_null_handling() {
        assert!(matches!(
            apply_patch(&jdbc(), "target.table", Value::Null),
            Err(ConfigError::NotNullable(_))
        ));
        let config = apply_patch(&jdbc(), "target.partition_by", Value::Null).unwrap();
        assert!(config.target.partition_by.is_empty());
        let config = apply_patch(&jdbc(), "target.cdc", Value::Null).unwrap();
        assert_eq!(config.target.cdc, CdcConfig::default());
    }

    #[test]
    fn test_type_mismatch_reports_path() {
        let err = apply_patch(&jdbc(), "extract.num_partitions", json!("many")).unwrap_err();
        assert_eq!(err.path(), Some("extract.num_partitions"));
    }

    #[test]
    fn test_whole_extract_replaced() {
        let config = apply_patch(
            &jdbc(),
            "extract",
            json!({"query": "SELECT 1", "load_type": "incremental", "watermark": {"column": "id", "type": "integer"}}),
        )
        .unwrap();
        assert_eq!(config.load.load_type(), LoadType::Incremental);
        match config.source {
            SourceKind::Jdbc { extract, .. } => {
                assert_eq!(extract.query.as_deref(), Some("SELECT 1"));
                assert_eq!(extract.fetch_size, 10_000);
            }
            other => panic!("unexpected {:?}", other),
        }
        let err = apply_patch(&jdbc(), "extract", json!({"path": "/data"})).unwrap_err();
        assert_eq!(err.path(), Some("extract.path"));
    }

    #[test]
    fn test_target_block_replace_keeps_landing_for_files() {
        let file = SourceConfig::create_default(SourceType::File);
        let config = apply_patch(
            &file,
            "target",
            json!({"catalog": "main", "schema": "bronze", "table": "files", "landing": {"path": "/landing"}}),
        )
        .unwrap();
        assert_eq!(config.target.catalog, "main");
        assert_eq!(config.landing().and_then(|l| l.path.as_deref()), Some("/landing"));
        assert!(config.target.partition_by.is_empty());
    }

    #[test]
    fn test_sub_structure_blocks() {
        let config = apply_patches(
            &jdbc(),
            [
                ("target.quality", json!({"enabled": false})),
                ("target.schema_evolution", json!({"mode": "rescue"})),
                (
                    "target.metadata_columns",
                    json!([{"name": "_batch_id", "expression": "uuid()"}]),
                ),
            ],
        )
        .unwrap();
        assert!(!config.target.quality.enabled);
        assert!(config.target.quality.quarantine_threshold_pct.is_none());
        assert_eq!(
            config.target.schema_evolution.mode,
            bronze_core::registry::SchemaEvolutionMode::Rescue
        );
        assert_eq!(
            config.target.schema_evolution.rescued_data_column,
            "_rescued_data"
        );
        assert_eq!(config.target.metadata_columns.len(), 1);
        assert_eq!(config.target.metadata_columns[0].name, "_batch_id");
    }

    #[test]
    fn test_pagination_switch_keeps_limit_param() {
        let api = SourceConfig::create_default(SourceType::Api);
        let api = apply_patches(
            &api,
            [
                ("extract.pagination.limit_param", json!("per_page")),
                ("extract.pagination.type", json!("link_header")),
            ],
        )
        .unwrap();
        match api.source {
            SourceKind::Api(extract) => assert_eq!(
                extract.pagination.unwrap().style,
                PaginationStyle::LinkHeader {
                    limit_param: "per_page".to_string()
                }
            ),
            other => panic!("unexpected {:?}", other),
        }
    }
}
