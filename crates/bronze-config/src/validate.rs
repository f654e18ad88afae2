//! Structural and cross-field validation of source configurations.
//!
//! User mistakes are collected as [`ValidationIssue`]s, one per failing rule,
//! each pointing at a dot path of the document. Only registry faults surface as
//! `Err`.

use std::collections::HashSet;
use std::sync::LazyLock;

use bronze_core::registry::{self, CdcMode, OptionKind, PauseStatus, SchemaEvolutionMode};
use bronze_core::source::{
    ApiAuth, ApiExtract, FileExtract, JdbcConnection, JdbcExtract, Load, PaginationStyle,
    ScheduleConfig, SourceConfig, SourceKind, StreamExtract, TargetConfig,
};
use derive_more::Display;
use regex::Regex;
use serde::Serialize;

use crate::cron::CronExpression;

static NAME_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[a-z][a-z0-9_]*$").unwrap());

static IDENTIFIER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:[A-Za-z_][A-Za-z0-9_]*|\$\{[A-Za-z_][A-Za-z0-9_.]*\})$").unwrap());

const HTTP_METHODS: &[&str] = &["GET", "POST", "PUT", "PATCH", "DELETE", "HEAD"];

/// One failing rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Display)]
#[display("{path}: {message}")]
pub struct ValidationIssue {
    pub path: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
}

impl ValidationResult {
    pub fn error_paths(&self) -> Vec<&str> {
        self.errors.iter().map(|e| e.path.as_str()).collect()
    }
}

/// Validate a configuration.
pub fn validate(config: &SourceConfig) -> bronze_core::Result<ValidationResult> {
    if let Err(err) = registry::source_type_entry(config.source_type()) {
        tracing::error!(error = %err, name = %config.name, "Registry fault during validation");
        return Err(err);
    }

    let mut checker = Checker::new(false);
    checker.check(config);

    let result = ValidationResult {
        valid: checker.errors.is_empty(),
        errors: checker.errors,
        warnings: checker.warnings,
    };
    tracing::debug!(
        name = %config.name,
        errors = result.errors.len(),
        warnings = result.warnings.len(),
        "Validated source"
    );
    Ok(result)
}

/// The checks every persisted configuration must pass: name format, watermark
/// against load type, auto loader checkpoint, CDC keys and the quality
/// threshold.
pub fn invariant_violations(config: &SourceConfig) -> Vec<ValidationIssue> {
    let mut checker = Checker::new(true);
    checker.check(config);
    checker.errors
}

struct Checker {
    invariants_only: bool,
    errors: Vec<ValidationIssue>,
    warnings: Vec<ValidationIssue>,
}

impl Checker {
    fn new(invariants_only: bool) -> Self {
        Self {
            invariants_only,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ValidationIssue {
            path: path.into(),
            message: message.into(),
        });
    }

    fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ValidationIssue {
            path: path.into(),
            message: message.into(),
        });
    }

    fn full(&self) -> bool {
        !self.invariants_only
    }

    fn require(&mut self, value: &Option<String>, path: &str, message: &str) -> bool {
        match value.as_deref().map(str::trim) {
            Some(v) if !v.is_empty() => true,
            _ => {
                self.error(path, message);
                false
            }
        }
    }

    fn check(&mut self, config: &SourceConfig) {
        self.check_name(&config.name);
        self.check_load(&config.load);
        match &config.source {
            SourceKind::Jdbc {
                connection,
                extract,
            } => {
                self.check_connection(connection);
                self.check_jdbc(extract);
            }
            SourceKind::File { extract, .. } => self.check_file(extract),
            SourceKind::Api(extract) => self.check_api(extract),
            SourceKind::Stream(extract) => self.check_stream(extract),
        }
        self.check_target(&config.target);
        if let Some(schedule) = &config.schedule {
            self.check_schedule(schedule);
        }
    }

    fn check_name(&mut self, name: &str) {
        if name.is_empty() {
            self.error("name", "name is required");
        } else if !NAME_REGEX.is_match(name) {
            self.error(
                "name",
                "must start with a lowercase letter and contain only lowercase letters, digits and underscores",
            );
        }
    }

    fn check_load(&mut self, load: &Load) {
        if let Load::Incremental { watermark } = load {
            match watermark {
                None => self.error(
                    "extract.watermark",
                    "watermark is required for incremental loads",
                ),
                Some(w) if w.column.trim().is_empty() => {
                    self.error("extract.watermark.column", "watermark column is required")
                }
                Some(_) => {}
            }
        }
    }

    fn check_connection(&mut self, connection: &JdbcConnection) {
        if !self.full() {
            return;
        }
        if connection.host.is_none() && connection.url.is_none() {
            self.warn("connection.host", "neither host nor url is set");
        }
        if connection.port == Some(0) {
            self.error("connection.port", "port must be between 1 and 65535");
        }
        if (connection.secret_key_user.is_some() || connection.secret_key_password.is_some())
            && connection.secret_scope.is_none()
        {
            self.error(
                "connection.secret_scope",
                "secret_scope is required when secret keys are referenced",
            );
        }
    }

    fn check_jdbc(&mut self, extract: &JdbcExtract) {
        if !self.full() {
            return;
        }
        let has = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
        match (has(&extract.table), has(&extract.query)) {
            (false, false) => self.error("extract.table", "either table or query is required"),
            (true, true) => self.warn("extract.query", "query takes precedence over table"),
            _ => {}
        }
        if extract.num_partitions < 1 {
            self.error("extract.num_partitions", "must be at least 1");
        }
        if extract.fetch_size < 1 {
            self.error("extract.fetch_size", "must be at least 1");
        }
        if extract.num_partitions > 1 && !has(&extract.partition_column) {
            self.error(
                "extract.partition_column",
                "partition_column is required when num_partitions is greater than 1",
            );
        }
    }

    fn check_file(&mut self, extract: &FileExtract) {
        if extract.auto_loader {
            self.require(
                &extract.checkpoint_path,
                "extract.checkpoint_path",
                "checkpoint_path is required when auto_loader is enabled",
            );
        }
        if !self.full() {
            return;
        }
        self.require(&extract.path, "extract.path", "path is required");
        self.check_open_option(OptionKind::FileFormat, &extract.format, "extract.format");
    }

    fn check_api(&mut self, extract: &ApiExtract) {
        if !self.full() {
            return;
        }
        if self.require(&extract.base_url, "extract.base_url", "base_url is required") {
            if let Some(base_url) = &extract.base_url {
                self.check_http_url(base_url, "extract.base_url");
            }
        }
        if !HTTP_METHODS.contains(&extract.method.to_ascii_uppercase().as_str()) {
            tracing::warn!(method = %extract.method, "Unrecognized HTTP method");
            self.warn(
                "extract.method",
                format!("unrecognized HTTP method '{}'", extract.method),
            );
        }
        if extract.timeout_seconds == 0 {
            self.error("extract.timeout_seconds", "must be greater than 0");
        }
        if !(extract.retry_backoff_factor.is_finite() && extract.retry_backoff_factor > 0.0) {
            self.error("extract.retry_backoff_factor", "must be greater than 0");
        }
        if let Some(auth) = &extract.auth {
            self.check_auth(auth);
        }
        if let Some(pagination) = &extract.pagination {
            if pagination.page_size == 0 {
                self.error("extract.pagination.page_size", "must be greater than 0");
            }
            if pagination.max_pages == Some(0) {
                self.error("extract.pagination.max_pages", "must be greater than 0");
            }
            match &pagination.style {
                PaginationStyle::Offset {
                    offset_param,
                    limit_param,
                } => {
                    if offset_param.trim().is_empty() {
                        self.error("extract.pagination.offset_param", "must not be empty");
                    }
                    if limit_param.trim().is_empty() {
                        self.error("extract.pagination.limit_param", "must not be empty");
                    }
                }
                PaginationStyle::Cursor {
                    cursor_param,
                    cursor_response_path,
                } => {
                    if cursor_param.trim().is_empty() {
                        self.error("extract.pagination.cursor_param", "must not be empty");
                    }
                    self.require(
                        cursor_response_path,
                        "extract.pagination.cursor_response_path",
                        "cursor_response_path is required for cursor pagination",
                    );
                }
                PaginationStyle::LinkHeader { limit_param } => {
                    if limit_param.trim().is_empty() {
                        self.error("extract.pagination.limit_param", "must not be empty");
                    }
                }
            }
        }
    }

    fn check_auth(&mut self, auth: &ApiAuth) {
        let references_secret = match auth {
            ApiAuth::None => false,
            ApiAuth::Oauth2 {
                token_url,
                secret_key_client_id,
                secret_key_client_secret,
                ..
            } => {
                if self.require(
                    token_url,
                    "extract.auth.token_url",
                    "token_url is required for oauth2 auth",
                ) {
                    if let Some(url) = token_url {
                        self.check_http_url(url, "extract.auth.token_url");
                    }
                }
                let id = self.require(
                    secret_key_client_id,
                    "extract.auth.secret_key_client_id",
                    "secret_key_client_id is required for oauth2 auth",
                );
                let secret = self.require(
                    secret_key_client_secret,
                    "extract.auth.secret_key_client_secret",
                    "secret_key_client_secret is required for oauth2 auth",
                );
                id || secret
            }
            ApiAuth::ApiKey {
                secret_key_token,
                header_name,
                ..
            }
            | ApiAuth::Bearer {
                secret_key_token,
                header_name,
                ..
            } => {
                if header_name.trim().is_empty() {
                    self.error("extract.auth.header_name", "must not be empty");
                }
                self.require(
                    secret_key_token,
                    "extract.auth.secret_key_token",
                    &format!("secret_key_token is required for {} auth", auth.auth_type()),
                )
            }
        };
        if references_secret && auth.secret_scope().is_none() {
            self.error(
                "extract.auth.secret_scope",
                "secret_scope is required when secret keys are referenced",
            );
        }
    }

    fn check_stream(&mut self, extract: &StreamExtract) {
        if !self.full() {
            return;
        }
        self.require(
            &extract.checkpoint_path,
            "extract.checkpoint_path",
            "checkpoint_path is required for stream sources",
        );
        if extract.event_hub_connection_string_key.is_none() {
            self.require(
                &extract.kafka_bootstrap_servers,
                "extract.kafka_bootstrap_servers",
                "kafka_bootstrap_servers is required unless an event hub connection is configured",
            );
            self.require(
                &extract.kafka_topic,
                "extract.kafka_topic",
                "kafka_topic is required unless an event hub connection is configured",
            );
        }
        // Per-partition offsets are a JSON object.
        let json_offsets = extract.starting_offsets.trim_start().starts_with('{')
            && serde_json::from_str::<serde_json::Map<String, serde_json::Value>>(
                &extract.starting_offsets,
            )
            .is_ok();
        if !json_offsets {
            self.check_open_option(
                OptionKind::StartingOffsets,
                &extract.starting_offsets,
                "extract.starting_offsets",
            );
        }
    }

    fn check_target(&mut self, target: &TargetConfig) {
        match target.quality.quarantine_threshold_pct {
            None if target.quality.enabled => self.error(
                "target.quality.quarantine_threshold_pct",
                "quarantine_threshold_pct is required when quality checks are enabled",
            ),
            Some(pct) if !(0.0..=100.0).contains(&pct) => self.error(
                "target.quality.quarantine_threshold_pct",
                "must be between 0 and 100",
            ),
            _ => {}
        }
        if target.cdc.requires_keys() && target.cdc.primary_keys.is_empty() {
            self.error(
                "target.cdc.primary_keys",
                format!("primary_keys are required for {} mode", target.cdc.mode),
            );
        }
        if !self.full() {
            return;
        }

        for (value, path) in [
            (&target.catalog, "target.catalog"),
            (&target.schema, "target.schema"),
            (&target.table, "target.table"),
        ] {
            if value.is_empty() {
                self.error(path, "required");
            } else if !IDENTIFIER_REGEX.is_match(value) {
                self.error(path, "must be an identifier or a ${var} placeholder");
            }
        }
        self.check_columns(&target.partition_by, "target.partition_by");
        self.check_columns(&target.z_order_by, "target.z_order_by");
        self.check_columns(&target.cdc.primary_keys, "target.cdc.primary_keys");

        let mut seen = HashSet::new();
        for (i, column) in target.metadata_columns.iter().enumerate() {
            if column.name.trim().is_empty() {
                self.error(format!("target.metadata_columns.{}.name", i), "must not be empty");
            } else if !seen.insert(column.name.as_str()) {
                self.error(
                    format!("target.metadata_columns.{}.name", i),
                    format!("duplicate metadata column '{}'", column.name),
                );
            }
            if column.expression.trim().is_empty() {
                self.error(
                    format!("target.metadata_columns.{}.expression", i),
                    "must not be empty",
                );
            }
        }

        if target.schema_evolution.mode == SchemaEvolutionMode::Rescue
            && target.schema_evolution.rescued_data_column.trim().is_empty()
        {
            self.error(
                "target.schema_evolution.rescued_data_column",
                "rescued_data_column is required in rescue mode",
            );
        }

        if target.cdc.delete_condition_value.is_some()
            && target.cdc.delete_condition_column.is_none()
        {
            self.error(
                "target.cdc.delete_condition_column",
                "delete_condition_column is required when delete_condition_value is set",
            );
        }
        if target.cdc.enabled
            && target.cdc.mode == CdcMode::Scd2
            && target.cdc.sequence_column.is_none()
        {
            self.warn(
                "target.cdc.sequence_column",
                "scd2 without a sequence_column orders same-key records arbitrarily",
            );
        }
    }

    fn check_columns(&mut self, columns: &[String], path: &str) {
        for (i, column) in columns.iter().enumerate() {
            if column.trim().is_empty() {
                self.error(format!("{}.{}", path, i), "column name must not be empty");
            }
        }
    }

    fn check_schedule(&mut self, schedule: &ScheduleConfig) {
        if !self.full() {
            return;
        }
        match &schedule.cron_expression {
            Some(expr) => {
                if let Err(err) = CronExpression::parse(expr) {
                    self.error("schedule.cron_expression", err.to_string());
                }
            }
            None if schedule.pause_status == PauseStatus::Paused => self.warn(
                "schedule.pause_status",
                "pausing has no effect without a cron_expression",
            ),
            None => {}
        }
        if schedule.timezone.parse::<chrono_tz::Tz>().is_err() {
            self.error(
                "schedule.timezone",
                format!("'{}' is not an IANA timezone name", schedule.timezone),
            );
        }
    }

    fn check_http_url(&mut self, value: &str, path: &str) {
        match url::Url::parse(value) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            Ok(url) => self.error(path, format!("unsupported URL scheme '{}'", url.scheme())),
            Err(err) => self.error(path, format!("invalid URL: {}", err)),
        }
    }

    fn check_open_option(&mut self, kind: OptionKind, value: &str, path: &str) {
        if !registry::lookup(kind, value).is_known() {
            tracing::warn!(%kind, value, "Unrecognized option value passed through");
            self.warn(path, format!("unrecognized {} '{}'", kind, value));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bronze_core::registry::{AuthType, PaginationType, SourceType, WatermarkType};
    use bronze_core::source::{Pagination, Watermark};

    fn named(source_type: SourceType) -> SourceConfig {
        let mut config = SourceConfig::create_default(source_type);
        config.name = "erp_orders".to_string();
        config.target.table = "orders".to_string();
        config
    }

    /// Fields with no sensible default that every new source must be given.
    fn fill_locators(config: &mut SourceConfig) {
        match &mut config.source {
            SourceKind::Jdbc { extract, .. } => extract.table = Some("dbo.Orders".to_string()),
            SourceKind::File { extract, .. } => extract.path = Some("/landing/orders".to_string()),
            SourceKind::Api(extract) => {
                extract.base_url = Some("https://api.example.com".to_string())
            }
            SourceKind::Stream(extract) => {
                extract.kafka_bootstrap_servers = Some("broker:9092".to_string());
                extract.kafka_topic = Some("orders".to_string());
                extract.checkpoint_path = Some("/checkpoints/orders".to_string());
            }
        }
    }

    fn api_extract(config: &mut SourceConfig) -> &mut ApiExtract {
        match &mut config.source {
            SourceKind::Api(extract) => extract,
            other => panic!("not an api source: {:?}", other),
        }
    }

    #[test]
    fn test_scenario_a_default_jdbc_is_valid() {
        let mut config = named(SourceType::Jdbc);
        fill_locators(&mut config);
        let result = validate(&config).unwrap();
        assert!(result.valid, "{:?}", result.errors);
        assert!(result.errors.is_empty());
    }

    #[test]
    fn test_defaults_only_miss_locator_fields() {
        let locators: &[&str] = &[
            "extract.table",
            "extract.path",
            "extract.base_url",
            "extract.checkpoint_path",
            "extract.kafka_bootstrap_servers",
            "extract.kafka_topic",
        ];
        for t in SourceType::ALL {
            let mut config = named(*t);
            let result = validate(&config).unwrap();
            for path in result.error_paths() {
                assert!(locators.contains(&path), "{}: unexpected error at {}", t, path);
            }

            fill_locators(&mut config);
            let result = validate(&config).unwrap();
            assert!(result.valid, "{}: {:?}", t, result.errors);
        }
    }

    #[test]
    fn test_scenario_b_oauth2_requires_token_url() {
        let mut config = named(SourceType::Api);
        fill_locators(&mut config);
        api_extract(&mut config).auth = Some(ApiAuth::default_for(AuthType::Oauth2));
        let result = validate(&config).unwrap();
        assert!(!result.valid);
        assert!(result.error_paths().contains(&"extract.auth.token_url"));
    }

    #[test]
    fn test_cdc_keys() {
        let mut config = named(SourceType::Jdbc);
        fill_locators(&mut config);
        config.target.cdc.enabled = true;
        config.target.cdc.mode = CdcMode::Upsert;
        let result = validate(&config).unwrap();
        assert_eq!(result.error_paths(), vec!["target.cdc.primary_keys"]);

        config.target.cdc.mode = CdcMode::Append;
        assert!(validate(&config).unwrap().valid);
    }

    #[test]
    fn test_watermark_follows_load_type() {
        let mut config = named(SourceType::Jdbc);
        fill_locators(&mut config);
        config.load = Load::Incremental { watermark: None };
        let result = validate(&config).unwrap();
        assert_eq!(result.error_paths(), vec!["extract.watermark"]);

        config.load = Load::Full;
        assert!(validate(&config).unwrap().valid);

        config.load = Load::Incremental {
            watermark: Some(Watermark {
                column: "modified_at".to_string(),
                watermark_type: WatermarkType::Timestamp,
                default_value: None,
            }),
        };
        assert!(validate(&config).unwrap().valid);
    }

    #[test]
    fn test_name_format() {
        let mut config = named(SourceType::Jdbc);
        fill_locators(&mut config);
        for bad in ["", "Orders", "1orders", "erp-orders", "erp orders"] {
            config.name = bad.to_string();
            assert_eq!(validate(&config).unwrap().error_paths(), vec!["name"], "{:?}", bad);
        }
    }

    #[test]
    fn test_quality_threshold_range() {
        let mut config = named(SourceType::Jdbc);
        fill_locators(&mut config);
        config.target.quality.quarantine_threshold_pct = Some(101.0);
        assert_eq!(
            validate(&config).unwrap().error_paths(),
            vec!["target.quality.quarantine_threshold_pct"]
        );
        config.target.quality.quarantine_threshold_pct = None;
        assert!(!validate(&config).unwrap().valid);
        config.target.quality.enabled = false;
        assert!(validate(&config).unwrap().valid);
    }

    #[test]
    fn test_api_ranges_and_url() {
        let mut config = named(SourceType::Api);
        fill_locators(&mut config);
        let extract = api_extract(&mut config);
        extract.base_url = Some("ftp://files.example.com".to_string());
        extract.timeout_seconds = 0;
        extract.retry_backoff_factor = 0.0;
        let result = validate(&config).unwrap();
        assert_eq!(
            result.error_paths(),
            vec![
                "extract.base_url",
                "extract.timeout_seconds",
                "extract.retry_backoff_factor"
            ]
        );
    }

    #[test]
    fn test_bearer_needs_token_and_scope() {
        let mut config = named(SourceType::Api);
        fill_locators(&mut config);
        api_extract(&mut config).auth = Some(ApiAuth::default_for(AuthType::Bearer));
        assert_eq!(
            validate(&config).unwrap().error_paths(),
            vec!["extract.auth.secret_key_token"]
        );

        api_extract(&mut config).auth = Some(ApiAuth::Bearer {
            secret_scope: None,
            secret_key_token: Some("token".to_string()),
            header_name: "Authorization".to_string(),
            header_prefix: "Bearer".to_string(),
        });
        assert_eq!(
            validate(&config).unwrap().error_paths(),
            vec!["extract.auth.secret_scope"]
        );
    }

    #[test]
    fn test_cursor_pagination_needs_response_path() {
        let mut config = named(SourceType::Api);
        fill_locators(&mut config);
        let mut pagination = Pagination::default_for(PaginationType::Cursor);
        pagination.max_pages = Some(0);
        api_extract(&mut config).pagination = Some(pagination);
        assert_eq!(
            validate(&config).unwrap().error_paths(),
            vec![
                "extract.pagination.max_pages",
                "extract.pagination.cursor_response_path"
            ]
        );
    }

    #[test]
    fn test_jdbc_partitioning() {
        let mut config = named(SourceType::Jdbc);
        if let SourceKind::Jdbc { extract, .. } = &mut config.source {
            extract.table = Some("dbo.Orders".to_string());
            extract.query = Some("SELECT * FROM dbo.Orders".to_string());
            extract.num_partitions = 8;
        }
        let result = validate(&config).unwrap();
        assert_eq!(result.error_paths(), vec!["extract.partition_column"]);
        assert!(result.warnings.iter().any(|w| w.path == "extract.query"));
    }

    #[test]
    fn test_event_hub_replaces_kafka() {
        let mut config = named(SourceType::Stream);
        if let SourceKind::Stream(extract) = &mut config.source {
            extract.event_hub_connection_string_key = Some("eh-conn".to_string());
            extract.checkpoint_path = Some("/checkpoints/eh".to_string());
            extract.starting_offsets = r#"{"orders": {"0": 42}}"#.to_string();
        }
        let result = validate(&config).unwrap();
        assert!(result.valid, "{:?}", result.errors);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_unknown_open_options_warn() {
        let mut config = named(SourceType::File);
        fill_locators(&mut config);
        if let SourceKind::File { extract, .. } = &mut config.source {
            extract.format = "xml".to_string();
        }
        let result = validate(&config).unwrap();
        assert!(result.valid);
        assert_eq!(result.warnings[0].path, "extract.format");
        assert_eq!(
            result.warnings[0].to_string(),
            "extract.format: unrecognized file format 'xml'"
        );
    }

    #[test]
    fn test_target_identifiers() {
        let mut config = named(SourceType::Jdbc);
        fill_locators(&mut config);
        config.target.catalog = "${catalog}".to_string();
        assert!(validate(&config).unwrap().valid);
        config.target.schema = "bronze layer".to_string();
        assert_eq!(validate(&config).unwrap().error_paths(), vec!["target.schema"]);
    }

    #[test]
    fn test_metadata_columns_unique() {
        let mut config = named(SourceType::Jdbc);
        fill_locators(&mut config);
        let first = config.target.metadata_columns[0].clone();
        config.target.metadata_columns.push(first);
        assert_eq!(
            validate(&config).unwrap().error_paths(),
            vec!["target.metadata_columns.4.name"]
        );
    }

    #[test]
    fn test_schedule_rules() {
        let mut config = named(SourceType::Jdbc);
        fill_locators(&mut config);
        config.schedule = Some(ScheduleConfig {
            cron_expression: Some("0 0 6 * * ?".to_string()),
            timezone: "Europe/Berlin".to_string(),
            pause_status: PauseStatus::Unpaused,
        });
        assert!(validate(&config).unwrap().valid);

        config.schedule = Some(ScheduleConfig {
            cron_expression: Some("not a cron".to_string()),
            timezone: "Mars/Olympus Mons".to_string(),
            pause_status: PauseStatus::Unpaused,
        });
        assert_eq!(
            validate(&config).unwrap().error_paths(),
            vec!["schedule.cron_expression", "schedule.timezone"]
        );

        config.schedule = Some(ScheduleConfig {
            pause_status: PauseStatus::Paused,
            ..ScheduleConfig::default()
        });
        let result = validate(&config).unwrap();
        assert!(result.valid);
        assert_eq!(result.warnings[0].path, "schedule.pause_status");
    }

    #[test]
    fn test_schedule_timezone_lookup() {
        let mut config = named(SourceType::Jdbc);
        fill_locators(&mut config);
        for (timezone, valid) in [
            ("UTC", true),
            ("CET", true),
            ("Zulu", true),
            ("EST5EDT", true),
            ("America/Argentina/Buenos_Aires", true),
            ("Mars/Phobos", false),
            ("Europe/Atlantis", false),
        ] {
            config.schedule = Some(ScheduleConfig {
                timezone: timezone.to_string(),
                ..ScheduleConfig::default()
            });
            let result = validate(&config).unwrap();
            assert_eq!(result.valid, valid, "{}", timezone);
        }
    }

    #[test]
    fn test_invariants_ignore_incomplete_locators() {
        let config = named(SourceType::Stream);
        assert!(invariant_violations(&config).is_empty());
        let mut config = named(SourceType::File);
        if let SourceKind::File { extract, .. } = &mut config.source {
            extract.auto_loader = true;
        }
        let violations = invariant_violations(&config);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].path, "extract.checkpoint_path");
    }
}
