//! Declarative source documents.
//!
//! [`SourceDocument`] is the serialized shape of a source: the YAML file a
//! pipeline consumes and the JSON body the API accepts. Its field names are
//! the wire contract. Enum-valued fields travel as strings and are resolved
//! through the registry so an unknown value is reported with its path.
//!
//! Serialization only emits fields that apply to the source's type; parsing
//! rejects fields that do not.

use std::collections::BTreeMap;
use std::str::FromStr;

use bronze_core::registry::{self, SourceType};
use bronze_core::source::{
    ApiAuth, ApiExtract, CdcConfig, FileExtract, JdbcConnection, JdbcExtract, LandingConfig, Load,
    MetadataColumn, Pagination, PaginationStyle, QualityConfig, ScheduleConfig, SchemaEvolution,
    SourceConfig, SourceKind, StreamExtract, TargetConfig, Watermark,
};
use serde::{Deserialize, Serialize};

use crate::validate;
use crate::{ConfigError, ConfigResult};

/// Render the canonical YAML text of a configuration.
pub fn to_document(config: &SourceConfig) -> ConfigResult<String> {
    Ok(serde_yaml::to_string(&SourceDocument::from_config(config))?)
}

/// Parse YAML text into a configuration.
///
/// Fails with the offending path on missing required fields, unknown option
/// values, fields foreign to the source type, and violated invariants.
pub fn from_document(text: &str) -> ConfigResult<SourceConfig> {
    let doc: SourceDocument = serde_yaml::from_str(text)?;
    let config = doc.into_config()?;

    if let Some(issue) = validate::invariant_violations(&config).into_iter().next() {
        return Err(ConfigError::InvalidValue {
            field: issue.path,
            message: issue.message,
        });
    }

    tracing::debug!(name = %config.name, source_type = %config.source_type(), "Parsed source document");
    Ok(config)
}

fn parse_option<T>(field: &str, value: &str) -> ConfigResult<T>
where
    T: FromStr<Err = bronze_core::Error>,
{
    value.parse().map_err(|_| ConfigError::UnknownOption {
        field: field.to_string(),
        value: value.to_string(),
    })
}

fn required<T>(value: Option<T>, field: &str) -> ConfigResult<T> {
    value.ok_or_else(|| ConfigError::MissingField(field.to_string()))
}

fn non_empty<K: Ord, V>(map: &BTreeMap<K, V>) -> Option<BTreeMap<K, V>>
where
    K: Clone,
    V: Clone,
{
    if map.is_empty() {
        None
    } else {
        Some(map.clone())
    }
}

fn non_empty_list<T: Clone>(items: &[T]) -> Option<Vec<T>> {
    (!items.is_empty()).then(|| items.to_vec())
}

/// Root document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceDocument {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection: Option<ConnectionDocument>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extract: Option<ExtractDocument>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<TargetDocument>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule: Option<ScheduleDocument>,
}

impl SourceDocument {
    pub fn from_config(config: &SourceConfig) -> Self {
        let (connection, extract, landing) = match &config.source {
            SourceKind::Jdbc {
                connection,
                extract,
            } => (
                Some(ConnectionDocument::from_model(connection)),
                ExtractDocument::from_jdbc(extract),
                None,
            ),
            SourceKind::File { extract, landing } => (
                None,
                ExtractDocument::from_file(extract),
                Some(LandingDocument::from_model(landing)),
            ),
            SourceKind::Api(extract) => (None, ExtractDocument::from_api(extract), None),
            SourceKind::Stream(extract) => (None, ExtractDocument::from_stream(extract), None),
        };

        let mut extract = extract;
        extract.load_type = Some(config.load.load_type().as_str().to_string());
        extract.watermark = config.load.watermark().map(WatermarkDocument::from_model);

        let mut target = TargetDocument::from_model(&config.target);
        target.landing = landing;

        Self {
            name: Some(config.name.clone()),
            source_type: Some(config.source_type().as_str().to_string()),
            description: Some(config.description.clone()),
            enabled: Some(config.enabled),
            tags: config.tags.clone(),
            connection,
            extract: Some(extract),
            target: Some(target),
            schedule: config.schedule.as_ref().map(ScheduleDocument::from_model),
        }
    }

    /// Structural conversion into the typed model.
    ///
    /// Checks required keys, option values and field applicability. Invariants
    /// that the model can represent as violations (a missing watermark, CDC
    /// without keys, ...) are left to the validator.
    pub fn into_config(self) -> ConfigResult<SourceConfig> {
        let name = required(self.name, "name")?;
        let source_type: SourceType =
            parse_option("source_type", &required(self.source_type, "source_type")?)?;
        let mut target = required(self.target, "target")?;
        let landing = target.landing.take();
        let (source, load) = build_source(
            source_type,
            self.connection.unwrap_or_default(),
            self.extract.unwrap_or_default(),
            landing,
        )?;

        Ok(SourceConfig {
            name,
            description: self.description.unwrap_or_default(),
            enabled: self.enabled.unwrap_or(true),
            tags: self.tags,
            source,
            load,
            target: target.into_model()?,
            schedule: self.schedule.map(ScheduleDocument::into_model).transpose()?,
        })
    }
}

/// Assemble the source-type dependent parts of a config.
pub(crate) fn build_source(
    source_type: SourceType,
    connection: ConnectionDocument,
    mut extract: ExtractDocument,
    landing: Option<LandingDocument>,
) -> ConfigResult<(SourceKind, Load)> {
    let entry = registry::source_type_entry(source_type)?;

    if !entry.connection {
        if let Some(field) = connection.present_fields().first() {
            return Err(ConfigError::Inapplicable {
                field: format!("connection.{}", field),
                source_type,
            });
        }
    }
    if !entry.landing && landing.as_ref().is_some_and(|l| !l.is_empty()) {
        return Err(ConfigError::Inapplicable {
            field: "target.landing".to_string(),
            source_type,
        });
    }
    if let Some(field) = extract
        .present_fields()
        .into_iter()
        .find(|f| !entry.allows_extract_field(f))
    {
        return Err(ConfigError::Inapplicable {
            field: format!("extract.{}", field),
            source_type,
        });
    }

    let load = extract.take_load()?;
    let source = match source_type {
        SourceType::Jdbc => SourceKind::Jdbc {
            connection: connection.into_model(),
            extract: extract.into_jdbc(),
        },
        SourceType::File => SourceKind::File {
            extract: extract.into_file(),
            landing: landing.map(LandingDocument::into_model).unwrap_or_default(),
        },
        SourceType::Api => SourceKind::Api(extract.into_api()?),
        SourceType::Stream => SourceKind::Stream(extract.into_stream()),
    };
    Ok((source, load))
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConnectionDocument {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub driver: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_scope: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_key_user: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_key_password: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, String>,
}

impl ConnectionDocument {
    pub(crate) fn from_model(c: &JdbcConnection) -> Self {
        Self {
            host: c.host.clone(),
            port: c.port,
            database: c.database.clone(),
            driver: c.driver.clone(),
            url: c.url.clone(),
            secret_scope: c.secret_scope.clone(),
            secret_key_user: c.secret_key_user.clone(),
            secret_key_password: c.secret_key_password.clone(),
            properties: c.properties.clone(),
        }
    }

    pub(crate) fn into_model(self) -> JdbcConnection {
        JdbcConnection {
            host: self.host,
            port: self.port,
            database: self.database,
            driver: self.driver,
            url: self.url,
            secret_scope: self.secret_scope,
            secret_key_user: self.secret_key_user,
            secret_key_password: self.secret_key_password,
            properties: self.properties,
        }
    }

    pub(crate) fn present_fields(&self) -> Vec<&'static str> {
        [
            ("host", self.host.is_some()),
            ("port", self.port.is_some()),
            ("database", self.database.is_some()),
            ("driver", self.driver.is_some()),
            ("url", self.url.is_some()),
            ("secret_scope", self.secret_scope.is_some()),
            ("secret_key_user", self.secret_key_user.is_some()),
            ("secret_key_password", self.secret_key_password.is_some()),
            ("properties", !self.properties.is_empty()),
        ]
        .into_iter()
        .filter_map(|(field, present)| present.then_some(field))
        .collect()
    }
}

/// Union of every extract field; only those of the document's source type
/// may be present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractDocument {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub load_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub watermark: Option<WatermarkDocument>,
    // jdbc
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partition_column: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_partitions: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fetch_size: Option<u32>,
    // file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format_options: Option<BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_loader: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checkpoint_path: Option<String>,
    // api
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_seconds: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_retries: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_backoff_factor: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_root_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth: Option<AuthDocument>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<PaginationDocument>,
    // stream
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kafka_bootstrap_servers: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kafka_topic: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kafka_consumer_group: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kafka_options: Option<BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_hub_connection_string_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_hub_consumer_group: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub starting_offsets: Option<String>,
}

impl ExtractDocument {
    fn from_jdbc(e: &JdbcExtract) -> Self {
        Self {
            table: e.table.clone(),
            query: e.query.clone(),
            partition_column: e.partition_column.clone(),
            num_partitions: Some(e.num_partitions),
            fetch_size: Some(e.fetch_size),
            ..Self::default()
        }
    }

    fn from_file(e: &FileExtract) -> Self {
        Self {
            path: e.path.clone(),
            format: Some(e.format.clone()),
            format_options: non_empty(&e.format_options),
            auto_loader: Some(e.auto_loader),
            checkpoint_path: e.checkpoint_path.clone(),
            ..Self::default()
        }
    }

    fn from_api(e: &ApiExtract) -> Self {
        Self {
            base_url: e.base_url.clone(),
            endpoint: e.endpoint.clone(),
            method: Some(e.method.clone()),
            headers: non_empty(&e.headers),
            params: non_empty(&e.params),
            timeout_seconds: Some(e.timeout_seconds),
            max_retries: Some(e.max_retries),
            retry_backoff_factor: Some(e.retry_backoff_factor),
            response_root_path: Some(e.response_root_path.clone()),
            auth: e.auth.as_ref().map(AuthDocument::from_model),
            pagination: e.pagination.as_ref().map(PaginationDocument::from_model),
            ..Self::default()
        }
    }

    fn from_stream(e: &StreamExtract) -> Self {
        Self {
            kafka_bootstrap_servers: e.kafka_bootstrap_servers.clone(),
            kafka_topic: e.kafka_topic.clone(),
            kafka_consumer_group: e.kafka_consumer_group.clone(),
            kafka_options: non_empty(&e.kafka_options),
            event_hub_connection_string_key: e.event_hub_connection_string_key.clone(),
            event_hub_consumer_group: Some(e.event_hub_consumer_group.clone()),
            checkpoint_path: e.checkpoint_path.clone(),
            starting_offsets: Some(e.starting_offsets.clone()),
            ..Self::default()
        }
    }

    /// Names of the fields carrying a value. Empty maps count as absent.
    pub(crate) fn present_fields(&self) -> Vec<&'static str> {
        let has_map = |m: &Option<BTreeMap<String, String>>| m.as_ref().is_some_and(|m| !m.is_empty());
        [
            ("load_type", self.load_type.is_some()),
            ("watermark", self.watermark.is_some()),
            ("table", self.table.is_some()),
            ("query", self.query.is_some()),
            ("partition_column", self.partition_column.is_some()),
            ("num_partitions", self.num_partitions.is_some()),
            ("fetch_size", self.fetch_size.is_some()),
            ("path", self.path.is_some()),
            ("format", self.format.is_some()),
            ("format_options", has_map(&self.format_options)),
            ("auto_loader", self.auto_loader.is_some()),
            ("checkpoint_path", self.checkpoint_path.is_some()),
            ("base_url", self.base_url.is_some()),
            ("endpoint", self.endpoint.is_some()),
            ("method", self.method.is_some()),
            ("headers", has_map(&self.headers)),
            ("params", has_map(&self.params)),
            ("timeout_seconds", self.timeout_seconds.is_some()),
            ("max_retries", self.max_retries.is_some()),
            ("retry_backoff_factor", self.retry_backoff_factor.is_some()),
            ("response_root_path", self.response_root_path.is_some()),
            ("auth", self.auth.is_some()),
            ("pagination", self.pagination.is_some()),
            ("kafka_bootstrap_servers", self.kafka_bootstrap_servers.is_some()),
            ("kafka_topic", self.kafka_topic.is_some()),
            ("kafka_consumer_group", self.kafka_consumer_group.is_some()),
            ("kafka_options", has_map(&self.kafka_options)),
            (
                "event_hub_connection_string_key",
                self.event_hub_connection_string_key.is_some(),
            ),
            ("event_hub_consumer_group", self.event_hub_consumer_group.is_some()),
            ("starting_offsets", self.starting_offsets.is_some()),
        ]
        .into_iter()
        .filter_map(|(field, present)| present.then_some(field))
        .collect()
    }

    fn take_load(&mut self) -> ConfigResult<Load> {
        let load_type = match self.load_type.take() {
            Some(value) => parse_option("extract.load_type", &value)?,
            None => registry::LoadType::Full,
        };
        let watermark = self
            .watermark
            .take()
            .map(WatermarkDocument::into_model)
            .transpose()?;

        match load_type {
            registry::LoadType::Full if watermark.is_some() => Err(ConfigError::invalid(
                "extract.watermark",
                "watermark is only allowed for incremental loads",
            )),
            registry::LoadType::Full => Ok(Load::Full),
            registry::LoadType::Incremental => Ok(Load::Incremental { watermark }),
        }
    }

    fn into_jdbc(self) -> JdbcExtract {
        let defaults = JdbcExtract::default();
        JdbcExtract {
            table: self.table,
            query: self.query,
            partition_column: self.partition_column,
            num_partitions: self.num_partitions.unwrap_or(defaults.num_partitions),
            fetch_size: self.fetch_size.unwrap_or(defaults.fetch_size),
        }
    }

    fn into_file(self) -> FileExtract {
        let defaults = FileExtract::default();
        FileExtract {
            path: self.path,
            format: self.format.unwrap_or(defaults.format),
            format_options: self.format_options.unwrap_or_default(),
            auto_loader: self.auto_loader.unwrap_or(defaults.auto_loader),
            checkpoint_path: self.checkpoint_path,
        }
    }

    fn into_api(self) -> ConfigResult<ApiExtract> {
        let defaults = ApiExtract::default();
        Ok(ApiExtract {
            base_url: self.base_url,
            endpoint: self.endpoint,
            method: self.method.unwrap_or(defaults.method),
            headers: self.headers.unwrap_or_default(),
            params: self.params.unwrap_or_default(),
            timeout_seconds: self.timeout_seconds.unwrap_or(defaults.timeout_seconds),
            max_retries: self.max_retries.unwrap_or(defaults.max_retries),
            retry_backoff_factor: self
                .retry_backoff_factor
                .unwrap_or(defaults.retry_backoff_factor),
            response_root_path: self
                .response_root_path
                .unwrap_or(defaults.response_root_path),
            auth: self.auth.map(AuthDocument::into_model).transpose()?,
            pagination: self
                .pagination
                .map(PaginationDocument::into_model)
                .transpose()?,
        })
    }

    fn into_stream(self) -> StreamExtract {
        let defaults = StreamExtract::default();
        StreamExtract {
            kafka_bootstrap_servers: self.kafka_bootstrap_servers,
            kafka_topic: self.kafka_topic,
            kafka_consumer_group: self.kafka_consumer_group,
            kafka_options: self.kafka_options.unwrap_or_default(),
            event_hub_connection_string_key: self.event_hub_connection_string_key,
            event_hub_consumer_group: self
                .event_hub_consumer_group
                .unwrap_or(defaults.event_hub_consumer_group),
            checkpoint_path: self.checkpoint_path,
            starting_offsets: self.starting_offsets.unwrap_or(defaults.starting_offsets),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WatermarkDocument {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub watermark_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
}

impl WatermarkDocument {
    fn from_model(w: &Watermark) -> Self {
        Self {
            column: Some(w.column.clone()),
            watermark_type: Some(w.watermark_type.as_str().to_string()),
            default_value: w.default_value.clone(),
        }
    }

    pub(crate) fn into_model(self) -> ConfigResult<Watermark> {
        Ok(Watermark {
            column: required(self.column, "extract.watermark.column")?,
            watermark_type: match self.watermark_type {
                Some(t) => parse_option("extract.watermark.type", &t)?,
                None => registry::WatermarkType::default(),
            },
            default_value: self.default_value,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthDocument {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub auth_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_scope: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_key_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_key_client_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_key_client_secret: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header_prefix: Option<String>,
}

impl AuthDocument {
    fn from_model(auth: &ApiAuth) -> Self {
        let mut doc = Self {
            auth_type: Some(auth.auth_type().as_str().to_string()),
            ..Self::default()
        };
        match auth {
            ApiAuth::None => {}
            ApiAuth::Oauth2 {
                secret_scope,
                token_url,
                secret_key_client_id,
                secret_key_client_secret,
            } => {
                doc.secret_scope = secret_scope.clone();
                doc.token_url = token_url.clone();
                doc.secret_key_client_id = secret_key_client_id.clone();
                doc.secret_key_client_secret = secret_key_client_secret.clone();
            }
            ApiAuth::ApiKey {
                secret_scope,
                secret_key_token,
                header_name,
            } => {
                doc.secret_scope = secret_scope.clone();
                doc.secret_key_token = secret_key_token.clone();
                doc.header_name = Some(header_name.clone());
            }
            ApiAuth::Bearer {
                secret_scope,
                secret_key_token,
                header_name,
                header_prefix,
            } => {
                doc.secret_scope = secret_scope.clone();
                doc.secret_key_token = secret_key_token.clone();
                doc.header_name = Some(header_name.clone());
                doc.header_prefix = Some(header_prefix.clone());
            }
        }
        doc
    }

    pub(crate) fn into_model(self) -> ConfigResult<ApiAuth> {
        let auth_type: registry::AuthType = match &self.auth_type {
            Some(t) => parse_option("extract.auth.type", t)?,
            None => registry::AuthType::default(),
        };
        let fields = [
            ("secret_scope", self.secret_scope.is_some()),
            ("secret_key_token", self.secret_key_token.is_some()),
            ("secret_key_client_id", self.secret_key_client_id.is_some()),
            ("secret_key_client_secret", self.secret_key_client_secret.is_some()),
            ("token_url", self.token_url.is_some()),
            ("header_name", self.header_name.is_some()),
            ("header_prefix", self.header_prefix.is_some()),
        ];
        let allowed: &[&str] = match auth_type {
            registry::AuthType::None => &[],
            registry::AuthType::Oauth2 => &[
                "secret_scope",
                "secret_key_client_id",
                "secret_key_client_secret",
                "token_url",
            ],
            registry::AuthType::ApiKey => &["secret_scope", "secret_key_token", "header_name"],
            registry::AuthType::Bearer => &[
                "secret_scope",
                "secret_key_token",
                "header_name",
                "header_prefix",
            ],
        };
        if let Some((field, _)) = fields
            .iter()
            .find(|(field, present)| *present && !allowed.contains(field))
        {
            return Err(ConfigError::invalid(
                format!("extract.auth.{}", field),
                format!("not used by {} auth", auth_type),
            ));
        }

        let mut auth = ApiAuth::default_for(auth_type);
        match &mut auth {
            ApiAuth::None => {}
            ApiAuth::Oauth2 {
                secret_scope,
                token_url,
                secret_key_client_id,
                secret_key_client_secret,
            } => {
                *secret_scope = self.secret_scope;
                *token_url = self.token_url;
                *secret_key_client_id = self.secret_key_client_id;
                *secret_key_client_secret = self.secret_key_client_secret;
            }
            ApiAuth::ApiKey {
                secret_scope,
                secret_key_token,
                header_name,
            } => {
                *secret_scope = self.secret_scope;
                *secret_key_token = self.secret_key_token;
                if let Some(h) = self.header_name {
                    *header_name = h;
                }
            }
            ApiAuth::Bearer {
                secret_scope,
                secret_key_token,
                header_name,
                header_prefix,
            } => {
                *secret_scope = self.secret_scope;
                *secret_key_token = self.secret_key_token;
                if let Some(h) = self.header_name {
                    *header_name = h;
                }
                if let Some(p) = self.header_prefix {
                    *header_prefix = p;
                }
            }
        }
        Ok(auth)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaginationDocument {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub pagination_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_pages: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset_param: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit_param: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cursor_param: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cursor_response_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_response_path: Option<String>,
}

impl PaginationDocument {
    fn from_model(p: &Pagination) -> Self {
        let mut doc = Self {
            pagination_type: Some(p.style.pagination_type().as_str().to_string()),
            page_size: Some(p.page_size),
            max_pages: p.max_pages,
            data_response_path: Some(p.data_response_path.clone()),
            ..Self::default()
        };
        match &p.style {
            PaginationStyle::Offset {
                offset_param,
                limit_param,
            } => {
                doc.offset_param = Some(offset_param.clone());
                doc.limit_param = Some(limit_param.clone());
            }
            PaginationStyle::Cursor {
                cursor_param,
                cursor_response_path,
            } => {
                doc.cursor_param = Some(cursor_param.clone());
                doc.cursor_response_path = cursor_response_path.clone();
            }
            PaginationStyle::LinkHeader { limit_param } => {
                doc.limit_param = Some(limit_param.clone());
            }
        }
        doc
    }

    pub(crate) fn into_model(self) -> ConfigResult<Pagination> {
        let pagination_type: registry::PaginationType = match &self.pagination_type {
            Some(t) => parse_option("extract.pagination.type", t)?,
            None => registry::PaginationType::default(),
        };
        let mut pagination = Pagination::default_for(pagination_type);
        if let Some(size) = self.page_size {
            pagination.page_size = size;
        }
        pagination.max_pages = self.max_pages;
        if let Some(path) = self.data_response_path {
            pagination.data_response_path = path;
        }

        let foreign: &[(&str, bool)] = match pagination_type {
            registry::PaginationType::Offset => &[
                ("cursor_param", self.cursor_param.is_some()),
                ("cursor_response_path", self.cursor_response_path.is_some()),
            ],
            registry::PaginationType::Cursor => &[
                ("offset_param", self.offset_param.is_some()),
                ("limit_param", self.limit_param.is_some()),
            ],
            registry::PaginationType::LinkHeader => &[
                ("offset_param", self.offset_param.is_some()),
                ("cursor_param", self.cursor_param.is_some()),
                ("cursor_response_path", self.cursor_response_path.is_some()),
            ],
        };
        if let Some((field, _)) = foreign.iter().find(|(_, present)| *present) {
            return Err(ConfigError::invalid(
                format!("extract.pagination.{}", field),
                format!("not used by {} pagination", pagination_type),
            ));
        }

        match &mut pagination.style {
            PaginationStyle::Offset {
                offset_param,
                limit_param,
            } => {
                if let Some(p) = self.offset_param {
                    *offset_param = p;
                }
                if let Some(p) = self.limit_param {
                    *limit_param = p;
                }
            }
            PaginationStyle::Cursor {
                cursor_param,
                cursor_response_path,
            } => {
                if let Some(p) = self.cursor_param {
                    *cursor_param = p;
                }
                *cursor_response_path = self.cursor_response_path;
            }
            PaginationStyle::LinkHeader { limit_param } => {
                if let Some(p) = self.limit_param {
                    *limit_param = p;
                }
            }
        }
        Ok(pagination)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TargetDocument {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalog: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partition_by: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub z_order_by: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_properties: Option<BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata_columns: Option<Vec<MetadataColumnDocument>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema_evolution: Option<SchemaEvolutionDocument>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality: Option<QualityDocument>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cdc: Option<CdcDocument>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub landing: Option<LandingDocument>,
}

impl TargetDocument {
    fn from_model(t: &TargetConfig) -> Self {
        Self {
            catalog: Some(t.catalog.clone()),
            schema: Some(t.schema.clone()),
            table: Some(t.table.clone()),
            partition_by: non_empty_list(&t.partition_by),
            z_order_by: non_empty_list(&t.z_order_by),
            table_properties: non_empty(&t.table_properties),
            metadata_columns: (!t.metadata_columns.is_empty()).then(|| {
                t.metadata_columns
                    .iter()
                    .map(MetadataColumnDocument::from_model)
                    .collect()
            }),
            schema_evolution: Some(SchemaEvolutionDocument::from_model(&t.schema_evolution)),
            quality: Some(QualityDocument::from_model(&t.quality)),
            cdc: Some(CdcDocument::from_model(&t.cdc)),
            landing: None,
        }
    }

    /// Absent lists and maps are empty; absent blocks take their defaults.
    pub(crate) fn into_model(self) -> ConfigResult<TargetConfig> {
        Ok(TargetConfig {
            catalog: required(self.catalog, "target.catalog")?,
            schema: required(self.schema, "target.schema")?,
            table: required(self.table, "target.table")?,
            partition_by: self.partition_by.unwrap_or_default(),
            z_order_by: self.z_order_by.unwrap_or_default(),
            table_properties: self.table_properties.unwrap_or_default(),
            metadata_columns: self
                .metadata_columns
                .unwrap_or_default()
                .into_iter()
                .map(MetadataColumnDocument::into_model)
                .collect(),
            schema_evolution: self
                .schema_evolution
                .map(SchemaEvolutionDocument::into_model)
                .transpose()?
                .unwrap_or_default(),
            quality: self
                .quality
                .map(QualityDocument::into_model)
                .unwrap_or_default(),
            cdc: self
                .cdc
                .map(CdcDocument::into_model)
                .transpose()?
                .unwrap_or_default(),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetadataColumnDocument {
    pub name: String,
    pub expression: String,
}

impl MetadataColumnDocument {
    fn from_model(c: &MetadataColumn) -> Self {
        Self {
            name: c.name.clone(),
            expression: c.expression.clone(),
        }
    }

    pub(crate) fn into_model(self) -> MetadataColumn {
        MetadataColumn::new(self.name, self.expression)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaEvolutionDocument {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rescued_data_column: Option<String>,
}

impl SchemaEvolutionDocument {
    fn from_model(s: &SchemaEvolution) -> Self {
        Self {
            mode: Some(s.mode.as_str().to_string()),
            rescued_data_column: Some(s.rescued_data_column.clone()),
        }
    }

    pub(crate) fn into_model(self) -> ConfigResult<SchemaEvolution> {
        let defaults = SchemaEvolution::default();
        Ok(SchemaEvolution {
            mode: match self.mode {
                Some(m) => parse_option("target.schema_evolution.mode", &m)?,
                None => defaults.mode,
            },
            rescued_data_column: self
                .rescued_data_column
                .unwrap_or(defaults.rescued_data_column),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QualityDocument {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quarantine_threshold_pct: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dead_letter_table_suffix: Option<String>,
}

impl QualityDocument {
    fn from_model(q: &QualityConfig) -> Self {
        Self {
            enabled: Some(q.enabled),
            quarantine_threshold_pct: q.quarantine_threshold_pct,
            dead_letter_table_suffix: Some(q.dead_letter_table_suffix.clone()),
        }
    }

    pub(crate) fn into_model(self) -> QualityConfig {
        let defaults = QualityConfig::default();
        QualityConfig {
            enabled: self.enabled.unwrap_or(defaults.enabled),
            quarantine_threshold_pct: self.quarantine_threshold_pct,
            dead_letter_table_suffix: self
                .dead_letter_table_suffix
                .unwrap_or(defaults.dead_letter_table_suffix),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CdcDocument {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_keys: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sequence_column: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclude_columns_from_hash: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete_condition_column: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete_condition_value: Option<String>,
}

impl CdcDocument {
    fn from_model(c: &CdcConfig) -> Self {
        Self {
            enabled: Some(c.enabled),
            mode: Some(c.mode.as_str().to_string()),
            primary_keys: non_empty_list(&c.primary_keys),
            sequence_column: c.sequence_column.clone(),
            exclude_columns_from_hash: non_empty_list(&c.exclude_columns_from_hash),
            delete_condition_column: c.delete_condition_column.clone(),
            delete_condition_value: c.delete_condition_value.clone(),
        }
    }

    pub(crate) fn into_model(self) -> ConfigResult<CdcConfig> {
        Ok(CdcConfig {
            enabled: self.enabled.unwrap_or(false),
            mode: match self.mode {
                Some(m) => parse_option("target.cdc.mode", &m)?,
                None => registry::CdcMode::default(),
            },
            primary_keys: self.primary_keys.unwrap_or_default(),
            sequence_column: self.sequence_column,
            exclude_columns_from_hash: self.exclude_columns_from_hash.unwrap_or_default(),
            delete_condition_column: self.delete_condition_column,
            delete_condition_value: self.delete_condition_value,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LandingDocument {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archive_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retention_days: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cleanup_enabled: Option<bool>,
}

impl LandingDocument {
    pub(crate) fn from_model(l: &LandingConfig) -> Self {
        Self {
            path: l.path.clone(),
            archive_path: l.archive_path.clone(),
            retention_days: Some(l.retention_days),
            cleanup_enabled: Some(l.cleanup_enabled),
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub(crate) fn into_model(self) -> LandingConfig {
        let defaults = LandingConfig::default();
        LandingConfig {
            path: self.path,
            archive_path: self.archive_path,
            retention_days: self.retention_days.unwrap_or(defaults.retention_days),
            cleanup_enabled: self.cleanup_enabled.unwrap_or(defaults.cleanup_enabled),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScheduleDocument {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cron_expression: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pause_status: Option<String>,
}

impl ScheduleDocument {
    fn from_model(s: &ScheduleConfig) -> Self {
        Self {
            cron_expression: s.cron_expression.clone(),
            timezone: Some(s.timezone.clone()),
            pause_status: Some(s.pause_status.as_str().to_string()),
        }
    }

    pub(crate) fn into_model(self) -> ConfigResult<ScheduleConfig> {
        let defaults = ScheduleConfig::default();
        Ok(ScheduleConfig {
            cron_expression: self.cron_expression,
            timezone: self.timezone.unwrap_or(defaults.timezone),
            pause_status: match self.pause_status {
                Some(s) => parse_option("schedule.pause_status", &s)?,
                None => defaults.pause_status,
            },
        })
    }
}
