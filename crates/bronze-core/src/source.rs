//! Typed source configuration model.
//!
//! Variant-dependent parts of a source are sum types: the connection and
//! extract blocks hang off [`SourceKind`], the watermark only exists on
//! [`Load::Incremental`], and API auth/pagination carry only the fields of
//! their own type. States the model cannot express can never be persisted.

use std::collections::BTreeMap;

use crate::registry::{
    AuthType, CdcMode, FileFormat, LoadType, PaginationType, PauseStatus, SchemaEvolutionMode,
    SourceType, StartingOffsets, WatermarkType,
};

/// Catalog placeholder used by new sources, resolved per environment.
pub const DEFAULT_CATALOG: &str = "${catalog}";
pub const DEFAULT_SCHEMA: &str = "bronze";
pub const DEFAULT_TIMEZONE: &str = "UTC";

/// One ingestion source.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceConfig {
    /// Unique identifier, also the persisted document's key.
    pub name: String,
    pub description: String,
    pub enabled: bool,
    pub tags: BTreeMap<String, String>,
    /// Connection and extract settings for the source's type.
    pub source: SourceKind,
    /// Full or incremental load, with the watermark for the latter.
    pub load: Load,
    pub target: TargetConfig,
    /// `None` means the source is only ever triggered manually.
    pub schedule: Option<ScheduleConfig>,
}

impl SourceConfig {
    /// A fully defaulted configuration for `source_type`.
    ///
    /// `name` and `target.table` are left empty for the user to fill in.
    pub fn create_default(source_type: SourceType) -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            enabled: true,
            tags: BTreeMap::new(),
            source: SourceKind::default_for(source_type),
            load: Load::Full,
            target: TargetConfig::default(),
            schedule: None,
        }
    }

    pub fn source_type(&self) -> SourceType {
        self.source.source_type()
    }

    /// Three-part destination identifier `catalog.schema.table`.
    pub fn target_table(&self) -> String {
        format!(
            "{}.{}.{}",
            self.target.catalog, self.target.schema, self.target.table
        )
    }

    /// Landing zone settings, only present for file sources.
    pub fn landing(&self) -> Option<&LandingConfig> {
        match &self.source {
            SourceKind::File { landing, .. } => Some(landing),
            _ => None,
        }
    }
}

/// Source-type specific connection and extract settings.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceKind {
    Jdbc {
        connection: JdbcConnection,
        extract: JdbcExtract,
    },
    File {
        extract: FileExtract,
        landing: LandingConfig,
    },
    Api(ApiExtract),
    Stream(StreamExtract),
}

impl SourceKind {
    pub fn default_for(source_type: SourceType) -> Self {
        match source_type {
            SourceType::Jdbc => SourceKind::Jdbc {
                connection: JdbcConnection::default(),
                extract: JdbcExtract::default(),
            },
            SourceType::File => SourceKind::File {
                extract: FileExtract::default(),
                landing: LandingConfig::default(),
            },
            SourceType::Api => SourceKind::Api(ApiExtract::default()),
            SourceType::Stream => SourceKind::Stream(StreamExtract::default()),
        }
    }

    pub fn source_type(&self) -> SourceType {
        match self {
            SourceKind::Jdbc { .. } => SourceType::Jdbc,
            SourceKind::File { .. } => SourceType::File,
            SourceKind::Api(_) => SourceType::Api,
            SourceKind::Stream(_) => SourceType::Stream,
        }
    }
}

/// Load strategy.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Load {
    #[default]
    Full,
    /// The watermark may be missing while a config is being edited; the
    /// validator reports it.
    Incremental { watermark: Option<Watermark> },
}

impl Load {
    pub fn load_type(&self) -> LoadType {
        match self {
            Load::Full => LoadType::Full,
            Load::Incremental { .. } => LoadType::Incremental,
        }
    }

    pub fn watermark(&self) -> Option<&Watermark> {
        match self {
            Load::Full => None,
            Load::Incremental { watermark } => watermark.as_ref(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Watermark {
    pub column: String,
    pub watermark_type: WatermarkType,
    pub default_value: Option<String>,
}

/// JDBC connection. Credentials are secret scope/key references, never values.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct JdbcConnection {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub database: Option<String>,
    pub driver: Option<String>,
    /// Full JDBC URL, an alternative to host/port/database.
    pub url: Option<String>,
    pub secret_scope: Option<String>,
    pub secret_key_user: Option<String>,
    pub secret_key_password: Option<String>,
    pub properties: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct JdbcExtract {
    pub table: Option<String>,
    pub query: Option<String>,
    pub partition_column: Option<String>,
    pub num_partitions: u32,
    pub fetch_size: u32,
}

impl Default for JdbcExtract {
    fn default() -> Self {
        Self {
            table: None,
            query: None,
            partition_column: None,
            num_partitions: 1,
            fetch_size: 10_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FileExtract {
    pub path: Option<String>,
    /// Kept as the raw wire value so formats unknown to the registry pass through.
    pub format: String,
    pub format_options: BTreeMap<String, String>,
    pub auto_loader: bool,
    pub checkpoint_path: Option<String>,
}

impl Default for FileExtract {
    fn default() -> Self {
        Self {
            path: None,
            format: FileFormat::default().as_str().to_string(),
            format_options: BTreeMap::new(),
            auto_loader: false,
            checkpoint_path: None,
        }
    }
}

/// Landing zone housekeeping for file sources.
#[derive(Debug, Clone, PartialEq)]
pub struct LandingConfig {
    pub path: Option<String>,
    pub archive_path: Option<String>,
    pub retention_days: u32,
    pub cleanup_enabled: bool,
}

impl Default for LandingConfig {
    fn default() -> Self {
        Self {
            path: None,
            archive_path: None,
            retention_days: 10,
            cleanup_enabled: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiExtract {
    pub base_url: Option<String>,
    pub endpoint: Option<String>,
    pub method: String,
    pub headers: BTreeMap<String, String>,
    pub params: BTreeMap<String, String>,
    pub timeout_seconds: u32,
    pub max_retries: u32,
    pub retry_backoff_factor: f64,
    /// Path to the record array in each response body.
    pub response_root_path: String,
    pub auth: Option<ApiAuth>,
    pub pagination: Option<Pagination>,
}

impl Default for ApiExtract {
    fn default() -> Self {
        Self {
            base_url: None,
            endpoint: None,
            method: "GET".to_string(),
            headers: BTreeMap::new(),
            params: BTreeMap::new(),
            timeout_seconds: 30,
            max_retries: 3,
            retry_backoff_factor: 2.0,
            response_root_path: "data".to_string(),
            auth: None,
            pagination: None,
        }
    }
}

pub const DEFAULT_AUTH_HEADER: &str = "Authorization";
pub const DEFAULT_AUTH_PREFIX: &str = "Bearer";

/// API authentication, one variant per [`AuthType`].
#[derive(Debug, Clone, PartialEq)]
pub enum ApiAuth {
    None,
    Oauth2 {
        secret_scope: Option<String>,
        token_url: Option<String>,
        secret_key_client_id: Option<String>,
        secret_key_client_secret: Option<String>,
    },
    ApiKey {
        secret_scope: Option<String>,
        secret_key_token: Option<String>,
        header_name: String,
    },
    Bearer {
        secret_scope: Option<String>,
        secret_key_token: Option<String>,
        header_name: String,
        header_prefix: String,
    },
}

impl ApiAuth {
    pub fn default_for(auth_type: AuthType) -> Self {
        match auth_type {
            AuthType::None => ApiAuth::None,
            AuthType::Oauth2 => ApiAuth::Oauth2 {
                secret_scope: None,
                token_url: None,
                secret_key_client_id: None,
                secret_key_client_secret: None,
            },
            AuthType::ApiKey => ApiAuth::ApiKey {
                secret_scope: None,
                secret_key_token: None,
                header_name: DEFAULT_AUTH_HEADER.to_string(),
            },
            AuthType::Bearer => ApiAuth::Bearer {
                secret_scope: None,
                secret_key_token: None,
                header_name: DEFAULT_AUTH_HEADER.to_string(),
                header_prefix: DEFAULT_AUTH_PREFIX.to_string(),
            },
        }
    }

    pub fn auth_type(&self) -> AuthType {
        match self {
            ApiAuth::None => AuthType::None,
            ApiAuth::Oauth2 { .. } => AuthType::Oauth2,
            ApiAuth::ApiKey { .. } => AuthType::ApiKey,
            ApiAuth::Bearer { .. } => AuthType::Bearer,
        }
    }

    pub fn secret_scope(&self) -> Option<&str> {
        match self {
            ApiAuth::None => None,
            ApiAuth::Oauth2 { secret_scope, .. }
            | ApiAuth::ApiKey { secret_scope, .. }
            | ApiAuth::Bearer { secret_scope, .. } => secret_scope.as_deref(),
        }
    }

    /// Switch to another auth type, carrying over the fields both share.
    pub fn convert(&self, auth_type: AuthType) -> Self {
        let mut next = Self::default_for(auth_type);
        let scope = self.secret_scope().map(str::to_string);
        let (token, header) = match self {
            ApiAuth::ApiKey {
                secret_key_token,
                header_name,
                ..
            }
            | ApiAuth::Bearer {
                secret_key_token,
                header_name,
                ..
            } => (secret_key_token.clone(), Some(header_name.clone())),
            _ => (None, None),
        };

        match &mut next {
            ApiAuth::None => {}
            ApiAuth::Oauth2 { secret_scope, .. } => *secret_scope = scope,
            ApiAuth::ApiKey {
                secret_scope,
                secret_key_token,
                header_name,
            }
            | ApiAuth::Bearer {
                secret_scope,
                secret_key_token,
                header_name,
                ..
            } => {
                *secret_scope = scope;
                *secret_key_token = token;
                if let Some(header) = header {
                    *header_name = header;
                }
            }
        }
        next
    }
}

/// API pagination; settings shared by every style live here.
#[derive(Debug, Clone, PartialEq)]
pub struct Pagination {
    pub page_size: u32,
    pub max_pages: Option<u32>,
    pub data_response_path: String,
    pub style: PaginationStyle,
}

impl Pagination {
    pub fn default_for(pagination_type: PaginationType) -> Self {
        Self {
            page_size: 100,
            max_pages: None,
            data_response_path: "data".to_string(),
            style: PaginationStyle::default_for(pagination_type),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PaginationStyle {
    Offset {
        offset_param: String,
        limit_param: String,
    },
    Cursor {
        cursor_param: String,
        /// Where the next cursor is found in each response.
        cursor_response_path: Option<String>,
    },
    LinkHeader {
        limit_param: String,
    },
}

impl PaginationStyle {
    pub fn default_for(pagination_type: PaginationType) -> Self {
        match pagination_type {
            PaginationType::Offset => PaginationStyle::Offset {
                offset_param: "offset".to_string(),
                limit_param: "limit".to_string(),
            },
            PaginationType::Cursor => PaginationStyle::Cursor {
                cursor_param: "cursor".to_string(),
                cursor_response_path: None,
            },
            PaginationType::LinkHeader => PaginationStyle::LinkHeader {
                limit_param: "limit".to_string(),
            },
        }
    }

    pub fn pagination_type(&self) -> PaginationType {
        match self {
            PaginationStyle::Offset { .. } => PaginationType::Offset,
            PaginationStyle::Cursor { .. } => PaginationType::Cursor,
            PaginationStyle::LinkHeader { .. } => PaginationType::LinkHeader,
        }
    }
}

/// Kafka or Event Hubs stream.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamExtract {
    pub kafka_bootstrap_servers: Option<String>,
    pub kafka_topic: Option<String>,
    pub kafka_consumer_group: Option<String>,
    pub kafka_options: BTreeMap<String, String>,
    /// Secret key holding an Event Hubs connection string.
    pub event_hub_connection_string_key: Option<String>,
    pub event_hub_consumer_group: String,
    pub checkpoint_path: Option<String>,
    /// Raw wire value; may also be a JSON per-partition offset spec.
    pub starting_offsets: String,
}

pub const DEFAULT_EVENT_HUB_CONSUMER_GROUP: &str = "$Default";

impl Default for StreamExtract {
    fn default() -> Self {
        Self {
            kafka_bootstrap_servers: None,
            kafka_topic: None,
            kafka_consumer_group: None,
            kafka_options: BTreeMap::new(),
            event_hub_connection_string_key: None,
            event_hub_consumer_group: DEFAULT_EVENT_HUB_CONSUMER_GROUP.to_string(),
            checkpoint_path: None,
            starting_offsets: StartingOffsets::default().as_str().to_string(),
        }
    }
}

/// Destination table and how rows land in it.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetConfig {
    pub catalog: String,
    pub schema: String,
    pub table: String,
    pub partition_by: Vec<String>,
    pub z_order_by: Vec<String>,
    pub table_properties: BTreeMap<String, String>,
    pub metadata_columns: Vec<MetadataColumn>,
    pub schema_evolution: SchemaEvolution,
    pub quality: QualityConfig,
    pub cdc: CdcConfig,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            catalog: DEFAULT_CATALOG.to_string(),
            schema: DEFAULT_SCHEMA.to_string(),
            table: String::new(),
            partition_by: vec!["_ingest_date".to_string()],
            z_order_by: Vec::new(),
            table_properties: BTreeMap::from([(
                "delta.autoOptimize.optimizeWrite".to_string(),
                "true".to_string(),
            )]),
            metadata_columns: MetadataColumn::standard(),
            schema_evolution: SchemaEvolution::default(),
            quality: QualityConfig::default(),
            cdc: CdcConfig::default(),
        }
    }
}

/// Computed column added to every ingested row.
#[derive(Debug, Clone, PartialEq)]
pub struct MetadataColumn {
    pub name: String,
    /// Opaque computed-column expression.
    pub expression: String,
}

impl MetadataColumn {
    pub fn new(name: impl Into<String>, expression: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            expression: expression.into(),
        }
    }

    /// The four columns every new source starts with.
    pub fn standard() -> Vec<Self> {
        vec![
            Self::new("_ingest_timestamp", "current_timestamp()"),
            Self::new("_ingest_date", "current_date()"),
            Self::new("_source_system", "''"),
            Self::new("_source_file", "input_file_name()"),
        ]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SchemaEvolution {
    pub mode: SchemaEvolutionMode,
    pub rescued_data_column: String,
}

impl Default for SchemaEvolution {
    fn default() -> Self {
        Self {
            mode: SchemaEvolutionMode::Merge,
            rescued_data_column: "_rescued_data".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct QualityConfig {
    pub enabled: bool,
    pub quarantine_threshold_pct: Option<f64>,
    pub dead_letter_table_suffix: String,
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            quarantine_threshold_pct: Some(10.0),
            dead_letter_table_suffix: "dead_letter".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CdcConfig {
    pub enabled: bool,
    pub mode: CdcMode,
    pub primary_keys: Vec<String>,
    /// Orders records that share a key.
    pub sequence_column: Option<String>,
    pub exclude_columns_from_hash: Vec<String>,
    pub delete_condition_column: Option<String>,
    pub delete_condition_value: Option<String>,
}

impl Default for CdcConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            mode: CdcMode::Append,
            primary_keys: Vec::new(),
            sequence_column: None,
            exclude_columns_from_hash: vec![
                "_ingest_timestamp".to_string(),
                "_ingest_date".to_string(),
                "_source_file".to_string(),
            ],
            delete_condition_column: None,
            delete_condition_value: None,
        }
    }
}

impl CdcConfig {
    /// Whether the configured mode matches rows by key.
    pub fn requires_keys(&self) -> bool {
        self.enabled && matches!(self.mode, CdcMode::Upsert | CdcMode::Scd2)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleConfig {
    /// Quartz cron expression; `None` means manual trigger only.
    pub cron_expression: Option<String>,
    /// IANA timezone name.
    pub timezone: String,
    pub pause_status: PauseStatus,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            cron_expression: None,
            timezone: DEFAULT_TIMEZONE.to_string(),
            pause_status: PauseStatus::Unpaused,
        }
    }
}
