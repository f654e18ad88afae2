//! Static catalog of the option sets a source configuration draws from.
//!
//! Every closed option set is a Rust enum carrying its wire value, a display
//! label and a short description. Lookups of values the registry does not know
//! return [`Lookup::Unrecognized`] (or [`Error::Unrecognized`] from `FromStr`)
//! instead of failing hard, so callers can pass server-introduced values
//! through untouched where the model allows it.

use derive_more::Display;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// `{value, label, description}` triple describing one option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OptionInfo {
    pub value: &'static str,
    pub label: &'static str,
    pub description: &'static str,
}

/// Result of looking up a raw value in an option set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
    Known(OptionInfo),
    Unrecognized,
}

impl Lookup {
    pub fn is_known(&self) -> bool {
        matches!(self, Lookup::Known(_))
    }
}

/// The option sets held by the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum OptionKind {
    #[display("source type")]
    SourceType,
    #[display("CDC mode")]
    CdcMode,
    #[display("load type")]
    LoadType,
    #[display("schema evolution mode")]
    SchemaEvolutionMode,
    #[display("auth type")]
    AuthType,
    #[display("pagination type")]
    PaginationType,
    #[display("file format")]
    FileFormat,
    #[display("watermark type")]
    WatermarkType,
    #[display("starting offsets")]
    StartingOffsets,
    #[display("pause status")]
    PauseStatus,
    #[display("metadata expression")]
    MetadataExpression,
}

impl OptionKind {
    pub const ALL: &'static [OptionKind] = &[
        OptionKind::SourceType,
        OptionKind::CdcMode,
        OptionKind::LoadType,
        OptionKind::SchemaEvolutionMode,
        OptionKind::AuthType,
        OptionKind::PaginationType,
        OptionKind::FileFormat,
        OptionKind::WatermarkType,
        OptionKind::StartingOffsets,
        OptionKind::PauseStatus,
        OptionKind::MetadataExpression,
    ];

    /// Machine name, used as the key in the options catalog.
    pub fn as_str(&self) -> &'static str {
        match self {
            OptionKind::SourceType => "source_types",
            OptionKind::CdcMode => "cdc_modes",
            OptionKind::LoadType => "load_types",
            OptionKind::SchemaEvolutionMode => "schema_evolution_modes",
            OptionKind::AuthType => "auth_types",
            OptionKind::PaginationType => "pagination_types",
            OptionKind::FileFormat => "file_formats",
            OptionKind::WatermarkType => "watermark_types",
            OptionKind::StartingOffsets => "starting_offsets",
            OptionKind::PauseStatus => "pause_statuses",
            OptionKind::MetadataExpression => "metadata_expressions",
        }
    }
}

impl std::str::FromStr for OptionKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        OptionKind::ALL
            .iter()
            .copied()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| format!("unknown option set: {}", s))
    }
}

macro_rules! option_set {
    (
        $(#[$meta:meta])*
        pub enum $name:ident in $kind:ident {
            $(
                $(#[$vmeta:meta])*
                $variant:ident = $value:literal, $label:literal, $desc:literal;
            )+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
        pub enum $name {
            $(
                $(#[$vmeta])*
                #[serde(rename = $value)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];
            pub const KIND: OptionKind = OptionKind::$kind;

            /// Wire value.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $value,)+
                }
            }

            pub fn info(&self) -> OptionInfo {
                match self {
                    $($name::$variant => OptionInfo {
                        value: $value,
                        label: $label,
                        description: $desc,
                    },)+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self> {
                match s {
                    $($value => Ok($name::$variant),)+
                    _ => Err(Error::Unrecognized {
                        kind: OptionKind::$kind,
                        value: s.to_string(),
                    }),
                }
            }
        }
    };
}

option_set! {
    /// Kind of system a source reads from.
    pub enum SourceType in SourceType {
        #[default]
        Jdbc = "jdbc", "JDBC", "Database via JDBC driver";
        File = "file", "File", "Cloud storage files";
        Api = "api", "API", "REST API endpoint";
        Stream = "stream", "Stream", "Kafka / Event Hub";
    }
}

option_set! {
    /// How incoming records are reconciled against the target table.
    pub enum CdcMode in CdcMode {
        #[default]
        Append = "append", "Append", "Insert-only, no dedup";
        Upsert = "upsert", "Upsert", "Overwrite matched rows";
        Scd2 = "scd2", "SCD2", "Full history tracking";
    }
}

option_set! {
    pub enum LoadType in LoadType {
        #[default]
        Full = "full", "Full Load", "Reload the whole source on every run";
        Incremental = "incremental", "Incremental", "Only rows past the watermark";
    }
}

option_set! {
    /// Policy for source schema changes against the target table.
    pub enum SchemaEvolutionMode in SchemaEvolutionMode {
        #[default]
        Merge = "merge", "Merge", "Auto-add new columns";
        Strict = "strict", "Strict", "Fail on schema change";
        Rescue = "rescue", "Rescue", "Store unknown in rescue column";
    }
}

option_set! {
    pub enum AuthType in AuthType {
        #[default]
        None = "none", "None", "No authentication";
        Oauth2 = "oauth2", "OAuth2", "Client credentials against a token endpoint";
        ApiKey = "api_key", "API Key", "Static key sent in a header";
        Bearer = "bearer", "Bearer Token", "Static bearer token";
    }
}

option_set! {
    pub enum PaginationType in PaginationType {
        #[default]
        Offset = "offset", "Offset", "Offset and limit query parameters";
        Cursor = "cursor", "Cursor", "Cursor taken from the previous response";
        LinkHeader = "link_header", "Link Header", "Follow the rel=next Link header";
    }
}

option_set! {
    pub enum FileFormat in FileFormat {
        #[default]
        Parquet = "parquet", "Parquet", "Apache Parquet";
        Json = "json", "JSON", "Newline-delimited JSON";
        Csv = "csv", "CSV", "Comma-separated values";
        Avro = "avro", "Avro", "Apache Avro";
        Orc = "orc", "ORC", "Apache ORC";
        Delta = "delta", "Delta", "Delta Lake table";
    }
}

option_set! {
    pub enum WatermarkType in WatermarkType {
        #[default]
        Timestamp = "timestamp", "Timestamp", "Timestamp column";
        Integer = "integer", "Integer", "Monotonic integer column";
        Date = "date", "Date", "Date column";
    }
}

option_set! {
    pub enum StartingOffsets in StartingOffsets {
        #[default]
        Earliest = "earliest", "Earliest", "Start from the oldest retained offset";
        Latest = "latest", "Latest", "Start from new messages only";
    }
}

option_set! {
    pub enum PauseStatus in PauseStatus {
        #[default]
        Unpaused = "UNPAUSED", "Unpaused", "Schedule is active";
        Paused = "PAUSED", "Paused", "Schedule is suspended";
    }
}

/// Preset expressions offered for metadata columns. The expression itself is
/// opaque to the model; these are suggestions only.
pub const METADATA_EXPRESSIONS: &[OptionInfo] = &[
    OptionInfo {
        value: "current_timestamp()",
        label: "Current Timestamp",
        description: "Ingestion timestamp",
    },
    OptionInfo {
        value: "current_date()",
        label: "Current Date",
        description: "Ingestion date",
    },
    OptionInfo {
        value: "input_file_name()",
        label: "Input File Name",
        description: "Source file the row was read from",
    },
    OptionInfo {
        value: "lit('')",
        label: "Custom Literal",
        description: "Constant value",
    },
];

/// All options of one kind, in display order.
pub fn options(kind: OptionKind) -> Vec<OptionInfo> {
    fn infos<T: Copy>(all: &[T], info: fn(&T) -> OptionInfo) -> Vec<OptionInfo> {
        all.iter().map(info).collect()
    }

    match kind {
        OptionKind::SourceType => infos(SourceType::ALL, SourceType::info),
        OptionKind::CdcMode => infos(CdcMode::ALL, CdcMode::info),
        OptionKind::LoadType => infos(LoadType::ALL, LoadType::info),
        OptionKind::SchemaEvolutionMode => {
            infos(SchemaEvolutionMode::ALL, SchemaEvolutionMode::info)
        }
        OptionKind::AuthType => infos(AuthType::ALL, AuthType::info),
        OptionKind::PaginationType => infos(PaginationType::ALL, PaginationType::info),
        OptionKind::FileFormat => infos(FileFormat::ALL, FileFormat::info),
        OptionKind::WatermarkType => infos(WatermarkType::ALL, WatermarkType::info),
        OptionKind::StartingOffsets => infos(StartingOffsets::ALL, StartingOffsets::info),
        OptionKind::PauseStatus => infos(PauseStatus::ALL, PauseStatus::info),
        OptionKind::MetadataExpression => METADATA_EXPRESSIONS.to_vec(),
    }
}

/// Look up a raw value in an option set.
pub fn lookup(kind: OptionKind, value: &str) -> Lookup {
    options(kind)
        .into_iter()
        .find(|o| o.value == value)
        .map_or(Lookup::Unrecognized, Lookup::Known)
}

/// Extract fields every source type accepts.
pub const COMMON_EXTRACT_FIELDS: &[&str] = &["load_type", "watermark"];

/// Field groups that apply to one source type.
#[derive(Debug)]
pub struct SourceTypeEntry {
    pub source_type: SourceType,
    /// Whether the top-level `connection` block applies.
    pub connection: bool,
    /// Whether `target.landing` applies.
    pub landing: bool,
    /// Type-specific `extract` fields, on top of [`COMMON_EXTRACT_FIELDS`].
    pub extract_fields: &'static [&'static str],
}

impl SourceTypeEntry {
    pub fn allows_extract_field(&self, field: &str) -> bool {
        COMMON_EXTRACT_FIELDS.contains(&field) || self.extract_fields.contains(&field)
    }

    /// Top-level field groups of a document of this type.
    pub fn groups(&self) -> Vec<&'static str> {
        let mut groups = Vec::with_capacity(5);
        if self.connection {
            groups.push("connection");
        }
        groups.push("extract");
        groups.push("target");
        if self.landing {
            groups.push("target.landing");
        }
        groups.push("schedule");
        groups
    }
}

static SOURCE_TYPE_ENTRIES: &[SourceTypeEntry] = &[
    SourceTypeEntry {
        source_type: SourceType::Jdbc,
        connection: true,
        landing: false,
        extract_fields: &[
            "table",
            "query",
            "partition_column",
            "num_partitions",
            "fetch_size",
        ],
    },
    SourceTypeEntry {
        source_type: SourceType::File,
        connection: false,
        landing: true,
        extract_fields: &[
            "path",
            "format",
            "format_options",
            "auto_loader",
            "checkpoint_path",
        ],
    },
    SourceTypeEntry {
        source_type: SourceType::Api,
        connection: false,
        landing: false,
        extract_fields: &[
            "base_url",
            "endpoint",
            "method",
            "headers",
            "params",
            "timeout_seconds",
            "max_retries",
            "retry_backoff_factor",
            "response_root_path",
            "auth",
            "pagination",
        ],
    },
    SourceTypeEntry {
        source_type: SourceType::Stream,
        connection: false,
        landing: false,
        extract_fields: &[
            "kafka_bootstrap_servers",
            "kafka_topic",
            "kafka_consumer_group",
            "kafka_options",
            "event_hub_connection_string_key",
            "event_hub_consumer_group",
            "checkpoint_path",
            "starting_offsets",
        ],
    },
];

/// Applicability entry for a source type.
pub fn source_type_entry(source_type: SourceType) -> Result<&'static SourceTypeEntry> {
    SOURCE_TYPE_ENTRIES
        .iter()
        .find(|e| e.source_type == source_type)
        .ok_or_else(|| Error::MissingEntry(format!("source type '{}'", source_type)))
}

/// Whether any source type accepts this extract field.
pub fn is_known_extract_field(field: &str) -> bool {
    COMMON_EXTRACT_FIELDS.contains(&field)
        || SOURCE_TYPE_ENTRIES
            .iter()
            .any(|e| e.extract_fields.contains(&field))
}
