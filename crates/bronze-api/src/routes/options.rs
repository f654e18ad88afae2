//! Registry catalog endpoint.

use std::collections::BTreeMap;

use axum::Json;
use bronze_core::registry::{self, SourceType};
use bronze_core::{OptionInfo, OptionKind};
use serde::Serialize;

use crate::error::ApiError;

#[derive(Debug, Serialize)]
pub struct SourceTypeFields {
    groups: Vec<&'static str>,
    extract_fields: Vec<&'static str>,
}

#[derive(Debug, Serialize)]
pub struct OptionsResponse {
    #[serde(flatten)]
    options: BTreeMap<&'static str, Vec<OptionInfo>>,
    source_type_fields: BTreeMap<&'static str, SourceTypeFields>,
}

pub async fn list_options() -> Result<Json<OptionsResponse>, ApiError> {
    let options = OptionKind::ALL
        .iter()
        .map(|kind| (kind.as_str(), registry::options(*kind)))
        .collect();

    let mut source_type_fields = BTreeMap::new();
    for source_type in SourceType::ALL {
        let entry = registry::source_type_entry(*source_type)?;
        let extract_fields = registry::COMMON_EXTRACT_FIELDS
            .iter()
            .chain(entry.extract_fields)
            .copied()
            .collect();
        source_type_fields.insert(
            source_type.as_str(),
            SourceTypeFields {
                groups: entry.groups(),
                extract_fields,
            },
        );
    }

    Ok(Json(OptionsResponse {
        options,
        source_type_fields,
    }))
}
