//! Environment placeholder interpolation.
//!
//! Source documents can reference per-environment values as `${key}`, most
//! commonly `${catalog}` in `target.catalog`. An [`Environment`] supplies the
//! values; placeholders it does not define are left in place.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::sync::LazyLock;

use bronze_core::SourceConfig;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::document::SourceDocument;
use crate::ConfigResult;

static PLACEHOLDER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([a-zA-Z_][a-zA-Z0-9_.]*)\}").unwrap());

/// Named set of placeholder values, e.g. `dev` or `prod`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Environment {
    pub name: String,
    #[serde(default)]
    pub variables: BTreeMap<String, String>,
}

impl Environment {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            variables: BTreeMap::new(),
        }
    }

    /// Parse `{name, variables: {key: value}}` YAML.
    pub fn from_yaml(text: &str) -> ConfigResult<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn load(path: &Path) -> ConfigResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml(&text)
    }

    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.variables.insert(key.to_string(), value.into());
    }

    pub fn with(mut self, key: &str, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    pub fn resolve(&self, key: &str) -> Option<&str> {
        self.variables.get(key).map(String::as_str)
    }

    /// Replace every known `${key}` in a string.
    pub fn interpolate(&self, input: &str) -> String {
        PLACEHOLDER_REGEX
            .replace_all(input, |caps: &regex::Captures| {
                let key = &caps[1];
                self.resolve(key)
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("${{{}}}", key))
            })
            .to_string()
    }

    /// Interpolate every string field of a configuration.
    ///
    /// Goes through the wire document so substituted option values are parsed
    /// like any other input.
    pub fn render(&self, config: &SourceConfig) -> ConfigResult<SourceConfig> {
        let mut value = serde_json::to_value(SourceDocument::from_config(config))?;
        visit_strings(&mut value, &mut |s| *s = self.interpolate(s));
        let doc: SourceDocument = serde_json::from_value(value)?;
        let rendered = doc.into_config()?;
        tracing::debug!(name = %rendered.name, environment = %self.name, "Rendered source");
        Ok(rendered)
    }
}

/// Placeholder keys still referenced anywhere in a configuration.
pub fn placeholders(config: &SourceConfig) -> BTreeSet<String> {
    let mut found = BTreeSet::new();
    // Serializing the wire document cannot fail: every map key is a string.
    let Ok(mut value) = serde_json::to_value(SourceDocument::from_config(config)) else {
        return found;
    };
    visit_strings(&mut value, &mut |s| {
        for caps in PLACEHOLDER_REGEX.captures_iter(s) {
            found.insert(caps[1].to_string());
        }
    });
    found
}

fn visit_strings(value: &mut Value, f: &mut impl FnMut(&mut String)) {
    match value {
        Value::String(s) => f(s),
        Value::Array(items) => items.iter_mut().for_each(|v| visit_strings(v, f)),
        Value::Object(map) => map.values_mut().for_each(|v| visit_strings(v, f)),
        _ => {}
    }
}
