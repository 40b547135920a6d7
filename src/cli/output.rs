//! Output formatting for CLI commands
//!
//! Values come back from a store as JSON; they can be printed as JSON, YAML,
//! or raw text.

use anyhow::{Context, Result};
use serde::Serialize;

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Yaml,
    Text,
}

impl OutputFormat {
    /// Parse output format from string
    pub fn parse(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "yaml" => Ok(OutputFormat::Yaml),
            "text" => Ok(OutputFormat::Text),
            _ => anyhow::bail!(
                "Unsupported output format: '{}'. Use 'json', 'yaml', or 'text'.",
                s
            ),
        }
    }
}

/// Render a stored value in the given format
pub fn render_value(value: &serde_json::Value, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => {
            serde_json::to_string_pretty(value).context("Failed to serialize to JSON")
        }
        OutputFormat::Yaml => {
            let yaml = serde_yaml::to_string(value).context("Failed to serialize to YAML")?;
            Ok(yaml.trim_end().to_string())
        }
        // Strings print bare; everything else as compact JSON.
        OutputFormat::Text => match value {
            serde_json::Value::String(s) => Ok(s.clone()),
            other => Ok(other.to_string()),
        },
    }
}

/// Render a key listing in the given format
pub fn render_keys<T: Serialize + AsRef<str>>(keys: &[T], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => {
            serde_json::to_string_pretty(keys).context("Failed to serialize to JSON")
        }
        OutputFormat::Yaml => {
            let yaml = serde_yaml::to_string(keys).context("Failed to serialize to YAML")?;
            Ok(yaml.trim_end().to_string())
        }
        OutputFormat::Text => Ok(keys.iter().map(AsRef::as_ref).collect::<Vec<_>>().join("\n")),
    }
}

/// Parse a value given on the command line.
///
/// Input that is not valid JSON is taken as a plain string, so
/// `set greeting hello` stores `"hello"`.
pub fn parse_value(input: &str) -> serde_json::Value {
    serde_json::from_str(input).unwrap_or_else(|_| serde_json::Value::String(input.to_string()))
}
