//! hc-schema: typed configuration model, object-type catalog and parser.

pub mod catalog;
pub mod parse;
pub mod schema;

pub use catalog::{EquipmentClass, MeasureScope, MeasureTarget, ObjectType, measure_target};
pub use parse::{ParseError, ParseIssue, ParseIssueKind, parse_document};
pub use schema::*;

pub type SchemaResult<T> = Result<T, SchemaError>;

#[derive(thiserror::Error, Debug)]
pub enum SchemaError {
    #[error("{0}")]
    Parse(#[from] ParseError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Parse a YAML document into its raw value, without schema checks.
pub fn value_from_yaml_str(content: &str) -> SchemaResult<serde_json::Value> {
    let yaml: serde_yaml::Value = serde_yaml::from_str(content)?;
    Ok(serde_json::to_value(yaml)?)
}

pub fn from_yaml_str(content: &str) -> SchemaResult<ConfigDocument> {
    let value = value_from_yaml_str(content)?;
    Ok(parse_document(&value)?)
}

pub fn from_json_str(content: &str) -> SchemaResult<ConfigDocument> {
    let value: serde_json::Value = serde_json::from_str(content)?;
    Ok(parse_document(&value)?)
}

pub fn load_yaml(path: &std::path::Path) -> SchemaResult<ConfigDocument> {
    let content = std::fs::read_to_string(path)?;
    from_yaml_str(&content)
}

pub fn load_json(path: &std::path::Path) -> SchemaResult<ConfigDocument> {
    let content = std::fs::read_to_string(path)?;
    from_json_str(&content)
}
