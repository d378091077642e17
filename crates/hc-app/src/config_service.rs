//! Config loading, saving and model introspection.

use std::path::Path;

use chrono::Weekday;
use hc_core::TimeOfDay;
use hc_schema::ConfigDocument;
use serde::Serialize;
use serde_json::Value;

use crate::compile::{CompileOptions, CompileOutput, compile_value};
use crate::error::{AppError, AppResult};
use crate::model::CompiledModel;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Yaml,
    Json,
}

fn format_of(path: &Path) -> AppResult<Format> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("yaml" | "yml") => Ok(Format::Yaml),
        Some("json") => Ok(Format::Json),
        _ => Err(AppError::UnsupportedFormat {
            path: path.to_path_buf(),
        }),
    }
}

/// Load a YAML or JSON config file as a raw value, without schema checks.
pub fn load_config_value(path: &Path) -> AppResult<Value> {
    let format = format_of(path)?;
    let content = std::fs::read_to_string(path).map_err(|e| AppError::ConfigFileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    let value = match format {
        Format::Yaml => hc_schema::value_from_yaml_str(&content)?,
        Format::Json => serde_json::from_str(&content)
            .map_err(|e| AppError::Syntax(format!("Failed to parse config JSON: {}", e)))?,
    };
    Ok(value)
}

/// Load and parse a config file.
pub fn load_config(path: &Path) -> AppResult<ConfigDocument> {
    let value = load_config_value(path)?;
    Ok(hc_schema::parse_document(&value).map_err(crate::compile::CompileError::Parse)?)
}

/// Load and compile a config file.
pub fn compile_file(path: &Path, options: &CompileOptions) -> AppResult<CompileOutput> {
    let value = load_config_value(path)?;
    Ok(compile_value(&value, options)?)
}

/// Write `value` as YAML or JSON, chosen by extension.
pub fn save_config<T: Serialize>(path: &Path, value: &T) -> AppResult<()> {
    let content = match format_of(path)? {
        Format::Yaml => to_yaml_string(value)?,
        Format::Json => serde_json::to_string_pretty(value)?,
    };

    std::fs::write(path, content).map_err(|e| AppError::FileWrite {
        path: path.to_path_buf(),
        source: e,
    })?;

    Ok(())
}

pub fn to_yaml_string<T: Serialize>(value: &T) -> AppResult<String> {
    Ok(serde_yaml::to_string(value)?)
}

/// Per-loop line of a model summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoopSummary {
    pub name: String,
    pub kind: String,
    pub component_count: usize,
}

/// Summary of a compiled model for listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelSummary {
    pub system_count: usize,
    pub component_count: usize,
    pub sub_component_count: usize,
    pub loops: Vec<LoopSummary>,
    pub schedule_count: usize,
    pub fingerprint: String,
}

pub fn summarize(model: &CompiledModel) -> ModelSummary {
    let air = model.air_loops().map(|air| LoopSummary {
        name: air.name.clone(),
        kind: "air".to_string(),
        component_count: air.supply.len()
            + air
                .demand_branches
                .iter()
                .map(|b| b.components.len())
                .sum::<usize>(),
    });
    let plant = model.plant_loops().map(|plant| LoopSummary {
        name: plant.name.clone(),
        kind: plant.kind.to_string(),
        component_count: plant.inlet_node.len()
            + plant.supply_branches.len()
            + plant.demand_branches.len(),
    });

    let sub_component_count = model
        .components
        .iter()
        .filter(|c| c.owner.is_some())
        .count();

    ModelSummary {
        system_count: model.systems.len(),
        component_count: model.components.len() - sub_component_count,
        sub_component_count,
        loops: air.chain(plant).collect(),
        schedule_count: model.schedules.len(),
        fingerprint: model.fingerprint(),
    }
}

/// Value of schedule `key` on `weekday` at `time`.
pub fn query_schedule(
    model: &CompiledModel,
    key: &str,
    weekday: Weekday,
    time: TimeOfDay,
) -> AppResult<f64> {
    let schedule = model
        .schedule(key)
        .ok_or_else(|| AppError::ScheduleNotFound(key.to_string()))?;
    Ok(schedule.value_at(weekday, time))
}
