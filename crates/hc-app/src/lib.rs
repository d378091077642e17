//! Compiler pipeline and service layer shared by the CLI and other front ends.
//!
//! Runs the stages in order (parse, resolve, topology, then measures and
//! schedules side by side) and assembles the compiled model.

pub mod archetype;
pub mod compile;
pub mod config_service;
pub mod diagnostics;
pub mod error;
pub mod measures;
pub mod model;

// Re-export key types for convenience
pub use archetype::{
    ArchetypeParams, BuildingShape, BuildingType, Footprint, SpaceDensity, SystemArchetype,
    generate_config,
};
pub use compile::{CompileError, CompileOptions, CompileOutput, compile, compile_value};
pub use config_service::{
    ModelSummary, compile_file, load_config, load_config_value, query_schedule, save_config,
    summarize,
};
pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics, Severity};
pub use error::{AppError, AppResult};
pub use measures::{AppliedMeasures, MeasureConflictError, apply_measures};
pub use model::{CompiledBuilding, CompiledModel};
