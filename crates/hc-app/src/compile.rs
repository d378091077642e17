//! The compile pipeline: parse → resolve → topology → (measures ∥ schedules).

use hc_schedule::{UnresolvedScheduleError, compile_schedules};
use hc_schema::{ConfigDocument, MeasureCategory, ParseError, parse_document};
use hc_topology::{ResolveError, TopologyError, resolve, validate_topology};
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::measures::{MeasureConflictError, apply_measures};
use crate::model::{CompiledBuilding, CompiledModel};

/// Compiler settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileOptions {
    /// Measure categories per stage, applied in order; later stages win.
    pub measure_stages: Vec<Vec<MeasureCategory>>,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            measure_stages: vec![
                vec![MeasureCategory::HvacControls],
                vec![MeasureCategory::HvacEquipment],
            ],
        }
    }
}

#[derive(Debug, Clone)]
pub struct CompileOutput {
    pub model: CompiledModel,
    pub warnings: Vec<Diagnostic>,
}

/// First failing stage, with every violation that stage found.
#[derive(thiserror::Error, Debug, Clone)]
pub enum CompileError {
    #[error("{0}")]
    Parse(#[from] ParseError),

    #[error("{} unresolved or duplicate name(s)", .0.len())]
    Resolve(Vec<ResolveError>),

    #[error("{} loop topology violation(s)", .0.len())]
    Topology(Vec<TopologyError>),

    #[error(
        "{} measure conflict(s), {} unresolved schedule day(s)",
        .measures.len(),
        .schedules.len()
    )]
    Rules {
        measures: Vec<MeasureConflictError>,
        schedules: Vec<UnresolvedScheduleError>,
    },
}

impl CompileError {
    /// Flatten into one diagnostic per violation.
    pub fn diagnostics(&self) -> Diagnostics {
        match self {
            CompileError::Parse(err) => err.issues.iter().map(Diagnostic::from).collect(),
            CompileError::Resolve(errs) => errs.iter().map(Diagnostic::from).collect(),
            CompileError::Topology(errs) => errs.iter().map(Diagnostic::from).collect(),
            CompileError::Rules {
                measures,
                schedules,
            } => measures
                .iter()
                .map(Diagnostic::from)
                .chain(schedules.iter().map(Diagnostic::from))
                .collect(),
        }
    }
}

impl From<CompileError> for Diagnostics {
    fn from(err: CompileError) -> Self {
        err.diagnostics()
    }
}

/// Parse and compile a raw configuration value.
pub fn compile_value(value: &Value, options: &CompileOptions) -> Result<CompileOutput, CompileError> {
    let doc = parse_document(value).inspect_err(|err| {
        warn!(issues = err.issues.len(), "parse failed");
    })?;
    compile(&doc, options)
}

/// Compile a parsed document.
#[instrument(skip_all, fields(systems = doc.hvac.len(), components = doc.components.len()))]
pub fn compile(doc: &ConfigDocument, options: &CompileOptions) -> Result<CompileOutput, CompileError> {
    let skeleton = resolve(doc).map_err(|errs| {
        warn!(errors = errs.len(), "reference resolution failed");
        CompileError::Resolve(errs)
    })?;

    validate_topology(&skeleton).map_err(|errs| {
        warn!(errors = errs.len(), "topology validation failed");
        CompileError::Topology(errs)
    })?;
    debug!("topology valid");

    let (measures, schedules) = rayon::join(
        || apply_measures(&skeleton, &doc.measures, &options.measure_stages),
        || compile_schedules(&doc.schedules, &skeleton.schedules),
    );

    let (applied, schedules) = match (measures, schedules) {
        (Ok(applied), Ok(schedules)) => (applied, schedules),
        (measures, schedules) => {
            let measures = measures.err().unwrap_or_default();
            let schedules = schedules.err().unwrap_or_default();
            warn!(
                measure_conflicts = measures.len(),
                unresolved_days = schedules.len(),
                "measure or schedule stage failed"
            );
            return Err(CompileError::Rules {
                measures,
                schedules,
            });
        }
    };

    let mut warnings: Vec<Diagnostic> = applied
        .unstaged
        .iter()
        .map(|&category| Diagnostic::unstaged_measure(category))
        .collect();
    for schedule in &schedules {
        warnings.extend(
            schedule
                .inert_rules
                .iter()
                .map(|rule| Diagnostic::inert_rule(&schedule.key, rule)),
        );
    }

    let skeleton = applied.skeleton;
    let model = CompiledModel {
        components: skeleton.components,
        systems: skeleton.systems,
        schedules,
        construction_sets: doc.construction_sets.clone(),
        space_types: doc.space_types.clone(),
        building: CompiledBuilding {
            space_type: skeleton.building.space_type,
            construction_set: skeleton.building.construction_set,
            hvac_system: skeleton.building.hvac_system,
            geometry: doc.building_info.geometry.clone(),
        },
        run_info: doc.run_info.clone(),
    };

    info!(
        components = model.components.len(),
        schedules = model.schedules.len(),
        measure_writes = applied.writes,
        warnings = warnings.len(),
        "model compiled"
    );
    Ok(CompileOutput { model, warnings })
}
