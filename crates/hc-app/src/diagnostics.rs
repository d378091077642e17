//! Structured diagnostics for front ends.
//!
//! Every stage error flattens into one [`Diagnostic`] per violation so a
//! caller can render, filter or count them without matching on error types.

use std::fmt;

use hc_schedule::UnresolvedScheduleError;
use hc_schema::{MeasureCategory, ParseIssue};
use hc_topology::{ResolveError, TopologyError};
use serde::Serialize;

use crate::measures::MeasureConflictError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Warning,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    Parse,
    DuplicateName,
    DanglingReference,
    Topology,
    MeasureConflict,
    UnresolvedSchedule,
    /// Schedule rule that selects no weekday.
    InertScheduleRule,
    /// Measure category left out of every pipeline stage.
    UnstagedMeasure,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub kind: DiagnosticKind,
    pub entity: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    pub message: String,
}

impl Diagnostic {
    fn error(kind: DiagnosticKind, entity: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            kind,
            entity: entity.into(),
            field: None,
            message: message.into(),
        }
    }

    fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    pub fn inert_rule(schedule: &str, rule: &str) -> Self {
        Self {
            severity: Severity::Warning,
            kind: DiagnosticKind::InertScheduleRule,
            entity: format!("schedule '{schedule}'"),
            field: Some(format!("schedule_rules.{rule}")),
            message: format!("rule '{rule}' applies to no weekday"),
        }
    }

    pub fn unstaged_measure(category: MeasureCategory) -> Self {
        Self {
            severity: Severity::Warning,
            kind: DiagnosticKind::UnstagedMeasure,
            entity: format!("measures.{category}"),
            field: None,
            message: format!("measure category '{category}' is in no pipeline stage; not applied"),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "{label}: {}", self.message)
    }
}

impl From<&ParseIssue> for Diagnostic {
    fn from(issue: &ParseIssue) -> Self {
        Diagnostic::error(DiagnosticKind::Parse, issue.path.clone(), issue.to_string())
    }
}

impl From<&ResolveError> for Diagnostic {
    fn from(err: &ResolveError) -> Self {
        match err {
            ResolveError::Dangling(d) => Diagnostic::error(
                DiagnosticKind::DanglingReference,
                d.referencing_entity.clone(),
                err.to_string(),
            )
            .with_field(d.field.clone()),
            ResolveError::DuplicateName { scope, .. } => {
                Diagnostic::error(DiagnosticKind::DuplicateName, scope.clone(), err.to_string())
            }
        }
    }
}

impl From<&TopologyError> for Diagnostic {
    fn from(err: &TopologyError) -> Self {
        Diagnostic::error(
            DiagnosticKind::Topology,
            format!("loop '{}'", err.loop_name),
            err.to_string(),
        )
    }
}

impl From<&MeasureConflictError> for Diagnostic {
    fn from(err: &MeasureConflictError) -> Self {
        Diagnostic::error(DiagnosticKind::MeasureConflict, err.entity.clone(), err.to_string())
            .with_field(err.attribute.clone())
    }
}

impl From<&UnresolvedScheduleError> for Diagnostic {
    fn from(err: &UnresolvedScheduleError) -> Self {
        Diagnostic::error(
            DiagnosticKind::UnresolvedSchedule,
            format!("schedule '{}'", err.schedule),
            err.to_string(),
        )
    }
}

/// Ordered diagnostic list.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Diagnostics(Vec<Diagnostic>);

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.0.push(diagnostic);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.0.iter()
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.0.iter().filter(|d| d.is_error())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.0.iter().filter(|d| !d.is_error())
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.0
    }
}

impl FromIterator<Diagnostic> for Diagnostics {
    fn from_iter<I: IntoIterator<Item = Diagnostic>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Extend<Diagnostic> for Diagnostics {
    fn extend<I: IntoIterator<Item = Diagnostic>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for diagnostic in &self.0 {
            writeln!(f, "{diagnostic}")?;
        }
        Ok(())
    }
}
