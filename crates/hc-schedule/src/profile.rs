//! Day profiles as step functions over one day.

use hc_core::TimeOfDay;
use hc_schema::DayProfileDef;
use serde::Serialize;

/// Step function over `[00:00, 24:00)`.
///
/// Breakpoints are strictly increasing and the first one is midnight, so
/// every time of day falls in exactly one segment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayProfile {
    pub key: String,
    pub name: String,
    breakpoints: Vec<(TimeOfDay, f64)>,
}

impl DayProfile {
    /// Build from a parsed day definition; the parser already checked ordering.
    pub fn from_def(def: &DayProfileDef) -> Self {
        Self {
            key: def.key.clone(),
            name: def.name.clone(),
            breakpoints: def.values.clone(),
        }
    }

    /// Value held at `time`.
    ///
    /// A query exactly at a breakpoint returns that breakpoint's value.
    pub fn value_at(&self, time: TimeOfDay) -> f64 {
        let upto = self.breakpoints.partition_point(|&(t, _)| t <= time);
        self.breakpoints
            .get(upto.saturating_sub(1))
            .map_or(0.0, |&(_, value)| value)
    }

    pub fn breakpoints(&self) -> &[(TimeOfDay, f64)] {
        &self.breakpoints
    }

    /// True when the profile holds a single value all day.
    pub fn is_constant(&self) -> bool {
        self.breakpoints
            .windows(2)
            .all(|pair| pair[0].1 == pair[1].1)
    }
}
