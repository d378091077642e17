//! Schedule compilation.

use chrono::Weekday;
use hc_core::{ScheduleId, TimeOfDay};
use hc_schema::ScheduleDef;
use hc_topology::ScheduleLinks;
use rayon::prelude::*;
use serde::Serialize;

use crate::calendar::{WEEK, WeeklyCalendar};
use crate::error::UnresolvedScheduleError;
use crate::profile::DayProfile;

/// A schedule ready for point queries.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompiledSchedule {
    pub id: ScheduleId,
    pub key: String,
    pub name: String,
    pub days: Vec<DayProfile>,
    pub week: WeeklyCalendar,
    pub summer_design_day: Option<usize>,
    pub winter_design_day: Option<usize>,
    /// Rules that won no weekday: empty day sets, or days all claimed earlier.
    #[serde(skip)]
    pub inert_rules: Vec<String>,
}

impl CompiledSchedule {
    pub fn day(&self, weekday: Weekday) -> &DayProfile {
        &self.days[self.week.day_for(weekday)]
    }

    pub fn value_at(&self, weekday: Weekday, time: TimeOfDay) -> f64 {
        self.day(weekday).value_at(time)
    }

    pub fn summer_design_day(&self) -> Option<&DayProfile> {
        self.summer_design_day.map(|i| &self.days[i])
    }

    pub fn winter_design_day(&self) -> Option<&DayProfile> {
        self.winter_design_day.map(|i| &self.days[i])
    }
}

/// Compile one schedule.
///
/// `rule_days` holds the resolved day index of each rule, in rule order, and
/// must be exactly as long as `def.rules`.
/// Rules are evaluated in declaration order and the first match wins; weekdays
/// no rule covers fall back to `default_day`. Design days never enter the
/// weekly calendar.
pub fn compile_schedule(
    id: ScheduleId,
    def: &ScheduleDef,
    rule_days: &[usize],
) -> Result<CompiledSchedule, Vec<UnresolvedScheduleError>> {
    debug_assert_eq!(
        def.rules.len(),
        rule_days.len(),
        "schedule '{}' needs one resolved day per rule",
        def.key
    );
    let mut week = [None; 7];
    let mut inert_rules = Vec::new();

    for (rule, &day) in def.rules.iter().zip(rule_days) {
        let mut won = false;
        for (slot, &weekday) in week.iter_mut().zip(WEEK.iter()) {
            if slot.is_none() && rule.applies_to.contains(weekday) {
                *slot = Some(day);
                won = true;
            }
        }
        if !won {
            inert_rules.push(rule.key.clone());
        }
    }

    let mut errors = Vec::new();
    let mut days = [0; 7];
    for ((slot, resolved), &weekday) in days.iter_mut().zip(week).zip(WEEK.iter()) {
        match resolved.or(def.default_day) {
            Some(day) => *slot = day,
            None => errors.push(UnresolvedScheduleError {
                schedule: def.key.clone(),
                weekday,
            }),
        }
    }
    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(CompiledSchedule {
        id,
        key: def.key.clone(),
        name: def.name.clone(),
        days: def.days.iter().map(DayProfile::from_def).collect(),
        week: WeeklyCalendar::new(days),
        summer_design_day: def.summer_design_day,
        winter_design_day: def.winter_design_day,
        inert_rules,
    })
}

/// Compile every schedule in parallel; errors keep declaration order.
pub fn compile_schedules(
    defs: &[ScheduleDef],
    links: &[ScheduleLinks],
) -> Result<Vec<CompiledSchedule>, Vec<UnresolvedScheduleError>> {
    let results: Vec<_> = defs
        .par_iter()
        .zip(links.par_iter())
        .map(|(def, link)| compile_schedule(link.id, def, &link.rule_days))
        .collect();

    let mut compiled = Vec::with_capacity(results.len());
    let mut errors = Vec::new();
    for result in results {
        match result {
            Ok(schedule) => compiled.push(schedule),
            Err(mut errs) => errors.append(&mut errs),
        }
    }
    if errors.is_empty() {
        Ok(compiled)
    } else {
        Err(errors)
    }
}
