//! Configuration schema definitions.
//!
//! Every table of the input document becomes a `Vec` in declaration order;
//! the position of an entry is the arena index its handle will carry once
//! the document is resolved.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::Weekday;
use hc_core::TimeOfDay;
use serde::{Deserialize, Serialize};

use crate::catalog::ObjectType;

/// Value kinds an attribute may take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttrKind {
    Number,
    Text,
    Bool,
}

impl AttrKind {
    pub fn as_str(self) -> &'static str {
        match self {
            AttrKind::Number => "number",
            AttrKind::Text => "string",
            AttrKind::Bool => "boolean",
        }
    }
}

/// A single attribute value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl AttrValue {
    pub fn kind(&self) -> AttrKind {
        match self {
            AttrValue::Bool(_) => AttrKind::Bool,
            AttrValue::Number(_) => AttrKind::Number,
            AttrValue::Text(_) => AttrKind::Text,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttrValue::Number(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttrValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::Text(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Bool(v) => write!(f, "{v}"),
            AttrValue::Number(v) => write!(f, "{v}"),
            AttrValue::Text(v) => write!(f, "'{v}'"),
        }
    }
}

impl From<f64> for AttrValue {
    fn from(v: f64) -> Self {
        AttrValue::Number(v)
    }
}

impl From<bool> for AttrValue {
    fn from(v: bool) -> Self {
        AttrValue::Bool(v)
    }
}

impl From<&str> for AttrValue {
    fn from(v: &str) -> Self {
        AttrValue::Text(v.to_string())
    }
}

/// Attribute bag; sorted by name so iteration and serialization are stable.
pub type Attributes = BTreeMap<String, AttrValue>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigDocument {
    #[serde(default)]
    pub measures: Vec<MeasureDef>,
    pub hvac: Vec<HvacSystemDef>,
    pub components: Vec<ComponentDef>,
    pub schedules: Vec<ScheduleDef>,
    pub construction_sets: Vec<ConstructionSetDef>,
    pub space_types: Vec<SpaceTypeDef>,
    pub run_info: RunInfo,
    pub building_info: BuildingInfo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeasureCategory {
    HvacControls,
    HvacEquipment,
}

impl MeasureCategory {
    pub const ALL: [MeasureCategory; 2] =
        [MeasureCategory::HvacControls, MeasureCategory::HvacEquipment];

    pub fn as_str(self) -> &'static str {
        match self {
            MeasureCategory::HvacControls => "hvac_controls",
            MeasureCategory::HvacEquipment => "hvac_equipment",
        }
    }
}

impl FromStr for MeasureCategory {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MeasureCategory::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or(())
    }
}

impl fmt::Display for MeasureCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A bundle of attribute overrides for one measure category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasureDef {
    pub category: MeasureCategory,
    pub overrides: Attributes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoopKind {
    Air,
    HotWater,
    ChilledWater,
    CondenserWater,
}

impl LoopKind {
    pub fn as_str(self) -> &'static str {
        match self {
            LoopKind::Air => "air",
            LoopKind::HotWater => "hot_water",
            LoopKind::ChilledWater => "chilled_water",
            LoopKind::CondenserWater => "condenser_water",
        }
    }

    pub fn is_plant(self) -> bool {
        !matches!(self, LoopKind::Air)
    }
}

impl FromStr for LoopKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "air" => Ok(LoopKind::Air),
            "hot_water" => Ok(LoopKind::HotWater),
            "chilled_water" => Ok(LoopKind::ChilledWater),
            "condenser_water" => Ok(LoopKind::CondenserWater),
            _ => Err(()),
        }
    }
}

impl fmt::Display for LoopKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One named HVAC system of the `hvac` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HvacSystemDef {
    pub name: String,
    #[serde(default)]
    pub air_loops: Vec<AirLoopDef>,
    #[serde(default)]
    pub plant_loops: Vec<PlantLoopDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub availability_schedule: Option<String>,
    #[serde(default)]
    pub attributes: Attributes,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirLoopDef {
    pub name: String,
    /// Ordered supply path ending at the supply outlet node.
    pub supply: Vec<String>,
    pub demand_branches: Vec<BranchDef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BranchDef {
    pub name: String,
    pub components: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlantLoopDef {
    pub name: String,
    pub kind: LoopKind,
    /// Components declared on the supply inlet node; empty when the loop omits it.
    #[serde(default)]
    pub inlet_node: Vec<String>,
    pub supply_branches: Vec<String>,
    pub demand_branches: Vec<String>,
}

/// A component of the `hvac_components` table, or a sub-component owned by one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentDef {
    pub name: String,
    pub object_type: ObjectType,
    #[serde(default)]
    pub attributes: Attributes,
    #[serde(default)]
    pub sub_components: Vec<ComponentDef>,
}

/// Set of weekdays a schedule rule applies to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WeekdaySet(u8);

impl WeekdaySet {
    pub const WEEKDAYS: WeekdaySet = WeekdaySet(0b0001_1111);
    pub const WEEKEND: WeekdaySet = WeekdaySet(0b0110_0000);

    pub fn empty() -> Self {
        Self(0)
    }

    pub fn insert(&mut self, day: Weekday) {
        self.0 |= 1 << day.num_days_from_monday();
    }

    pub fn contains(self, day: Weekday) -> bool {
        self.0 & (1 << day.num_days_from_monday()) != 0
    }

    pub fn union(self, other: WeekdaySet) -> Self {
        Self(self.0 | other.0)
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl FromIterator<Weekday> for WeekdaySet {
    fn from_iter<I: IntoIterator<Item = Weekday>>(iter: I) -> Self {
        let mut set = WeekdaySet::empty();
        for day in iter {
            set.insert(day);
        }
        set
    }
}

/// A 24-hour day profile: sorted `(time, value)` breakpoints starting at 00:00.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayProfileDef {
    /// Key the profile is declared under (`default_day`, a `day_schedules`
    /// entry, or `<rule>.day_schedule` for inline rule days).
    pub key: String,
    pub name: String,
    pub values: Vec<(TimeOfDay, f64)>,
}

/// Day profile a rule selects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DayRef {
    /// Index into the owning schedule's `days`.
    Inline(usize),
    /// Key of another day-type of the same schedule.
    Named(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleRuleDef {
    pub key: String,
    pub name: String,
    pub applies_to: WeekdaySet,
    pub day_schedule: DayRef,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleDef {
    pub key: String,
    pub name: String,
    /// Every day profile of the schedule, inline rule days included.
    pub days: Vec<DayProfileDef>,
    pub default_day: Option<usize>,
    pub summer_design_day: Option<usize>,
    pub winter_design_day: Option<usize>,
    #[serde(default)]
    pub rules: Vec<ScheduleRuleDef>,
}

impl ScheduleDef {
    /// Index of the day-type declared under `key`, excluding inline rule days.
    pub fn day_by_key(&self, key: &str) -> Option<usize> {
        let index = self.days.iter().position(|d| d.key == key)?;
        let inline = self
            .rules
            .iter()
            .any(|rule| rule.day_schedule == DayRef::Inline(index));
        (!inline).then_some(index)
    }
}

/// Building archetype metadata shared by construction sets and space types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchetypeKey {
    pub base_building_type: String,
    pub building_age: i64,
    pub climate_zone: String,
    pub building_standard: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstructionSetDef {
    pub name: String,
    pub archetype: ArchetypeKey,
    #[serde(default)]
    pub attributes: Attributes,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpaceTypeDef {
    pub name: String,
    pub base_space_type: String,
    pub archetype: ArchetypeKey,
    #[serde(default)]
    pub attributes: Attributes,
}

/// Run settings passed through to the renderer and runner untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunInfo {
    pub uuid: String,
    pub output_location: String,
    pub temp_sim_location: String,
    pub simulation_year: i64,
    pub timestep: i64,
    #[serde(default)]
    pub extra: Attributes,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingInfo {
    pub space_type: String,
    pub construction_set: String,
    pub hvac_system: String,
    /// Geometry parameters, opaque to the compiler.
    #[serde(default)]
    pub geometry: Attributes,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weekday_set_membership() {
        let weekend: WeekdaySet = [Weekday::Sat, Weekday::Sun].into_iter().collect();
        assert_eq!(weekend, WeekdaySet::WEEKEND);
        assert!(weekend.contains(Weekday::Sun));
        assert!(!weekend.contains(Weekday::Mon));
        assert!(WeekdaySet::WEEKDAYS.contains(Weekday::Fri));
        assert!(WeekdaySet::empty().is_empty());
    }

    #[test]
    fn attr_value_serializes_untagged() {
        let attrs: Attributes = [
            ("a".to_string(), AttrValue::Number(0.7)),
            ("b".to_string(), AttrValue::Bool(true)),
            ("c".to_string(), AttrValue::Text("CycleOnAny".to_string())),
        ]
        .into_iter()
        .collect();
        let json = serde_json::to_string(&attrs).unwrap();
        assert_eq!(json, r#"{"a":0.7,"b":true,"c":"CycleOnAny"}"#);
    }

    #[test]
    fn day_by_key_skips_inline_rule_days() {
        let day = |key: &str| DayProfileDef {
            key: key.to_string(),
            name: key.to_string(),
            values: vec![(TimeOfDay::MIDNIGHT, 0.0)],
        };
        let rule = |key: &str, day_schedule: DayRef| ScheduleRuleDef {
            key: key.to_string(),
            name: key.to_string(),
            applies_to: WeekdaySet::WEEKEND,
            day_schedule,
        };
        let schedule = ScheduleDef {
            key: "occupancy".to_string(),
            name: "occupancy".to_string(),
            days: vec![day("default_day"), day("weekend.day_schedule")],
            default_day: Some(0),
            summer_design_day: None,
            winter_design_day: None,
            rules: vec![
                rule("weekend", DayRef::Inline(1)),
                rule("holiday", DayRef::Named("weekend.day_schedule".to_string())),
            ],
        };

        assert_eq!(schedule.day_by_key("default_day"), Some(0));
        assert_eq!(schedule.day_by_key("weekend.day_schedule"), None);
    }

    #[test]
    fn loop_kind_names() {
        for kind in [
            LoopKind::Air,
            LoopKind::HotWater,
            LoopKind::ChilledWater,
            LoopKind::CondenserWater,
        ] {
            assert_eq!(kind.as_str().parse::<LoopKind>(), Ok(kind));
        }
        assert!("steam".parse::<LoopKind>().is_err());
    }
}
