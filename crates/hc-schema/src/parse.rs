//! Batch parser from a raw configuration value into typed records.
//!
//! The parser never stops at the first problem: every violation found in the
//! document is recorded as a `ParseIssue` and returned together.

use std::fmt;

use chrono::Weekday;
use hc_core::TimeOfDay;
use serde_json::{Map, Value};

use crate::catalog::{self, ObjectType, SYSTEM_ATTRIBUTES};
use crate::schema::*;

pub const SECTIONS: &[&str] = &[
    "measures",
    "hvac",
    "hvac_components",
    "schedules",
    "construction_sets",
    "space_types",
    "run_info",
    "building_info",
];

const REQUIRED_SECTIONS: &[&str] = &[
    "hvac",
    "hvac_components",
    "schedules",
    "construction_sets",
    "space_types",
    "run_info",
    "building_info",
];

const RULE_DAY_FLAGS: &[(&str, Weekday)] = &[
    ("apply_monday", Weekday::Mon),
    ("apply_tuesday", Weekday::Tue),
    ("apply_wednesday", Weekday::Wed),
    ("apply_thursday", Weekday::Thu),
    ("apply_friday", Weekday::Fri),
    ("apply_saturday", Weekday::Sat),
    ("apply_sunday", Weekday::Sun),
];

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ParseIssueKind {
    #[error("unknown section '{name}'")]
    UnknownSection { name: String },

    #[error("unknown field '{name}'")]
    UnknownField { name: String },

    #[error("missing required field '{name}'")]
    MissingField { name: String },

    #[error("expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("unknown object type '{name}'")]
    UnknownObjectType { name: String },

    #[error("component name '{name}' contains '.', reserved for owner.sub references")]
    DottedComponentName { name: String },

    #[error("attribute '{name}' is not defined for {object_type}")]
    UnknownAttribute {
        object_type: ObjectType,
        name: String,
    },

    #[error("unknown measure category '{name}'")]
    UnknownMeasureCategory { name: String },

    #[error("measure category '{category}' has no target for '{name}'")]
    UnknownMeasureKey {
        category: MeasureCategory,
        name: String,
    },

    #[error("invalid loop kind '{value}' (expected hot_water, chilled_water or condenser_water)")]
    InvalidLoopKind { value: String },

    #[error("invalid time key '{text}': {reason}")]
    InvalidTimeKey { text: String, reason: String },

    #[error("time key {key} does not follow {previous}")]
    TimeKeysNotIncreasing {
        previous: TimeOfDay,
        key: TimeOfDay,
    },

    #[error("day profile starts at {first} instead of 00:00")]
    DayMustStartAtMidnight { first: TimeOfDay },

    #[error("day profile has no values")]
    EmptyDay,
}

/// One violation, located by a dotted path into the document.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseIssue {
    pub path: String,
    pub kind: ParseIssueKind,
}

impl fmt::Display for ParseIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.kind)
        } else {
            write!(f, "{}: {}", self.path, self.kind)
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[error("configuration has {} parse issue(s); first: {}", .issues.len(), first_issue(.issues))]
pub struct ParseError {
    pub issues: Vec<ParseIssue>,
}

fn first_issue(issues: &[ParseIssue]) -> String {
    issues.first().map(|i| i.to_string()).unwrap_or_default()
}

/// Parse a whole configuration document, reporting every issue at once.
pub fn parse_document(value: &Value) -> Result<ConfigDocument, ParseError> {
    let mut parser = Parser::default();
    let document = parser.document(value);
    match document {
        Some(document) if parser.issues.is_empty() => Ok(document),
        _ => Err(ParseError {
            issues: parser.issues,
        }),
    }
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn join(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{path}.{key}")
    }
}

#[derive(Default)]
struct Parser {
    issues: Vec<ParseIssue>,
}

impl Parser {
    fn issue(&mut self, path: impl Into<String>, kind: ParseIssueKind) {
        self.issues.push(ParseIssue {
            path: path.into(),
            kind,
        });
    }

    fn mismatch(&mut self, path: &str, expected: &'static str, value: &Value) {
        self.issue(
            path,
            ParseIssueKind::TypeMismatch {
                expected,
                found: kind_name(value),
            },
        );
    }

    fn object<'v>(&mut self, path: &str, value: &'v Value) -> Option<&'v Map<String, Value>> {
        match value {
            Value::Object(map) => Some(map),
            other => {
                self.mismatch(path, "object", other);
                None
            }
        }
    }

    /// Record every key of `map` not in `allowed`.
    fn check_fields(&mut self, path: &str, map: &Map<String, Value>, allowed: &[&str]) {
        for key in map.keys() {
            if !allowed.contains(&key.as_str()) {
                self.issue(
                    join(path, key),
                    ParseIssueKind::UnknownField { name: key.clone() },
                );
            }
        }
    }

    fn required<'v>(
        &mut self,
        path: &str,
        map: &'v Map<String, Value>,
        key: &str,
    ) -> Option<&'v Value> {
        let value = map.get(key);
        if value.is_none() {
            self.issue(
                path,
                ParseIssueKind::MissingField {
                    name: key.to_string(),
                },
            );
        }
        value
    }

    fn string(&mut self, path: &str, value: &Value) -> Option<String> {
        match value {
            Value::String(s) => Some(s.clone()),
            other => {
                self.mismatch(path, "string", other);
                None
            }
        }
    }

    fn number(&mut self, path: &str, value: &Value) -> Option<f64> {
        match value.as_f64() {
            Some(v) if value.is_number() => Some(v),
            _ => {
                self.mismatch(path, "number", value);
                None
            }
        }
    }

    fn integer(&mut self, path: &str, value: &Value) -> Option<i64> {
        let parsed = value.as_i64();
        if parsed.is_none() {
            self.mismatch(path, "integer", value);
        }
        parsed
    }

    fn boolean(&mut self, path: &str, value: &Value) -> Option<bool> {
        match value {
            Value::Bool(b) => Some(*b),
            other => {
                self.mismatch(path, "boolean", other);
                None
            }
        }
    }

    fn req_string(&mut self, path: &str, map: &Map<String, Value>, key: &str) -> Option<String> {
        let value = self.required(path, map, key)?;
        self.string(&join(path, key), value)
    }

    fn req_integer(&mut self, path: &str, map: &Map<String, Value>, key: &str) -> Option<i64> {
        let value = self.required(path, map, key)?;
        self.integer(&join(path, key), value)
    }

    /// A single name or a list of names.
    fn name_list(&mut self, path: &str, value: &Value) -> Vec<String> {
        match value {
            Value::String(s) => vec![s.clone()],
            Value::Array(items) => items
                .iter()
                .enumerate()
                .filter_map(|(i, item)| self.string(&format!("{path}[{i}]"), item))
                .collect(),
            other => {
                self.mismatch(path, "string or array of strings", other);
                Vec::new()
            }
        }
    }

    fn attr_value(&mut self, path: &str, value: &Value) -> Option<AttrValue> {
        match value {
            Value::Bool(b) => Some(AttrValue::Bool(*b)),
            Value::Number(n) => n.as_f64().map(AttrValue::Number),
            Value::String(s) => Some(AttrValue::Text(s.clone())),
            other => {
                self.mismatch(path, "number, string or boolean", other);
                None
            }
        }
    }

    fn typed_attr(&mut self, path: &str, value: &Value, kind: AttrKind) -> Option<AttrValue> {
        let parsed = self.attr_value(path, value)?;
        if parsed.kind() != kind {
            self.mismatch(path, kind.as_str(), value);
            return None;
        }
        Some(parsed)
    }

    /// Open attribute bag: every key not in `skip` becomes an attribute.
    fn open_attributes(
        &mut self,
        path: &str,
        map: &Map<String, Value>,
        skip: &[&str],
    ) -> Attributes {
        map.iter()
            .filter(|(k, _)| !skip.contains(&k.as_str()))
            .filter_map(|(k, v)| {
                let value = self.attr_value(&join(path, k), v)?;
                Some((k.clone(), value))
            })
            .collect()
    }

    fn document(&mut self, value: &Value) -> Option<ConfigDocument> {
        let root = self.object("", value)?;

        for key in root.keys() {
            if !SECTIONS.contains(&key.as_str()) {
                self.issue(
                    key.clone(),
                    ParseIssueKind::UnknownSection { name: key.clone() },
                );
            }
        }
        for section in REQUIRED_SECTIONS {
            if !root.contains_key(*section) {
                self.issue(
                    "",
                    ParseIssueKind::MissingField {
                        name: section.to_string(),
                    },
                );
            }
        }

        let measures = match root.get("measures") {
            Some(v) => self.measures(v),
            None => Some(Vec::new()),
        };
        let hvac = root.get("hvac").and_then(|v| self.hvac(v));
        let components = root
            .get("hvac_components")
            .and_then(|v| self.component_table(v));
        let schedules = root.get("schedules").and_then(|v| self.schedules(v));
        let construction_sets = root
            .get("construction_sets")
            .and_then(|v| self.construction_sets(v));
        let space_types = root.get("space_types").and_then(|v| self.space_types(v));
        let run_info = root.get("run_info").and_then(|v| self.run_info(v));
        let building_info = root
            .get("building_info")
            .and_then(|v| self.building_info(v));

        Some(ConfigDocument {
            measures: measures?,
            hvac: hvac?,
            components: components?,
            schedules: schedules?,
            construction_sets: construction_sets?,
            space_types: space_types?,
            run_info: run_info?,
            building_info: building_info?,
        })
    }

    fn measures(&mut self, value: &Value) -> Option<Vec<MeasureDef>> {
        let map = self.object("measures", value)?;
        let mut measures = Vec::new();
        for (name, body) in map {
            let path = join("measures", name);
            let Ok(category) = name.parse::<MeasureCategory>() else {
                self.issue(
                    path,
                    ParseIssueKind::UnknownMeasureCategory { name: name.clone() },
                );
                continue;
            };
            let Some(body) = self.object(&path, body) else {
                continue;
            };

            let mut overrides = Attributes::new();
            for (key, v) in body {
                let key_path = join(&path, key);
                match catalog::measure_target(category, key) {
                    Some(target) => {
                        if let Some(value) = self.typed_attr(&key_path, v, target.kind) {
                            overrides.insert(key.clone(), value);
                        }
                    }
                    None => self.issue(
                        key_path,
                        ParseIssueKind::UnknownMeasureKey {
                            category,
                            name: key.clone(),
                        },
                    ),
                }
            }
            measures.push(MeasureDef {
                category,
                overrides,
            });
        }
        Some(measures)
    }

    fn hvac(&mut self, value: &Value) -> Option<Vec<HvacSystemDef>> {
        let map = self.object("hvac", value)?;
        let systems = map
            .iter()
            .filter_map(|(name, body)| self.hvac_system(&join("hvac", name), name, body))
            .collect();
        Some(systems)
    }

    fn hvac_system(&mut self, path: &str, name: &str, value: &Value) -> Option<HvacSystemDef> {
        let map = self.object(path, value)?;

        let mut attributes = Attributes::new();
        for (key, v) in map {
            let key_path = join(path, key);
            match key.as_str() {
                "air_loops" | "plant_loops" | "availability_schedule" => {}
                _ => match SYSTEM_ATTRIBUTES.iter().find(|a| a.name == key) {
                    Some(spec) => {
                        if let Some(value) = self.typed_attr(&key_path, v, spec.kind) {
                            attributes.insert(key.clone(), value);
                        }
                    }
                    None => self.issue(
                        key_path,
                        ParseIssueKind::UnknownField { name: key.clone() },
                    ),
                },
            }
        }

        let availability_schedule = map
            .get("availability_schedule")
            .and_then(|v| self.string(&join(path, "availability_schedule"), v));

        let mut air_loops = Vec::new();
        if let Some(v) = map.get("air_loops") {
            let loops_path = join(path, "air_loops");
            if let Some(loops) = self.object(&loops_path, v) {
                air_loops = loops
                    .iter()
                    .filter_map(|(n, body)| self.air_loop(&join(&loops_path, n), n, body))
                    .collect();
            }
        }

        let mut plant_loops = Vec::new();
        if let Some(v) = map.get("plant_loops") {
            let loops_path = join(path, "plant_loops");
            if let Some(loops) = self.object(&loops_path, v) {
                plant_loops = loops
                    .iter()
                    .filter_map(|(n, body)| self.plant_loop(&join(&loops_path, n), n, body))
                    .collect();
            }
        }

        Some(HvacSystemDef {
            name: name.to_string(),
            air_loops,
            plant_loops,
            availability_schedule,
            attributes,
        })
    }

    fn air_loop(&mut self, path: &str, name: &str, value: &Value) -> Option<AirLoopDef> {
        let map = self.object(path, value)?;
        self.check_fields(path, map, &["supply_components", "demand_components"]);

        let supply = self.required(path, map, "supply_components").and_then(|v| {
            let supply_path = join(path, "supply_components");
            let supply = self.object(&supply_path, v)?;
            self.check_fields(&supply_path, supply, &["outlet_node"]);
            let outlet = self.required(&supply_path, supply, "outlet_node")?;
            Some(self.name_list(&join(&supply_path, "outlet_node"), outlet))
        });

        let demand_branches = self.required(path, map, "demand_components").and_then(|v| {
            let demand_path = join(path, "demand_components");
            let demand = self.object(&demand_path, v)?;
            self.check_fields(&demand_path, demand, &["branches"]);
            let branches_path = join(&demand_path, "branches");
            let branches = self.required(&demand_path, demand, "branches")?;
            let branches = self.object(&branches_path, branches)?;
            Some(
                branches
                    .iter()
                    .map(|(branch, names)| BranchDef {
                        name: branch.clone(),
                        components: self.name_list(&join(&branches_path, branch), names),
                    })
                    .collect::<Vec<_>>(),
            )
        });

        Some(AirLoopDef {
            name: name.to_string(),
            supply: supply?,
            demand_branches: demand_branches?,
        })
    }

    fn plant_loop(&mut self, path: &str, name: &str, value: &Value) -> Option<PlantLoopDef> {
        let map = self.object(path, value)?;
        self.check_fields(
            path,
            map,
            &["plant_loop_type", "supply_components", "demand_components"],
        );

        let kind = self.req_string(path, map, "plant_loop_type").and_then(|s| {
            match s.parse::<LoopKind>() {
                Ok(kind) if kind.is_plant() => Some(kind),
                _ => {
                    self.issue(
                        join(path, "plant_loop_type"),
                        ParseIssueKind::InvalidLoopKind { value: s },
                    );
                    None
                }
            }
        });

        let supply = self.required(path, map, "supply_components").and_then(|v| {
            let supply_path = join(path, "supply_components");
            let supply = self.object(&supply_path, v)?;
            self.check_fields(&supply_path, supply, &["inlet_node", "branches"]);
            // A missing inlet node is a topology problem, not a parse problem.
            let inlet = supply
                .get("inlet_node")
                .map(|v| self.name_list(&join(&supply_path, "inlet_node"), v))
                .unwrap_or_default();
            let branches = self.required(&supply_path, supply, "branches")?;
            let branches = self.name_list(&join(&supply_path, "branches"), branches);
            Some((inlet, branches))
        });

        let demand = self.required(path, map, "demand_components").and_then(|v| {
            let demand_path = join(path, "demand_components");
            let demand = self.object(&demand_path, v)?;
            self.check_fields(&demand_path, demand, &["branches"]);
            let branches = self.required(&demand_path, demand, "branches")?;
            Some(self.name_list(&join(&demand_path, "branches"), branches))
        });

        let (inlet_node, supply_branches) = supply?;
        Some(PlantLoopDef {
            name: name.to_string(),
            kind: kind?,
            inlet_node,
            supply_branches,
            demand_branches: demand?,
        })
    }

    fn component_table(&mut self, value: &Value) -> Option<Vec<ComponentDef>> {
        let map = self.object("hvac_components", value)?;
        Some(
            map.iter()
                .filter_map(|(name, body)| {
                    self.component(&join("hvac_components", name), name, body)
                })
                .collect(),
        )
    }

    fn component(&mut self, path: &str, name: &str, value: &Value) -> Option<ComponentDef> {
        let map = self.object(path, value)?;
        let plain_name = !name.contains('.');
        if !plain_name {
            self.issue(
                path,
                ParseIssueKind::DottedComponentName {
                    name: name.to_string(),
                },
            );
        }
        self.check_fields(
            path,
            map,
            &["idd_object_type", "component_values", "sub_components"],
        );

        let object_type = self
            .req_string(path, map, "idd_object_type")
            .and_then(|type_name| match ObjectType::from_idd_name(&type_name) {
                Some(ty) => Some(ty),
                None => {
                    self.issue(
                        join(path, "idd_object_type"),
                        ParseIssueKind::UnknownObjectType { name: type_name },
                    );
                    None
                }
            });

        let mut attributes = Attributes::new();
        if let Some(v) = map.get("component_values") {
            let values_path = join(path, "component_values");
            if let Some(values) = self.object(&values_path, v) {
                for (key, v) in values {
                    let key_path = join(&values_path, key);
                    // Without a known type there is no schema to check against.
                    let Some(ty) = object_type else { continue };
                    match ty.attribute(key) {
                        Some(spec) => {
                            if let Some(value) = self.typed_attr(&key_path, v, spec.kind) {
                                attributes.insert(key.clone(), value);
                            }
                        }
                        None => self.issue(
                            key_path,
                            ParseIssueKind::UnknownAttribute {
                                object_type: ty,
                                name: key.clone(),
                            },
                        ),
                    }
                }
            }
        }

        let mut sub_components = Vec::new();
        if let Some(v) = map.get("sub_components") {
            let subs_path = join(path, "sub_components");
            if let Some(subs) = self.object(&subs_path, v) {
                sub_components = subs
                    .iter()
                    .filter_map(|(n, body)| self.component(&join(&subs_path, n), n, body))
                    .collect();
            }
        }

        if !plain_name {
            return None;
        }
        Some(ComponentDef {
            name: name.to_string(),
            object_type: object_type?,
            attributes,
            sub_components,
        })
    }

    fn schedules(&mut self, value: &Value) -> Option<Vec<ScheduleDef>> {
        let map = self.object("schedules", value)?;
        Some(
            map.iter()
                .filter_map(|(key, body)| self.schedule(&join("schedules", key), key, body))
                .collect(),
        )
    }

    fn schedule(&mut self, path: &str, key: &str, value: &Value) -> Option<ScheduleDef> {
        let map = self.object(path, value)?;
        self.check_fields(
            path,
            map,
            &[
                "name",
                "default_day",
                "summer_design_day",
                "winter_design_day",
                "day_schedules",
                "schedule_rules",
            ],
        );

        let name = map
            .get("name")
            .and_then(|v| self.string(&join(path, "name"), v))
            .unwrap_or_else(|| key.to_string());

        let mut days = Vec::new();
        let builtin = |parser: &mut Parser, day_key: &str, days: &mut Vec<DayProfileDef>| {
            let v = map.get(day_key)?;
            let day = parser.day_profile(&join(path, day_key), day_key, v)?;
            days.push(day);
            Some(days.len() - 1)
        };
        let default_day = builtin(self, "default_day", &mut days);
        let summer_design_day = builtin(self, "summer_design_day", &mut days);
        let winter_design_day = builtin(self, "winter_design_day", &mut days);

        if let Some(v) = map.get("day_schedules") {
            let days_path = join(path, "day_schedules");
            if let Some(custom) = self.object(&days_path, v) {
                for (day_key, body) in custom {
                    if let Some(day) = self.day_profile(&join(&days_path, day_key), day_key, body)
                    {
                        days.push(day);
                    }
                }
            }
        }

        let mut rules = Vec::new();
        if let Some(v) = map.get("schedule_rules") {
            let rules_path = join(path, "schedule_rules");
            if let Some(rule_map) = self.object(&rules_path, v) {
                for (rule_key, body) in rule_map {
                    let rule_path = join(&rules_path, rule_key);
                    if let Some(rule) = self.schedule_rule(&rule_path, rule_key, body, &mut days) {
                        rules.push(rule);
                    }
                }
            }
        }

        Some(ScheduleDef {
            key: key.to_string(),
            name,
            days,
            default_day,
            summer_design_day,
            winter_design_day,
            rules,
        })
    }

    fn schedule_rule(
        &mut self,
        path: &str,
        key: &str,
        value: &Value,
        days: &mut Vec<DayProfileDef>,
    ) -> Option<ScheduleRuleDef> {
        let map = self.object(path, value)?;
        let mut allowed: Vec<&str> = RULE_DAY_FLAGS.iter().map(|(flag, _)| *flag).collect();
        allowed.extend(["name", "apply_weekdays", "day_schedule"]);
        self.check_fields(path, map, &allowed);

        let name = map
            .get("name")
            .and_then(|v| self.string(&join(path, "name"), v))
            .unwrap_or_else(|| key.to_string());

        let mut applies_to = WeekdaySet::empty();
        for (flag, day) in RULE_DAY_FLAGS {
            if let Some(v) = map.get(*flag)
                && self.boolean(&join(path, flag), v) == Some(true)
            {
                applies_to.insert(*day);
            }
        }
        if let Some(v) = map.get("apply_weekdays")
            && self.boolean(&join(path, "apply_weekdays"), v) == Some(true)
        {
            applies_to = applies_to.union(WeekdaySet::WEEKDAYS);
        }

        let day_path = join(path, "day_schedule");
        let day_value = self.required(path, map, "day_schedule")?;
        let day_schedule = match day_value {
            Value::String(target) => DayRef::Named(target.clone()),
            Value::Object(_) => {
                let day = self.day_profile(&day_path, &join(key, "day_schedule"), day_value)?;
                days.push(day);
                DayRef::Inline(days.len() - 1)
            }
            other => {
                self.mismatch(&day_path, "day schedule object or day-type name", other);
                return None;
            }
        };

        Some(ScheduleRuleDef {
            key: key.to_string(),
            name,
            applies_to,
            day_schedule,
        })
    }

    fn day_profile(&mut self, path: &str, key: &str, value: &Value) -> Option<DayProfileDef> {
        let map = self.object(path, value)?;
        self.check_fields(path, map, &["name", "values"]);

        let name = map
            .get("name")
            .and_then(|v| self.string(&join(path, "name"), v))
            .unwrap_or_else(|| key.to_string());

        let values_path = join(path, "values");
        let raw = self.required(path, map, "values")?;
        let raw = self.object(&values_path, raw)?;
        if raw.is_empty() {
            self.issue(values_path, ParseIssueKind::EmptyDay);
            return None;
        }

        let issues_before = self.issues.len();
        let mut values: Vec<(TimeOfDay, f64)> = Vec::with_capacity(raw.len());
        for (text, v) in raw {
            let key_path = join(&values_path, text);
            let time = match text.parse::<TimeOfDay>() {
                Ok(t) if t.is_end_of_day() => {
                    self.issue(
                        key_path,
                        ParseIssueKind::InvalidTimeKey {
                            text: text.clone(),
                            reason: "24:00 ends the day and cannot start a step".to_string(),
                        },
                    );
                    continue;
                }
                Ok(t) => t,
                Err(e) => {
                    let reason = match e {
                        hc_core::CoreError::InvalidTime { reason, .. } => reason.to_string(),
                        other => other.to_string(),
                    };
                    self.issue(
                        key_path,
                        ParseIssueKind::InvalidTimeKey {
                            text: text.clone(),
                            reason,
                        },
                    );
                    continue;
                }
            };
            let Some(number) = self.number(&key_path, v) else {
                continue;
            };
            if let Some(&(previous, _)) = values.last()
                && time <= previous
            {
                self.issue(
                    key_path,
                    ParseIssueKind::TimeKeysNotIncreasing {
                        previous,
                        key: time,
                    },
                );
                continue;
            }
            values.push((time, number));
        }

        if let Some(&(first, _)) = values.first()
            && first != TimeOfDay::MIDNIGHT
        {
            self.issue(&values_path, ParseIssueKind::DayMustStartAtMidnight { first });
        }

        if self.issues.len() > issues_before {
            return None;
        }
        Some(DayProfileDef {
            key: key.to_string(),
            name,
            values,
        })
    }

    fn archetype_key(&mut self, path: &str, map: &Map<String, Value>) -> Option<ArchetypeKey> {
        let base_building_type = self.req_string(path, map, "base_building_type");
        let building_age = self.req_integer(path, map, "building_age");
        let climate_zone = self.req_string(path, map, "climate_zone");
        let building_standard = self.req_string(path, map, "building_standard");
        Some(ArchetypeKey {
            base_building_type: base_building_type?,
            building_age: building_age?,
            climate_zone: climate_zone?,
            building_standard: building_standard?,
        })
    }

    fn construction_sets(&mut self, value: &Value) -> Option<Vec<ConstructionSetDef>> {
        const KEY_FIELDS: &[&str] = &[
            "base_building_type",
            "building_age",
            "climate_zone",
            "building_standard",
        ];
        let map = self.object("construction_sets", value)?;
        let mut sets = Vec::new();
        for (name, body) in map {
            let path = join("construction_sets", name);
            let Some(body) = self.object(&path, body) else {
                continue;
            };
            let archetype = self.archetype_key(&path, body);
            let attributes = self.open_attributes(&path, body, KEY_FIELDS);
            if let Some(archetype) = archetype {
                sets.push(ConstructionSetDef {
                    name: name.clone(),
                    archetype,
                    attributes,
                });
            }
        }
        Some(sets)
    }

    fn space_types(&mut self, value: &Value) -> Option<Vec<SpaceTypeDef>> {
        const KEY_FIELDS: &[&str] = &[
            "base_space_type",
            "base_building_type",
            "building_age",
            "climate_zone",
            "building_standard",
        ];
        let map = self.object("space_types", value)?;
        let mut types = Vec::new();
        for (name, body) in map {
            let path = join("space_types", name);
            let Some(body) = self.object(&path, body) else {
                continue;
            };
            let base_space_type = self.req_string(&path, body, "base_space_type");
            let archetype = self.archetype_key(&path, body);
            let attributes = self.open_attributes(&path, body, KEY_FIELDS);
            if let (Some(base_space_type), Some(archetype)) = (base_space_type, archetype) {
                types.push(SpaceTypeDef {
                    name: name.clone(),
                    base_space_type,
                    archetype,
                    attributes,
                });
            }
        }
        Some(types)
    }

    fn run_info(&mut self, value: &Value) -> Option<RunInfo> {
        const PATH: &str = "run_info";
        let map = self.object(PATH, value)?;
        let uuid = self.req_string(PATH, map, "uuid");
        let output_location = self.req_string(PATH, map, "output_location");
        let temp_sim_location = self.req_string(PATH, map, "temp_sim_location");
        let simulation_year = self.req_integer(PATH, map, "simulation_year");
        let timestep = self.req_integer(PATH, map, "timestep");
        let extra = self.open_attributes(
            PATH,
            map,
            &[
                "uuid",
                "output_location",
                "temp_sim_location",
                "simulation_year",
                "timestep",
            ],
        );
        Some(RunInfo {
            uuid: uuid?,
            output_location: output_location?,
            temp_sim_location: temp_sim_location?,
            simulation_year: simulation_year?,
            timestep: timestep?,
            extra,
        })
    }

    fn building_info(&mut self, value: &Value) -> Option<BuildingInfo> {
        const PATH: &str = "building_info";
        let map = self.object(PATH, value)?;
        let space_type = self.req_string(PATH, map, "space_type");
        let construction_set = self.req_string(PATH, map, "construction_set");
        let hvac_system = self.req_string(PATH, map, "hvac_system");
        let geometry = self.open_attributes(
            PATH,
            map,
            &["space_type", "construction_set", "hvac_system"],
        );
        Some(BuildingInfo {
            space_type: space_type?,
            construction_set: construction_set?,
            hvac_system: hvac_system?,
            geometry,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn issues(value: Value) -> Vec<ParseIssue> {
        parse_document(&value).unwrap_err().issues
    }

    #[test]
    fn rejects_non_object_root() {
        let found = issues(json!([1, 2]));
        assert_eq!(found.len(), 1);
        assert!(matches!(
            found[0].kind,
            ParseIssueKind::TypeMismatch {
                expected: "object",
                found: "array"
            }
        ));
    }

    #[test]
    fn reports_unknown_and_missing_sections_together() {
        let found = issues(json!({ "geometry": {} }));
        assert!(found.iter().any(|i| matches!(
            &i.kind,
            ParseIssueKind::UnknownSection { name } if name == "geometry"
        )));
        let missing = found
            .iter()
            .filter(|i| matches!(i.kind, ParseIssueKind::MissingField { .. }))
            .count();
        assert_eq!(missing, REQUIRED_SECTIONS.len());
    }

    #[test]
    fn day_profile_keys_must_increase_from_midnight() {
        let mut parser = Parser::default();
        let day = parser.day_profile(
            "d",
            "default_day",
            &json!({ "values": { "06:00": 0, "05:00": 1 } }),
        );
        assert!(day.is_none());
        assert!(parser.issues.iter().any(|i| matches!(
            i.kind,
            ParseIssueKind::TimeKeysNotIncreasing { .. }
        )));
        assert!(parser.issues.iter().any(|i| matches!(
            i.kind,
            ParseIssueKind::DayMustStartAtMidnight { .. }
        )));
    }

    #[test]
    fn day_profile_rejects_end_of_day_key() {
        let mut parser = Parser::default();
        let day = parser.day_profile("d", "x", &json!({ "values": { "00:00": 0, "24:00": 1 } }));
        assert!(day.is_none());
        assert!(matches!(
            parser.issues[0].kind,
            ParseIssueKind::InvalidTimeKey { .. }
        ));
    }

    #[test]
    fn component_attributes_checked_against_catalog() {
        let mut parser = Parser::default();
        let comp = parser.component(
            "hvac_components.fan",
            "fan",
            &json!({
                "idd_object_type": "FanVariableVolume",
                "component_values": {
                    "fan_efficiency": "high",
                    "blade_count": 12,
                    "pressure_rise": 1250.0
                }
            }),
        );
        assert!(comp.is_some());
        assert_eq!(parser.issues.len(), 2);
        assert_eq!(parser.issues[0].path, "hvac_components.fan.component_values.fan_efficiency");
        assert!(matches!(
            parser.issues[1].kind,
            ParseIssueKind::UnknownAttribute { .. }
        ));
    }

    #[test]
    fn dotted_component_names_rejected() {
        let mut parser = Parser::default();
        let table = parser
            .component_table(&json!({
                "pipe.1": { "idd_object_type": "PipeAdiabatic" },
                "terminal": {
                    "idd_object_type": "AirTerminalSingleDuctVAVReheat",
                    "sub_components": {
                        "reheat.coil": { "idd_object_type": "CoilHeatingWater" }
                    }
                }
            }))
            .unwrap();

        assert_eq!(table.len(), 1);
        assert_eq!(table[0].name, "terminal");
        assert!(table[0].sub_components.is_empty());
        let paths: Vec<_> = parser.issues.iter().map(|i| i.path.as_str()).collect();
        assert_eq!(
            paths,
            ["hvac_components.pipe.1", "hvac_components.terminal.sub_components.reheat.coil"]
        );
        assert!(parser.issues.iter().all(|i| matches!(
            i.kind,
            ParseIssueKind::DottedComponentName { .. }
        )));
    }

    #[test]
    fn rule_flags_build_weekday_set() {
        let mut parser = Parser::default();
        let mut days = Vec::new();
        let rule = parser
            .schedule_rule(
                "r",
                "weekend",
                &json!({
                    "apply_saturday": true,
                    "apply_sunday": true,
                    "apply_monday": false,
                    "day_schedule": { "values": { "00:00": 0 } }
                }),
                &mut days,
            )
            .unwrap();
        assert!(parser.issues.is_empty());
        assert_eq!(rule.applies_to, WeekdaySet::WEEKEND);
        assert_eq!(rule.day_schedule, DayRef::Inline(0));
        assert_eq!(days[0].key, "weekend.day_schedule");
    }

    #[test]
    fn measure_value_kind_must_match_target() {
        let mut parser = Parser::default();
        let measures = parser
            .measures(&json!({
                "hvac_equipment": { "fan_efficiency": "0.7", "warp_drive": 1 },
                "lighting": {}
            }))
            .unwrap();
        assert_eq!(measures.len(), 1);
        assert!(measures[0].overrides.is_empty());
        assert_eq!(parser.issues.len(), 3);
    }
}
