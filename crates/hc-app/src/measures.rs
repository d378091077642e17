//! Measure application.
//!
//! Measures are attribute override bundles. Each key maps through the
//! catalog's targeting table to an attribute on air loops or on equipment of
//! given classes. Stages apply in order on a clone of the validated skeleton;
//! a later stage overwrites an earlier one.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use hc_core::ComponentId;
use hc_schema::{AttrValue, MeasureCategory, MeasureDef, MeasureScope, measure_target};
use hc_topology::Skeleton;
use tracing::debug;

/// Two measures of one stage writing different values to the same attribute.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[error(
    "{entity}: '{attribute}' set to {first} by {first_source} and to {second} by {second_source} in stage {stage}"
)]
pub struct MeasureConflictError {
    pub stage: usize,
    pub entity: String,
    pub attribute: String,
    pub first: AttrValue,
    pub first_source: String,
    pub second: AttrValue,
    pub second_source: String,
}

/// Entity an override lands on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Target {
    AirLoop { system: usize, index: usize },
    Component(ComponentId),
}

struct Write {
    value: AttrValue,
    source: String,
}

/// Result of a successful measure application.
#[derive(Debug, Clone)]
pub struct AppliedMeasures {
    pub skeleton: Skeleton,
    /// Number of attribute writes, counting overwrites by later stages.
    pub writes: usize,
    /// Categories present in the document but in no stage.
    pub unstaged: Vec<MeasureCategory>,
}

/// Apply `measures` to a copy of `skeleton`, stage by stage.
pub fn apply_measures(
    skeleton: &Skeleton,
    measures: &[MeasureDef],
    stages: &[Vec<MeasureCategory>],
) -> Result<AppliedMeasures, Vec<MeasureConflictError>> {
    let mut conflicts = Vec::new();
    let mut staged_writes = Vec::with_capacity(stages.len());

    for (stage, categories) in stages.iter().enumerate() {
        let writes = collect_stage(skeleton, measures, stage, categories, &mut conflicts);
        debug!(stage, writes = writes.len(), "measure stage planned");
        staged_writes.push(writes);
    }

    if !conflicts.is_empty() {
        return Err(conflicts);
    }

    let mut applied = skeleton.clone();
    let mut count = 0;
    for writes in staged_writes {
        for ((target, attribute), write) in writes {
            let attributes = match target {
                Target::AirLoop { system, index } => {
                    &mut applied.systems[system].air_loops[index].attributes
                }
                Target::Component(id) => match applied.components.get_mut(id) {
                    Some(node) => &mut node.attributes,
                    None => continue,
                },
            };
            attributes.insert(attribute.to_string(), write.value);
            count += 1;
        }
    }

    let mut unstaged: Vec<MeasureCategory> = measures
        .iter()
        .map(|m| m.category)
        .filter(|c| !stages.iter().any(|stage| stage.contains(c)))
        .collect();
    unstaged.dedup();

    Ok(AppliedMeasures {
        skeleton: applied,
        writes: count,
        unstaged,
    })
}

fn collect_stage(
    skeleton: &Skeleton,
    measures: &[MeasureDef],
    stage: usize,
    categories: &[MeasureCategory],
    conflicts: &mut Vec<MeasureConflictError>,
) -> BTreeMap<(Target, &'static str), Write> {
    let mut writes: BTreeMap<(Target, &'static str), Write> = BTreeMap::new();

    for measure in measures.iter().filter(|m| categories.contains(&m.category)) {
        for (key, value) in &measure.overrides {
            // Keys were checked against the targeting table while parsing.
            let Some(target) = measure_target(measure.category, key) else {
                continue;
            };
            let source = format!("{}.{}", measure.category, key);

            for entity in targets(skeleton, target.scope, target.attribute) {
                match writes.entry((entity, target.attribute)) {
                    Entry::Vacant(slot) => {
                        slot.insert(Write {
                            value: value.clone(),
                            source: source.clone(),
                        });
                    }
                    Entry::Occupied(existing) if existing.get().value != *value => {
                        conflicts.push(MeasureConflictError {
                            stage,
                            entity: entity_name(skeleton, entity),
                            attribute: target.attribute.to_string(),
                            first: existing.get().value.clone(),
                            first_source: existing.get().source.clone(),
                            second: value.clone(),
                            second_source: source.clone(),
                        });
                    }
                    Entry::Occupied(_) => {}
                }
            }
        }
    }

    writes
}

fn targets(skeleton: &Skeleton, scope: MeasureScope, attribute: &str) -> Vec<Target> {
    match scope {
        MeasureScope::AirLoop => skeleton
            .systems
            .iter()
            .enumerate()
            .flat_map(|(system, s)| {
                (0..s.air_loops.len()).map(move |index| Target::AirLoop { system, index })
            })
            .collect(),
        MeasureScope::Equipment(classes) => skeleton
            .components
            .iter()
            .filter(|node| {
                classes.contains(&node.object_type.class())
                    && node.object_type.attribute(attribute).is_some()
            })
            .map(|node| Target::Component(node.id))
            .collect(),
    }
}

fn entity_name(skeleton: &Skeleton, target: Target) -> String {
    match target {
        Target::AirLoop { system, index } => {
            format!("air loop '{}'", skeleton.systems[system].air_loops[index].name)
        }
        Target::Component(id) => format!("component '{}'", skeleton.components[id].path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hc_core::Id;
    use hc_schema::{Attributes, ComponentDef, ObjectType};
    use hc_topology::{AirLoopNode, BuildingLinks, ComponentArenaBuilder, SystemNode};

    fn skeleton() -> Skeleton {
        let mut builder = ComponentArenaBuilder::new();
        for (name, ty) in [
            ("fan_vav", ObjectType::FanVariableVolume),
            ("pump_var", ObjectType::PumpVariableSpeed),
            ("coil_cooling_water", ObjectType::CoilCoolingWater),
        ] {
            builder
                .add_component(&ComponentDef {
                    name: name.to_string(),
                    object_type: ty,
                    attributes: Default::default(),
                    sub_components: vec![],
                })
                .unwrap();
        }
        let components = builder.build();

        Skeleton {
            components,
            systems: vec![SystemNode {
                id: Id::from_index(0),
                name: "hvac_system".to_string(),
                air_loops: vec![AirLoopNode {
                    id: Id::from_index(0),
                    name: "vav".to_string(),
                    supply: vec![Id::from_index(0)],
                    demand_branches: vec![],
                    attributes: Default::default(),
                }],
                plant_loops: vec![],
                availability_schedule: None,
                attributes: Default::default(),
            }],
            schedules: vec![],
            building: BuildingLinks {
                space_type: Id::from_index(0),
                construction_set: Id::from_index(0),
                hvac_system: Id::from_index(0),
            },
        }
    }

    fn measure(category: MeasureCategory, overrides: &[(&str, AttrValue)]) -> MeasureDef {
        MeasureDef {
            category,
            overrides: overrides
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect::<Attributes>(),
        }
    }

    fn default_stages() -> Vec<Vec<MeasureCategory>> {
        vec![
            vec![MeasureCategory::HvacControls],
            vec![MeasureCategory::HvacEquipment],
        ]
    }

    #[test]
    fn fan_efficiency_touches_fans_only() {
        let base = skeleton();
        let measures = [measure(
            MeasureCategory::HvacEquipment,
            &[("fan_efficiency", AttrValue::Number(0.7))],
        )];
        let applied = apply_measures(&base, &measures, &default_stages()).unwrap();

        let components = &applied.skeleton.components;
        let fan = components.resolve_reference("fan_vav").unwrap();
        assert_eq!(
            components[fan].attributes.get("fan_efficiency"),
            Some(&AttrValue::Number(0.7))
        );
        for name in ["pump_var", "coil_cooling_water"] {
            let id = components.resolve_reference(name).unwrap();
            assert_eq!(components[id], base.components[id]);
        }
        assert_eq!(applied.writes, 1);
        assert!(base.components[fan].attributes.is_empty());
    }

    #[test]
    fn later_stage_wins() {
        let measures = [
            measure(MeasureCategory::HvacControls, &[("has_dcv", AttrValue::Bool(false))]),
            measure(MeasureCategory::HvacEquipment, &[("has_dcv", AttrValue::Bool(true))]),
        ];
        let applied = apply_measures(&skeleton(), &measures, &default_stages()).unwrap();
        let air = &applied.skeleton.systems[0].air_loops[0];
        assert_eq!(air.attributes.get("has_dcv"), Some(&AttrValue::Bool(true)));

        let reversed = vec![
            vec![MeasureCategory::HvacEquipment],
            vec![MeasureCategory::HvacControls],
        ];
        let applied = apply_measures(&skeleton(), &measures, &reversed).unwrap();
        let air = &applied.skeleton.systems[0].air_loops[0];
        assert_eq!(air.attributes.get("has_dcv"), Some(&AttrValue::Bool(false)));
    }

    #[test]
    fn same_stage_disagreement_conflicts() {
        let measures = [
            measure(MeasureCategory::HvacControls, &[("night_cycle", "CycleOnAny".into())]),
            measure(MeasureCategory::HvacEquipment, &[("night_cycle", "StayOff".into())]),
        ];
        let stages = vec![vec![
            MeasureCategory::HvacControls,
            MeasureCategory::HvacEquipment,
        ]];
        let conflicts = apply_measures(&skeleton(), &measures, &stages).unwrap_err();

        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].entity, "air loop 'vav'");
        assert_eq!(conflicts[0].attribute, "night_cycle");
        assert_eq!(conflicts[0].first_source, "hvac_controls.night_cycle");
    }

    #[test]
    fn same_stage_agreement_is_fine() {
        let measures = [
            measure(MeasureCategory::HvacControls, &[("has_dcv", AttrValue::Bool(true))]),
            measure(MeasureCategory::HvacEquipment, &[("has_dcv", AttrValue::Bool(true))]),
        ];
        let stages = vec![vec![
            MeasureCategory::HvacControls,
            MeasureCategory::HvacEquipment,
        ]];
        assert!(apply_measures(&skeleton(), &measures, &stages).is_ok());
    }

    #[test]
    fn unstaged_category_is_skipped() {
        let measures = [measure(
            MeasureCategory::HvacEquipment,
            &[("fan_efficiency", AttrValue::Number(0.5))],
        )];
        let stages = vec![vec![MeasureCategory::HvacControls]];
        let applied = apply_measures(&skeleton(), &measures, &stages).unwrap();

        assert_eq!(applied.unstaged, vec![MeasureCategory::HvacEquipment]);
        assert_eq!(applied.writes, 0);
        assert_eq!(applied.skeleton, skeleton());
    }
}
