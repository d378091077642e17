//! Reference resolution: names in, handles out.
//!
//! Every table is indexed once; each reference field is then looked up
//! exactly, with no defaulting. All misses of a document are collected
//! before returning.

use hc_core::{Id, LoopId};
use hc_schema::{
    AirLoopDef, ConfigDocument, DayRef, HvacSystemDef, PlantLoopDef, ScheduleDef,
};
use tracing::debug;

use crate::builder::ComponentArenaBuilder;
use crate::error::{DanglingReferenceError, ResolveError};
use crate::index::NameIndex;
use crate::skeleton::{
    AirLoopNode, BranchNode, BuildingLinks, ComponentArena, PlantLoopNode, ScheduleLinks,
    Skeleton, SystemNode,
};

/// Resolve every cross-reference of `doc` into a [`Skeleton`].
///
/// Duplicate names and dangling references are reported together.
pub fn resolve(doc: &ConfigDocument) -> Result<Skeleton, Vec<ResolveError>> {
    let mut resolver = Resolver::default();

    let components = resolver.components(doc);
    let systems_index = resolver.table("hvac", doc.hvac.iter().map(|s| s.name.as_str()));
    let schedules_index =
        resolver.table("schedules", doc.schedules.iter().map(|s| s.key.as_str()));
    let construction_index = resolver.table(
        "construction_sets",
        doc.construction_sets.iter().map(|c| c.name.as_str()),
    );
    let space_type_index =
        resolver.table("space_types", doc.space_types.iter().map(|s| s.name.as_str()));

    let mut next_loop = 0_u32;
    let systems: Vec<SystemNode> = doc
        .hvac
        .iter()
        .enumerate()
        .map(|(i, def)| {
            resolver.system(
                Id::from_index(i as u32),
                def,
                &components,
                &schedules_index,
                &mut next_loop,
            )
        })
        .collect();

    let schedules: Vec<ScheduleLinks> = doc
        .schedules
        .iter()
        .enumerate()
        .map(|(i, def)| resolver.schedule(Id::from_index(i as u32), def))
        .collect();

    let building = &doc.building_info;
    let space_type = resolver.lookup(
        &space_type_index,
        "building_info",
        "space_type",
        &building.space_type,
    );
    let construction_set = resolver.lookup(
        &construction_index,
        "building_info",
        "construction_set",
        &building.construction_set,
    );
    let hvac_system = resolver.lookup(
        &systems_index,
        "building_info",
        "hvac_system",
        &building.hvac_system,
    );

    if !resolver.errors.is_empty() {
        debug!(count = resolver.errors.len(), "reference resolution failed");
        return Err(resolver.errors);
    }

    match (space_type, construction_set, hvac_system) {
        (Some(space_type), Some(construction_set), Some(hvac_system)) => {
            debug!(
                components = components.len(),
                systems = systems.len(),
                schedules = schedules.len(),
                "references resolved"
            );
            Ok(Skeleton {
                components,
                systems,
                schedules,
                building: BuildingLinks {
                    space_type,
                    construction_set,
                    hvac_system,
                },
            })
        }
        // Every miss above pushed an error.
        _ => Err(resolver.errors),
    }
}

#[derive(Default)]
struct Resolver {
    errors: Vec<ResolveError>,
}

impl Resolver {
    fn components(&mut self, doc: &ConfigDocument) -> ComponentArena {
        let mut builder = ComponentArenaBuilder::new();
        for def in &doc.components {
            if let Err(err) = builder.add_component(def) {
                self.errors.push(err);
            }
        }
        builder.build()
    }

    fn table<'a>(&mut self, scope: &str, names: impl IntoIterator<Item = &'a str>) -> NameIndex {
        let (index, duplicates) = NameIndex::from_names(names);
        self.errors
            .extend(duplicates.into_iter().map(|name| ResolveError::DuplicateName {
                scope: scope.to_string(),
                name,
            }));
        index
    }

    fn dangling(&mut self, entity: &str, field: &str, missing: &str) {
        self.errors.push(
            DanglingReferenceError {
                referencing_entity: entity.to_string(),
                field: field.to_string(),
                missing_name: missing.to_string(),
            }
            .into(),
        );
    }

    fn lookup(&mut self, index: &NameIndex, entity: &str, field: &str, name: &str) -> Option<Id> {
        let found = index.get(name);
        if found.is_none() {
            self.dangling(entity, field, name);
        }
        found
    }

    /// Resolve a list of component references, dropping (and recording) misses.
    fn component_list(
        &mut self,
        arena: &ComponentArena,
        entity: &str,
        field: &str,
        names: &[String],
    ) -> Vec<Id> {
        names
            .iter()
            .filter_map(|name| {
                let found = arena.resolve_reference(name);
                if found.is_none() {
                    self.dangling(entity, field, name);
                }
                found
            })
            .collect()
    }

    fn system(
        &mut self,
        id: Id,
        def: &HvacSystemDef,
        arena: &ComponentArena,
        schedules: &NameIndex,
        next_loop: &mut u32,
    ) -> SystemNode {
        let entity = format!("hvac system '{}'", def.name);
        let availability_schedule = def
            .availability_schedule
            .as_deref()
            .and_then(|name| self.lookup(schedules, &entity, "availability_schedule", name));

        let air_loops = def
            .air_loops
            .iter()
            .map(|air| {
                let id = take_loop_id(next_loop);
                self.air_loop(id, air, def, arena)
            })
            .collect();
        let plant_loops = def
            .plant_loops
            .iter()
            .map(|plant| {
                let id = take_loop_id(next_loop);
                self.plant_loop(id, plant, arena)
            })
            .collect();

        SystemNode {
            id,
            name: def.name.clone(),
            air_loops,
            plant_loops,
            availability_schedule,
            attributes: def.attributes.clone(),
        }
    }

    fn air_loop(
        &mut self,
        id: LoopId,
        def: &AirLoopDef,
        system: &HvacSystemDef,
        arena: &ComponentArena,
    ) -> AirLoopNode {
        let entity = format!("air loop '{}'", def.name);
        let supply =
            self.component_list(arena, &entity, "supply_components.outlet_node", &def.supply);
        let demand_branches = def
            .demand_branches
            .iter()
            .map(|branch| {
                let field = format!("demand_components.branches.{}", branch.name);
                BranchNode {
                    name: branch.name.clone(),
                    components: self.component_list(arena, &entity, &field, &branch.components),
                }
            })
            .collect();

        AirLoopNode {
            id,
            name: def.name.clone(),
            supply,
            demand_branches,
            attributes: system.attributes.clone(),
        }
    }

    fn plant_loop(
        &mut self,
        id: LoopId,
        def: &PlantLoopDef,
        arena: &ComponentArena,
    ) -> PlantLoopNode {
        let entity = format!("plant loop '{}'", def.name);
        PlantLoopNode {
            id,
            name: def.name.clone(),
            kind: def.kind,
            inlet_node: self.component_list(
                arena,
                &entity,
                "supply_components.inlet_node",
                &def.inlet_node,
            ),
            supply_branches: self.component_list(
                arena,
                &entity,
                "supply_components.branches",
                &def.supply_branches,
            ),
            demand_branches: self.component_list(
                arena,
                &entity,
                "demand_components.branches",
                &def.demand_branches,
            ),
        }
    }

    fn schedule(&mut self, id: Id, def: &ScheduleDef) -> ScheduleLinks {
        let rule_days = def
            .rules
            .iter()
            .filter_map(|rule| match &rule.day_schedule {
                DayRef::Inline(index) => Some(*index),
                DayRef::Named(key) => {
                    let found = def.day_by_key(key);
                    if found.is_none() {
                        let entity = format!("schedule '{}' rule '{}'", def.key, rule.key);
                        self.dangling(&entity, "day_schedule", key);
                    }
                    found
                }
            })
            .collect();

        ScheduleLinks {
            id,
            key: def.key.clone(),
            rule_days,
        }
    }
}

fn take_loop_id(next: &mut u32) -> LoopId {
    let id = LoopId::from_index(*next);
    *next += 1;
    id
}

#[cfg(test)]
mod tests {
    use super::*;
    use hc_schema::{
        ArchetypeKey, AttrValue, BranchDef, BuildingInfo, ComponentDef, ConstructionSetDef, DayProfileDef,
        LoopKind, ObjectType, RunInfo, ScheduleRuleDef, SpaceTypeDef, WeekdaySet,
    };

    fn comp(name: &str, ty: ObjectType) -> ComponentDef {
        ComponentDef {
            name: name.to_string(),
            object_type: ty,
            attributes: Default::default(),
            sub_components: vec![],
        }
    }

    fn archetype() -> ArchetypeKey {
        ArchetypeKey {
            base_building_type: "Large_Office".to_string(),
            building_age: 2004,
            climate_zone: "5A".to_string(),
            building_standard: "ASHRAE 90.1-2004".to_string(),
        }
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn document() -> ConfigDocument {
        let mut terminal = comp("terminal", ObjectType::AirTerminalSingleDuctVAVReheat);
        terminal
            .sub_components
            .push(comp("reheat_coil", ObjectType::CoilHeatingWater));

        ConfigDocument {
            measures: vec![],
            hvac: vec![HvacSystemDef {
                name: "hvac_system".to_string(),
                air_loops: vec![AirLoopDef {
                    name: "air".to_string(),
                    supply: names(&["fan"]),
                    demand_branches: vec![BranchDef {
                        name: "b1".to_string(),
                        components: names(&["terminal"]),
                    }],
                }],
                plant_loops: vec![PlantLoopDef {
                    name: "hw".to_string(),
                    kind: LoopKind::HotWater,
                    inlet_node: names(&["pump"]),
                    supply_branches: names(&["boiler"]),
                    demand_branches: names(&["terminal.reheat_coil"]),
                }],
                availability_schedule: Some("ops".to_string()),
                attributes: [("has_dcv".to_string(), AttrValue::Bool(true))]
                    .into_iter()
                    .collect(),
            }],
            components: vec![
                comp("fan", ObjectType::FanVariableVolume),
                terminal,
                comp("pump", ObjectType::PumpVariableSpeed),
                comp("boiler", ObjectType::BoilerHotWater),
            ],
            schedules: vec![ScheduleDef {
                key: "ops".to_string(),
                name: "ops".to_string(),
                days: vec![DayProfileDef {
                    key: "default_day".to_string(),
                    name: "default".to_string(),
                    values: vec![(hc_core::TimeOfDay::MIDNIGHT, 1.0)],
                }],
                default_day: Some(0),
                summer_design_day: None,
                winter_design_day: None,
                rules: vec![ScheduleRuleDef {
                    key: "weekend".to_string(),
                    name: "weekend".to_string(),
                    applies_to: WeekdaySet::WEEKEND,
                    day_schedule: DayRef::Named("default_day".to_string()),
                }],
            }],
            construction_sets: vec![ConstructionSetDef {
                name: "cs".to_string(),
                archetype: archetype(),
                attributes: Default::default(),
            }],
            space_types: vec![SpaceTypeDef {
                name: "st".to_string(),
                base_space_type: "LargeOffice".to_string(),
                archetype: archetype(),
                attributes: Default::default(),
            }],
            run_info: RunInfo {
                uuid: "run".to_string(),
                output_location: "/tmp/out".to_string(),
                temp_sim_location: "/tmp/out/temp".to_string(),
                simulation_year: 2014,
                timestep: 6,
                extra: Default::default(),
            },
            building_info: BuildingInfo {
                space_type: "st".to_string(),
                construction_set: "cs".to_string(),
                hvac_system: "hvac_system".to_string(),
                geometry: Default::default(),
            },
        }
    }

    #[test]
    fn resolves_all_references() {
        let skeleton = resolve(&document()).unwrap();

        let system = &skeleton.systems[0];
        assert_eq!(system.availability_schedule.map(Id::index), Some(0));

        let air = &system.air_loops[0];
        assert_eq!(skeleton.components[air.supply[0]].name, "fan");
        assert_eq!(air.attributes.get("has_dcv"), Some(&AttrValue::Bool(true)));

        let plant = &system.plant_loops[0];
        assert_eq!(skeleton.components[plant.demand_branches[0]].path, "terminal.reheat_coil");
        assert_ne!(air.id, plant.id);

        assert_eq!(skeleton.schedules[0].rule_days, vec![0]);
        assert_eq!(skeleton.building.hvac_system, system.id);
    }

    #[test]
    fn missing_branch_component_names_exact_name() {
        let mut doc = document();
        doc.hvac[0].air_loops[0].demand_branches[0].components = names(&["terminal_missing"]);

        let errors = resolve(&doc).unwrap_err();
        assert_eq!(
            errors,
            vec![ResolveError::Dangling(DanglingReferenceError {
                referencing_entity: "air loop 'air'".to_string(),
                field: "demand_components.branches.b1".to_string(),
                missing_name: "terminal_missing".to_string(),
            })]
        );
    }

    #[test]
    fn named_rule_day_cannot_borrow_inline_day() {
        let mut doc = document();
        let schedule = &mut doc.schedules[0];
        schedule.days.push(DayProfileDef {
            key: "weekend.day_schedule".to_string(),
            name: "weekend".to_string(),
            values: vec![(hc_core::TimeOfDay::MIDNIGHT, 0.0)],
        });
        schedule.rules[0].day_schedule = DayRef::Inline(1);
        schedule.rules.push(ScheduleRuleDef {
            key: "holiday".to_string(),
            name: "holiday".to_string(),
            applies_to: WeekdaySet::empty(),
            day_schedule: DayRef::Named("weekend.day_schedule".to_string()),
        });

        let errors = resolve(&doc).unwrap_err();
        assert_eq!(
            errors,
            vec![ResolveError::Dangling(DanglingReferenceError {
                referencing_entity: "schedule 'ops' rule 'holiday'".to_string(),
                field: "day_schedule".to_string(),
                missing_name: "weekend.day_schedule".to_string(),
            })]
        );
    }

    #[test]
    fn bare_sub_component_name_is_not_global() {
        let mut doc = document();
        doc.hvac[0].plant_loops[0].demand_branches = names(&["reheat_coil"]);

        let errors = resolve(&doc).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].to_string().contains("'reheat_coil'"));
    }

    #[test]
    fn all_dangling_references_reported_together() {
        let mut doc = document();
        doc.hvac[0].availability_schedule = Some("nope".to_string());
        doc.hvac[0].plant_loops[0].inlet_node = names(&["pump_x"]);
        doc.building_info.space_type = "unknown_space".to_string();
        doc.schedules[0].rules[0].day_schedule = DayRef::Named("holiday".to_string());

        let errors = resolve(&doc).unwrap_err();
        let missing: Vec<_> = errors
            .iter()
            .map(|e| match e {
                ResolveError::Dangling(d) => d.missing_name.as_str(),
                ResolveError::DuplicateName { name, .. } => name.as_str(),
            })
            .collect();
        assert_eq!(missing, vec!["nope", "pump_x", "holiday", "unknown_space"]);
    }

    #[test]
    fn duplicate_component_names_rejected() {
        let mut doc = document();
        doc.components.push(comp("fan", ObjectType::FanConstantVolume));

        let errors = resolve(&doc).unwrap_err();
        assert!(matches!(
            &errors[0],
            ResolveError::DuplicateName { name, .. } if name == "fan"
        ));
    }
}
