//! Loop topology validation.
//!
//! Supply and demand sides are checked as separate subgraphs; connectivity
//! between them is left to the simulator, only type compatibility is asserted.

use hc_core::ComponentId;
use hc_schema::EquipmentClass;
use rayon::prelude::*;
use tracing::debug;

use crate::error::{TopologyError, ViolationKind};
use crate::skeleton::{AirLoopNode, ComponentArena, PlantLoopNode, Skeleton};

enum LoopRef<'a> {
    Air(&'a AirLoopNode),
    Plant(&'a PlantLoopNode),
}

/// Validate every air and plant loop of the skeleton.
///
/// Loops are checked in parallel; violations come back in declaration order.
pub fn validate_topology(skeleton: &Skeleton) -> Result<(), Vec<TopologyError>> {
    let loops: Vec<LoopRef<'_>> = skeleton
        .systems
        .iter()
        .flat_map(|system| {
            system
                .air_loops
                .iter()
                .map(LoopRef::Air)
                .chain(system.plant_loops.iter().map(LoopRef::Plant))
        })
        .collect();

    let per_loop: Vec<Vec<TopologyError>> = loops
        .par_iter()
        .map(|lp| match lp {
            LoopRef::Air(air) => check_air_loop(&skeleton.components, air),
            LoopRef::Plant(plant) => check_plant_loop(&skeleton.components, plant),
        })
        .collect();

    let errors: Vec<TopologyError> = per_loop.into_iter().flatten().collect();
    debug!(loops = loops.len(), violations = errors.len(), "topology checked");
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_air_loop(arena: &ComponentArena, air: &AirLoopNode) -> Vec<TopologyError> {
    let mut violations = Vec::new();

    if air.supply.is_empty() {
        violations.push(ViolationKind::EmptySupplyPath);
    } else {
        let mut fans = 0;
        for (position, &id) in air.supply.iter().enumerate() {
            let node = &arena[id];
            let class = node.object_type.class();
            match class {
                EquipmentClass::Fan => fans += 1,
                EquipmentClass::OutdoorAirSystem if position > 0 => {
                    violations.push(ViolationKind::OutdoorAirSystemNotFirst {
                        component: node.path.clone(),
                    });
                }
                _ if !class.is_air_supply() => {
                    violations.push(ViolationKind::NotAirSupplyEquipment {
                        component: node.path.clone(),
                        class,
                    });
                }
                _ => {}
            }
        }
        if fans != 1 {
            violations.push(ViolationKind::AirMoverCount { found: fans });
        } else if let Some(&outlet) = air.supply.last() {
            // The single fan is the outlet feeding the demand split
            let node = &arena[outlet];
            if node.object_type.class() != EquipmentClass::Fan {
                violations.push(ViolationKind::OutletNotFan {
                    component: node.path.clone(),
                });
            }
        }
    }

    if air.demand_branches.is_empty() {
        violations.push(ViolationKind::NoDemandBranches);
    }
    for branch in &air.demand_branches {
        if branch.components.is_empty() {
            violations.push(ViolationKind::EmptyBranch {
                branch: branch.name.clone(),
            });
        }
        for &id in &branch.components {
            let node = &arena[id];
            let class = node.object_type.class();
            if class != EquipmentClass::Terminal {
                violations.push(ViolationKind::NonTerminalOnBranch {
                    branch: branch.name.clone(),
                    component: node.path.clone(),
                    class,
                });
            }
        }
    }

    tag(&air.name, violations)
}

fn check_plant_loop(arena: &ComponentArena, plant: &PlantLoopNode) -> Vec<TopologyError> {
    let mut violations = Vec::new();
    let kind = plant.kind;

    // Supply inlet: a single pump
    match plant.inlet_node.as_slice() {
        [] => violations.push(ViolationKind::MissingInletNode),
        [id] => {
            let node = &arena[*id];
            let class = node.object_type.class();
            if class != EquipmentClass::Pump {
                violations.push(ViolationKind::InletNodeNotPump {
                    component: node.path.clone(),
                    class,
                });
            }
        }
        many => violations.push(ViolationKind::InletNodeCount { found: many.len() }),
    }

    // Supply branches: one matching source, pipes otherwise
    let mut sources = 0;
    for &id in &plant.supply_branches {
        let node = &arena[id];
        let class = node.object_type.class();
        if class.is_source() {
            if node.object_type.is_source_for(kind) {
                sources += 1;
            } else {
                violations.push(ViolationKind::SourceKindMismatch {
                    component: node.path.clone(),
                    object_type: node.object_type,
                    expected: kind,
                });
            }
        } else if class != EquipmentClass::Pipe {
            violations.push(ViolationKind::UnexpectedSupplyComponent {
                component: node.path.clone(),
                class,
            });
        }
    }
    if sources != 1 {
        violations.push(ViolationKind::SourceCount {
            kind,
            found: sources,
        });
    }

    // Demand side: catalog consumers of this loop kind
    if plant.demand_branches.is_empty() {
        violations.push(ViolationKind::EmptyDemand);
    }
    violations.extend(consumer_violations(arena, &plant.demand_branches, plant));

    tag(&plant.name, violations)
}

fn consumer_violations<'a>(
    arena: &'a ComponentArena,
    demand: &'a [ComponentId],
    plant: &'a PlantLoopNode,
) -> impl Iterator<Item = ViolationKind> + 'a {
    demand.iter().filter_map(move |&id| {
        let node = &arena[id];
        (!node.object_type.is_consumer_of(plant.kind)).then(|| ViolationKind::InvalidConsumer {
            component: node.path.clone(),
            object_type: node.object_type,
            kind: plant.kind,
        })
    })
}

fn tag(loop_name: &str, violations: Vec<ViolationKind>) -> Vec<TopologyError> {
    violations
        .into_iter()
        .map(|violation| TopologyError {
            loop_name: loop_name.to_string(),
            violation,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::ComponentArenaBuilder;
    use crate::skeleton::{BranchNode, BuildingLinks, SystemNode};
    use hc_core::Id;
    use hc_schema::{ComponentDef, LoopKind, ObjectType};

    fn arena(components: &[(&str, ObjectType)]) -> ComponentArena {
        let mut builder = ComponentArenaBuilder::new();
        for (name, ty) in components {
            builder
                .add_component(&ComponentDef {
                    name: name.to_string(),
                    object_type: *ty,
                    attributes: Default::default(),
                    sub_components: vec![],
                })
                .unwrap();
        }
        builder.build()
    }

    fn ids(arena: &ComponentArena, names: &[&str]) -> Vec<ComponentId> {
        names
            .iter()
            .map(|n| arena.resolve_reference(n).unwrap())
            .collect()
    }

    fn plant(
        arena: &ComponentArena,
        kind: LoopKind,
        inlet: &[&str],
        supply: &[&str],
        demand: &[&str],
    ) -> PlantLoopNode {
        PlantLoopNode {
            id: Id::from_index(0),
            name: "plant".to_string(),
            kind,
            inlet_node: ids(arena, inlet),
            supply_branches: ids(arena, supply),
            demand_branches: ids(arena, demand),
        }
    }

    fn plant_components() -> ComponentArena {
        arena(&[
            ("pump", ObjectType::PumpVariableSpeed),
            ("boiler", ObjectType::BoilerHotWater),
            ("chiller", ObjectType::ChillerElectricEIR),
            ("pipe", ObjectType::PipeAdiabatic),
            ("cc", ObjectType::CoilCoolingWater),
            ("hc", ObjectType::CoilHeatingWater),
        ])
    }

    #[test]
    fn chilled_water_with_chiller_passes() {
        let arena = plant_components();
        let lp = plant(&arena, LoopKind::ChilledWater, &["pump"], &["chiller", "pipe"], &["cc"]);
        assert!(check_plant_loop(&arena, &lp).is_empty());
    }

    #[test]
    fn chilled_water_with_boiler_fails() {
        let arena = plant_components();
        let lp = plant(&arena, LoopKind::ChilledWater, &["pump"], &["boiler", "pipe"], &["cc"]);
        let errors = check_plant_loop(&arena, &lp);

        assert!(errors.iter().all(|e| e.loop_name == "plant"));
        assert!(errors.iter().any(|e| matches!(
            &e.violation,
            ViolationKind::SourceKindMismatch { component, .. } if component == "boiler"
        )));
        assert!(errors.iter().any(|e| matches!(
            e.violation,
            ViolationKind::SourceCount { found: 0, .. }
        )));
    }

    #[test]
    fn missing_inlet_node_names_loop() {
        let arena = plant_components();
        let lp = plant(&arena, LoopKind::HotWater, &[], &["boiler"], &["hc"]);
        let errors = check_plant_loop(&arena, &lp);
        assert_eq!(
            errors,
            vec![TopologyError {
                loop_name: "plant".to_string(),
                violation: ViolationKind::MissingInletNode,
            }]
        );
    }

    #[test]
    fn wrong_consumer_and_inlet_reported_together() {
        let arena = plant_components();
        let lp = plant(&arena, LoopKind::HotWater, &["pipe"], &["boiler"], &["cc", "hc"]);
        let kinds: Vec<_> = check_plant_loop(&arena, &lp)
            .into_iter()
            .map(|e| e.violation)
            .collect();
        assert_eq!(kinds.len(), 2);
        assert!(matches!(kinds[0], ViolationKind::InletNodeNotPump { .. }));
        assert!(matches!(
            &kinds[1],
            ViolationKind::InvalidConsumer { component, .. } if component == "cc"
        ));
    }

    fn air_components() -> ComponentArena {
        arena(&[
            ("oa", ObjectType::AirLoopHVACOutdoorAirSystem),
            ("cc", ObjectType::CoilCoolingWater),
            ("fan", ObjectType::FanVariableVolume),
            ("fan2", ObjectType::FanConstantVolume),
            ("term", ObjectType::AirTerminalSingleDuctVAVReheat),
            ("pump", ObjectType::PumpVariableSpeed),
        ])
    }

    fn air(arena: &ComponentArena, supply: &[&str], branches: &[(&str, &[&str])]) -> AirLoopNode {
        AirLoopNode {
            id: Id::from_index(0),
            name: "air".to_string(),
            supply: ids(arena, supply),
            demand_branches: branches
                .iter()
                .map(|(name, comps)| BranchNode {
                    name: name.to_string(),
                    components: ids(arena, comps),
                })
                .collect(),
            attributes: Default::default(),
        }
    }

    #[test]
    fn well_formed_air_loop_passes() {
        let arena = air_components();
        let lp = air(&arena, &["oa", "cc", "fan"], &[("zone", &["term"])]);
        assert!(check_air_loop(&arena, &lp).is_empty());
    }

    #[test]
    fn fan_must_be_supply_outlet() {
        let arena = air_components();
        let lp = air(&arena, &["oa", "fan", "cc"], &[("zone", &["term"])]);
        let errors = check_air_loop(&arena, &lp);
        assert_eq!(
            errors,
            vec![TopologyError {
                loop_name: "air".to_string(),
                violation: ViolationKind::OutletNotFan {
                    component: "cc".to_string()
                },
            }]
        );
    }

    #[test]
    fn air_loop_structure_violations() {
        let arena = air_components();
        let lp = air(
            &arena,
            &["cc", "oa", "fan", "fan2", "pump"],
            &[("zone", &["cc"]), ("empty", &[])],
        );
        let kinds: Vec<_> = check_air_loop(&arena, &lp)
            .into_iter()
            .map(|e| e.violation)
            .collect();

        assert!(matches!(kinds[0], ViolationKind::OutdoorAirSystemNotFirst { .. }));
        assert!(matches!(kinds[1], ViolationKind::NotAirSupplyEquipment { .. }));
        assert_eq!(kinds[2], ViolationKind::AirMoverCount { found: 2 });
        assert!(matches!(kinds[3], ViolationKind::NonTerminalOnBranch { .. }));
        assert_eq!(
            kinds[4],
            ViolationKind::EmptyBranch {
                branch: "empty".to_string()
            }
        );
    }

    #[test]
    fn validate_reports_in_declaration_order() {
        let components = plant_components();
        let bad_cw = plant(&components, LoopKind::ChilledWater, &["pump"], &["boiler"], &["cc"]);
        let mut bad_hw = plant(&components, LoopKind::HotWater, &[], &["boiler"], &["hc"]);
        bad_hw.name = "hw".to_string();

        let skeleton = Skeleton {
            components,
            systems: vec![SystemNode {
                id: Id::from_index(0),
                name: "sys".to_string(),
                air_loops: vec![],
                plant_loops: vec![bad_cw, bad_hw],
                availability_schedule: None,
                attributes: Default::default(),
            }],
            schedules: vec![],
            building: BuildingLinks {
                space_type: Id::from_index(0),
                construction_set: Id::from_index(0),
                hvac_system: Id::from_index(0),
            },
        };

        let errors = validate_topology(&skeleton).unwrap_err();
        let names: Vec<_> = errors.iter().map(|e| e.loop_name.as_str()).collect();
        assert_eq!(names, vec!["plant", "plant", "hw"]);
    }
}
