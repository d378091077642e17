use std::path::Path;

use chrono::Weekday;
use hc_schema::*;

fn fixture_path() -> std::path::PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../fixtures/ashrae_system07.yaml")
}

#[test]
fn system07_fixture_loads() {
    let doc = load_yaml(&fixture_path()).unwrap_or_else(|e| panic!("Failed to load fixture: {e}"));

    assert_eq!(doc.measures.len(), 2);
    assert_eq!(doc.measures[0].category, MeasureCategory::HvacControls);
    assert_eq!(doc.hvac.len(), 1);

    let system = &doc.hvac[0];
    assert_eq!(system.name, "hvac_system");
    assert_eq!(system.availability_schedule.as_deref(), Some("hvac_operation"));
    assert_eq!(system.air_loops.len(), 1);
    assert_eq!(
        system.air_loops[0].supply,
        ["oa_system", "coil_cooling_water", "coil_heating_water", "fan_vav"]
    );
    assert_eq!(system.air_loops[0].demand_branches[0].name, "default_air_terminal");
    assert_eq!(
        system.air_loops[0].demand_branches[0].components,
        ["terminal_vav_reheat"]
    );

    let kinds: Vec<LoopKind> = system.plant_loops.iter().map(|l| l.kind).collect();
    assert_eq!(
        kinds,
        [
            LoopKind::HotWater,
            LoopKind::ChilledWater,
            LoopKind::CondenserWater
        ]
    );

    assert_eq!(doc.components.len(), 14);
    let terminal = doc
        .components
        .iter()
        .find(|c| c.name == "terminal_vav_reheat")
        .expect("terminal present");
    assert_eq!(terminal.sub_components[0].name, "reheat_coil");
    assert_eq!(
        terminal.sub_components[0].object_type,
        ObjectType::CoilHeatingWater
    );

    let fan = doc.components.iter().find(|c| c.name == "fan_vav").unwrap();
    assert_eq!(fan.attributes["fan_efficiency"], AttrValue::Number(0.7));
}

#[test]
fn system07_schedule_structure() {
    let doc = load_yaml(&fixture_path()).unwrap();
    let schedule = &doc.schedules[0];

    assert_eq!(schedule.name, "hvac_operation");
    assert!(schedule.default_day.is_some());
    assert!(schedule.summer_design_day.is_some());
    assert!(schedule.winter_design_day.is_some());
    // Three built-in day types plus the inline weekend day.
    assert_eq!(schedule.days.len(), 4);

    let rule = &schedule.rules[0];
    assert!(rule.applies_to.contains(Weekday::Sat));
    assert!(rule.applies_to.contains(Weekday::Sun));
    assert!(!rule.applies_to.contains(Weekday::Wed));
    let DayRef::Inline(idx) = rule.day_schedule else {
        panic!("expected inline day schedule");
    };
    assert_eq!(schedule.days[idx].values.len(), 1);
}

#[test]
fn system07_pass_through_sections() {
    let doc = load_yaml(&fixture_path()).unwrap();
    assert_eq!(doc.run_info.timestep, 6);
    assert_eq!(doc.run_info.simulation_year, 2014);
    assert_eq!(
        doc.run_info.extra.get("building_type"),
        Some(&AttrValue::Text("Large_Office".to_string()))
    );
    assert_eq!(doc.building_info.space_type, "main_space");
    assert_eq!(
        doc.building_info.geometry.get("number_of_zones"),
        Some(&AttrValue::Number(5.0))
    );
    assert_eq!(doc.construction_sets[0].archetype.climate_zone, "5A");
    assert_eq!(doc.space_types[0].base_space_type, "LargeOffice");
}
