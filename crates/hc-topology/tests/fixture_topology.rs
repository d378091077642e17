use std::path::PathBuf;

use hc_schema::{ConfigDocument, LoopKind, ObjectType};
use hc_topology::{ResolveError, ViolationKind, resolve, validate_topology};

fn fixture() -> ConfigDocument {
    let path =
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../fixtures/ashrae_system07.yaml");
    hc_schema::load_yaml(&path).expect("fixture loads")
}

#[test]
fn system07_resolves_and_validates() {
    let skeleton = resolve(&fixture()).expect("references resolve");
    validate_topology(&skeleton).expect("topology is valid");

    assert_eq!(skeleton.air_loops().count(), 1);
    let kinds: Vec<_> = skeleton.plant_loops().map(|p| p.kind).collect();
    assert_eq!(
        kinds,
        vec![
            LoopKind::HotWater,
            LoopKind::ChilledWater,
            LoopKind::CondenserWater
        ]
    );

    let fan = skeleton.components.resolve_reference("fan_vav").unwrap();
    let air = skeleton.air_loops().next().unwrap();
    assert_eq!(air.supply.last(), Some(&fan));
    assert_eq!(skeleton.components[fan].object_type, ObjectType::FanVariableVolume);
}

#[test]
fn sub_components_are_owned() {
    let skeleton = resolve(&fixture()).unwrap();
    let oa = skeleton.components.resolve_reference("oa_system").unwrap();
    let owned = &skeleton.components[oa].sub_components;
    assert_eq!(owned.len(), 1);
    assert_eq!(skeleton.components[owned[0]].owner, Some(oa));
    assert_eq!(skeleton.components.lookup_global("outdoor_air_controller"), None);
}

#[test]
fn boiler_on_chilled_water_loop_is_rejected() {
    let mut doc = fixture();
    let chilled = doc.hvac[0]
        .plant_loops
        .iter_mut()
        .find(|p| p.kind == LoopKind::ChilledWater)
        .unwrap();
    chilled.supply_branches = vec!["boiler_hot_water".to_string(), "pipe_2".to_string()];

    let skeleton = resolve(&doc).unwrap();
    let errors = validate_topology(&skeleton).unwrap_err();
    assert!(!errors.is_empty());
    assert!(errors.iter().all(|e| e.loop_name == "chilled_water_1"));
    assert!(errors.iter().any(|e| matches!(
        e.violation,
        ViolationKind::SourceKindMismatch {
            expected: LoopKind::ChilledWater,
            ..
        }
    )));
}

#[test]
fn dangling_terminal_is_named() {
    let mut doc = fixture();
    doc.hvac[0].air_loops[0].demand_branches[0].components =
        vec!["terminal_vav_missing".to_string()];

    let errors = resolve(&doc).unwrap_err();
    assert!(errors.iter().any(|e| matches!(
        e,
        ResolveError::Dangling(d) if d.missing_name == "terminal_vav_missing"
    )));
}

#[test]
fn skeleton_serializes_components_as_list() {
    let skeleton = resolve(&fixture()).unwrap();
    let value = serde_json::to_value(&skeleton).unwrap();
    assert_eq!(value["components"].as_array().map(Vec::len), Some(16));
}
