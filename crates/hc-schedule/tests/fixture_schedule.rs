use std::path::Path;

use chrono::Weekday;
use hc_core::TimeOfDay;
use hc_schedule::compile_schedules;

#[test]
fn system07_operation_schedule() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../fixtures/ashrae_system07.yaml");
    let doc = hc_schema::load_yaml(&path).unwrap_or_else(|e| panic!("Failed to load fixture: {e}"));
    let skeleton = hc_topology::resolve(&doc).unwrap();

    let schedules = compile_schedules(&doc.schedules, &skeleton.schedules).unwrap();
    assert_eq!(schedules.len(), 1);
    let ops = &schedules[0];
    assert_eq!(ops.key, "hvac_operation");

    let at = |h, m| TimeOfDay::from_hm(h, m).unwrap();
    assert_eq!(ops.value_at(Weekday::Mon, at(7, 0)), 0.0);
    assert_eq!(ops.value_at(Weekday::Mon, at(19, 0)), 1.0);
    assert_eq!(ops.value_at(Weekday::Thu, at(18, 0)), 1.0);
    assert_eq!(ops.value_at(Weekday::Sat, at(19, 0)), 0.0);
    assert_eq!(ops.value_at(Weekday::Sun, at(19, 0)), 0.0);

    assert_eq!(ops.summer_design_day().unwrap().value_at(at(19, 0)), 1.0);
    assert_eq!(ops.winter_design_day().unwrap().value_at(at(23, 0)), 0.0);
    assert!(ops.inert_rules.is_empty());
}
