//! Static catalog of HVAC object types.
//!
//! The catalog is immutable data: equipment class of each object type, the
//! loop kinds it can source or consume, its attribute schema, and the fixed
//! table mapping measure keys onto component or loop attributes.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::schema::{AttrKind, LoopKind, MeasureCategory};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ObjectType {
    AirLoopHVACOutdoorAirSystem,
    ControllerOutdoorAir,
    CoilCoolingWater,
    CoilHeatingWater,
    CoilCoolingDXSingleSpeed,
    CoilCoolingDXTwoSpeed,
    CoilHeatingElectric,
    CoilHeatingGas,
    FanVariableVolume,
    FanConstantVolume,
    AirTerminalSingleDuctVAVReheat,
    AirTerminalSingleDuctUncontrolled,
    PumpVariableSpeed,
    PumpConstantSpeed,
    BoilerHotWater,
    ChillerElectricEIR,
    CoolingTowerSingleSpeed,
    PipeAdiabatic,
}

/// Broad equipment class used by topology rules and measure targeting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EquipmentClass {
    OutdoorAirSystem,
    Controller,
    Coil,
    Fan,
    Terminal,
    Pump,
    Boiler,
    Chiller,
    CoolingTower,
    Pipe,
}

impl EquipmentClass {
    /// Equipment that may sit on an air loop supply path.
    pub fn is_air_supply(self) -> bool {
        matches!(
            self,
            EquipmentClass::OutdoorAirSystem | EquipmentClass::Coil | EquipmentClass::Fan
        )
    }

    pub fn is_source(self) -> bool {
        matches!(
            self,
            EquipmentClass::Boiler | EquipmentClass::Chiller | EquipmentClass::CoolingTower
        )
    }
}

impl fmt::Display for EquipmentClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EquipmentClass::OutdoorAirSystem => "outdoor air system",
            EquipmentClass::Controller => "controller",
            EquipmentClass::Coil => "coil",
            EquipmentClass::Fan => "fan",
            EquipmentClass::Terminal => "terminal",
            EquipmentClass::Pump => "pump",
            EquipmentClass::Boiler => "boiler",
            EquipmentClass::Chiller => "chiller",
            EquipmentClass::CoolingTower => "cooling tower",
            EquipmentClass::Pipe => "pipe",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttrSpec {
    pub name: &'static str,
    pub kind: AttrKind,
}

const fn num(name: &'static str) -> AttrSpec {
    AttrSpec {
        name,
        kind: AttrKind::Number,
    }
}

const fn text(name: &'static str) -> AttrSpec {
    AttrSpec {
        name,
        kind: AttrKind::Text,
    }
}

const fn flag(name: &'static str) -> AttrSpec {
    AttrSpec {
        name,
        kind: AttrKind::Bool,
    }
}

#[derive(Debug)]
pub struct CatalogEntry {
    pub object_type: ObjectType,
    pub class: EquipmentClass,
    /// Plant loop kind this equipment is the primary source for.
    pub source_for: Option<LoopKind>,
    /// Plant loop kinds this equipment may sit on the demand side of.
    pub consumer_of: &'static [LoopKind],
    pub attributes: &'static [AttrSpec],
}

const FAN_ATTRS: &[AttrSpec] = &[
    num("fan_efficiency"),
    num("pressure_rise"),
    num("motor_efficiency"),
    num("maximum_flow_rate"),
    num("motor_in_airstream_fraction"),
];

const VAV_FAN_ATTRS: &[AttrSpec] = &[
    num("fan_efficiency"),
    num("pressure_rise"),
    num("motor_efficiency"),
    num("maximum_flow_rate"),
    num("motor_in_airstream_fraction"),
    num("fan_power_minimum_flow_fraction"),
];

const PUMP_ATTRS: &[AttrSpec] = &[
    num("rated_pump_head"),
    num("rated_flow_rate"),
    num("motor_efficiency"),
    text("pump_control_type"),
];

// Indexed by `ObjectType as usize`; order must follow the enum.
static CATALOG: [CatalogEntry; 18] = [
    CatalogEntry {
        object_type: ObjectType::AirLoopHVACOutdoorAirSystem,
        class: EquipmentClass::OutdoorAirSystem,
        source_for: None,
        consumer_of: &[],
        attributes: &[
            num("minimum_outdoor_air_flow_rate"),
            num("maximum_outdoor_air_flow_rate"),
        ],
    },
    CatalogEntry {
        object_type: ObjectType::ControllerOutdoorAir,
        class: EquipmentClass::Controller,
        source_for: None,
        consumer_of: &[],
        attributes: &[
            text("economizer_control_type"),
            flag("demand_controlled_ventilation"),
            num("minimum_outdoor_air_flow_rate"),
        ],
    },
    CatalogEntry {
        object_type: ObjectType::CoilCoolingWater,
        class: EquipmentClass::Coil,
        source_for: None,
        consumer_of: &[LoopKind::ChilledWater],
        attributes: &[
            num("design_water_flow_rate"),
            num("design_air_flow_rate"),
            num("design_inlet_water_temperature"),
        ],
    },
    CatalogEntry {
        object_type: ObjectType::CoilHeatingWater,
        class: EquipmentClass::Coil,
        source_for: None,
        consumer_of: &[LoopKind::HotWater],
        attributes: &[
            num("u_factor_times_area_value"),
            num("maximum_water_flow_rate"),
            num("rated_capacity"),
        ],
    },
    CatalogEntry {
        object_type: ObjectType::CoilCoolingDXSingleSpeed,
        class: EquipmentClass::Coil,
        source_for: None,
        consumer_of: &[],
        attributes: &[num("rated_total_cooling_capacity"), num("rated_cop")],
    },
    CatalogEntry {
        object_type: ObjectType::CoilCoolingDXTwoSpeed,
        class: EquipmentClass::Coil,
        source_for: None,
        consumer_of: &[],
        attributes: &[
            num("rated_total_cooling_capacity"),
            num("high_speed_rated_cop"),
            num("low_speed_rated_cop"),
        ],
    },
    CatalogEntry {
        object_type: ObjectType::CoilHeatingElectric,
        class: EquipmentClass::Coil,
        source_for: None,
        consumer_of: &[],
        attributes: &[num("efficiency"), num("nominal_capacity")],
    },
    CatalogEntry {
        object_type: ObjectType::CoilHeatingGas,
        class: EquipmentClass::Coil,
        source_for: None,
        consumer_of: &[],
        attributes: &[num("gas_burner_efficiency"), num("nominal_capacity")],
    },
    CatalogEntry {
        object_type: ObjectType::FanVariableVolume,
        class: EquipmentClass::Fan,
        source_for: None,
        consumer_of: &[],
        attributes: VAV_FAN_ATTRS,
    },
    CatalogEntry {
        object_type: ObjectType::FanConstantVolume,
        class: EquipmentClass::Fan,
        source_for: None,
        consumer_of: &[],
        attributes: FAN_ATTRS,
    },
    CatalogEntry {
        object_type: ObjectType::AirTerminalSingleDuctVAVReheat,
        class: EquipmentClass::Terminal,
        source_for: None,
        // Consumes hot water through its reheat coil.
        consumer_of: &[LoopKind::HotWater],
        attributes: &[
            num("maximum_air_flow_rate"),
            num("zone_minimum_air_flow_fraction"),
            num("maximum_reheat_air_temperature"),
        ],
    },
    CatalogEntry {
        object_type: ObjectType::AirTerminalSingleDuctUncontrolled,
        class: EquipmentClass::Terminal,
        source_for: None,
        consumer_of: &[],
        attributes: &[num("maximum_air_flow_rate")],
    },
    CatalogEntry {
        object_type: ObjectType::PumpVariableSpeed,
        class: EquipmentClass::Pump,
        source_for: None,
        consumer_of: &[],
        attributes: PUMP_ATTRS,
    },
    CatalogEntry {
        object_type: ObjectType::PumpConstantSpeed,
        class: EquipmentClass::Pump,
        source_for: None,
        consumer_of: &[],
        attributes: PUMP_ATTRS,
    },
    CatalogEntry {
        object_type: ObjectType::BoilerHotWater,
        class: EquipmentClass::Boiler,
        source_for: Some(LoopKind::HotWater),
        consumer_of: &[],
        attributes: &[
            num("nominal_thermal_efficiency"),
            num("nominal_capacity"),
            num("design_water_outlet_temperature"),
            text("fuel_type"),
        ],
    },
    CatalogEntry {
        object_type: ObjectType::ChillerElectricEIR,
        class: EquipmentClass::Chiller,
        source_for: Some(LoopKind::ChilledWater),
        // Rejects heat to the condenser loop.
        consumer_of: &[LoopKind::CondenserWater],
        attributes: &[
            num("reference_cop"),
            num("reference_capacity"),
            num("reference_leaving_chilled_water_temperature"),
            text("condenser_type"),
        ],
    },
    CatalogEntry {
        object_type: ObjectType::CoolingTowerSingleSpeed,
        class: EquipmentClass::CoolingTower,
        source_for: Some(LoopKind::CondenserWater),
        consumer_of: &[],
        attributes: &[
            num("design_water_flow_rate"),
            num("design_air_flow_rate"),
            num("design_fan_power"),
        ],
    },
    CatalogEntry {
        object_type: ObjectType::PipeAdiabatic,
        class: EquipmentClass::Pipe,
        source_for: None,
        consumer_of: &[],
        attributes: &[],
    },
];

impl ObjectType {
    pub const ALL: [ObjectType; 18] = [
        ObjectType::AirLoopHVACOutdoorAirSystem,
        ObjectType::ControllerOutdoorAir,
        ObjectType::CoilCoolingWater,
        ObjectType::CoilHeatingWater,
        ObjectType::CoilCoolingDXSingleSpeed,
        ObjectType::CoilCoolingDXTwoSpeed,
        ObjectType::CoilHeatingElectric,
        ObjectType::CoilHeatingGas,
        ObjectType::FanVariableVolume,
        ObjectType::FanConstantVolume,
        ObjectType::AirTerminalSingleDuctVAVReheat,
        ObjectType::AirTerminalSingleDuctUncontrolled,
        ObjectType::PumpVariableSpeed,
        ObjectType::PumpConstantSpeed,
        ObjectType::BoilerHotWater,
        ObjectType::ChillerElectricEIR,
        ObjectType::CoolingTowerSingleSpeed,
        ObjectType::PipeAdiabatic,
    ];

    pub fn entry(self) -> &'static CatalogEntry {
        &CATALOG[self as usize]
    }

    pub fn class(self) -> EquipmentClass {
        self.entry().class
    }

    /// Object type name as written in the `idd_object_type` field.
    pub fn idd_name(self) -> &'static str {
        match self {
            ObjectType::AirLoopHVACOutdoorAirSystem => "AirLoopHVACOutdoorAirSystem",
            ObjectType::ControllerOutdoorAir => "ControllerOutdoorAir",
            ObjectType::CoilCoolingWater => "CoilCoolingWater",
            ObjectType::CoilHeatingWater => "CoilHeatingWater",
            ObjectType::CoilCoolingDXSingleSpeed => "CoilCoolingDXSingleSpeed",
            ObjectType::CoilCoolingDXTwoSpeed => "CoilCoolingDXTwoSpeed",
            ObjectType::CoilHeatingElectric => "CoilHeatingElectric",
            ObjectType::CoilHeatingGas => "CoilHeatingGas",
            ObjectType::FanVariableVolume => "FanVariableVolume",
            ObjectType::FanConstantVolume => "FanConstantVolume",
            ObjectType::AirTerminalSingleDuctVAVReheat => "AirTerminalSingleDuctVAVReheat",
            ObjectType::AirTerminalSingleDuctUncontrolled => "AirTerminalSingleDuctUncontrolled",
            ObjectType::PumpVariableSpeed => "PumpVariableSpeed",
            ObjectType::PumpConstantSpeed => "PumpConstantSpeed",
            ObjectType::BoilerHotWater => "BoilerHotWater",
            ObjectType::ChillerElectricEIR => "ChillerElectricEIR",
            ObjectType::CoolingTowerSingleSpeed => "CoolingTowerSingleSpeed",
            ObjectType::PipeAdiabatic => "PipeAdiabatic",
        }
    }

    pub fn from_idd_name(name: &str) -> Option<Self> {
        ObjectType::ALL.into_iter().find(|t| t.idd_name() == name)
    }

    pub fn attribute(self, name: &str) -> Option<&'static AttrSpec> {
        self.entry().attributes.iter().find(|a| a.name == name)
    }

    pub fn is_source_for(self, kind: LoopKind) -> bool {
        self.entry().source_for == Some(kind)
    }

    pub fn is_consumer_of(self, kind: LoopKind) -> bool {
        self.entry().consumer_of.contains(&kind)
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.idd_name())
    }
}

/// Attributes an HVAC system may declare at system level.
pub const SYSTEM_ATTRIBUTES: &[AttrSpec] = &[
    flag("has_dcv"),
    text("night_cycle"),
    flag("is_multi_zone"),
];

/// Entities a measure key writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeasureScope {
    /// Every air loop of every HVAC system.
    AirLoop,
    /// Every component of the listed classes whose type declares the attribute.
    Equipment(&'static [EquipmentClass]),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeasureTarget {
    pub scope: MeasureScope,
    pub attribute: &'static str,
    pub kind: AttrKind,
}

const fn air_loop(attribute: &'static str, kind: AttrKind) -> MeasureTarget {
    MeasureTarget {
        scope: MeasureScope::AirLoop,
        attribute,
        kind,
    }
}

const fn equipment(
    classes: &'static [EquipmentClass],
    attribute: &'static str,
    kind: AttrKind,
) -> MeasureTarget {
    MeasureTarget {
        scope: MeasureScope::Equipment(classes),
        attribute,
        kind,
    }
}

const FANS: &[EquipmentClass] = &[EquipmentClass::Fan];
const PUMPS: &[EquipmentClass] = &[EquipmentClass::Pump];
const COILS: &[EquipmentClass] = &[EquipmentClass::Coil];

static CONTROLS_TARGETS: &[(&str, MeasureTarget)] = &[
    ("cooling_setpoint", air_loop("cooling_setpoint", AttrKind::Number)),
    ("heating_setpoint", air_loop("heating_setpoint", AttrKind::Number)),
    ("has_setback", air_loop("has_setback", AttrKind::Bool)),
    (
        "has_weekend_occupancy",
        air_loop("has_weekend_occupancy", AttrKind::Bool),
    ),
    ("weekday_start_time", air_loop("weekday_start_time", AttrKind::Text)),
    ("weekday_end_time", air_loop("weekday_end_time", AttrKind::Text)),
    ("has_dcv", air_loop("has_dcv", AttrKind::Bool)),
    ("night_cycle", air_loop("night_cycle", AttrKind::Text)),
];

static EQUIPMENT_TARGETS: &[(&str, MeasureTarget)] = &[
    ("fan_efficiency", equipment(FANS, "fan_efficiency", AttrKind::Number)),
    ("fan_pressure_rise", equipment(FANS, "pressure_rise", AttrKind::Number)),
    (
        "fan_motor_efficiency",
        equipment(FANS, "motor_efficiency", AttrKind::Number),
    ),
    (
        "pump_motor_efficiency",
        equipment(PUMPS, "motor_efficiency", AttrKind::Number),
    ),
    ("pump_head", equipment(PUMPS, "rated_pump_head", AttrKind::Number)),
    ("cooling_coil_cop", equipment(COILS, "rated_cop", AttrKind::Number)),
    ("has_dcv", air_loop("has_dcv", AttrKind::Bool)),
    ("night_cycle", air_loop("night_cycle", AttrKind::Text)),
];

/// Look up where a measure key writes; `None` for keys outside the table.
pub fn measure_target(category: MeasureCategory, key: &str) -> Option<MeasureTarget> {
    let table = match category {
        MeasureCategory::HvacControls => CONTROLS_TARGETS,
        MeasureCategory::HvacEquipment => EQUIPMENT_TARGETS,
    };
    table.iter().find(|(k, _)| *k == key).map(|(_, t)| *t)
}
