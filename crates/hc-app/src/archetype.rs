//! Archetype presets: complete input documents for common ASHRAE systems.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde_json::{Map, Value, json};

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemArchetype {
    /// Packaged terminal air conditioner.
    System01,
    /// Packaged VAV with reheat.
    System05,
    /// VAV with hot-water reheat and chilled/condenser water plant.
    System07,
}

impl SystemArchetype {
    pub const ALL: [SystemArchetype; 3] = [
        SystemArchetype::System01,
        SystemArchetype::System05,
        SystemArchetype::System07,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SystemArchetype::System01 => "System01",
            SystemArchetype::System05 => "System05",
            SystemArchetype::System07 => "System07",
        }
    }

    pub fn fan_efficiency(self) -> f64 {
        match self {
            SystemArchetype::System01 => 0.6,
            SystemArchetype::System05 => 0.68,
            SystemArchetype::System07 => 0.7,
        }
    }

    /// Fan pressure rise in Pa.
    pub fn fan_pressure_rise(self) -> f64 {
        match self {
            SystemArchetype::System01 => 500.0,
            SystemArchetype::System05 => 1100.0,
            SystemArchetype::System07 => 1250.0,
        }
    }

    fn fan_motor_efficiency(self) -> f64 {
        match self {
            SystemArchetype::System01 => 0.9,
            SystemArchetype::System05 | SystemArchetype::System07 => 0.93,
        }
    }

    fn is_multi_zone(self) -> bool {
        !matches!(self, SystemArchetype::System01)
    }
}

impl FromStr for SystemArchetype {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SystemArchetype::ALL
            .into_iter()
            .find(|a| a.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| AppError::InvalidInput(format!("Unknown system archetype: {}", s)))
    }
}

impl fmt::Display for SystemArchetype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildingType {
    Office,
    Retail,
    School,
    Hospital,
    Hotel,
    Restaurant,
    Warehouse,
    Apartment,
}

/// Internal gains and ventilation rates of a space type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpaceDensity {
    /// W/m²
    pub elec_plug: f64,
    /// W/m²
    pub lighting: f64,
    /// m² per person
    pub floor_area_per_person: f64,
    /// m³/s per person
    pub oa_per_person: f64,
    /// m³/s per m²
    pub oa_per_area: f64,
}

impl BuildingType {
    pub const ALL: [BuildingType; 8] = [
        BuildingType::Office,
        BuildingType::Retail,
        BuildingType::School,
        BuildingType::Hospital,
        BuildingType::Hotel,
        BuildingType::Restaurant,
        BuildingType::Warehouse,
        BuildingType::Apartment,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            BuildingType::Office => "Office",
            BuildingType::Retail => "Retail",
            BuildingType::School => "School",
            BuildingType::Hospital => "Hospital",
            BuildingType::Hotel => "Hotel",
            BuildingType::Restaurant => "Restaurant",
            BuildingType::Warehouse => "Warehouse",
            BuildingType::Apartment => "Apartment",
        }
    }

    /// Prototype building the construction set and space type derive from.
    pub fn prototype(self) -> &'static str {
        match self {
            BuildingType::Office => "LargeOffice",
            BuildingType::Retail => "RetailStandalone",
            BuildingType::School => "SecondarySchool",
            BuildingType::Hospital => "Hospital",
            BuildingType::Hotel => "LargeHotel",
            BuildingType::Restaurant => "FullServiceRestaurant",
            BuildingType::Warehouse => "Warehouse",
            BuildingType::Apartment => "MidriseApartment",
        }
    }

    pub fn density(self) -> SpaceDensity {
        let (elec_plug, lighting, floor_area_per_person, oa_per_person, oa_per_area) = match self {
            BuildingType::Office => (10.76, 10.76, 18.6, 0.0125, 0.0),
            BuildingType::Retail => (6.88, 16.15, 4.65, 0.0038, 0.0006),
            BuildingType::School => (6.5, 15.77, 4.65, 0.0038, 0.0006),
            BuildingType::Hospital => (7.5, 16.0, 8.0, 0.0125, 0.0006),
            BuildingType::Hotel => (8.0, 11.0, 23.0, 0.0063, 0.0003),
            BuildingType::Restaurant => (15.0, 22.0, 1.4, 0.0094, 0.0018),
            BuildingType::Warehouse => (3.0, 8.0, 200.0, 0.0063, 0.0002),
            BuildingType::Apartment => (4.0, 7.0, 38.0, 0.0063, 0.0003),
        };
        SpaceDensity {
            elec_plug,
            lighting,
            floor_area_per_person,
            oa_per_person,
            oa_per_area,
        }
    }
}

impl FromStr for BuildingType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BuildingType::ALL
            .into_iter()
            .find(|b| b.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| AppError::InvalidInput(format!("Unknown building type: {}", s)))
    }
}

impl fmt::Display for BuildingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Footprint shape of the generated geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildingShape {
    Rectangle,
    L,
    H,
    T,
    U,
}

impl BuildingShape {
    pub const ALL: [BuildingShape; 5] = [
        BuildingShape::Rectangle,
        BuildingShape::L,
        BuildingShape::H,
        BuildingShape::T,
        BuildingShape::U,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            BuildingShape::Rectangle => "Rectangle",
            BuildingShape::L => "L",
            BuildingShape::H => "H",
            BuildingShape::T => "T",
            BuildingShape::U => "U",
        }
    }
}

impl FromStr for BuildingShape {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BuildingShape::ALL
            .into_iter()
            .find(|b| b.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| AppError::InvalidInput(format!("Unknown building shape: {}", s)))
    }
}

impl fmt::Display for BuildingShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outer dimensions of one floor, in m, rounded to 0.1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Footprint {
    pub length: f64,
    pub width: f64,
}

impl Footprint {
    /// Rectangles keep a 3:2 aspect ratio; the wing shapes start from a square.
    pub fn new(total_area: f64, floors: u32, shape: BuildingShape) -> Self {
        let floor_area = total_area / f64::from(floors);
        let (length, width) = match shape {
            BuildingShape::Rectangle => {
                let width = (floor_area * 2.0 / 3.0).sqrt();
                (floor_area / width, width)
            }
            BuildingShape::L | BuildingShape::H | BuildingShape::T | BuildingShape::U => {
                let side = floor_area.sqrt();
                (side, side)
            }
        };
        Self {
            length: round_tenth(length),
            width: round_tenth(width),
        }
    }

    pub fn core_offset(&self) -> f64 {
        (self.length.min(self.width) * 0.1).min(MAX_CORE_OFFSET)
    }
}

fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Core zone offset cap, m.
const MAX_CORE_OFFSET: f64 = 4.57;

/// Zone layout name and zone count for a building of `area`.
pub fn zone_layout(area: f64) -> (&'static str, u32) {
    if area < 5000.0 {
        ("Single_Zone", 1)
    } else if area < 20000.0 {
        ("Three_Zone", 3)
    } else {
        ("Five_Zone", 5)
    }
}

/// Exterior lighting power in W, never below 5 kW.
pub fn exterior_lighting(area: f64) -> f64 {
    (area * 0.3).max(5000.0)
}

/// Building and operation choices for a generated document.
#[derive(Debug, Clone, PartialEq)]
pub struct ArchetypeParams {
    pub cooling_setpoint: f64,
    pub heating_setpoint: f64,
    pub has_setback: bool,
    pub has_weekend_occupancy: bool,
    pub has_dcv: bool,
    pub weekday_start_hour: u8,
    pub weekday_end_hour: u8,
    pub building_type: BuildingType,
    /// Total floor area, m².
    pub building_area: f64,
    pub building_shape: BuildingShape,
    pub window_to_wall_ratio: f64,
    pub building_age: i64,
    pub climate_zone: String,
    pub number_of_floors: u32,
    pub floor_height: f64,
    pub simulation_year: i64,
    pub output_location: String,
}

impl Default for ArchetypeParams {
    fn default() -> Self {
        Self {
            cooling_setpoint: 24.0,
            heating_setpoint: 21.0,
            has_setback: false,
            has_weekend_occupancy: false,
            has_dcv: false,
            weekday_start_hour: 6,
            weekday_end_hour: 18,
            building_type: BuildingType::Office,
            building_area: 10000.0,
            building_shape: BuildingShape::Rectangle,
            window_to_wall_ratio: 0.33,
            building_age: 2004,
            climate_zone: "5A".to_string(),
            number_of_floors: 10,
            floor_height: 3.96,
            simulation_year: 2014,
            output_location: "./output".to_string(),
        }
    }
}

impl ArchetypeParams {
    fn building_standard(&self) -> String {
        format!("ASHRAE 90.1-{}", self.building_age)
    }

    fn validate(&self) -> AppResult<()> {
        if self.weekday_start_hour == 0
            || self.weekday_start_hour >= self.weekday_end_hour
            || self.weekday_end_hour >= NIGHT_OFF_HOUR
        {
            return Err(AppError::InvalidInput(format!(
                "Weekday hours must satisfy 0 < start < end < {}: got {}..{}",
                NIGHT_OFF_HOUR, self.weekday_start_hour, self.weekday_end_hour
            )));
        }
        if self.number_of_floors == 0 {
            return Err(AppError::InvalidInput("Building needs at least one floor".to_string()));
        }
        if !self.building_area.is_finite() || self.building_area <= 0.0 {
            return Err(AppError::InvalidInput(format!(
                "Building area must be positive: got {}",
                self.building_area
            )));
        }
        let wwr = self.window_to_wall_ratio;
        if wwr.is_nan() || wwr <= 0.0 || wwr >= 1.0 {
            return Err(AppError::InvalidInput(format!(
                "Window-to-wall ratio must lie in (0, 1): got {}",
                wwr
            )));
        }
        Ok(())
    }
}

/// Hour at which every generated occupancy profile switches off for the night.
const NIGHT_OFF_HOUR: u8 = 22;

/// Generate a full configuration document for `system`.
pub fn generate_config(system: SystemArchetype, params: &ArchetypeParams) -> AppResult<Value> {
    params.validate()?;

    Ok(json!({
        "measures": measures(system, params),
        "hvac": { "hvac_system": hvac_system(system, params) },
        "hvac_components": components(system),
        "schedules": schedules(params),
        "construction_sets": construction_sets(params),
        "space_types": space_types(params),
        "run_info": run_info(system, params),
        "building_info": building_info(params),
    }))
}

fn measures(system: SystemArchetype, params: &ArchetypeParams) -> Value {
    json!({
        "hvac_controls": {
            "cooling_setpoint": params.cooling_setpoint,
            "heating_setpoint": params.heating_setpoint,
            "has_setback": params.has_setback,
            "has_weekend_occupancy": params.has_weekend_occupancy,
            "weekday_start_time": hour_key(params.weekday_start_hour),
            "weekday_end_time": hour_key(params.weekday_end_hour),
            "has_dcv": params.has_dcv,
            "night_cycle": "CycleOnAny",
        },
        "hvac_equipment": {
            "fan_efficiency": system.fan_efficiency(),
            "fan_pressure_rise": system.fan_pressure_rise(),
            "fan_motor_efficiency": 0.93,
            "has_dcv": params.has_dcv,
            "night_cycle": "CycleOnAny",
        },
    })
}

fn hvac_system(system: SystemArchetype, params: &ArchetypeParams) -> Value {
    let air_loop = |name: &str, supply: [&str; 4], terminal: &str| {
        json!({
            name: {
                "supply_components": { "outlet_node": supply },
                "demand_components": { "branches": { "default_air_terminal": terminal } },
            }
        })
    };

    let mut body = match system {
        SystemArchetype::System07 => json!({
            "air_loops": air_loop(
                "VAV_Reheat_System",
                ["oa_system", "coil_cooling_water", "coil_heating_water", "fan_vav"],
                "terminal_vav_reheat",
            ),
            "plant_loops": {
                "hot_water_1": plant_loop(
                    "hot_water",
                    "pump_var",
                    "boiler_hot_water",
                    "pipe_1",
                    &["coil_heating_water", "terminal_vav_reheat"],
                ),
                "chilled_water_1": plant_loop(
                    "chilled_water",
                    "pump_var_2",
                    "chiller_elec_eir",
                    "pipe_2",
                    &["coil_cooling_water"],
                ),
                "condenser_water_1": plant_loop(
                    "condenser_water",
                    "pump_var_3",
                    "cooling_tower_single_speed",
                    "pipe_3",
                    &["chiller_elec_eir"],
                ),
            },
        }),
        SystemArchetype::System05 => json!({
            "air_loops": air_loop(
                "Packaged_VAV_System",
                ["oa_system", "coil_cooling_dx_two_speed", "coil_heating_gas", "fan_vav"],
                "terminal_vav_reheat",
            ),
        }),
        SystemArchetype::System01 => json!({
            "air_loops": air_loop(
                "PTAC_System",
                [
                    "oa_system",
                    "coil_cooling_dx_single_speed",
                    "coil_heating_electric",
                    "fan_constant",
                ],
                "terminal_single_duct_uncontrolled",
            ),
        }),
    };

    if let Value::Object(map) = &mut body {
        map.insert("has_dcv".to_string(), json!(params.has_dcv));
        map.insert("night_cycle".to_string(), json!("CycleOnAny"));
        map.insert("availability_schedule".to_string(), json!("hvac_operation"));
        map.insert("is_multi_zone".to_string(), json!(system.is_multi_zone()));
    }
    body
}

fn plant_loop(kind: &str, pump: &str, source: &str, pipe: &str, demand: &[&str]) -> Value {
    json!({
        "plant_loop_type": kind,
        "supply_components": {
            "inlet_node": [pump],
            "branches": [source, pipe],
        },
        "demand_components": { "branches": demand },
    })
}

fn fan(object_type: &str, system: SystemArchetype) -> Value {
    json!({
        "idd_object_type": object_type,
        "component_values": {
            "pressure_rise": system.fan_pressure_rise(),
            "motor_efficiency": system.fan_motor_efficiency(),
            "fan_efficiency": system.fan_efficiency(),
        },
    })
}

fn vav_reheat_terminal(reheat_coil: &str) -> Value {
    json!({
        "idd_object_type": "AirTerminalSingleDuctVAVReheat",
        "sub_components": { "reheat_coil": { "idd_object_type": reheat_coil } },
    })
}

fn components(system: SystemArchetype) -> Value {
    let mut map = Map::new();
    let mut add = |name: &str, value: Value| {
        map.insert(name.to_string(), value);
    };
    let plain = |object_type: &str| json!({ "idd_object_type": object_type });

    add(
        "oa_system",
        json!({
            "idd_object_type": "AirLoopHVACOutdoorAirSystem",
            "sub_components": {
                "outdoor_air_controller": { "idd_object_type": "ControllerOutdoorAir" }
            },
        }),
    );

    match system {
        SystemArchetype::System07 => {
            add("coil_cooling_water", plain("CoilCoolingWater"));
            add("coil_heating_water", plain("CoilHeatingWater"));
            add("fan_vav", fan("FanVariableVolume", system));
            add("terminal_vav_reheat", vav_reheat_terminal("CoilHeatingWater"));
            for pump in ["pump_var", "pump_var_2", "pump_var_3"] {
                add(pump, plain("PumpVariableSpeed"));
            }
            add("boiler_hot_water", plain("BoilerHotWater"));
            add("chiller_elec_eir", plain("ChillerElectricEIR"));
            add("cooling_tower_single_speed", plain("CoolingTowerSingleSpeed"));
            for pipe in ["pipe_1", "pipe_2", "pipe_3"] {
                add(pipe, plain("PipeAdiabatic"));
            }
        }
        SystemArchetype::System05 => {
            add("coil_cooling_dx_two_speed", plain("CoilCoolingDXTwoSpeed"));
            add("coil_heating_gas", plain("CoilHeatingGas"));
            add("fan_vav", fan("FanVariableVolume", system));
            add("terminal_vav_reheat", vav_reheat_terminal("CoilHeatingElectric"));
        }
        SystemArchetype::System01 => {
            add("coil_cooling_dx_single_speed", plain("CoilCoolingDXSingleSpeed"));
            add("coil_heating_electric", plain("CoilHeatingElectric"));
            add("fan_constant", fan("FanConstantVolume", system));
            add(
                "terminal_single_duct_uncontrolled",
                plain("AirTerminalSingleDuctUncontrolled"),
            );
        }
    }

    Value::Object(map)
}

fn hour_key(hour: u8) -> String {
    format!("{:02}:00", hour)
}

/// Occupancy pattern: off, on from the end hour until the night-off hour.
fn occupied_values(params: &ArchetypeParams) -> Value {
    let breakpoints = BTreeMap::from([
        (0, 0.0),
        (params.weekday_start_hour, 0.0),
        (params.weekday_end_hour, 1.0),
        (NIGHT_OFF_HOUR, 0.0),
    ]);
    Value::Object(
        breakpoints
            .into_iter()
            .map(|(hour, value)| (hour_key(hour), json!(value)))
            .collect(),
    )
}

fn schedules(params: &ArchetypeParams) -> Value {
    let occupied = occupied_values(params);
    let day = |name: &str, values: &Value| json!({ "name": name, "values": values });

    let weekend_values = if params.has_weekend_occupancy {
        occupied.clone()
    } else {
        json!({ "00:00": 0.0 })
    };

    json!({
        "hvac_operation": {
            "summer_design_day": day("summer_design_day_schedule", &occupied),
            "winter_design_day": day("winter_design_day_schedule", &occupied),
            "default_day": day("default_day_schedule", &occupied),
            "schedule_rules": {
                "custom_schedule_rule": {
                    "apply_saturday": true,
                    "apply_sunday": true,
                    "name": "rule",
                    "day_schedule": day("weekend_day_schedule", &weekend_values),
                }
            },
            "name": "hvac_operation",
        }
    })
}

fn construction_sets(params: &ArchetypeParams) -> Value {
    json!({
        "building_construction": {
            "base_construction_set": "default",
            "base_building_type": params.building_type.prototype(),
            "building_age": params.building_age,
            "climate_zone": params.climate_zone,
            "building_standard": params.building_standard(),
            "wall_type": "",
            "roof_type": "",
            "south_win_type": "Reference",
            "east_win_type": "Reference",
            "north_win_type": "Reference",
            "west_win_type": "Reference",
        }
    })
}

fn space_types(params: &ArchetypeParams) -> Value {
    let prototype = params.building_type.prototype();
    let density = params.building_type.density();
    json!({
        "main_space": {
            "base_space_type": prototype,
            "base_building_type": prototype,
            "building_age": params.building_age,
            "climate_zone": params.climate_zone,
            "building_standard": params.building_standard(),
            "elec_plug_per_flr_area": density.elec_plug,
            "int_lighting_per_flr_area": density.lighting,
            "flr_area_per_person": density.floor_area_per_person,
            "inf_flow_per_ext_surface_area": 0.0003,
            "oa_flow_per_person": density.oa_per_person,
            "oa_flow_per_area": density.oa_per_area,
            "cooling_setpoint": params.cooling_setpoint,
            "heating_setpoint": params.heating_setpoint,
            "has_setback": params.has_setback,
            "has_weekend_occupancy": params.has_weekend_occupancy,
            "weekday_start_time": hour_key(params.weekday_start_hour),
            "weekday_end_time": hour_key(params.weekday_end_hour),
        }
    })
}

fn run_info(system: SystemArchetype, params: &ArchetypeParams) -> Value {
    let output = params.output_location.trim_end_matches('/');
    let uuid = format!(
        "{{ASHRAE-{}-{}}}",
        system.as_str().to_uppercase(),
        params.building_type.prototype().to_uppercase()
    );
    json!({
        "uuid": uuid,
        "building_type": params.building_type.prototype(),
        "output_location": output,
        "temp_sim_location": format!("{}/temp", output),
        "building_age": params.building_age,
        "climate_zone": params.climate_zone,
        "building_standard": params.building_standard(),
        "simulation_year": params.simulation_year,
        "timestep": 6,
    })
}

fn building_info(params: &ArchetypeParams) -> Value {
    let footprint = Footprint::new(
        params.building_area,
        params.number_of_floors,
        params.building_shape,
    );
    let (layout, zones) = zone_layout(params.building_area);
    let wwr = params.window_to_wall_ratio;
    json!({
        "has_drop_ceilings": false,
        "floor_height": params.floor_height,
        "use_multiplier": params.number_of_floors > 3,
        "number_of_floors": params.number_of_floors,
        "orientation": 0.0,
        "geometry_configuration": params.building_shape.as_str(),
        "zone_layout": layout,
        "roof_style": "flat",
        "ext_lighting_intensity": exterior_lighting(params.building_area),
        "length1": footprint.length,
        "length2": 0.0,
        "width1": footprint.width,
        "width2": 0.0,
        "end1": 0.0,
        "end2": 0.0,
        "offset1": 0.0,
        "offset2": 0.0,
        "offset3": 0.0,
        "core_offset": footprint.core_offset(),
        "drop_ceiling_height": 1.22,
        "number_of_zones": zones,
        "south_wwr": wwr,
        "east_wwr": wwr,
        "north_wwr": wwr,
        "west_wwr": wwr,
        "space_type": "main_space",
        "construction_set": "building_construction",
        "hvac_system": "hvac_system",
    })
}
