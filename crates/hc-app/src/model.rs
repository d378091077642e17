//! The compiled model handed to the renderer.

use hc_core::{ConstructionSetId, SpaceTypeId, SystemId};
use hc_schedule::CompiledSchedule;
use hc_schema::{Attributes, ConstructionSetDef, RunInfo, SpaceTypeDef};
use hc_topology::{AirLoopNode, ComponentArena, ComponentNode, PlantLoopNode, SystemNode};
use serde::Serialize;
use sha2::{Digest, Sha256};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompiledBuilding {
    pub space_type: SpaceTypeId,
    pub construction_set: ConstructionSetId,
    pub hvac_system: SystemId,
    /// Geometry parameters, passed through untouched.
    pub geometry: Attributes,
}

/// Fully resolved, validated and measure-adjusted configuration.
///
/// Immutable once returned; every cross-reference is a handle into one of
/// the tables below.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompiledModel {
    pub components: ComponentArena,
    pub systems: Vec<SystemNode>,
    pub schedules: Vec<CompiledSchedule>,
    pub construction_sets: Vec<ConstructionSetDef>,
    pub space_types: Vec<SpaceTypeDef>,
    pub building: CompiledBuilding,
    pub run_info: RunInfo,
}

impl CompiledModel {
    /// SHA-256 over the serialized model, hex encoded.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();

        let model_json = serde_json::to_string(self).unwrap_or_default();
        hasher.update(model_json.as_bytes());

        let result = hasher.finalize();
        format!("{:x}", result)
    }

    pub fn component(&self, reference: &str) -> Option<&ComponentNode> {
        self.components
            .resolve_reference(reference)
            .and_then(|id| self.components.get(id))
    }

    pub fn system(&self, name: &str) -> Option<&SystemNode> {
        self.systems.iter().find(|s| s.name == name)
    }

    pub fn schedule(&self, key: &str) -> Option<&CompiledSchedule> {
        self.schedules.iter().find(|s| s.key == key)
    }

    pub fn air_loops(&self) -> impl Iterator<Item = &AirLoopNode> {
        self.systems.iter().flat_map(|s| s.air_loops.iter())
    }

    pub fn plant_loops(&self) -> impl Iterator<Item = &PlantLoopNode> {
        self.systems.iter().flat_map(|s| s.plant_loops.iter())
    }

    /// The HVAC system the building record points at.
    pub fn building_system(&self) -> &SystemNode {
        &self.systems[self.building.hvac_system.index()]
    }
}
