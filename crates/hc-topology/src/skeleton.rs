//! Resolved object graph: every cross-reference replaced by a handle.

use std::ops::Index;

use hc_core::{ComponentId, ConstructionSetId, LoopId, ScheduleId, SpaceTypeId, SystemId};
use hc_schema::{Attributes, LoopKind, ObjectType};
use serde::Serialize;

use crate::index::NameIndex;

/// A component or sub-component in the arena.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComponentNode {
    pub id: ComponentId,
    pub name: String,
    /// Qualified path: `owner.sub` for sub-components, the name otherwise.
    pub path: String,
    pub object_type: ObjectType,
    pub attributes: Attributes,
    pub owner: Option<ComponentId>,
    pub sub_components: Vec<ComponentId>,
}

/// All components, indexed by `ComponentId`.
///
/// Top-level names live in the global scope; each component owns a local
/// scope holding its sub-components.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ComponentArena {
    pub(crate) nodes: Vec<ComponentNode>,
    #[serde(skip)]
    pub(crate) global: NameIndex,
    #[serde(skip)]
    pub(crate) scopes: Vec<NameIndex>,
}

impl ComponentArena {
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: ComponentId) -> Option<&ComponentNode> {
        self.nodes.get(id.index())
    }

    pub fn get_mut(&mut self, id: ComponentId) -> Option<&mut ComponentNode> {
        self.nodes.get_mut(id.index())
    }

    pub fn iter(&self) -> impl Iterator<Item = &ComponentNode> {
        self.nodes.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut ComponentNode> {
        self.nodes.iter_mut()
    }

    /// Top-level component by name; sub-components are never visible here.
    pub fn lookup_global(&self, name: &str) -> Option<ComponentId> {
        self.global.get(name)
    }

    /// Look `name` up in `owner`'s sub-components first, then globally.
    pub fn lookup_in_scope(&self, owner: ComponentId, name: &str) -> Option<ComponentId> {
        self.scopes
            .get(owner.index())
            .and_then(|scope| scope.get(name))
            .or_else(|| self.lookup_global(name))
    }

    /// Resolve a plain or dotted (`owner.sub`) component reference.
    pub fn resolve_reference(&self, reference: &str) -> Option<ComponentId> {
        let mut segments = reference.split('.');
        let first = segments.next()?;
        let mut current = self.lookup_global(first)?;
        for segment in segments {
            current = self.lookup_in_scope(current, segment)?;
        }
        Some(current)
    }
}

impl Index<ComponentId> for ComponentArena {
    type Output = ComponentNode;

    /// Panics on a handle from another arena.
    fn index(&self, id: ComponentId) -> &ComponentNode {
        &self.nodes[id.index()]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BranchNode {
    pub name: String,
    pub components: Vec<ComponentId>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AirLoopNode {
    pub id: LoopId,
    pub name: String,
    pub supply: Vec<ComponentId>,
    pub demand_branches: Vec<BranchNode>,
    /// Loop-level settings; seeded from the owning system, then overridden by measures.
    pub attributes: Attributes,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlantLoopNode {
    pub id: LoopId,
    pub name: String,
    pub kind: LoopKind,
    pub inlet_node: Vec<ComponentId>,
    pub supply_branches: Vec<ComponentId>,
    pub demand_branches: Vec<ComponentId>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SystemNode {
    pub id: SystemId,
    pub name: String,
    pub air_loops: Vec<AirLoopNode>,
    pub plant_loops: Vec<PlantLoopNode>,
    pub availability_schedule: Option<ScheduleId>,
    pub attributes: Attributes,
}

/// Resolved links of one schedule: the day profile each rule selects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduleLinks {
    pub id: ScheduleId,
    pub key: String,
    /// Day index (into the schedule's `days`) per rule, in rule order.
    pub rule_days: Vec<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BuildingLinks {
    pub space_type: SpaceTypeId,
    pub construction_set: ConstructionSetId,
    pub hvac_system: SystemId,
}

/// The validated skeleton the later stages run over.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Skeleton {
    pub components: ComponentArena,
    pub systems: Vec<SystemNode>,
    pub schedules: Vec<ScheduleLinks>,
    pub building: BuildingLinks,
}

impl Skeleton {
    pub fn air_loops(&self) -> impl Iterator<Item = &AirLoopNode> {
        self.systems.iter().flat_map(|s| s.air_loops.iter())
    }

    pub fn plant_loops(&self) -> impl Iterator<Item = &PlantLoopNode> {
        self.systems.iter().flat_map(|s| s.plant_loops.iter())
    }
}
