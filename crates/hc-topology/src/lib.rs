//! hc-topology: reference resolution and loop topology validation.
//!
//! Provides:
//! - Component arena with global and per-owner name scopes
//! - Reference resolver turning names into handles (`Skeleton`)
//! - Topology validator for air and plant loops
//!
//! # Example
//!
//! ```
//! use hc_schema::{ComponentDef, ObjectType};
//! use hc_topology::ComponentArenaBuilder;
//!
//! let mut builder = ComponentArenaBuilder::new();
//! let fan = ComponentDef {
//!     name: "fan_vav".to_string(),
//!     object_type: ObjectType::FanVariableVolume,
//!     attributes: Default::default(),
//!     sub_components: vec![],
//! };
//! let id = builder.add_component(&fan).unwrap();
//! let arena = builder.build();
//!
//! assert_eq!(arena.resolve_reference("fan_vav"), Some(id));
//! ```

pub mod builder;
pub mod error;
pub mod index;
pub mod resolve;
pub mod skeleton;
pub mod topology;

pub use builder::ComponentArenaBuilder;
pub use error::{DanglingReferenceError, ResolveError, TopologyError, ViolationKind};
pub use index::NameIndex;
pub use resolve::resolve;
pub use skeleton::{
    AirLoopNode, BranchNode, BuildingLinks, ComponentArena, ComponentNode, PlantLoopNode,
    ScheduleLinks, Skeleton, SystemNode,
};
pub use topology::validate_topology;
