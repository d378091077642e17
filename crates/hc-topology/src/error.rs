//! Resolution and topology error types.

use hc_schema::{EquipmentClass, LoopKind, ObjectType};

/// A name that does not resolve in the table it must come from.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("{referencing_entity}: {field} refers to unknown '{missing_name}'")]
pub struct DanglingReferenceError {
    pub referencing_entity: String,
    pub field: String,
    pub missing_name: String,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error(transparent)]
    Dangling(#[from] DanglingReferenceError),

    #[error("duplicate name '{name}' in {scope}")]
    DuplicateName { scope: String, name: String },
}

/// Structural or catalog violation inside one loop.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("loop '{loop_name}': {violation}")]
pub struct TopologyError {
    pub loop_name: String,
    pub violation: ViolationKind,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ViolationKind {
    #[error("supply path is empty")]
    EmptySupplyPath,

    #[error("supply path needs exactly one fan, found {found}")]
    AirMoverCount { found: usize },

    #[error("'{component}' ({class}) cannot sit on an air supply path")]
    NotAirSupplyEquipment {
        component: String,
        class: EquipmentClass,
    },

    #[error("supply path ends in '{component}', expected the fan as outlet")]
    OutletNotFan { component: String },

    #[error("outdoor air system '{component}' must be first on the supply path")]
    OutdoorAirSystemNotFirst { component: String },

    #[error("demand side has no branches")]
    NoDemandBranches,

    #[error("branch '{branch}' has no components")]
    EmptyBranch { branch: String },

    #[error("branch '{branch}' holds '{component}' ({class}), expected a terminal")]
    NonTerminalOnBranch {
        branch: String,
        component: String,
        class: EquipmentClass,
    },

    #[error("supply side declares no inlet node")]
    MissingInletNode,

    #[error("inlet node needs exactly one component, found {found}")]
    InletNodeCount { found: usize },

    #[error("inlet node component '{component}' is a {class}, expected a pump")]
    InletNodeNotPump {
        component: String,
        class: EquipmentClass,
    },

    #[error("supply branches need exactly one {kind} source, found {found}")]
    SourceCount { kind: LoopKind, found: usize },

    #[error("'{component}' ({object_type}) cannot source a {expected} loop")]
    SourceKindMismatch {
        component: String,
        object_type: ObjectType,
        expected: LoopKind,
    },

    #[error("'{component}' ({class}) is not allowed on plant supply branches")]
    UnexpectedSupplyComponent {
        component: String,
        class: EquipmentClass,
    },

    #[error("demand side is empty")]
    EmptyDemand,

    #[error("'{component}' ({object_type}) cannot consume from a {kind} loop")]
    InvalidConsumer {
        component: String,
        object_type: ObjectType,
        kind: LoopKind,
    },
}
