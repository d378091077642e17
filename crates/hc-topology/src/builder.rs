//! Incremental component arena builder.

use std::collections::HashSet;

use hc_core::ComponentId;
use hc_schema::ComponentDef;

use crate::error::ResolveError;
use crate::index::NameIndex;
use crate::skeleton::{ComponentArena, ComponentNode};

/// Builder for the component arena.
///
/// Use `add_component` for every entry of the component table, then call
/// `build()` to freeze it. Sub-components are added recursively and are only
/// reachable through their owner's scope.
#[derive(Debug, Default)]
pub struct ComponentArenaBuilder {
    nodes: Vec<ComponentNode>,
    global: NameIndex,
    scopes: Vec<NameIndex>,
    next_id: u32,
}

impl ComponentArenaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a top-level component and its sub-components; returns its handle.
    ///
    /// Nothing is added when the name is already taken globally or a scope
    /// below it repeats a sub-component name.
    pub fn add_component(&mut self, def: &ComponentDef) -> Result<ComponentId, ResolveError> {
        if self.global.contains(&def.name) {
            return Err(ResolveError::DuplicateName {
                scope: "hvac_components".to_string(),
                name: def.name.clone(),
            });
        }
        if let Some(err) = duplicate_sub_component(def, &def.name) {
            return Err(err);
        }

        let id = self.insert_node(def, None, def.name.clone());
        // Presence was checked above.
        let _ = self.global.insert(def.name.clone(), id);
        Ok(id)
    }

    fn insert_node(
        &mut self,
        def: &ComponentDef,
        owner: Option<ComponentId>,
        path: String,
    ) -> ComponentId {
        let id = ComponentId::from_index(self.next_id);
        self.next_id += 1;

        self.nodes.push(ComponentNode {
            id,
            name: def.name.clone(),
            path: path.clone(),
            object_type: def.object_type,
            attributes: def.attributes.clone(),
            owner,
            sub_components: Vec::with_capacity(def.sub_components.len()),
        });
        self.scopes.push(NameIndex::new());

        for sub in &def.sub_components {
            let sub_id = self.insert_node(sub, Some(id), format!("{}.{}", path, sub.name));
            let _ = self.scopes[id.index()].insert(sub.name.clone(), sub_id);
            self.nodes[id.index()].sub_components.push(sub_id);
        }

        id
    }

    /// Freeze the arena.
    pub fn build(self) -> ComponentArena {
        ComponentArena {
            nodes: self.nodes,
            global: self.global,
            scopes: self.scopes,
        }
    }
}

fn duplicate_sub_component(def: &ComponentDef, path: &str) -> Option<ResolveError> {
    let mut seen = HashSet::new();
    for sub in &def.sub_components {
        if !seen.insert(sub.name.as_str()) {
            return Some(ResolveError::DuplicateName {
                scope: format!("sub_components of '{}'", path),
                name: sub.name.clone(),
            });
        }
        if let Some(err) = duplicate_sub_component(sub, &format!("{}.{}", path, sub.name)) {
            return Some(err);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use hc_schema::ObjectType;

    fn comp(name: &str, ty: ObjectType, subs: Vec<ComponentDef>) -> ComponentDef {
        ComponentDef {
            name: name.to_string(),
            object_type: ty,
            attributes: Default::default(),
            sub_components: subs,
        }
    }

    #[test]
    fn builder_assigns_sequential_ids() {
        let mut builder = ComponentArenaBuilder::new();
        let a = builder
            .add_component(&comp("a", ObjectType::PumpVariableSpeed, vec![]))
            .unwrap();
        let b = builder
            .add_component(&comp(
                "b",
                ObjectType::AirTerminalSingleDuctVAVReheat,
                vec![comp("reheat_coil", ObjectType::CoilHeatingWater, vec![])],
            ))
            .unwrap();
        let arena = builder.build();

        assert_eq!(a.index(), 0);
        assert_eq!(b.index(), 1);
        assert_eq!(arena.len(), 3);

        let reheat = arena[b].sub_components[0];
        assert_eq!(arena[reheat].path, "b.reheat_coil");
        assert_eq!(arena[reheat].owner, Some(b));
    }

    #[test]
    fn duplicate_global_name_rejected() {
        let mut builder = ComponentArenaBuilder::new();
        builder
            .add_component(&comp("a", ObjectType::PipeAdiabatic, vec![]))
            .unwrap();
        let err = builder
            .add_component(&comp("a", ObjectType::PumpVariableSpeed, vec![]))
            .unwrap_err();
        assert!(matches!(err, ResolveError::DuplicateName { .. }));
        assert_eq!(builder.build().len(), 1);
    }

    #[test]
    fn duplicate_sub_component_rejected_atomically() {
        let mut builder = ComponentArenaBuilder::new();
        let def = comp(
            "oa",
            ObjectType::AirLoopHVACOutdoorAirSystem,
            vec![
                comp("ctrl", ObjectType::ControllerOutdoorAir, vec![]),
                comp("ctrl", ObjectType::ControllerOutdoorAir, vec![]),
            ],
        );
        assert!(builder.add_component(&def).is_err());
        assert!(builder.build().is_empty());
    }

    #[test]
    fn sub_components_may_share_names_across_owners() {
        let mut builder = ComponentArenaBuilder::new();
        for owner in ["t1", "t2"] {
            builder
                .add_component(&comp(
                    owner,
                    ObjectType::AirTerminalSingleDuctVAVReheat,
                    vec![comp("reheat_coil", ObjectType::CoilHeatingWater, vec![])],
                ))
                .unwrap();
        }
        let arena = builder.build();
        let r1 = arena.resolve_reference("t1.reheat_coil").unwrap();
        let r2 = arena.resolve_reference("t2.reheat_coil").unwrap();
        assert_ne!(r1, r2);
    }
}
