//! Named model nodes and the materials they receive
//!
//! The baked model is exported with seven nodes that need special materials.
//! They are looked up by exact name; a missing name is a configuration error
//! of the model file and is reported with every absent name at once.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AssemblyError {
    #[error("Model is missing required nodes: {}", .names.join(", "))]
    MissingNodes { names: Vec<&'static str> },
}

/// Material a node is drawn with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MaterialSlot {
    /// Unlit material showing the baked lighting texture
    Baked,
    /// Flat emissive color shared by the pole and torch lamps
    PoleLight,
    /// Flat emissive color of the camp fire
    FireLight,
    /// Animated gradient shader of the portal surface
    Portal,
}

/// The seven nodes of the model that get a material assigned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeRole {
    Baked,
    PoleLightA,
    PoleLightB,
    TorchLightA,
    TorchLightB,
    FireLight,
    PortalLight,
}

impl NodeRole {
    pub const ALL: [NodeRole; 7] = [
        NodeRole::Baked,
        NodeRole::PoleLightA,
        NodeRole::PoleLightB,
        NodeRole::TorchLightA,
        NodeRole::TorchLightB,
        NodeRole::FireLight,
        NodeRole::PortalLight,
    ];

    /// Node name in the exported model
    pub fn node_name(&self) -> &'static str {
        match self {
            NodeRole::Baked => "baked",
            NodeRole::PoleLightA => "poleLightA",
            NodeRole::PoleLightB => "poleLightB",
            NodeRole::TorchLightA => "torchLightA",
            NodeRole::TorchLightB => "torchLightB",
            NodeRole::FireLight => "fireLight",
            NodeRole::PortalLight => "portalLight",
        }
    }

    pub fn material_slot(&self) -> MaterialSlot {
        match self {
            NodeRole::Baked => MaterialSlot::Baked,
            NodeRole::PoleLightA
            | NodeRole::PoleLightB
            | NodeRole::TorchLightA
            | NodeRole::TorchLightB => MaterialSlot::PoleLight,
            NodeRole::FireLight => MaterialSlot::FireLight,
            NodeRole::PortalLight => MaterialSlot::Portal,
        }
    }

    pub fn from_node_name(name: &str) -> Option<NodeRole> {
        NodeRole::ALL.into_iter().find(|role| role.node_name() == name)
    }
}

/// Node ids bound to each role, in [`NodeRole::ALL`] order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeBindings<Id> {
    bindings: Vec<(NodeRole, Id)>,
}

impl<Id: Copy> NodeBindings<Id> {
    pub fn get(&self, role: NodeRole) -> Option<Id> {
        self.bindings
            .iter()
            .find(|(r, _)| *r == role)
            .map(|(_, id)| *id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeRole, Id)> + '_ {
        self.bindings.iter().copied()
    }

    /// Nodes paired with the material slot they receive
    pub fn assignments(&self) -> impl Iterator<Item = (Id, MaterialSlot)> + '_ {
        self.bindings
            .iter()
            .map(|(role, id)| (*id, role.material_slot()))
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

/// Bind every role to the first node whose name matches exactly
///
/// `nodes` must be given in search order (direct children of the model root
/// first) so that a shallower node wins over a deeper one with the same name.
pub fn resolve_nodes<'a, Id, I>(nodes: I) -> Result<NodeBindings<Id>, AssemblyError>
where
    Id: Copy,
    I: IntoIterator<Item = (Id, &'a str)>,
{
    let mut found: Vec<Option<Id>> = vec![None; NodeRole::ALL.len()];

    for (id, name) in nodes {
        if let Some(role) = NodeRole::from_node_name(name) {
            let slot = &mut found[role as usize];
            if slot.is_none() {
                *slot = Some(id);
            }
        }
    }

    let missing: Vec<&'static str> = NodeRole::ALL
        .iter()
        .zip(&found)
        .filter(|(_, id)| id.is_none())
        .map(|(role, _)| role.node_name())
        .collect();

    if !missing.is_empty() {
        return Err(AssemblyError::MissingNodes { names: missing });
    }

    let bindings = NodeRole::ALL
        .iter()
        .zip(found)
        .filter_map(|(role, id)| id.map(|id| (*role, id)))
        .collect();

    Ok(NodeBindings { bindings })
}
