mod seed;

pub use seed::{default_actions, default_menu_seed};

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

use crate::error::PermissionError;

/// Named capability booleans on one node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionFlags(BTreeMap<String, bool>);

impl ActionFlags {
    /// Every listed action present and off.
    pub fn none<S: AsRef<str>>(actions: &[S]) -> Self {
        Self(
            actions
                .iter()
                .map(|a| (a.as_ref().to_string(), false))
                .collect(),
        )
    }

    pub fn with(mut self, action: &str, granted: bool) -> Self {
        self.0.insert(action.to_string(), granted);
        self
    }

    pub fn get(&self, action: &str) -> Option<bool> {
        self.0.get(action).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, bool)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    fn flip(&mut self, action: &str) -> Option<bool> {
        let slot = self.0.get_mut(action)?;
        *slot = !*slot;
        Some(*slot)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionNode {
    pub name: String,
    pub actions: ActionFlags,
    #[serde(default)]
    pub submenus: Vec<PermissionNode>,
}

impl PermissionNode {
    pub fn new(name: impl Into<String>, actions: ActionFlags) -> Self {
        Self {
            name: name.into(),
            actions,
            submenus: Vec::new(),
        }
    }

    pub fn with_submenus(mut self, submenus: Vec<PermissionNode>) -> Self {
        self.submenus = submenus;
        self
    }
}

/// Owned copy of a tree, detached from further toggles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionSnapshot(Vec<PermissionNode>);

impl PermissionSnapshot {
    pub fn nodes(&self) -> &[PermissionNode] {
        &self.0
    }

    pub fn into_nodes(self) -> Vec<PermissionNode> {
        self.0
    }
}

/// Menu permission matrix. Nodes are addressed by a path of child indices
/// starting at the top-level list; toggles touch exactly one flag on one node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionTree {
    roots: Vec<PermissionNode>,
}

impl PermissionTree {
    pub fn new(seed: &[PermissionNode]) -> Result<Self, PermissionError> {
        let mut tree = Self::default();
        tree.reset(seed)?;
        Ok(tree)
    }

    pub fn nodes(&self) -> &[PermissionNode] {
        &self.roots
    }

    pub fn node(&self, path: &[usize]) -> Option<&PermissionNode> {
        let (first, rest) = path.split_first()?;
        let mut node = self.roots.get(*first)?;
        for i in rest {
            node = node.submenus.get(*i)?;
        }
        Some(node)
    }

    fn node_mut(&mut self, path: &[usize]) -> Option<&mut PermissionNode> {
        let (first, rest) = path.split_first()?;
        let mut node = self.roots.get_mut(*first)?;
        for i in rest {
            node = node.submenus.get_mut(*i)?;
        }
        Some(node)
    }

    /// Flips `action` on the node at `path` and returns its new value.
    pub fn toggle(&mut self, path: &[usize], action: &str) -> Result<bool, PermissionError> {
        let node = self
            .node_mut(path)
            .ok_or_else(|| PermissionError::InvalidPath {
                path: path.to_vec(),
            })?;
        let value = node
            .actions
            .flip(action)
            .ok_or_else(|| PermissionError::UnknownAction {
                path: path.to_vec(),
                action: action.to_string(),
            })?;
        tracing::debug!(?path, action, value, "permission toggled");
        Ok(value)
    }

    /// Replaces the tree with a deep copy of `seed`. Rejected seeds leave the tree as it was.
    pub fn reset(&mut self, seed: &[PermissionNode]) -> Result<(), PermissionError> {
        check_unique_names(seed)?;
        self.roots = seed.to_vec();
        Ok(())
    }

    pub fn serialize_for_save(&self) -> PermissionSnapshot {
        PermissionSnapshot(self.roots.clone())
    }
}

fn check_unique_names(nodes: &[PermissionNode]) -> Result<(), PermissionError> {
    let mut seen = HashSet::new();
    for n in nodes {
        if !seen.insert(n.name.as_str()) {
            return Err(PermissionError::DuplicateName {
                name: n.name.clone(),
            });
        }
        check_unique_names(&n.submenus)?;
    }
    Ok(())
}
