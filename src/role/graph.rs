//! Role hierarchy graph and permission resolution
//!
//! The parent relation is treated as possibly cyclic. Every traversal keeps
//! a visited set keyed by role name, so a misconfigured hierarchy such as
//! `a -> b -> a` still terminates.

use std::collections::{HashMap, HashSet, VecDeque};

use indexmap::IndexMap;
use tracing::trace;

use crate::error::{RbacError, Result};
use crate::types::{Role, RoleDefinition};

/// Immutable snapshot of all roles, keyed by name
///
/// A graph is built once from provider data and never mutated afterwards;
/// configuration changes produce a new graph.
///
/// # Examples
///
/// ```rust
/// use indexmap::IndexMap;
/// use rbac::role::RoleGraph;
/// use rbac::types::RoleDefinition;
///
/// let mut defs = IndexMap::new();
/// defs.insert("guest".to_string(), RoleDefinition::new(Vec::<String>::new(), ["read"]));
/// defs.insert("member".to_string(), RoleDefinition::new(["guest"], ["write"]));
///
/// let graph = RoleGraph::from_definitions(&defs).unwrap();
/// assert!(graph.has_permission(["member"], "read"));
/// assert!(!graph.has_permission(["guest"], "write"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct RoleGraph {
    roles: HashMap<String, Role>,
}

impl RoleGraph {
    /// Creates an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a graph from provider definitions
    ///
    /// # Errors
    ///
    /// Returns `RbacError::InvalidRole` if any definition is malformed.
    /// Dangling parent references are accepted.
    pub fn from_definitions(definitions: &IndexMap<String, RoleDefinition>) -> Result<Self> {
        let roles = definitions
            .iter()
            .map(|(name, def)| Role::new(name.clone(), def).map(|role| (name.clone(), role)))
            .collect::<Result<HashMap<_, _>>>()?;

        Ok(Self { roles })
    }

    /// Builds a graph from already constructed roles
    pub fn from_roles(roles: impl IntoIterator<Item = Role>) -> Self {
        Self {
            roles: roles
                .into_iter()
                .map(|role| (role.name().to_string(), role))
                .collect(),
        }
    }

    /// Looks up a role by name
    pub fn get(&self, name: &str) -> Option<&Role> {
        self.roles.get(name)
    }

    /// Checks whether a role with this name exists
    pub fn contains(&self, name: &str) -> bool {
        self.roles.contains_key(name)
    }

    /// Number of roles in the graph
    pub fn len(&self) -> usize {
        self.roles.len()
    }

    /// Checks if the graph has no roles
    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }

    /// Checks whether any of `role_names` owns `permission`, directly or through ancestors
    ///
    /// Breadth-first over parent edges with a visited set. Returns on the first
    /// owning role. Unknown role names contribute nothing.
    pub fn has_permission<I, S>(&self, role_names: I, permission: &str) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut visited: HashSet<&str> = HashSet::new();
        let mut queue: VecDeque<&str> = VecDeque::new();

        for name in role_names {
            if let Some((key, _)) = self.roles.get_key_value(name.as_ref()) {
                if visited.insert(key.as_str()) {
                    queue.push_back(key.as_str());
                }
            } else {
                trace!(role = name.as_ref(), "skipping unknown role");
            }
        }

        while let Some(current) = queue.pop_front() {
            let Some(role) = self.roles.get(current) else {
                continue;
            };

            if role.owns(permission) {
                trace!(role = current, permission, "permission owned");
                return true;
            }

            for parent in role.parents() {
                match self.roles.get_key_value(parent) {
                    Some((key, _)) => {
                        if visited.insert(key.as_str()) {
                            queue.push_back(key.as_str());
                        }
                    }
                    None => trace!(role = current, parent, "skipping unknown parent role"),
                }
            }
        }

        false
    }

    /// Returns the given roles plus every ancestor reachable through parent edges
    ///
    /// Unknown names are kept as-is (an identity may carry roles the graph does
    /// not define) but are not expanded.
    pub fn inherited_roles<I, S>(&self, role_names: I) -> HashSet<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut visited: HashSet<String> = HashSet::new();
        let mut queue: VecDeque<String> = VecDeque::new();

        for name in role_names {
            let name = name.as_ref().to_string();
            if visited.insert(name.clone()) {
                queue.push_back(name);
            }
        }

        while let Some(current) = queue.pop_front() {
            if let Some(role) = self.roles.get(&current) {
                for parent in role.parents() {
                    if visited.insert(parent.to_string()) {
                        queue.push_back(parent.to_string());
                    }
                }
            }
        }

        visited
    }

    /// Reports the first parent cycle found, if any
    ///
    /// Evaluation never needs this; it exists so hosts can reject suspicious
    /// configurations at load time.
    ///
    /// # Errors
    ///
    /// Returns `RbacError::InvalidRole` naming the cycle path.
    pub fn detect_cycles(&self) -> Result<()> {
        let mut state: HashMap<&str, VisitState> = HashMap::new();

        let mut names: Vec<&str> = self.roles.keys().map(String::as_str).collect();
        names.sort_unstable();

        for name in names {
            if !state.contains_key(name) {
                self.dfs_cycle_detection(name, &mut state, &mut Vec::new())?;
            }
        }

        Ok(())
    }

    fn dfs_cycle_detection<'a>(
        &'a self,
        node: &'a str,
        state: &mut HashMap<&'a str, VisitState>,
        path: &mut Vec<&'a str>,
    ) -> Result<()> {
        match state.get(node) {
            Some(VisitState::Visiting) => {
                path.push(node);
                return Err(RbacError::InvalidRole {
                    role: node.to_string(),
                    reason: format!("circular inheritance: {}", path.join(" -> ")),
                });
            }
            Some(VisitState::Visited) => return Ok(()),
            None => {}
        }

        state.insert(node, VisitState::Visiting);
        path.push(node);

        if let Some(role) = self.roles.get(node) {
            for parent in role.parents() {
                if let Some((key, _)) = self.roles.get_key_value(parent) {
                    self.dfs_cycle_detection(key.as_str(), state, path)?;
                }
            }
        }

        path.pop();
        state.insert(node, VisitState::Visited);
        Ok(())
    }
}

#[derive(Debug, PartialEq, Clone, Copy)]
enum VisitState {
    Visiting,
    Visited,
}
