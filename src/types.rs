//! Core role types shared by the role graph, providers and identities

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::error::{RbacError, Result};

/// Declarative role definition as supplied by a [`RoleProvider`](crate::role::RoleProvider)
///
/// # Examples
///
/// ```rust
/// use rbac::types::RoleDefinition;
///
/// let def: RoleDefinition = serde_json::from_str(
///     r#"{ "parents": ["member"], "permissions": ["delete"] }"#,
/// ).unwrap();
/// assert_eq!(def.parents, vec!["member".to_string()]);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoleDefinition {
    /// Roles this role inherits from
    #[serde(default)]
    pub parents: Vec<String>,

    /// Permissions owned directly by this role
    #[serde(default)]
    pub permissions: Vec<String>,
}

impl RoleDefinition {
    /// Creates a definition from parent and permission names
    pub fn new<P, Q>(parents: P, permissions: Q) -> Self
    where
        P: IntoIterator,
        P::Item: Into<String>,
        Q: IntoIterator,
        Q::Item: Into<String>,
    {
        Self {
            parents: parents.into_iter().map(Into::into).collect(),
            permissions: permissions.into_iter().map(Into::into).collect(),
        }
    }
}

/// An immutable role: a name, its parent roles and its directly owned permissions
///
/// Parents may name roles that do not exist; such edges are skipped during
/// resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    name: String,
    parents: BTreeSet<String>,
    permissions: BTreeSet<String>,
}

impl Role {
    /// Creates a role from its definition
    ///
    /// # Errors
    ///
    /// Returns `RbacError::InvalidRole` if the name, a parent or a permission is empty.
    pub fn new(name: impl Into<String>, definition: &RoleDefinition) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(RbacError::InvalidRole {
                role: name,
                reason: "role name cannot be empty".to_string(),
            });
        }
        if definition.parents.iter().any(|p| p.trim().is_empty()) {
            return Err(RbacError::InvalidRole {
                role: name,
                reason: "parent role name cannot be empty".to_string(),
            });
        }
        if definition.permissions.iter().any(|p| p.trim().is_empty()) {
            return Err(RbacError::InvalidRole {
                role: name,
                reason: "permission name cannot be empty".to_string(),
            });
        }

        Ok(Self {
            name,
            parents: definition.parents.iter().cloned().collect(),
            permissions: definition.permissions.iter().cloned().collect(),
        })
    }

    /// Role name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Names of the roles this role inherits from
    pub fn parents(&self) -> impl Iterator<Item = &str> {
        self.parents.iter().map(String::as_str)
    }

    /// Permissions owned directly (not inherited)
    pub fn permissions(&self) -> impl Iterator<Item = &str> {
        self.permissions.iter().map(String::as_str)
    }

    /// Checks direct ownership of a permission
    pub fn owns(&self, permission: &str) -> bool {
        self.permissions.contains(permission)
    }
}

/// A role as exposed by an identity: either a raw name or a full role object
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityRole {
    Name(String),
    Role(Role),
}

impl IdentityRole {
    /// The role name, regardless of representation
    pub fn name(&self) -> &str {
        match self {
            IdentityRole::Name(name) => name,
            IdentityRole::Role(role) => role.name(),
        }
    }
}

impl From<&str> for IdentityRole {
    fn from(name: &str) -> Self {
        IdentityRole::Name(name.to_string())
    }
}

impl From<String> for IdentityRole {
    fn from(name: String) -> Self {
        IdentityRole::Name(name)
    }
}

impl From<Role> for IdentityRole {
    fn from(role: Role) -> Self {
        IdentityRole::Role(role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_new() {
        let role = Role::new("admin", &RoleDefinition::new(["member"], ["delete"])).unwrap();
        assert_eq!(role.name(), "admin");
        assert_eq!(role.parents().collect::<Vec<_>>(), vec!["member"]);
        assert!(role.owns("delete"));
        assert!(!role.owns("write"));
    }

    #[test]
    fn test_role_empty_name() {
        let result = Role::new("", &RoleDefinition::default());
        assert!(matches!(result, Err(RbacError::InvalidRole { .. })));
    }

    #[test]
    fn test_role_empty_parent() {
        let result = Role::new("admin", &RoleDefinition::new([""], Vec::<String>::new()));
        assert!(matches!(result, Err(RbacError::InvalidRole { .. })));
    }

    #[test]
    fn test_identity_role_name() {
        let role = Role::new("member", &RoleDefinition::default()).unwrap();
        assert_eq!(IdentityRole::from(role).name(), "member");
        assert_eq!(IdentityRole::from("guest").name(), "guest");
    }

    #[test]
    fn test_definition_defaults() {
        let def: RoleDefinition = serde_json::from_str("{}").unwrap();
        assert!(def.parents.is_empty());
        assert!(def.permissions.is_empty());
    }
}
