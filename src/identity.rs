//! Identities and identity-to-role resolution

use std::collections::HashSet;
use std::fmt;
use std::sync::{Arc, RwLock};
use tracing::trace;

use crate::types::IdentityRole;

/// The current actor, as far as authorization is concerned
pub trait Identity: Send + Sync + fmt::Debug {
    /// Roles assigned to this identity, as names or role objects
    fn roles(&self) -> Vec<IdentityRole>;
}

/// Supplies the identity of the current caller, if any
pub trait IdentitySource: Send + Sync {
    /// The current identity, `None` for anonymous callers
    fn identity(&self) -> Option<Arc<dyn Identity>>;
}

/// Plain identity carrying a fixed list of roles
///
/// # Examples
///
/// ```rust
/// use rbac::identity::{Identity, StaticIdentity};
///
/// let identity = StaticIdentity::new("alice", ["member"]);
/// assert_eq!(identity.id(), "alice");
/// assert_eq!(identity.roles().len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticIdentity {
    id: String,
    roles: Vec<IdentityRole>,
}

impl StaticIdentity {
    pub fn new<I, R>(id: impl Into<String>, roles: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<IdentityRole>,
    {
        Self {
            id: id.into(),
            roles: roles.into_iter().map(Into::into).collect(),
        }
    }

    /// Identity id
    pub fn id(&self) -> &str {
        &self.id
    }
}

impl Identity for StaticIdentity {
    fn roles(&self) -> Vec<IdentityRole> {
        self.roles.clone()
    }
}

/// Identity source holding a swappable current identity
///
/// Useful for tests and for hosts that establish identity once per request.
#[derive(Debug, Default)]
pub struct StaticIdentitySource {
    current: RwLock<Option<Arc<dyn Identity>>>,
}

impl StaticIdentitySource {
    /// Source with no identity (anonymous)
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Source returning `identity`
    pub fn new(identity: impl Identity + 'static) -> Self {
        let identity: Arc<dyn Identity> = Arc::new(identity);
        Self {
            current: RwLock::new(Some(identity)),
        }
    }

    /// Replaces the current identity
    pub fn set(&self, identity: Option<Arc<dyn Identity>>) {
        let mut current = self.current.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        *current = identity;
    }
}

impl IdentitySource for StaticIdentitySource {
    fn identity(&self) -> Option<Arc<dyn Identity>> {
        self.current
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

/// Maps the current identity to its set of role names
///
/// Caches nothing: every call asks the identity source again.
#[derive(Clone)]
pub struct IdentityRoleResolver {
    source: Arc<dyn IdentitySource>,
    guest_role: Option<String>,
}

impl IdentityRoleResolver {
    /// Resolver over `source`; anonymous callers resolve to no roles
    pub fn new(source: Arc<dyn IdentitySource>) -> Self {
        Self {
            source,
            guest_role: None,
        }
    }

    /// Anonymous callers resolve to `{guest_role}` instead of the empty set
    pub fn with_guest_role(mut self, guest_role: Option<String>) -> Self {
        self.guest_role = guest_role;
        self
    }

    /// Current identity, straight from the source
    pub fn identity(&self) -> Option<Arc<dyn Identity>> {
        self.source.identity()
    }

    /// Role names of the current identity
    pub fn resolve(&self) -> HashSet<String> {
        self.resolve_with_identity().1
    }

    /// Current identity together with its role names, fetched once
    pub fn resolve_with_identity(&self) -> (Option<Arc<dyn Identity>>, HashSet<String>) {
        let identity = self.source.identity();
        let roles = match &identity {
            Some(identity) => Self::role_names(identity.as_ref()),
            None => self.guest_role.iter().cloned().collect(),
        };
        trace!(roles = ?roles, anonymous = identity.is_none(), "identity roles resolved");
        (identity, roles)
    }

    /// Normalizes an identity's roles to names
    pub fn role_names(identity: &dyn Identity) -> HashSet<String> {
        identity
            .roles()
            .iter()
            .map(|role| role.name().to_string())
            .collect()
    }
}

impl fmt::Debug for IdentityRoleResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentityRoleResolver")
            .field("guest_role", &self.guest_role)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Role, RoleDefinition};

    #[test]
    fn test_anonymous_resolves_to_empty() {
        let resolver = IdentityRoleResolver::new(Arc::new(StaticIdentitySource::anonymous()));
        assert!(resolver.resolve().is_empty());
    }

    #[test]
    fn test_anonymous_with_guest_role() {
        let resolver = IdentityRoleResolver::new(Arc::new(StaticIdentitySource::anonymous()))
            .with_guest_role(Some("guest".to_string()));
        let roles = resolver.resolve();
        assert_eq!(roles.len(), 1);
        assert!(roles.contains("guest"));
    }

    #[test]
    fn test_normalizes_names_and_role_objects() {
        let admin = Role::new("admin", &RoleDefinition::default()).unwrap();
        let identity = StaticIdentity::new(
            "alice",
            vec![IdentityRole::from("member"), IdentityRole::from(admin), IdentityRole::from("member")],
        );
        let resolver = IdentityRoleResolver::new(Arc::new(StaticIdentitySource::new(identity)));

        let roles = resolver.resolve();
        assert_eq!(roles.len(), 2);
        assert!(roles.contains("member"));
        assert!(roles.contains("admin"));
    }

    #[test]
    fn test_identity_swap_is_observed() {
        let source = Arc::new(StaticIdentitySource::anonymous());
        let resolver = IdentityRoleResolver::new(source.clone());
        assert!(resolver.resolve().is_empty());

        source.set(Some(Arc::new(StaticIdentity::new("bob", ["admin"]))));
        assert!(resolver.resolve().contains("admin"));

        source.set(None);
        assert!(resolver.resolve().is_empty());
    }

    #[test]
    fn test_identity_with_no_roles() {
        let identity = StaticIdentity::new("carol", Vec::<String>::new());
        let resolver = IdentityRoleResolver::new(Arc::new(StaticIdentitySource::new(identity)));
        let (identity, roles) = resolver.resolve_with_identity();
        assert!(identity.is_some());
        assert!(roles.is_empty());
    }
}
