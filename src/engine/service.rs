//! The permission decision procedure

use serde_json::Value;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace};

use crate::assertion::{AssertionLike, AssertionRequest, AssertionSet};
use crate::error::Result;
use crate::identity::IdentityRoleResolver;
use crate::role::RoleProvider;

/// Decides whether the current identity holds a permission
///
/// Each call resolves the identity's roles, checks permission ownership
/// through the role graph and then narrows a grant with assertions. Nothing
/// about the decision itself is cached between calls.
pub struct AuthorizationService {
    resolver: IdentityRoleResolver,
    provider: Arc<dyn RoleProvider>,
    assertions: AssertionSet,
}

impl AuthorizationService {
    /// Creates a service with no registered assertions
    pub fn new(resolver: IdentityRoleResolver, provider: Arc<dyn RoleProvider>) -> Self {
        Self {
            resolver,
            provider,
            assertions: AssertionSet::new(),
        }
    }

    /// Replaces the assertion set
    pub fn with_assertions(mut self, assertions: AssertionSet) -> Self {
        self.assertions = assertions;
        self
    }

    pub fn assertions(&self) -> &AssertionSet {
        &self.assertions
    }

    pub fn assertions_mut(&mut self) -> &mut AssertionSet {
        &mut self.assertions
    }

    pub fn resolver(&self) -> &IdentityRoleResolver {
        &self.resolver
    }

    pub fn provider(&self) -> &Arc<dyn RoleProvider> {
        &self.provider
    }

    /// Checks whether the current identity is granted `permission`
    ///
    /// # Arguments
    /// * `permission` - Permission name
    /// * `assertion` - Optional per-call assertion, AND-ed with the assertions
    ///   registered for `permission`
    /// * `context` - Optional application context handed to assertions
    ///
    /// # Returns
    /// `Ok(false)` when the identity has no roles or none of its roles owns
    /// the permission; assertions are not evaluated in either case. Otherwise
    /// the AND of every applicable assertion.
    ///
    /// # Errors
    /// - `RbacError::ProviderLoad` if the role provider fails to load
    /// - `RbacError::InvalidAssertion` if an assertion name is not registered
    ///
    /// # Examples
    ///
    /// ```rust
    /// use std::sync::Arc;
    /// use rbac::assertion::AssertionLike;
    /// use rbac::engine::AuthorizationService;
    /// use rbac::identity::{IdentityRoleResolver, StaticIdentity, StaticIdentitySource};
    /// use rbac::role::InMemoryRoleProvider;
    /// use rbac::types::RoleDefinition;
    ///
    /// let provider = InMemoryRoleProvider::new()
    ///     .with_role("member", RoleDefinition::new(Vec::<String>::new(), ["write"]));
    /// let source = StaticIdentitySource::new(StaticIdentity::new("alice", ["member"]));
    /// let service = AuthorizationService::new(
    ///     IdentityRoleResolver::new(Arc::new(source)),
    ///     Arc::new(provider),
    /// );
    ///
    /// assert!(service.is_granted("write", None, None).unwrap());
    /// assert!(!service.is_granted("delete", None, None).unwrap());
    ///
    /// let never = AssertionLike::function(|_, _| false);
    /// assert!(!service.is_granted("write", Some(&never), None).unwrap());
    /// ```
    pub fn is_granted(
        &self,
        permission: &str,
        assertion: Option<&AssertionLike>,
        context: Option<&Value>,
    ) -> Result<bool> {
        let (identity, roles) = self.resolver.resolve_with_identity();

        if roles.is_empty() {
            trace!(permission, "no roles resolved, denying");
            return Ok(false);
        }

        let graph = self.provider.graph()?;
        if !graph.has_permission(&roles, permission) {
            debug!(permission, roles = ?roles, granted = false, "permission not owned by any role");
            return Ok(false);
        }

        let request = AssertionRequest {
            permission,
            identity: identity.as_deref(),
            roles: &roles,
            context,
        };
        let granted = self.assertions.evaluate_all(assertion, &request)?;

        debug!(permission, roles = ?roles, granted, "authorization decided");
        Ok(granted)
    }

    /// Role names of the current identity, as assigned
    pub fn roles(&self) -> HashSet<String> {
        self.resolver.resolve()
    }

    /// Checks whether the current identity holds `role`, directly or through inheritance
    ///
    /// # Errors
    /// Returns `RbacError::ProviderLoad` if the role provider fails to load.
    pub fn has_role(&self, role: &str) -> Result<bool> {
        let roles = self.resolver.resolve();
        if roles.contains(role) {
            return Ok(true);
        }
        if roles.is_empty() {
            return Ok(false);
        }

        let graph = self.provider.graph()?;
        Ok(graph.inherited_roles(&roles).contains(role))
    }

    /// Role names of the current identity expanded with every inherited role
    ///
    /// # Errors
    /// Returns `RbacError::ProviderLoad` if the role provider fails to load.
    pub fn effective_roles(&self) -> Result<HashSet<String>> {
        let roles = self.resolver.resolve();
        if roles.is_empty() {
            return Ok(roles);
        }
        let graph = self.provider.graph()?;
        Ok(graph.inherited_roles(&roles))
    }
}

impl fmt::Debug for AuthorizationService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthorizationService")
            .field("resolver", &self.resolver)
            .field("provider", &self.provider.name())
            .field("assertions", &self.assertions)
            .finish()
    }
}
