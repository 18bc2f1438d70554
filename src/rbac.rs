//! Configuration-driven entry point wiring roles, assertions and guards

use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info};

use crate::assertion::{AssertionLike, AssertionSet, ExpressionAssertion};
use crate::config::RbacConfig;
use crate::engine::AuthorizationService;
use crate::error::Result;
use crate::guard::{GuardDecision, GuardEngine, RequestDescriptor};
use crate::identity::{IdentityRoleResolver, IdentitySource};
use crate::role::{CacheStats, CachedRoleProvider, InMemoryRoleCache, InMemoryRoleProvider, RoleCache, RoleProvider};

/// Authorization service and guard engine built from one [`RbacConfig`]
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
/// use rbac::{Rbac, RbacConfig, RequestDescriptor};
/// use rbac::identity::{StaticIdentity, StaticIdentitySource};
///
/// let config = RbacConfig::from_json_str(r#"{
///     "roles": {
///         "member": { "permissions": ["post.write"] },
///         "admin":  { "parents": ["member"], "permissions": ["post.delete"] }
///     },
///     "guards": { "route": [ { "route": "posts/*", "roles": ["member"] } ] }
/// }"#).unwrap();
///
/// let source = StaticIdentitySource::new(StaticIdentity::new("alice", ["admin"]));
/// let rbac = Rbac::from_config(&config, Arc::new(source)).unwrap();
///
/// assert!(rbac.is_granted("post.write", None, None).unwrap());
/// assert!(rbac.is_request_allowed(&RequestDescriptor::route("posts/edit")).unwrap());
/// assert!(!rbac.is_request_allowed(&RequestDescriptor::route("settings")).unwrap());
/// ```
pub struct Rbac {
    service: AuthorizationService,
    guards: GuardEngine,
    cache: Option<Arc<dyn RoleCache>>,
}

impl Rbac {
    /// Builds everything from `config`, with roles taken from `config.roles`
    ///
    /// # Errors
    ///
    /// Fails on any configuration error reported by [`RbacConfig::validate`].
    pub fn from_config(config: &RbacConfig, identity_source: Arc<dyn IdentitySource>) -> Result<Self> {
        let provider = InMemoryRoleProvider::from_definitions(config.roles.clone());
        Self::with_provider(config, identity_source, Arc::new(provider))
    }

    /// Builds everything from `config`, with roles taken from `provider`
    ///
    /// `config.roles` is ignored. When caching is enabled the provider is
    /// wrapped in a [`CachedRoleProvider`].
    pub fn with_provider(
        config: &RbacConfig,
        identity_source: Arc<dyn IdentitySource>,
        provider: Arc<dyn RoleProvider>,
    ) -> Result<Self> {
        config.validate()?;

        let (provider, cache) = if config.cache.enabled {
            let cache: Arc<dyn RoleCache> = Arc::new(InMemoryRoleCache::from_config(&config.cache));
            let cached: Arc<dyn RoleProvider> = Arc::new(CachedRoleProvider::new(provider, Arc::clone(&cache)));
            (cached, Some(cache))
        } else {
            (provider, None)
        };

        let mut assertions = AssertionSet::from_map(&config.assertion_map);
        for (name, expression) in &config.expressions {
            assertions.register(name.clone(), ExpressionAssertion::new(expression.clone())?);
        }

        let resolver = IdentityRoleResolver::new(identity_source).with_guest_role(config.guest_role.clone());
        let service = AuthorizationService::new(resolver, provider).with_assertions(assertions);
        let guards = GuardEngine::new(config.protection_policy, &config.guards)?;

        info!(
            roles = config.roles.len(),
            expressions = config.expressions.len(),
            cache = config.cache.enabled,
            "rbac initialized"
        );

        Ok(Self {
            service,
            guards,
            cache,
        })
    }

    /// See [`AuthorizationService::is_granted`]
    pub fn is_granted(
        &self,
        permission: &str,
        assertion: Option<&AssertionLike>,
        context: Option<&Value>,
    ) -> Result<bool> {
        self.service.is_granted(permission, assertion, context)
    }

    /// Runs every guard stage for the current identity
    ///
    /// The caller's roles are expanded with their ancestors first, so a rule
    /// admitting `member` also admits roles inheriting from `member`.
    ///
    /// # Errors
    ///
    /// Returns `RbacError::ProviderLoad` if the role provider fails to load.
    pub fn is_request_allowed(&self, request: &RequestDescriptor) -> Result<bool> {
        let decisions = self.evaluate_request(request)?;
        Ok(decisions.iter().all(|decision| decision.allowed))
    }

    /// Guard decisions for `request`, stopping after the first denial
    pub fn evaluate_request(&self, request: &RequestDescriptor) -> Result<Vec<GuardDecision>> {
        let roles = self.effective_roles()?;
        let decisions = self.guards.evaluate(request, &roles);
        debug!(request = ?request, decisions = decisions.len(), "request guarded");
        Ok(decisions)
    }

    /// Current roles plus every inherited role
    pub fn effective_roles(&self) -> Result<HashSet<String>> {
        self.service.effective_roles()
    }

    /// Drops every cached role graph; the next check reloads from the provider
    pub fn invalidate_cache(&self) {
        if let Some(cache) = &self.cache {
            cache.invalidate_all();
            info!("role graph cache invalidated");
        }
    }

    /// Role graph cache statistics, `None` when caching is disabled
    pub fn cache_stats(&self) -> Option<CacheStats> {
        self.cache.as_ref().map(|cache| cache.stats())
    }

    pub fn service(&self) -> &AuthorizationService {
        &self.service
    }

    pub fn service_mut(&mut self) -> &mut AuthorizationService {
        &mut self.service
    }

    pub fn guards(&self) -> &GuardEngine {
        &self.guards
    }
}

impl std::fmt::Debug for Rbac {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rbac")
            .field("service", &self.service)
            .field("guards", &self.guards)
            .field("cached", &self.cache.is_some())
            .finish()
    }
}
