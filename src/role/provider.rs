//! Role providers: the pluggable source of role definitions

use indexmap::IndexMap;
use std::sync::Arc;
use tracing::{debug, warn};

use super::cache::RoleCache;
use super::graph::RoleGraph;
use crate::error::{RbacError, Result};
use crate::types::RoleDefinition;

/// Default cache key used by [`CachedRoleProvider`]
pub const DEFAULT_CACHE_KEY: &str = "rbac.role_graph";

/// Source of role definitions
///
/// Implementations must be idempotent and free of side effects visible to
/// the engine. A failing load is reported as an error and never retried here.
pub trait RoleProvider: Send + Sync {
    /// Provider name, used in logs and load errors
    fn name(&self) -> &str {
        "provider"
    }

    /// Returns every role definition, keyed by role name
    fn roles(&self) -> Result<IndexMap<String, RoleDefinition>>;

    /// Builds a role graph snapshot from [`roles`](RoleProvider::roles)
    fn graph(&self) -> Result<Arc<RoleGraph>> {
        let definitions = self.roles().map_err(|err| match err {
            RbacError::ProviderLoad { message, .. } => RbacError::ProviderLoad {
                provider: self.name().to_string(),
                message,
            },
            other => other,
        })?;

        let graph = RoleGraph::from_definitions(&definitions)?;
        debug!(provider = self.name(), roles = graph.len(), "role graph built");
        Ok(Arc::new(graph))
    }
}

/// Provider over a static, in-memory set of role definitions
///
/// # Examples
///
/// ```rust
/// use rbac::role::{InMemoryRoleProvider, RoleProvider};
/// use rbac::types::RoleDefinition;
///
/// let provider = InMemoryRoleProvider::new()
///     .with_role("guest", RoleDefinition::new(Vec::<String>::new(), ["read"]))
///     .with_role("member", RoleDefinition::new(["guest"], ["write"]));
///
/// let graph = provider.graph().unwrap();
/// assert!(graph.has_permission(["member"], "read"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryRoleProvider {
    definitions: IndexMap<String, RoleDefinition>,
}

impl InMemoryRoleProvider {
    /// Creates an empty provider
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a provider from configured definitions
    pub fn from_definitions(definitions: IndexMap<String, RoleDefinition>) -> Self {
        Self { definitions }
    }

    /// Adds or replaces a role definition
    pub fn with_role(mut self, name: impl Into<String>, definition: RoleDefinition) -> Self {
        self.definitions.insert(name.into(), definition);
        self
    }
}

impl RoleProvider for InMemoryRoleProvider {
    fn name(&self) -> &str {
        "in_memory"
    }

    fn roles(&self) -> Result<IndexMap<String, RoleDefinition>> {
        Ok(self.definitions.clone())
    }
}

/// Wraps a provider and keeps its graph snapshots in a [`RoleCache`]
///
/// Only successful loads are cached; a failure propagates to the caller and
/// the next call asks the inner provider again. A load that overlaps an
/// invalidation is returned to its caller but never stored.
pub struct CachedRoleProvider<P> {
    inner: P,
    cache: Arc<dyn RoleCache>,
    cache_key: String,
}

impl<P: RoleProvider> CachedRoleProvider<P> {
    /// Wraps `inner`, caching under [`DEFAULT_CACHE_KEY`]
    pub fn new(inner: P, cache: Arc<dyn RoleCache>) -> Self {
        Self::with_cache_key(inner, cache, DEFAULT_CACHE_KEY)
    }

    /// Wraps `inner`, caching under an engine-supplied key
    pub fn with_cache_key(inner: P, cache: Arc<dyn RoleCache>, cache_key: impl Into<String>) -> Self {
        Self {
            inner,
            cache,
            cache_key: cache_key.into(),
        }
    }

    /// The backing cache
    pub fn cache(&self) -> &Arc<dyn RoleCache> {
        &self.cache
    }

    /// Drops every cached snapshot; the next lookup rebuilds from the inner provider
    pub fn invalidate(&self) {
        self.cache.invalidate_all();
    }
}

impl<P: RoleProvider> RoleProvider for CachedRoleProvider<P> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn roles(&self) -> Result<IndexMap<String, RoleDefinition>> {
        self.inner.roles()
    }

    fn graph(&self) -> Result<Arc<RoleGraph>> {
        if let Some(graph) = self.cache.get(&self.cache_key) {
            return Ok(graph);
        }

        let generation = self.cache.generation();
        let graph = self.inner.graph().inspect_err(|err| {
            warn!(provider = self.inner.name(), error = %err, "role provider load failed");
        })?;

        self.cache.put_if_current(&self.cache_key, Arc::clone(&graph), generation);
        Ok(graph)
    }
}

impl<P: RoleProvider + ?Sized> RoleProvider for Arc<P> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn roles(&self) -> Result<IndexMap<String, RoleDefinition>> {
        (**self).roles()
    }

    fn graph(&self) -> Result<Arc<RoleGraph>> {
        (**self).graph()
    }
}
