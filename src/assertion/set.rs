//! Named assertion registry and permission → assertion map

use indexmap::IndexMap;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use super::types::{Assertion, AssertionLike, AssertionRequest};
use crate::error::{RbacError, Result};

/// Assertions registered by name and attached to permissions
///
/// Every assertion attached to a permission is AND-ed with the per-call
/// assertion passed to `is_granted`. Names are resolved lazily, at evaluation
/// time, so a configuration can reference assertions registered later.
///
/// # Examples
///
/// ```rust
/// use rbac::assertion::{AssertionLike, AssertionRequest, AssertionSet};
///
/// let mut set = AssertionSet::new();
/// set.register("weekday", |_: &AssertionRequest<'_>| true);
/// set.attach("report.export", AssertionLike::named("weekday"));
///
/// assert_eq!(set.for_permission("report.export").len(), 1);
/// assert!(set.for_permission("report.view").is_empty());
/// ```
#[derive(Default, Clone)]
pub struct AssertionSet {
    registry: HashMap<String, Arc<dyn Assertion>>,
    by_permission: IndexMap<String, Vec<AssertionLike>>,
}

impl AssertionSet {
    /// Creates an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a set from a permission → assertion-name map
    pub fn from_map(map: &IndexMap<String, Vec<String>>) -> Self {
        let mut set = Self::new();
        for (permission, names) in map {
            for name in names {
                set.attach(permission.clone(), AssertionLike::named(name.clone()));
            }
        }
        set
    }

    /// Registers an assertion under `name`, replacing any previous one
    pub fn register(&mut self, name: impl Into<String>, assertion: impl Assertion + 'static) {
        self.register_arc(name, Arc::new(assertion));
    }

    /// Registers a shared assertion under `name`
    pub fn register_arc(&mut self, name: impl Into<String>, assertion: Arc<dyn Assertion>) {
        let name = name.into();
        debug!(assertion = %name, "assertion registered");
        self.registry.insert(name, assertion);
    }

    /// Checks whether an assertion is registered under `name`
    pub fn is_registered(&self, name: &str) -> bool {
        self.registry.contains_key(name)
    }

    /// Attaches an assertion to a permission
    pub fn attach(&mut self, permission: impl Into<String>, assertion: AssertionLike) {
        self.by_permission
            .entry(permission.into())
            .or_default()
            .push(assertion);
    }

    /// Assertions attached to `permission`
    pub fn for_permission(&self, permission: &str) -> &[AssertionLike] {
        self.by_permission
            .get(permission)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Checks whether any assertion is attached to `permission`
    pub fn has_assertions(&self, permission: &str) -> bool {
        !self.for_permission(permission).is_empty()
    }

    /// Evaluates a single assertion
    ///
    /// # Errors
    ///
    /// Returns `RbacError::InvalidAssertion` for a name nothing is registered under.
    pub fn evaluate(&self, assertion: &AssertionLike, request: &AssertionRequest<'_>) -> Result<bool> {
        let granted = match assertion {
            AssertionLike::Function(f) => (**f)(request.identity, request.context),
            AssertionLike::Object(object) => object.assert(request),
            AssertionLike::Named(name) => self
                .registry
                .get(name)
                .ok_or_else(|| {
                    RbacError::invalid_assertion(
                        name.clone(),
                        "no assertion is registered under this name",
                    )
                })?
                .assert(request),
        };

        debug!(
            assertion = assertion.label(),
            permission = request.permission,
            granted,
            "assertion evaluated"
        );
        Ok(granted)
    }

    /// AND of `extra` (if any) and every assertion attached to the request's permission
    ///
    /// Stops at the first assertion returning false. The per-call assertion is
    /// evaluated first.
    pub fn evaluate_all(
        &self,
        extra: Option<&AssertionLike>,
        request: &AssertionRequest<'_>,
    ) -> Result<bool> {
        for assertion in extra.into_iter().chain(self.for_permission(request.permission)) {
            if !self.evaluate(assertion, request)? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

impl fmt::Debug for AssertionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut registered: Vec<&String> = self.registry.keys().collect();
        registered.sort();
        f.debug_struct("AssertionSet")
            .field("registered", &registered)
            .field("by_permission", &self.by_permission)
            .finish()
    }
}
