//! Assertion capability and its call-site representation

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use crate::identity::Identity;

/// Everything an assertion may inspect for one authorization check
#[derive(Debug, Clone, Copy)]
pub struct AssertionRequest<'a> {
    /// Permission being checked
    pub permission: &'a str,

    /// Current identity, `None` for anonymous callers
    pub identity: Option<&'a dyn Identity>,

    /// Role names resolved for the identity
    pub roles: &'a HashSet<String>,

    /// Application context supplied by the caller
    pub context: Option<&'a Value>,
}

/// A runtime predicate that can further restrict a role-granted decision
///
/// Assertions only ever narrow a decision: they run after the role check has
/// granted access and cannot turn a role denial into a grant.
pub trait Assertion: Send + Sync {
    fn assert(&self, request: &AssertionRequest<'_>) -> bool;
}

/// Closure form of an assertion, invoked with `(identity, context)`
pub type AssertionFn = dyn Fn(Option<&dyn Identity>, Option<&Value>) -> bool + Send + Sync;

/// An assertion as handed to `is_granted`
///
/// `Function` and `Object` are evaluated directly. `Named` refers to an
/// assertion registered in an [`AssertionSet`](super::AssertionSet) and is
/// looked up at evaluation time; an unknown name fails with
/// `RbacError::InvalidAssertion`.
#[derive(Clone)]
pub enum AssertionLike {
    Function(Arc<AssertionFn>),
    Object(Arc<dyn Assertion>),
    Named(String),
}

impl AssertionLike {
    /// Wraps a closure taking `(identity, context)`
    pub fn function<F>(f: F) -> Self
    where
        F: Fn(Option<&dyn Identity>, Option<&Value>) -> bool + Send + Sync + 'static,
    {
        AssertionLike::Function(Arc::new(f))
    }

    /// Wraps an object implementing [`Assertion`]
    pub fn object(assertion: impl Assertion + 'static) -> Self {
        AssertionLike::Object(Arc::new(assertion))
    }

    /// Refers to a registered assertion by name
    pub fn named(name: impl Into<String>) -> Self {
        AssertionLike::Named(name.into())
    }

    /// Short label for logs and errors
    pub fn label(&self) -> &str {
        match self {
            AssertionLike::Function(_) => "<function>",
            AssertionLike::Object(_) => "<object>",
            AssertionLike::Named(name) => name,
        }
    }
}

impl fmt::Debug for AssertionLike {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssertionLike::Named(name) => f.debug_tuple("Named").field(name).finish(),
            other => f.write_str(other.label()),
        }
    }
}

impl From<&str> for AssertionLike {
    fn from(name: &str) -> Self {
        AssertionLike::named(name)
    }
}

/// How the members of an [`AssertionGroup`] are combined
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    #[default]
    And,
    Or,
}

/// Several assertions combined into one, AND by default
///
/// Evaluation short-circuits. An empty AND group holds; an empty OR group does not.
pub struct AssertionGroup {
    condition: Condition,
    assertions: Vec<Arc<dyn Assertion>>,
}

impl AssertionGroup {
    pub fn new(condition: Condition) -> Self {
        Self {
            condition,
            assertions: Vec::new(),
        }
    }

    /// AND-group of `assertions`
    pub fn all_of(assertions: Vec<Arc<dyn Assertion>>) -> Self {
        Self {
            condition: Condition::And,
            assertions,
        }
    }

    /// OR-group of `assertions`
    pub fn any_of(assertions: Vec<Arc<dyn Assertion>>) -> Self {
        Self {
            condition: Condition::Or,
            assertions,
        }
    }

    pub fn with(mut self, assertion: impl Assertion + 'static) -> Self {
        self.assertions.push(Arc::new(assertion));
        self
    }

    pub fn condition(&self) -> Condition {
        self.condition
    }

    pub fn len(&self) -> usize {
        self.assertions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assertions.is_empty()
    }
}

impl Assertion for AssertionGroup {
    fn assert(&self, request: &AssertionRequest<'_>) -> bool {
        match self.condition {
            Condition::And => self.assertions.iter().all(|a| a.assert(request)),
            Condition::Or => self.assertions.iter().any(|a| a.assert(request)),
        }
    }
}

impl<F> Assertion for F
where
    F: Fn(&AssertionRequest<'_>) -> bool + Send + Sync,
{
    fn assert(&self, request: &AssertionRequest<'_>) -> bool {
        self(request)
    }
}
