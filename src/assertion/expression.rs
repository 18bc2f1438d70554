//! CEL-backed assertions
//!
//! Expressions see four variables:
//! - `permission`: the permission being checked
//! - `roles`: list of resolved role names
//! - `authenticated`: whether an identity is present
//! - `context`: the caller-supplied context (`null` when absent)

use cel_interpreter::objects::{Key, Map, Value as CelValue};
use cel_interpreter::{Context, Program};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::warn;

use super::types::{Assertion, AssertionRequest};
use crate::error::{RbacError, Result};

/// Assertion defined by a CEL expression
///
/// The expression is compiled once at construction and the program is
/// shared by clones. Evaluation errors and non-boolean results fail closed.
///
/// # Examples
///
/// ```rust
/// use rbac::assertion::ExpressionAssertion;
///
/// let assertion = ExpressionAssertion::new("context.owner == context.user").unwrap();
/// assert_eq!(assertion.expression(), "context.owner == context.user");
///
/// assert!(ExpressionAssertion::new("context.owner ==").is_err());
/// ```
#[derive(Clone)]
pub struct ExpressionAssertion {
    expression: String,
    program: Arc<Program>,
}

impl ExpressionAssertion {
    /// Compiles `expression`
    ///
    /// # Errors
    ///
    /// Returns `RbacError::Expression` if the expression does not parse.
    pub fn new(expression: impl Into<String>) -> Result<Self> {
        let expression = expression.into();
        let program = Program::compile(&expression).map_err(|e| RbacError::Expression {
            expression: expression.clone(),
            error: format!("{:?}", e),
        })?;
        Ok(Self {
            expression,
            program: Arc::new(program),
        })
    }

    /// Source text of the expression
    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// Evaluates the expression, surfacing failures instead of failing closed
    pub fn evaluate(&self, request: &AssertionRequest<'_>) -> Result<bool> {
        let mut roles: Vec<&str> = request.roles.iter().map(String::as_str).collect();
        roles.sort_unstable();
        let roles: Vec<CelValue> = roles
            .into_iter()
            .map(|role| CelValue::String(role.to_string().into()))
            .collect();

        let mut context = Context::default();
        let _ = context.add_variable("permission", CelValue::String(request.permission.to_string().into()));
        let _ = context.add_variable("roles", CelValue::List(roles.into()));
        let _ = context.add_variable("authenticated", CelValue::Bool(request.identity.is_some()));
        let _ = context.add_variable("context", context_value(request.context));

        let result = self.program.execute(&context).map_err(|e| RbacError::Expression {
            expression: self.expression.clone(),
            error: format!("{:?}", e),
        })?;

        match result {
            CelValue::Bool(b) => Ok(b),
            other => Err(RbacError::Expression {
                expression: self.expression.clone(),
                error: format!("expression did not return a boolean: {:?}", other),
            }),
        }
    }
}

impl fmt::Debug for ExpressionAssertion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExpressionAssertion")
            .field("expression", &self.expression)
            .finish_non_exhaustive()
    }
}

impl PartialEq for ExpressionAssertion {
    fn eq(&self, other: &Self) -> bool {
        self.expression == other.expression
    }
}

impl Eq for ExpressionAssertion {}

/// Caller context as seen by expressions
///
/// An absent context and a JSON `null` are both CEL `null`. Numbers keep
/// their integer kind when they have one; objects become string-keyed maps.
fn context_value(value: Option<&Value>) -> CelValue {
    let Some(value) = value else {
        return CelValue::Null;
    };

    match value {
        Value::Null => CelValue::Null,
        Value::Bool(b) => CelValue::Bool(*b),
        Value::String(s) => CelValue::String(s.clone().into()),
        Value::Number(n) => n
            .as_i64()
            .map(CelValue::Int)
            .or_else(|| n.as_u64().map(CelValue::UInt))
            .or_else(|| n.as_f64().map(CelValue::Float))
            .unwrap_or(CelValue::Null),
        Value::Array(items) => {
            let items: Vec<CelValue> = items.iter().map(|item| context_value(Some(item))).collect();
            CelValue::List(items.into())
        }
        Value::Object(fields) => {
            let map: HashMap<Key, CelValue> = fields
                .iter()
                .map(|(name, field)| (Key::from(name.clone()), context_value(Some(field))))
                .collect();
            CelValue::Map(Map { map: Arc::new(map) })
        }
    }
}

impl Assertion for ExpressionAssertion {
    fn assert(&self, request: &AssertionRequest<'_>) -> bool {
        match self.evaluate(request) {
            Ok(result) => result,
            Err(err) => {
                warn!(expression = %self.expression, error = %err, "assertion expression failed, denying");
                false
            }
        }
    }
}
