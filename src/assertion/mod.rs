//! # Assertion Module
//!
//! Runtime predicates that narrow a role-granted decision:
//! - [`Assertion`]: the object capability, `assert(request) -> bool`
//! - [`AssertionLike`]: what callers pass to `is_granted` (closure, object or registered name)
//! - [`AssertionSet`]: named registry plus permission → assertions map, AND-composed
//! - [`AssertionGroup`]: AND/OR composition of several assertions
//! - [`ExpressionAssertion`]: assertion written as a CEL expression

pub mod expression;
pub mod set;
pub mod types;

pub use expression::ExpressionAssertion;
pub use set::AssertionSet;
pub use types::{Assertion, AssertionFn, AssertionGroup, AssertionLike, AssertionRequest, Condition};
