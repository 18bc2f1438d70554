//! # Authorization Engine
//!
//! Permission decisions for the current identity.
//!
//! ## Decision procedure
//!
//! 1. Resolve the identity's role names; no roles means no grant
//! 2. Check permission ownership through the role hierarchy; a role denial is final
//! 3. AND the per-call assertion with every assertion registered for the permission
//!
//! Denials are `Ok(false)`. Errors are reserved for provider failures and
//! invalid assertions.

pub mod service;

pub use service::AuthorizationService;
