//! Credential check for the mutating catalog routes.
//!
//! Routing only sees the [`Authorizer`] trait, so the shared-secret
//! implementation can be swapped for a real identity provider.

pub mod credentials;

pub use credentials::{Authorizer, StaticCredentials};
