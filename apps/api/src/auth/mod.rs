//! Session verification for tokens issued by the external identity provider.
//!
//! The provider owns sign-up, sign-in and sessions. This module only checks
//! the session JWT it hands the browser and maps its subject onto a `users` row.

pub mod claims;
pub mod extractors;

pub use extractors::{AuthUser, Recruiter};
