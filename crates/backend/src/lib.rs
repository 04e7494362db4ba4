//! `firstshift-backend` — the remote backend seam.
//!
//! The organization, membership and join-code procedures live server-side.
//! This crate defines the client contract for them ([`OrgBackend`]) with two
//! implementations: a REST/RPC client for the hosted backend and an in-memory
//! directory that simulates the server for tests and local development.

pub mod error;
pub mod in_memory;
pub mod records;
pub mod rest;
pub mod r#trait;

pub use error::BackendError;
pub use in_memory::{InMemoryBackend, InMemoryDirectory};
pub use records::{ActiveOrgRecord, JoinCode, JoinCodeRequest};
pub use rest::{RestBackend, RestConfig};
pub use r#trait::OrgBackend;
