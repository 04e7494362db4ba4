//! `firstshift-auth` — client-side permission evaluator.
//!
//! Maps the role a user holds in their active organization to the capability
//! flags the client uses to decide what to offer. This crate performs no IO.
//!
//! These checks are a UX affordance only. The backend's row-level security is
//! the sole enforcement point; nothing here may grow logic the backend does not
//! mirror.

pub mod authorize;
pub mod capabilities;
pub mod membership;
pub mod roles;

pub use authorize::{authorize, authorize_availability_edit, AuthzError};
pub use capabilities::{Capabilities, Capability};
pub use membership::Membership;
pub use roles::Role;
