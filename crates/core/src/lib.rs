//! `firstshift-core` — shared domain building blocks.
//!
//! Identifiers, the domain error model and marker traits used by every other
//! FirstShift crate. No IO lives here.

pub mod entity;
pub mod error;
pub mod id;
pub mod value_object;

pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{EmployeeId, OrganizationId, ShiftId, TimeOffRequestId, UserId};
pub use value_object::ValueObject;
