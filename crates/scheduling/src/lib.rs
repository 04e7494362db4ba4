//! `firstshift-scheduling` — scheduling records as exchanged with the backend.
//!
//! Employees, shifts, availability and time-off requests are stored and
//! authorized server-side. This crate only carries their shapes, the
//! client-side checks made before submitting them, and the aggregation used
//! to build dashboard insights.

pub mod availability;
pub mod employee;
pub mod error;
pub mod insights;
pub mod shift;
pub mod time_off;

pub use availability::AvailabilityWindow;
pub use employee::{find_employee_for_user, Employee};
pub use error::{ScheduleError, ScheduleResult};
pub use insights::{ScheduleConflict, ScheduleSummary};
pub use shift::Shift;
pub use time_off::{TimeOffRequest, TimeOffStatus};
