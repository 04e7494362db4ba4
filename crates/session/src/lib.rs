//! `firstshift-session` — active-organization resolution for one session.
//!
//! [`ActiveOrgResolver`] owns the snapshot of which organization the user is
//! acting in and with which role. Everything else reads it through a
//! read-only [`OrgContext`] handle.

pub mod config;
pub mod context;
pub mod resolver;
pub mod snapshot;
pub mod switcher;

pub use config::{ClientConfig, ConfigError};
pub use context::OrgContext;
pub use resolver::{ActiveOrgResolver, ReloadOutcome};
pub use snapshot::{ActiveOrganization, OrgGate};
pub use switcher::{OrgSwitcher, SwitchError};
