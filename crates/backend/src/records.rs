//! Records exchanged with the backend procedures.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use firstshift_auth::{Membership, Role};
use firstshift_core::OrganizationId;

/// Row returned by the resolve-or-init active organization procedure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveOrgRecord {
    pub organization_id: OrganizationId,
    pub organization_name: String,
    pub role: Role,
}

impl From<Membership> for ActiveOrgRecord {
    fn from(m: Membership) -> Self {
        Self {
            organization_id: m.organization_id,
            organization_name: m.organization_name,
            role: m.role,
        }
    }
}

/// Token that lets a user self-enroll into an organization at a fixed role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinCode {
    pub code: String,
    pub organization_id: OrganizationId,
    pub role: Role,
    pub max_uses: u32,
    pub uses: u32,
    pub expires_at: DateTime<Utc>,
}

impl JoinCode {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    pub fn is_exhausted(&self) -> bool {
        self.uses >= self.max_uses
    }

    pub fn remaining_uses(&self) -> u32 {
        self.max_uses.saturating_sub(self.uses)
    }
}

/// Parameters for generating a join code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinCodeRequest {
    pub role: Role,
    pub max_uses: u32,
    pub valid_for: Duration,
}

impl JoinCodeRequest {
    pub fn new(role: Role, max_uses: u32, valid_for: Duration) -> Self {
        Self {
            role,
            max_uses,
            valid_for,
        }
    }
}
