use serde::{Deserialize, Serialize};

use firstshift_core::{OrganizationId, ValueObject};

use crate::Role;

/// A user's membership in one organization, as listed by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Membership {
    pub organization_id: OrganizationId,
    pub organization_name: String,
    pub role: Role,
}

impl ValueObject for Membership {}
