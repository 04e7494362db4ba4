use serde::Serialize;

use firstshift_auth::{Capabilities, Role};
use firstshift_backend::ActiveOrgRecord;
use firstshift_core::OrganizationId;

/// Which organization the session is acting in, and with which role.
///
/// # Invariants
/// - `role` and `organization_name` are set only if `organization_id` is set.
/// - Published whole: readers see either the previous or the next snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActiveOrganization {
    organization_id: Option<OrganizationId>,
    organization_name: Option<String>,
    role: Option<Role>,
    loading: bool,
}

impl ActiveOrganization {
    /// State before the first resolution completes.
    pub fn initial() -> Self {
        Self {
            organization_id: None,
            organization_name: None,
            role: None,
            loading: true,
        }
    }

    /// No active organization (none exists, or resolution failed).
    pub fn none() -> Self {
        Self {
            loading: false,
            ..Self::initial()
        }
    }

    pub fn resolved(record: ActiveOrgRecord) -> Self {
        Self {
            organization_id: Some(record.organization_id),
            organization_name: Some(record.organization_name),
            role: Some(record.role),
            loading: false,
        }
    }

    pub fn organization_id(&self) -> Option<OrganizationId> {
        self.organization_id
    }

    pub fn organization_name(&self) -> Option<&str> {
        self.organization_name.as_deref()
    }

    pub fn role(&self) -> Option<Role> {
        self.role
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn capabilities(&self) -> Capabilities {
        Capabilities::for_role(self.role)
    }

    pub(crate) fn mark_loading(&mut self) -> bool {
        if self.loading {
            return false;
        }
        self.loading = true;
        true
    }

    pub fn gate(&self) -> OrgGate {
        match (self.organization_id, self.role) {
            (Some(organization_id), Some(role)) => OrgGate::Active {
                organization_id,
                organization_name: self.organization_name.clone().unwrap_or_default(),
                role,
            },
            _ if self.loading => OrgGate::Loading,
            _ => OrgGate::NoOrganization,
        }
    }
}

impl Default for ActiveOrganization {
    fn default() -> Self {
        Self::initial()
    }
}

/// What a page should render for the current snapshot.
///
/// A refresh in progress keeps the previous organization `Active`; only a
/// session that has never resolved one reports `Loading`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrgGate {
    Loading,
    /// Send the user to onboarding (create or join an organization).
    NoOrganization,
    Active {
        organization_id: OrganizationId,
        organization_name: String,
        role: Role,
    },
}
