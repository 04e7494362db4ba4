use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use firstshift_auth::{authorize, Capabilities, Capability};
use firstshift_core::{DomainError, DomainResult, EmployeeId, Entity, OrganizationId, ShiftId};

use crate::ScheduleResult;

/// A scheduled shift. `employee_id = None` is an open (unassigned) shift.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shift {
    pub id: ShiftId,
    pub organization_id: OrganizationId,
    pub employee_id: Option<EmployeeId>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub position: Option<String>,
    pub notes: Option<String>,
}

impl Shift {
    pub fn new(
        organization_id: OrganizationId,
        starts_at: DateTime<Utc>,
        ends_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let shift = Self {
            id: ShiftId::new(),
            organization_id,
            employee_id: None,
            starts_at,
            ends_at,
            position: None,
            notes: None,
        };
        shift.validate()?;
        Ok(shift)
    }

    /// Build a shift the way the scheduling page does: only offered to roles
    /// that manage the schedule.
    pub fn plan(
        capabilities: &Capabilities,
        organization_id: OrganizationId,
        starts_at: DateTime<Utc>,
        ends_at: DateTime<Utc>,
    ) -> ScheduleResult<Self> {
        authorize(capabilities, Capability::ManageSchedule)?;
        Ok(Self::new(organization_id, starts_at, ends_at)?)
    }

    pub fn assigned_to(mut self, employee_id: EmployeeId) -> Self {
        self.employee_id = Some(employee_id);
        self
    }

    pub fn validate(&self) -> DomainResult<()> {
        if self.starts_at >= self.ends_at {
            return Err(DomainError::validation("shift start must be before its end"));
        }
        Ok(())
    }

    pub fn duration(&self) -> Duration {
        self.ends_at - self.starts_at
    }

    pub fn is_open(&self) -> bool {
        self.employee_id.is_none()
    }

    /// Half-open interval overlap: back-to-back shifts do not overlap.
    pub fn overlaps(&self, other: &Shift) -> bool {
        self.starts_at < other.ends_at && other.starts_at < self.ends_at
    }
}

impl Entity for Shift {
    type Id = ShiftId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
