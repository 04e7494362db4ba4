use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use firstshift_auth::{authorize, Capabilities, Capability};
use firstshift_core::{
    DomainError, DomainResult, EmployeeId, Entity, OrganizationId, TimeOffRequestId,
};

use crate::{ScheduleResult, Shift};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TimeOffStatus {
    #[default]
    Pending,
    Approved,
    Denied,
}

impl core::fmt::Display for TimeOffStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            TimeOffStatus::Pending => write!(f, "pending"),
            TimeOffStatus::Approved => write!(f, "approved"),
            TimeOffStatus::Denied => write!(f, "denied"),
        }
    }
}

/// Time-off request for an inclusive range of days.
///
/// # Invariants
/// - `start_date <= end_date`
/// - Only `Pending` requests can be decided; a decision is final.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeOffRequest {
    pub id: TimeOffRequestId,
    pub organization_id: OrganizationId,
    pub employee_id: EmployeeId,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: Option<String>,
    pub status: TimeOffStatus,
    pub decided_at: Option<DateTime<Utc>>,
}

impl TimeOffRequest {
    pub fn new(
        organization_id: OrganizationId,
        employee_id: EmployeeId,
        start_date: NaiveDate,
        end_date: NaiveDate,
        reason: Option<String>,
    ) -> DomainResult<Self> {
        if start_date > end_date {
            return Err(DomainError::validation("time off cannot end before it starts"));
        }
        Ok(Self {
            id: TimeOffRequestId::new(),
            organization_id,
            employee_id,
            start_date,
            end_date,
            reason: reason.map(|r| r.trim().to_string()).filter(|r| !r.is_empty()),
            status: TimeOffStatus::Pending,
            decided_at: None,
        })
    }

    /// Submit a request; any member of the organization may.
    pub fn submit(
        capabilities: &Capabilities,
        organization_id: OrganizationId,
        employee_id: EmployeeId,
        start_date: NaiveDate,
        end_date: NaiveDate,
        reason: Option<String>,
    ) -> ScheduleResult<Self> {
        authorize(capabilities, Capability::SubmitTimeOff)?;
        Ok(Self::new(organization_id, employee_id, start_date, end_date, reason)?)
    }

    pub fn approve(&mut self, capabilities: &Capabilities, now: DateTime<Utc>) -> ScheduleResult<()> {
        self.decide(capabilities, TimeOffStatus::Approved, now)
    }

    pub fn deny(&mut self, capabilities: &Capabilities, now: DateTime<Utc>) -> ScheduleResult<()> {
        self.decide(capabilities, TimeOffStatus::Denied, now)
    }

    fn decide(
        &mut self,
        capabilities: &Capabilities,
        status: TimeOffStatus,
        now: DateTime<Utc>,
    ) -> ScheduleResult<()> {
        authorize(capabilities, Capability::ApproveTimeOff)?;
        if self.status != TimeOffStatus::Pending {
            return Err(DomainError::invalid_transition(format!(
                "time off request already {}",
                self.status
            ))
            .into());
        }
        self.status = status;
        self.decided_at = Some(now);
        tracing::debug!(request_id = %self.id, %status, "time off request decided");
        Ok(())
    }

    /// Number of days covered, inclusive.
    pub fn days(&self) -> i64 {
        (self.end_date - self.start_date).num_days() + 1
    }

    pub fn covers_date(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }

    /// True if `shift` is assigned to this employee and starts on a covered day.
    pub fn conflicts_with(&self, shift: &Shift) -> bool {
        shift.employee_id == Some(self.employee_id) && self.covers_date(shift.starts_at.date_naive())
    }
}

impl Entity for TimeOffRequest {
    type Id = TimeOffRequestId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
