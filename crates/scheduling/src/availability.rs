use chrono::{NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

use firstshift_auth::{authorize_availability_edit, Capabilities};
use firstshift_core::{DomainError, DomainResult, EmployeeId};

use crate::ScheduleResult;

/// Weekly recurring availability of one employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityWindow {
    pub employee_id: EmployeeId,
    pub weekday: Weekday,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub available: bool,
}

impl AvailabilityWindow {
    pub fn new(
        employee_id: EmployeeId,
        weekday: Weekday,
        start_time: NaiveTime,
        end_time: NaiveTime,
        available: bool,
    ) -> DomainResult<Self> {
        if start_time >= end_time {
            return Err(DomainError::validation(
                "availability start time must be before its end time",
            ));
        }
        Ok(Self {
            employee_id,
            weekday,
            start_time,
            end_time,
            available,
        })
    }

    /// Availability edit as offered by the availability page.
    pub fn edit(
        capabilities: &Capabilities,
        my_employee_id: Option<&EmployeeId>,
        employee_id: EmployeeId,
        weekday: Weekday,
        start_time: NaiveTime,
        end_time: NaiveTime,
        available: bool,
    ) -> ScheduleResult<Self> {
        authorize_availability_edit(capabilities, &employee_id, my_employee_id)?;
        Ok(Self::new(employee_id, weekday, start_time, end_time, available)?)
    }

    /// True if this window marks the employee available for the whole span.
    pub fn covers(&self, weekday: Weekday, start: NaiveTime, end: NaiveTime) -> bool {
        self.available && self.weekday == weekday && self.start_time <= start && end <= self.end_time
    }
}
