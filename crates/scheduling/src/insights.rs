//! Client-side aggregation behind the dashboard insights.
//!
//! The summary built here is the blob handed to the hosted AI service for
//! free-text analysis; that call lives outside this crate.

use std::collections::BTreeMap;

use chrono::{Datelike, Duration, Weekday};
use serde::Serialize;

use firstshift_core::{EmployeeId, ShiftId, TimeOffRequestId};

use crate::{Employee, Shift, TimeOffRequest, TimeOffStatus};

const WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Scheduled time per assigned employee. Open shifts are skipped.
pub fn hours_by_employee(shifts: &[Shift]) -> BTreeMap<EmployeeId, Duration> {
    let mut totals: BTreeMap<EmployeeId, Duration> = BTreeMap::new();
    for shift in shifts {
        if let Some(employee_id) = shift.employee_id {
            let entry = totals.entry(employee_id).or_insert_with(Duration::zero);
            *entry = *entry + shift.duration();
        }
    }
    totals
}

/// Scheduled time per weekday of the shift start, Monday first.
pub fn hours_by_weekday(shifts: &[Shift]) -> [(Weekday, Duration); 7] {
    let mut totals = WEEK.map(|day| (day, Duration::zero()));
    for shift in shifts {
        let idx = shift.starts_at.weekday().num_days_from_monday() as usize;
        totals[idx].1 = totals[idx].1 + shift.duration();
    }
    totals
}

pub fn unassigned_shifts(shifts: &[Shift]) -> Vec<&Shift> {
    shifts.iter().filter(|s| s.is_open()).collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScheduleConflict {
    /// One employee holds two overlapping shifts.
    DoubleBooked {
        employee_id: EmployeeId,
        first: ShiftId,
        second: ShiftId,
    },
    /// A shift falls on approved time off.
    OnTimeOff {
        employee_id: EmployeeId,
        shift: ShiftId,
        request: TimeOffRequestId,
    },
}

/// Overlapping shift pairs per employee, in shift start order.
pub fn double_bookings(shifts: &[Shift]) -> Vec<ScheduleConflict> {
    let mut by_employee: BTreeMap<EmployeeId, Vec<&Shift>> = BTreeMap::new();
    for shift in shifts {
        if let Some(employee_id) = shift.employee_id {
            by_employee.entry(employee_id).or_default().push(shift);
        }
    }

    let mut conflicts = Vec::new();
    for (employee_id, mut assigned) in by_employee {
        assigned.sort_by_key(|s| (s.starts_at, s.id));
        for (i, first) in assigned.iter().enumerate() {
            // Sorted by start: stop at the first shift starting after `first` ends.
            for second in assigned[i + 1..].iter().take_while(|s| s.starts_at < first.ends_at) {
                conflicts.push(ScheduleConflict::DoubleBooked {
                    employee_id,
                    first: first.id,
                    second: second.id,
                });
            }
        }
    }
    conflicts
}

pub fn time_off_conflicts(shifts: &[Shift], requests: &[TimeOffRequest]) -> Vec<ScheduleConflict> {
    requests
        .iter()
        .filter(|r| r.status == TimeOffStatus::Approved)
        .flat_map(|r| {
            shifts
                .iter()
                .filter(move |s| r.conflicts_with(s))
                .map(move |s| ScheduleConflict::OnTimeOff {
                    employee_id: r.employee_id,
                    shift: s.id,
                    request: r.id,
                })
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmployeeHours {
    pub employee_id: EmployeeId,
    pub name: Option<String>,
    pub hours: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekdayHours {
    pub weekday: String,
    pub hours: f64,
}

/// Aggregate view of a schedule period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduleSummary {
    pub total_shifts: usize,
    pub open_shifts: usize,
    pub total_hours: f64,
    pub employee_hours: Vec<EmployeeHours>,
    pub weekday_hours: Vec<WeekdayHours>,
    pub pending_time_off: usize,
    pub conflicts: Vec<ScheduleConflict>,
}

fn as_hours(d: Duration) -> f64 {
    d.num_minutes() as f64 / 60.0
}

impl ScheduleSummary {
    pub fn build(shifts: &[Shift], employees: &[Employee], requests: &[TimeOffRequest]) -> Self {
        let names: BTreeMap<EmployeeId, &str> =
            employees.iter().map(|e| (e.id, e.full_name.as_str())).collect();

        let employee_hours = hours_by_employee(shifts)
            .into_iter()
            .map(|(employee_id, total)| EmployeeHours {
                employee_id,
                name: names.get(&employee_id).map(|n| n.to_string()),
                hours: as_hours(total),
            })
            .collect();

        let weekday_hours = hours_by_weekday(shifts)
            .into_iter()
            .map(|(day, total)| WeekdayHours {
                weekday: day.to_string(),
                hours: as_hours(total),
            })
            .collect();

        let total = shifts
            .iter()
            .fold(Duration::zero(), |acc, s| acc + s.duration());

        let mut conflicts = double_bookings(shifts);
        conflicts.extend(time_off_conflicts(shifts, requests));

        Self {
            total_shifts: shifts.len(),
            open_shifts: unassigned_shifts(shifts).len(),
            total_hours: as_hours(total),
            employee_hours,
            weekday_hours,
            pending_time_off: requests
                .iter()
                .filter(|r| r.status == TimeOffStatus::Pending)
                .count(),
            conflicts,
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}
