use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use uuid::Uuid;

use crate::model::policy::LeaveType;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LeaveStatus {
    Pending,
    Approved,
    Rejected,
    Cancelled,
}

impl LeaveStatus {
    /// Approved, rejected and cancelled are terminal.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, LeaveStatus::Pending)
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PayStatus {
    Paid,
    Unpaid,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum HalfDayPeriod {
    Morning,
    Afternoon,
}

/// One calendar date within a leave request. `half_day_period` is present
/// iff `is_half_day`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveDayDetail {
    pub date: NaiveDate,
    pub is_half_day: bool,
    pub half_day_period: Option<HalfDayPeriod>,
}

impl LeaveDayDetail {
    pub fn full(date: NaiveDate) -> Self {
        Self {
            date,
            is_half_day: false,
            half_day_period: None,
        }
    }

    pub fn half(date: NaiveDate, period: HalfDayPeriod) -> Self {
        Self {
            date,
            is_half_day: true,
            half_day_period: Some(period),
        }
    }

    /// Quota units: 1.0 for a full day, 0.5 for a half day.
    pub fn units(&self) -> f64 {
        if self.is_half_day { 0.5 } else { 1.0 }
    }
}

/// A leave request, owned by the submitting employee and mutated only by the
/// approving role (or cancelled by the employee while pending).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaveRequest {
    pub id: Uuid,
    pub employee_id: u64,
    pub organization_id: u64,
    pub leave_type: LeaveType,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: String,
    /// Ordered, one entry per selected date (the selection need not be
    /// contiguous; start/end are its min/max).
    pub requested_days_details: Vec<LeaveDayDetail>,
    pub status: LeaveStatus,
    pub pay_status: Option<PayStatus>,
    pub approved_days_details: Vec<LeaveDayDetail>,
    pub rejection_reason: Option<String>,
    pub created_at: NaiveDateTime,
}

impl LeaveRequest {
    pub fn requested_units(&self) -> f64 {
        self.requested_days_details.iter().map(|d| d.units()).sum()
    }

    pub fn approved_units(&self) -> f64 {
        self.approved_days_details.iter().map(|d| d.units()).sum()
    }

    /// The approved entry covering `date`, if any.
    pub fn approved_day(&self, date: NaiveDate) -> Option<&LeaveDayDetail> {
        self.approved_days_details.iter().find(|d| d.date == date)
    }
}
