use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use crate::model::config::GeoPoint;

/// Authoritative classification of one date for one employee.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum DayStatus {
    Holiday,
    NonWorking,
    OnLeave,
    HalfDayLeave,
    Present,
    HalfDay,
    Absent,
}

/// Administrative status override set through the admin marking flow,
/// bypassing normal check-in. `paid-leave` never lands here: it routes
/// through an auto-approved leave request instead.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum AdminStatus {
    Present,
    Absent,
    HalfDay,
    PaidLeave,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CheckEvent {
    pub at: NaiveDateTime,
    pub location: Option<GeoPoint>,
}

/// Per-date record for one employee, accumulated into a monthly document.
/// Written by check-in/check-out and by leave approval; read back for day
/// resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct DayRecord {
    pub working_day: bool,
    pub is_holiday: bool,
    pub holiday_name: Option<String>,
    pub check_in: Option<CheckEvent>,
    pub check_out: Option<CheckEvent>,
    pub is_present: bool,
    pub is_half_day: bool,
    pub is_leave_approved: bool,
    pub admin_status: Option<AdminStatus>,
    pub outside_geofence: bool,
    pub notes: Option<String>,
}

/// Monthly attendance document, one per employee+month, keyed by day of
/// month. Stored as a single versioned unit so same-date writes can use
/// compare-and-set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyAttendance {
    pub employee_id: u64,
    pub year: i32,
    pub month: u32,
    pub days: BTreeMap<u32, DayRecord>,
}

impl MonthlyAttendance {
    pub fn new(employee_id: u64, year: i32, month: u32) -> Self {
        Self {
            employee_id,
            year,
            month,
            days: BTreeMap::new(),
        }
    }

    pub fn day(&self, date: NaiveDate) -> Option<&DayRecord> {
        use chrono::Datelike;
        if date.year() != self.year || date.month() != self.month {
            return None;
        }
        self.days.get(&date.day())
    }

    pub fn day_mut(&mut self, date: NaiveDate) -> &mut DayRecord {
        use chrono::Datelike;
        debug_assert!(date.year() == self.year && date.month() == self.month);
        self.days.entry(date.day()).or_default()
    }
}
