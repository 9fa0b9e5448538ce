use chrono::{NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use crate::model::policy::{LeavePolicy, LeavePolicyOverride};

/// Recurrence rule for one weekday.
///
/// `Odd`/`Even` refer to the 1-based occurrence index of the weekday within
/// its month, so `saturday_rule = Odd` means the first, third and fifth
/// Saturday of a month are working days ("every other Saturday").
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, Default,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum WeekdayRule {
    All,
    #[default]
    None,
    Odd,
    Even,
}

/// Base working-day booleans, one per weekday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkingDays {
    pub monday: bool,
    pub tuesday: bool,
    pub wednesday: bool,
    pub thursday: bool,
    pub friday: bool,
    pub saturday: bool,
    pub sunday: bool,
}

impl Default for WorkingDays {
    fn default() -> Self {
        // Mon-Fri on, weekend off
        Self {
            monday: true,
            tuesday: true,
            wednesday: true,
            thursday: true,
            friday: true,
            saturday: false,
            sunday: false,
        }
    }
}

impl WorkingDays {
    pub fn get(&self, weekday: Weekday) -> bool {
        match weekday {
            Weekday::Mon => self.monday,
            Weekday::Tue => self.tuesday,
            Weekday::Wed => self.wednesday,
            Weekday::Thu => self.thursday,
            Weekday::Fri => self.friday,
            Weekday::Sat => self.saturday,
            Weekday::Sun => self.sunday,
        }
    }
}

/// Optional explicit rule per weekday. An absent entry falls back to the
/// base working-day boolean, except Saturday which falls back to
/// [`AttendanceConfig::saturday_rule`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct WeekdayRules {
    pub monday: Option<WeekdayRule>,
    pub tuesday: Option<WeekdayRule>,
    pub wednesday: Option<WeekdayRule>,
    pub thursday: Option<WeekdayRule>,
    pub friday: Option<WeekdayRule>,
    pub saturday: Option<WeekdayRule>,
    pub sunday: Option<WeekdayRule>,
}

impl WeekdayRules {
    pub fn get(&self, weekday: Weekday) -> Option<WeekdayRule> {
        match weekday {
            Weekday::Mon => self.monday,
            Weekday::Tue => self.tuesday,
            Weekday::Wed => self.wednesday,
            Weekday::Thu => self.thursday,
            Weekday::Fri => self.friday,
            Weekday::Sat => self.saturday,
            Weekday::Sun => self.sunday,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Geofence {
    pub center: GeoPoint,
    /// Radius in meters.
    pub radius_m: f64,
}

/// Organization-wide attendance configuration. Created by org setup, mutated
/// by HR through the external configuration service; this crate only reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceConfig {
    pub organization_id: u64,
    pub working_days: WorkingDays,
    pub weekday_rules: WeekdayRules,
    /// Fallback rule for Saturdays without an explicit `weekday_rules` entry.
    pub saturday_rule: WeekdayRule,
    pub work_start: NaiveTime,
    pub work_end: NaiveTime,
    pub grace_period_minutes: u32,
    /// IANA timezone identifier, carried as data for callers. All timestamps
    /// passed into the engine are already local to this zone.
    pub timezone: String,
    pub geofence: Option<Geofence>,
    /// Permit check-in on holidays / non-working days (off by default).
    pub allow_non_working_checkin: bool,
    pub leave_policy: LeavePolicy,
}

impl AttendanceConfig {
    pub fn new(organization_id: u64) -> Self {
        Self {
            organization_id,
            working_days: WorkingDays::default(),
            weekday_rules: WeekdayRules::default(),
            saturday_rule: WeekdayRule::None,
            work_start: NaiveTime::from_hms_opt(9, 0, 0).expect("valid work start"),
            work_end: NaiveTime::from_hms_opt(18, 0, 0).expect("valid work end"),
            grace_period_minutes: 10,
            timezone: "UTC".to_string(),
            geofence: None,
            allow_non_working_checkin: false,
            leave_policy: LeavePolicy::default(),
        }
    }
}

/// Per-employee override. Every field is optional; an absent (or empty)
/// field falls back to the organization value field-by-field, never
/// record-by-record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct UserAttendanceOverride {
    pub employee_id: u64,
    pub working_days: Option<WorkingDays>,
    pub weekday_rules: Option<WeekdayRules>,
    pub saturday_rule: Option<WeekdayRule>,
    pub work_start: Option<NaiveTime>,
    pub work_end: Option<NaiveTime>,
    pub grace_period_minutes: Option<u32>,
    pub timezone: Option<String>,
    pub geofence: Option<Geofence>,
    pub allow_non_working_checkin: Option<bool>,
    pub leave_policy: Option<LeavePolicyOverride>,
}
