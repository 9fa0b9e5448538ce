//! Effective-policy resolution: merges the organization's attendance
//! configuration with an optional per-employee override, field by field.
//! A field the override leaves absent (or empty) keeps the organization
//! value; overrides never replace the record wholesale.

use crate::model::{
    AttendanceConfig, CustomLeaveType, LeavePolicy, LeavePolicyOverride, UserAttendanceOverride,
};

/// Produces the single effective configuration every other component uses
/// for this employee.
pub fn effective_config(
    org: &AttendanceConfig,
    user: Option<&UserAttendanceOverride>,
) -> AttendanceConfig {
    let mut effective = org.clone();
    let Some(user) = user else {
        return effective;
    };

    if let Some(working_days) = user.working_days {
        effective.working_days = working_days;
    }
    if let Some(weekday_rules) = user.weekday_rules {
        effective.weekday_rules = weekday_rules;
    }
    if let Some(saturday_rule) = user.saturday_rule {
        effective.saturday_rule = saturday_rule;
    }
    if let Some(work_start) = user.work_start {
        effective.work_start = work_start;
    }
    if let Some(work_end) = user.work_end {
        effective.work_end = work_end;
    }
    if let Some(grace) = user.grace_period_minutes {
        effective.grace_period_minutes = grace;
    }
    if let Some(timezone) = &user.timezone {
        if !timezone.is_empty() {
            effective.timezone = timezone.clone();
        }
    }
    if let Some(geofence) = user.geofence {
        effective.geofence = Some(geofence);
    }
    if let Some(allow) = user.allow_non_working_checkin {
        effective.allow_non_working_checkin = allow;
    }
    if let Some(policy_override) = &user.leave_policy {
        effective.leave_policy = merge_leave_policy(&org.leave_policy, policy_override);
    }

    effective
}

/// Field-level leave-policy merge. An override custom type replaces the
/// organization entry with the same code; organization codes the override
/// does not mention remain available (there is no suppression mechanism).
fn merge_leave_policy(org: &LeavePolicy, user: &LeavePolicyOverride) -> LeavePolicy {
    let mut merged = org.clone();
    if let Some(sick) = user.sick {
        merged.sick = sick;
    }
    if let Some(paid) = user.paid {
        merged.paid = paid;
    }
    if !user.custom_types.is_empty() {
        merged.custom_types = merge_custom_types(&org.custom_types, &user.custom_types);
    }
    merged
}

fn merge_custom_types(
    org: &[CustomLeaveType],
    user: &[CustomLeaveType],
) -> Vec<CustomLeaveType> {
    let mut merged: Vec<CustomLeaveType> = org.to_vec();
    for entry in user {
        match merged.iter_mut().find(|c| c.code == entry.code) {
            Some(existing) => *existing = entry.clone(),
            None => merged.push(entry.clone()),
        }
    }
    merged
}
