//! Day-status resolution: reconciles weekday rules, holidays, approved
//! leave and recorded attendance into one authoritative status per date.

use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::engine::holiday::HolidayRegistry;
use crate::engine::{EngineContext, weekday_rule};
use crate::error::{EngineError, EngineResult};
use crate::model::{
    AdminStatus, AttendanceConfig, DayRecord, DayStatus, HalfDayPeriod, Holiday, LeaveDayDetail,
    LeaveStatus, MonthlyAttendance,
};

/// One resolved calendar day for one employee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedDay {
    pub date: NaiveDate,
    pub status: DayStatus,
    pub holiday_name: Option<String>,
    pub is_half_day: bool,
    pub period: Option<HalfDayPeriod>,
    /// Present-day refinement: minutes past work start, clamped at zero.
    pub minutes_late: Option<i64>,
    pub within_grace: Option<bool>,
    pub outside_geofence: bool,
}

impl ResolvedDay {
    fn bare(date: NaiveDate, status: DayStatus) -> Self {
        Self {
            date,
            status,
            holiday_name: None,
            is_half_day: false,
            period: None,
            minutes_late: None,
            within_grace: None,
            outside_geofence: false,
        }
    }
}

/// Resolves the authoritative status of `date`. Pure and idempotent:
/// unchanged inputs produce an identical result, for any past or future
/// date.
///
/// Priority: holiday > non-working > approved leave > admin override >
/// recorded check-in > absent.
pub fn resolve_day(
    date: NaiveDate,
    config: &AttendanceConfig,
    holiday: Option<&Holiday>,
    record: Option<&DayRecord>,
    approved_leave: Option<&LeaveDayDetail>,
) -> ResolvedDay {
    if let Some(holiday) = holiday {
        let mut resolved = ResolvedDay::bare(date, DayStatus::Holiday);
        resolved.holiday_name = Some(holiday.name.clone());
        return resolved;
    }

    if !weekday_rule::is_working_day(config, date) {
        return ResolvedDay::bare(date, DayStatus::NonWorking);
    }

    if let Some(leave) = approved_leave {
        let mut resolved = if leave.is_half_day {
            ResolvedDay::bare(date, DayStatus::HalfDayLeave)
        } else {
            ResolvedDay::bare(date, DayStatus::OnLeave)
        };
        resolved.is_half_day = leave.is_half_day;
        resolved.period = leave.half_day_period;
        return resolved;
    }

    if let Some(admin) = record.and_then(|r| r.admin_status) {
        let status = match admin {
            AdminStatus::Present => DayStatus::Present,
            AdminStatus::Absent => DayStatus::Absent,
            AdminStatus::HalfDay => DayStatus::HalfDay,
            // Paid-leave marks are materialized as approved leave requests,
            // so they resolve through the leave branch above.
            AdminStatus::PaidLeave => DayStatus::OnLeave,
        };
        let mut resolved = ResolvedDay::bare(date, status);
        resolved.is_half_day = admin == AdminStatus::HalfDay;
        return resolved;
    }

    if let Some(check_in) = record.and_then(|r| r.check_in.as_ref()) {
        let minutes_late = (check_in.at.time() - config.work_start)
            .num_minutes()
            .max(0);
        let mut resolved = ResolvedDay::bare(date, DayStatus::Present);
        resolved.minutes_late = Some(minutes_late);
        resolved.within_grace = Some(minutes_late <= i64::from(config.grace_period_minutes));
        resolved.outside_geofence = record.map(|r| r.outside_geofence).unwrap_or(false);
        return resolved;
    }

    ResolvedDay::bare(date, DayStatus::Absent)
}

/// Inclusive list of (year, month) pairs a date range spans.
pub(crate) fn month_span(start: NaiveDate, end: NaiveDate) -> Vec<(i32, u32)> {
    let mut out = Vec::new();
    let (mut year, mut month) = (start.year(), start.month());
    loop {
        out.push((year, month));
        if (year, month) == (end.year(), end.month()) {
            break;
        }
        if month == 12 {
            year += 1;
            month = 1;
        } else {
            month += 1;
        }
    }
    out
}

pub(crate) fn last_day_of_month(year: i32, month: u32) -> EngineResult<NaiveDate> {
    let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|d| d.pred_opt())
        .ok_or_else(|| EngineError::validation("month", format!("invalid month {year}-{month:02}")))
}

/// Store-backed calendar resolution for a whole date range.
#[derive(Clone)]
pub struct CalendarService {
    ctx: EngineContext,
}

impl CalendarService {
    pub fn new(ctx: EngineContext) -> Self {
        Self { ctx }
    }

    /// The merged org + per-employee configuration, as consumed by
    /// submission and approval surfaces.
    pub async fn resolve_effective_policy(
        &self,
        organization_id: u64,
        employee_id: u64,
    ) -> EngineResult<AttendanceConfig> {
        self.ctx.effective_config(organization_id, employee_id).await
    }

    /// Resolves every date in `[start, end]` for one employee. Idempotent:
    /// unchanged config/holidays/requests yield identical output.
    pub async fn resolve_calendar(
        &self,
        organization_id: u64,
        employee_id: u64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> EngineResult<Vec<ResolvedDay>> {
        if start > end {
            return Err(EngineError::validation(
                "date_range",
                format!("start {start} is after end {end}"),
            ));
        }

        let config = self.ctx.effective_config(organization_id, employee_id).await?;
        let registry = self.ctx.holiday_registry(organization_id).await?;
        let months = self.load_months(employee_id, start, end).await?;
        let leave_days = self.approved_leave_days(employee_id, organization_id).await?;

        let mut out = Vec::new();
        let mut date = start;
        while date <= end {
            let record = months
                .get(&(date.year(), date.month()))
                .and_then(|m| m.day(date));
            out.push(resolve_day(
                date,
                &config,
                registry.holiday_on(date),
                record,
                leave_days.get(&date),
            ));
            match date.succ_opt() {
                Some(next) => date = next,
                None => break,
            }
        }
        Ok(out)
    }

    /// Resolves a single date.
    pub async fn resolve_day_for(
        &self,
        organization_id: u64,
        employee_id: u64,
        date: NaiveDate,
    ) -> EngineResult<ResolvedDay> {
        let mut days = self
            .resolve_calendar(organization_id, employee_id, date, date)
            .await?;
        days.pop()
            .ok_or_else(|| EngineError::not_found("calendar day", date))
    }

    /// Whole-month resolved sheet, the attendance-report surface.
    pub async fn monthly_attendance_sheet(
        &self,
        organization_id: u64,
        employee_id: u64,
        year: i32,
        month: u32,
    ) -> EngineResult<Vec<ResolvedDay>> {
        let start = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| {
            EngineError::validation("month", format!("invalid month {year}-{month:02}"))
        })?;
        let end = last_day_of_month(year, month)?;
        self.resolve_calendar(organization_id, employee_id, start, end)
            .await
    }

    async fn load_months(
        &self,
        employee_id: u64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> EngineResult<HashMap<(i32, u32), MonthlyAttendance>> {
        let mut months = HashMap::new();
        for (year, month) in month_span(start, end) {
            if let Some(doc) = self.ctx.store.load_month(employee_id, year, month).await? {
                months.insert((year, month), doc.value);
            }
        }
        Ok(months)
    }

    /// Approved leave entries for the employee, keyed by date. First entry
    /// per date wins; overlapping approvals are prevented at submission.
    async fn approved_leave_days(
        &self,
        employee_id: u64,
        organization_id: u64,
    ) -> EngineResult<HashMap<NaiveDate, LeaveDayDetail>> {
        let requests = self.ctx.store.leaves_for_employee(employee_id).await?;
        let mut days = HashMap::new();
        for request in requests {
            if request.organization_id != organization_id
                || request.status != LeaveStatus::Approved
            {
                continue;
            }
            for detail in &request.approved_days_details {
                days.entry(detail.date).or_insert(*detail);
            }
        }
        Ok(days)
    }
}
