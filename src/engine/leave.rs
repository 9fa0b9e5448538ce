//! Leave-request lifecycle: submission, day-level approval with pay-status
//! classification, rejection, cancellation, and the quota reads that hang
//! off the request history. The pending → terminal transition is a
//! compare-and-set on the stored request, so concurrent approve/reject/
//! cancel calls produce exactly one winner.

use std::collections::{HashMap, HashSet};

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::engine::quota::{LeaveQuota, LeaveQuotaTracker};
use crate::engine::{EngineContext, update_day_record, weekday_rule};
use crate::error::{Conflict, EngineError, EngineResult, PolicyViolation};
use crate::model::{
    LeaveDayDetail, LeaveRequest, LeaveStatus, LeaveType, PayStatus,
};
use crate::store::{StoreError, Versioned};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitLeave {
    pub employee_id: u64,
    pub organization_id: u64,
    pub leave_type: LeaveType,
    pub reason: String,
    /// The selected dates; need not be contiguous.
    pub days: Vec<LeaveDayDetail>,
    /// Caller-supplied reference timestamp (local to the org timezone).
    pub submitted_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApproveLeave {
    pub leave_id: Uuid,
    pub pay_status: PayStatus,
    /// Subset of the requested days being granted.
    pub approved_days: Vec<LeaveDayDetail>,
}

#[derive(Debug, Clone)]
pub struct ApproveOutcome {
    pub request: LeaveRequest,
    /// Set when a paid approval pushes usage past the quota total. The
    /// approval still goes through; the shortfall is reported, not blocked.
    pub quota_warning: Option<String>,
    /// Set when the approval committed but one or more day-record writes
    /// failed afterwards. The request is durably approved either way, and
    /// calendar resolution reads approved requests directly, so day status
    /// stays correct while the record catches up.
    pub record_sync_warning: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LeaveFilter {
    pub employee_id: Option<u64>,
    pub status: Option<LeaveStatus>,
    /// 1-based page number.
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaveListPage {
    pub data: Vec<LeaveRequest>,
    pub page: u64,
    pub per_page: u64,
    pub total: u64,
}

#[derive(Clone)]
pub struct LeaveService {
    ctx: EngineContext,
}

impl LeaveService {
    pub fn new(ctx: EngineContext) -> Self {
        Self { ctx }
    }

    /* =========================
    Submit
    ========================= */

    /// Creates a pending request. Every selected date must be a working,
    /// non-holiday day with no pre-existing approved leave. Submission is
    /// not quota-gated; quota enforcement happens at approval.
    pub async fn submit_leave(&self, submit: SubmitLeave) -> EngineResult<LeaveRequest> {
        if submit.reason.chars().filter(|c| !c.is_whitespace()).count() < 4 {
            return Err(EngineError::validation(
                "reason",
                "reason must contain at least 4 non-whitespace characters",
            ));
        }
        if submit.days.is_empty() {
            return Err(PolicyViolation::InvalidDateSelection(
                "at least one day must be selected".to_string(),
            )
            .into());
        }
        validate_day_shapes(&submit.days)?;

        let config = self
            .ctx
            .effective_config(submit.organization_id, submit.employee_id)
            .await?;
        if !config.leave_policy.knows(&submit.leave_type) {
            return Err(EngineError::validation(
                "leave_type",
                format!("unknown leave type `{}`", submit.leave_type),
            ));
        }

        let registry = self.ctx.holiday_registry(submit.organization_id).await?;
        let already_approved = self.approved_dates(submit.employee_id).await?;

        let mut days = submit.days.clone();
        days.sort_by_key(|d| d.date);
        for day in &days {
            if registry.holiday_on(day.date).is_some() {
                return Err(PolicyViolation::InvalidDateSelection(format!(
                    "{} is a holiday",
                    day.date
                ))
                .into());
            }
            if !weekday_rule::is_working_day(&config, day.date) {
                return Err(PolicyViolation::InvalidDateSelection(format!(
                    "{} is not a working day",
                    day.date
                ))
                .into());
            }
            if already_approved.contains(&day.date) {
                return Err(PolicyViolation::InvalidDateSelection(format!(
                    "{} is already covered by approved leave",
                    day.date
                ))
                .into());
            }
        }

        let request = LeaveRequest {
            id: Uuid::new_v4(),
            employee_id: submit.employee_id,
            organization_id: submit.organization_id,
            leave_type: submit.leave_type,
            start_date: days[0].date,
            end_date: days[days.len() - 1].date,
            reason: submit.reason.trim().to_string(),
            requested_days_details: days,
            status: LeaveStatus::Pending,
            pay_status: None,
            approved_days_details: Vec::new(),
            rejection_reason: None,
            created_at: submit.submitted_at,
        };
        self.ctx.store.insert_leave(request.clone()).await?;

        info!(
            employee_id = request.employee_id,
            leave_id = %request.id,
            leave_type = %request.leave_type,
            units = request.requested_units(),
            "leave request submitted"
        );
        Ok(request)
    }

    /* =========================
    Approve
    ========================= */

    /// Approves a subset of the requested days. Each day is re-validated
    /// against the current calendar, since rules may have changed since
    /// submission. Only paid approvals consume quota.
    pub async fn approve_leave(&self, approve: ApproveLeave) -> EngineResult<ApproveOutcome> {
        let Versioned { version, value: pending } = self.load_pending(approve.leave_id).await?;

        if approve.approved_days.is_empty() {
            return Err(PolicyViolation::NoDaysSelected.into());
        }
        validate_day_shapes(&approve.approved_days)?;

        let requested: HashMap<NaiveDate, LeaveDayDetail> = pending
            .requested_days_details
            .iter()
            .map(|d| (d.date, *d))
            .collect();
        for day in &approve.approved_days {
            let Some(requested_day) = requested.get(&day.date) else {
                return Err(PolicyViolation::InvalidDateSelection(format!(
                    "{} was not part of the request",
                    day.date
                ))
                .into());
            };
            // A requested half day cannot be granted as a full day.
            if day.units() > requested_day.units() {
                return Err(PolicyViolation::ExceedsRequested {
                    approved: day.units(),
                    requested: requested_day.units(),
                }
                .into());
            }
        }

        let config = self
            .ctx
            .effective_config(pending.organization_id, pending.employee_id)
            .await?;
        let registry = self.ctx.holiday_registry(pending.organization_id).await?;
        for day in &approve.approved_days {
            if registry.holiday_on(day.date).is_some()
                || !weekday_rule::is_working_day(&config, day.date)
            {
                return Err(PolicyViolation::NonApprovableDay(day.date).into());
            }
        }

        let approved_units: f64 = approve.approved_days.iter().map(|d| d.units()).sum();
        let requested_units = pending.requested_units();
        if approved_units > requested_units {
            return Err(PolicyViolation::ExceedsRequested {
                approved: approved_units,
                requested: requested_units,
            }
            .into());
        }

        let quota_warning = if approve.pay_status == PayStatus::Paid {
            self.quota_shortfall(&pending, &approve.approved_days).await?
        } else {
            None
        };

        let mut approved = pending.clone();
        approved.status = LeaveStatus::Approved;
        approved.pay_status = Some(approve.pay_status);
        let mut days = approve.approved_days.clone();
        days.sort_by_key(|d| d.date);
        approved.approved_days_details = days;

        // The one atomic transition out of pending; a concurrent
        // approve/reject/cancel bumps the version and the loser lands here.
        self.ctx
            .store
            .store_leave(approved.clone(), version)
            .await
            .map_err(already_processed)?;

        // The approval is durable from here on; a failed bookkeeping write
        // must not surface as operation failure.
        let mut unsynced: Vec<NaiveDate> = Vec::new();
        for day in &approved.approved_days_details {
            let is_half = day.is_half_day;
            let written = update_day_record(
                self.ctx.store.as_ref(),
                approved.employee_id,
                day.date,
                |record| {
                    record.working_day = true;
                    record.is_leave_approved = true;
                    record.is_half_day = is_half;
                    Ok(())
                },
            )
            .await;
            if let Err(e) = written {
                warn!(
                    leave_id = %approved.id,
                    date = %day.date,
                    error = %e,
                    "day record write failed after approval"
                );
                unsynced.push(day.date);
            }
        }
        let record_sync_warning = (!unsynced.is_empty()).then(|| {
            format!(
                "approved, but day records for {} date(s) could not be updated",
                unsynced.len()
            )
        });

        info!(
            employee_id = approved.employee_id,
            leave_id = %approved.id,
            pay_status = %approve.pay_status,
            units = approved_units,
            "leave request approved"
        );
        if let Some(warning) = &quota_warning {
            warn!(leave_id = %approved.id, "{warning}");
        }

        Ok(ApproveOutcome {
            request: approved,
            quota_warning,
            record_sync_warning,
        })
    }

    /* =========================
    Reject / Cancel
    ========================= */

    /// Rejects a pending request. No quota or day-record side effects.
    pub async fn reject_leave(&self, leave_id: Uuid, reason: &str) -> EngineResult<LeaveRequest> {
        if reason.trim().chars().count() < 3 {
            return Err(EngineError::validation(
                "rejection_reason",
                "rejection reason must be at least 3 characters",
            ));
        }

        let Versioned { version, value: pending } = self.load_pending(leave_id).await?;
        let mut rejected = pending;
        rejected.status = LeaveStatus::Rejected;
        rejected.rejection_reason = Some(reason.trim().to_string());

        self.ctx
            .store
            .store_leave(rejected.clone(), version)
            .await
            .map_err(already_processed)?;

        info!(leave_id = %rejected.id, "leave request rejected");
        Ok(rejected)
    }

    /// Employee-initiated cancellation of a still-pending request. Approved
    /// requests are not cancellable here.
    pub async fn cancel_leave(&self, leave_id: Uuid, employee_id: u64) -> EngineResult<LeaveRequest> {
        let Versioned { version, value: pending } = self.load_pending(leave_id).await?;
        if pending.employee_id != employee_id {
            return Err(EngineError::not_found("leave request", leave_id));
        }

        let mut cancelled = pending;
        cancelled.status = LeaveStatus::Cancelled;

        self.ctx
            .store
            .store_leave(cancelled.clone(), version)
            .await
            .map_err(already_processed)?;

        info!(leave_id = %cancelled.id, employee_id, "leave request cancelled");
        Ok(cancelled)
    }

    /* =========================
    Reads
    ========================= */

    pub async fn get_leave(&self, leave_id: Uuid) -> EngineResult<LeaveRequest> {
        Ok(self
            .ctx
            .store
            .load_leave(leave_id)
            .await?
            .ok_or_else(|| EngineError::not_found("leave request", leave_id))?
            .value)
    }

    /// Paginated request list for one organization, newest first.
    pub async fn list_leaves(
        &self,
        organization_id: u64,
        filter: &LeaveFilter,
    ) -> EngineResult<LeaveListPage> {
        let per_page = filter.per_page.unwrap_or(10).clamp(1, 100);
        let page = filter.page.unwrap_or(1).max(1);

        let mut requests = self.ctx.store.leaves_for_organization(organization_id).await?;
        requests.retain(|r| {
            filter.employee_id.is_none_or(|id| r.employee_id == id)
                && filter.status.is_none_or(|s| r.status == s)
        });
        requests.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total = requests.len() as u64;
        let data = requests
            .into_iter()
            .skip(((page - 1) * per_page) as usize)
            .take(per_page as usize)
            .collect();

        Ok(LeaveListPage {
            data,
            page,
            per_page,
            total,
        })
    }

    /// Per-type quotas for one employee and year, recomputed from the
    /// request history on every call.
    pub async fn get_leave_quota(
        &self,
        employee_id: u64,
        organization_id: u64,
        year: i32,
    ) -> EngineResult<Vec<LeaveQuota>> {
        let config = self.ctx.effective_config(organization_id, employee_id).await?;
        let requests = self.org_requests(employee_id, organization_id).await?;
        let tracker = LeaveQuotaTracker::new(&config.leave_policy, &requests);
        Ok(tracker.quotas_for_year(year))
    }

    /* =========================
    Admin grant (paid-leave marking)
    ========================= */

    /// Creates and auto-approves a one-day paid request, used by the admin
    /// status-marking flow so quota bookkeeping stays consistent with
    /// regular approvals.
    pub async fn grant_paid_day(
        &self,
        employee_id: u64,
        organization_id: u64,
        date: NaiveDate,
        granted_at: NaiveDateTime,
        notes: Option<&str>,
    ) -> EngineResult<LeaveRequest> {
        let config = self.ctx.effective_config(organization_id, employee_id).await?;
        let registry = self.ctx.holiday_registry(organization_id).await?;
        if registry.holiday_on(date).is_some() || !weekday_rule::is_working_day(&config, date) {
            return Err(PolicyViolation::NonApprovableDay(date).into());
        }
        // Same overlap rule as submission: a date already granted must not
        // be granted again, or the day would draw quota twice.
        if self.approved_dates(employee_id).await?.contains(&date) {
            return Err(PolicyViolation::InvalidDateSelection(format!(
                "{date} is already covered by approved leave"
            ))
            .into());
        }

        let day = LeaveDayDetail::full(date);
        let request = LeaveRequest {
            id: Uuid::new_v4(),
            employee_id,
            organization_id,
            leave_type: LeaveType::Paid,
            start_date: date,
            end_date: date,
            reason: notes.unwrap_or("administrative paid leave").to_string(),
            requested_days_details: vec![day],
            status: LeaveStatus::Approved,
            pay_status: Some(PayStatus::Paid),
            approved_days_details: vec![day],
            rejection_reason: None,
            created_at: granted_at,
        };
        self.ctx.store.insert_leave(request.clone()).await?;

        update_day_record(self.ctx.store.as_ref(), employee_id, date, |record| {
            record.working_day = true;
            record.is_leave_approved = true;
            record.is_half_day = false;
            Ok(())
        })
        .await?;

        info!(employee_id, leave_id = %request.id, %date, "paid leave granted administratively");
        Ok(request)
    }

    /* =========================
    Internals
    ========================= */

    async fn load_pending(&self, leave_id: Uuid) -> EngineResult<Versioned<LeaveRequest>> {
        let stored = self
            .ctx
            .store
            .load_leave(leave_id)
            .await?
            .ok_or_else(|| EngineError::not_found("leave request", leave_id))?;
        if stored.value.status.is_terminal() {
            return Err(Conflict::AlreadyProcessed.into());
        }
        Ok(stored)
    }

    async fn approved_dates(&self, employee_id: u64) -> EngineResult<HashSet<NaiveDate>> {
        let requests = self.ctx.store.leaves_for_employee(employee_id).await?;
        Ok(requests
            .iter()
            .filter(|r| r.status == LeaveStatus::Approved)
            .flat_map(|r| r.approved_days_details.iter().map(|d| d.date))
            .collect())
    }

    async fn org_requests(
        &self,
        employee_id: u64,
        organization_id: u64,
    ) -> EngineResult<Vec<LeaveRequest>> {
        let mut requests = self.ctx.store.leaves_for_employee(employee_id).await?;
        requests.retain(|r| r.organization_id == organization_id);
        Ok(requests)
    }

    /// Warning text when a paid approval would overdraw a year's quota.
    /// A request spanning a year boundary draws from each year's pool for
    /// the days falling in it, so every spanned year is checked on its own.
    async fn quota_shortfall(
        &self,
        pending: &LeaveRequest,
        approved_days: &[LeaveDayDetail],
    ) -> EngineResult<Option<String>> {
        let config = self
            .ctx
            .effective_config(pending.organization_id, pending.employee_id)
            .await?;
        let requests = self
            .org_requests(pending.employee_id, pending.organization_id)
            .await?;
        let tracker = LeaveQuotaTracker::new(&config.leave_policy, &requests);

        let mut years: Vec<i32> = approved_days.iter().map(|d| d.date.year()).collect();
        years.sort_unstable();
        years.dedup();

        let mut warnings = Vec::new();
        for year in years {
            let quota = tracker.quota(&pending.leave_type, year);
            let Some(total) = quota.total else {
                return Ok(None);
            };
            let approved_units: f64 = approved_days
                .iter()
                .filter(|d| d.date.year() == year)
                .map(|d| d.units())
                .sum();
            // This request's own pending units stop pending and become used.
            let own_pending: f64 = pending
                .requested_days_details
                .iter()
                .filter(|d| d.date.year() == year)
                .map(|d| d.units())
                .sum();
            let remaining_after =
                total - (quota.used + approved_units) - (quota.pending - own_pending);
            if remaining_after < 0.0 {
                warnings.push(format!(
                    "approval overdraws {} quota for {} by {} units",
                    pending.leave_type,
                    year,
                    -remaining_after
                ));
            }
        }

        Ok((!warnings.is_empty()).then(|| warnings.join("; ")))
    }
}

/// Half-day entries must carry a period; full-day entries must not; no
/// duplicate dates.
fn validate_day_shapes(days: &[LeaveDayDetail]) -> EngineResult<()> {
    let mut seen = HashSet::new();
    for day in days {
        if day.is_half_day != day.half_day_period.is_some() {
            return Err(EngineError::validation(
                "days",
                format!("{}: half-day flag and period must agree", day.date),
            ));
        }
        if !seen.insert(day.date) {
            return Err(PolicyViolation::InvalidDateSelection(format!(
                "{} is selected twice",
                day.date
            ))
            .into());
        }
    }
    Ok(())
}

fn already_processed(err: StoreError) -> EngineError {
    match err {
        StoreError::CasConflict => Conflict::AlreadyProcessed.into(),
        other => other.into(),
    }
}
