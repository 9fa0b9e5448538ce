//! Check-in/check-out recording and administrative status marking,
//! validated against the resolved calendar.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::engine::leave::LeaveService;
use crate::engine::{EngineContext, update_day_record, weekday_rule};
use crate::error::{Conflict, EngineError, EngineResult, PolicyViolation};
use crate::model::{
    AdminStatus, CheckEvent, DayRecord, GeoPoint, Geofence,
};

const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Great-circle distance in meters between two points.
fn haversine_m(a: GeoPoint, b: GeoPoint) -> f64 {
    let (lat_a, lat_b) = (a.lat.to_radians(), b.lat.to_radians());
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();
    let h = (d_lat / 2.0).sin().powi(2) + lat_a.cos() * lat_b.cos() * (d_lng / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * h.sqrt().asin()
}

/// A missing location counts as outside: the check-in is still recorded,
/// only flagged.
fn outside_geofence(geofence: Option<&Geofence>, location: Option<GeoPoint>) -> bool {
    match (geofence, location) {
        (None, _) => false,
        (Some(_), None) => true,
        (Some(fence), Some(point)) => haversine_m(fence.center, point) > fence.radius_m,
    }
}

#[derive(Debug, Clone)]
pub struct CheckInOutcome {
    pub record: DayRecord,
    pub minutes_late: i64,
    pub within_grace: bool,
}

/// Per-item result of a bulk marking operation. One item failing never
/// aborts the rest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkItemOutcome {
    pub employee_id: u64,
    pub ok: bool,
    pub error: Option<String>,
}

#[derive(Clone)]
pub struct AttendanceService {
    ctx: EngineContext,
}

impl AttendanceService {
    pub fn new(ctx: EngineContext) -> Self {
        Self { ctx }
    }

    /* =========================
    Check-in / check-out
    ========================= */

    /// Records a check-in for the timestamp's date. Fails on a second
    /// check-in the same day, and on holidays/non-working days unless the
    /// effective config allows it.
    pub async fn check_in(
        &self,
        employee_id: u64,
        organization_id: u64,
        timestamp: NaiveDateTime,
        location: Option<GeoPoint>,
    ) -> EngineResult<CheckInOutcome> {
        let date = timestamp.date();
        let config = self.ctx.effective_config(organization_id, employee_id).await?;
        let registry = self.ctx.holiday_registry(organization_id).await?;

        let holiday = registry.holiday_on(date).cloned();
        let working = weekday_rule::is_working_day(&config, date);
        if !config.allow_non_working_checkin {
            if holiday.is_some() {
                return Err(PolicyViolation::HolidayDay(date).into());
            }
            if !working {
                return Err(PolicyViolation::NonWorkingDay(date).into());
            }
        }

        let minutes_late = (timestamp.time() - config.work_start).num_minutes().max(0);
        let within_grace = minutes_late <= i64::from(config.grace_period_minutes);
        let outside = outside_geofence(config.geofence.as_ref(), location);

        let record = update_day_record(self.ctx.store.as_ref(), employee_id, date, |record| {
            if record.check_in.is_some() {
                return Err(Conflict::AlreadyCheckedIn.into());
            }
            record.working_day = working;
            record.is_holiday = holiday.is_some();
            record.holiday_name = holiday.as_ref().map(|h| h.name.clone());
            record.is_present = true;
            record.check_in = Some(CheckEvent {
                at: timestamp,
                location,
            });
            record.outside_geofence = outside;
            Ok(())
        })
        .await?;

        info!(
            employee_id,
            %date,
            minutes_late,
            within_grace,
            outside_geofence = outside,
            "checked in"
        );
        Ok(CheckInOutcome {
            record,
            minutes_late,
            within_grace,
        })
    }

    /// Records a check-out on the same day's record.
    pub async fn check_out(
        &self,
        employee_id: u64,
        organization_id: u64,
        timestamp: NaiveDateTime,
        location: Option<GeoPoint>,
    ) -> EngineResult<DayRecord> {
        // Config is not consulted beyond existence; an employee of an
        // unknown org has nothing to check out of.
        self.ctx.effective_config(organization_id, employee_id).await?;

        let date = timestamp.date();
        let record = update_day_record(self.ctx.store.as_ref(), employee_id, date, |record| {
            let Some(check_in) = &record.check_in else {
                return Err(Conflict::NoCheckInYet.into());
            };
            if record.check_out.is_some() {
                return Err(Conflict::AlreadyCheckedOut.into());
            }
            if timestamp < check_in.at {
                return Err(EngineError::validation(
                    "timestamp",
                    "check-out cannot precede check-in",
                ));
            }
            record.check_out = Some(CheckEvent {
                at: timestamp,
                location,
            });
            Ok(())
        })
        .await?;

        info!(employee_id, %date, "checked out");
        Ok(record)
    }

    /* =========================
    Admin marking
    ========================= */

    /// Administratively overwrites a date's status, bypassing the normal
    /// check-in flow. `paid-leave` routes through an auto-approved one-day
    /// leave request so quota bookkeeping stays consistent.
    pub async fn admin_set_status(
        &self,
        employee_id: u64,
        organization_id: u64,
        date: NaiveDate,
        status: AdminStatus,
        set_at: NaiveDateTime,
        notes: Option<&str>,
    ) -> EngineResult<DayRecord> {
        if status == AdminStatus::PaidLeave {
            LeaveService::new(self.ctx.clone())
                .grant_paid_day(employee_id, organization_id, date, set_at, notes)
                .await?;
            return self.day_record(employee_id, date).await;
        }

        let notes = notes.map(str::to_string);
        let record = update_day_record(self.ctx.store.as_ref(), employee_id, date, |record| {
            record.admin_status = Some(status);
            record.is_present = matches!(status, AdminStatus::Present | AdminStatus::HalfDay);
            record.is_half_day = status == AdminStatus::HalfDay;
            record.notes = notes.clone();
            Ok(())
        })
        .await?;

        info!(employee_id, %date, %status, "status set administratively");
        Ok(record)
    }

    /// Bulk variant over an explicit user set, or over all active employees
    /// when `employee_ids` is `None`. Not atomic as a whole; each item
    /// reports its own outcome.
    pub async fn admin_set_status_bulk(
        &self,
        organization_id: u64,
        employee_ids: Option<Vec<u64>>,
        date: NaiveDate,
        status: AdminStatus,
        set_at: NaiveDateTime,
        notes: Option<&str>,
    ) -> EngineResult<Vec<BulkItemOutcome>> {
        let targets = match employee_ids {
            Some(ids) => ids,
            None => self.ctx.config.active_employees(organization_id).await?,
        };

        let mut outcomes = Vec::with_capacity(targets.len());
        for employee_id in targets {
            let result = self
                .admin_set_status(employee_id, organization_id, date, status, set_at, notes)
                .await;
            outcomes.push(match result {
                Ok(_) => BulkItemOutcome {
                    employee_id,
                    ok: true,
                    error: None,
                },
                Err(e) => BulkItemOutcome {
                    employee_id,
                    ok: false,
                    error: Some(e.to_string()),
                },
            });
        }
        Ok(outcomes)
    }

    async fn day_record(&self, employee_id: u64, date: NaiveDate) -> EngineResult<DayRecord> {
        use chrono::Datelike;
        let doc = self
            .ctx
            .store
            .load_month(employee_id, date.year(), date.month())
            .await?
            .ok_or_else(|| EngineError::not_found("day record", date))?;
        doc.value
            .day(date)
            .cloned()
            .ok_or_else(|| EngineError::not_found("day record", date))
    }
}
