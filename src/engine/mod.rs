//! The resolution and lifecycle engine. Pure computation lives in
//! [`weekday_rule`], [`holiday`], [`policy`], [`calendar`] and [`quota`];
//! the store-backed services in [`attendance`] and [`leave`] (plus
//! [`calendar::CalendarService`]) drive it.

pub mod attendance;
pub mod calendar;
pub mod holiday;
pub mod leave;
pub mod policy;
pub mod quota;
pub mod weekday_rule;

use std::sync::Arc;

use chrono::{Datelike, NaiveDate};

use crate::error::{EngineError, EngineResult};
use crate::model::{AttendanceConfig, DayRecord, MonthlyAttendance};
use crate::store::{AttendanceStore, ConfigSource, StoreError};
use holiday::HolidayRegistry;

/// Bounded retry for same-month write races. Writes to different employees
/// or months never contend.
const CAS_RETRIES: usize = 3;

/// Read-modify-write of one day record inside its monthly document, under
/// compare-and-set. `apply` may reject the current state (already checked
/// in, and so on); its error aborts without writing.
pub(crate) async fn update_day_record<F>(
    store: &dyn AttendanceStore,
    employee_id: u64,
    date: NaiveDate,
    mut apply: F,
) -> EngineResult<DayRecord>
where
    F: FnMut(&mut DayRecord) -> EngineResult<()>,
{
    for _ in 0..CAS_RETRIES {
        let existing = store
            .load_month(employee_id, date.year(), date.month())
            .await?;
        let (mut doc, expected) = match existing {
            Some(v) => (v.value, Some(v.version)),
            None => (
                MonthlyAttendance::new(employee_id, date.year(), date.month()),
                None,
            ),
        };
        apply(doc.day_mut(date))?;
        let record = doc.day(date).cloned().unwrap_or_default();
        match store.store_month(doc, expected).await {
            Ok(_) => return Ok(record),
            Err(StoreError::CasConflict) => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Err(StoreError::CasConflict.into())
}

/// Shared handles to the record store and the external configuration
/// service. Cheap to clone; every service wraps one.
#[derive(Clone)]
pub struct EngineContext {
    pub store: Arc<dyn AttendanceStore>,
    pub config: Arc<dyn ConfigSource>,
}

impl EngineContext {
    pub fn new(store: Arc<dyn AttendanceStore>, config: Arc<dyn ConfigSource>) -> Self {
        Self { store, config }
    }

    /// The merged org + per-employee configuration (the "effective policy")
    /// used by every other operation for this employee.
    pub async fn effective_config(
        &self,
        organization_id: u64,
        employee_id: u64,
    ) -> EngineResult<AttendanceConfig> {
        let org = self
            .config
            .attendance_config(organization_id)
            .await?
            .ok_or_else(|| EngineError::not_found("attendance config", organization_id))?;
        let user = self.config.user_override(employee_id).await?;
        Ok(policy::effective_config(&org, user.as_ref()))
    }

    pub async fn holiday_registry(&self, organization_id: u64) -> EngineResult<HolidayRegistry> {
        let holidays = self.config.holidays(organization_id).await?;
        Ok(HolidayRegistry::new(holidays))
    }
}
