#![allow(dead_code)]

use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use hrm_core::model::{AttendanceConfig, WeekdayRule};
use hrm_core::{EngineContext, MemoryStore};

pub const ORG: u64 = 1;
pub const EMP: u64 = 42;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn at(d: NaiveDate, h: u32, min: u32) -> NaiveDateTime {
    d.and_time(NaiveTime::from_hms_opt(h, min, 0).unwrap())
}

/// Mon-Fri working, Saturday rule `odd`, Sunday off, work 09:30-18:00 with
/// a 10-minute grace period, no holidays seeded.
pub fn base_config() -> AttendanceConfig {
    let mut config = AttendanceConfig::new(ORG);
    config.work_start = NaiveTime::from_hms_opt(9, 30, 0).unwrap();
    config.work_end = NaiveTime::from_hms_opt(18, 0, 0).unwrap();
    config.grace_period_minutes = 10;
    config.saturday_rule = WeekdayRule::Odd;
    config
}

/// One-time log init; `RUST_LOG` controls verbosity when debugging a test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub async fn context_with(config: AttendanceConfig) -> (Arc<MemoryStore>, EngineContext) {
    init_tracing();
    let store = Arc::new(MemoryStore::new());
    store.put_config(config).await;
    let ctx = EngineContext::new(store.clone(), store.clone());
    (store, ctx)
}

pub async fn context() -> (Arc<MemoryStore>, EngineContext) {
    context_with(base_config()).await
}
