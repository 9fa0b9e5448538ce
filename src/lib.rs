//! Attendance and leave resolution core for an HR system.
//!
//! Resolves an authoritative day status (working, non-working, holiday,
//! half-day, on-leave, present, absent) for any employee and date by
//! reconciling organization attendance rules, per-employee overrides,
//! holiday calendars and leave requests; manages the leave-request
//! lifecycle (submission, day-level approval with pay classification,
//! quota deduction) and daily check-in/check-out validation.
//!
//! Transport, auth and the concrete database are external: the engine is
//! driven through the services in [`engine`] and persists through the
//! [`store`] traits, which assume atomic single-key compare-and-set from
//! the backing store.

pub mod engine;
pub mod error;
pub mod model;
pub mod store;

pub use engine::EngineContext;
pub use engine::attendance::{AttendanceService, BulkItemOutcome, CheckInOutcome};
pub use engine::calendar::{CalendarService, ResolvedDay, resolve_day};
pub use engine::holiday::HolidayRegistry;
pub use engine::leave::{
    ApproveLeave, ApproveOutcome, LeaveFilter, LeaveListPage, LeaveService, SubmitLeave,
};
pub use engine::policy::effective_config;
pub use engine::quota::{LeaveQuota, LeaveQuotaTracker};
pub use error::{Conflict, EngineError, EngineResult, PolicyViolation};
pub use store::memory::MemoryStore;
pub use store::{AttendanceStore, ConfigSource, StoreError, Versioned};
