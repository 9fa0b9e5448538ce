//! Persistence boundary. The engine delegates all record storage to an
//! external key-based store and assumes atomic single-key compare-and-set
//! semantics from it; [`memory::MemoryStore`] is the in-process reference
//! implementation used by tests and demos.

pub mod memory;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::model::{
    AttendanceConfig, Holiday, LeaveRequest, MonthlyAttendance, UserAttendanceOverride,
};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoreError {
    /// The document changed under us; the caller reloads and retries or
    /// surfaces a conflict.
    #[error("compare-and-set version conflict")]
    CasConflict,
    #[error("storage backend failure: {0}")]
    Backend(String),
}

/// A stored document together with its store version, the CAS token for the
/// next write.
#[derive(Debug, Clone, PartialEq)]
pub struct Versioned<T> {
    pub version: u64,
    pub value: T,
}

/// Mutable record storage: monthly attendance documents and leave requests.
#[async_trait]
pub trait AttendanceStore: Send + Sync {
    async fn load_month(
        &self,
        employee_id: u64,
        year: i32,
        month: u32,
    ) -> Result<Option<Versioned<MonthlyAttendance>>, StoreError>;

    /// Writes a monthly document. `expected_version = None` inserts and fails
    /// with [`StoreError::CasConflict`] if the document already exists;
    /// `Some(v)` replaces only if the stored version is still `v`. Returns
    /// the new version.
    async fn store_month(
        &self,
        doc: MonthlyAttendance,
        expected_version: Option<u64>,
    ) -> Result<u64, StoreError>;

    async fn load_leave(&self, id: Uuid) -> Result<Option<Versioned<LeaveRequest>>, StoreError>;

    /// Inserts a new leave request; fails with CasConflict on id collision.
    async fn insert_leave(&self, request: LeaveRequest) -> Result<u64, StoreError>;

    /// Replaces a leave request only if the stored version still matches.
    async fn store_leave(
        &self,
        request: LeaveRequest,
        expected_version: u64,
    ) -> Result<u64, StoreError>;

    async fn leaves_for_employee(&self, employee_id: u64) -> Result<Vec<LeaveRequest>, StoreError>;

    async fn leaves_for_organization(
        &self,
        organization_id: u64,
    ) -> Result<Vec<LeaveRequest>, StoreError>;
}

/// Read-only view of the external configuration service. This engine never
/// creates or deletes these records.
#[async_trait]
pub trait ConfigSource: Send + Sync {
    async fn attendance_config(
        &self,
        organization_id: u64,
    ) -> Result<Option<AttendanceConfig>, StoreError>;

    async fn holidays(&self, organization_id: u64) -> Result<Vec<Holiday>, StoreError>;

    async fn user_override(
        &self,
        employee_id: u64,
    ) -> Result<Option<UserAttendanceOverride>, StoreError>;

    /// Active employee ids for bulk operations over "all active employees".
    async fn active_employees(&self, organization_id: u64) -> Result<Vec<u64>, StoreError>;
}
