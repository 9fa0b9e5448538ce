//! In-memory store with versioned compare-and-set, mirroring the semantics
//! the engine expects from a real document store.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::model::{
    AttendanceConfig, Holiday, LeaveRequest, MonthlyAttendance, UserAttendanceOverride,
};
use crate::store::{AttendanceStore, ConfigSource, StoreError, Versioned};

type MonthKey = (u64, i32, u32);

#[derive(Default)]
struct Records {
    months: HashMap<MonthKey, Versioned<MonthlyAttendance>>,
    leaves: HashMap<Uuid, Versioned<LeaveRequest>>,
}

#[derive(Default)]
struct ConfigRecords {
    configs: HashMap<u64, AttendanceConfig>,
    holidays: HashMap<u64, Vec<Holiday>>,
    overrides: HashMap<u64, UserAttendanceOverride>,
    employees: HashMap<u64, Vec<u64>>,
}

#[derive(Default)]
pub struct MemoryStore {
    records: RwLock<Records>,
    config: RwLock<ConfigRecords>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    // Seeding helpers; stand in for the external configuration service.

    pub async fn put_config(&self, config: AttendanceConfig) {
        let mut guard = self.config.write().await;
        guard.configs.insert(config.organization_id, config);
    }

    pub async fn put_holidays(&self, organization_id: u64, holidays: Vec<Holiday>) {
        let mut guard = self.config.write().await;
        guard.holidays.insert(organization_id, holidays);
    }

    pub async fn put_override(&self, user_override: UserAttendanceOverride) {
        let mut guard = self.config.write().await;
        guard.overrides.insert(user_override.employee_id, user_override);
    }

    pub async fn put_active_employees(&self, organization_id: u64, employees: Vec<u64>) {
        let mut guard = self.config.write().await;
        guard.employees.insert(organization_id, employees);
    }
}

#[async_trait]
impl AttendanceStore for MemoryStore {
    async fn load_month(
        &self,
        employee_id: u64,
        year: i32,
        month: u32,
    ) -> Result<Option<Versioned<MonthlyAttendance>>, StoreError> {
        let guard = self.records.read().await;
        Ok(guard.months.get(&(employee_id, year, month)).cloned())
    }

    async fn store_month(
        &self,
        doc: MonthlyAttendance,
        expected_version: Option<u64>,
    ) -> Result<u64, StoreError> {
        let key = (doc.employee_id, doc.year, doc.month);
        let mut guard = self.records.write().await;
        match (guard.months.get(&key), expected_version) {
            (None, None) => {
                guard.months.insert(key, Versioned { version: 1, value: doc });
                Ok(1)
            }
            (Some(existing), Some(expected)) if existing.version == expected => {
                let next = expected + 1;
                guard.months.insert(key, Versioned { version: next, value: doc });
                Ok(next)
            }
            _ => Err(StoreError::CasConflict),
        }
    }

    async fn load_leave(&self, id: Uuid) -> Result<Option<Versioned<LeaveRequest>>, StoreError> {
        let guard = self.records.read().await;
        Ok(guard.leaves.get(&id).cloned())
    }

    async fn insert_leave(&self, request: LeaveRequest) -> Result<u64, StoreError> {
        let mut guard = self.records.write().await;
        if guard.leaves.contains_key(&request.id) {
            return Err(StoreError::CasConflict);
        }
        guard
            .leaves
            .insert(request.id, Versioned { version: 1, value: request });
        Ok(1)
    }

    async fn store_leave(
        &self,
        request: LeaveRequest,
        expected_version: u64,
    ) -> Result<u64, StoreError> {
        let mut guard = self.records.write().await;
        match guard.leaves.get(&request.id) {
            Some(existing) if existing.version == expected_version => {
                let next = expected_version + 1;
                guard
                    .leaves
                    .insert(request.id, Versioned { version: next, value: request });
                Ok(next)
            }
            _ => Err(StoreError::CasConflict),
        }
    }

    async fn leaves_for_employee(&self, employee_id: u64) -> Result<Vec<LeaveRequest>, StoreError> {
        let guard = self.records.read().await;
        let mut out: Vec<LeaveRequest> = guard
            .leaves
            .values()
            .filter(|v| v.value.employee_id == employee_id)
            .map(|v| v.value.clone())
            .collect();
        out.sort_by_key(|r| r.created_at);
        Ok(out)
    }

    async fn leaves_for_organization(
        &self,
        organization_id: u64,
    ) -> Result<Vec<LeaveRequest>, StoreError> {
        let guard = self.records.read().await;
        let mut out: Vec<LeaveRequest> = guard
            .leaves
            .values()
            .filter(|v| v.value.organization_id == organization_id)
            .map(|v| v.value.clone())
            .collect();
        out.sort_by_key(|r| r.created_at);
        Ok(out)
    }
}

#[async_trait]
impl ConfigSource for MemoryStore {
    async fn attendance_config(
        &self,
        organization_id: u64,
    ) -> Result<Option<AttendanceConfig>, StoreError> {
        let guard = self.config.read().await;
        Ok(guard.configs.get(&organization_id).cloned())
    }

    async fn holidays(&self, organization_id: u64) -> Result<Vec<Holiday>, StoreError> {
        let guard = self.config.read().await;
        Ok(guard.holidays.get(&organization_id).cloned().unwrap_or_default())
    }

    async fn user_override(
        &self,
        employee_id: u64,
    ) -> Result<Option<UserAttendanceOverride>, StoreError> {
        let guard = self.config.read().await;
        Ok(guard.overrides.get(&employee_id).cloned())
    }

    async fn active_employees(&self, organization_id: u64) -> Result<Vec<u64>, StoreError> {
        let guard = self.config.read().await;
        Ok(guard.employees.get(&organization_id).cloned().unwrap_or_default())
    }
}
