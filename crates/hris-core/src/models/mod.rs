//! Data models for HRIS entities.
//!
//! This module contains the data structures exchanged with the HRIS backend:
//!
//! - `Employee`, `SimpleEmployee`: Person records from the initial data
//! - `CompanyGroup`, `GroupMember`: TEAM / PART groups and their membership
//! - `CachedInitialData`: The snapshot kept by the initial-data store
//! - Auth types: `LoginRequest`, `LoginResponse`, `User`
//! - Leave and work-report types
//!
//! Upstream records are heterogeneous, so most structs keep unknown fields in
//! a flattened `extra` map instead of rejecting them.

pub mod auth;
pub mod employee;
pub mod group;
pub mod initial_data;
pub mod leave;
pub mod work_report;

use serde::{Deserialize, Deserializer};

pub use auth::{LoginRequest, LoginResponse, Module, Operation, Permission, User};
pub use employee::{Employee, EmployeeProfile, SimpleEmployee};
pub use group::{CompanyGroup, CompanyGroupsData, GroupLevel, GroupMember};
pub use initial_data::{
    CachedInitialData, DecompressedInitialData, FieldConfig, FieldDataValue,
    GetInitialDataRequest, GetInitialDataResponse, LanguageKey,
};
pub use leave::{Holiday, LeaveBalance, LeaveInfo, LeaveInfoRequest};
pub use work_report::{
    summarize_work_blocks, EmployeeWorkSummary, ReportStatus, WorkBlock, WorkReportRequest,
    WorkReportResponse,
};

/// Read an explicit `null` the same way `#[serde(default)]` reads a missing
/// key. The backend sends `null` for empty strings and lists.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
