use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::Employee;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkReportRequest {
    /// YYYY-MM-DD
    #[serde(rename = "fromDate")]
    pub from_date: String,
    /// YYYY-MM-DD
    #[serde(rename = "toDate")]
    pub to_date: String,
    #[serde(rename = "employeeIDs")]
    pub employee_ids: Vec<String>,
    #[serde(rename = "originalGroupID", default, skip_serializing_if = "Option::is_none")]
    pub original_group_id: Option<Vec<String>>,
    #[serde(rename = "projectID", default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(rename = "featureID", default, skip_serializing_if = "Option::is_none")]
    pub feature_id: Option<String>,
    #[serde(rename = "workTypeID", default, skip_serializing_if = "Option::is_none")]
    pub work_type_id: Option<String>,
}

impl WorkReportRequest {
    /// Request covering `from..=to` for the given employees, no filters.
    pub fn for_range(from: NaiveDate, to: NaiveDate, employee_ids: Vec<String>) -> Self {
        Self {
            from_date: from.format(DATE_FORMAT).to_string(),
            to_date: to.format(DATE_FORMAT).to_string(),
            employee_ids,
            ..Default::default()
        }
    }
}

/// Date format of report ranges.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportStatus {
    #[serde(rename = "requesterID", default, deserialize_with = "super::null_as_default")]
    pub requester_id: String,
    #[serde(rename = "fromDate", default, deserialize_with = "super::null_as_default")]
    pub from_date: String,
    #[serde(rename = "toDate", default, deserialize_with = "super::null_as_default")]
    pub to_date: String,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub status: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkBlock {
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub status: bool,
    #[serde(rename = "assigneeID", default, deserialize_with = "super::null_as_default")]
    pub assignee_id: String,
    #[serde(rename = "reporterID", default, deserialize_with = "super::null_as_default")]
    pub reporter_id: String,
    #[serde(rename = "originalProjectID", default, deserialize_with = "super::null_as_default")]
    pub original_project_id: String,
    #[serde(rename = "workTypeID", default, deserialize_with = "super::null_as_default")]
    pub work_type_id: String,
    #[serde(rename = "featureID", default, deserialize_with = "super::null_as_default")]
    pub feature_id: String,
    #[serde(rename = "subFeatureID", default, deserialize_with = "super::null_as_default")]
    pub sub_feature_id: String,
    #[serde(rename = "targetID", default)]
    pub target_id: Option<String>,
    #[serde(rename = "cityID", default)]
    pub city_id: Option<String>,
    #[serde(rename = "startDate", default, deserialize_with = "super::null_as_default")]
    pub start_date: String,
    #[serde(rename = "endDate", default, deserialize_with = "super::null_as_default")]
    pub end_date: String,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub hours: f64,
    #[serde(rename = "type", default, deserialize_with = "super::null_as_default")]
    pub block_type: i32,
    #[serde(rename = "realData", default, deserialize_with = "super::null_as_default")]
    pub real_data: f64,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub description: String,
    #[serde(default)]
    pub task: Value,
    #[serde(rename = "createDate", default, deserialize_with = "super::null_as_default")]
    pub create_date: String,
}

impl WorkBlock {
    /// Calendar day of the block's start, the first ten characters of an ISO
    /// timestamp.
    pub fn work_day(&self) -> &str {
        self.start_date.get(..10).unwrap_or(&self.start_date)
    }
}

/// Response of `POST /WorkBlock/GetWorkBlocks`. The backend names the block
/// list `wBlocks`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkReportResponse {
    #[serde(rename = "employeeIDs", default, deserialize_with = "super::null_as_default")]
    pub employee_ids: Vec<String>,
    #[serde(rename = "reportStatus", default, deserialize_with = "super::null_as_default")]
    pub report_status: Vec<ReportStatus>,
    #[serde(rename = "wBlocks", default, deserialize_with = "super::null_as_default")]
    pub w_blocks: Vec<WorkBlock>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeWorkSummary {
    #[serde(rename = "employeeID")]
    pub employee_id: String,
    #[serde(rename = "employeeName")]
    pub employee_name: String,
    #[serde(rename = "employeeAvatar", skip_serializing_if = "Option::is_none")]
    pub employee_avatar: Option<String>,
    #[serde(rename = "totalHours")]
    pub total_hours: f64,
    #[serde(rename = "workDays")]
    pub work_days: usize,
    #[serde(rename = "workBlocks")]
    pub work_blocks: Vec<WorkBlock>,
}

/// Group the blocks of a report per requested employee, in the order the
/// server listed the employees. Employees missing from `employees` are named
/// by their id.
pub fn summarize_work_blocks(
    response: &WorkReportResponse,
    employees: &[Employee],
) -> Vec<EmployeeWorkSummary> {
    response
        .employee_ids
        .iter()
        .map(|employee_id| {
            let employee = employees.iter().find(|e| &e.employee_id == employee_id);
            let work_blocks: Vec<WorkBlock> = response
                .w_blocks
                .iter()
                .filter(|b| &b.assignee_id == employee_id)
                .cloned()
                .collect();
            let work_days = work_blocks
                .iter()
                .map(WorkBlock::work_day)
                .filter(|d| !d.is_empty())
                .collect::<BTreeSet<_>>()
                .len();

            EmployeeWorkSummary {
                employee_id: employee_id.clone(),
                employee_name: employee
                    .map(|e| e.name.clone())
                    .unwrap_or_else(|| employee_id.clone()),
                employee_avatar: employee.and_then(|e| e.employee_profile.picture_url.clone()),
                total_hours: work_blocks.iter().map(|b| b.hours).sum(),
                work_days,
                work_blocks,
            }
        })
        .collect()
}
