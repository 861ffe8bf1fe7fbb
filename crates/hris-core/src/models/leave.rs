use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Holiday {
    #[serde(rename = "holidayID", default)]
    pub holiday_id: String,
    #[serde(default)]
    pub date: String,
    #[serde(rename = "type", default)]
    pub holiday_type: i32,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "companyID", default)]
    pub company_id: String,
}

/// Grant / use / remain counters shared by several leave kinds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LeaveBalance {
    #[serde(default)]
    pub grant: f64,
    #[serde(rename = "use", default)]
    pub used: f64,
    #[serde(default)]
    pub remain: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnnualLeave {
    pub over_used_last_year: f64,
    pub grant: f64,
    pub grant_in_advance: f64,
    #[serde(rename = "use")]
    pub used: f64,
    pub origin_use: f64,
    pub use_by_month: f64,
    pub remain: f64,
    pub unused_annual_leave: f64,
    pub origin_unused_annual_leave: f64,
    pub unused_last_year_use_this_year: f64,
    pub used_annual_leave: f64,
}

impl AnnualLeave {
    pub fn balance(&self) -> LeaveBalance {
        LeaveBalance {
            grant: self.grant,
            used: self.used,
            remain: self.remain,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MaternityLeave {
    #[serde(rename = "use")]
    pub used: f64,
    pub pregnancy_check_grant: f64,
    pub pregnancy_check_paid_grant: f64,
    pub pregnancy_check_use: f64,
    pub birth_leave_start_date: Option<String>,
    pub birth_leave_use: f64,
    pub birth_leave_end_date: Option<String>,
    pub fostering_child_use: f64,
    pub child_sick_grant: f64,
    pub child_sick_use: f64,
    pub other_use: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CongratsCondolenceLeave {
    #[serde(rename = "use")]
    pub used: f64,
    pub birth_use: f64,
    pub birth_start_date: Option<String>,
    pub birth_end_date: Option<String>,
    pub marriage_own_use: f64,
    pub marriage_child_use: f64,
    pub marriage_parents_use: f64,
    /// Misspelled by the backend.
    #[serde(rename = "marriageSibilingUse")]
    pub marriage_sibling_use: f64,
    pub funeral_child_use: f64,
    pub funeral_spouse_use: f64,
    pub funeral_parents_use: f64,
    pub funeral_sibling_use: f64,
    pub funeral_grand_parents_use: f64,
}

/// Body of `POST /Leave/GetLeaveInfoByYear`; `id` is the employee id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaveInfoRequest {
    pub year: i32,
    pub id: String,
}

/// Response of `POST /Leave/GetLeaveInfoByYear`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LeaveInfo {
    pub annual_leave: AnnualLeave,
    pub refresh_leave: LeaveBalance,
    pub maternity_leave: MaternityLeave,
    /// Misspelled by the backend.
    #[serde(rename = "officalLeave")]
    pub official_leave: LeaveBalance,
    pub sick_leave: LeaveBalance,
    pub congrats_condolence_leave: CongratsCondolenceLeave,
    pub others: LeaveBalance,
}
