use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Field names that may carry an employee's manager reference, in lookup order.
/// The profile's own `managerID` is consulted after all of these.
pub const MANAGER_FIELDS: [&str; 3] = ["managerID", "supervisorID", "reportToID"];

/// Field names that may carry the group an employee is filed under.
pub const GROUP_FIELDS: [&str; 3] = ["companyGroupID", "departmentID", "divisionID"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmployeeProfile {
    #[serde(rename = "pictureUrl", default, skip_serializing_if = "Option::is_none")]
    pub picture_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(rename = "positionID", default, skip_serializing_if = "Option::is_none")]
    pub position_id: Option<String>,
    #[serde(rename = "managerID", default, skip_serializing_if = "Option::is_none")]
    pub manager_id: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// An employee record as delivered in the initial-data snapshot.
///
/// `employee_id` is the business key used by every organizational lookup.
/// The internal `id` and `user_id` belong to other subsystems and are kept
/// only for display and the simple-employee projection. Fields the client
/// does not model land in `extra` and survive a round trip through the cache.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    #[serde(rename = "employeeID")]
    pub employee_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "userID", default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(rename = "employeeCode", default, deserialize_with = "super::null_as_default")]
    pub employee_code: String,
    #[serde(rename = "englishName", default, deserialize_with = "super::null_as_default")]
    pub english_name: String,
    #[serde(rename = "loginID", default, deserialize_with = "super::null_as_default")]
    pub login_id: String,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub name: String,
    /// The backend sends either a string or a number here.
    #[serde(default)]
    pub status: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(rename = "dateOfJoin", default, skip_serializing_if = "Option::is_none")]
    pub date_of_join: Option<String>,
    #[serde(rename = "dateOfResignation", default, skip_serializing_if = "Option::is_none")]
    pub date_of_resignation: Option<String>,
    #[serde(rename = "employeeProfile", default, deserialize_with = "super::null_as_default")]
    pub employee_profile: EmployeeProfile,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Employee {
    /// Resolve the manager reference: the first non-empty value among
    /// `managerID`, `supervisorID`, `reportToID`, then the profile's
    /// `managerID`.
    pub fn manager_id(&self) -> Option<&str> {
        MANAGER_FIELDS
            .iter()
            .find_map(|field| non_empty_str(self.extra.get(*field)))
            .or_else(|| {
                self.employee_profile
                    .manager_id
                    .as_deref()
                    .filter(|s| !s.is_empty())
            })
    }

    /// Whether any of the group fields names `group_id`.
    pub fn belongs_to_group(&self, group_id: &str) -> bool {
        GROUP_FIELDS
            .iter()
            .any(|field| non_empty_str(self.extra.get(*field)) == Some(group_id))
    }

    /// Name followed by the employee code, e.g. "Nguyen Van A (E0012)".
    pub fn display_name(&self) -> String {
        if self.employee_code.is_empty() {
            self.name.clone()
        } else {
            format!("{} ({})", self.name, self.employee_code)
        }
    }

    pub fn position(&self) -> Option<&str> {
        self.employee_profile.position.as_deref()
    }

    pub fn to_simple(&self) -> SimpleEmployee {
        SimpleEmployee {
            id: self.id.clone().unwrap_or_else(|| self.employee_id.clone()),
            name: self.name.clone(),
            employee_code: self.employee_code.clone(),
        }
    }
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str).filter(|s| !s.is_empty())
}

/// Lightweight projection used for pickers and name lookups.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimpleEmployee {
    pub id: String,
    pub name: String,
    #[serde(rename = "employeeCode")]
    pub employee_code: String,
}
