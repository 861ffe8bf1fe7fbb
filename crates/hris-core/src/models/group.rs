use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Level of a company group in the organization hierarchy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupLevel {
    Team,
    Part,
    Other(String),
}

impl GroupLevel {
    pub fn parse(level_name: &str) -> Self {
        match level_name {
            "TEAM" => GroupLevel::Team,
            "PART" => GroupLevel::Part,
            other => GroupLevel::Other(other.to_string()),
        }
    }
}

impl std::fmt::Display for GroupLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GroupLevel::Team => write!(f, "TEAM"),
            GroupLevel::Part => write!(f, "PART"),
            GroupLevel::Other(name) => write!(f, "{}", name),
        }
    }
}

/// One entry of a group's membership list.
///
/// Entries reference the employee through `employeeID`, but some payloads only
/// carry the generic `id`. Use `employee_ref` rather than reading either field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupMember {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "employeeID", default, skip_serializing_if = "Option::is_none")]
    pub employee_id: Option<String>,
    #[serde(rename = "companyGroupID", default, skip_serializing_if = "Option::is_none")]
    pub company_group_id: Option<String>,
    #[serde(rename = "mainGroup", default, skip_serializing_if = "Option::is_none")]
    pub main_group: Option<bool>,
    #[serde(rename = "fromDate", default, skip_serializing_if = "Option::is_none")]
    pub from_date: Option<String>,
    #[serde(rename = "toDate", default, skip_serializing_if = "Option::is_none")]
    pub to_date: Option<String>,
    #[serde(rename = "isInactive", default, skip_serializing_if = "Option::is_none")]
    pub is_inactive: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl GroupMember {
    /// Canonical employee reference: `employeeID` when present and non-empty,
    /// otherwise `id`.
    pub fn employee_ref(&self) -> Option<&str> {
        self.employee_id
            .as_deref()
            .filter(|s| !s.is_empty())
            .or_else(|| self.id.as_deref().filter(|s| !s.is_empty()))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompanyGroup {
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub name: String,
    #[serde(rename = "groupName", default, deserialize_with = "super::null_as_default")]
    pub group_name: String,
    #[serde(rename = "groupCode", default, deserialize_with = "super::null_as_default")]
    pub group_code: String,
    #[serde(rename = "orgCode", default, skip_serializing_if = "Option::is_none")]
    pub org_code: Option<String>,
    /// Observed values are "TEAM" and "PART"; see `level()`.
    #[serde(rename = "levelName", default, deserialize_with = "super::null_as_default")]
    pub level_name: String,
    #[serde(rename = "levelNameID", default, skip_serializing_if = "Option::is_none")]
    pub level_name_id: Option<String>,
    #[serde(rename = "leaderID", default, skip_serializing_if = "Option::is_none")]
    pub leader_id: Option<String>,
    /// Business key that child groups point at through `parent_group_id`.
    #[serde(rename = "oldGroupID", default, skip_serializing_if = "Option::is_none")]
    pub old_group_id: Option<String>,
    #[serde(rename = "parentGroupID", default, skip_serializing_if = "Option::is_none")]
    pub parent_group_id: Option<String>,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub employees: Vec<GroupMember>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(rename = "groupDesc", default, skip_serializing_if = "Option::is_none")]
    pub group_desc: Option<String>,
    #[serde(rename = "fromDate", default, skip_serializing_if = "Option::is_none")]
    pub from_date: Option<String>,
    #[serde(rename = "toDate", default, skip_serializing_if = "Option::is_none")]
    pub to_date: Option<String>,
    #[serde(rename = "isInactive", default, skip_serializing_if = "Option::is_none")]
    pub is_inactive: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CompanyGroup {
    pub fn level(&self) -> GroupLevel {
        GroupLevel::parse(&self.level_name)
    }

    pub fn is_team(&self) -> bool {
        self.level() == GroupLevel::Team
    }

    pub fn is_part(&self) -> bool {
        self.level() == GroupLevel::Part
    }

    pub fn is_led_by(&self, employee_id: &str) -> bool {
        self.leader_id.as_deref() == Some(employee_id)
    }

    /// Whether `self` is a child of `parent`. Children reference the parent's
    /// `oldGroupID`, never its internal `id`.
    pub fn is_child_of(&self, parent: &CompanyGroup) -> bool {
        match (self.parent_group_id.as_deref(), parent.old_group_id.as_deref()) {
            (Some(child_ref), Some(parent_key)) => !parent_key.is_empty() && child_ref == parent_key,
            _ => false,
        }
    }

    /// Canonical employee references of every membership entry, in order.
    pub fn member_refs(&self) -> impl Iterator<Item = &str> {
        self.employees.iter().filter_map(GroupMember::employee_ref)
    }
}

/// The `companyGroups` section of the initial data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompanyGroupsData {
    #[serde(rename = "companyGroups", default, deserialize_with = "super::null_as_default")]
    pub company_groups: Vec<CompanyGroup>,
    #[serde(rename = "approvalChange", default, skip_serializing_if = "Option::is_none")]
    pub approval_change: Option<Value>,
    #[serde(rename = "waitingApprovals", default, skip_serializing_if = "Option::is_none")]
    pub waiting_approvals: Option<Value>,
    #[serde(rename = "waitingApprovalID", default, skip_serializing_if = "Option::is_none")]
    pub waiting_approval_id: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
