use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{CompanyGroup, CompanyGroupsData, Employee, SimpleEmployee};

/// Language selector wrapper expected by the initial-data endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LanguageKey {
    pub key: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetInitialDataRequest {
    #[serde(rename = "hashValue")]
    pub hash_value: Option<String>,
    pub language: LanguageKey,
}

impl GetInitialDataRequest {
    pub fn new(hash_value: Option<String>, language: &str) -> Self {
        Self {
            hash_value,
            language: LanguageKey {
                key: Some(language.to_string()),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetInitialDataResponse {
    #[serde(rename = "hashMatched", default, deserialize_with = "super::null_as_default")]
    pub hash_matched: bool,
    #[serde(rename = "hashValue", default, deserialize_with = "super::null_as_default")]
    pub hash_value: String,
    /// Base64 of the zlib-deflated JSON document.
    #[serde(rename = "initialCompressedData", default, skip_serializing_if = "Option::is_none")]
    pub initial_compressed_data: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldDataValue {
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub value: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldConfig {
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub id: String,
    #[serde(rename = "fieldName", default, deserialize_with = "super::null_as_default")]
    pub field_name: String,
    #[serde(rename = "fieldDataValues", default, deserialize_with = "super::null_as_default")]
    pub field_data_values: Vec<FieldDataValue>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl FieldConfig {
    /// Display value of option `id`, if this field defines it.
    pub fn value_of(&self, id: &str) -> Option<&str> {
        self.field_data_values
            .iter()
            .find(|v| v.id == id)
            .map(|v| v.value.as_str())
    }
}

/// Work weeks, org configs and employee globals are opaque to the client.
pub type WorkWeek = Value;
pub type OrgConfig = Value;
pub type EmployeeGlobal = Value;

/// The document carried inside `initialCompressedData`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DecompressedInitialData {
    #[serde(rename = "companyGroups", default, deserialize_with = "super::null_as_default")]
    pub company_groups: CompanyGroupsData,
    #[serde(rename = "employeeList", default, deserialize_with = "super::null_as_default")]
    pub employee_list: Vec<Employee>,
    #[serde(rename = "fieldConfigs", default, deserialize_with = "super::null_as_default")]
    pub field_configs: Vec<FieldConfig>,
    #[serde(rename = "listWorkWeek", default, deserialize_with = "super::null_as_default")]
    pub list_work_week: Vec<WorkWeek>,
    #[serde(rename = "orgConfigs", default, deserialize_with = "super::null_as_default")]
    pub org_configs: Vec<OrgConfig>,
    #[serde(rename = "employeeGlobals", default, deserialize_with = "super::null_as_default")]
    pub employee_globals: Vec<EmployeeGlobal>,
}

/// Snapshot held by the initial-data store for one server hash.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CachedInitialData {
    #[serde(rename = "fieldConfigs", default, deserialize_with = "super::null_as_default")]
    pub field_configs: Vec<FieldConfig>,
    #[serde(rename = "companyGroups", default, deserialize_with = "super::null_as_default")]
    pub company_groups: CompanyGroupsData,
    #[serde(rename = "listWorkWeek", default, deserialize_with = "super::null_as_default")]
    pub list_work_week: Vec<WorkWeek>,
    #[serde(rename = "simpleEmpList", default, deserialize_with = "super::null_as_default")]
    pub simple_emp_list: Vec<SimpleEmployee>,
    #[serde(rename = "orgConfigs", default, deserialize_with = "super::null_as_default")]
    pub org_configs: Vec<OrgConfig>,
    #[serde(rename = "employeeGlobals", default, deserialize_with = "super::null_as_default")]
    pub employee_globals: Vec<EmployeeGlobal>,
    #[serde(rename = "employeeList", default, deserialize_with = "super::null_as_default")]
    pub employee_list: Vec<Employee>,
}

impl From<DecompressedInitialData> for CachedInitialData {
    fn from(data: DecompressedInitialData) -> Self {
        let simple_emp_list = data.employee_list.iter().map(Employee::to_simple).collect();
        Self {
            field_configs: data.field_configs,
            company_groups: data.company_groups,
            list_work_week: data.list_work_week,
            simple_emp_list,
            org_configs: data.org_configs,
            employee_globals: data.employee_globals,
            employee_list: data.employee_list,
        }
    }
}

impl CachedInitialData {
    pub fn employees(&self) -> &[Employee] {
        &self.employee_list
    }

    pub fn groups(&self) -> &[CompanyGroup] {
        &self.company_groups.company_groups
    }

    pub fn field_config(&self, field_name: &str) -> Option<&FieldConfig> {
        self.field_configs.iter().find(|f| f.field_name == field_name)
    }
}
