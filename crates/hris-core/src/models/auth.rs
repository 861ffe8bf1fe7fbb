use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
    #[serde(rename = "rememberMe")]
    pub remember_me: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Module {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "moduleName", default)]
    pub module_name: String,
    #[serde(rename = "isPermission", default)]
    pub is_permission: bool,
    #[serde(rename = "sortOrder", default)]
    pub sort_order: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModuleOperationGrant {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "groupModuleID", default)]
    pub group_module_id: String,
    #[serde(rename = "operationID", default)]
    pub operation_id: String,
    #[serde(default)]
    pub operation: Operation,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModuleOperation {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub module: Module,
    #[serde(rename = "dataValue", default)]
    pub data_value: Option<String>,
    #[serde(rename = "isSentEmail", default)]
    pub is_sent_email: bool,
    #[serde(default)]
    pub operations: Vec<ModuleOperationGrant>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Permission {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "positionJobID", default)]
    pub position_job_id: Option<String>,
    #[serde(rename = "positionJob", default)]
    pub position_job: Value,
    #[serde(rename = "userID", default)]
    pub user_id: Option<String>,
    #[serde(rename = "isEnabled", default)]
    pub is_enabled: bool,
    #[serde(rename = "isSentEmail", default)]
    pub is_sent_email: bool,
    #[serde(rename = "moduleOperations", default)]
    pub module_operations: Vec<ModuleOperation>,
}

/// Response of `POST /account/signin`. The grants are carried along for
/// display; the client only relies on `token` and `employee_id`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub username: String,
    #[serde(rename = "fullName", default)]
    pub full_name: String,
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub permission: Permission,
    pub token: String,
    #[serde(rename = "employeeID", default)]
    pub employee_id: String,
    #[serde(rename = "companyLanguage", default)]
    pub company_language: String,
    #[serde(default)]
    pub operations: Vec<Operation>,
    #[serde(default)]
    pub modules: Vec<Module>,
}

impl LoginResponse {
    /// Names of modules the user has been granted, sorted by `sortOrder`.
    pub fn granted_modules(&self) -> Vec<&str> {
        let mut modules: Vec<&Module> = self.modules.iter().filter(|m| m.is_permission).collect();
        modules.sort_by_key(|m| m.sort_order);
        modules.into_iter().map(|m| m.module_name.as_str()).collect()
    }
}

/// The signed-in user as kept by the session store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub username: String,
    #[serde(rename = "fullName")]
    pub full_name: String,
    #[serde(rename = "employeeID")]
    pub employee_id: String,
    pub token: String,
}

impl From<&LoginResponse> for User {
    fn from(response: &LoginResponse) -> Self {
        Self {
            id: response.id.clone(),
            email: response.email.clone(),
            username: response.username.clone(),
            full_name: response.full_name.clone(),
            employee_id: response.employee_id.clone(),
            token: response.token.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_login_response() {
        let response: LoginResponse = serde_json::from_value(json!({
            "id": "U1",
            "email": "a@example.com",
            "username": "a",
            "fullName": "Nguyen Van A",
            "language": "vi-VN",
            "token": "tok",
            "employeeID": "E1",
            "companyLanguage": "en-US",
            "permission": {
                "id": "P1",
                "positionJobID": null,
                "positionJob": null,
                "userID": "U1",
                "isEnabled": true,
                "isSentEmail": false,
                "moduleOperations": [{
                    "id": "MO1",
                    "module": {"id": "M1", "moduleName": "Leave", "isPermission": true, "sortOrder": 2},
                    "dataValue": null,
                    "isSentEmail": false,
                    "operations": [{"id": "G1", "groupModuleID": "MO1", "groupModule": null,
                                    "operationID": "O1", "operation": {"id": "O1", "name": "View", "value": "view"}}]
                }]
            },
            "operations": [],
            "modules": [
                {"id": "M2", "moduleName": "Work", "isPermission": true, "sortOrder": 1},
                {"id": "M1", "moduleName": "Leave", "isPermission": true, "sortOrder": 2},
                {"id": "M3", "moduleName": "Admin", "isPermission": false, "sortOrder": 0}
            ]
        }))
        .unwrap();

        assert_eq!(response.employee_id, "E1");
        assert_eq!(response.permission.module_operations[0].operations[0].operation.name, "View");
        assert_eq!(response.granted_modules(), vec!["Work", "Leave"]);

        let user = User::from(&response);
        assert_eq!(user.full_name, "Nguyen Van A");
        assert_eq!(user.token, "tok");
    }

    #[test]
    fn test_login_request_wire_format() {
        let request = LoginRequest {
            username: "a".into(),
            password: "p".into(),
            remember_me: true,
        };
        assert_eq!(
            serde_json::to_value(request).unwrap(),
            json!({"username": "a", "password": "p", "rememberMe": true})
        );
    }
}
