//! User management service (UMS): companies, groups, users, drivers, auth.

use serde::Serialize;
use serde_json::Value;

use super::Payload;
use crate::rpc_operation;

// -- Companies and roles -----------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct CompanyCreate {
    #[serde(flatten)]
    pub body: Payload,
}
rpc_operation!(CompanyCreate => Ums, "company.create", Value);

#[derive(Debug, Clone, Default, Serialize)]
pub struct RoleList {}
rpc_operation!(RoleList => Ums, "role.list", Value);

// -- Groups ------------------------------------------------------------------

/// `id` is the company id.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupList {
    pub id: String,
    pub is_primary: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}
rpc_operation!(GroupList => Ums, "group.list", Value);

#[derive(Debug, Clone, Serialize)]
pub struct GroupCreate {
    #[serde(flatten)]
    pub body: Payload,
    pub id: String,
}
rpc_operation!(GroupCreate => Ums, "group.create", Value);

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupFindOne {
    pub id: String,
    pub group_id: String,
}
rpc_operation!(GroupFindOne => Ums, "group.find-one", Value);

#[derive(Debug, Clone, Serialize)]
pub struct GroupUpdate {
    #[serde(flatten)]
    pub body: Payload,
}
rpc_operation!(GroupUpdate => Ums, "group.update", Value);

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupDelete {
    pub group_id: String,
    pub company_id: String,
}
rpc_operation!(GroupDelete => Ums, "group.delete", Value);

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupAddRole {
    pub company_id: String,
    pub role_id: String,
    pub group_id: String,
}
rpc_operation!(GroupAddRole => Ums, "group.add-role", Value);

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupDeleteRole {
    pub company_id: String,
    pub role_id: String,
    pub group_id: String,
}
rpc_operation!(GroupDeleteRole => Ums, "group.delete-role", Value);

// -- Drivers -----------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DriverCreate {
    #[serde(flatten)]
    pub body: Payload,
    pub company_id: String,
}
rpc_operation!(DriverCreate => Ums, "driver.create", Value);

#[derive(Debug, Clone, Serialize)]
pub struct DriverUpdate {
    #[serde(flatten)]
    pub body: Payload,
    pub id: String,
}
rpc_operation!(DriverUpdate => Ums, "driver.update", Value);

// -- Users -------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct UserCreate {
    #[serde(flatten)]
    pub body: Payload,
}
rpc_operation!(UserCreate => Ums, "user.create", Value);

#[derive(Debug, Clone, Serialize)]
pub struct UserUpdate {
    #[serde(flatten)]
    pub body: Payload,
    pub id: String,
}
rpc_operation!(UserUpdate => Ums, "user.update", Value);

/// Groups the user belongs to.
#[derive(Debug, Clone, Serialize)]
pub struct UserGroupMembers {
    pub id: String,
}
rpc_operation!(UserGroupMembers => Ums, "user.group-members", Value);

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAddToGroup {
    pub id: String,
    pub group_id: String,
}
rpc_operation!(UserAddToGroup => Ums, "user.add-to-group", Value);

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDeleteFromGroup {
    pub id: String,
    pub group_id: String,
}
rpc_operation!(UserDeleteFromGroup => Ums, "user.delete-from-group", Value);

#[derive(Debug, Clone, Serialize)]
pub struct UserAddAttributes {
    pub id: String,
    pub attributes: Payload,
}
rpc_operation!(UserAddAttributes => Ums, "user.add-attributes", Value);

// -- Auth --------------------------------------------------------------------

/// Password grant. Never logged.
#[derive(Clone, Serialize, serde::Deserialize)]
pub struct AuthLogin {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for AuthLogin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthLogin")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}
rpc_operation!(AuthLogin => Ums, "auth.login", Value);

#[derive(Debug, Clone, Serialize)]
pub struct AuthRefreshToken {
    #[serde(flatten)]
    pub body: Payload,
}
rpc_operation!(AuthRefreshToken => Ums, "auth.refresh-token", Value);

#[derive(Debug, Clone, Serialize)]
pub struct AuthResetPassword {
    #[serde(flatten)]
    pub body: Payload,
}
rpc_operation!(AuthResetPassword => Ums, "auth.reset-password", Value);

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn login_debug_hides_password() {
        let login = AuthLogin {
            username: "dispatcher".into(),
            password: "hunter2".into(),
        };
        let out = format!("{login:?}");
        assert!(out.contains("dispatcher"));
        assert!(!out.contains("hunter2"));
    }

    #[test]
    fn role_list_is_an_empty_object() {
        assert_eq!(serde_json::to_value(RoleList::default()).unwrap(), json!({}));
    }

    #[test]
    fn attributes_are_nested() {
        let mut attributes = Payload::new();
        attributes.insert("locale".into(), json!("ru"));
        let op = UserAddAttributes {
            id: "u1".into(),
            attributes,
        };
        assert_eq!(
            serde_json::to_value(&op).unwrap(),
            json!({"id": "u1", "attributes": {"locale": "ru"}})
        );
    }
}
