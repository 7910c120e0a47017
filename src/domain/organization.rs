//! Organization resource and its criteria filter

use super::common::GuidObject;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Role an organization plays toward the institution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OrganizationRoleType {
    Vendor,
    Partner,
    Affiliate,
    Constituent,
}

impl std::fmt::Display for OrganizationRoleType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrganizationRoleType::Vendor => write!(f, "vendor"),
            OrganizationRoleType::Partner => write!(f, "partner"),
            OrganizationRoleType::Affiliate => write!(f, "affiliate"),
            OrganizationRoleType::Constituent => write!(f, "constituent"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationRole {
    pub role: OrganizationRoleType,
}

/// External identifier attached to an organization record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationCredential {
    #[serde(rename = "type")]
    pub credential_type: String,
    pub value: String,
}

/// Organization resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    pub id: String,
    pub title: String,
    #[sqlx(json(nullable))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roles: Option<Vec<OrganizationRole>>,
    #[sqlx(json(nullable))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credentials: Option<Vec<OrganizationCredential>>,
    #[sqlx(json(nullable))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub addresses: Option<Vec<GuidObject>>,
}

/// Filter bound from `?criteria={...}` on the organizations list route
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct OrganizationFilter {
    pub role: Option<OrganizationRoleType>,
    pub credential_value: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_wire_format() {
        let role = OrganizationRole {
            role: OrganizationRoleType::Vendor,
        };
        assert_eq!(serde_json::to_string(&role).unwrap(), r#"{"role":"vendor"}"#);
    }

    #[test]
    fn test_filter_deserialization() {
        let filter: OrganizationFilter =
            serde_json::from_str(r#"{"role":"partner","credentialValue":"0004932"}"#).unwrap();
        assert_eq!(filter.role, Some(OrganizationRoleType::Partner));
        assert_eq!(filter.credential_value.as_deref(), Some("0004932"));
    }

    #[test]
    fn test_credential_type_key_renamed() {
        let cred = OrganizationCredential {
            credential_type: "erpPersonId".to_string(),
            value: "0004932".to_string(),
        };
        let json = serde_json::to_value(&cred).unwrap();
        assert_eq!(json["type"], "erpPersonId");
    }
}
