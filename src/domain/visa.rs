//! Person visa resource

use super::common::GuidObject;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VisaCategory {
    Immigrant,
    NonImmigrant,
}

/// Derived from the expiration date, only in the version 11 representation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VisaStatus {
    Current,
    Expired,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisaType {
    pub category: VisaCategory,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<GuidObject>,
}

/// Person visa resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PersonVisa {
    pub id: String,
    #[sqlx(json)]
    pub person: GuidObject,
    #[sqlx(json)]
    pub visa_type: VisaType,
    /// Filled by the service from `expires_on`; never stored
    #[sqlx(skip)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visa_status: Option<VisaStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visa_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requested_on: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issued_on: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_on: Option<NaiveDate>,
}

impl PersonVisa {
    /// View transform for the version 6 representation
    pub fn into_v6(mut self) -> Self {
        self.visa_status = None;
        self
    }

    /// Derive the status from the expiration date relative to `today`
    pub fn with_status(mut self, today: NaiveDate) -> Self {
        self.visa_status = Some(match self.expires_on {
            Some(expires) if expires < today => VisaStatus::Expired,
            _ => VisaStatus::Current,
        });
        self
    }
}

/// Filter bound from `?person={...}` on the person visas list route
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct VisaFilter {
    pub person: Option<GuidObject>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> PersonVisa {
        PersonVisa {
            id: "v-1".to_string(),
            person: GuidObject::new("p-1"),
            visa_type: VisaType {
                category: VisaCategory::NonImmigrant,
                detail: None,
            },
            visa_status: None,
            visa_id: Some("F1-2024-001".to_string()),
            requested_on: None,
            issued_on: NaiveDate::from_ymd_opt(2024, 1, 15),
            expires_on: NaiveDate::from_ymd_opt(2026, 1, 15),
        }
    }

    #[test]
    fn test_status_derivation() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        assert_eq!(sample().with_status(today).visa_status, Some(VisaStatus::Current));

        let later = NaiveDate::from_ymd_opt(2026, 6, 1).unwrap();
        assert_eq!(sample().with_status(later).visa_status, Some(VisaStatus::Expired));

        let mut open_ended = sample();
        open_ended.expires_on = None;
        assert_eq!(
            open_ended.with_status(later).visa_status,
            Some(VisaStatus::Current)
        );
    }

    #[test]
    fn test_v6_view_drops_status() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let v6 = sample().with_status(today).into_v6();
        assert!(v6.visa_status.is_none());
    }

    #[test]
    fn test_wire_format() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["visaType"]["category"], "nonImmigrant");
        assert_eq!(json["visaId"], "F1-2024-001");
        assert!(json.get("visaStatus").is_none());
    }
}
