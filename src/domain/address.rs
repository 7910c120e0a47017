//! Address resource and its query filters

use super::common::GuidObject;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Address resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub id: String,
    #[sqlx(json)]
    pub address_lines: Vec<String>,
    #[sqlx(json(nullable))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub place: Option<AddressPlace>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    /// Not present in the version 6 representation
    #[sqlx(json(nullable))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geographic_areas: Option<Vec<GuidObject>>,
}

impl Address {
    /// View transform for the version 6 representation
    pub fn into_v6(mut self) -> Self {
        self.geographic_areas = None;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressPlace {
    pub country: AddressCountry,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressCountry {
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locality: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<AddressRegion>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressRegion {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// Filter bound from `?personFilter={...}` on the version 11.1.0 list route
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AddressPersonFilter {
    pub person_filter: Option<GuidObject>,
}

/// Body of the `POST /qapi/addresses` query
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AddressQueryCriteria {
    #[validate(length(min = 1, message = "at least one person id is required"))]
    pub person_ids: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Address {
        Address {
            id: "aa11".to_string(),
            address_lines: vec!["1 Main St".to_string()],
            place: Some(AddressPlace {
                country: AddressCountry {
                    code: "USA".to_string(),
                    locality: Some("Fairfax".to_string()),
                    region: Some(AddressRegion {
                        code: Some("US-VA".to_string()),
                        title: None,
                    }),
                    postal_code: Some("22030".to_string()),
                },
            }),
            latitude: None,
            longitude: None,
            geographic_areas: Some(vec![GuidObject::new("ga-1")]),
        }
    }

    #[test]
    fn test_v6_view_drops_geographic_areas() {
        let v6 = sample().into_v6();
        assert!(v6.geographic_areas.is_none());
        assert_eq!(v6.address_lines, vec!["1 Main St".to_string()]);
    }

    #[test]
    fn test_wire_format() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["addressLines"][0], "1 Main St");
        assert_eq!(json["place"]["country"]["postalCode"], "22030");
        assert_eq!(json["geographicAreas"][0]["id"], "ga-1");
    }

    #[test]
    fn test_query_criteria_requires_person_ids() {
        use validator::Validate;
        let empty = AddressQueryCriteria { person_ids: vec![] };
        assert!(empty.validate().is_err());

        let ok = AddressQueryCriteria {
            person_ids: vec!["p1".to_string()],
        };
        assert!(ok.validate().is_ok());
    }
}
