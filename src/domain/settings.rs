//! Configuration settings and default settings resources
//!
//! Both resources share the same shape: a keyed setting with a display title,
//! a description, and a source (the backing ERP valcode entry). The options
//! representation lists the values a setting may take.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// The backing value a setting currently points at
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsSource {
    pub title: String,
    pub value: String,
}

/// Resources a setting applies to, used as the `scope.resources` filter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsScope {
    pub resources: Vec<String>,
}

/// Configuration settings resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ConfigurationSettings {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[sqlx(json(nullable))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<SettingsSource>,
    #[sqlx(json(nullable))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<SettingsScope>,
}

/// Default settings resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct DefaultSettings {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[sqlx(json(nullable))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<SettingsSource>,
    #[sqlx(json(nullable))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<SettingsScope>,
}

/// One selectable value for a setting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsSourceOption {
    pub title: String,
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
}

/// Options representation of a setting, served under the options media type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SettingsOptions {
    pub id: String,
    pub title: String,
    #[sqlx(json(nullable))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<SettingsScope>,
    #[sqlx(json(nullable))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_options: Option<Vec<SettingsSourceOption>>,
}

/// Filter bound from `?criteria={...}` on both settings list routes
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SettingsFilter {
    pub scope: Option<SettingsScope>,
}

impl SettingsFilter {
    /// Resource names requested by the filter, empty when unfiltered
    pub fn resources(&self) -> Vec<String> {
        self.scope
            .as_ref()
            .map(|s| s.resources.clone())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_filter_resources() {
        let filter: SettingsFilter =
            serde_json::from_str(r#"{"scope":{"resources":["persons","addresses"]}}"#).unwrap();
        assert_eq!(filter.resources(), vec!["persons", "addresses"]);

        let empty = SettingsFilter::default();
        assert!(empty.resources().is_empty());
    }

    #[test]
    fn test_configuration_settings_wire_format() {
        let settings = ConfigurationSettings {
            id: "cs-1".to_string(),
            title: "Check Faculty Load".to_string(),
            description: Some("Controls section load checking.".to_string()),
            source: Some(SettingsSource {
                title: "Yes".to_string(),
                value: "Y".to_string(),
            }),
            scope: Some(SettingsScope {
                resources: vec!["section-instructors".to_string()],
            }),
        };
        let json = serde_json::to_value(&settings).unwrap();
        assert_eq!(json["source"]["value"], "Y");
        assert_eq!(json["scope"]["resources"][0], "section-instructors");
    }
}
