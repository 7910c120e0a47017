//! Country and country ISO code resources

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Country resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Country {
    pub id: String,
    pub code: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// ISO 3166-1 alpha-3 code, settable via PUT
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iso_code: Option<String>,
}

/// Country ISO code resource (read-only)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CountryIsoCode {
    pub id: String,
    pub title: String,
    pub iso_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}
