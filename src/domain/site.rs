//! Site resource

use super::common::GuidObject;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Site (campus location) resource, read-only through this API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Site {
    pub id: String,
    pub code: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[sqlx(json(nullable))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization: Option<GuidObject>,
}
