//! Currency resource

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Currency resource. `code` is the ISO 4217 code and may not change once set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Currency {
    pub id: String,
    pub code: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}
