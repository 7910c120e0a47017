//! Language resource

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Language resource. `code` may not be removed or changed for an existing
/// language, and `title` may not change once set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Language {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    pub title: String,
    /// ISO 639-3 code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iso_code: Option<String>,
}
