//! Shared pieces of the integration data model

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The nil GUID, rejected on PUT and required in POST bodies
pub const NIL_GUID: &str = "00000000-0000-0000-0000-000000000000";

/// A reference to another resource by GUID: `{"id": "..."}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuidObject {
    pub id: String,
}

impl GuidObject {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// Generate a new lowercase record GUID
pub fn new_guid() -> String {
    Uuid::new_v4().to_string()
}

/// True if the value is the nil GUID (case-insensitive)
pub fn is_nil_guid(guid: &str) -> bool {
    guid.eq_ignore_ascii_case(NIL_GUID)
}
