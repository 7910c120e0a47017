//! Room resource and its criteria filter

use super::common::GuidObject;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomType {
    #[serde(rename = "type")]
    pub room_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomOccupancy {
    pub max_occupancy: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room_layout_type: Option<String>,
}

/// Room resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub floor: Option<String>,
    #[sqlx(json)]
    pub building: GuidObject,
    #[sqlx(json(nullable))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room_types: Option<Vec<RoomType>>,
    #[sqlx(json(nullable))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub occupancies: Option<Vec<RoomOccupancy>>,
}

impl Room {
    /// View transform for the version 6 representation
    pub fn into_v6(mut self) -> Self {
        self.occupancies = None;
        self
    }
}

/// Filter bound from `?criteria={...}` on the rooms list route
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RoomFilter {
    pub building: Option<GuidObject>,
    pub room_type: Option<String>,
}
