//! Repositories for facility resources: rooms and sites.

use crate::domain::{Room, RoomFilter, Site};
use crate::error::Result;
use async_trait::async_trait;
use sqlx::MySqlPool;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RoomRepository: Send + Sync {
    async fn list(&self, offset: i64, limit: i64, filter: RoomFilter) -> Result<(Vec<Room>, i64)>;
    async fn find_by_guid(&self, guid: &str) -> Result<Option<Room>>;
}

pub struct RoomRepositoryImpl {
    pool: MySqlPool,
}

impl RoomRepositoryImpl {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RoomRepository for RoomRepositoryImpl {
    async fn list(&self, offset: i64, limit: i64, filter: RoomFilter) -> Result<(Vec<Room>, i64)> {
        let building = filter.building.map(|b| b.id);
        let room_type = filter.room_type;

        let rooms = sqlx::query_as::<_, Room>(
            r#"
            SELECT id, title, number, floor, building, room_types, occupancies
            FROM rooms
            WHERE (? IS NULL OR building->>'$.id' = ?)
              AND (? IS NULL OR JSON_CONTAINS(room_types, JSON_OBJECT('type', ?)))
            ORDER BY number
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(&building)
        .bind(&building)
        .bind(&room_type)
        .bind(&room_type)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let row: (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*)
            FROM rooms
            WHERE (? IS NULL OR building->>'$.id' = ?)
              AND (? IS NULL OR JSON_CONTAINS(room_types, JSON_OBJECT('type', ?)))
            "#,
        )
        .bind(&building)
        .bind(&building)
        .bind(&room_type)
        .bind(&room_type)
        .fetch_one(&self.pool)
        .await?;

        Ok((rooms, row.0))
    }

    async fn find_by_guid(&self, guid: &str) -> Result<Option<Room>> {
        let room = sqlx::query_as::<_, Room>(
            r#"
            SELECT id, title, number, floor, building, room_types, occupancies
            FROM rooms
            WHERE id = ?
            "#,
        )
        .bind(guid)
        .fetch_optional(&self.pool)
        .await?;

        Ok(room)
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SiteRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<Site>>;
    async fn find_by_guid(&self, guid: &str) -> Result<Option<Site>>;
}

pub struct SiteRepositoryImpl {
    pool: MySqlPool,
}

impl SiteRepositoryImpl {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SiteRepository for SiteRepositoryImpl {
    async fn list(&self) -> Result<Vec<Site>> {
        let sites = sqlx::query_as::<_, Site>(
            r#"
            SELECT id, code, title, description, organization
            FROM sites
            ORDER BY code
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(sites)
    }

    async fn find_by_guid(&self, guid: &str) -> Result<Option<Site>> {
        let site = sqlx::query_as::<_, Site>(
            r#"
            SELECT id, code, title, description, organization
            FROM sites
            WHERE id = ?
            "#,
        )
        .bind(guid)
        .fetch_optional(&self.pool)
        .await?;

        Ok(site)
    }
}
