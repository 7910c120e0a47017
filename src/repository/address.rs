//! Address repository

use crate::domain::Address;
use crate::error::{ApiError, Result};
use async_trait::async_trait;
use sqlx::MySqlPool;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AddressRepository: Send + Sync {
    async fn list(
        &self,
        offset: i64,
        limit: i64,
        person_guid: Option<String>,
    ) -> Result<(Vec<Address>, i64)>;
    async fn find_by_guid(&self, guid: &str) -> Result<Option<Address>>;
    async fn query_by_person_ids(&self, person_ids: &[String]) -> Result<Vec<Address>>;
    async fn update(&self, address: &Address) -> Result<Address>;
    async fn delete(&self, guid: &str) -> Result<()>;
}

pub struct AddressRepositoryImpl {
    pool: MySqlPool,
}

impl AddressRepositoryImpl {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AddressRepository for AddressRepositoryImpl {
    async fn list(
        &self,
        offset: i64,
        limit: i64,
        person_guid: Option<String>,
    ) -> Result<(Vec<Address>, i64)> {
        let addresses = sqlx::query_as::<_, Address>(
            r#"
            SELECT id, address_lines, place, latitude, longitude, geographic_areas
            FROM addresses
            WHERE (? IS NULL OR person_id = ?)
            ORDER BY id
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(&person_guid)
        .bind(&person_guid)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let row: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM addresses WHERE (? IS NULL OR person_id = ?)",
        )
        .bind(&person_guid)
        .bind(&person_guid)
        .fetch_one(&self.pool)
        .await?;

        Ok((addresses, row.0))
    }

    async fn find_by_guid(&self, guid: &str) -> Result<Option<Address>> {
        let address = sqlx::query_as::<_, Address>(
            r#"
            SELECT id, address_lines, place, latitude, longitude, geographic_areas
            FROM addresses
            WHERE id = ?
            "#,
        )
        .bind(guid)
        .fetch_optional(&self.pool)
        .await?;

        Ok(address)
    }

    async fn query_by_person_ids(&self, person_ids: &[String]) -> Result<Vec<Address>> {
        // MySQL has no array binds; one query per person keeps the statement cacheable
        let mut addresses = Vec::new();
        for person_id in person_ids {
            let mut batch = sqlx::query_as::<_, Address>(
                r#"
                SELECT id, address_lines, place, latitude, longitude, geographic_areas
                FROM addresses
                WHERE person_id = ?
                ORDER BY id
                "#,
            )
            .bind(person_id)
            .fetch_all(&self.pool)
            .await?;
            addresses.append(&mut batch);
        }
        Ok(addresses)
    }

    async fn update(&self, address: &Address) -> Result<Address> {
        let address_lines = serde_json::to_string(&address.address_lines)
            .map_err(|e| ApiError::Internal(e.into()))?;
        let place = address
            .place
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| ApiError::Internal(e.into()))?;
        let geographic_areas = address
            .geographic_areas
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| ApiError::Internal(e.into()))?;

        sqlx::query(
            r#"
            UPDATE addresses
            SET address_lines = ?, place = ?, latitude = ?, longitude = ?, geographic_areas = ?
            WHERE id = ?
            "#,
        )
        .bind(&address_lines)
        .bind(&place)
        .bind(address.latitude)
        .bind(address.longitude)
        .bind(&geographic_areas)
        .bind(&address.id)
        .execute(&self.pool)
        .await?;

        self.find_by_guid(&address.id)
            .await?
            .ok_or_else(|| ApiError::Internal(anyhow::anyhow!("Failed to update address")))
    }

    async fn delete(&self, guid: &str) -> Result<()> {
        let result = sqlx::query("DELETE FROM addresses WHERE id = ?")
            .bind(guid)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound(format!(
                "No address was found for guid '{}'.",
                guid
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_address_repository() {
        let mut mock = MockAddressRepository::new();

        mock.expect_delete().returning(|_| Ok(()));
        mock.expect_find_by_guid().returning(|_| Ok(None));

        assert!(mock.delete("a-1").await.is_ok());
        assert!(mock.find_by_guid("a-1").await.unwrap().is_none());
    }
}
