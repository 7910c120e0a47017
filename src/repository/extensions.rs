//! Repository for the integration-platform context attached to resources:
//! data-privacy field rules and extended (custom) data rows.

use crate::error::{ApiError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, MySqlPool};

/// Extended data stored for one record of a resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct ExtendedDataRow {
    pub record_guid: String,
    #[sqlx(json)]
    pub properties: serde_json::Value,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ExtensionsRepository: Send + Sync {
    /// Dot-paths of properties hidden from (and pinned against) callers
    async fn data_privacy_list(&self, resource: &str) -> Result<Vec<String>>;
    /// Extended data rows for the given record GUIDs
    async fn extended_data(
        &self,
        resource: &str,
        record_guids: Vec<String>,
    ) -> Result<Vec<ExtendedDataRow>>;
    /// Store extended properties carried on an inbound create/update
    async fn import_extended_data(
        &self,
        resource: &str,
        record_guid: &str,
        properties: serde_json::Value,
    ) -> Result<()>;
}

pub struct ExtensionsRepositoryImpl {
    pool: MySqlPool,
}

impl ExtensionsRepositoryImpl {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ExtensionsRepository for ExtensionsRepositoryImpl {
    async fn data_privacy_list(&self, resource: &str) -> Result<Vec<String>> {
        let rows: Vec<(String,)> = sqlx::query_as(
            r#"
            SELECT property_path
            FROM data_privacy_rules
            WHERE resource = ?
            ORDER BY property_path
            "#,
        )
        .bind(resource)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|(path,)| path).collect())
    }

    async fn extended_data(
        &self,
        resource: &str,
        record_guids: Vec<String>,
    ) -> Result<Vec<ExtendedDataRow>> {
        // MySQL has no array binds; settings-sized fetches stay per guid
        let mut rows = Vec::new();
        for guid in &record_guids {
            let row = sqlx::query_as::<_, ExtendedDataRow>(
                r#"
                SELECT record_guid, properties
                FROM extended_data
                WHERE resource = ? AND record_guid = ?
                "#,
            )
            .bind(resource)
            .bind(guid)
            .fetch_optional(&self.pool)
            .await?;
            if let Some(row) = row {
                rows.push(row);
            }
        }
        Ok(rows)
    }

    async fn import_extended_data(
        &self,
        resource: &str,
        record_guid: &str,
        properties: serde_json::Value,
    ) -> Result<()> {
        let properties =
            serde_json::to_string(&properties).map_err(|e| ApiError::Internal(e.into()))?;

        sqlx::query(
            r#"
            INSERT INTO extended_data (resource, record_guid, properties)
            VALUES (?, ?, ?)
            ON DUPLICATE KEY UPDATE properties = VALUES(properties)
            "#,
        )
        .bind(resource)
        .bind(record_guid)
        .bind(&properties)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_mock_extensions_repository() {
        let mut mock = MockExtensionsRepository::new();

        mock.expect_data_privacy_list()
            .returning(|_| Ok(vec!["place.country.postalCode".to_string()]));
        mock.expect_extended_data().returning(|_, guids| {
            Ok(guids
                .into_iter()
                .map(|guid| ExtendedDataRow {
                    record_guid: guid,
                    properties: json!({"district": "North"}),
                })
                .collect())
        });

        let dp = mock.data_privacy_list("addresses").await.unwrap();
        assert_eq!(dp, vec!["place.country.postalCode"]);

        let rows = mock
            .extended_data("addresses", vec!["a-1".to_string()])
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].properties["district"], "North");
    }
}
