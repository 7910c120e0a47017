//! Repositories for configuration settings and default settings.
//!
//! Settings tables are tiny (one row per configurable key), so scope
//! filtering happens in memory after a full read rather than in SQL.

use crate::domain::{ConfigurationSettings, DefaultSettings, SettingsOptions, SettingsScope};
use crate::error::{ApiError, Result};
use async_trait::async_trait;
use sqlx::MySqlPool;

fn matches_resources(scope: &Option<SettingsScope>, resources: &[String]) -> bool {
    if resources.is_empty() {
        return true;
    }
    scope
        .as_ref()
        .map(|s| s.resources.iter().any(|r| resources.contains(r)))
        .unwrap_or(false)
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ConfigurationSettingsRepository: Send + Sync {
    async fn list(&self, resources: Vec<String>) -> Result<Vec<ConfigurationSettings>>;
    async fn find_by_guid(&self, guid: &str) -> Result<Option<ConfigurationSettings>>;
    async fn update(&self, settings: &ConfigurationSettings) -> Result<ConfigurationSettings>;
    async fn list_options(&self, resources: Vec<String>) -> Result<Vec<SettingsOptions>>;
    async fn find_options_by_guid(&self, guid: &str) -> Result<Option<SettingsOptions>>;
}

pub struct ConfigurationSettingsRepositoryImpl {
    pool: MySqlPool,
}

impl ConfigurationSettingsRepositoryImpl {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ConfigurationSettingsRepository for ConfigurationSettingsRepositoryImpl {
    async fn list(&self, resources: Vec<String>) -> Result<Vec<ConfigurationSettings>> {
        let settings = sqlx::query_as::<_, ConfigurationSettings>(
            r#"
            SELECT id, title, description, source, scope
            FROM configuration_settings
            ORDER BY title
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(settings
            .into_iter()
            .filter(|s| matches_resources(&s.scope, &resources))
            .collect())
    }

    async fn find_by_guid(&self, guid: &str) -> Result<Option<ConfigurationSettings>> {
        let settings = sqlx::query_as::<_, ConfigurationSettings>(
            r#"
            SELECT id, title, description, source, scope
            FROM configuration_settings
            WHERE id = ?
            "#,
        )
        .bind(guid)
        .fetch_optional(&self.pool)
        .await?;

        Ok(settings)
    }

    async fn update(&self, settings: &ConfigurationSettings) -> Result<ConfigurationSettings> {
        let source = settings
            .source
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| ApiError::Internal(e.into()))?;

        sqlx::query(
            r#"
            UPDATE configuration_settings
            SET source = ?
            WHERE id = ?
            "#,
        )
        .bind(&source)
        .bind(&settings.id)
        .execute(&self.pool)
        .await?;

        self.find_by_guid(&settings.id).await?.ok_or_else(|| {
            ApiError::Internal(anyhow::anyhow!("Failed to update configuration settings"))
        })
    }

    async fn list_options(&self, resources: Vec<String>) -> Result<Vec<SettingsOptions>> {
        let options = sqlx::query_as::<_, SettingsOptions>(
            r#"
            SELECT id, title, scope, source_options
            FROM configuration_settings
            ORDER BY title
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(options
            .into_iter()
            .filter(|o| matches_resources(&o.scope, &resources))
            .collect())
    }

    async fn find_options_by_guid(&self, guid: &str) -> Result<Option<SettingsOptions>> {
        let options = sqlx::query_as::<_, SettingsOptions>(
            r#"
            SELECT id, title, scope, source_options
            FROM configuration_settings
            WHERE id = ?
            "#,
        )
        .bind(guid)
        .fetch_optional(&self.pool)
        .await?;

        Ok(options)
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DefaultSettingsRepository: Send + Sync {
    async fn list(&self, resources: Vec<String>) -> Result<Vec<DefaultSettings>>;
    async fn find_by_guid(&self, guid: &str) -> Result<Option<DefaultSettings>>;
    async fn update(&self, settings: &DefaultSettings) -> Result<DefaultSettings>;
    async fn list_options(&self, resources: Vec<String>) -> Result<Vec<SettingsOptions>>;
    async fn find_options_by_guid(&self, guid: &str) -> Result<Option<SettingsOptions>>;
}

pub struct DefaultSettingsRepositoryImpl {
    pool: MySqlPool,
}

impl DefaultSettingsRepositoryImpl {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DefaultSettingsRepository for DefaultSettingsRepositoryImpl {
    async fn list(&self, resources: Vec<String>) -> Result<Vec<DefaultSettings>> {
        let settings = sqlx::query_as::<_, DefaultSettings>(
            r#"
            SELECT id, title, description, source, scope
            FROM default_settings
            ORDER BY title
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(settings
            .into_iter()
            .filter(|s| matches_resources(&s.scope, &resources))
            .collect())
    }

    async fn find_by_guid(&self, guid: &str) -> Result<Option<DefaultSettings>> {
        let settings = sqlx::query_as::<_, DefaultSettings>(
            r#"
            SELECT id, title, description, source, scope
            FROM default_settings
            WHERE id = ?
            "#,
        )
        .bind(guid)
        .fetch_optional(&self.pool)
        .await?;

        Ok(settings)
    }

    async fn update(&self, settings: &DefaultSettings) -> Result<DefaultSettings> {
        let source = settings
            .source
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| ApiError::Internal(e.into()))?;

        sqlx::query(
            r#"
            UPDATE default_settings
            SET source = ?
            WHERE id = ?
            "#,
        )
        .bind(&source)
        .bind(&settings.id)
        .execute(&self.pool)
        .await?;

        self.find_by_guid(&settings.id).await?.ok_or_else(|| {
            ApiError::Internal(anyhow::anyhow!("Failed to update default settings"))
        })
    }

    async fn list_options(&self, resources: Vec<String>) -> Result<Vec<SettingsOptions>> {
        let options = sqlx::query_as::<_, SettingsOptions>(
            r#"
            SELECT id, title, scope, source_options
            FROM default_settings
            ORDER BY title
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(options
            .into_iter()
            .filter(|o| matches_resources(&o.scope, &resources))
            .collect())
    }

    async fn find_options_by_guid(&self, guid: &str) -> Result<Option<SettingsOptions>> {
        let options = sqlx::query_as::<_, SettingsOptions>(
            r#"
            SELECT id, title, scope, source_options
            FROM default_settings
            WHERE id = ?
            "#,
        )
        .bind(guid)
        .fetch_optional(&self.pool)
        .await?;

        Ok(options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scoped(resources: &[&str]) -> Option<SettingsScope> {
        Some(SettingsScope {
            resources: resources.iter().map(|r| r.to_string()).collect(),
        })
    }

    #[test]
    fn test_matches_resources_unfiltered() {
        assert!(matches_resources(&scoped(&["persons"]), &[]));
        assert!(matches_resources(&None, &[]));
    }

    #[test]
    fn test_matches_resources_filtered() {
        let filter = vec!["persons".to_string()];
        assert!(matches_resources(&scoped(&["persons", "addresses"]), &filter));
        assert!(!matches_resources(&scoped(&["sections"]), &filter));
        assert!(!matches_resources(&None, &filter));
    }
}
