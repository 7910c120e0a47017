//! Configuration settings and default settings business logic

use crate::cache::CacheManager;
use crate::domain::{ConfigurationSettings, DefaultSettings, SettingsOptions};
use crate::error::{ApiError, Result};
use crate::policy::{permissions, PermissionSet};
use crate::repository::{ConfigurationSettingsRepository, DefaultSettingsRepository};
use std::sync::Arc;

pub const CONFIGURATION_SETTINGS_RESOURCE: &str = "configuration-settings";
pub const DEFAULT_SETTINGS_RESOURCE: &str = "default-settings";

pub struct ConfigurationSettingsService<R: ConfigurationSettingsRepository> {
    repo: Arc<R>,
    cache: Option<CacheManager>,
    permission_set: PermissionSet,
}

impl<R: ConfigurationSettingsRepository> ConfigurationSettingsService<R> {
    pub fn new(repo: Arc<R>, cache: Option<CacheManager>, permission_set: PermissionSet) -> Self {
        Self {
            repo,
            cache,
            permission_set,
        }
    }

    pub async fn get_configuration_settings(
        &self,
        resources: Vec<String>,
        bypass_cache: bool,
    ) -> Result<Vec<ConfigurationSettings>> {
        // Only the unfiltered collection is cached
        if resources.is_empty() && !bypass_cache {
            if let Some(cache) = &self.cache {
                if let Ok(Some(settings)) =
                    cache.get_reference(CONFIGURATION_SETTINGS_RESOURCE).await
                {
                    return Ok(settings);
                }
            }
        }
        let settings = self.repo.list(resources.clone()).await?;
        if resources.is_empty() {
            if let Some(cache) = &self.cache {
                let _ = cache
                    .set_reference(CONFIGURATION_SETTINGS_RESOURCE, &settings)
                    .await;
            }
        }
        Ok(settings)
    }

    pub async fn get_configuration_settings_by_guid(
        &self,
        guid: &str,
        bypass_cache: bool,
    ) -> Result<ConfigurationSettings> {
        if !bypass_cache {
            if let Some(cache) = &self.cache {
                if let Ok(Some(settings)) =
                    cache.get_record(CONFIGURATION_SETTINGS_RESOURCE, guid).await
                {
                    return Ok(settings);
                }
            }
        }
        let settings = self.repo.find_by_guid(guid).await?.ok_or_else(|| {
            ApiError::NotFound(format!(
                "No configuration settings was found for guid '{}'.",
                guid
            ))
        })?;
        if let Some(cache) = &self.cache {
            let _ = cache
                .set_record(CONFIGURATION_SETTINGS_RESOURCE, guid, &settings)
                .await;
        }
        Ok(settings)
    }

    pub async fn update_configuration_settings(
        &self,
        settings: ConfigurationSettings,
    ) -> Result<ConfigurationSettings> {
        self.permission_set.validate(permissions::UPDATE_SETTINGS)?;

        let _ = self
            .get_configuration_settings_by_guid(&settings.id, true)
            .await?;

        let updated = self.repo.update(&settings).await?;
        if let Some(cache) = &self.cache {
            let _ = cache.invalidate_reference(CONFIGURATION_SETTINGS_RESOURCE).await;
            let _ = cache
                .invalidate_record(CONFIGURATION_SETTINGS_RESOURCE, &settings.id)
                .await;
        }
        Ok(updated)
    }

    pub async fn get_configuration_settings_options(
        &self,
        resources: Vec<String>,
    ) -> Result<Vec<SettingsOptions>> {
        self.repo.list_options(resources).await
    }

    pub async fn get_configuration_settings_options_by_guid(
        &self,
        guid: &str,
    ) -> Result<SettingsOptions> {
        self.repo.find_options_by_guid(guid).await?.ok_or_else(|| {
            ApiError::NotFound(format!(
                "No configuration settings was found for guid '{}'.",
                guid
            ))
        })
    }
}

pub struct DefaultSettingsService<R: DefaultSettingsRepository> {
    repo: Arc<R>,
    cache: Option<CacheManager>,
    permission_set: PermissionSet,
}

impl<R: DefaultSettingsRepository> DefaultSettingsService<R> {
    pub fn new(repo: Arc<R>, cache: Option<CacheManager>, permission_set: PermissionSet) -> Self {
        Self {
            repo,
            cache,
            permission_set,
        }
    }

    pub async fn get_default_settings(
        &self,
        resources: Vec<String>,
        bypass_cache: bool,
    ) -> Result<Vec<DefaultSettings>> {
        if resources.is_empty() && !bypass_cache {
            if let Some(cache) = &self.cache {
                if let Ok(Some(settings)) = cache.get_reference(DEFAULT_SETTINGS_RESOURCE).await {
                    return Ok(settings);
                }
            }
        }
        let settings = self.repo.list(resources.clone()).await?;
        if resources.is_empty() {
            if let Some(cache) = &self.cache {
                let _ = cache
                    .set_reference(DEFAULT_SETTINGS_RESOURCE, &settings)
                    .await;
            }
        }
        Ok(settings)
    }

    pub async fn get_default_settings_by_guid(
        &self,
        guid: &str,
        bypass_cache: bool,
    ) -> Result<DefaultSettings> {
        if !bypass_cache {
            if let Some(cache) = &self.cache {
                if let Ok(Some(settings)) =
                    cache.get_record(DEFAULT_SETTINGS_RESOURCE, guid).await
                {
                    return Ok(settings);
                }
            }
        }
        let settings = self.repo.find_by_guid(guid).await?.ok_or_else(|| {
            ApiError::NotFound(format!(
                "No default settings was found for guid '{}'.",
                guid
            ))
        })?;
        if let Some(cache) = &self.cache {
            let _ = cache
                .set_record(DEFAULT_SETTINGS_RESOURCE, guid, &settings)
                .await;
        }
        Ok(settings)
    }

    pub async fn update_default_settings(
        &self,
        settings: DefaultSettings,
    ) -> Result<DefaultSettings> {
        self.permission_set.validate(permissions::UPDATE_SETTINGS)?;

        let _ = self.get_default_settings_by_guid(&settings.id, true).await?;

        let updated = self.repo.update(&settings).await?;
        if let Some(cache) = &self.cache {
            let _ = cache.invalidate_reference(DEFAULT_SETTINGS_RESOURCE).await;
            let _ = cache
                .invalidate_record(DEFAULT_SETTINGS_RESOURCE, &settings.id)
                .await;
        }
        Ok(updated)
    }

    pub async fn get_default_settings_options(
        &self,
        resources: Vec<String>,
    ) -> Result<Vec<SettingsOptions>> {
        self.repo.list_options(resources).await
    }

    pub async fn get_default_settings_options_by_guid(&self, guid: &str) -> Result<SettingsOptions> {
        self.repo.find_options_by_guid(guid).await?.ok_or_else(|| {
            ApiError::NotFound(format!(
                "No default settings was found for guid '{}'.",
                guid
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SettingsSource;
    use crate::repository::settings::{
        MockConfigurationSettingsRepository, MockDefaultSettingsRepository,
    };
    use mockall::predicate::*;

    fn sample_configuration() -> ConfigurationSettings {
        ConfigurationSettings {
            id: "cs-1".to_string(),
            title: "Check Faculty Load".to_string(),
            description: Some("Controls section load checking.".to_string()),
            source: Some(SettingsSource {
                title: "Yes".to_string(),
                value: "Y".to_string(),
            }),
            scope: None,
        }
    }

    #[tokio::test]
    async fn test_get_configuration_settings_filtered() {
        let mut mock = MockConfigurationSettingsRepository::new();
        mock.expect_list()
            .with(eq(vec!["persons".to_string()]))
            .returning(|_| Ok(vec![sample_configuration()]));

        let service = ConfigurationSettingsService::new(
            Arc::new(mock),
            None,
            PermissionSet::allow_all(),
        );
        let settings = service
            .get_configuration_settings(vec!["persons".to_string()], false)
            .await
            .unwrap();
        assert_eq!(settings.len(), 1);
    }

    #[tokio::test]
    async fn test_update_configuration_settings_requires_permission() {
        let mock = MockConfigurationSettingsRepository::new();
        let service = ConfigurationSettingsService::new(
            Arc::new(mock),
            None,
            PermissionSet::new(vec![]),
        );

        let result = service
            .update_configuration_settings(sample_configuration())
            .await;
        assert!(matches!(result, Err(ApiError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_update_configuration_settings_success() {
        let mut mock = MockConfigurationSettingsRepository::new();
        mock.expect_find_by_guid()
            .returning(|_| Ok(Some(sample_configuration())));
        mock.expect_update().returning(|settings| Ok(settings.clone()));

        let service = ConfigurationSettingsService::new(
            Arc::new(mock),
            None,
            PermissionSet::allow_all(),
        );
        let mut settings = sample_configuration();
        settings.source = Some(SettingsSource {
            title: "No".to_string(),
            value: "N".to_string(),
        });

        let updated = service.update_configuration_settings(settings).await.unwrap();
        assert_eq!(updated.source.unwrap().value, "N");
    }

    #[tokio::test]
    async fn test_get_default_settings_by_guid_not_found() {
        let mut mock = MockDefaultSettingsRepository::new();
        mock.expect_find_by_guid().returning(|_| Ok(None));

        let service =
            DefaultSettingsService::new(Arc::new(mock), None, PermissionSet::allow_all());
        let result = service.get_default_settings_by_guid("missing", false).await;
        assert!(matches!(result, Err(ApiError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_get_configuration_settings_options() {
        let mut mock = MockConfigurationSettingsRepository::new();
        mock.expect_list_options().returning(|_| {
            Ok(vec![SettingsOptions {
                id: "cs-1".to_string(),
                title: "Check Faculty Load".to_string(),
                scope: None,
                source_options: None,
            }])
        });

        let service = ConfigurationSettingsService::new(
            Arc::new(mock),
            None,
            PermissionSet::allow_all(),
        );
        let options = service
            .get_configuration_settings_options(vec![])
            .await
            .unwrap();
        assert_eq!(options.len(), 1);
    }
}
