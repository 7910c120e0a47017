//! Languages business logic

use crate::cache::CacheManager;
use crate::domain::Language;
use crate::error::{ApiError, Result};
use crate::repository::LanguageRepository;
use std::sync::Arc;

pub const LANGUAGES_RESOURCE: &str = "languages";

pub struct LanguagesService<R: LanguageRepository> {
    repo: Arc<R>,
    cache: Option<CacheManager>,
}

impl<R: LanguageRepository> LanguagesService<R> {
    pub fn new(repo: Arc<R>, cache: Option<CacheManager>) -> Self {
        Self { repo, cache }
    }

    pub async fn get_languages(&self, bypass_cache: bool) -> Result<Vec<Language>> {
        if !bypass_cache {
            if let Some(cache) = &self.cache {
                if let Ok(Some(languages)) = cache.get_reference(LANGUAGES_RESOURCE).await {
                    return Ok(languages);
                }
            }
        }
        let languages = self.repo.list().await?;
        if let Some(cache) = &self.cache {
            let _ = cache.set_reference(LANGUAGES_RESOURCE, &languages).await;
        }
        Ok(languages)
    }

    pub async fn get_language_by_guid(&self, guid: &str, bypass_cache: bool) -> Result<Language> {
        if !bypass_cache {
            if let Some(cache) = &self.cache {
                if let Ok(Some(language)) = cache.get_record(LANGUAGES_RESOURCE, guid).await {
                    return Ok(language);
                }
            }
        }
        let language = self.repo.find_by_guid(guid).await?.ok_or_else(|| {
            ApiError::NotFound(format!("No language was found for guid '{}'.", guid))
        })?;
        if let Some(cache) = &self.cache {
            let _ = cache.set_record(LANGUAGES_RESOURCE, guid, &language).await;
        }
        Ok(language)
    }

    pub async fn update_language(&self, language: Language) -> Result<Language> {
        let _ = self.get_language_by_guid(&language.id, true).await?;

        let updated = self.repo.update(&language).await?;
        if let Some(cache) = &self.cache {
            let _ = cache.invalidate_reference(LANGUAGES_RESOURCE).await;
            let _ = cache
                .invalidate_record(LANGUAGES_RESOURCE, &language.id)
                .await;
        }
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::reference::MockLanguageRepository;
    use mockall::predicate::*;

    fn sample() -> Language {
        Language {
            id: "lang-1".to_string(),
            code: Some("eng".to_string()),
            title: "English".to_string(),
            iso_code: Some("eng".to_string()),
        }
    }

    #[tokio::test]
    async fn test_get_language_by_guid() {
        let mut mock = MockLanguageRepository::new();
        mock.expect_find_by_guid()
            .with(eq("lang-1"))
            .returning(|_| Ok(Some(sample())));

        let service = LanguagesService::new(Arc::new(mock), None);
        let language = service.get_language_by_guid("lang-1", false).await.unwrap();
        assert_eq!(language.title, "English");
    }

    #[tokio::test]
    async fn test_update_language_success() {
        let mut mock = MockLanguageRepository::new();
        mock.expect_find_by_guid().returning(|_| Ok(Some(sample())));
        mock.expect_update().returning(|language| Ok(language.clone()));

        let service = LanguagesService::new(Arc::new(mock), None);
        let mut language = sample();
        language.iso_code = Some("en".to_string());

        let updated = service.update_language(language).await.unwrap();
        assert_eq!(updated.iso_code.as_deref(), Some("en"));
    }
}
