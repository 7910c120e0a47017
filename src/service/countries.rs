//! Countries and country ISO codes business logic

use crate::cache::CacheManager;
use crate::domain::{Country, CountryIsoCode};
use crate::error::{ApiError, Result};
use crate::repository::CountryRepository;
use std::sync::Arc;

pub const COUNTRIES_RESOURCE: &str = "countries";
pub const COUNTRY_ISO_CODES_RESOURCE: &str = "country-iso-codes";

pub struct CountriesService<R: CountryRepository> {
    repo: Arc<R>,
    cache: Option<CacheManager>,
}

impl<R: CountryRepository> CountriesService<R> {
    pub fn new(repo: Arc<R>, cache: Option<CacheManager>) -> Self {
        Self { repo, cache }
    }

    pub async fn get_countries(&self, bypass_cache: bool) -> Result<Vec<Country>> {
        if !bypass_cache {
            if let Some(cache) = &self.cache {
                if let Ok(Some(countries)) = cache.get_reference(COUNTRIES_RESOURCE).await {
                    return Ok(countries);
                }
            }
        }
        let countries = self.repo.list().await?;
        if let Some(cache) = &self.cache {
            let _ = cache.set_reference(COUNTRIES_RESOURCE, &countries).await;
        }
        Ok(countries)
    }

    pub async fn get_country_by_guid(&self, guid: &str, bypass_cache: bool) -> Result<Country> {
        if !bypass_cache {
            if let Some(cache) = &self.cache {
                if let Ok(Some(country)) = cache.get_record(COUNTRIES_RESOURCE, guid).await {
                    return Ok(country);
                }
            }
        }
        let country = self
            .repo
            .find_by_guid(guid)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("No country was found for guid '{}'.", guid)))?;
        if let Some(cache) = &self.cache {
            let _ = cache.set_record(COUNTRIES_RESOURCE, guid, &country).await;
        }
        Ok(country)
    }

    pub async fn update_country(&self, country: Country) -> Result<Country> {
        // Verify the record exists before writing
        let _ = self.get_country_by_guid(&country.id, true).await?;

        let updated = self.repo.update(&country).await?;
        if let Some(cache) = &self.cache {
            let _ = cache.invalidate_reference(COUNTRIES_RESOURCE).await;
            let _ = cache.invalidate_record(COUNTRIES_RESOURCE, &country.id).await;
        }
        Ok(updated)
    }

    pub async fn get_country_iso_codes(&self, bypass_cache: bool) -> Result<Vec<CountryIsoCode>> {
        if !bypass_cache {
            if let Some(cache) = &self.cache {
                if let Ok(Some(codes)) = cache.get_reference(COUNTRY_ISO_CODES_RESOURCE).await {
                    return Ok(codes);
                }
            }
        }
        let codes = self.repo.list_iso_codes().await?;
        if let Some(cache) = &self.cache {
            let _ = cache.set_reference(COUNTRY_ISO_CODES_RESOURCE, &codes).await;
        }
        Ok(codes)
    }

    pub async fn get_country_iso_code_by_guid(&self, guid: &str) -> Result<CountryIsoCode> {
        self.repo
            .find_iso_code_by_guid(guid)
            .await?
            .ok_or_else(|| {
                ApiError::NotFound(format!("No country ISO code was found for guid '{}'.", guid))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::reference::MockCountryRepository;
    use mockall::predicate::*;

    fn sample_country() -> Country {
        Country {
            id: "c-1".to_string(),
            code: "USA".to_string(),
            title: "United States".to_string(),
            description: None,
            iso_code: Some("USA".to_string()),
        }
    }

    fn create_test_service(repo: MockCountryRepository) -> CountriesService<MockCountryRepository> {
        CountriesService::new(Arc::new(repo), None)
    }

    #[tokio::test]
    async fn test_get_countries() {
        let mut mock = MockCountryRepository::new();
        mock.expect_list().returning(|| Ok(vec![sample_country()]));

        let service = create_test_service(mock);
        let countries = service.get_countries(false).await.unwrap();
        assert_eq!(countries.len(), 1);
        assert_eq!(countries[0].code, "USA");
    }

    #[tokio::test]
    async fn test_get_country_by_guid_not_found() {
        let mut mock = MockCountryRepository::new();
        mock.expect_find_by_guid()
            .with(eq("missing"))
            .returning(|_| Ok(None));

        let service = create_test_service(mock);
        let result = service.get_country_by_guid("missing", false).await;
        assert!(matches!(result, Err(ApiError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_update_country_success() {
        let mut mock = MockCountryRepository::new();
        mock.expect_find_by_guid()
            .with(eq("c-1"))
            .returning(|_| Ok(Some(sample_country())));
        mock.expect_update()
            .returning(|country| Ok(country.clone()));

        let service = create_test_service(mock);
        let mut country = sample_country();
        country.iso_code = Some("USX".to_string());

        let updated = service.update_country(country).await.unwrap();
        assert_eq!(updated.iso_code.as_deref(), Some("USX"));
    }

    #[tokio::test]
    async fn test_update_country_not_found() {
        let mut mock = MockCountryRepository::new();
        mock.expect_find_by_guid().returning(|_| Ok(None));

        let service = create_test_service(mock);
        let result = service.update_country(sample_country()).await;
        assert!(matches!(result, Err(ApiError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_get_country_iso_code_by_guid() {
        let mut mock = MockCountryRepository::new();
        mock.expect_find_iso_code_by_guid()
            .with(eq("iso-1"))
            .returning(|_| {
                Ok(Some(CountryIsoCode {
                    id: "iso-1".to_string(),
                    title: "United States".to_string(),
                    iso_code: "USA".to_string(),
                    status: Some("active".to_string()),
                }))
            });

        let service = create_test_service(mock);
        let code = service.get_country_iso_code_by_guid("iso-1").await.unwrap();
        assert_eq!(code.iso_code, "USA");
    }
}
