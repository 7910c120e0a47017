//! Currencies business logic

use crate::cache::CacheManager;
use crate::domain::Currency;
use crate::error::{ApiError, Result};
use crate::repository::CurrencyRepository;
use std::sync::Arc;

pub const CURRENCIES_RESOURCE: &str = "currencies";

pub struct CurrenciesService<R: CurrencyRepository> {
    repo: Arc<R>,
    cache: Option<CacheManager>,
}

impl<R: CurrencyRepository> CurrenciesService<R> {
    pub fn new(repo: Arc<R>, cache: Option<CacheManager>) -> Self {
        Self { repo, cache }
    }

    pub async fn get_currencies(&self, bypass_cache: bool) -> Result<Vec<Currency>> {
        if !bypass_cache {
            if let Some(cache) = &self.cache {
                if let Ok(Some(currencies)) = cache.get_reference(CURRENCIES_RESOURCE).await {
                    return Ok(currencies);
                }
            }
        }
        let currencies = self.repo.list().await?;
        if let Some(cache) = &self.cache {
            let _ = cache.set_reference(CURRENCIES_RESOURCE, &currencies).await;
        }
        Ok(currencies)
    }

    pub async fn get_currency_by_guid(&self, guid: &str, bypass_cache: bool) -> Result<Currency> {
        if !bypass_cache {
            if let Some(cache) = &self.cache {
                if let Ok(Some(currency)) = cache.get_record(CURRENCIES_RESOURCE, guid).await {
                    return Ok(currency);
                }
            }
        }
        let currency = self.repo.find_by_guid(guid).await?.ok_or_else(|| {
            ApiError::NotFound(format!("No currency was found for guid '{}'.", guid))
        })?;
        if let Some(cache) = &self.cache {
            let _ = cache.set_record(CURRENCIES_RESOURCE, guid, &currency).await;
        }
        Ok(currency)
    }

    pub async fn update_currency(&self, currency: Currency) -> Result<Currency> {
        let _ = self.get_currency_by_guid(&currency.id, true).await?;

        let updated = self.repo.update(&currency).await?;
        if let Some(cache) = &self.cache {
            let _ = cache.invalidate_reference(CURRENCIES_RESOURCE).await;
            let _ = cache
                .invalidate_record(CURRENCIES_RESOURCE, &currency.id)
                .await;
        }
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::reference::MockCurrencyRepository;
    use mockall::predicate::*;

    fn sample() -> Currency {
        Currency {
            id: "cur-1".to_string(),
            code: "USD".to_string(),
            title: "US Dollar".to_string(),
            description: None,
        }
    }

    #[tokio::test]
    async fn test_get_currency_by_guid() {
        let mut mock = MockCurrencyRepository::new();
        mock.expect_find_by_guid()
            .with(eq("cur-1"))
            .returning(|_| Ok(Some(sample())));

        let service = CurrenciesService::new(Arc::new(mock), None);
        let currency = service.get_currency_by_guid("cur-1", false).await.unwrap();
        assert_eq!(currency.code, "USD");
    }

    #[tokio::test]
    async fn test_update_currency_not_found() {
        let mut mock = MockCurrencyRepository::new();
        mock.expect_find_by_guid().returning(|_| Ok(None));

        let service = CurrenciesService::new(Arc::new(mock), None);
        let result = service.update_currency(sample()).await;
        assert!(matches!(result, Err(ApiError::NotFound(_))));
    }
}
