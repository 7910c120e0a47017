//! Repositories for flat reference resources: countries, country ISO codes,
//! currencies, and languages.

use crate::domain::{Country, CountryIsoCode, Currency, Language};
use crate::error::{ApiError, Result};
use async_trait::async_trait;
use sqlx::MySqlPool;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CountryRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<Country>>;
    async fn find_by_guid(&self, guid: &str) -> Result<Option<Country>>;
    async fn update(&self, country: &Country) -> Result<Country>;
    async fn list_iso_codes(&self) -> Result<Vec<CountryIsoCode>>;
    async fn find_iso_code_by_guid(&self, guid: &str) -> Result<Option<CountryIsoCode>>;
}

pub struct CountryRepositoryImpl {
    pool: MySqlPool,
}

impl CountryRepositoryImpl {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CountryRepository for CountryRepositoryImpl {
    async fn list(&self) -> Result<Vec<Country>> {
        let countries = sqlx::query_as::<_, Country>(
            r#"
            SELECT id, code, title, description, iso_code
            FROM countries
            ORDER BY code
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(countries)
    }

    async fn find_by_guid(&self, guid: &str) -> Result<Option<Country>> {
        let country = sqlx::query_as::<_, Country>(
            r#"
            SELECT id, code, title, description, iso_code
            FROM countries
            WHERE id = ?
            "#,
        )
        .bind(guid)
        .fetch_optional(&self.pool)
        .await?;

        Ok(country)
    }

    async fn update(&self, country: &Country) -> Result<Country> {
        sqlx::query(
            r#"
            UPDATE countries
            SET code = ?, title = ?, description = ?, iso_code = ?
            WHERE id = ?
            "#,
        )
        .bind(&country.code)
        .bind(&country.title)
        .bind(&country.description)
        .bind(&country.iso_code)
        .bind(&country.id)
        .execute(&self.pool)
        .await?;

        self.find_by_guid(&country.id)
            .await?
            .ok_or_else(|| ApiError::Internal(anyhow::anyhow!("Failed to update country")))
    }

    async fn list_iso_codes(&self) -> Result<Vec<CountryIsoCode>> {
        let codes = sqlx::query_as::<_, CountryIsoCode>(
            r#"
            SELECT id, title, iso_code, status
            FROM country_iso_codes
            ORDER BY iso_code
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(codes)
    }

    async fn find_iso_code_by_guid(&self, guid: &str) -> Result<Option<CountryIsoCode>> {
        let code = sqlx::query_as::<_, CountryIsoCode>(
            r#"
            SELECT id, title, iso_code, status
            FROM country_iso_codes
            WHERE id = ?
            "#,
        )
        .bind(guid)
        .fetch_optional(&self.pool)
        .await?;

        Ok(code)
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CurrencyRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<Currency>>;
    async fn find_by_guid(&self, guid: &str) -> Result<Option<Currency>>;
    async fn update(&self, currency: &Currency) -> Result<Currency>;
}

pub struct CurrencyRepositoryImpl {
    pool: MySqlPool,
}

impl CurrencyRepositoryImpl {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CurrencyRepository for CurrencyRepositoryImpl {
    async fn list(&self) -> Result<Vec<Currency>> {
        let currencies = sqlx::query_as::<_, Currency>(
            r#"
            SELECT id, code, title, description
            FROM currencies
            ORDER BY code
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(currencies)
    }

    async fn find_by_guid(&self, guid: &str) -> Result<Option<Currency>> {
        let currency = sqlx::query_as::<_, Currency>(
            r#"
            SELECT id, code, title, description
            FROM currencies
            WHERE id = ?
            "#,
        )
        .bind(guid)
        .fetch_optional(&self.pool)
        .await?;

        Ok(currency)
    }

    async fn update(&self, currency: &Currency) -> Result<Currency> {
        sqlx::query(
            r#"
            UPDATE currencies
            SET code = ?, title = ?, description = ?
            WHERE id = ?
            "#,
        )
        .bind(&currency.code)
        .bind(&currency.title)
        .bind(&currency.description)
        .bind(&currency.id)
        .execute(&self.pool)
        .await?;

        self.find_by_guid(&currency.id)
            .await?
            .ok_or_else(|| ApiError::Internal(anyhow::anyhow!("Failed to update currency")))
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LanguageRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<Language>>;
    async fn find_by_guid(&self, guid: &str) -> Result<Option<Language>>;
    async fn update(&self, language: &Language) -> Result<Language>;
}

pub struct LanguageRepositoryImpl {
    pool: MySqlPool,
}

impl LanguageRepositoryImpl {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LanguageRepository for LanguageRepositoryImpl {
    async fn list(&self) -> Result<Vec<Language>> {
        let languages = sqlx::query_as::<_, Language>(
            r#"
            SELECT id, code, title, iso_code
            FROM languages
            ORDER BY title
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(languages)
    }

    async fn find_by_guid(&self, guid: &str) -> Result<Option<Language>> {
        let language = sqlx::query_as::<_, Language>(
            r#"
            SELECT id, code, title, iso_code
            FROM languages
            WHERE id = ?
            "#,
        )
        .bind(guid)
        .fetch_optional(&self.pool)
        .await?;

        Ok(language)
    }

    async fn update(&self, language: &Language) -> Result<Language> {
        sqlx::query(
            r#"
            UPDATE languages
            SET code = ?, title = ?, iso_code = ?
            WHERE id = ?
            "#,
        )
        .bind(&language.code)
        .bind(&language.title)
        .bind(&language.iso_code)
        .bind(&language.id)
        .execute(&self.pool)
        .await?;

        self.find_by_guid(&language.id)
            .await?
            .ok_or_else(|| ApiError::Internal(anyhow::anyhow!("Failed to update language")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_country_repository() {
        let mut mock = MockCountryRepository::new();

        mock.expect_find_by_guid()
            .returning(|_| Ok(Some(Country {
                id: "c-1".to_string(),
                code: "USA".to_string(),
                title: "United States".to_string(),
                description: None,
                iso_code: Some("USA".to_string()),
            })));

        let result = mock.find_by_guid("c-1").await.unwrap();
        assert!(result.is_some());
        assert_eq!(result.unwrap().code, "USA");
    }
}
