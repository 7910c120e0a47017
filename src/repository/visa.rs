//! Person visa repository

use crate::domain::PersonVisa;
use crate::error::{ApiError, Result};
use async_trait::async_trait;
use sqlx::MySqlPool;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VisaRepository: Send + Sync {
    async fn list(
        &self,
        offset: i64,
        limit: i64,
        person_guid: Option<String>,
    ) -> Result<(Vec<PersonVisa>, i64)>;
    async fn find_by_guid(&self, guid: &str) -> Result<Option<PersonVisa>>;
    async fn create(&self, visa: &PersonVisa) -> Result<PersonVisa>;
    async fn update(&self, visa: &PersonVisa) -> Result<PersonVisa>;
}

pub struct VisaRepositoryImpl {
    pool: MySqlPool,
}

impl VisaRepositoryImpl {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    fn json_columns(visa: &PersonVisa) -> Result<(String, String)> {
        let person =
            serde_json::to_string(&visa.person).map_err(|e| ApiError::Internal(e.into()))?;
        let visa_type =
            serde_json::to_string(&visa.visa_type).map_err(|e| ApiError::Internal(e.into()))?;
        Ok((person, visa_type))
    }
}

#[async_trait]
impl VisaRepository for VisaRepositoryImpl {
    async fn list(
        &self,
        offset: i64,
        limit: i64,
        person_guid: Option<String>,
    ) -> Result<(Vec<PersonVisa>, i64)> {
        let visas = sqlx::query_as::<_, PersonVisa>(
            r#"
            SELECT id, person, visa_type, visa_id, requested_on, issued_on, expires_on
            FROM person_visas
            WHERE (? IS NULL OR person->>'$.id' = ?)
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
            "SELECT COUNT(*) FROM person_visas WHERE (? IS NULL OR person->>'$.id' = ?)",
        )
        .bind(&person_guid)
        .bind(&person_guid)
        .fetch_one(&self.pool)
        .await?;

        Ok((visas, row.0))
    }

    async fn find_by_guid(&self, guid: &str) -> Result<Option<PersonVisa>> {
        let visa = sqlx::query_as::<_, PersonVisa>(
            r#"
            SELECT id, person, visa_type, visa_id, requested_on, issued_on, expires_on
            FROM person_visas
            WHERE id = ?
            "#,
        )
        .bind(guid)
        .fetch_optional(&self.pool)
        .await?;

        Ok(visa)
    }

    async fn create(&self, visa: &PersonVisa) -> Result<PersonVisa> {
        let (person, visa_type) = Self::json_columns(visa)?;

        sqlx::query(
            r#"
            INSERT INTO person_visas
                (id, person, visa_type, visa_id, requested_on, issued_on, expires_on)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&visa.id)
        .bind(&person)
        .bind(&visa_type)
        .bind(&visa.visa_id)
        .bind(visa.requested_on)
        .bind(visa.issued_on)
        .bind(visa.expires_on)
        .execute(&self.pool)
        .await?;

        self.find_by_guid(&visa.id)
            .await?
            .ok_or_else(|| ApiError::Internal(anyhow::anyhow!("Failed to create person visa")))
    }

    async fn update(&self, visa: &PersonVisa) -> Result<PersonVisa> {
        let (person, visa_type) = Self::json_columns(visa)?;

        sqlx::query(
            r#"
            UPDATE person_visas
            SET person = ?, visa_type = ?, visa_id = ?,
                requested_on = ?, issued_on = ?, expires_on = ?
            WHERE id = ?
            "#,
        )
        .bind(&person)
        .bind(&visa_type)
        .bind(&visa.visa_id)
        .bind(visa.requested_on)
        .bind(visa.issued_on)
        .bind(visa.expires_on)
        .bind(&visa.id)
        .execute(&self.pool)
        .await?;

        self.find_by_guid(&visa.id)
            .await?
            .ok_or_else(|| ApiError::Internal(anyhow::anyhow!("Failed to update person visa")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{GuidObject, VisaCategory, VisaType};

    #[tokio::test]
    async fn test_mock_visa_repository() {
        let mut mock = MockVisaRepository::new();

        mock.expect_list()
            .withf(|_, _, person| person.as_deref() == Some("p-1"))
            .returning(|_, _, _| {
                Ok((
                    vec![PersonVisa {
                        id: "v-1".to_string(),
                        person: GuidObject::new("p-1"),
                        visa_type: VisaType {
                            category: VisaCategory::NonImmigrant,
                            detail: None,
                        },
                        visa_status: None,
                        visa_id: None,
                        requested_on: None,
                        issued_on: None,
                        expires_on: None,
                    }],
                    1,
                ))
            });

        let (visas, total) = mock.list(0, 200, Some("p-1".to_string())).await.unwrap();
        assert_eq!(visas.len(), 1);
        assert_eq!(total, 1);
    }
}
