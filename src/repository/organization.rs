//! Organization repository, plus the educational-institution lookup used to
//! reject ids that belong to the other resource type.

use crate::domain::{Organization, OrganizationFilter};
use crate::error::{ApiError, Result};
use async_trait::async_trait;
use sqlx::MySqlPool;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrganizationRepository: Send + Sync {
    async fn list(
        &self,
        offset: i64,
        limit: i64,
        filter: OrganizationFilter,
    ) -> Result<(Vec<Organization>, i64)>;
    async fn find_by_guid(&self, guid: &str) -> Result<Option<Organization>>;
    async fn update(&self, organization: &Organization) -> Result<Organization>;
}

/// Lookup against the educational-institutions side of the person registry.
/// Organizations and educational institutions share a GUID space.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EducationalInstitutionRepository: Send + Sync {
    async fn is_educational_institution(&self, guid: &str) -> Result<bool>;
}

pub struct OrganizationRepositoryImpl {
    pool: MySqlPool,
}

impl OrganizationRepositoryImpl {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OrganizationRepository for OrganizationRepositoryImpl {
    async fn list(
        &self,
        offset: i64,
        limit: i64,
        filter: OrganizationFilter,
    ) -> Result<(Vec<Organization>, i64)> {
        let role = filter.role.map(|r| r.to_string());
        let credential_value = filter.credential_value;

        let organizations = sqlx::query_as::<_, Organization>(
            r#"
            SELECT id, title, roles, credentials, addresses
            FROM organizations
            WHERE (? IS NULL OR JSON_CONTAINS(roles, JSON_OBJECT('role', ?)))
              AND (? IS NULL OR JSON_CONTAINS(JSON_EXTRACT(credentials, '$[*].value'), JSON_QUOTE(?)))
            ORDER BY title
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(&role)
        .bind(&role)
        .bind(&credential_value)
        .bind(&credential_value)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let row: (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*)
            FROM organizations
            WHERE (? IS NULL OR JSON_CONTAINS(roles, JSON_OBJECT('role', ?)))
              AND (? IS NULL OR JSON_CONTAINS(JSON_EXTRACT(credentials, '$[*].value'), JSON_QUOTE(?)))
            "#,
        )
        .bind(&role)
        .bind(&role)
        .bind(&credential_value)
        .bind(&credential_value)
        .fetch_one(&self.pool)
        .await?;

        Ok((organizations, row.0))
    }

    async fn find_by_guid(&self, guid: &str) -> Result<Option<Organization>> {
        let organization = sqlx::query_as::<_, Organization>(
            r#"
            SELECT id, title, roles, credentials, addresses
            FROM organizations
            WHERE id = ?
            "#,
        )
        .bind(guid)
        .fetch_optional(&self.pool)
        .await?;

        Ok(organization)
    }

    async fn update(&self, organization: &Organization) -> Result<Organization> {
        let roles = organization
            .roles
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| ApiError::Internal(e.into()))?;
        let credentials = organization
            .credentials
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| ApiError::Internal(e.into()))?;
        let addresses = organization
            .addresses
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| ApiError::Internal(e.into()))?;

        sqlx::query(
            r#"
            UPDATE organizations
            SET title = ?, roles = ?, credentials = ?, addresses = ?
            WHERE id = ?
            "#,
        )
        .bind(&organization.title)
        .bind(&roles)
        .bind(&credentials)
        .bind(&addresses)
        .bind(&organization.id)
        .execute(&self.pool)
        .await?;

        self.find_by_guid(&organization.id)
            .await?
            .ok_or_else(|| ApiError::Internal(anyhow::anyhow!("Failed to update organization")))
    }
}

pub struct EducationalInstitutionRepositoryImpl {
    pool: MySqlPool,
}

impl EducationalInstitutionRepositoryImpl {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EducationalInstitutionRepository for EducationalInstitutionRepositoryImpl {
    async fn is_educational_institution(&self, guid: &str) -> Result<bool> {
        let row: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM educational_institutions WHERE id = ?")
                .bind(guid)
                .fetch_one(&self.pool)
                .await?;
        Ok(row.0 > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_organization_repository() {
        let mut mock = MockOrganizationRepository::new();

        mock.expect_list().returning(|_, _, _| Ok((vec![], 0)));

        let (organizations, total) = mock
            .list(0, 100, OrganizationFilter::default())
            .await
            .unwrap();
        assert!(organizations.is_empty());
        assert_eq!(total, 0);
    }

    #[tokio::test]
    async fn test_mock_educational_institution_lookup() {
        let mut mock = MockEducationalInstitutionRepository::new();
        mock.expect_is_educational_institution()
            .returning(|guid| Ok(guid == "ei-1"));

        assert!(mock.is_educational_institution("ei-1").await.unwrap());
        assert!(!mock.is_educational_institution("org-1").await.unwrap());
    }
}
