//! Organizations business logic
//!
//! Organizations share a GUID space with educational institutions in the
//! backing person registry. Reads and writes probe the other resource type
//! first and reject ids that belong to it.

use crate::cache::CacheManager;
use crate::domain::{Organization, OrganizationFilter};
use crate::error::{ApiError, Result};
use crate::policy::{permissions, PermissionSet};
use crate::repository::{EducationalInstitutionRepository, OrganizationRepository};
use std::sync::Arc;
use tracing::debug;

pub const ORGANIZATIONS_RESOURCE: &str = "organizations";

pub struct OrganizationsService<R: OrganizationRepository, E: EducationalInstitutionRepository> {
    repo: Arc<R>,
    institution_repo: Arc<E>,
    cache: Option<CacheManager>,
    permission_set: PermissionSet,
}

impl<R: OrganizationRepository, E: EducationalInstitutionRepository> OrganizationsService<R, E> {
    pub fn new(
        repo: Arc<R>,
        institution_repo: Arc<E>,
        cache: Option<CacheManager>,
        permission_set: PermissionSet,
    ) -> Self {
        Self {
            repo,
            institution_repo,
            cache,
            permission_set,
        }
    }

    /// Probe the educational-institutions registry. A probe failure is not a
    /// request failure: it is logged and treated as "not an institution".
    async fn belongs_to_educational_institution(&self, guid: &str) -> bool {
        match self.institution_repo.is_educational_institution(guid).await {
            Ok(is_institution) => is_institution,
            Err(e) => {
                debug!(guid = guid, error = ?e, "educational institution probe failed");
                false
            }
        }
    }

    fn wrong_resource_error(guid: &str) -> ApiError {
        ApiError::WrongResourceType(format!(
            "The id {} does not belong to an organization, it belongs to an educational institution.",
            guid
        ))
    }

    pub async fn get_organizations(
        &self,
        offset: i64,
        limit: i64,
        filter: OrganizationFilter,
    ) -> Result<(Vec<Organization>, i64)> {
        self.permission_set.validate_any(&[
            permissions::VIEW_ORGANIZATION,
            permissions::UPDATE_ORGANIZATION,
        ])?;
        self.repo.list(offset, limit, filter).await
    }

    pub async fn get_organization_by_guid(&self, guid: &str) -> Result<Organization> {
        self.permission_set.validate_any(&[
            permissions::VIEW_ORGANIZATION,
            permissions::UPDATE_ORGANIZATION,
        ])?;

        if self.belongs_to_educational_institution(guid).await {
            return Err(Self::wrong_resource_error(guid));
        }

        self.repo.find_by_guid(guid).await?.ok_or_else(|| {
            ApiError::NotFound(format!("No organization was found for guid '{}'.", guid))
        })
    }

    pub async fn update_organization(&self, organization: Organization) -> Result<Organization> {
        self.permission_set
            .validate(permissions::UPDATE_ORGANIZATION)?;

        if self
            .belongs_to_educational_institution(&organization.id)
            .await
        {
            return Err(Self::wrong_resource_error(&organization.id));
        }

        if self.repo.find_by_guid(&organization.id).await?.is_none() {
            return Err(ApiError::NotFound(format!(
                "No organization was found for guid '{}'.",
                organization.id
            )));
        }

        let updated = self.repo.update(&organization).await?;
        if let Some(cache) = &self.cache {
            let _ = cache
                .invalidate_record(ORGANIZATIONS_RESOURCE, &organization.id)
                .await;
        }
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::organization::{
        MockEducationalInstitutionRepository, MockOrganizationRepository,
    };
    use mockall::predicate::*;

    fn sample() -> Organization {
        Organization {
            id: "org-1".to_string(),
            title: "Acme Supply".to_string(),
            roles: None,
            credentials: None,
            addresses: None,
        }
    }

    fn create_test_service(
        repo: MockOrganizationRepository,
        institution_repo: MockEducationalInstitutionRepository,
    ) -> OrganizationsService<MockOrganizationRepository, MockEducationalInstitutionRepository>
    {
        OrganizationsService::new(
            Arc::new(repo),
            Arc::new(institution_repo),
            None,
            PermissionSet::allow_all(),
        )
    }

    #[tokio::test]
    async fn test_get_organization_success() {
        let mut repo = MockOrganizationRepository::new();
        let mut institution_repo = MockEducationalInstitutionRepository::new();

        institution_repo
            .expect_is_educational_institution()
            .with(eq("org-1"))
            .returning(|_| Ok(false));
        repo.expect_find_by_guid()
            .with(eq("org-1"))
            .returning(|_| Ok(Some(sample())));

        let service = create_test_service(repo, institution_repo);
        let organization = service.get_organization_by_guid("org-1").await.unwrap();
        assert_eq!(organization.title, "Acme Supply");
    }

    #[tokio::test]
    async fn test_get_organization_rejects_educational_institution_id() {
        let repo = MockOrganizationRepository::new();
        let mut institution_repo = MockEducationalInstitutionRepository::new();

        institution_repo
            .expect_is_educational_institution()
            .with(eq("ei-1"))
            .returning(|_| Ok(true));

        let service = create_test_service(repo, institution_repo);
        let result = service.get_organization_by_guid("ei-1").await;
        assert!(matches!(result, Err(ApiError::WrongResourceType(_))));
    }

    #[tokio::test]
    async fn test_probe_failure_is_swallowed() {
        let mut repo = MockOrganizationRepository::new();
        let mut institution_repo = MockEducationalInstitutionRepository::new();

        institution_repo
            .expect_is_educational_institution()
            .returning(|_| Err(ApiError::BadRequest("probe backend down".to_string())));
        repo.expect_find_by_guid().returning(|_| Ok(Some(sample())));

        let service = create_test_service(repo, institution_repo);
        // The probe error must not surface; the lookup proceeds
        let organization = service.get_organization_by_guid("org-1").await.unwrap();
        assert_eq!(organization.id, "org-1");
    }

    #[tokio::test]
    async fn test_update_organization_not_found() {
        let mut repo = MockOrganizationRepository::new();
        let mut institution_repo = MockEducationalInstitutionRepository::new();

        institution_repo
            .expect_is_educational_institution()
            .returning(|_| Ok(false));
        repo.expect_find_by_guid().returning(|_| Ok(None));

        let service = create_test_service(repo, institution_repo);
        let result = service.update_organization(sample()).await;
        assert!(matches!(result, Err(ApiError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_list_passes_filter_through() {
        let mut repo = MockOrganizationRepository::new();
        let institution_repo = MockEducationalInstitutionRepository::new();

        repo.expect_list()
            .withf(|offset, limit, filter| {
                *offset == 0 && *limit == 100 && filter.credential_value.as_deref() == Some("0004932")
            })
            .returning(|_, _, _| Ok((vec![sample()], 1)));

        let service = create_test_service(repo, institution_repo);
        let filter = OrganizationFilter {
            role: None,
            credential_value: Some("0004932".to_string()),
        };
        let (organizations, total) = service.get_organizations(0, 100, filter).await.unwrap();
        assert_eq!(organizations.len(), 1);
        assert_eq!(total, 1);
    }
}
