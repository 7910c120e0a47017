//! Person visas business logic

use crate::cache::CacheManager;
use crate::domain::{new_guid, PersonVisa};
use crate::error::{ApiError, Result};
use crate::policy::{permissions, PermissionSet};
use crate::repository::VisaRepository;
use chrono::{NaiveDate, Utc};
use std::sync::Arc;

pub const PERSON_VISAS_RESOURCE: &str = "person-visas";

pub struct VisasService<R: VisaRepository> {
    repo: Arc<R>,
    cache: Option<CacheManager>,
    permission_set: PermissionSet,
}

impl<R: VisaRepository> VisasService<R> {
    pub fn new(repo: Arc<R>, cache: Option<CacheManager>, permission_set: PermissionSet) -> Self {
        Self {
            repo,
            cache,
            permission_set,
        }
    }

    fn today() -> NaiveDate {
        Utc::now().date_naive()
    }

    fn check_person_present(visa: &PersonVisa) -> Result<()> {
        if visa.person.id.trim().is_empty() {
            return Err(ApiError::validation(
                "An error occurred attempting to validate data.",
                "A person id is required for a person visa.",
            ));
        }
        Ok(())
    }

    pub async fn get_person_visas(
        &self,
        offset: i64,
        limit: i64,
        person_guid: Option<String>,
    ) -> Result<(Vec<PersonVisa>, i64)> {
        self.permission_set.validate_any(&[
            permissions::VIEW_PERSON_VISA,
            permissions::UPDATE_PERSON_VISA,
        ])?;

        let today = Self::today();
        let (visas, total) = self.repo.list(offset, limit, person_guid).await?;
        Ok((
            visas.into_iter().map(|v| v.with_status(today)).collect(),
            total,
        ))
    }

    pub async fn get_person_visa_by_guid(&self, guid: &str, bypass_cache: bool) -> Result<PersonVisa> {
        self.permission_set.validate_any(&[
            permissions::VIEW_PERSON_VISA,
            permissions::UPDATE_PERSON_VISA,
        ])?;

        if !bypass_cache {
            if let Some(cache) = &self.cache {
                if let Ok(Some(visa)) = cache.get_record::<PersonVisa>(PERSON_VISAS_RESOURCE, guid).await {
                    return Ok(visa.with_status(Self::today()));
                }
            }
        }
        let visa = self.repo.find_by_guid(guid).await?.ok_or_else(|| {
            ApiError::NotFound(format!("No person visa was found for guid '{}'.", guid))
        })?;
        if let Some(cache) = &self.cache {
            let _ = cache.set_record(PERSON_VISAS_RESOURCE, guid, &visa).await;
        }
        Ok(visa.with_status(Self::today()))
    }

    pub async fn create_person_visa(&self, mut visa: PersonVisa) -> Result<PersonVisa> {
        self.permission_set
            .validate(permissions::UPDATE_PERSON_VISA)?;
        Self::check_person_present(&visa)?;

        visa.id = new_guid();
        let created = self.repo.create(&visa).await?;
        Ok(created.with_status(Self::today()))
    }

    pub async fn update_person_visa(&self, visa: PersonVisa) -> Result<PersonVisa> {
        self.permission_set
            .validate(permissions::UPDATE_PERSON_VISA)?;
        Self::check_person_present(&visa)?;

        if self.repo.find_by_guid(&visa.id).await?.is_none() {
            return Err(ApiError::NotFound(format!(
                "No person visa was found for guid '{}'.",
                visa.id
            )));
        }

        let updated = self.repo.update(&visa).await?;
        if let Some(cache) = &self.cache {
            let _ = cache.invalidate_record(PERSON_VISAS_RESOURCE, &visa.id).await;
        }
        Ok(updated.with_status(Self::today()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{GuidObject, VisaCategory, VisaStatus, VisaType};
    use crate::repository::visa::MockVisaRepository;
    use mockall::predicate::*;

    fn sample() -> PersonVisa {
        PersonVisa {
            id: "v-1".to_string(),
            person: GuidObject::new("p-1"),
            visa_type: VisaType {
                category: VisaCategory::NonImmigrant,
                detail: None,
            },
            visa_status: None,
            visa_id: Some("F1-2024-001".to_string()),
            requested_on: None,
            issued_on: None,
            expires_on: NaiveDate::from_ymd_opt(2001, 1, 1),
        }
    }

    fn create_test_service(repo: MockVisaRepository) -> VisasService<MockVisaRepository> {
        VisasService::new(Arc::new(repo), None, PermissionSet::allow_all())
    }

    #[tokio::test]
    async fn test_get_person_visa_fills_status() {
        let mut mock = MockVisaRepository::new();
        mock.expect_find_by_guid()
            .with(eq("v-1"))
            .returning(|_| Ok(Some(sample())));

        let service = create_test_service(mock);
        let visa = service.get_person_visa_by_guid("v-1", false).await.unwrap();
        // expires well in the past
        assert_eq!(visa.visa_status, Some(VisaStatus::Expired));
    }

    #[tokio::test]
    async fn test_create_assigns_guid() {
        let mut mock = MockVisaRepository::new();
        mock.expect_create().returning(|visa| Ok(visa.clone()));

        let service = create_test_service(mock);
        let mut visa = sample();
        visa.id = String::new();

        let created = service.create_person_visa(visa).await.unwrap();
        assert_eq!(created.id.len(), 36);
        assert!(created.visa_status.is_some());
    }

    #[tokio::test]
    async fn test_create_requires_person() {
        let mock = MockVisaRepository::new();
        let service = create_test_service(mock);

        let mut visa = sample();
        visa.person = GuidObject::new("");

        let result = service.create_person_visa(visa).await;
        assert!(matches!(result, Err(ApiError::Validation(_))));
    }

    #[tokio::test]
    async fn test_update_not_found() {
        let mut mock = MockVisaRepository::new();
        mock.expect_find_by_guid().returning(|_| Ok(None));

        let service = create_test_service(mock);
        let result = service.update_person_visa(sample()).await;
        assert!(matches!(result, Err(ApiError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_list_requires_permission() {
        let mock = MockVisaRepository::new();
        let service = VisasService::new(Arc::new(mock), None, PermissionSet::new(vec![]));

        let result = service.get_person_visas(0, 200, None).await;
        assert!(matches!(result, Err(ApiError::Forbidden(_))));
    }
}
