//! Personal relationships business logic

use crate::cache::CacheManager;
use crate::domain::{new_guid, PersonalRelationship};
use crate::error::{ApiError, Result};
use crate::policy::{permissions, PermissionSet};
use crate::repository::RelationshipRepository;
use std::sync::Arc;

pub const PERSONAL_RELATIONSHIPS_RESOURCE: &str = "personal-relationships";

pub struct RelationshipsService<R: RelationshipRepository> {
    repo: Arc<R>,
    cache: Option<CacheManager>,
    permission_set: PermissionSet,
}

impl<R: RelationshipRepository> RelationshipsService<R> {
    pub fn new(repo: Arc<R>, cache: Option<CacheManager>, permission_set: PermissionSet) -> Self {
        Self {
            repo,
            cache,
            permission_set,
        }
    }

    fn check_persons_differ(relationship: &PersonalRelationship) -> Result<()> {
        if relationship
            .subject_person
            .id
            .eq_ignore_ascii_case(&relationship.related.person.id)
        {
            return Err(ApiError::validation(
                "An error occurred attempting to validate data.",
                "The subject person and the related person may not be the same.",
            ));
        }
        Ok(())
    }

    pub async fn get_personal_relationships(
        &self,
        offset: i64,
        limit: i64,
        person_guid: Option<String>,
    ) -> Result<(Vec<PersonalRelationship>, i64)> {
        self.permission_set.validate_any(&[
            permissions::VIEW_RELATIONSHIP,
            permissions::UPDATE_RELATIONSHIP,
        ])?;
        self.repo.list(offset, limit, person_guid).await
    }

    pub async fn get_personal_relationship_by_guid(
        &self,
        guid: &str,
    ) -> Result<PersonalRelationship> {
        self.permission_set.validate_any(&[
            permissions::VIEW_RELATIONSHIP,
            permissions::UPDATE_RELATIONSHIP,
        ])?;
        self.repo.find_by_guid(guid).await?.ok_or_else(|| {
            ApiError::NotFound(format!(
                "No personal relationship was found for guid '{}'.",
                guid
            ))
        })
    }

    pub async fn create_personal_relationship(
        &self,
        mut relationship: PersonalRelationship,
    ) -> Result<PersonalRelationship> {
        self.permission_set
            .validate(permissions::UPDATE_RELATIONSHIP)?;
        Self::check_persons_differ(&relationship)?;

        relationship.id = new_guid();
        if relationship.reciprocal_relationship_type.is_none() {
            relationship.reciprocal_relationship_type =
                Some(relationship.direct_relationship_type.reciprocal());
        }

        self.repo.create(&relationship).await
    }

    pub async fn update_personal_relationship(
        &self,
        relationship: PersonalRelationship,
    ) -> Result<PersonalRelationship> {
        self.permission_set
            .validate(permissions::UPDATE_RELATIONSHIP)?;
        Self::check_persons_differ(&relationship)?;

        if self.repo.find_by_guid(&relationship.id).await?.is_none() {
            return Err(ApiError::NotFound(format!(
                "No personal relationship was found for guid '{}'.",
                relationship.id
            )));
        }

        let updated = self.repo.update(&relationship).await?;
        if let Some(cache) = &self.cache {
            let _ = cache
                .invalidate_record(PERSONAL_RELATIONSHIPS_RESOURCE, &relationship.id)
                .await;
        }
        Ok(updated)
    }

    pub async fn delete_personal_relationship(&self, guid: &str) -> Result<()> {
        self.permission_set
            .validate(permissions::UPDATE_RELATIONSHIP)?;

        self.repo.delete(guid).await?;
        if let Some(cache) = &self.cache {
            let _ = cache
                .invalidate_record(PERSONAL_RELATIONSHIPS_RESOURCE, guid)
                .await;
        }
        Ok(())
    }
}
