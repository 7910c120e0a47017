//! Personal relationship repository

use crate::domain::PersonalRelationship;
use crate::error::{ApiError, Result};
use async_trait::async_trait;
use sqlx::MySqlPool;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RelationshipRepository: Send + Sync {
    async fn list(
        &self,
        offset: i64,
        limit: i64,
        person_guid: Option<String>,
    ) -> Result<(Vec<PersonalRelationship>, i64)>;
    async fn find_by_guid(&self, guid: &str) -> Result<Option<PersonalRelationship>>;
    async fn create(&self, relationship: &PersonalRelationship) -> Result<PersonalRelationship>;
    async fn update(&self, relationship: &PersonalRelationship) -> Result<PersonalRelationship>;
    async fn delete(&self, guid: &str) -> Result<()>;
}

pub struct RelationshipRepositoryImpl {
    pool: MySqlPool,
}

impl RelationshipRepositoryImpl {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    fn json_columns(
        relationship: &PersonalRelationship,
    ) -> Result<(String, String)> {
        let subject_person = serde_json::to_string(&relationship.subject_person)
            .map_err(|e| ApiError::Internal(e.into()))?;
        let related = serde_json::to_string(&relationship.related)
            .map_err(|e| ApiError::Internal(e.into()))?;
        Ok((subject_person, related))
    }
}

#[async_trait]
impl RelationshipRepository for RelationshipRepositoryImpl {
    async fn list(
        &self,
        offset: i64,
        limit: i64,
        person_guid: Option<String>,
    ) -> Result<(Vec<PersonalRelationship>, i64)> {
        let relationships = sqlx::query_as::<_, PersonalRelationship>(
            r#"
            SELECT id, subject_person, related, direct_relationship_type,
                   reciprocal_relationship_type, start_on, end_on, comment
            FROM personal_relationships
            WHERE (? IS NULL OR subject_person->>'$.id' = ? OR related->>'$.person.id' = ?)
            ORDER BY id
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(&person_guid)
        .bind(&person_guid)
        .bind(&person_guid)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let row: (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*)
            FROM personal_relationships
            WHERE (? IS NULL OR subject_person->>'$.id' = ? OR related->>'$.person.id' = ?)
            "#,
        )
        .bind(&person_guid)
        .bind(&person_guid)
        .bind(&person_guid)
        .fetch_one(&self.pool)
        .await?;

        Ok((relationships, row.0))
    }

    async fn find_by_guid(&self, guid: &str) -> Result<Option<PersonalRelationship>> {
        let relationship = sqlx::query_as::<_, PersonalRelationship>(
            r#"
            SELECT id, subject_person, related, direct_relationship_type,
                   reciprocal_relationship_type, start_on, end_on, comment
            FROM personal_relationships
            WHERE id = ?
            "#,
        )
        .bind(guid)
        .fetch_optional(&self.pool)
        .await?;

        Ok(relationship)
    }

    async fn create(&self, relationship: &PersonalRelationship) -> Result<PersonalRelationship> {
        let (subject_person, related) = Self::json_columns(relationship)?;

        sqlx::query(
            r#"
            INSERT INTO personal_relationships
                (id, subject_person, related, direct_relationship_type,
                 reciprocal_relationship_type, start_on, end_on, comment)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&relationship.id)
        .bind(&subject_person)
        .bind(&related)
        .bind(relationship.direct_relationship_type)
        .bind(relationship.reciprocal_relationship_type)
        .bind(relationship.start_on)
        .bind(relationship.end_on)
        .bind(&relationship.comment)
        .execute(&self.pool)
        .await?;

        self.find_by_guid(&relationship.id).await?.ok_or_else(|| {
            ApiError::Internal(anyhow::anyhow!("Failed to create personal relationship"))
        })
    }

    async fn update(&self, relationship: &PersonalRelationship) -> Result<PersonalRelationship> {
        let (subject_person, related) = Self::json_columns(relationship)?;

        sqlx::query(
            r#"
            UPDATE personal_relationships
            SET subject_person = ?, related = ?, direct_relationship_type = ?,
                reciprocal_relationship_type = ?, start_on = ?, end_on = ?, comment = ?
            WHERE id = ?
            "#,
        )
        .bind(&subject_person)
        .bind(&related)
        .bind(relationship.direct_relationship_type)
        .bind(relationship.reciprocal_relationship_type)
        .bind(relationship.start_on)
        .bind(relationship.end_on)
        .bind(&relationship.comment)
        .bind(&relationship.id)
        .execute(&self.pool)
        .await?;

        self.find_by_guid(&relationship.id).await?.ok_or_else(|| {
            ApiError::Internal(anyhow::anyhow!("Failed to update personal relationship"))
        })
    }

    async fn delete(&self, guid: &str) -> Result<()> {
        let result = sqlx::query("DELETE FROM personal_relationships WHERE id = ?")
            .bind(guid)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound(format!(
                "No personal relationship was found for guid '{}'.",
                guid
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{GuidObject, RelatedPerson, RelationshipType};

    #[tokio::test]
    async fn test_mock_relationship_repository() {
        let mut mock = MockRelationshipRepository::new();

        mock.expect_create().returning(|rel| Ok(rel.clone()));

        let relationship = PersonalRelationship {
            id: "pr-1".to_string(),
            subject_person: GuidObject::new("p-1"),
            related: RelatedPerson {
                person: GuidObject::new("p-2"),
            },
            direct_relationship_type: RelationshipType::Parent,
            reciprocal_relationship_type: Some(RelationshipType::Child),
            start_on: None,
            end_on: None,
            comment: None,
        };

        let created = mock.create(&relationship).await.unwrap();
        assert_eq!(created.id, "pr-1");
    }
}
