//! Personal relationship resource

use super::common::GuidObject;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Relationship type between two persons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RelationshipType {
    Parent,
    Child,
    Sibling,
    Spouse,
    Partner,
    Guardian,
    Friend,
    Other,
}

impl RelationshipType {
    /// The type seen from the other person's side, used to default the
    /// reciprocal when a create omits it
    pub fn reciprocal(&self) -> RelationshipType {
        match self {
            RelationshipType::Parent => RelationshipType::Child,
            RelationshipType::Child => RelationshipType::Parent,
            RelationshipType::Sibling => RelationshipType::Sibling,
            RelationshipType::Spouse => RelationshipType::Spouse,
            RelationshipType::Partner => RelationshipType::Partner,
            RelationshipType::Guardian => RelationshipType::Other,
            RelationshipType::Friend => RelationshipType::Friend,
            RelationshipType::Other => RelationshipType::Other,
        }
    }
}

impl std::str::FromStr for RelationshipType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "parent" => Ok(RelationshipType::Parent),
            "child" => Ok(RelationshipType::Child),
            "sibling" => Ok(RelationshipType::Sibling),
            "spouse" => Ok(RelationshipType::Spouse),
            "partner" => Ok(RelationshipType::Partner),
            "guardian" => Ok(RelationshipType::Guardian),
            "friend" => Ok(RelationshipType::Friend),
            "other" => Ok(RelationshipType::Other),
            _ => Err(format!("Unknown relationship type: {}", s)),
        }
    }
}

impl std::fmt::Display for RelationshipType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RelationshipType::Parent => "parent",
            RelationshipType::Child => "child",
            RelationshipType::Sibling => "sibling",
            RelationshipType::Spouse => "spouse",
            RelationshipType::Partner => "partner",
            RelationshipType::Guardian => "guardian",
            RelationshipType::Friend => "friend",
            RelationshipType::Other => "other",
        };
        write!(f, "{}", s)
    }
}

impl<'r> sqlx::Decode<'r, sqlx::MySql> for RelationshipType {
    fn decode(
        value: sqlx::mysql::MySqlValueRef<'r>,
    ) -> std::result::Result<Self, sqlx::error::BoxDynError> {
        let s: String = sqlx::Decode::<'r, sqlx::MySql>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl sqlx::Type<sqlx::MySql> for RelationshipType {
    fn type_info() -> sqlx::mysql::MySqlTypeInfo {
        <String as sqlx::Type<sqlx::MySql>>::type_info()
    }

    fn compatible(ty: &sqlx::mysql::MySqlTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::MySql>>::compatible(ty)
    }
}

impl<'q> sqlx::Encode<'q, sqlx::MySql> for RelationshipType {
    fn encode_by_ref(
        &self,
        buf: &mut Vec<u8>,
    ) -> std::result::Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        let s = self.to_string();
        <String as sqlx::Encode<sqlx::MySql>>::encode_by_ref(&s, buf)
    }
}

/// The person on the other end of the relationship
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelatedPerson {
    pub person: GuidObject,
}

/// Personal relationship resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PersonalRelationship {
    pub id: String,
    #[sqlx(json)]
    pub subject_person: GuidObject,
    #[sqlx(json)]
    pub related: RelatedPerson,
    pub direct_relationship_type: RelationshipType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reciprocal_relationship_type: Option<RelationshipType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_on: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_on: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// Filter bound from `?person={...}` on the personal relationships list route
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RelationshipFilter {
    pub person: Option<GuidObject>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relationship_type_round_trip() {
        for value in ["parent", "child", "sibling", "spouse", "partner", "guardian", "friend", "other"] {
            let parsed: RelationshipType = value.parse().unwrap();
            assert_eq!(parsed.to_string(), value);
        }
        assert!("cousin".parse::<RelationshipType>().is_err());
    }

    #[test]
    fn test_reciprocal_defaults() {
        assert_eq!(RelationshipType::Parent.reciprocal(), RelationshipType::Child);
        assert_eq!(RelationshipType::Child.reciprocal(), RelationshipType::Parent);
        assert_eq!(RelationshipType::Sibling.reciprocal(), RelationshipType::Sibling);
        assert_eq!(RelationshipType::Guardian.reciprocal(), RelationshipType::Other);
    }

    #[test]
    fn test_wire_format() {
        let rel = PersonalRelationship {
            id: "pr-1".to_string(),
            subject_person: GuidObject::new("p-1"),
            related: RelatedPerson {
                person: GuidObject::new("p-2"),
            },
            direct_relationship_type: RelationshipType::Parent,
            reciprocal_relationship_type: Some(RelationshipType::Child),
            start_on: NaiveDate::from_ymd_opt(2020, 9, 1),
            end_on: None,
            comment: None,
        };
        let json = serde_json::to_value(&rel).unwrap();
        assert_eq!(json["subjectPerson"]["id"], "p-1");
        assert_eq!(json["related"]["person"]["id"], "p-2");
        assert_eq!(json["directRelationshipType"], "parent");
        assert_eq!(json["reciprocalRelationshipType"], "child");
        assert_eq!(json["startOn"], "2020-09-01");
        assert!(json.get("endOn").is_none());
    }
}
