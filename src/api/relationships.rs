//! Personal relationships handlers

use crate::api::filters::{parse_filter, Filter};
use crate::api::merge::perform_partial_payload_merge;
use crate::api::{
    body_id, bypass_cache, empty_paged_response, load_context, paged_response, require_body,
    resource_response, validate_create_guid, validate_get_guid, validate_update_guid,
    version::ApiVersion, Paging, PagingQuery, DEFAULT_PAGE_LIMIT,
};
use crate::domain::{PersonalRelationship, RelationshipFilter};
use crate::error::{ApiError, Result};
use crate::server::AppState;
use crate::service::PERSONAL_RELATIONSHIPS_RESOURCE;
use axum::{
    extract::{Path, Query, RawQuery, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

const SUPPORTED_VERSIONS: &[&str] = &["16"];
const CRITERIA: &str = "criteria";

fn parse_body(body: serde_json::Value) -> Result<PersonalRelationship> {
    serde_json::from_value(body).map_err(|e| {
        ApiError::validation(
            "An error occurred attempting to validate data.",
            format!("The personal relationship payload is not valid: {}.", e),
        )
    })
}

/// List personal relationships with paging and an optional person filter
pub async fn get_personal_relationships(
    State(state): State<AppState>,
    version: ApiVersion,
    headers: HeaderMap,
    Query(paging): Query<PagingQuery>,
    RawQuery(query): RawQuery,
) -> Result<Response> {
    let version = version.resolve(SUPPORTED_VERSIONS)?;
    let bypass_cache = bypass_cache(&headers);
    let paging = Paging::resolve(paging, DEFAULT_PAGE_LIMIT, state.config.api.max_page_size)?;

    let filter: Filter<RelationshipFilter> = parse_filter(query.as_deref(), CRITERIA)?;
    if filter.is_empty_filter() {
        return empty_paged_response(paging, &version);
    }
    let person_guid = filter.into_option().and_then(|f| f.person).map(|p| p.id);

    let (relationships, total) = state
        .relationships_service
        .get_personal_relationships(paging.offset, paging.limit, person_guid)
        .await?;

    let ids = relationships.iter().map(|r| r.id.clone()).collect();
    let context = load_context(&state, PERSONAL_RELATIONSHIPS_RESOURCE, ids, bypass_cache).await?;
    let self_link = state
        .config
        .api
        .include_link_self_headers
        .then(|| "/personal-relationships".to_string());
    paged_response(&relationships, total, paging, &version, &context, self_link)
}

/// Get a personal relationship by GUID
pub async fn get_personal_relationship_by_guid(
    State(state): State<AppState>,
    Path(guid): Path<String>,
    version: ApiVersion,
    headers: HeaderMap,
) -> Result<Response> {
    let version = version.resolve(SUPPORTED_VERSIONS)?;
    let bypass_cache = bypass_cache(&headers);
    validate_get_guid(&guid)?;

    let relationship = state
        .relationships_service
        .get_personal_relationship_by_guid(&guid)
        .await?;
    let context =
        load_context(&state, PERSONAL_RELATIONSHIPS_RESOURCE, vec![guid], bypass_cache).await?;
    resource_response(&relationship, &version, &context)
}

/// Create a personal relationship. The body must carry the nil GUID; the
/// server assigns the record id.
pub async fn post_personal_relationship(
    State(state): State<AppState>,
    version: ApiVersion,
    Json(body): Json<serde_json::Value>,
) -> Result<Response> {
    let version = version.resolve(SUPPORTED_VERSIONS)?;
    require_body(&body)?;
    validate_create_guid(body_id(&body))?;

    let relationship = parse_body(body.clone())?;
    let created = state
        .relationships_service
        .create_personal_relationship(relationship)
        .await?;

    state
        .extensions_service
        .import_extended_data(PERSONAL_RELATIONSHIPS_RESOURCE, &created.id, &body)
        .await?;
    let context =
        load_context(&state, PERSONAL_RELATIONSHIPS_RESOURCE, vec![created.id.clone()], true)
            .await?;
    resource_response(&created, &version, &context)
}

/// Update a personal relationship
pub async fn put_personal_relationship(
    State(state): State<AppState>,
    Path(guid): Path<String>,
    version: ApiVersion,
    Json(body): Json<serde_json::Value>,
) -> Result<Response> {
    let version = version.resolve(SUPPORTED_VERSIONS)?;
    require_body(&body)?;
    let guid = validate_update_guid(&guid, body_id(&body))?;

    let original = state
        .relationships_service
        .get_personal_relationship_by_guid(&guid)
        .await?;
    let data_privacy = state
        .extensions_service
        .data_privacy_list(PERSONAL_RELATIONSHIPS_RESOURCE, true)
        .await?;
    state
        .extensions_service
        .import_extended_data(PERSONAL_RELATIONSHIPS_RESOURCE, &guid, &body)
        .await?;

    let merged: PersonalRelationship =
        perform_partial_payload_merge(body, &original, &data_privacy)?;
    let updated = state
        .relationships_service
        .update_personal_relationship(merged)
        .await?;

    let context = load_context(&state, PERSONAL_RELATIONSHIPS_RESOURCE, vec![guid], true).await?;
    resource_response(&updated, &version, &context)
}

/// Delete a personal relationship
pub async fn delete_personal_relationship(
    State(state): State<AppState>,
    Path(guid): Path<String>,
) -> Result<Response> {
    validate_get_guid(&guid)?;
    state
        .relationships_service
        .delete_personal_relationship(&guid)
        .await?;
    Ok(StatusCode::NO_CONTENT.into_response())
}
