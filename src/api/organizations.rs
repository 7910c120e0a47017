//! Organizations handlers

use crate::api::filters::{parse_filter, Filter};
use crate::api::merge::perform_partial_payload_merge;
use crate::api::{
    body_id, bypass_cache, empty_paged_response, load_context, paged_response, require_body,
    resource_response, validate_get_guid, validate_update_guid, version::ApiVersion, Paging,
    PagingQuery, DEFAULT_PAGE_LIMIT,
};
use crate::domain::{Organization, OrganizationFilter};
use crate::error::Result;
use crate::server::AppState;
use crate::service::ORGANIZATIONS_RESOURCE;
use axum::{
    extract::{Path, Query, RawQuery, State},
    http::HeaderMap,
    response::Response,
    Json,
};

const SUPPORTED_VERSIONS: &[&str] = &["6"];
const CRITERIA: &str = "criteria";

/// List organizations with paging and an optional role/credential filter
pub async fn get_organizations(
    State(state): State<AppState>,
    version: ApiVersion,
    headers: HeaderMap,
    Query(paging): Query<PagingQuery>,
    RawQuery(query): RawQuery,
) -> Result<Response> {
    let version = version.resolve(SUPPORTED_VERSIONS)?;
    let bypass_cache = bypass_cache(&headers);
    let paging = Paging::resolve(paging, DEFAULT_PAGE_LIMIT, state.config.api.max_page_size)?;

    let filter: Filter<OrganizationFilter> = parse_filter(query.as_deref(), CRITERIA)?;
    if filter.is_empty_filter() {
        return empty_paged_response(paging, &version);
    }
    let filter = filter.into_option().unwrap_or_default();

    let (organizations, total) = state
        .organizations_service
        .get_organizations(paging.offset, paging.limit, filter)
        .await?;

    let ids = organizations.iter().map(|o| o.id.clone()).collect();
    let context = load_context(&state, ORGANIZATIONS_RESOURCE, ids, bypass_cache).await?;
    let self_link = state
        .config
        .api
        .include_link_self_headers
        .then(|| "/organizations".to_string());
    paged_response(&organizations, total, paging, &version, &context, self_link)
}

/// Get an organization by id. Ids belonging to educational institutions are
/// rejected with a wrong-resource-type error.
pub async fn get_organization_by_guid(
    State(state): State<AppState>,
    Path(guid): Path<String>,
    version: ApiVersion,
    headers: HeaderMap,
) -> Result<Response> {
    let version = version.resolve(SUPPORTED_VERSIONS)?;
    let bypass_cache = bypass_cache(&headers);
    validate_get_guid(&guid)?;

    let organization = state
        .organizations_service
        .get_organization_by_guid(&guid)
        .await?;
    let context = load_context(&state, ORGANIZATIONS_RESOURCE, vec![guid], bypass_cache).await?;
    resource_response(&organization, &version, &context)
}

/// Update an organization
pub async fn put_organization(
    State(state): State<AppState>,
    Path(guid): Path<String>,
    version: ApiVersion,
    Json(body): Json<serde_json::Value>,
) -> Result<Response> {
    let version = version.resolve(SUPPORTED_VERSIONS)?;
    require_body(&body)?;
    let guid = validate_update_guid(&guid, body_id(&body))?;

    let original = state
        .organizations_service
        .get_organization_by_guid(&guid)
        .await?;
    let data_privacy = state
        .extensions_service
        .data_privacy_list(ORGANIZATIONS_RESOURCE, true)
        .await?;
    state
        .extensions_service
        .import_extended_data(ORGANIZATIONS_RESOURCE, &guid, &body)
        .await?;

    let merged: Organization = perform_partial_payload_merge(body, &original, &data_privacy)?;
    let updated = state
        .organizations_service
        .update_organization(merged)
        .await?;

    let context = load_context(&state, ORGANIZATIONS_RESOURCE, vec![guid], true).await?;
    resource_response(&updated, &version, &context)
}
