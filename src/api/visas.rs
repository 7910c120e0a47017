//! Person visas handlers

use crate::api::filters::{parse_filter, Filter};
use crate::api::merge::perform_partial_payload_merge;
use crate::api::{
    body_id, bypass_cache, empty_paged_response, load_context, paged_response, require_body,
    resource_response, validate_create_guid, validate_get_guid, validate_update_guid,
    version::ApiVersion, Paging, PagingQuery, DEFAULT_PAGE_LIMIT,
};
use crate::domain::{PersonVisa, VisaFilter};
use crate::error::{ApiError, Result};
use crate::server::AppState;
use crate::service::PERSON_VISAS_RESOURCE;
use axum::{
    extract::{Path, Query, RawQuery, State},
    http::HeaderMap,
    response::Response,
    Json,
};

const SUPPORTED_VERSIONS: &[&str] = &["6", "11"];
const PERSON_FILTER: &str = "person";

fn apply_version(visa: PersonVisa, version: &str) -> PersonVisa {
    if version == "6" {
        visa.into_v6()
    } else {
        visa
    }
}

fn parse_body(body: serde_json::Value) -> Result<PersonVisa> {
    serde_json::from_value(body).map_err(|e| {
        ApiError::validation(
            "An error occurred attempting to validate data.",
            format!("The person visa payload is not valid: {}.", e),
        )
    })
}

/// List person visas with paging and an optional person filter
pub async fn get_person_visas(
    State(state): State<AppState>,
    version: ApiVersion,
    headers: HeaderMap,
    Query(paging): Query<PagingQuery>,
    RawQuery(query): RawQuery,
) -> Result<Response> {
    let version = version.resolve(SUPPORTED_VERSIONS)?;
    let bypass_cache = bypass_cache(&headers);
    let paging = Paging::resolve(paging, DEFAULT_PAGE_LIMIT, state.config.api.max_page_size)?;

    let filter: Filter<VisaFilter> = parse_filter(query.as_deref(), PERSON_FILTER)?;
    if filter.is_empty_filter() {
        return empty_paged_response(paging, &version);
    }
    let person_guid = filter.into_option().and_then(|f| f.person).map(|p| p.id);

    let (visas, total) = state
        .visas_service
        .get_person_visas(paging.offset, paging.limit, person_guid)
        .await?;
    let visas: Vec<PersonVisa> = visas
        .into_iter()
        .map(|v| apply_version(v, &version))
        .collect();

    let ids = visas.iter().map(|v| v.id.clone()).collect();
    let context = load_context(&state, PERSON_VISAS_RESOURCE, ids, bypass_cache).await?;
    let self_link = state
        .config
        .api
        .include_link_self_headers
        .then(|| "/person-visas".to_string());
    paged_response(&visas, total, paging, &version, &context, self_link)
}

/// Get a person visa by GUID
pub async fn get_person_visa_by_guid(
    State(state): State<AppState>,
    Path(guid): Path<String>,
    version: ApiVersion,
    headers: HeaderMap,
) -> Result<Response> {
    let version = version.resolve(SUPPORTED_VERSIONS)?;
    let bypass_cache = bypass_cache(&headers);
    validate_get_guid(&guid)?;

    let visa = state
        .visas_service
        .get_person_visa_by_guid(&guid, bypass_cache)
        .await?;
    let visa = apply_version(visa, &version);

    let context = load_context(&state, PERSON_VISAS_RESOURCE, vec![guid], bypass_cache).await?;
    resource_response(&visa, &version, &context)
}

/// Create a person visa. The body must carry the nil GUID; the server assigns
/// the record id.
pub async fn post_person_visa(
    State(state): State<AppState>,
    version: ApiVersion,
    Json(body): Json<serde_json::Value>,
) -> Result<Response> {
    let version = version.resolve(SUPPORTED_VERSIONS)?;
    require_body(&body)?;
    validate_create_guid(body_id(&body))?;

    let visa = parse_body(body.clone())?;
    let created = state.visas_service.create_person_visa(visa).await?;
    let created = apply_version(created, &version);

    state
        .extensions_service
        .import_extended_data(PERSON_VISAS_RESOURCE, &created.id, &body)
        .await?;
    let context = load_context(&state, PERSON_VISAS_RESOURCE, vec![created.id.clone()], true).await?;
    resource_response(&created, &version, &context)
}

/// Update a person visa
pub async fn put_person_visa(
    State(state): State<AppState>,
    Path(guid): Path<String>,
    version: ApiVersion,
    Json(body): Json<serde_json::Value>,
) -> Result<Response> {
    let version = version.resolve(SUPPORTED_VERSIONS)?;
    require_body(&body)?;
    let guid = validate_update_guid(&guid, body_id(&body))?;

    let original = state
        .visas_service
        .get_person_visa_by_guid(&guid, true)
        .await?;
    let data_privacy = state
        .extensions_service
        .data_privacy_list(PERSON_VISAS_RESOURCE, true)
        .await?;
    state
        .extensions_service
        .import_extended_data(PERSON_VISAS_RESOURCE, &guid, &body)
        .await?;

    let merged: PersonVisa = perform_partial_payload_merge(body, &original, &data_privacy)?;
    let updated = state.visas_service.update_person_visa(merged).await?;
    let updated = apply_version(updated, &version);

    let context = load_context(&state, PERSON_VISAS_RESOURCE, vec![guid], true).await?;
    resource_response(&updated, &version, &context)
}
