//! Addresses handlers

use crate::api::filters::{parse_filter, Filter};
use crate::api::merge::perform_partial_payload_merge;
use crate::api::{
    body_id, bypass_cache, empty_paged_response, load_context, paged_response, require_body,
    resource_response, validate_get_guid, validate_update_guid, version::ApiVersion, Paging,
    PagingQuery, DEFAULT_PAGE_LIMIT,
};
use crate::domain::{Address, AddressPersonFilter, AddressQueryCriteria};
use crate::error::{ApiError, Result};
use crate::server::AppState;
use crate::service::ADDRESSES_RESOURCE;
use axum::{
    extract::{Path, Query, RawQuery, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use validator::Validate;

const SUPPORTED_VERSIONS: &[&str] = &["6", "11.1.0"];
const PERSON_FILTER: &str = "personFilter";

fn apply_version(address: Address, version: &str) -> Address {
    if version == "6" {
        address.into_v6()
    } else {
        address
    }
}

/// List addresses with paging. The 11.1.0 representation supports a person
/// filter; a filter that can match nothing short-circuits to an empty page.
pub async fn get_addresses(
    State(state): State<AppState>,
    version: ApiVersion,
    headers: HeaderMap,
    Query(paging): Query<PagingQuery>,
    RawQuery(query): RawQuery,
) -> Result<Response> {
    let version = version.resolve(SUPPORTED_VERSIONS)?;
    let bypass_cache = bypass_cache(&headers);
    let paging = Paging::resolve(paging, DEFAULT_PAGE_LIMIT, state.config.api.max_page_size)?;

    let person_guid = if version == "6" {
        None
    } else {
        let filter: Filter<AddressPersonFilter> = parse_filter(query.as_deref(), PERSON_FILTER)?;
        if filter.is_empty_filter() {
            return empty_paged_response(paging, &version);
        }
        filter
            .into_option()
            .and_then(|f| f.person_filter)
            .map(|p| p.id)
    };

    let (addresses, total) = state
        .addresses_service
        .get_addresses(paging.offset, paging.limit, person_guid)
        .await?;
    let addresses: Vec<Address> = addresses
        .into_iter()
        .map(|a| apply_version(a, &version))
        .collect();

    let ids = addresses.iter().map(|a| a.id.clone()).collect();
    let context = load_context(&state, ADDRESSES_RESOURCE, ids, bypass_cache).await?;
    let self_link = state
        .config
        .api
        .include_link_self_headers
        .then(|| "/addresses".to_string());
    paged_response(&addresses, total, paging, &version, &context, self_link)
}

/// Get an address by GUID
pub async fn get_address_by_guid(
    State(state): State<AppState>,
    Path(guid): Path<String>,
    version: ApiVersion,
    headers: HeaderMap,
) -> Result<Response> {
    let version = version.resolve(SUPPORTED_VERSIONS)?;
    let bypass_cache = bypass_cache(&headers);
    validate_get_guid(&guid)?;

    let address = state
        .addresses_service
        .get_address_by_guid(&guid, bypass_cache)
        .await?;
    let address = apply_version(address, &version);

    let context = load_context(&state, ADDRESSES_RESOURCE, vec![guid], bypass_cache).await?;
    resource_response(&address, &version, &context)
}

/// Query addresses for a list of persons
pub async fn query_addresses(
    State(state): State<AppState>,
    Json(body): Json<serde_json::Value>,
) -> Result<Response> {
    require_body(&body)?;
    let criteria: AddressQueryCriteria = serde_json::from_value(body).map_err(|_| {
        ApiError::validation(
            "Invalid query criteria",
            "The address query criteria is not valid.",
        )
    })?;
    criteria.validate()?;

    let addresses = state
        .addresses_service
        .query_addresses_by_person_ids(criteria.person_ids)
        .await?;
    Ok(Json(addresses).into_response())
}

/// Update an address
pub async fn put_address(
    State(state): State<AppState>,
    Path(guid): Path<String>,
    version: ApiVersion,
    Json(body): Json<serde_json::Value>,
) -> Result<Response> {
    let version = version.resolve(SUPPORTED_VERSIONS)?;
    require_body(&body)?;
    let guid = validate_update_guid(&guid, body_id(&body))?;

    let original = state
        .addresses_service
        .get_address_by_guid(&guid, true)
        .await?;
    let data_privacy = state
        .extensions_service
        .data_privacy_list(ADDRESSES_RESOURCE, true)
        .await?;
    state
        .extensions_service
        .import_extended_data(ADDRESSES_RESOURCE, &guid, &body)
        .await?;

    let merged: Address = perform_partial_payload_merge(body, &original, &data_privacy)?;
    let updated = state.addresses_service.update_address(merged).await?;
    let updated = apply_version(updated, &version);

    let context = load_context(&state, ADDRESSES_RESOURCE, vec![guid], true).await?;
    resource_response(&updated, &version, &context)
}

/// Delete an address
pub async fn delete_address(
    State(state): State<AppState>,
    Path(guid): Path<String>,
) -> Result<Response> {
    validate_get_guid(&guid)?;
    state.addresses_service.delete_address(&guid).await?;
    Ok(StatusCode::NO_CONTENT.into_response())
}
