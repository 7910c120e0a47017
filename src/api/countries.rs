//! Countries and country ISO codes handlers

use crate::api::{
    body_id, bypass_cache, collection_response, load_context, require_body, resource_response,
    validate_get_guid, validate_update_guid, version::ApiVersion,
};
use crate::api::merge::perform_partial_payload_merge;
use crate::domain::Country;
use crate::error::Result;
use crate::server::AppState;
use crate::service::{COUNTRIES_RESOURCE, COUNTRY_ISO_CODES_RESOURCE};
use axum::{
    extract::{Path, State},
    http::HeaderMap,
    response::Response,
    Json,
};

const SUPPORTED_VERSIONS: &[&str] = &["1.0.0"];

/// List countries
pub async fn get_countries(
    State(state): State<AppState>,
    version: ApiVersion,
    headers: HeaderMap,
) -> Result<Response> {
    let version = version.resolve(SUPPORTED_VERSIONS)?;
    let bypass_cache = bypass_cache(&headers);

    let countries = state.countries_service.get_countries(bypass_cache).await?;
    let ids = countries.iter().map(|c| c.id.clone()).collect();
    let context = load_context(&state, COUNTRIES_RESOURCE, ids, bypass_cache).await?;
    collection_response(&countries, &version, &context)
}

/// Get a country by GUID
pub async fn get_country_by_guid(
    State(state): State<AppState>,
    Path(guid): Path<String>,
    version: ApiVersion,
    headers: HeaderMap,
) -> Result<Response> {
    let version = version.resolve(SUPPORTED_VERSIONS)?;
    let bypass_cache = bypass_cache(&headers);
    validate_get_guid(&guid)?;

    let country = state
        .countries_service
        .get_country_by_guid(&guid, bypass_cache)
        .await?;
    let context = load_context(&state, COUNTRIES_RESOURCE, vec![guid], bypass_cache).await?;
    resource_response(&country, &version, &context)
}

/// Update a country
pub async fn put_country(
    State(state): State<AppState>,
    Path(guid): Path<String>,
    version: ApiVersion,
    Json(body): Json<serde_json::Value>,
) -> Result<Response> {
    let version = version.resolve(SUPPORTED_VERSIONS)?;
    require_body(&body)?;
    let guid = validate_update_guid(&guid, body_id(&body))?;

    let original = state
        .countries_service
        .get_country_by_guid(&guid, true)
        .await?;
    let data_privacy = state
        .extensions_service
        .data_privacy_list(COUNTRIES_RESOURCE, true)
        .await?;
    state
        .extensions_service
        .import_extended_data(COUNTRIES_RESOURCE, &guid, &body)
        .await?;

    let merged: Country = perform_partial_payload_merge(body, &original, &data_privacy)?;
    let updated = state.countries_service.update_country(merged).await?;

    let context = load_context(&state, COUNTRIES_RESOURCE, vec![guid], true).await?;
    resource_response(&updated, &version, &context)
}

/// List country ISO codes
pub async fn get_country_iso_codes(
    State(state): State<AppState>,
    version: ApiVersion,
    headers: HeaderMap,
) -> Result<Response> {
    let version = version.resolve(SUPPORTED_VERSIONS)?;
    let bypass_cache = bypass_cache(&headers);

    let codes = state
        .countries_service
        .get_country_iso_codes(bypass_cache)
        .await?;
    let ids = codes.iter().map(|c| c.id.clone()).collect();
    let context = load_context(&state, COUNTRY_ISO_CODES_RESOURCE, ids, bypass_cache).await?;
    collection_response(&codes, &version, &context)
}

/// Get a country ISO code by GUID
pub async fn get_country_iso_code_by_guid(
    State(state): State<AppState>,
    Path(guid): Path<String>,
    version: ApiVersion,
    headers: HeaderMap,
) -> Result<Response> {
    let version = version.resolve(SUPPORTED_VERSIONS)?;
    let bypass_cache = bypass_cache(&headers);
    validate_get_guid(&guid)?;

    let code = state
        .countries_service
        .get_country_iso_code_by_guid(&guid)
        .await?;
    let context = load_context(&state, COUNTRY_ISO_CODES_RESOURCE, vec![guid], bypass_cache).await?;
    resource_response(&code, &version, &context)
}
