//! Currencies handlers

use crate::api::{
    body_id, bypass_cache, check_immutable_fields, collection_response, load_context,
    require_body, resource_response, validate_get_guid, validate_update_guid,
    version::ApiVersion, FieldComparison,
};
use crate::api::merge::perform_partial_payload_merge;
use crate::domain::Currency;
use crate::error::Result;
use crate::server::AppState;
use crate::service::CURRENCIES_RESOURCE;
use axum::{
    extract::{Path, State},
    http::HeaderMap,
    response::Response,
    Json,
};

const SUPPORTED_VERSIONS: &[&str] = &["1.0.0"];

/// List currencies
pub async fn get_currencies(
    State(state): State<AppState>,
    version: ApiVersion,
    headers: HeaderMap,
) -> Result<Response> {
    let version = version.resolve(SUPPORTED_VERSIONS)?;
    let bypass_cache = bypass_cache(&headers);

    let currencies = state
        .currencies_service
        .get_currencies(bypass_cache)
        .await?;
    let ids = currencies.iter().map(|c| c.id.clone()).collect();
    let context = load_context(&state, CURRENCIES_RESOURCE, ids, bypass_cache).await?;
    collection_response(&currencies, &version, &context)
}

/// Get a currency by GUID
pub async fn get_currency_by_guid(
    State(state): State<AppState>,
    Path(guid): Path<String>,
    version: ApiVersion,
    headers: HeaderMap,
) -> Result<Response> {
    let version = version.resolve(SUPPORTED_VERSIONS)?;
    let bypass_cache = bypass_cache(&headers);
    validate_get_guid(&guid)?;

    let currency = state
        .currencies_service
        .get_currency_by_guid(&guid, bypass_cache)
        .await?;
    let context = load_context(&state, CURRENCIES_RESOURCE, vec![guid], bypass_cache).await?;
    resource_response(&currency, &version, &context)
}

/// Update a currency. The ISO 4217 code is immutable once set.
pub async fn put_currency(
    State(state): State<AppState>,
    Path(guid): Path<String>,
    version: ApiVersion,
    Json(body): Json<serde_json::Value>,
) -> Result<Response> {
    let version = version.resolve(SUPPORTED_VERSIONS)?;
    require_body(&body)?;
    let guid = validate_update_guid(&guid, body_id(&body))?;

    let original = state
        .currencies_service
        .get_currency_by_guid(&guid, true)
        .await?;
    let data_privacy = state
        .extensions_service
        .data_privacy_list(CURRENCIES_RESOURCE, true)
        .await?;
    state
        .extensions_service
        .import_extended_data(CURRENCIES_RESOURCE, &guid, &body)
        .await?;

    let merged: Currency = perform_partial_payload_merge(body, &original, &data_privacy)?;
    check_immutable_fields(
        "currency",
        &[FieldComparison {
            field: "code",
            original: Some(&original.code),
            merged: Some(&merged.code),
        }],
    )?;

    let updated = state.currencies_service.update_currency(merged).await?;
    let context = load_context(&state, CURRENCIES_RESOURCE, vec![guid], true).await?;
    resource_response(&updated, &version, &context)
}
