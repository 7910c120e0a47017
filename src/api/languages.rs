//! Languages handlers

use crate::api::{
    body_id, bypass_cache, check_immutable_fields, collection_response, load_context,
    require_body, resource_response, validate_get_guid, validate_update_guid,
    version::ApiVersion, FieldComparison,
};
use crate::api::merge::perform_partial_payload_merge;
use crate::domain::Language;
use crate::error::Result;
use crate::server::AppState;
use crate::service::LANGUAGES_RESOURCE;
use axum::{
    extract::{Path, State},
    http::HeaderMap,
    response::Response,
    Json,
};

const SUPPORTED_VERSIONS: &[&str] = &["1.0.0"];

/// List languages
pub async fn get_languages(
    State(state): State<AppState>,
    version: ApiVersion,
    headers: HeaderMap,
) -> Result<Response> {
    let version = version.resolve(SUPPORTED_VERSIONS)?;
    let bypass_cache = bypass_cache(&headers);

    let languages = state.languages_service.get_languages(bypass_cache).await?;
    let ids = languages.iter().map(|l| l.id.clone()).collect();
    let context = load_context(&state, LANGUAGES_RESOURCE, ids, bypass_cache).await?;
    collection_response(&languages, &version, &context)
}

/// Get a language by GUID
pub async fn get_language_by_guid(
    State(state): State<AppState>,
    Path(guid): Path<String>,
    version: ApiVersion,
    headers: HeaderMap,
) -> Result<Response> {
    let version = version.resolve(SUPPORTED_VERSIONS)?;
    let bypass_cache = bypass_cache(&headers);
    validate_get_guid(&guid)?;

    let language = state
        .languages_service
        .get_language_by_guid(&guid, bypass_cache)
        .await?;
    let context = load_context(&state, LANGUAGES_RESOURCE, vec![guid], bypass_cache).await?;
    resource_response(&language, &version, &context)
}

/// Update a language. The code may not be removed or changed for an existing
/// language and the title may not change once set.
pub async fn put_language(
    State(state): State<AppState>,
    Path(guid): Path<String>,
    version: ApiVersion,
    Json(body): Json<serde_json::Value>,
) -> Result<Response> {
    let version = version.resolve(SUPPORTED_VERSIONS)?;
    require_body(&body)?;
    let guid = validate_update_guid(&guid, body_id(&body))?;

    let original = state
        .languages_service
        .get_language_by_guid(&guid, true)
        .await?;
    let data_privacy = state
        .extensions_service
        .data_privacy_list(LANGUAGES_RESOURCE, true)
        .await?;
    state
        .extensions_service
        .import_extended_data(LANGUAGES_RESOURCE, &guid, &body)
        .await?;

    let merged: Language = perform_partial_payload_merge(body, &original, &data_privacy)?;
    check_immutable_fields(
        "language",
        &[
            FieldComparison {
                field: "code",
                original: original.code.as_deref(),
                merged: merged.code.as_deref(),
            },
            FieldComparison {
                field: "title",
                original: Some(&original.title),
                merged: Some(&merged.title),
            },
        ],
    )?;

    let updated = state.languages_service.update_language(merged).await?;
    let context = load_context(&state, LANGUAGES_RESOURCE, vec![guid], true).await?;
    resource_response(&updated, &version, &context)
}
