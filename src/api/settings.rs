//! Configuration settings and default settings handlers.
//!
//! Both resources serve two representations from the same routes: the default
//! settings DTO, and an options view selected through a named media-type
//! representation. The options view is read-only.

use crate::api::filters::{parse_filter, Filter};
use crate::api::merge::perform_partial_payload_merge;
use crate::api::{
    body_id, bypass_cache, check_immutable_fields, collection_response, load_context,
    require_body, resource_response, validate_get_guid, validate_update_guid,
    version::ApiVersion, FieldComparison,
};
use crate::domain::{ConfigurationSettings, DefaultSettings, SettingsFilter, SettingsSource};
use crate::error::{ApiError, Result};
use crate::server::AppState;
use crate::service::{CONFIGURATION_SETTINGS_RESOURCE, DEFAULT_SETTINGS_RESOURCE};
use axum::{
    extract::{Path, RawQuery, State},
    http::HeaderMap,
    response::Response,
    Json,
};

const SUPPORTED_VERSIONS: &[&str] = &["1.0.0"];
const CONFIGURATION_OPTIONS: &str = "configuration-settings-options";
const DEFAULT_OPTIONS: &str = "default-settings-options";
const CRITERIA: &str = "criteria";

fn resources_filter(query: Option<&str>) -> Result<Option<Vec<String>>> {
    let filter: Filter<SettingsFilter> = parse_filter(query, CRITERIA)?;
    if filter.is_empty_filter() {
        return Ok(None);
    }
    Ok(Some(
        filter.into_option().map(|f| f.resources()).unwrap_or_default(),
    ))
}

/// Source-title immutability applies only while the source value is unchanged:
/// pointing a setting at a new value legitimately changes the title with it.
fn check_settings_immutable<'a>(
    resource: &str,
    original_title: &'a str,
    merged_title: &'a str,
    original_description: Option<&'a str>,
    merged_description: Option<&'a str>,
    original_source: &'a Option<SettingsSource>,
    merged_source: &'a Option<SettingsSource>,
) -> Result<()> {
    let mut comparisons = vec![
        FieldComparison {
            field: "title",
            original: Some(original_title),
            merged: Some(merged_title),
        },
        FieldComparison {
            field: "description",
            original: original_description,
            merged: merged_description,
        },
    ];
    if let (Some(original), Some(merged)) = (original_source, merged_source) {
        if original.value.eq_ignore_ascii_case(&merged.value) {
            comparisons.push(FieldComparison {
                field: "source title",
                original: Some(&original.title),
                merged: Some(&merged.title),
            });
        }
    }
    check_immutable_fields(resource, &comparisons)
}

// ==================== configuration-settings ====================

/// List configuration settings, or their options representation
pub async fn get_configuration_settings(
    State(state): State<AppState>,
    version: ApiVersion,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
) -> Result<Response> {
    let bypass_cache = bypass_cache(&headers);
    let resources = resources_filter(query.as_deref())?;

    if version.representation() == Some(CONFIGURATION_OPTIONS) {
        let version = version.resolve_with_representation(CONFIGURATION_OPTIONS, SUPPORTED_VERSIONS)?;
        let Some(resources) = resources else {
            return collection_response::<serde_json::Value>(&[], &version, &Default::default());
        };
        let options = state
            .configuration_settings_service
            .get_configuration_settings_options(resources)
            .await?;
        return collection_response(&options, &version, &Default::default());
    }

    let version = version.resolve(SUPPORTED_VERSIONS)?;
    let Some(resources) = resources else {
        return collection_response::<serde_json::Value>(&[], &version, &Default::default());
    };
    let settings = state
        .configuration_settings_service
        .get_configuration_settings(resources, bypass_cache)
        .await?;

    let ids = settings.iter().map(|s| s.id.clone()).collect();
    let context = load_context(&state, CONFIGURATION_SETTINGS_RESOURCE, ids, bypass_cache).await?;
    collection_response(&settings, &version, &context)
}

/// Get a configuration setting by GUID, or its options representation
pub async fn get_configuration_settings_by_guid(
    State(state): State<AppState>,
    Path(guid): Path<String>,
    version: ApiVersion,
    headers: HeaderMap,
) -> Result<Response> {
    let bypass_cache = bypass_cache(&headers);
    validate_get_guid(&guid)?;

    if version.representation() == Some(CONFIGURATION_OPTIONS) {
        let version = version.resolve_with_representation(CONFIGURATION_OPTIONS, SUPPORTED_VERSIONS)?;
        let options = state
            .configuration_settings_service
            .get_configuration_settings_options_by_guid(&guid)
            .await?;
        return resource_response(&options, &version, &Default::default());
    }

    let version = version.resolve(SUPPORTED_VERSIONS)?;
    let settings = state
        .configuration_settings_service
        .get_configuration_settings_by_guid(&guid, bypass_cache)
        .await?;
    let context =
        load_context(&state, CONFIGURATION_SETTINGS_RESOURCE, vec![guid], bypass_cache).await?;
    resource_response(&settings, &version, &context)
}

/// Update a configuration setting. Only the source may change; the options
/// representation is read-only.
pub async fn put_configuration_settings(
    State(state): State<AppState>,
    Path(guid): Path<String>,
    version: ApiVersion,
    Json(body): Json<serde_json::Value>,
) -> Result<Response> {
    if version.representation().is_some() {
        return Err(ApiError::NotSupported);
    }
    let version = version.resolve(SUPPORTED_VERSIONS)?;
    require_body(&body)?;
    let guid = validate_update_guid(&guid, body_id(&body))?;

    let original = state
        .configuration_settings_service
        .get_configuration_settings_by_guid(&guid, true)
        .await?;
    let data_privacy = state
        .extensions_service
        .data_privacy_list(CONFIGURATION_SETTINGS_RESOURCE, true)
        .await?;
    state
        .extensions_service
        .import_extended_data(CONFIGURATION_SETTINGS_RESOURCE, &guid, &body)
        .await?;

    let merged: ConfigurationSettings =
        perform_partial_payload_merge(body, &original, &data_privacy)?;
    check_settings_immutable(
        "configuration setting",
        &original.title,
        &merged.title,
        original.description.as_deref(),
        merged.description.as_deref(),
        &original.source,
        &merged.source,
    )?;

    let updated = state
        .configuration_settings_service
        .update_configuration_settings(merged)
        .await?;
    let context = load_context(&state, CONFIGURATION_SETTINGS_RESOURCE, vec![guid], true).await?;
    resource_response(&updated, &version, &context)
}

// ==================== default-settings ====================

/// List default settings, or their options representation
pub async fn get_default_settings(
    State(state): State<AppState>,
    version: ApiVersion,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
) -> Result<Response> {
    let bypass_cache = bypass_cache(&headers);
    let resources = resources_filter(query.as_deref())?;

    if version.representation() == Some(DEFAULT_OPTIONS) {
        let version = version.resolve_with_representation(DEFAULT_OPTIONS, SUPPORTED_VERSIONS)?;
        let Some(resources) = resources else {
            return collection_response::<serde_json::Value>(&[], &version, &Default::default());
        };
        let options = state
            .default_settings_service
            .get_default_settings_options(resources)
            .await?;
        return collection_response(&options, &version, &Default::default());
    }

    let version = version.resolve(SUPPORTED_VERSIONS)?;
    let Some(resources) = resources else {
        return collection_response::<serde_json::Value>(&[], &version, &Default::default());
    };
    let settings = state
        .default_settings_service
        .get_default_settings(resources, bypass_cache)
        .await?;

    let ids = settings.iter().map(|s| s.id.clone()).collect();
    let context = load_context(&state, DEFAULT_SETTINGS_RESOURCE, ids, bypass_cache).await?;
    collection_response(&settings, &version, &context)
}

/// Get a default setting by GUID, or its options representation
pub async fn get_default_settings_by_guid(
    State(state): State<AppState>,
    Path(guid): Path<String>,
    version: ApiVersion,
    headers: HeaderMap,
) -> Result<Response> {
    let bypass_cache = bypass_cache(&headers);
    validate_get_guid(&guid)?;

    if version.representation() == Some(DEFAULT_OPTIONS) {
        let version = version.resolve_with_representation(DEFAULT_OPTIONS, SUPPORTED_VERSIONS)?;
        let options = state
            .default_settings_service
            .get_default_settings_options_by_guid(&guid)
            .await?;
        return resource_response(&options, &version, &Default::default());
    }

    let version = version.resolve(SUPPORTED_VERSIONS)?;
    let settings = state
        .default_settings_service
        .get_default_settings_by_guid(&guid, bypass_cache)
        .await?;
    let context = load_context(&state, DEFAULT_SETTINGS_RESOURCE, vec![guid], bypass_cache).await?;
    resource_response(&settings, &version, &context)
}

/// Update a default setting
pub async fn put_default_settings(
    State(state): State<AppState>,
    Path(guid): Path<String>,
    version: ApiVersion,
    Json(body): Json<serde_json::Value>,
) -> Result<Response> {
    if version.representation().is_some() {
        return Err(ApiError::NotSupported);
    }
    let version = version.resolve(SUPPORTED_VERSIONS)?;
    require_body(&body)?;
    let guid = validate_update_guid(&guid, body_id(&body))?;

    let original = state
        .default_settings_service
        .get_default_settings_by_guid(&guid, true)
        .await?;
    let data_privacy = state
        .extensions_service
        .data_privacy_list(DEFAULT_SETTINGS_RESOURCE, true)
        .await?;
    state
        .extensions_service
        .import_extended_data(DEFAULT_SETTINGS_RESOURCE, &guid, &body)
        .await?;

    let merged: DefaultSettings = perform_partial_payload_merge(body, &original, &data_privacy)?;
    check_settings_immutable(
        "default setting",
        &original.title,
        &merged.title,
        original.description.as_deref(),
        merged.description.as_deref(),
        &original.source,
        &merged.source,
    )?;

    let updated = state
        .default_settings_service
        .update_default_settings(merged)
        .await?;
    let context = load_context(&state, DEFAULT_SETTINGS_RESOURCE, vec![guid], true).await?;
    resource_response(&updated, &version, &context)
}
