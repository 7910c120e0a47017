//! Sites handlers

use crate::api::{
    bypass_cache, collection_response, load_context, resource_response, validate_get_guid,
    version::ApiVersion,
};
use crate::error::Result;
use crate::server::AppState;
use crate::service::SITES_RESOURCE;
use axum::{
    extract::{Path, State},
    http::HeaderMap,
    response::Response,
};

const SUPPORTED_VERSIONS: &[&str] = &["6"];

/// List sites
pub async fn get_sites(
    State(state): State<AppState>,
    version: ApiVersion,
    headers: HeaderMap,
) -> Result<Response> {
    let version = version.resolve(SUPPORTED_VERSIONS)?;
    let bypass_cache = bypass_cache(&headers);

    let sites = state.sites_service.get_sites(bypass_cache).await?;
    let ids = sites.iter().map(|s| s.id.clone()).collect();
    let context = load_context(&state, SITES_RESOURCE, ids, bypass_cache).await?;
    collection_response(&sites, &version, &context)
}

/// Get a site by GUID
pub async fn get_site_by_guid(
    State(state): State<AppState>,
    Path(guid): Path<String>,
    version: ApiVersion,
    headers: HeaderMap,
) -> Result<Response> {
    let version = version.resolve(SUPPORTED_VERSIONS)?;
    let bypass_cache = bypass_cache(&headers);
    validate_get_guid(&guid)?;

    let site = state.sites_service.get_site_by_guid(&guid).await?;
    let context = load_context(&state, SITES_RESOURCE, vec![guid], bypass_cache).await?;
    resource_response(&site, &version, &context)
}
