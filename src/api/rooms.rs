//! Rooms handlers

use crate::api::filters::{parse_filter, Filter};
use crate::api::{
    bypass_cache, empty_paged_response, load_context, paged_response, resource_response,
    validate_get_guid, version::ApiVersion, Paging, PagingQuery, DEFAULT_PAGE_LIMIT,
};
use crate::domain::{Room, RoomFilter};
use crate::error::Result;
use crate::server::AppState;
use crate::service::ROOMS_RESOURCE;
use axum::{
    extract::{Path, Query, RawQuery, State},
    http::HeaderMap,
    response::Response,
};

const SUPPORTED_VERSIONS: &[&str] = &["6", "10"];
const CRITERIA: &str = "criteria";

fn apply_version(room: Room, version: &str) -> Room {
    if version == "6" {
        room.into_v6()
    } else {
        room
    }
}

/// List rooms with paging and an optional building/room-type filter
pub async fn get_rooms(
    State(state): State<AppState>,
    version: ApiVersion,
    headers: HeaderMap,
    Query(paging): Query<PagingQuery>,
    RawQuery(query): RawQuery,
) -> Result<Response> {
    let version = version.resolve(SUPPORTED_VERSIONS)?;
    let bypass_cache = bypass_cache(&headers);
    let paging = Paging::resolve(paging, DEFAULT_PAGE_LIMIT, state.config.api.max_page_size)?;

    let filter: Filter<RoomFilter> = parse_filter(query.as_deref(), CRITERIA)?;
    if filter.is_empty_filter() {
        return empty_paged_response(paging, &version);
    }
    let filter = filter.into_option().unwrap_or_default();

    let (rooms, total) = state
        .rooms_service
        .get_rooms(paging.offset, paging.limit, filter)
        .await?;
    let rooms: Vec<Room> = rooms
        .into_iter()
        .map(|r| apply_version(r, &version))
        .collect();

    let ids = rooms.iter().map(|r| r.id.clone()).collect();
    let context = load_context(&state, ROOMS_RESOURCE, ids, bypass_cache).await?;
    let self_link = state
        .config
        .api
        .include_link_self_headers
        .then(|| "/rooms".to_string());
    paged_response(&rooms, total, paging, &version, &context, self_link)
}

/// Get a room by GUID
pub async fn get_room_by_guid(
    State(state): State<AppState>,
    Path(guid): Path<String>,
    version: ApiVersion,
    headers: HeaderMap,
) -> Result<Response> {
    let version = version.resolve(SUPPORTED_VERSIONS)?;
    let bypass_cache = bypass_cache(&headers);
    validate_get_guid(&guid)?;

    let room = state
        .rooms_service
        .get_room_by_guid(&guid, bypass_cache)
        .await?;
    let room = apply_version(room, &version);

    let context = load_context(&state, ROOMS_RESOURCE, vec![guid], bypass_cache).await?;
    resource_response(&room, &version, &context)
}
