//! REST API layer: shared request/response utilities and one handler module
//! per resource.

pub mod addresses;
pub mod countries;
pub mod currencies;
pub mod filters;
pub mod health;
pub mod languages;
pub mod merge;
pub mod metrics;
pub mod organizations;
pub mod relationships;
pub mod rooms;
pub mod settings;
pub mod sites;
pub mod version;
pub mod visas;

use crate::domain::is_nil_guid;
use crate::error::{codes, ApiError, IntegrationApiError, Result};
use crate::repository::ExtendedDataRow;
use axum::http::{header, HeaderMap, HeaderValue};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

/// Default page size applied when a paged route is called without a limit
pub(crate) const DEFAULT_PAGE_LIMIT: i64 = 200;

/// True when the request asked downstream caches to be bypassed
pub fn bypass_cache(headers: &HeaderMap) -> bool {
    headers
        .get(header::CACHE_CONTROL)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_ascii_lowercase().contains("no-cache"))
        .unwrap_or(false)
}

/// Raw paging query parameters (`?offset=&limit=`)
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize)]
pub struct PagingQuery {
    pub offset: Option<i64>,
    pub limit: Option<i64>,
}

/// Resolved paging window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paging {
    pub offset: i64,
    pub limit: i64,
}

impl Paging {
    /// Apply defaults and the configured upper bound. Negative values are
    /// rejected rather than clamped.
    pub fn resolve(query: PagingQuery, default_limit: i64, max_limit: i64) -> Result<Paging> {
        let offset = query.offset.unwrap_or(0);
        if offset < 0 {
            return Err(ApiError::validation(
                "Invalid paging parameter",
                "The offset cannot be negative.",
            ));
        }
        let limit = match query.limit {
            None => default_limit.min(max_limit),
            Some(l) if l <= 0 => {
                return Err(ApiError::validation(
                    "Invalid paging parameter",
                    "The limit must be a positive integer.",
                ));
            }
            Some(l) => l.min(max_limit),
        };
        Ok(Paging { offset, limit })
    }
}

/// Normalize and cross-check the route GUID against the body id on a PUT.
/// Returns the lowercased GUID the update must apply to.
pub fn validate_update_guid(guid: &str, body_id: Option<&str>) -> Result<String> {
    if guid.trim().is_empty() {
        return Err(ApiError::validation(
            "Null id argument",
            "The GUID must be specified in the request URL.",
        ));
    }
    if is_nil_guid(guid) {
        return Err(ApiError::validation(
            "GUID empty",
            "Nil GUID cannot be used in PUT operation.",
        ));
    }
    match body_id {
        None => Ok(guid.to_lowercase()),
        Some(id) if id.is_empty() => Ok(guid.to_lowercase()),
        Some(id) if is_nil_guid(id) => Err(ApiError::validation(
            "GUID empty",
            "GUID must be specified.",
        )),
        Some(id) if !guid.eq_ignore_ascii_case(id) => Err(ApiError::validation(
            "GUID mismatch",
            "GUID not the same as in request body.",
        )),
        Some(_) => Ok(guid.to_lowercase()),
    }
}

/// Check the body id on a POST: it must be present and must be the nil GUID,
/// the server assigns the real one.
pub fn validate_create_guid(body_id: Option<&str>) -> Result<()> {
    match body_id {
        None => Err(ApiError::validation(
            "Null id argument",
            "The id must be specified in the request body.",
        )),
        Some(id) if id.trim().is_empty() => Err(ApiError::validation(
            "Null id argument",
            "The id must be specified in the request body.",
        )),
        Some(id) if !is_nil_guid(id) => Err(ApiError::validation(
            "GUID not empty",
            "The nil GUID must be used in POST operation.",
        )),
        Some(_) => Ok(()),
    }
}

/// The `id` property of a raw JSON body, if present
pub fn body_id(body: &serde_json::Value) -> Option<&str> {
    body.get("id").and_then(|v| v.as_str())
}

/// Reject the request body when it is JSON `null`
pub fn require_body(body: &serde_json::Value) -> Result<()> {
    if body.is_null() {
        return Err(ApiError::validation(
            "Null argument",
            "The request body is required.",
        ));
    }
    Ok(())
}

/// One merged-vs-original field comparison for immutability checking
pub struct FieldComparison<'a> {
    pub field: &'a str,
    pub original: Option<&'a str>,
    pub merged: Option<&'a str>,
}

/// Verify that declared immutable fields survived the partial merge intact.
/// All violations are reported together in one validation error.
pub fn check_immutable_fields(resource: &str, comparisons: &[FieldComparison]) -> Result<()> {
    let mut errors = Vec::new();
    for comparison in comparisons {
        match (comparison.original, comparison.merged) {
            (Some(original), Some(merged))
                if !original.is_empty() && !original.eq_ignore_ascii_case(merged) =>
            {
                errors.push(IntegrationApiError::new(
                    codes::VALIDATION,
                    "An error occurred attempting to validate data.",
                    format!(
                        "The {} cannot be changed for a {}.",
                        comparison.field, resource
                    ),
                ));
            }
            (Some(original), None) if !original.is_empty() => {
                errors.push(IntegrationApiError::new(
                    codes::VALIDATION,
                    "An error occurred attempting to validate data.",
                    format!(
                        "The {} cannot be removed for a {}.",
                        comparison.field, resource
                    ),
                ));
            }
            _ => {}
        }
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ApiError::Validation(errors))
    }
}

/// Integration-platform context attached to successful responses
#[derive(Debug, Default)]
pub struct ResourceContext {
    pub data_privacy: Vec<String>,
    pub extended: Vec<ExtendedDataRow>,
}

impl ResourceContext {
    fn apply_extended(&self, value: &mut serde_json::Value) {
        match value {
            serde_json::Value::Array(items) => {
                for item in items {
                    self.apply_extended(item);
                }
            }
            serde_json::Value::Object(map) => {
                let id = map.get("id").and_then(|v| v.as_str()).map(str::to_string);
                if let Some(id) = id {
                    if let Some(row) = self.extended.iter().find(|r| r.record_guid == id) {
                        map.insert("extensions".to_string(), row.properties.clone());
                    }
                }
            }
            _ => {}
        }
    }
}

fn context_headers(response: &mut Response, version: &str, context: &ResourceContext) {
    if let Ok(value) = HeaderValue::from_str(&version::media_type(version)) {
        response.headers_mut().insert("x-media-type", value);
    }
    if !context.data_privacy.is_empty() {
        response
            .headers_mut()
            .insert("x-content-restricted", HeaderValue::from_static("partial"));
    }
}

/// Build a single-resource response decorated with extended data and the
/// negotiated media type.
pub fn resource_response<T: Serialize>(
    payload: &T,
    version: &str,
    context: &ResourceContext,
) -> Result<Response> {
    let mut value = serde_json::to_value(payload).map_err(|e| ApiError::Internal(e.into()))?;
    context.apply_extended(&mut value);

    let mut response = Json(value).into_response();
    context_headers(&mut response, version, context);
    Ok(response)
}

/// Build a paged collection response: a JSON array body with total-count,
/// page-size, and optional self-link headers.
pub fn paged_response<T: Serialize>(
    items: &[T],
    total: i64,
    paging: Paging,
    version: &str,
    context: &ResourceContext,
    self_link: Option<String>,
) -> Result<Response> {
    let mut value = serde_json::to_value(items).map_err(|e| ApiError::Internal(e.into()))?;
    context.apply_extended(&mut value);

    let mut response = Json(value).into_response();
    context_headers(&mut response, version, context);
    response
        .headers_mut()
        .insert("x-total-count", HeaderValue::from(total));
    response
        .headers_mut()
        .insert("x-max-page-size", HeaderValue::from(paging.limit));
    if let Some(link) = self_link {
        let link = format!(
            "<{}?offset={}&limit={}>; rel=\"self\"",
            link, paging.offset, paging.limit
        );
        if let Ok(value) = HeaderValue::from_str(&link) {
            response.headers_mut().insert(header::LINK, value);
        }
    }
    Ok(response)
}

/// The fixed response for list routes short-circuited by an empty filter
pub fn empty_paged_response(paging: Paging, version: &str) -> Result<Response> {
    paged_response::<serde_json::Value>(&[], 0, paging, version, &ResourceContext::default(), None)
}

/// Response for collection routes that are not paged
pub fn collection_response<T: Serialize>(
    items: &[T],
    version: &str,
    context: &ResourceContext,
) -> Result<Response> {
    let mut value = serde_json::to_value(items).map_err(|e| ApiError::Internal(e.into()))?;
    context.apply_extended(&mut value);

    let mut response = Json(value).into_response();
    context_headers(&mut response, version, context);
    Ok(response)
}

/// Shared handler for every operation a resource does not support
pub async fn not_supported() -> ApiError {
    ApiError::NotSupported
}

/// Reject whitespace-only ids that still matched the route
pub fn validate_get_guid(guid: &str) -> Result<()> {
    if guid.trim().is_empty() {
        return Err(ApiError::validation(
            "Null id argument",
            "The GUID must be specified in the request URL.",
        ));
    }
    Ok(())
}

/// Load the data-privacy list and extended data for a set of records
pub(crate) async fn load_context(
    state: &crate::server::AppState,
    resource: &str,
    record_guids: Vec<String>,
    bypass_cache: bool,
) -> Result<ResourceContext> {
    let data_privacy = state
        .extensions_service
        .data_privacy_list(resource, bypass_cache)
        .await?;
    let extended = state
        .extensions_service
        .extended_data(resource, record_guids)
        .await?;
    Ok(ResourceContext {
        data_privacy,
        extended,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NIL_GUID;
    use axum::http::StatusCode;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_bypass_cache_no_cache() {
        let mut headers = HeaderMap::new();
        headers.insert(header::CACHE_CONTROL, "no-cache".parse().unwrap());
        assert!(bypass_cache(&headers));
    }

    #[test]
    fn test_bypass_cache_case_insensitive() {
        let mut headers = HeaderMap::new();
        headers.insert(header::CACHE_CONTROL, "No-Cache, max-age=0".parse().unwrap());
        assert!(bypass_cache(&headers));
    }

    #[test]
    fn test_bypass_cache_absent() {
        assert!(!bypass_cache(&HeaderMap::new()));

        let mut headers = HeaderMap::new();
        headers.insert(header::CACHE_CONTROL, "max-age=300".parse().unwrap());
        assert!(!bypass_cache(&headers));
    }

    #[test]
    fn test_paging_defaults() {
        let paging = Paging::resolve(PagingQuery::default(), 200, 200).unwrap();
        assert_eq!(paging, Paging { offset: 0, limit: 200 });
    }

    #[test]
    fn test_paging_limit_clamped() {
        let query = PagingQuery {
            offset: Some(10),
            limit: Some(5000),
        };
        let paging = Paging::resolve(query, 200, 200).unwrap();
        assert_eq!(paging, Paging { offset: 10, limit: 200 });
    }

    #[test]
    fn test_paging_negative_offset_rejected() {
        let query = PagingQuery {
            offset: Some(-1),
            limit: None,
        };
        assert!(matches!(
            Paging::resolve(query, 200, 200),
            Err(ApiError::Validation(_))
        ));
    }

    #[test]
    fn test_paging_zero_limit_rejected() {
        let query = PagingQuery {
            offset: None,
            limit: Some(0),
        };
        assert!(matches!(
            Paging::resolve(query, 200, 200),
            Err(ApiError::Validation(_))
        ));
    }

    #[test]
    fn test_validate_update_guid_defaults_from_route() {
        let guid = validate_update_guid("ABC-123", None).unwrap();
        assert_eq!(guid, "abc-123");

        let guid = validate_update_guid("ABC-123", Some("")).unwrap();
        assert_eq!(guid, "abc-123");
    }

    #[test]
    fn test_validate_update_guid_case_insensitive_match() {
        let guid = validate_update_guid("ABC-123", Some("abc-123")).unwrap();
        assert_eq!(guid, "abc-123");
    }

    #[test]
    fn test_validate_update_guid_mismatch() {
        let result = validate_update_guid("abc-123", Some("def-456"));
        let Err(ApiError::Validation(errors)) = result else {
            panic!("expected validation error");
        };
        assert_eq!(errors[0].description, "GUID mismatch");
        assert_eq!(errors[0].message, "GUID not the same as in request body.");
    }

    #[test]
    fn test_validate_update_guid_empty_route() {
        let result = validate_update_guid("", Some("abc"));
        let Err(ApiError::Validation(errors)) = result else {
            panic!("expected validation error");
        };
        assert_eq!(
            errors[0].message,
            "The GUID must be specified in the request URL."
        );
    }

    #[test]
    fn test_validate_update_guid_nil_route() {
        let result = validate_update_guid(NIL_GUID, Some(NIL_GUID));
        let Err(ApiError::Validation(errors)) = result else {
            panic!("expected validation error");
        };
        assert_eq!(errors[0].message, "Nil GUID cannot be used in PUT operation.");
    }

    #[test]
    fn test_validate_update_guid_nil_body() {
        let result = validate_update_guid("abc-123", Some(NIL_GUID));
        assert!(matches!(result, Err(ApiError::Validation(_))));
    }

    #[test]
    fn test_validate_create_guid() {
        assert!(validate_create_guid(Some(NIL_GUID)).is_ok());
        assert!(validate_create_guid(None).is_err());
        assert!(validate_create_guid(Some("")).is_err());
        assert!(validate_create_guid(Some("abc-123")).is_err());
    }

    #[test]
    fn test_body_id() {
        let body = json!({"id": "abc", "title": "t"});
        assert_eq!(body_id(&body), Some("abc"));
        assert_eq!(body_id(&json!({"title": "t"})), None);
    }

    #[test]
    fn test_check_immutable_fields_accumulates() {
        let result = check_immutable_fields(
            "configuration setting",
            &[
                FieldComparison {
                    field: "title",
                    original: Some("Check Faculty Load"),
                    merged: Some("Changed"),
                },
                FieldComparison {
                    field: "description",
                    original: Some("Old"),
                    merged: Some("New"),
                },
            ],
        );
        let Err(ApiError::Validation(errors)) = result else {
            panic!("expected validation error");
        };
        assert_eq!(errors.len(), 2);
        assert_eq!(
            errors[0].message,
            "The title cannot be changed for a configuration setting."
        );
    }

    #[test]
    fn test_check_immutable_fields_removed() {
        let result = check_immutable_fields(
            "language",
            &[FieldComparison {
                field: "code",
                original: Some("eng"),
                merged: None,
            }],
        );
        let Err(ApiError::Validation(errors)) = result else {
            panic!("expected validation error");
        };
        assert_eq!(errors[0].message, "The code cannot be removed for a language.");
    }

    #[test]
    fn test_check_immutable_fields_unchanged_ok() {
        let result = check_immutable_fields(
            "language",
            &[
                FieldComparison {
                    field: "title",
                    original: Some("English"),
                    merged: Some("ENGLISH"),
                },
                FieldComparison {
                    field: "code",
                    original: None,
                    merged: Some("eng"),
                },
            ],
        );
        assert!(result.is_ok());
    }

    #[test]
    fn test_resource_context_applies_extended_data() {
        let context = ResourceContext {
            data_privacy: vec![],
            extended: vec![ExtendedDataRow {
                record_guid: "a-1".to_string(),
                properties: json!({"district": "North"}),
            }],
        };
        let mut value = json!([{"id": "a-1"}, {"id": "a-2"}]);
        context.apply_extended(&mut value);
        assert_eq!(value[0]["extensions"]["district"], "North");
        assert!(value[1].get("extensions").is_none());
    }

    #[tokio::test]
    async fn test_paged_response_headers() {
        let paging = Paging { offset: 0, limit: 200 };
        let response = paged_response(
            &[json!({"id": "a-1"})],
            37,
            paging,
            "6",
            &ResourceContext::default(),
            Some("/addresses".to_string()),
        )
        .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["x-total-count"], "37");
        assert_eq!(response.headers()["x-max-page-size"], "200");
        assert_eq!(
            response.headers()["link"],
            "</addresses?offset=0&limit=200>; rel=\"self\""
        );
        assert_eq!(
            response.headers()["x-media-type"],
            "application/vnd.registra.integration.v6+json"
        );
    }

    #[tokio::test]
    async fn test_restricted_marker_header() {
        let context = ResourceContext {
            data_privacy: vec!["latitude".to_string()],
            extended: vec![],
        };
        let response = resource_response(&json!({"id": "a-1"}), "6", &context).unwrap();
        assert_eq!(response.headers()["x-content-restricted"], "partial");
    }

    #[tokio::test]
    async fn test_empty_paged_response() {
        let paging = Paging { offset: 0, limit: 200 };
        let response = empty_paged_response(paging, "11.1.0").unwrap();
        assert_eq!(response.headers()["x-total-count"], "0");

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, json!([]));
    }
}
