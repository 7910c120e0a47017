//! Vendor media-type version negotiation.
//!
//! Routes are versioned through the Accept header:
//! `application/vnd.registra.integration.v{version}+json`, optionally with a
//! named representation segment before the version, e.g.
//! `application/vnd.registra.integration.configuration-settings-options.v1.0.0+json`.
//! A plain `application/json` (or no Accept header at all) resolves to the
//! route's default version, which is the last entry of its supported set.

use crate::error::{ApiError, Result};
use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts};

const MEDIA_TYPE_PREFIX: &str = "application/vnd.registra.integration.";

/// The full media type for a negotiated version
pub fn media_type(version: &str) -> String {
    format!("{}v{}+json", MEDIA_TYPE_PREFIX, version)
}

/// Parsed vendor media-type selector from the Accept header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaSelector {
    pub representation: Option<String>,
    pub version: String,
}

/// Requested API version, extracted from the Accept header
#[derive(Debug, Clone, Default)]
pub struct ApiVersion {
    requested: Option<MediaSelector>,
}

impl ApiVersion {
    pub fn from_accept(accept: Option<&str>) -> Self {
        let requested = accept.and_then(parse_accept);
        Self { requested }
    }

    /// The named representation the caller asked for, if any
    pub fn representation(&self) -> Option<&str> {
        self.requested
            .as_ref()
            .and_then(|s| s.representation.as_deref())
    }

    /// Negotiate the version for a route's default representation.
    /// `supported` is ordered oldest-first; the last entry is the default.
    pub fn resolve(&self, supported: &[&str]) -> Result<String> {
        match &self.requested {
            None => Ok(supported
                .last()
                .expect("route must support at least one version")
                .to_string()),
            Some(selector) if selector.representation.is_some() => {
                Err(ApiError::NotAcceptable(format!(
                    "The media type representation '{}' is not supported for this resource.",
                    selector.representation.as_deref().unwrap_or_default()
                )))
            }
            Some(selector) => self.resolve_version(&selector.version, supported),
        }
    }

    /// Negotiate the version for a named representation the caller selected.
    /// Callers check `representation()` first.
    pub fn resolve_with_representation(
        &self,
        representation: &str,
        supported: &[&str],
    ) -> Result<String> {
        match &self.requested {
            Some(selector) if selector.representation.as_deref() == Some(representation) => {
                self.resolve_version(&selector.version, supported)
            }
            _ => Err(ApiError::NotAcceptable(format!(
                "The media type representation '{}' was not requested.",
                representation
            ))),
        }
    }

    fn resolve_version(&self, requested: &str, supported: &[&str]) -> Result<String> {
        supported
            .iter()
            .find(|&&s| s == requested)
            .map(|s| s.to_string())
            .ok_or_else(|| {
                ApiError::NotAcceptable(format!(
                    "The requested version '{}' is not supported.",
                    requested
                ))
            })
    }
}

/// Parse an Accept header into a vendor media-type selector. Generic and
/// unrecognized media types yield `None` (the route default applies).
fn parse_accept(accept: &str) -> Option<MediaSelector> {
    for entry in accept.split(',') {
        let media_type = entry.split(';').next().unwrap_or("").trim();
        let Some(rest) = media_type.strip_prefix(MEDIA_TYPE_PREFIX) else {
            continue;
        };
        let rest = rest.strip_suffix("+json").unwrap_or(rest);

        // Either "v{version}" or "{representation}.v{version}"
        if let Some(version) = rest.strip_prefix('v') {
            if !version.is_empty() {
                return Some(MediaSelector {
                    representation: None,
                    version: version.to_string(),
                });
            }
        } else if let Some(split_at) = rest.rfind(".v") {
            let (representation, version) = rest.split_at(split_at);
            let version = &version[2..];
            if !representation.is_empty() && !version.is_empty() {
                return Some(MediaSelector {
                    representation: Some(representation.to_string()),
                    version: version.to_string(),
                });
            }
        }
    }
    None
}

impl<S> FromRequestParts<S> for ApiVersion
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> std::result::Result<Self, Self::Rejection> {
        let accept = parts
            .headers
            .get(header::ACCEPT)
            .and_then(|v| v.to_str().ok());
        Ok(ApiVersion::from_accept(accept))
    }
}
