//! Request observability middleware.
//!
//! A Tower layer that tags each request with an id (propagated from
//! `x-request-id` or freshly minted), wraps it in a tracing span, and records
//! RED metrics. Record GUIDs in paths are collapsed to `{guid}` so metric
//! labels stay low-cardinality.

use axum::{body::Body, http::Request, response::Response};
use metrics::{counter, histogram};
use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
    time::Instant,
};
use tower::{Layer, Service};
use tracing::Instrument;
use uuid::Uuid;

#[derive(Clone)]
pub struct ObservabilityLayer;

impl<S> Layer<S> for ObservabilityLayer {
    type Service = Observed<S>;

    fn layer(&self, inner: S) -> Self::Service {
        Observed { inner }
    }
}

#[derive(Clone)]
pub struct Observed<S> {
    inner: S,
}

impl<S> Service<Request<Body>> for Observed<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request<Body>) -> Self::Future {
        let method = request.method().to_string();
        let route = collapse_guids(request.uri().path());
        let request_id = request_id_of(&request);
        let span = tracing::info_span!("request", request_id = %request_id);

        let mut inner = self.inner.clone();
        Box::pin(
            async move {
                let started = Instant::now();
                let mut response = inner.call(request).await?;

                let status = response.status().as_u16().to_string();
                counter!(
                    "registra_http_requests_total",
                    "method" => method.clone(), "route" => route.clone(), "status" => status
                )
                .increment(1);
                histogram!(
                    "registra_http_request_duration_seconds",
                    "method" => method, "route" => route
                )
                .record(started.elapsed().as_secs_f64());

                if let Ok(value) = request_id.parse() {
                    response.headers_mut().insert("x-request-id", value);
                }
                Ok(response)
            }
            .instrument(span),
        )
    }
}

fn request_id_of(request: &Request<Body>) -> String {
    request
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

fn collapse_guids(path: &str) -> String {
    path.split('/')
        .map(|segment| if is_guid_like(segment) { "{guid}" } else { segment })
        .collect::<Vec<_>>()
        .join("/")
}

fn is_guid_like(segment: &str) -> bool {
    segment.len() == 36
        && segment
            .chars()
            .all(|c| c.is_ascii_hexdigit() || c == '-')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapse_guids() {
        assert_eq!(
            collapse_guids("/addresses/550e8400-e29b-41d4-a716-446655440000"),
            "/addresses/{guid}"
        );
        assert_eq!(collapse_guids("/qapi/addresses"), "/qapi/addresses");
        assert_eq!(collapse_guids("/configuration-settings"), "/configuration-settings");
    }

    #[test]
    fn test_is_guid_like() {
        assert!(is_guid_like("550e8400-e29b-41d4-a716-446655440000"));
        assert!(!is_guid_like("person-visas"));
        assert!(!is_guid_like(""));
    }
}
