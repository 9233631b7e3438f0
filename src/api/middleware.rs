//! Response caching middleware
//!
//! Applies a [`RoutePolicy`] to an axum route through
//! `axum::middleware::from_fn_with_state`:
//!
//! ```ignore
//! let users = CachedRoute::new(state.interceptor.clone(), RoutePolicy::new().with_tags(["users"]));
//! Router::new()
//!     .route("/users", get(list_users).post(create_user))
//!     .route_layer(from_fn_with_state(users, cache_response));
//! ```

use axum::{
    body::{to_bytes, Body, Bytes, HttpBody},
    extract::{OriginalUri, Request, State},
    http::{header, response::Parts, HeaderName, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;
use tracing::{debug, warn};

use crate::cache::MAX_VALUE_SIZE;
use crate::error::CacheError;
use crate::intercept::{CacheInterceptor, CacheStatus, RequestInfo, RequestKind, RoutePolicy};

/// Response header reporting whether the body came from the cache
pub const X_CACHE: HeaderName = HeaderName::from_static("x-cache");

/// Middleware state: the interceptor plus the policy of the wrapped route.
#[derive(Clone)]
pub struct CachedRoute {
    pub interceptor: CacheInterceptor,
    pub policy: RoutePolicy,
}

impl CachedRoute {
    pub fn new(interceptor: CacheInterceptor, policy: RoutePolicy) -> Self {
        Self {
            interceptor,
            policy,
        }
    }
}

/// Builds the cache identity of an incoming request.
///
/// Inside a nested router the request URI has the mount prefix stripped, so
/// the full [`OriginalUri`] is used when axum recorded one.
pub fn request_info(request: &Request) -> RequestInfo {
    let uri = request
        .extensions()
        .get::<OriginalUri>()
        .map(|OriginalUri(uri)| uri)
        .unwrap_or_else(|| request.uri());

    let query: Vec<(String, String)> = uri
        .query()
        .map(|q| url::form_urlencoded::parse(q.as_bytes()).into_owned().collect())
        .unwrap_or_default();

    RequestInfo::new(request.method().as_str(), uri.path(), query)
}

/// Middleware serving cached JSON bodies and caching fresh ones.
///
/// Only successful JSON responses of reads are buffered and cached, and only
/// when they fit in the local tier. Anything else, mutation responses
/// included, streams to the client untouched.
pub async fn cache_response(
    State(route): State<CachedRoute>,
    request: Request,
    next: Next,
) -> Response {
    let info = request_info(&request);
    let kind = info.kind();
    let mut produced: Option<(Parts, Bytes)> = None;
    let slot = &mut produced;

    let outcome = route
        .interceptor
        .intercept(&info, &route.policy, || async move {
            let response = next.run(request).await;
            if kind == RequestKind::Mutation || !is_json_success(&response) {
                return Err(response);
            }
            if !fits_local_tier(&response) {
                debug!("Response too large to cache, passing through");
                return Err(response);
            }

            let (parts, body) = response.into_parts();
            let bytes = match to_bytes(body, usize::MAX).await {
                Ok(bytes) => bytes,
                Err(e) => {
                    warn!(error = %e, "Failed to read response body");
                    return Err(CacheError::Internal(e.to_string()).into_response());
                }
            };

            match serde_json::from_slice::<Value>(&bytes) {
                Ok(value) => {
                    *slot = Some((parts, bytes));
                    Ok(value)
                }
                Err(_) => Err(Response::from_parts(parts, Body::from(bytes))),
            }
        })
        .await;

    let intercepted = match outcome {
        Ok(intercepted) => intercepted,
        Err(passthrough) => return passthrough,
    };

    let mut response = match (intercepted.status, produced) {
        (CacheStatus::Hit, _) | (_, None) => Json(intercepted.value).into_response(),
        (_, Some((parts, bytes))) => Response::from_parts(parts, Body::from(bytes)),
    };
    response
        .headers_mut()
        .insert(X_CACHE, HeaderValue::from_static(intercepted.status.as_str()));
    response
}

/// Whether the body is known to fit under [`MAX_VALUE_SIZE`], judged from
/// `Content-Length` or the body's own size hint without reading it.
fn fits_local_tier(response: &Response) -> bool {
    let declared = response
        .headers()
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(0);
    let hinted = response.body().size_hint().lower();

    declared.max(hinted) <= MAX_VALUE_SIZE as u64
}

fn is_json_success(response: &Response) -> bool {
    response.status().is_success()
        && response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|ct| ct.starts_with("application/json"))
            .unwrap_or(false)
}
