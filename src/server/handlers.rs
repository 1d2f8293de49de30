//! Request handlers

use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::{info, warn};

use crate::app::paginator::{PageQuery, PageRequest};
use crate::constants::server;
use crate::errors::ServiceError;

use super::AppState;

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::NOT_FOUND);
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

/// GET /properties
///
/// Channel comes from the `source` header, the page from `offset`/`limit`.
pub async fn get_properties(
    State(state): State<AppState>,
    uri: Uri,
    headers: HeaderMap,
    query: Option<Query<PageQuery>>,
) -> Response {
    // A non-UTF-8 header value can never name a channel
    let source = headers
        .get(server::SOURCE_HEADER)
        .map(|value| value.to_str().unwrap_or_default());
    // A malformed query string falls back to the default page
    let request = query
        .map(|Query(query)| PageRequest::from(query))
        .unwrap_or_default();
    info!(%uri, ?source, "Listings requested");

    match state.service.get_page(source, request).await {
        Ok(page) => (StatusCode::OK, Json(page)).into_response(),
        Err(e) => {
            warn!(category = e.category(), error = %e, "Request failed");
            e.into_response()
        }
    }
}
