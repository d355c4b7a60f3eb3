//! Request ID middleware for request tracing

use axum::{
    extract::Request,
    http::HeaderName,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};

use crate::error::ErrorResponse;

/// Header name for request ID
pub const X_REQUEST_ID: &str = "x-request-id";

/// Creates a layered middleware that:
/// 1. Sets a request ID if not present (using UUID v4)
/// 2. Propagates the request ID to the response
pub fn request_id_layer() -> (SetRequestIdLayer<MakeRequestUuid>, PropagateRequestIdLayer) {
    let header_name = HeaderName::from_static(X_REQUEST_ID);

    (
        SetRequestIdLayer::new(header_name.clone(), MakeRequestUuid),
        PropagateRequestIdLayer::new(header_name),
    )
}

/// Extension trait for extracting request ID from headers
pub trait RequestIdExt {
    fn request_id(&self) -> Option<&str>;
}

impl RequestIdExt for axum::http::HeaderMap {
    fn request_id(&self) -> Option<&str> {
        self.get(X_REQUEST_ID)?.to_str().ok()
    }
}

/// Copies the request ID into `ApiError` bodies.
///
/// Must run inside `SetRequestIdLayer` so every request carries an ID.
pub async fn attach_request_id(req: Request, next: Next) -> Response {
    let request_id = req.headers().request_id().map(str::to_string);
    let mut response = next.run(req).await;

    let Some(request_id) = request_id else {
        return response;
    };
    match response.extensions_mut().remove::<ErrorResponse>() {
        Some(mut body) => {
            body.request_id = Some(request_id);
            (response.status(), Json(body)).into_response()
        }
        None => response,
    }
}
