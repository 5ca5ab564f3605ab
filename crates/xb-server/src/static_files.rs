//! Static file serving.
//!
//! Serves assets (CSS, JS, images) from the site's public directory. The
//! template directories live in the same tree and are never served.

use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use percent_encoding::percent_decode_str;
use tower::ServiceExt;
use tower_http::services::ServeDir;

use crate::state::AppState;

/// Public-dir subdirectories holding templates rather than assets.
const TEMPLATE_DIRS: [&str; 3] = ["content", "layout", "menu"];

/// Whether a path segment names a file (has an extension) rather than a page.
pub(crate) fn is_asset_segment(segment: &str) -> bool {
    segment.contains('.')
}

/// Whether a request path points into a template directory.
///
/// Checks the first real segment after percent-decoding; `.` and empty
/// segments are skipped the same way `ServeDir` skips them.
fn is_template_path(path: &str) -> bool {
    let decoded = percent_decode_str(path).decode_utf8_lossy();
    let first = decoded
        .split(['/', '\\'])
        .find(|segment| !segment.is_empty() && *segment != ".")
        .unwrap_or_default()
        .to_ascii_lowercase();

    TEMPLATE_DIRS.contains(&first.as_str())
}

/// Serve a static asset from the public directory.
pub(crate) async fn serve_asset(State(state): State<Arc<AppState>>, req: Request) -> Response {
    if is_template_path(req.uri().path()) {
        tracing::warn!(path = %req.uri().path(), "Refused to serve template file");
        return StatusCode::NOT_FOUND.into_response();
    }

    let service = ServeDir::new(&state.renderer_config.base_path);
    match service.oneshot(req).await {
        Ok(response) => response.map(Body::new),
        Err(never) => match never {},
    }
}

/// Same as [`serve_asset`], for handlers that already hold the state.
pub(crate) async fn serve(state: Arc<AppState>, req: Request) -> Response {
    serve_asset(State(state), req).await
}
