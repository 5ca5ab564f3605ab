//! Page endpoints.
//!
//! Builds the request parameters from the query string (and the pretty
//! path, when used) and renders the page on a blocking thread.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Path, Query, Request, State};
use axum::response::{Html, IntoResponse, Response};
use xb_site::{CATEGORY_PARAM, PAGE_PARAM, PageRenderer, RequestParams};

use crate::error::ServerError;
use crate::state::AppState;
use crate::static_files;

/// Handle GET / (category and page from the query string).
pub(crate) async fn get_index(
    State(state): State<Arc<AppState>>,
    Query(query): Query<HashMap<String, String>>,
) -> Result<Html<String>, ServerError> {
    render_page(&state, request_params(query, None, None)).await
}

/// Handle GET /{category}.
pub(crate) async fn get_category(
    State(state): State<Arc<AppState>>,
    Path(category): Path<String>,
    Query(query): Query<HashMap<String, String>>,
    req: Request,
) -> Result<Response, ServerError> {
    if static_files::is_asset_segment(&category) {
        return Ok(static_files::serve(state, req).await);
    }

    let params = request_params(query, Some(category), None);
    Ok(render_page(&state, params).await?.into_response())
}

/// Handle GET /{category}/{page}.
pub(crate) async fn get_page(
    State(state): State<Arc<AppState>>,
    Path((category, page)): Path<(String, String)>,
    Query(query): Query<HashMap<String, String>>,
    req: Request,
) -> Result<Response, ServerError> {
    if static_files::is_asset_segment(&page) {
        return Ok(static_files::serve(state, req).await);
    }

    let params = request_params(query, Some(category), Some(page));
    Ok(render_page(&state, params).await?.into_response())
}

/// Merge query parameters with category/page taken from the path.
///
/// Path segments win over `c`/`p` in the query string.
fn request_params(
    query: HashMap<String, String>,
    category: Option<String>,
    page: Option<String>,
) -> RequestParams {
    let mut params: RequestParams = query.into_iter().collect();
    if let Some(category) = category {
        params.set(CATEGORY_PARAM, category);
    }
    if let Some(page) = page {
        params.set(PAGE_PARAM, page);
    }
    params
}

/// Render with a fresh renderer for this request.
async fn render_page(state: &AppState, params: RequestParams) -> Result<Html<String>, ServerError> {
    let config = state.renderer_config.clone();
    let page = tokio::task::spawn_blocking(move || PageRenderer::new(config, params).render())
        .await??;

    tracing::debug!(bytes = page.html.len(), title = ?page.meta.title, "Rendered page");
    Ok(Html(page.html))
}
