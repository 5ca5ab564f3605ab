//! Application state.
//!
//! Shared state for all request handlers.

use xb_site::PageRendererConfig;

/// Application state shared across all handlers.
pub(crate) struct AppState {
    /// Where each request's renderer finds the site.
    pub(crate) renderer_config: PageRendererConfig,
}
