//! Per-render state shared by every template executed during one render.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;

use crate::error::SiteError;

/// How deep templates may load other templates before rendering is aborted.
const MAX_DEPTH: usize = 16;

/// Page metadata that templates set and later templates read.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct PageMeta {
    /// Page title.
    pub title: Option<String>,
    /// Page description.
    pub description: Option<String>,
    /// Page keywords.
    pub keywords: Option<String>,
}

#[derive(Debug, Default)]
struct ContextState {
    meta: PageMeta,
    depth: usize,
}

/// Output-accumulating context passed into template execution.
///
/// The body layout is rendered before the header, so anything the body
/// (or the page it loads) sets here is visible to the header. Clones share
/// the same state.
#[derive(Clone, Debug, Default)]
pub struct RenderContext {
    state: Arc<Mutex<ContextState>>,
}

impl RenderContext {
    /// Create an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the metadata set so far.
    pub fn meta(&self) -> PageMeta {
        self.lock().meta.clone()
    }

    /// Set the page title.
    pub fn set_title(&self, title: impl Into<String>) {
        self.lock().meta.title = Some(title.into());
    }

    /// Set the page description.
    pub fn set_description(&self, description: impl Into<String>) {
        self.lock().meta.description = Some(description.into());
    }

    /// Set the page keywords.
    pub fn set_keywords(&self, keywords: impl Into<String>) {
        self.lock().meta.keywords = Some(keywords.into());
    }

    /// Record that `path` is being loaded; the guard undoes it on drop.
    pub(crate) fn enter(&self, path: &str) -> Result<DepthGuard, SiteError> {
        let mut state = self.lock();
        if state.depth >= MAX_DEPTH {
            return Err(SiteError::TooDeep(path.to_owned()));
        }
        state.depth += 1;
        Ok(DepthGuard {
            context: self.clone(),
        })
    }

    fn lock(&self) -> MutexGuard<'_, ContextState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Decrements the nesting depth when a template load finishes.
pub(crate) struct DepthGuard {
    context: RenderContext,
}

impl Drop for DepthGuard {
    fn drop(&mut self) {
        let mut state = self.context.lock();
        state.depth = state.depth.saturating_sub(1);
    }
}
