//! Page resolution and layout rendering for xb.
//!
//! This crate provides:
//! - [`PageRenderer`]: resolves a category/page request to a content file
//!   and wraps it in the site's header/footer layouts
//! - [`SafeFileLoader`]: confines every file read to the site's base path
//! - [`SiteConfig`]: `config.toml` merged with an optional `local.toml`
//!
//! Site files are minijinja templates; see the `template` module docs for
//! what they can access.
//!
//! # Quick Start
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use std::path::PathBuf;
//! use xb_site::{PageRenderer, PageRendererConfig, RequestParams};
//!
//! let config = PageRendererConfig {
//!     base_path: PathBuf::from("site/httpdocs"),
//!     config_dir: PathBuf::from("site/config"),
//! };
//! let mut params = RequestParams::new();
//! params.set("c", "blog").set("p", "hello");
//!
//! let page = PageRenderer::new(config, params).render()?;
//! println!("{}", page.html);
//! # Ok(())
//! # }
//! ```

mod active;
mod context;
mod error;
mod loader;
mod params;
mod renderer;
mod site_config;
mod template;

pub use active::{ACTIVE_CLASS, active_class};
pub use context::{PageMeta, RenderContext};
pub use error::SiteError;
pub use loader::SafeFileLoader;
pub use params::{CATEGORY_PARAM, PAGE_PARAM, RAW_PARAM, RequestParams, sanitize_param};
pub use renderer::{
    NOT_FOUND_PAGE, PageRenderer, PageRendererConfig, RenderedPage, TEMPLATE_EXTENSION,
};
pub use site_config::{BASE_CONFIG_FILE, LOCAL_CONFIG_FILE, SiteConfig};
