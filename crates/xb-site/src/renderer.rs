//! Page resolution and layout rendering.
//!
//! A [`PageRenderer`] serves one request: it resolves the requested
//! category/page to a content file, wraps it in the header/footer layouts
//! and answers the side queries (menu, active state, site config) that
//! layout templates make while rendering.

use std::path::PathBuf;
use std::sync::{Arc, OnceLock};

use minijinja::{Environment, ErrorKind, Value, context};

use crate::active::active_class;
use crate::context::{PageMeta, RenderContext};
use crate::error::SiteError;
use crate::loader::SafeFileLoader;
use crate::params::{CATEGORY_PARAM, PAGE_PARAM, RAW_PARAM, RequestParams, sanitize_param};
use crate::site_config::SiteConfig;
use crate::template::{self, TemplateScope};

/// Extension of every template file.
pub const TEMPLATE_EXTENSION: &str = "html";

/// Content file rendered when the requested page can't be.
pub const NOT_FOUND_PAGE: &str = "page-not-found.html";

/// Category and page used when the request names none.
const DEFAULT_SEGMENT: &str = "index";

const CONTENT_DIR: &str = "content";
const LAYOUT_DIR: &str = "layout";
const MENU_DIR: &str = "menu";

/// Where a renderer finds its files.
#[derive(Clone, Debug)]
pub struct PageRendererConfig {
    /// Base path all content, layout and menu reads are confined to.
    pub base_path: PathBuf,
    /// Directory with `config.toml` and the optional `local.toml`.
    pub config_dir: PathBuf,
}

/// Output of [`PageRenderer::render`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderedPage {
    /// Final markup.
    pub html: String,
    /// Metadata as left by the templates.
    pub meta: PageMeta,
}

/// Request-scoped page renderer.
///
/// Cloning is cheap and clones share the site config cache.
#[derive(Clone, Debug)]
pub struct PageRenderer {
    inner: Arc<RendererInner>,
}

#[derive(Clone, Debug)]
struct RendererInner {
    files: SafeFileLoader,
    config_dir: PathBuf,
    params: RequestParams,
    env: Environment<'static>,
    config: Arc<OnceLock<Arc<SiteConfig>>>,
}

impl PageRenderer {
    /// Create a renderer for one request.
    #[must_use]
    pub fn new(config: PageRendererConfig, params: RequestParams) -> Self {
        let files = SafeFileLoader::new(config.base_path);
        let env = template::environment(files.clone());

        Self {
            inner: Arc::new(RendererInner {
                files,
                config_dir: config.config_dir,
                params,
                env,
                config: Arc::new(OnceLock::new()),
            }),
        }
    }

    /// Request parameters as received.
    pub fn params(&self) -> &RequestParams {
        &self.inner.params
    }

    /// Set a request parameter after construction.
    pub fn set_param(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        Arc::make_mut(&mut self.inner).params.set(key, value);
        self
    }

    /// Sanitized value of a request parameter.
    pub fn param(&self, name: &str) -> String {
        self.inner.params.get(name)
    }

    /// Resolved category: non-empty override, else `c`, else `"index"`.
    pub fn category(&self, category: Option<&str>) -> String {
        self.resolve_segment(CATEGORY_PARAM, category)
    }

    /// Resolved page: non-empty override, else `p`, else `"index"`.
    pub fn page(&self, page: Option<&str>) -> String {
        self.resolve_segment(PAGE_PARAM, page)
    }

    fn resolve_segment(&self, key: &str, value: Option<&str>) -> String {
        let raw = value
            .filter(|v| !v.is_empty())
            .or_else(|| self.inner.params.raw(key));

        let segment = sanitize_param(raw);
        if segment.is_empty() {
            DEFAULT_SEGMENT.to_owned()
        } else {
            segment
        }
    }

    /// Render the full page: header, body layout, footer.
    ///
    /// The body layout is always rendered first, so metadata set by the
    /// page shows up in the header. With the `raw` parameter set only the
    /// page content is returned.
    ///
    /// # Errors
    ///
    /// Returns an error if a layout fails or the not-found page is missing.
    pub fn render(&self) -> Result<RenderedPage, SiteError> {
        let ctx = RenderContext::new();

        let body = self.load_layout(&ctx, "template")?;

        let html = if self.inner.params.flag(RAW_PARAM) {
            self.load_page(&ctx, None, None)?
        } else {
            let header = self.load_layout(&ctx, "header")?;
            let footer = self.load_layout(&ctx, "footer")?;

            let mut html = String::with_capacity(header.len() + body.len() + footer.len());
            html.push_str(&header);
            html.push_str(&body);
            html.push_str(&footer);
            html
        };

        Ok(RenderedPage {
            html,
            meta: ctx.meta(),
        })
    }

    /// Render a page's content, falling back to [`NOT_FOUND_PAGE`].
    ///
    /// `category` and `page` override the request parameters when given.
    ///
    /// # Errors
    ///
    /// Only fails if the fallback page itself can't be rendered.
    pub fn load_page(
        &self,
        ctx: &RenderContext,
        category: Option<&str>,
        page: Option<&str>,
    ) -> Result<String, SiteError> {
        let relative = format!(
            "{}/{}.{TEMPLATE_EXTENSION}",
            self.category(category),
            self.page(page)
        );

        match self.load_content(ctx, &relative) {
            Ok(content) => Ok(content),
            Err(err) => {
                if matches!(err, SiteError::NotFound(_)) {
                    tracing::debug!(page = %relative, "Page not found");
                } else {
                    tracing::warn!(page = %relative, error = %err, "Page failed to render");
                }
                self.load_content(ctx, NOT_FOUND_PAGE)
            }
        }
    }

    /// Render `content/<relative>`.
    ///
    /// # Errors
    ///
    /// See [`PageRenderer::load_file`].
    pub fn load_content(&self, ctx: &RenderContext, relative: &str) -> Result<String, SiteError> {
        self.load_file(ctx, &format!("{CONTENT_DIR}/{relative}"))
    }

    /// Render `layout/<name>.html`.
    ///
    /// # Errors
    ///
    /// See [`PageRenderer::load_file`].
    pub fn load_layout(&self, ctx: &RenderContext, name: &str) -> Result<String, SiteError> {
        self.load_file(ctx, &format!("{LAYOUT_DIR}/{name}.{TEMPLATE_EXTENSION}"))
    }

    /// Render the menu for `name`, defaulting to the current category.
    ///
    /// A missing menu, or a name that can't be a menu file, renders as
    /// an empty string.
    ///
    /// # Errors
    ///
    /// Returns an error if the menu file exists but fails to render.
    pub fn menu(&self, ctx: &RenderContext, name: Option<&str>) -> Result<String, SiteError> {
        let name = match name.filter(|n| !n.is_empty()) {
            Some(name) => name.to_owned(),
            None => self.param(CATEGORY_PARAM),
        };
        if name.is_empty() {
            return Ok(String::new());
        }

        match self.load_file(ctx, &format!("{MENU_DIR}/{name}.{TEMPLATE_EXTENSION}")) {
            Err(err) if err.is_absent() => {
                tracing::debug!(menu = %name, "No menu");
                Ok(String::new())
            }
            result => result,
        }
    }

    /// `"active"` if `category`/`page` name the current request, else `""`.
    pub fn active(&self, category: &str, page: &str) -> &'static str {
        active_class(
            self.inner.params.raw(CATEGORY_PARAM),
            self.inner.params.raw(PAGE_PARAM),
            category,
            page,
        )
    }

    /// Merged site configuration, loaded on first use and cached.
    ///
    /// # Errors
    ///
    /// Returns an error if `config.toml` is missing or either file is invalid.
    pub fn config(&self) -> Result<Arc<SiteConfig>, SiteError> {
        if let Some(config) = self.inner.config.get() {
            return Ok(Arc::clone(config));
        }

        let loaded = Arc::new(SiteConfig::load(&self.inner.config_dir)?);
        Ok(Arc::clone(self.inner.config.get_or_init(|| loaded)))
    }

    /// Render the template at `relative` below the base path.
    ///
    /// # Errors
    ///
    /// Returns `SiteError::InvalidPath` for paths escaping the base path,
    /// `SiteError::NotFound` for missing files and `SiteError::Template`
    /// when the template fails.
    pub fn load_file(&self, ctx: &RenderContext, relative: &str) -> Result<String, SiteError> {
        let path = self.inner.files.resolve(relative)?;
        let _guard = ctx.enter(relative)?;

        let template = self.inner.env.get_template(relative).map_err(|source| {
            if source.kind() == ErrorKind::TemplateNotFound {
                SiteError::NotFound(path)
            } else {
                SiteError::Template {
                    path: relative.to_owned(),
                    source,
                }
            }
        })?;

        let meta = ctx.meta();
        let scope = Value::from_object(TemplateScope::new(self.clone(), ctx.clone()));

        template
            .render(context! {
                title => meta.title,
                description => meta.description,
                keywords => meta.keywords,
                params => self.inner.params.sanitized(),
                xb => scope,
            })
            .map_err(|source| SiteError::Template {
                path: relative.to_owned(),
                source,
            })
    }
}
