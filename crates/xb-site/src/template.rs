//! Template execution.
//!
//! Site files are minijinja templates. Each one renders with:
//!
//! - `title`, `description`, `keywords`: metadata set so far in this render
//! - `params`: sanitized request parameters
//! - `xb`: a handle back into the renderer
//!
//! The `xb` handle exposes:
//!
//! | Method | Returns |
//! |--------|---------|
//! | `load_page(c?, p?)` | page content, with not-found fallback |
//! | `load_content(path)` | `content/<path>` |
//! | `load_layout(name)` | `layout/<name>.html` |
//! | `menu(name?)` | `menu/<name>.html`, empty if absent |
//! | `active(c?, p?)` | `"active"` or `""` |
//! | `config()` | merged site configuration |
//! | `category(c?)`, `page(p?)` | resolved category / page |
//! | `param(name)` | sanitized request parameter |
//! | `set_title(v)`, `set_description(v)`, `set_keywords(v)` | `""` |

use std::sync::Arc;

use minijinja::value::{Object, from_args};
use minijinja::{Environment, Error, ErrorKind, State, Value};

use crate::context::RenderContext;
use crate::error::SiteError;
use crate::loader::SafeFileLoader;
use crate::renderer::PageRenderer;

/// Build the template environment for a site.
///
/// Templates are looked up through `files`, so names passed to
/// `get_template` go through the same path checks as every other read.
pub(crate) fn environment(files: SafeFileLoader) -> Environment<'static> {
    let mut env = Environment::new();
    env.set_keep_trailing_newline(true);
    env.set_loader(move |name| match files.read(name) {
        Ok(source) => Ok(Some(source)),
        Err(SiteError::NotFound(_)) => Ok(None),
        Err(err) => Err(to_template_error(err)),
    });
    env
}

/// Wrap a site error so it can travel through template execution.
fn to_template_error(err: SiteError) -> Error {
    Error::new(ErrorKind::InvalidOperation, err.to_string()).with_source(err)
}

/// The `xb` handle templates call back into.
#[derive(Debug)]
pub(crate) struct TemplateScope {
    renderer: PageRenderer,
    ctx: RenderContext,
}

impl TemplateScope {
    pub(crate) fn new(renderer: PageRenderer, ctx: RenderContext) -> Self {
        Self { renderer, ctx }
    }

    /// Rendered markup: already escaped by whichever template produced it.
    fn markup(result: Result<String, SiteError>) -> Result<Value, Error> {
        result.map(Value::from_safe_string).map_err(to_template_error)
    }
}

impl Object for TemplateScope {
    fn call_method(
        self: &Arc<Self>,
        _state: &State<'_, '_>,
        method: &str,
        args: &[Value],
    ) -> Result<Value, Error> {
        let renderer = &self.renderer;
        let ctx = &self.ctx;

        match method {
            "load_page" => {
                let (category, page): (Option<&str>, Option<&str>) = from_args(args)?;
                Self::markup(renderer.load_page(ctx, category, page))
            }
            "load_content" => {
                let (path,): (&str,) = from_args(args)?;
                Self::markup(renderer.load_content(ctx, path))
            }
            "load_layout" => {
                let (name,): (&str,) = from_args(args)?;
                Self::markup(renderer.load_layout(ctx, name))
            }
            "menu" => {
                let (name,): (Option<&str>,) = from_args(args)?;
                Self::markup(renderer.menu(ctx, name))
            }
            "active" => {
                let (category, page): (Option<&str>, Option<&str>) = from_args(args)?;
                Ok(Value::from(renderer.active(
                    category.unwrap_or_default(),
                    page.unwrap_or_default(),
                )))
            }
            "config" => {
                let config = renderer.config().map_err(to_template_error)?;
                Ok(Value::from_serialize(config.values()))
            }
            "category" => {
                let (category,): (Option<&str>,) = from_args(args)?;
                Ok(Value::from(renderer.category(category)))
            }
            "page" => {
                let (page,): (Option<&str>,) = from_args(args)?;
                Ok(Value::from(renderer.page(page)))
            }
            "param" => {
                let (name,): (&str,) = from_args(args)?;
                Ok(Value::from(renderer.param(name)))
            }
            "set_title" => {
                let (title,): (&str,) = from_args(args)?;
                ctx.set_title(title);
                Ok(Value::from(""))
            }
            "set_description" => {
                let (description,): (&str,) = from_args(args)?;
                ctx.set_description(description);
                Ok(Value::from(""))
            }
            "set_keywords" => {
                let (keywords,): (&str,) = from_args(args)?;
                ctx.set_keywords(keywords);
                Ok(Value::from(""))
            }
            _ => Err(Error::new(
                ErrorKind::UnknownMethod,
                format!("xb has no method named {method}"),
            )),
        }
    }
}
