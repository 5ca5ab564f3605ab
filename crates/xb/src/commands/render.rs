//! `xb render` command implementation.
//!
//! Renders a single page the way the server would and writes the HTML to
//! stdout. Handy for checking templates without starting the server.

use std::io::Write;
use std::path::PathBuf;

use clap::Args;
use xb_config::{CliSettings, Config};
use xb_site::{
    CATEGORY_PARAM, PAGE_PARAM, PageRenderer, PageRendererConfig, RAW_PARAM, RequestParams,
};

use crate::error::CliError;

/// Arguments for the render command.
#[derive(Args)]
pub(crate) struct RenderArgs {
    /// Path to configuration file (default: auto-discover xb.toml).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Site root directory (overrides config).
    #[arg(short, long)]
    site: Option<PathBuf>,

    /// Category to render.
    #[arg(short = 'c', long)]
    category: Option<String>,

    /// Page within the category.
    #[arg(short = 'p', long)]
    page: Option<String>,

    /// Render the content fragment only, without header and footer.
    #[arg(long)]
    raw: bool,

    /// Extra request parameter, as KEY=VALUE (repeatable).
    #[arg(long = "param", value_name = "KEY=VALUE", value_parser = parse_key_val)]
    params: Vec<(String, String)>,

    /// Enable verbose output (resolution logs).
    #[arg(short, long)]
    pub verbose: bool,
}

impl RenderArgs {
    /// Execute the render command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails, rendering fails, or stdout
    /// cannot be written.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let cli_settings = CliSettings {
            site_root: self.site.clone(),
            ..CliSettings::default()
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;

        let renderer_config = PageRendererConfig {
            base_path: config.site_resolved.public_dir.clone(),
            config_dir: config.site_resolved.config_dir.clone(),
        };
        let page = PageRenderer::new(renderer_config, self.request_params()).render()?;

        let mut stdout = std::io::stdout().lock();
        stdout.write_all(page.html.as_bytes())?;
        stdout.flush()?;

        Ok(())
    }

    /// Build the request parameters; explicit flags win over `--param`.
    fn request_params(&self) -> RequestParams {
        let mut params: RequestParams = self.params.iter().cloned().collect();
        if let Some(category) = &self.category {
            params.set(CATEGORY_PARAM, category.as_str());
        }
        if let Some(page) = &self.page {
            params.set(PAGE_PARAM, page.as_str());
        }
        if self.raw {
            params.set(RAW_PARAM, "1");
        }
        params
    }
}

/// Parse a `KEY=VALUE` pair.
fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("invalid KEY=VALUE: no `=` found in `{s}`"))?;
    if key.is_empty() {
        return Err(format!("invalid KEY=VALUE: empty key in `{s}`"));
    }
    Ok((key.to_owned(), value.to_owned()))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn args(category: Option<&str>, page: Option<&str>, raw: bool) -> RenderArgs {
        RenderArgs {
            config: None,
            site: None,
            category: category.map(ToOwned::to_owned),
            page: page.map(ToOwned::to_owned),
            raw,
            params: vec![
                ("c".to_owned(), "ignored".to_owned()),
                ("lang".to_owned(), "en".to_owned()),
            ],
            verbose: false,
        }
    }

    #[test]
    fn test_parse_key_val() {
        assert_eq!(
            parse_key_val("lang=en"),
            Ok(("lang".to_owned(), "en".to_owned()))
        );
        assert_eq!(
            parse_key_val("q=a=b"),
            Ok(("q".to_owned(), "a=b".to_owned()))
        );
        assert_eq!(parse_key_val("empty="), Ok(("empty".to_owned(), String::new())));
    }

    #[test]
    fn test_parse_key_val_rejects_malformed() {
        assert!(parse_key_val("lang").is_err());
        assert!(parse_key_val("=en").is_err());
    }

    #[test]
    fn test_request_params_flags_override_param_list() {
        let params = args(Some("blog"), Some("post"), true).request_params();

        assert_eq!(params.get("c"), "blog");
        assert_eq!(params.get("p"), "post");
        assert_eq!(params.get("lang"), "en");
        assert!(params.flag("raw"));
    }

    #[test]
    fn test_request_params_without_flags() {
        let params = args(None, None, false).request_params();

        assert_eq!(params.get("c"), "ignored");
        assert_eq!(params.raw("p"), None);
        assert!(!params.flag("raw"));
    }
}
