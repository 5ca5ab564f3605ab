//! Request parameters and the sanitizer applied to every read.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

/// Parameter naming the category.
pub const CATEGORY_PARAM: &str = "c";

/// Parameter naming the page within the category.
pub const PAGE_PARAM: &str = "p";

/// Parameter switching off the header/footer layout.
pub const RAW_PARAM: &str = "raw";

/// Characters removed from parameter values after tags and escapes.
const NOT_ALLOWED: [char; 4] = ['\'', '*', '/', ' '];

/// A markup tag, or an unterminated `<` running to the end of the input.
static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*(?:>|$)").expect("tag pattern is valid"));

/// Make a raw parameter value safe for use as a path segment.
///
/// Strips markup tags, unescapes backslash sequences (dropping the
/// backslash), then removes `'`, `*`, `/` and spaces. `None` maps to an
/// empty string.
pub fn sanitize_param(value: Option<&str>) -> String {
    let Some(value) = value else {
        return String::new();
    };

    let without_tags = TAG_RE.replace_all(value, "");
    strip_slashes(&without_tags)
        .chars()
        .filter(|c| !NOT_ALLOWED.contains(c))
        .collect()
}

/// Unescape backslash sequences: `\x` becomes `x`, `\\` becomes `\`.
/// A trailing lone backslash is dropped.
fn strip_slashes(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Whether a sanitized flag value counts as set.
///
/// Empty and `"0"` are off, anything else is on.
pub(crate) fn is_truthy(value: &str) -> bool {
    !value.is_empty() && value != "0"
}

/// Parameters of a single page request.
///
/// Values are stored as received. Every read through [`RequestParams::get`]
/// is sanitized, whether the value came from the request or was set later
/// with [`RequestParams::set`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RequestParams {
    values: BTreeMap<String, String>,
}

impl RequestParams {
    /// Create an empty parameter set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a parameter, replacing any previous value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// Sanitized value of a parameter, empty if absent.
    pub fn get(&self, key: &str) -> String {
        sanitize_param(self.raw(key))
    }

    /// Value exactly as received.
    pub fn raw(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Whether a flag parameter is set to a truthy value.
    pub fn flag(&self, key: &str) -> bool {
        is_truthy(&self.get(key))
    }

    /// All parameters with sanitized values.
    pub fn sanitized(&self) -> BTreeMap<String, String> {
        self.values
            .iter()
            .map(|(key, value)| (key.clone(), sanitize_param(Some(value))))
            .collect()
    }
}

impl<K, V> FromIterator<(K, V)> for RequestParams
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }
}
