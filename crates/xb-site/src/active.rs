//! Navigation active-state checks.

/// Class name emitted for the navigation entry matching the current request.
pub const ACTIVE_CLASS: &str = "active";

/// Compare a navigation entry against the current request's category/page.
///
/// Returns [`ACTIVE_CLASS`] on a match, an empty string otherwise:
///
/// - `page` empty and a current category present: match on category alone.
/// - `category` and `page` both given, current category and page present:
///   both must match.
/// - anything else never matches.
pub fn active_class(
    current_category: Option<&str>,
    current_page: Option<&str>,
    category: &str,
    page: &str,
) -> &'static str {
    if page.is_empty() {
        return match current_category {
            Some(current) if current == category => ACTIVE_CLASS,
            _ => "",
        };
    }

    if !category.is_empty()
        && current_category == Some(category)
        && current_page == Some(page)
    {
        return ACTIVE_CLASS;
    }

    ""
}
