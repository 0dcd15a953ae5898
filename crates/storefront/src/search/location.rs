//! Search term <-> URL synchronization.

use url::Url;

/// Query parameter carrying the search term.
pub const TERM_PARAM: &str = "term";

/// Rewrite `current` so its `term` parameter reflects `term`.
///
/// A non-empty term replaces any existing one; an empty term removes the
/// parameter. Other query parameters are preserved.
#[must_use]
pub fn search_location(current: &Url, term: &str) -> Url {
    let retained: Vec<(String, String)> = current
        .query_pairs()
        .filter(|(key, _)| key != TERM_PARAM)
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    let mut url = current.clone();
    url.set_query(None);

    if !retained.is_empty() || !term.is_empty() {
        let mut pairs = url.query_pairs_mut();
        pairs.extend_pairs(retained);
        if !term.is_empty() {
            pairs.append_pair(TERM_PARAM, term);
        }
    }

    url
}

/// Origin-relative form of a URL (`/path?query`), as pushed to the browser.
#[must_use]
pub fn path_and_query(url: &Url) -> String {
    match url.query() {
        Some(query) => format!("{}?{query}", url.path()),
        None => url.path().to_string(),
    }
}
