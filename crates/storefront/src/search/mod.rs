//! Search-as-you-type support.
//!
//! # Architecture
//!
//! - [`Debounce`] coalesces bursts of keystrokes (200 ms, leading and
//!   trailing edges) so the commerce API is not queried on every key
//! - [`search_location`] mirrors the current term into the `term` query
//!   parameter so search results are shareable
//! - [`LiveSearch`] ties both together: it rewrites the location, dispatches
//!   fetches without blocking input, and applies only the newest response
//!
//! The web UI gets the same behavior from HTMX attributes on the search
//! input; [`LiveSearch`] drives the interactive CLI search.

mod debounce;
mod live;
mod location;

pub use debounce::{Debounce, DebounceEdges, SEARCH_DEBOUNCE, debounced};
pub use live::{
    LiveSearch, LiveSearchClosed, ProductSearch, SearchPhase, SearchResults, SearchSyncConfig,
};
pub use location::{TERM_PARAM, path_and_query, search_location};
