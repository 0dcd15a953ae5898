//! Interactive search.
//!
//! Each stdin line is treated as the search input's new value, so piping a
//! sequence of prefixes replays a typing session through the same debounce
//! and stale-response handling as the storefront.

use std::sync::Arc;

use medusa_storefront::config::StorefrontConfig;
use medusa_storefront::medusa::MedusaClient;
use medusa_storefront::search::{LiveSearch, SearchResults, SearchSyncConfig, path_and_query};
use tokio::io::{AsyncBufReadExt, BufReader};

use super::CliError;
use super::products::summary_line;

/// Run a live search session over stdin.
///
/// # Errors
///
/// Returns an error if configuration is invalid or stdin cannot be read.
pub async fn interactive(config: SearchSyncConfig) -> Result<(), CliError> {
    let storefront = StorefrontConfig::from_env()?;
    let client = MedusaClient::new(&storefront.medusa)?;
    let mut search = LiveSearch::spawn(Arc::new(client), storefront.base_url, config);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => match line? {
                Some(term) => search.type_term(term).await?,
                None => break,
            },
            Some(results) = search.next_results() => print_results(&search, &results),
        }
    }

    search.end_input();
    while let Some(results) = search.next_results().await {
        print_results(&search, &results);
    }
    Ok(())
}

#[allow(clippy::print_stdout)]
fn print_results(search: &LiveSearch, results: &SearchResults) {
    println!(
        "#{} {:?} -> {}",
        results.sequence,
        results.term,
        path_and_query(&search.location())
    );
    match &results.page {
        Ok(page) => {
            for product in &page.products {
                println!("  {}", summary_line(product));
            }
            println!("  {} products", page.count);
        }
        Err(e) => println!("  search failed: {e}"),
    }
}
