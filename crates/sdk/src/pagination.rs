//! Aggregation of paged collection endpoints.
//!
//! Harvest collection responses carry one array field plus a `next_page`
//! number. Pages are fetched one after another, in server order, until
//! `next_page` is null.

use crate::error::{HarvestError, HarvestResult};
use crate::transport::HttpTransport;
use serde::de::DeserializeOwned;
use tracing::debug;

/// Page size requested from every collection endpoint.
pub const PER_PAGE: u32 = 100;

/// One decoded page of a collection.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next_page: Option<u32>,
}

/// Response shape of a paged collection endpoint.
pub trait Paginated: DeserializeOwned {
    type Item;

    /// Split the response into its records and the next page number.
    fn into_page(self) -> Page<Self::Item>;
}

/// Fetch every page of `path` and concatenate the records.
///
/// `query` is sent with every page request alongside `page` and `per_page`.
pub async fn collect_all<P: Paginated>(
    http: &HttpTransport,
    path: &str,
    query: &[(&str, String)],
) -> HarvestResult<Vec<P::Item>> {
    let mut items = Vec::new();
    let mut page = 1u32;

    loop {
        let mut params: Vec<(&str, String)> = query.to_vec();
        params.push(("page", page.to_string()));
        params.push(("per_page", PER_PAGE.to_string()));

        let response: P = http.get_with_query(path, &params).await?;
        let Page {
            items: records,
            next_page,
        } = response.into_page();

        debug!(path, page, records = records.len(), "Fetched page");
        items.extend(records);

        match next_page {
            None => break,
            Some(next) if next > page => page = next,
            Some(next) => {
                return Err(HarvestError::Pagination(format!(
                    "{} returned next_page {} after page {}",
                    path, next, page
                )));
            }
        }
    }

    Ok(items)
}
