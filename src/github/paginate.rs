// src/github/paginate.rs
// =============================================================================
// Walks a paged listing endpoint until it runs out.
//
// Pages are requested with per_page=100 and page=1, 2, 3...
// We stop as soon as either:
// - a page comes back empty, or
// - the Link header has no rel="next" relation
// Items are concatenated in the order the API returns them.
// =============================================================================

use serde::de::DeserializeOwned;
use tracing::debug;

use super::fetch::{decode, GithubClient};
use crate::error::RequestError;

pub const PAGE_SIZE: u32 = 100;

impl GithubClient {
    // Fetches every page of a listing endpoint
    //
    // Parameters:
    //   url: Absolute endpoint URL
    //   params: Extra query parameters (any per_page/page are replaced)
    //
    // Returns: all items from all pages, in API order, duplicates kept
    //
    // Example:
    //   page 1 -> [a, b] with rel="next"
    //   page 2 -> [c] with no rel="next"
    //   result: [a, b, c] after 2 requests
    pub async fn get_paginated<T: DeserializeOwned>(
        &self,
        url: &str,
        mut params: Vec<(String, String)>,
    ) -> Result<Vec<T>, RequestError> {
        params.retain(|(k, _)| k != "per_page" && k != "page");
        params.push(("per_page".to_string(), PAGE_SIZE.to_string()));

        let mut all_items = Vec::new();
        let mut page = 1u32;

        loop {
            let mut query = params.clone();
            query.push(("page".to_string(), page.to_string()));

            let response = self.fetch(url, &query).await?;
            let items: Vec<T> = decode(url, &response.body)?;
            debug!(%url, page, items = items.len(), "Fetched page");

            if items.is_empty() {
                break;
            }
            all_items.extend(items);

            if !has_next_page(response.link.as_deref()) {
                break;
            }
            page += 1;
        }

        Ok(all_items)
    }
}

/// True when a `Link` header advertises another page.
pub fn has_next_page(link: Option<&str>) -> bool {
    link.map_or(false, |l| l.contains("rel=\"next\""))
}
