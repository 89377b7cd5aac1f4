//! Pagination metadata computed locally from the upstream review count.
//!
//! Navigation links point back at this proxy's own endpoint with the `page`
//! parameter rewritten, so clients can walk pages without knowing anything
//! about the upstream API.

use crate::api::models::ReviewsQuery;
use serde::Serialize;
use url::Url;

#[derive(Debug, Serialize)]
pub struct PaginationInfo {
    pub current_page: u32,
    pub per_page: u32,
    pub total_reviews: u64,
    pub total_pages: u64,
    pub current_page_count: usize,
    pub first: String,
    pub prev: Option<String>,
    pub next: Option<String>,
    pub last: String,
}

impl PaginationInfo {
    /// Build pagination metadata for the current request.
    ///
    /// `query.filters` must already hold the effective filter set sent
    /// upstream (resolved product id, page, per_page).
    pub fn build(
        endpoint: &str,
        query: &ReviewsQuery,
        total_reviews: u64,
        current_page_count: usize,
    ) -> Result<Self, url::ParseError> {
        let base = Url::parse(endpoint)?;
        let current_page = query.page();
        let per_page = query.per_page();
        let total_pages = total_reviews.div_ceil(u64::from(per_page.max(1)));

        let prev =
            (current_page > 1).then(|| page_url(&base, query, u64::from(current_page) - 1));
        let next = (u64::from(current_page) < total_pages)
            .then(|| page_url(&base, query, u64::from(current_page) + 1));

        Ok(Self {
            current_page,
            per_page,
            total_reviews,
            total_pages,
            current_page_count,
            first: page_url(&base, query, 1),
            prev,
            next,
            last: page_url(&base, query, total_pages),
        })
    }
}

/// Rewrite the effective filter set onto the proxy endpoint with `page`
/// replaced, re-attaching `product_external_id` when it was supplied.
pub fn page_url(base: &Url, query: &ReviewsQuery, page: u64) -> String {
    let mut rewritten = query.clone();
    rewritten.set_filter("page", page.to_string());

    let mut url = base.clone();
    url.set_query(None);
    {
        let mut pairs = url.query_pairs_mut();
        for (key, value) in &rewritten.filters {
            pairs.append_pair(key, value);
        }
        if let Some(external_id) = &query.product_external_id {
            pairs.append_pair("product_external_id", external_id);
        }
    }
    url.to_string()
}
