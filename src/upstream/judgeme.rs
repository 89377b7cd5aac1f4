//! Client for the Judge.me review API.
//!
//! All calls are plain GETs authenticated by `shop_domain` + `api_token`
//! query parameters. Response shapes are owned by Judge.me, so review
//! payloads are passed through as raw JSON.

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;
use url::Url;

/// Errors from the upstream Judge.me API.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// Transport-level failure (DNS, connect, timeout).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body was not the JSON we expected.
    #[error("Invalid upstream response: {0}")]
    Parse(String),

    /// Upstream base URL or parameters produced an invalid URL.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

/// Per-request shop identity forwarded on every upstream call.
#[derive(Debug, Clone)]
pub struct ShopCredentials {
    pub shop_domain: String,
    pub api_token: String,
}

#[derive(Debug, Deserialize)]
struct ProductLookupResponse {
    product: Option<ProductRecord>,
}

#[derive(Debug, Deserialize)]
struct ProductRecord {
    id: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct CountResponse {
    count: Option<u64>,
}

/// Judge.me API client.
#[derive(Clone)]
pub struct JudgeMeClient {
    client: reqwest::Client,
    base_url: String,
}

impl JudgeMeClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn endpoint(&self, path: &str, creds: &ShopCredentials) -> Result<Url, UpstreamError> {
        let mut url = Url::parse(&format!("{}{}", self.base_url, path))?;
        url.query_pairs_mut()
            .append_pair("shop_domain", &creds.shop_domain)
            .append_pair("api_token", &creds.api_token);
        Ok(url)
    }

    async fn get_json(&self, url: Url) -> Result<Value, UpstreamError> {
        let response = self.client.get(url).send().await?;
        response
            .json::<Value>()
            .await
            .map_err(|e| UpstreamError::Parse(e.to_string()))
    }

    /// Resolve an internal product id from a merchant-facing external id.
    ///
    /// Lookup failures are indistinguishable from "no such product": the
    /// proxy proceeds without a product filter either way, so this swallows
    /// errors after logging them.
    pub async fn lookup_product_id(
        &self,
        creds: &ShopCredentials,
        external_id: &str,
    ) -> Option<i64> {
        let url = match self.endpoint("/api/v1/products/-1", creds) {
            Ok(mut url) => {
                url.query_pairs_mut().append_pair("external_id", external_id);
                url
            }
            Err(e) => {
                debug!(error = %e, "Invalid product lookup URL");
                return None;
            }
        };

        let result: Result<ProductLookupResponse, UpstreamError> = async {
            let response = self.client.get(url).send().await?;
            response
                .json::<ProductLookupResponse>()
                .await
                .map_err(|e| UpstreamError::Parse(e.to_string()))
        }
        .await;

        match result {
            Ok(body) => body.product.and_then(|p| p.id),
            Err(e) => {
                debug!(external_id, error = %e, "Product lookup failed, continuing without product id");
                None
            }
        }
    }

    /// Fetch the total review count, optionally scoped to one product.
    /// A missing count field counts as zero.
    pub async fn review_count(
        &self,
        creds: &ShopCredentials,
        product_id: Option<&str>,
    ) -> Result<u64, UpstreamError> {
        let mut url = self.endpoint("/api/v1/reviews/count", creds)?;
        if let Some(product_id) = product_id {
            url.query_pairs_mut().append_pair("product_id", product_id);
        }

        let response = self.client.get(url).send().await?;
        let body = response
            .json::<CountResponse>()
            .await
            .map_err(|e| UpstreamError::Parse(e.to_string()))?;
        Ok(body.count.unwrap_or(0))
    }

    /// Fetch a page of reviews. `filters` is forwarded verbatim, in order,
    /// after the credentials.
    pub async fn fetch_reviews(
        &self,
        creds: &ShopCredentials,
        filters: &[(String, String)],
    ) -> Result<Value, UpstreamError> {
        let mut url = self.endpoint("/api/v1/reviews", creds)?;
        {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in filters {
                pairs.append_pair(key, value);
            }
        }
        self.get_json(url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_carries_credentials() {
        let client = JudgeMeClient::new("https://judge.me/");
        let creds = ShopCredentials {
            shop_domain: "shop.myshopify.com".to_string(),
            api_token: "token".to_string(),
        };
        let url = client.endpoint("/api/v1/reviews/count", &creds).unwrap();
        assert_eq!(url.path(), "/api/v1/reviews/count");
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert!(pairs.contains(&("shop_domain".to_string(), "shop.myshopify.com".to_string())));
        assert!(pairs.contains(&("api_token".to_string(), "token".to_string())));
    }

    #[test]
    fn count_defaults_to_zero_when_missing() {
        let body: CountResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(body.count.unwrap_or(0), 0);
    }

    #[test]
    fn product_lookup_tolerates_missing_product() {
        let body: ProductLookupResponse = serde_json::from_str(r#"{"product": null}"#).unwrap();
        assert!(body.product.and_then(|p| p.id).is_none());

        let body: ProductLookupResponse =
            serde_json::from_str(r#"{"product": {"id": 42}}"#).unwrap();
        assert_eq!(body.product.and_then(|p| p.id), Some(42));
    }
}
