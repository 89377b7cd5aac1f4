use crate::config::AppConfig;
use crate::upstream::JudgeMeClient;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::error;

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub judgeme: JudgeMeClient,
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Inbound query for the review proxy endpoint.
///
/// Known credential keys are split off; everything else (including
/// `product_id`, `page`, `per_page` and arbitrary Judge.me filter keys) is
/// kept verbatim, in order, for pass-through.
#[derive(Debug, Clone, Default)]
pub struct ReviewsQuery {
    pub shop_domain: Option<String>,
    pub api_token: Option<String>,
    pub product_external_id: Option<String>,
    pub filters: Vec<(String, String)>,
}

impl ReviewsQuery {
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut query = Self::default();
        for (key, value) in pairs {
            match key.as_str() {
                "shop_domain" => {
                    query.shop_domain.get_or_insert(value);
                }
                "api_token" => {
                    query.api_token.get_or_insert(value);
                }
                "product_external_id" => {
                    query.product_external_id.get_or_insert(value);
                }
                _ => query.filters.push((key, value)),
            }
        }
        query
    }

    pub fn filter(&self, key: &str) -> Option<&str> {
        self.filters
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Replace the first occurrence of `key`, or append it.
    pub fn set_filter(&mut self, key: &str, value: String) {
        match self.filters.iter_mut().find(|(k, _)| k == key) {
            Some((_, v)) => *v = value,
            None => self.filters.push((key.to_string(), value)),
        }
    }

    pub fn page(&self) -> u32 {
        self.filter("page").and_then(|v| v.parse().ok()).unwrap_or(1)
    }

    pub fn per_page(&self) -> u32 {
        self.filter("per_page")
            .and_then(|v| v.parse().ok())
            .unwrap_or(10)
    }
}

/// Application error type
#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Internal(msg) => {
                error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to fetch reviews".to_string(),
                )
            }
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn splits_credentials_from_filters() {
        let query = ReviewsQuery::from_pairs(pairs(&[
            ("shop_domain", "shop.myshopify.com"),
            ("api_token", "token"),
            ("product_external_id", "ABC"),
            ("rating", "5"),
            ("page", "2"),
        ]));
        assert_eq!(query.shop_domain.as_deref(), Some("shop.myshopify.com"));
        assert_eq!(query.api_token.as_deref(), Some("token"));
        assert_eq!(query.product_external_id.as_deref(), Some("ABC"));
        assert_eq!(query.filters, pairs(&[("rating", "5"), ("page", "2")]));
    }

    #[test]
    fn preserves_unrecognized_keys_in_order() {
        let query = ReviewsQuery::from_pairs(pairs(&[
            ("foo", "1"),
            ("bar", "2"),
            ("product_id", "7"),
            ("foo", "3"),
        ]));
        assert_eq!(
            query.filters,
            pairs(&[("foo", "1"), ("bar", "2"), ("product_id", "7"), ("foo", "3")])
        );
        assert_eq!(query.filter("product_id"), Some("7"));
    }

    #[test]
    fn page_defaults() {
        let query = ReviewsQuery::from_pairs(vec![]);
        assert_eq!(query.page(), 1);
        assert_eq!(query.per_page(), 10);

        let query = ReviewsQuery::from_pairs(pairs(&[("page", "notanumber")]));
        assert_eq!(query.page(), 1);
    }

    #[test]
    fn set_filter_replaces_first_occurrence() {
        let mut query = ReviewsQuery::from_pairs(pairs(&[("product_id", "1"), ("rating", "4")]));
        query.set_filter("product_id", "42".to_string());
        assert_eq!(query.filter("product_id"), Some("42"));

        query.set_filter("per_page", "10".to_string());
        assert_eq!(
            query.filters,
            pairs(&[("product_id", "42"), ("rating", "4"), ("per_page", "10")])
        );
    }
}
