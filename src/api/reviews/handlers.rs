use crate::api::models::*;
use crate::api::reviews::pagination::PaginationInfo;
use crate::config::AppConfig;
use crate::upstream::ShopCredentials;
use axum::{
    extract::{Query, State},
    http::{header, HeaderMap},
    Json,
};
use serde_json::{Map, Value};
use tracing::info;

/// Proxy a review fetch to Judge.me, augmenting the upstream payload with
/// locally computed `pagination` and `average_rating` fields.
///
/// Up to four sequential upstream calls: optional product lookup, review
/// count, the requested page, and an optional full fetch for the average.
pub async fn proxy_reviews_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<Value>, AppError> {
    let mut query = ReviewsQuery::from_pairs(pairs);

    let upstream = &state.config.upstream;
    let shop_domain = query.shop_domain.clone().or_else(|| upstream.shop_domain.clone());
    let api_token = query.api_token.clone().or_else(|| upstream.api_token.clone());
    let (Some(shop_domain), Some(api_token)) = (shop_domain, api_token) else {
        return Err(AppError::BadRequest("Missing required parameters".to_string()));
    };
    let creds = ShopCredentials { shop_domain, api_token };

    // Resolve the internal product id from the merchant-facing external id
    // unless the client already supplied one. A failed lookup is the same
    // as no match: the request proceeds unfiltered.
    let mut product_id: Option<String> = query.filter("product_id").map(str::to_string);
    if product_id.is_none()
        && let Some(external_id) = query.product_external_id.clone()
        && let Some(id) = state.judgeme.lookup_product_id(&creds, &external_id).await
    {
        info!(external_id = %external_id, product_id = id, "Resolved product id");
        product_id = Some(id.to_string());
    }
    if let Some(id) = &product_id {
        query.set_filter("product_id", id.clone());
    }

    // Make paging explicit so upstream calls and navigation links agree.
    let current_page = query.page();
    let per_page = query.per_page();
    query.set_filter("page", current_page.to_string());
    query.set_filter("per_page", per_page.to_string());

    info!(
        shop_domain = %creds.shop_domain,
        page = current_page,
        per_page,
        product_id = product_id.as_deref().unwrap_or("-"),
        "Proxying review fetch"
    );

    let total_reviews = state
        .judgeme
        .review_count(&creds, product_id.as_deref())
        .await
        .map_err(|e| AppError::Internal(format!("Count request failed: {}", e)))?;

    let payload = state
        .judgeme
        .fetch_reviews(&creds, &query.filters)
        .await
        .map_err(|e| AppError::Internal(format!("Reviews request failed: {}", e)))?;

    let current_page_count = payload
        .get("reviews")
        .and_then(Value::as_array)
        .map_or(0, Vec::len);

    let endpoint = proxy_endpoint(&headers, &state.config);
    let pagination = PaginationInfo::build(&endpoint, &query, total_reviews, current_page_count)
        .map_err(|e| AppError::Internal(format!("Invalid pagination base URL: {}", e)))?;

    // Average over the full review set for the product, not just this page.
    // Scoped by product only; pass-through filters must not skew the mean.
    let average_rating = if let Some(id) = &product_id
        && total_reviews > 0
    {
        let all_filters = vec![
            ("product_id".to_string(), id.clone()),
            ("page".to_string(), "1".to_string()),
            ("per_page".to_string(), total_reviews.to_string()),
        ];
        let all_reviews = state
            .judgeme
            .fetch_reviews(&creds, &all_filters)
            .await
            .map_err(|e| AppError::Internal(format!("Rating fetch failed: {}", e)))?;
        mean_rating(&all_reviews)
    } else {
        None
    };

    let mut body = match payload {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    body.insert(
        "pagination".to_string(),
        serde_json::to_value(pagination)
            .map_err(|e| AppError::Internal(format!("Pagination encoding failed: {}", e)))?,
    );
    body.insert(
        "average_rating".to_string(),
        average_rating.map_or(Value::Null, Value::from),
    );

    Ok(Json(Value::Object(body)))
}

/// Base URL for navigation links, derived from the inbound request so links
/// point back at this proxy. Falls back to the configured listen address
/// when no Host header is present.
fn proxy_endpoint(headers: &HeaderMap, config: &AppConfig) -> String {
    let scheme = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("http");
    let host = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .map_or_else(
            || format!("{}:{}", config.server.host, config.server.port),
            str::to_string,
        );
    format!("{}://{}/api/judgeme", scheme, host)
}

/// Arithmetic mean of the `rating` fields, rounded to two decimals.
fn mean_rating(payload: &Value) -> Option<f64> {
    let reviews = payload.get("reviews")?.as_array()?;
    let ratings: Vec<f64> = reviews
        .iter()
        .filter_map(|review| review.get("rating").and_then(Value::as_f64))
        .collect();
    if ratings.is_empty() {
        return None;
    }
    let mean = ratings.iter().sum::<f64>() / ratings.len() as f64;
    Some((mean * 100.0).round() / 100.0)
}
