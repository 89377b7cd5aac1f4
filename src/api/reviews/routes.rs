use crate::api::models::AppState;
use crate::api::reviews::handlers::proxy_reviews_handler;
use axum::{routing::get, Router};

pub fn routes() -> Router<AppState> {
    Router::new().route("/api/judgeme", get(proxy_reviews_handler))
}
