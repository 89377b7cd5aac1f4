pub mod models;
pub mod reviews;

// Re-exports
pub use models::*;

use axum::Json;

pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        message: format!(
            "Judge.me review proxy v{} is running",
            env!("CARGO_PKG_VERSION")
        ),
    })
}
