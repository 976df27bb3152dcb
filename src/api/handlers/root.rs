use super::types::Greeting;
use axum::response::{IntoResponse, Json};

// axum handler for `/`
pub async fn root() -> impl IntoResponse {
    Json(Greeting {
        success: true,
        message: "Hello from server".to_string(),
    })
}
