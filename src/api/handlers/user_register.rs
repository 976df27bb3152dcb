use super::{
    auth_error_response, decode_body,
    state::AuthState,
    types::{AccountResponse, RegisterRequest},
};
use axum::{
    Json,
    body::Bytes,
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
};
use std::sync::Arc;

#[utoipa::path(
    post,
    path = "/register",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "Account created", body = AccountResponse),
        (status = 400, description = "Missing field, malformed body, or user already exists", body = String),
        (status = 500, description = "Store failure", body = String)
    ),
    tag = "accounts"
)]
pub async fn register(
    auth_state: Extension<Arc<AuthState>>,
    payload: Bytes,
) -> impl IntoResponse {
    let request: RegisterRequest = match decode_body(&payload) {
        Ok(request) => request,
        Err(rejection) => return rejection.into_response(),
    };

    match auth_state.registration().register(request.into()).await {
        Ok(account) => (StatusCode::OK, Json(AccountResponse::from(account))).into_response(),
        Err(err) => auth_error_response(&err, "Failed to register user").into_response(),
    }
}
