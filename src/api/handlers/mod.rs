//! API handlers and the shared mapping from account errors to HTTP responses.

pub mod health;
pub mod root;
pub mod state;
pub mod types;
pub mod user_login;
pub mod user_register;

use axum::http::StatusCode;
use serde::de::DeserializeOwned;
use tracing::{debug, error};

use crate::accounts::AuthError;

pub(crate) const INVALID_CREDENTIALS: &str = "Invalid username or password";

/// Map an [`AuthError`] to a status and a client-safe message.
///
/// Infrastructure failures are logged here and reach the client only as
/// `internal_message`.
pub(crate) fn auth_error_response(err: &AuthError, internal_message: &str) -> (StatusCode, String) {
    match err {
        AuthError::Validation(message) => (StatusCode::BAD_REQUEST, (*message).to_string()),
        AuthError::Conflict => (StatusCode::BAD_REQUEST, "user already exists".to_string()),
        AuthError::InvalidCredentials => (StatusCode::UNAUTHORIZED, INVALID_CREDENTIALS.to_string()),
        AuthError::Store(_) | AuthError::Hash(_) | AuthError::SessionToken(_) => {
            error!("{internal_message}: {err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                internal_message.to_string(),
            )
        }
    }
}

/// Decode a JSON request body whatever `Content-Type` the client sent.
pub(crate) fn decode_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, (StatusCode, String)> {
    serde_json::from_slice(body).map_err(|err| {
        debug!("Rejected request body: {err}");
        (StatusCode::BAD_REQUEST, "Invalid request body".to_string())
    })
}
