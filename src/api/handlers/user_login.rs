use super::{
    auth_error_response, decode_body,
    state::{AuthConfig, AuthState},
    types::{LoginRequest, LoginResponse, LoginUser},
};
use axum::{
    Json,
    body::Bytes,
    extract::Extension,
    http::{
        HeaderMap, HeaderValue, StatusCode,
        header::{InvalidHeaderValue, SET_COOKIE},
    },
    response::IntoResponse,
};
use secrecy::ExposeSecret;
use std::sync::Arc;
use tracing::error;

pub(crate) const SESSION_COOKIE_NAME: &str = "session_token";

#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful, session cookie set", body = LoginResponse),
        (status = 400, description = "Malformed body", body = String),
        (status = 401, description = "Invalid username or password", body = String),
        (status = 500, description = "Store failure", body = String)
    ),
    tag = "accounts"
)]
pub async fn login(
    auth_state: Extension<Arc<AuthState>>,
    payload: Bytes,
) -> impl IntoResponse {
    let request: LoginRequest = match decode_body(&payload) {
        Ok(request) => request,
        Err(rejection) => return rejection.into_response(),
    };

    let session = match auth_state.login().login(request.into()).await {
        Ok(session) => session,
        Err(err) => return auth_error_response(&err, "Internal error").into_response(),
    };

    let cookie = match session_cookie(auth_state.config(), session.token.expose_secret()) {
        Ok(cookie) => cookie,
        Err(err) => {
            error!("Failed to build session cookie: {err}");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal error".to_string(),
            )
                .into_response();
        }
    };

    let mut headers = HeaderMap::new();
    headers.insert(SET_COOKIE, cookie);

    let body = LoginResponse {
        success: true,
        message: "User logged in successfully".to_string(),
        user: Some(LoginUser {
            username: session.username,
            email: session.email,
            login_token: session.token.expose_secret().to_string(),
        }),
    };

    (StatusCode::OK, headers, Json(body)).into_response()
}

/// Build an `HttpOnly` cookie carrying the session token.
pub(crate) fn session_cookie(
    config: &AuthConfig,
    token: &str,
) -> Result<HeaderValue, InvalidHeaderValue> {
    let ttl_seconds = config.session_ttl_seconds();
    let mut cookie = format!(
        "{SESSION_COOKIE_NAME}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={ttl_seconds}"
    );
    if config.session_cookie_secure() {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}
