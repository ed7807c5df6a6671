use axum::{extract::Request, http::header::AUTHORIZATION, middleware::Next, response::Response};

use crate::error::AppError;

/// Bearer token authentication for the API surface.
/// Rejects requests without a well-formed `Authorization: Bearer` header
/// before any handler runs.
pub async fn bearer_auth_middleware(req: Request, next: Next) -> Result<Response, AppError> {
    let token = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "));

    match token {
        Some(token) if !token.is_empty() => Ok(next.run(req).await),
        _ => Err(AppError::AuthenticationError(
            "Missing or invalid Authorization header".to_string(),
        )),
    }
}
