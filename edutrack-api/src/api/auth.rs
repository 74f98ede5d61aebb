//! Actor-context middleware
//!
//! Authentication itself lives in an external service; by the time a
//! request reaches this core the gateway has already verified identity
//! and forwards it as X-User-Id / X-User-Role headers. This middleware
//! turns those headers into an Actor extension for the handlers.

use axum::{
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use edutrack_common::db::models::UserRole;
use edutrack_common::Error;
use serde_json::json;
use uuid::Uuid;

/// The authenticated caller of the current request
#[derive(Debug, Clone)]
pub struct Actor {
    pub user_id: String,
    pub role: UserRole,
}

impl Actor {
    /// Ownership-style gate for the expert-only surface
    pub fn require_expert(&self) -> Result<(), Error> {
        if self.role == UserRole::Expert {
            Ok(())
        } else {
            Err(Error::Forbidden(
                "Only experts may perform this operation".to_string(),
            ))
        }
    }
}

/// Actor-context middleware
///
/// Returns 401 when the identity headers are missing or malformed.
/// Applied to protected routes only; /health does not use it.
pub async fn actor_context(mut request: Request, next: Next) -> Result<Response, AuthError> {
    let user_id = request
        .headers()
        .get("x-user-id")
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::NotAuthenticated)?
        .to_string();

    Uuid::parse_str(&user_id).map_err(|_| AuthError::InvalidIdentity(user_id.clone()))?;

    let role = request
        .headers()
        .get("x-user-role")
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::NotAuthenticated)?;
    let role =
        UserRole::parse(role).map_err(|_| AuthError::InvalidIdentity(role.to_string()))?;

    request.extensions_mut().insert(Actor { user_id, role });

    Ok(next.run(request).await)
}

/// Authentication error types for HTTP responses
#[derive(Debug)]
pub enum AuthError {
    NotAuthenticated,
    InvalidIdentity(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let message = match self {
            AuthError::NotAuthenticated => "Not authenticated".to_string(),
            AuthError::InvalidIdentity(value) => format!("Invalid identity: {}", value),
        };

        let body = Json(json!({
            "error": message,
        }));

        (StatusCode::UNAUTHORIZED, body).into_response()
    }
}
