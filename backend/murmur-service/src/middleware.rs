/// Bearer-token authentication for handlers
///
/// Handlers that require a signed-in user take a [`UserId`] argument; the
/// extractor validates the `Authorization: Bearer <jwt>` header against the
/// keys held in [`AppState`]. Public handlers simply omit it.
use crate::error::AppError;
use crate::AppState;
use actix_web::{dev::Payload, http::header, web, FromRequest, HttpRequest};
use std::future::{ready, Ready};
use uuid::Uuid;

/// Authenticated user identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserId(pub Uuid);

impl UserId {
    fn from_parts(req: &HttpRequest) -> Result<Self, AppError> {
        let state = req
            .app_data::<web::Data<AppState>>()
            .ok_or_else(|| AppError::Internal("application state not configured".to_string()))?;

        let token = bearer_token(req)
            .ok_or_else(|| AppError::Unauthorized("Access token required".to_string()))?;

        let user_id = state.jwt.user_id_from_token(token).map_err(|e| {
            tracing::debug!(error = %e, "bearer token rejected");
            AppError::Unauthorized("Invalid or expired token".to_string())
        })?;

        Ok(UserId(user_id))
    }
}

impl FromRequest for UserId {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(Self::from_parts(req))
    }
}

fn bearer_token(req: &HttpRequest) -> Option<&str> {
    req.headers()
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}
