/// Registration, login and current-user endpoints
use crate::db::Registration;
use crate::error::{AppError, Result};
use crate::middleware::UserId;
use crate::models::NewUser;
use crate::AppState;
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

fn required(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// POST /api/auth/register
pub async fn register(state: web::Data<AppState>, req: web::Json<NewUser>) -> Result<HttpResponse> {
    let NewUser {
        username,
        email,
        password,
    } = req.into_inner();

    let (Some(username), Some(email), Some(password)) =
        (required(username), required(email), required(password))
    else {
        return Err(AppError::Validation("All fields are required".to_string()));
    };

    let user = state
        .users
        .create(Registration {
            username,
            email,
            password,
        })
        .await?;
    let token = state.jwt.issue_token(user.id)?;

    Ok(HttpResponse::Created().json(json!({
        "message": "User created successfully",
        "token": token,
        "user": user,
    })))
}

/// POST /api/auth/login
pub async fn login(
    state: web::Data<AppState>,
    req: web::Json<LoginRequest>,
) -> Result<HttpResponse> {
    let LoginRequest { email, password } = req.into_inner();
    let (Some(email), Some(password)) = (required(email), required(password)) else {
        return Err(AppError::Validation(
            "Email and password are required".to_string(),
        ));
    };

    let Some(user) = state.users.verify_credentials(&email, &password).await? else {
        tracing::info!(email = %email, "login rejected");
        return Err(AppError::InvalidCredentials);
    };
    let token = state.jwt.issue_token(user.id)?;

    tracing::info!(user_id = %user.id, "login succeeded");
    Ok(HttpResponse::Ok().json(json!({
        "message": "Login successful",
        "token": token,
        "user": user,
    })))
}

/// GET /api/auth/me
pub async fn me(state: web::Data<AppState>, user_id: UserId) -> Result<HttpResponse> {
    let user = state
        .users
        .find_by_id(user_id.0)
        .await?
        .ok_or_else(AppError::user_not_found)?;

    Ok(HttpResponse::Ok().json(json!({ "user": user })))
}
