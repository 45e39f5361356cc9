/// User handlers - profiles, per-user posts and the follow graph
use crate::error::{AppError, Result};
use crate::middleware::UserId;
use crate::models::UserPatch;
use crate::AppState;
use actix_web::{web, HttpResponse};
use serde_json::json;
use uuid::Uuid;

/// GET /api/users
pub async fn list_users(state: web::Data<AppState>) -> Result<HttpResponse> {
    let users = state.users.find_all().await?;
    Ok(HttpResponse::Ok().json(users))
}

/// GET /api/users/{user_id}
pub async fn get_user(
    state: web::Data<AppState>,
    user_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let user = state
        .users
        .find_by_id(user_id.into_inner())
        .await?
        .ok_or_else(AppError::user_not_found)?;

    Ok(HttpResponse::Ok().json(json!({ "user": user })))
}

/// GET /api/users/username/{username}
pub async fn get_user_by_username(
    state: web::Data<AppState>,
    username: web::Path<String>,
) -> Result<HttpResponse> {
    let user = state
        .users
        .find_by_username(&username)
        .await?
        .ok_or_else(AppError::user_not_found)?;

    Ok(HttpResponse::Ok().json(json!({ "user": user })))
}

/// PUT /api/users/{user_id}
pub async fn update_user(
    state: web::Data<AppState>,
    caller: UserId,
    user_id: web::Path<Uuid>,
    req: web::Json<UserPatch>,
) -> Result<HttpResponse> {
    let user_id = user_id.into_inner();
    if caller.0 != user_id {
        return Err(AppError::Forbidden(
            "Not authorized to update this profile".to_string(),
        ));
    }

    let user = state
        .users
        .update_profile(user_id, req.into_inner())
        .await?
        .ok_or_else(AppError::user_not_found)?;

    tracing::info!(%user_id, "profile updated");
    Ok(HttpResponse::Ok().json(json!({
        "message": "Profile updated successfully",
        "user": user,
    })))
}

/// GET /api/users/{user_id}/posts
pub async fn get_user_posts(
    state: web::Data<AppState>,
    user_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let posts = state.posts.list_user_posts(user_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(posts))
}

/// PUT /api/users/{user_id}/follow
pub async fn toggle_follow(
    state: web::Data<AppState>,
    caller: UserId,
    user_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let following = state
        .users
        .toggle_follow(caller.0, user_id.into_inner())
        .await?;
    let message = if following {
        "User followed"
    } else {
        "User unfollowed"
    };

    Ok(HttpResponse::Ok().json(json!({
        "message": message,
        "following": following,
    })))
}

/// GET /api/users/{user_id}/followers
pub async fn get_followers(
    state: web::Data<AppState>,
    user_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let followers = state
        .users
        .followers_of(user_id.into_inner())
        .await?
        .ok_or_else(AppError::user_not_found)?;

    Ok(HttpResponse::Ok().json(json!({ "followers": followers })))
}

/// GET /api/users/{user_id}/following
pub async fn get_following(
    state: web::Data<AppState>,
    user_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let following = state
        .users
        .following_of(user_id.into_inner())
        .await?
        .ok_or_else(AppError::user_not_found)?;

    Ok(HttpResponse::Ok().json(json!({ "following": following })))
}
