/// Post handlers - HTTP endpoints for posts, likes and comments
use crate::error::{AppError, Result};
use crate::middleware::UserId;
use crate::services::UploadedImage;
use crate::AppState;
use actix_multipart::{Field, Multipart};
use actix_web::{web, HttpResponse};
use futures::StreamExt;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct CommentRequest {
    #[serde(default)]
    pub content: Option<String>,
}

/// Fields of the multipart create-post form
#[derive(Debug, Default)]
struct PostForm {
    content: Option<String>,
    image: Option<UploadedImage>,
}

/// GET /api/posts
pub async fn list_posts(state: web::Data<AppState>) -> Result<HttpResponse> {
    let posts = state.posts.list_posts().await?;
    Ok(HttpResponse::Ok().json(posts))
}

/// GET /api/posts/{post_id}
pub async fn get_post(
    state: web::Data<AppState>,
    post_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let post = state.posts.get_post(post_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(post))
}

/// POST /api/posts (multipart: `content`, `image`)
pub async fn create_post(
    state: web::Data<AppState>,
    user_id: UserId,
    payload: Multipart,
) -> Result<HttpResponse> {
    let form = read_post_form(payload, state.max_upload_bytes).await?;
    let post = state
        .posts
        .create_post(user_id.0, form.content, form.image)
        .await?;

    Ok(HttpResponse::Created().json(json!({
        "message": "Post created successfully",
        "post": post,
    })))
}

/// PUT /api/posts/{post_id}/like
pub async fn toggle_like(
    state: web::Data<AppState>,
    user_id: UserId,
    post_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let outcome = state.posts.toggle_like(post_id.into_inner(), user_id.0).await?;
    let message = if outcome.liked {
        "Post liked"
    } else {
        "Post unliked"
    };

    Ok(HttpResponse::Ok().json(json!({
        "message": message,
        "likes": outcome.likes,
    })))
}

/// POST /api/posts/{post_id}/comments
pub async fn add_comment(
    state: web::Data<AppState>,
    user_id: UserId,
    post_id: web::Path<Uuid>,
    req: web::Json<CommentRequest>,
) -> Result<HttpResponse> {
    let content = req.into_inner().content.unwrap_or_default();
    let comment = state
        .posts
        .add_comment(post_id.into_inner(), user_id.0, content)
        .await?;

    Ok(HttpResponse::Created().json(json!({
        "message": "Comment added successfully",
        "comment": comment,
    })))
}

/// DELETE /api/posts/{post_id}
pub async fn delete_post(
    state: web::Data<AppState>,
    user_id: UserId,
    post_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    state.posts.delete_post(post_id.into_inner(), user_id.0).await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Post deleted successfully" })))
}

async fn read_post_form(mut payload: Multipart, max_bytes: usize) -> Result<PostForm> {
    let mut form = PostForm::default();

    while let Some(field) = payload.next().await {
        let mut field =
            field.map_err(|e| AppError::Validation(format!("Malformed multipart body: {e}")))?;
        let name = field.name().unwrap_or_default().to_string();

        match name.as_str() {
            "content" => {
                let bytes = read_field(&mut field, max_bytes).await?;
                let text = String::from_utf8(bytes)
                    .map_err(|_| AppError::Validation("Content must be UTF-8 text".to_string()))?;
                form.content = Some(text);
            }
            "image" => {
                let original_name = field
                    .content_disposition()
                    .and_then(|cd| cd.get_filename())
                    .unwrap_or_default()
                    .to_string();
                // An empty file input still sends a part, without a filename
                if original_name.is_empty() {
                    drain(&mut field).await?;
                    continue;
                }

                let is_image = field
                    .content_type()
                    .is_some_and(|ct| ct.type_() == mime::IMAGE);
                if !is_image {
                    return Err(AppError::Validation(
                        "Only image files are allowed".to_string(),
                    ));
                }

                let data = read_field(&mut field, max_bytes).await?;
                form.image = Some(UploadedImage {
                    original_name,
                    data,
                });
            }
            _ => drain(&mut field).await?,
        }
    }

    Ok(form)
}

async fn read_field(field: &mut Field, max_bytes: usize) -> Result<Vec<u8>> {
    let mut data = Vec::new();
    while let Some(chunk) = field.next().await {
        let chunk =
            chunk.map_err(|e| AppError::Validation(format!("Malformed multipart body: {e}")))?;
        if data.len() + chunk.len() > max_bytes {
            return Err(AppError::Validation(format!(
                "File too large (limit is {max_bytes} bytes)"
            )));
        }
        data.extend_from_slice(&chunk);
    }
    Ok(data)
}

async fn drain(field: &mut Field) -> Result<()> {
    while let Some(chunk) = field.next().await {
        chunk.map_err(|e| AppError::Validation(format!("Malformed multipart body: {e}")))?;
    }
    Ok(())
}
