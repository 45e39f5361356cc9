use crate::error::{AppError, Result};
use crate::services::uploads::content_type_for;
use crate::AppState;
use actix_web::{web, HttpResponse};

/// GET /uploads/{filename}
pub async fn serve_upload(
    state: web::Data<AppState>,
    filename: web::Path<String>,
) -> Result<HttpResponse> {
    let filename = filename.into_inner();
    let bytes = state
        .uploads
        .read(&filename)
        .await?
        .ok_or_else(|| AppError::NotFound("File not found".to_string()))?;

    Ok(HttpResponse::Ok()
        .content_type(content_type_for(&filename))
        .body(bytes))
}
