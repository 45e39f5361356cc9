/// HTTP handlers and the route table
pub mod auth;
pub mod health;
pub mod posts;
pub mod uploads;
pub mod users;

use crate::error::AppError;
use actix_web::web;

/// Register every route and the JSON/path error handlers on an app
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default().error_handler(|err, _req| {
            AppError::Validation(format!("Invalid JSON body: {err}")).into()
        }),
    )
    .app_data(
        web::PathConfig::default().error_handler(|_err, _req| {
            AppError::NotFound("Resource not found".to_string()).into()
        }),
    )
    .route("/api/health", web::get().to(health::health))
    .service(
        web::scope("/api/auth")
            .route("/register", web::post().to(auth::register))
            .route("/login", web::post().to(auth::login))
            .route("/me", web::get().to(auth::me)),
    )
    .service(
        web::scope("/api/posts")
            .service(
                web::resource("")
                    .route(web::get().to(posts::list_posts))
                    .route(web::post().to(posts::create_post)),
            )
            .service(
                web::resource("/{post_id}")
                    .route(web::get().to(posts::get_post))
                    .route(web::delete().to(posts::delete_post)),
            )
            .route("/{post_id}/like", web::put().to(posts::toggle_like))
            .route("/{post_id}/comments", web::post().to(posts::add_comment)),
    )
    .service(
        web::scope("/api/users")
            .route("", web::get().to(users::list_users))
            .route("/username/{username}", web::get().to(users::get_user_by_username))
            .service(
                web::resource("/{user_id}")
                    .route(web::get().to(users::get_user))
                    .route(web::put().to(users::update_user)),
            )
            .route("/{user_id}/posts", web::get().to(users::get_user_posts))
            .route("/{user_id}/follow", web::put().to(users::toggle_follow))
            .route("/{user_id}/followers", web::get().to(users::get_followers))
            .route("/{user_id}/following", web::get().to(users::get_following)),
    )
    .route("/uploads/{filename}", web::get().to(uploads::serve_upload));
}
