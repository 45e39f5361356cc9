/// Murmur Service Library
///
/// A small social network backend: registration and login, text and image
/// posts, likes, comments and follows. State lives in two JSON collections
/// (`users.json`, `posts.json`) managed by the `record-store` crate.
///
/// # Modules
///
/// - `handlers`: HTTP request handlers and route table
/// - `models`: users, posts, comments and their API projections
/// - `services`: post business logic and image uploads
/// - `db`: repositories over the record store
/// - `middleware`: bearer-token authentication extractor
/// - `error`: error types and HTTP mapping
/// - `config`: configuration management
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;

pub use config::Config;
pub use error::{AppError, Result};

use crypto_core::JwtKeys;
use db::{PostRepository, UserRepository};
use models::{Post, User};
use record_store::RecordStore;
use services::{PostService, UploadStore};

/// Shared application state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub users: UserRepository,
    pub posts: PostService,
    pub uploads: UploadStore,
    pub jwt: JwtKeys,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(
        users: RecordStore<User>,
        posts: RecordStore<Post>,
        uploads: UploadStore,
        jwt: JwtKeys,
        max_upload_bytes: usize,
    ) -> Self {
        let users = UserRepository::new(users);
        let posts = PostService::new(PostRepository::new(posts), users.clone(), uploads.clone());

        Self {
            users,
            posts,
            uploads,
            jwt,
            max_upload_bytes,
        }
    }

    /// Open the JSON collections and uploads directory named by `config`,
    /// creating empty ones when missing
    pub async fn open(config: &Config) -> Result<Self> {
        let data_dir = &config.storage.data_dir;
        let users = RecordStore::open_json("users", data_dir.join("users.json")).await?;
        let posts = RecordStore::open_json("posts", data_dir.join("posts.json")).await?;

        let uploads = UploadStore::new(&config.storage.uploads_dir);
        uploads.ensure_dir().await?;

        tracing::info!(
            data_dir = %data_dir.display(),
            uploads_dir = %uploads.dir().display(),
            "storage ready"
        );

        Ok(Self::new(
            users,
            posts,
            uploads,
            JwtKeys::from_secret(&config.auth.jwt_secret, config.auth.jwt_ttl_days),
            config.storage.max_upload_bytes,
        ))
    }
}
