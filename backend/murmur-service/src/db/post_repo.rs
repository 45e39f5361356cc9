use crate::error::{AppError, Result};
use crate::models::{Comment, LikeToggle, Post};
use chrono::Utc;
use record_store::RecordStore;
use serde_json::Map;
use uuid::Uuid;

/// Posts collection plus the like and comment mutations on it
#[derive(Clone)]
pub struct PostRepository {
    store: RecordStore<Post>,
}

impl PostRepository {
    pub fn new(store: RecordStore<Post>) -> Self {
        Self { store }
    }

    /// Append a new post with empty likes and comments
    pub async fn create(
        &self,
        user_id: Uuid,
        content: String,
        image: Option<String>,
    ) -> Result<Post> {
        let now = Utc::now();
        let post = Post {
            id: Uuid::new_v4(),
            user_id,
            content,
            image,
            likes: Vec::new(),
            comments: Vec::new(),
            created_at: now,
            updated_at: now,
            extra: Map::new(),
        };

        Ok(self.store.create(post).await?)
    }

    /// All posts, newest first. Posts created in the same instant keep
    /// their persisted order.
    pub async fn find_all_newest_first(&self) -> Result<Vec<Post>> {
        let mut posts = self.store.find_all().await?;
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(posts)
    }

    pub async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<Post>> {
        let mut posts = self.find_all_newest_first().await?;
        posts.retain(|p| p.user_id == user_id);
        Ok(posts)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>> {
        Ok(self.store.find_by_id(id).await?)
    }

    /// Add `user_id` to the post's likes, or remove it if already present
    pub async fn toggle_like(&self, post_id: Uuid, user_id: Uuid) -> Result<LikeToggle> {
        self.store
            .mutate(|posts| -> Result<LikeToggle> {
                let post = posts
                    .iter_mut()
                    .find(|p| p.id == post_id)
                    .ok_or_else(AppError::post_not_found)?;

                let liked = !post.likes.contains(&user_id);
                if liked {
                    post.likes.push(user_id);
                } else {
                    post.likes.retain(|id| *id != user_id);
                }
                post.updated_at = Utc::now();

                Ok(LikeToggle {
                    liked,
                    likes: post.likes.clone(),
                })
            })
            .await
    }

    /// Append a comment; comments are never edited or removed
    pub async fn add_comment(
        &self,
        post_id: Uuid,
        user_id: Uuid,
        content: String,
    ) -> Result<Comment> {
        self.store
            .mutate(|posts| -> Result<Comment> {
                let post = posts
                    .iter_mut()
                    .find(|p| p.id == post_id)
                    .ok_or_else(AppError::post_not_found)?;

                let now = Utc::now();
                let comment = Comment {
                    id: Uuid::new_v4(),
                    user_id,
                    content,
                    created_at: now,
                };
                post.comments.push(comment.clone());
                post.updated_at = now;

                Ok(comment)
            })
            .await
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool> {
        Ok(self.store.delete(id).await?)
    }
}
