/// Post business logic: author enrichment, ownership checks and image
/// lifecycle around the posts repository
use crate::db::{PostRepository, UserRepository};
use crate::error::{AppError, Result};
use crate::models::{Comment, LikeToggle, Post, PostView, UserSummary};
use crate::services::uploads::{UploadStore, UploadedImage};
use std::collections::HashMap;
use uuid::Uuid;

#[derive(Clone)]
pub struct PostService {
    posts: PostRepository,
    users: UserRepository,
    uploads: UploadStore,
}

impl PostService {
    pub fn new(posts: PostRepository, users: UserRepository, uploads: UploadStore) -> Self {
        Self {
            posts,
            users,
            uploads,
        }
    }

    /// Every post, newest first, with author summaries
    pub async fn list_posts(&self) -> Result<Vec<PostView>> {
        let posts = self.posts.find_all_newest_first().await?;
        self.with_authors(posts).await
    }

    /// One author's posts, newest first. An unknown author yields an empty list.
    pub async fn list_user_posts(&self, user_id: Uuid) -> Result<Vec<PostView>> {
        let posts = self.posts.find_by_user(user_id).await?;
        self.with_authors(posts).await
    }

    pub async fn get_post(&self, post_id: Uuid) -> Result<PostView> {
        let post = self
            .posts
            .find_by_id(post_id)
            .await?
            .ok_or_else(AppError::post_not_found)?;

        let mut views = self.with_authors(vec![post]).await?;
        views.pop().ok_or_else(AppError::post_not_found)
    }

    /// Create a post from optional text and an optional image.
    ///
    /// At least one must be present. The image is written first; if the
    /// post record cannot be stored the file is removed again.
    pub async fn create_post(
        &self,
        author_id: Uuid,
        content: Option<String>,
        image: Option<UploadedImage>,
    ) -> Result<PostView> {
        let content = content.filter(|c| !c.is_empty());
        let image = image.filter(|i| !i.data.is_empty());
        if content.is_none() && image.is_none() {
            return Err(AppError::Validation(
                "Content or image is required".to_string(),
            ));
        }

        let stored_image = match &image {
            Some(image) => Some(self.uploads.save(image).await?),
            None => None,
        };

        let post = match self
            .posts
            .create(author_id, content.unwrap_or_default(), stored_image.clone())
            .await
        {
            Ok(post) => post,
            Err(e) => {
                if let Some(name) = &stored_image {
                    self.uploads.remove(name).await;
                }
                return Err(e);
            }
        };

        tracing::info!(
            post_id = %post.id,
            user_id = %author_id,
            has_image = post.image.is_some(),
            "post created"
        );

        let user = self
            .users
            .find_by_id(author_id)
            .await?
            .map(|u| UserSummary {
                id: u.id,
                username: u.username,
                profile_picture: u.profile_picture,
            });
        Ok(PostView { post, user })
    }

    pub async fn toggle_like(&self, post_id: Uuid, user_id: Uuid) -> Result<LikeToggle> {
        self.posts.toggle_like(post_id, user_id).await
    }

    pub async fn add_comment(
        &self,
        post_id: Uuid,
        user_id: Uuid,
        content: String,
    ) -> Result<Comment> {
        if content.is_empty() {
            return Err(AppError::Validation(
                "Comment content is required".to_string(),
            ));
        }
        self.posts.add_comment(post_id, user_id, content).await
    }

    /// Delete a post owned by `actor_id` and remove its image
    pub async fn delete_post(&self, post_id: Uuid, actor_id: Uuid) -> Result<()> {
        let post = self
            .posts
            .find_by_id(post_id)
            .await?
            .ok_or_else(AppError::post_not_found)?;

        if post.user_id != actor_id {
            tracing::warn!(%post_id, %actor_id, "delete refused: not the author");
            return Err(AppError::Forbidden(
                "Not authorized to delete this post".to_string(),
            ));
        }

        if !self.posts.delete(post_id).await? {
            return Err(AppError::post_not_found());
        }
        if let Some(image) = &post.image {
            self.uploads.remove(image).await;
        }

        tracing::info!(%post_id, "post deleted");
        Ok(())
    }

    async fn with_authors(&self, posts: Vec<Post>) -> Result<Vec<PostView>> {
        let authors: HashMap<Uuid, UserSummary> = self.users.summary_index().await?;

        Ok(posts
            .into_iter()
            .map(|post| {
                let user = authors.get(&post.user_id).cloned();
                PostView { post, user }
            })
            .collect())
    }
}
