use crate::error::{AppError, Result};
use crate::models::{PublicUser, User, UserPatch, UserSummary};
use chrono::Utc;
use crypto_core::{hash_password, verify_password};
use record_store::RecordStore;
use serde_json::{Map, Value};
use std::collections::HashMap;
use uuid::Uuid;

/// Validated registration data
#[derive(Debug, Clone)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Users collection with password hashing and public projections
#[derive(Clone)]
pub struct UserRepository {
    store: RecordStore<User>,
}

impl UserRepository {
    pub fn new(store: RecordStore<User>) -> Self {
        Self { store }
    }

    /// Create a user after checking email and username uniqueness.
    ///
    /// The check and the append happen inside one exclusive scope, so two
    /// concurrent registrations with the same email cannot both succeed.
    pub async fn create(&self, registration: Registration) -> Result<PublicUser> {
        let password = hash_password(&registration.password)?;
        let user = User {
            id: Uuid::new_v4(),
            username: registration.username,
            email: registration.email,
            password,
            profile_picture: None,
            bio: String::new(),
            followers: Vec::new(),
            following: Vec::new(),
            created_at: Utc::now(),
            extra: Map::new(),
        };

        let created = self
            .store
            .mutate(move |users| {
                if users.iter().any(|u| u.email == user.email) {
                    return Err(AppError::Conflict("User already exists".to_string()));
                }
                if users.iter().any(|u| u.username == user.username) {
                    return Err(AppError::Conflict("Username already taken".to_string()));
                }
                users.push(user.clone());
                Ok(user)
            })
            .await?;

        tracing::info!(user_id = %created.id, username = %created.username, "user registered");
        Ok(created.into())
    }

    pub async fn find_all(&self) -> Result<Vec<PublicUser>> {
        let users = self.store.find_all().await?;
        Ok(users.into_iter().map(PublicUser::from).collect())
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<PublicUser>> {
        Ok(self.store.find_by_id(id).await?.map(PublicUser::from))
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<PublicUser>> {
        let user = self.store.find_by_field("username", username).await?;
        Ok(user.map(PublicUser::from))
    }

    /// Look up by email and check the password. `None` covers both an unknown
    /// email and a wrong password.
    pub async fn verify_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<PublicUser>> {
        let Some(user) = self.store.find_by_field("email", email).await? else {
            return Ok(None);
        };

        if verify_password(password, &user.password)? {
            Ok(Some(user.into()))
        } else {
            Ok(None)
        }
    }

    /// Apply a profile patch. Returns `None` when the user does not exist.
    ///
    /// An empty username or password in the patch is ignored. A username
    /// held by another user is rejected with a conflict.
    pub async fn update_profile(&self, id: Uuid, patch: UserPatch) -> Result<Option<PublicUser>> {
        let mut fields = Map::new();
        let new_username = patch.username.filter(|u| !u.is_empty());

        if let Some(username) = &new_username {
            fields.insert("username".into(), Value::String(username.clone()));
        }
        if let Some(bio) = patch.bio {
            fields.insert("bio".into(), Value::String(bio));
        }
        if let Some(picture) = patch.profile_picture {
            fields.insert(
                "profilePicture".into(),
                picture.map(Value::String).unwrap_or(Value::Null),
            );
        }
        if let Some(password) = patch.password.filter(|p| !p.is_empty()) {
            fields.insert("password".into(), Value::String(hash_password(&password)?));
        }

        let updated = self
            .store
            .update_checked(id, Value::Object(fields), |users| {
                let taken = new_username
                    .as_ref()
                    .is_some_and(|name| users.iter().any(|u| &u.username == name && u.id != id));
                if taken {
                    return Err(AppError::Conflict("Username already taken".to_string()));
                }
                Ok(())
            })
            .await?;

        Ok(updated.map(PublicUser::from))
    }

    /// Toggle whether `actor_id` follows `target_id`; returns the new state.
    ///
    /// Both records change in a single write of the users collection.
    pub async fn toggle_follow(&self, actor_id: Uuid, target_id: Uuid) -> Result<bool> {
        if actor_id == target_id {
            return Err(AppError::Validation("Cannot follow yourself".to_string()));
        }

        self.store
            .mutate(|users| -> Result<bool> {
                let actor = users
                    .iter()
                    .position(|u| u.id == actor_id)
                    .ok_or_else(AppError::user_not_found)?;
                let target = users
                    .iter()
                    .position(|u| u.id == target_id)
                    .ok_or_else(AppError::user_not_found)?;

                let now_following = !users[actor].following.contains(&target_id);
                if now_following {
                    users[actor].following.push(target_id);
                    if !users[target].followers.contains(&actor_id) {
                        users[target].followers.push(actor_id);
                    }
                } else {
                    users[actor].following.retain(|id| *id != target_id);
                    users[target].followers.retain(|id| *id != actor_id);
                }

                tracing::debug!(%actor_id, %target_id, now_following, "follow toggled");
                Ok(now_following)
            })
            .await
    }

    /// Summaries of a user's followers, skipping ids that no longer resolve
    pub async fn followers_of(&self, id: Uuid) -> Result<Option<Vec<UserSummary>>> {
        self.connections(id, |user| &user.followers).await
    }

    /// Summaries of the users someone follows, skipping dangling ids
    pub async fn following_of(&self, id: Uuid) -> Result<Option<Vec<UserSummary>>> {
        self.connections(id, |user| &user.following).await
    }

    async fn connections<F>(&self, id: Uuid, edges: F) -> Result<Option<Vec<UserSummary>>>
    where
        F: Fn(&User) -> &Vec<Uuid>,
    {
        let users = self.store.find_all().await?;
        let Some(user) = users.iter().find(|u| u.id == id) else {
            return Ok(None);
        };

        let summaries = edges(user)
            .iter()
            .filter_map(|other| users.iter().find(|u| u.id == *other))
            .map(UserSummary::from)
            .collect();
        Ok(Some(summaries))
    }

    /// Author summaries keyed by id, read in one pass
    pub async fn summary_index(&self) -> Result<HashMap<Uuid, UserSummary>> {
        let users = self.store.find_all().await?;
        Ok(users.iter().map(|u| (u.id, UserSummary::from(u))).collect())
    }
}
