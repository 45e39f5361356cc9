use chrono::{DateTime, Utc};
use record_store::Record;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Persisted user record, including the password hash.
///
/// Never serialize this to a client; project it through [`PublicUser`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    /// Argon2id PHC string
    pub password: String,
    #[serde(default)]
    pub profile_picture: Option<String>,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub followers: Vec<Uuid>,
    #[serde(default)]
    pub following: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    /// Persisted keys this version does not model, written back unchanged
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Record for User {
    fn id(&self) -> Uuid {
        self.id
    }
}

/// User as returned by the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub profile_picture: Option<String>,
    pub bio: String,
    pub followers: Vec<Uuid>,
    pub following: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            profile_picture: user.profile_picture,
            bio: user.bio,
            followers: user.followers,
            following: user.following,
            created_at: user.created_at,
        }
    }
}

/// Author block embedded in posts and follower lists
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: Uuid,
    pub username: String,
    pub profile_picture: Option<String>,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            profile_picture: user.profile_picture.clone(),
        }
    }
}

/// Registration input. Fields are optional so a missing one is reported as
/// a validation failure rather than a JSON parse error.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewUser {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// Profile update. `profilePicture: null` clears the picture; an absent key
/// leaves it untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPatch {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub profile_picture: Option<Option<String>>,
    #[serde(default)]
    pub password: Option<String>,
}

fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_user_has_no_password() {
        let user = User {
            id: Uuid::new_v4(),
            username: "a".into(),
            email: "a@x.com".into(),
            password: "$argon2id$secret".into(),
            profile_picture: None,
            bio: String::new(),
            followers: vec![],
            following: vec![],
            created_at: Utc::now(),
            extra: Map::new(),
        };

        let json = serde_json::to_value(PublicUser::from(user)).unwrap();
        assert!(json.get("password").is_none());
        assert!(json.get("profilePicture").unwrap().is_null());
        assert_eq!(json["bio"], "");
    }

    #[test]
    fn test_user_defaults_for_sparse_record() {
        let json = serde_json::json!({
            "id": Uuid::new_v4(),
            "username": "b",
            "email": "b@x.com",
            "password": "hash",
            "createdAt": "2024-05-01T12:00:00.000Z"
        });

        let user: User = serde_json::from_value(json).unwrap();
        assert!(user.followers.is_empty());
        assert!(user.profile_picture.is_none());
        assert_eq!(user.bio, "");
    }

    #[test]
    fn test_user_keeps_unmodelled_keys() {
        let json = serde_json::json!({
            "id": Uuid::new_v4(),
            "username": "c",
            "email": "c@x.com",
            "password": "hash",
            "createdAt": "2024-05-01T12:00:00.000Z",
            "location": "Lisbon"
        });

        let user: User = serde_json::from_value(json).unwrap();
        assert_eq!(user.extra.get("location"), Some(&Value::from("Lisbon")));

        let written = serde_json::to_value(&user).unwrap();
        assert_eq!(written["location"], "Lisbon");
        assert!(serde_json::to_value(PublicUser::from(user))
            .unwrap()
            .get("location")
            .is_none());
    }

    #[test]
    fn test_patch_distinguishes_null_from_absent() {
        let cleared: UserPatch = serde_json::from_str(r#"{"profilePicture": null}"#).unwrap();
        assert_eq!(cleared.profile_picture, Some(None));

        let untouched: UserPatch = serde_json::from_str(r#"{"bio": "hi"}"#).unwrap();
        assert_eq!(untouched.profile_picture, None);
        assert_eq!(untouched.bio.as_deref(), Some("hi"));
    }
}
