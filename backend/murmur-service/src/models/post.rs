use super::UserSummary;
use chrono::{DateTime, Utc};
use record_store::Record;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: Uuid,
    /// Author
    pub user_id: Uuid,
    #[serde(default)]
    pub content: String,
    /// Stored upload filename
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub likes: Vec<Uuid>,
    #[serde(default)]
    pub comments: Vec<Comment>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Record for Post {
    fn id(&self) -> Uuid {
        self.id
    }
}

/// Comment owned by its parent post
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: Uuid,
    pub user_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Post with its author's summary, `null` when the author no longer exists
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostView {
    #[serde(flatten)]
    pub post: Post,
    pub user: Option<UserSummary>,
}

/// Result of a like toggle
#[derive(Debug, Clone, PartialEq)]
pub struct LikeToggle {
    pub liked: bool,
    pub likes: Vec<Uuid>,
}
