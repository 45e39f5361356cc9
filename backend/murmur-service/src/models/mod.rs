/// Data structures for users, posts and comments
pub mod post;
pub mod user;

pub use post::{Comment, LikeToggle, Post, PostView};
pub use user::{NewUser, PublicUser, User, UserPatch, UserSummary};
