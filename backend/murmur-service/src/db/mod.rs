/// Repositories over the record store
///
/// Each repository owns one collection (`users.json`, `posts.json`) and adds
/// the entity-specific shaping on top of the generic store.
pub mod post_repo;
pub mod user_repo;

pub use post_repo::PostRepository;
pub use user_repo::{Registration, UserRepository};
