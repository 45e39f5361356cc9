/// Business logic layer
pub mod posts;
pub mod uploads;

pub use posts::PostService;
pub use uploads::{UploadStore, UploadedImage};
