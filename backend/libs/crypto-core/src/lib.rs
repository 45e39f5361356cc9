//! Credential primitives shared by Murmur services
//!
//! - `password`: Argon2id hashing and verification
//! - `jwt`: HS256 bearer tokens carrying the user id
pub mod jwt;
pub mod password;

pub use jwt::{Claims, JwtKeys};
pub use password::{hash_password, verify_password};

#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    #[error("password hashing failed: {0}")]
    Hash(String),

    #[error("stored password hash is malformed: {0}")]
    InvalidHash(String),

    #[error("token encoding failed: {0}")]
    TokenEncoding(String),

    #[error("invalid token: {0}")]
    InvalidToken(String),

    #[error("token expired")]
    TokenExpired,
}

pub type Result<T> = std::result::Result<T, CryptoError>;
