/// Authentication primitives
///
/// - [`password`]: Argon2id password hashing and placeholder secrets
/// - [`jwt`]: HS256 access and refresh tokens
///
/// Turning a token into a [`crate::identity::Principal`] needs storage and
/// happens in the API's auth layer.

pub mod jwt;
pub mod password;
