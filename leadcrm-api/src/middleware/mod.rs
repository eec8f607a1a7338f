/// Middleware modules for the API server
///
/// - `auth`: Bearer token to principal resolution
/// - `security`: Security response headers

pub mod auth;
pub mod security;
