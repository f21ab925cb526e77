/// Middleware for the API server
///
/// - `auth`: Bearer token layers (required and optional)
/// - `error_log`: Logging of 4xx/5xx responses

pub mod auth;
pub mod error_log;
