//! # Quillpress Shared Library
//!
//! Types, storage and business rules shared by the Quillpress API server.
//!
//! ## Module Organization
//!
//! - `auth`: Password hashing, session tokens, request identity and ownership checks
//! - `content`: Taxonomy reconciliation and the article query engine
//! - `db`: PostgreSQL pool and migrations
//! - `models`: Database rows and their SQL
//! - `store`: Storage trait seam with PostgreSQL and in-memory backends

pub mod auth;
pub mod content;
pub mod db;
pub mod models;
pub mod store;

/// Current version of the Quillpress shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
