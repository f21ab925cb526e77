//! # Quillpress API Server Library
//!
//! HTTP surface of Quillpress: accounts, articles, categories and tags.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration from the environment
//! - `error`: Error type and its HTTP mapping
//! - `middleware`: Auth layers and error logging
//! - `response`: Success/error envelope
//! - `routes`: Route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod response;
pub mod routes;
