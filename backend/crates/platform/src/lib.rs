//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Password hashing (Argon2id, tunable cost, off the async executor)
//! - Environment-variable configuration helpers
//! - TLS listener for `axum::serve`

pub mod config;
pub mod password;
pub mod tls;
