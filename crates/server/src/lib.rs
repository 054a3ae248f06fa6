//! formdrop: a minimal HTTP service collecting form submissions from static
//! landing pages into a single append-only text file.
//!
//! Three POST endpoints capture submissions (email, email+code, uid+level),
//! and a key-gated admin surface (`/admin`, `/download`) exposes the log.

pub mod admin;
pub mod auth;
pub mod config;
pub mod error;
pub mod http_server;
pub mod record;
pub mod store;
