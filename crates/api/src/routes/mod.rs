//! HTTP route handlers.

pub mod export_configs;
pub mod health;
