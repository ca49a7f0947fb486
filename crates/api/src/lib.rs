//! Ads Exporter API: HTTP surface, background scheduler and upstream clients.

pub mod app;
pub mod config;
pub mod error;
pub mod jobs;
pub mod middleware;
pub mod routes;
pub mod services;
