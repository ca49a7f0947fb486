//! Domain layer for the Ads Exporter backend.
//!
//! This crate contains:
//! - Domain models (ExportConfig, ad entities, insights, credentials)
//! - Business logic services (recurrence, report dates, merging, column mapping)

pub mod models;
pub mod services;
