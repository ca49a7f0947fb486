//! Shared utilities for the Ads Exporter backend.
//!
//! This crate provides common functionality used across the other crates:
//! - A1 spreadsheet notation (column letters, cells, ranges)

pub mod a1;
