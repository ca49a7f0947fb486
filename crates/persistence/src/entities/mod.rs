//! Database entity definitions.
//!
//! Entities are direct mappings to database rows.

pub mod export_config;
pub mod oauth_credential;

pub use export_config::ExportConfigEntity;
pub use oauth_credential::OAuthCredentialEntity;
