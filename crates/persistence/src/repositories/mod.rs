//! Repository implementations for database operations.

pub mod credential;
pub mod export_config;

pub use credential::CredentialRepository;
pub use export_config::ExportConfigRepository;
