//! PaperGraph Common Library
//!
//! Shared code for the PaperGraph services including:
//! - Domain models (papers, related-paper stubs)
//! - In-memory TTL caching
//! - Retry with exponential backoff
//! - arXiv export API client
//! - Database entities and repository
//! - Error types and handling
//! - Configuration management
//! - Metrics and observability

pub mod arxiv;
pub mod cache;
pub mod config;
pub mod db;
pub mod errors;
pub mod metrics;
pub mod models;
pub mod retry;

// Re-export commonly used types
pub use config::AppConfig;
pub use errors::{AppError, Result};
pub use models::{Paper, PaperStub};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
