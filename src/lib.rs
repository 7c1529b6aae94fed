//! kbsync library
//!
//! Core functionality for capturing, sanitizing, and replaying an Azure AI
//! Search configuration graph. It can be used both as a binary and as a
//! library for testing.

pub mod config;
pub mod export;
pub mod models;
pub mod restore;
pub mod sanitize;
pub mod search;
pub mod store;

// Re-export commonly used types for convenience
pub use export::{ExportCounts, Exporter};
pub use models::{CreatedResources, ResourceKind, SourceKind, created_resources};
pub use restore::{
    AiServicesCredentials, DeploySummary, LiveCredentials, deploy_store, restore_knowledge_base,
    restore_knowledge_source,
};
pub use sanitize::{
    CONTAINER_PLACEHOLDER, ENDPOINT_PLACEHOLDER, SECRET_PLACEHOLDER, SanitizeSummary, preview,
    sanitize_document, sanitize_store,
};
pub use search::{API_VERSION, ApiError, SearchApi, SearchClient};
pub use store::ConfigStore;
