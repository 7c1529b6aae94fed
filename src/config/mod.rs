//! Runtime settings
//!
//! Every deployment-specific value arrives through the environment,
//! populated by the provisioning pipeline or a local `.env` file. Credential
//! acquisition against the cloud management plane happens outside this tool;
//! by the time kbsync runs, each collaborator has already resolved to an
//! endpoint, key, or connection string.
//!
//! Missing mandatory values fail here, at startup, before any traversal or
//! deployment begins.

use anyhow::{Result, bail};

use crate::restore::{AiServicesCredentials, LiveCredentials};

/// Blob container used when the environment does not override it
const DEFAULT_BLOB_CONTAINER: &str = "foundry-iq-data";

/// Connection settings for the search service itself
#[derive(Debug, Clone)]
pub struct SearchSettings {
    pub endpoint: String,
    pub api_key: String,
}

impl SearchSettings {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            endpoint: required("AZURE_SEARCH_ENDPOINT")?
                .trim_end_matches('/')
                .to_string(),
            api_key: required("AZURE_SEARCH_ADMIN_KEY")?,
        })
    }
}

/// Credential bundle for a restore run
pub fn live_credentials_from_env() -> Result<LiveCredentials> {
    let ai_services = match (
        optional("AZURE_AI_SERVICES_ENDPOINT"),
        optional("AZURE_AI_SERVICES_KEY"),
    ) {
        (Some(endpoint), Some(key)) => Some(AiServicesCredentials {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            key,
        }),
        (None, None) => {
            tracing::info!("AI Services not configured, skills will use the free tier");
            None
        }
        _ => bail!("AZURE_AI_SERVICES_ENDPOINT and AZURE_AI_SERVICES_KEY must be set together"),
    };

    Ok(LiveCredentials {
        storage_connection_string: required("AZURE_STORAGE_CONNECTION_STRING")?,
        blob_container: optional("AZURE_BLOB_CONTAINER_NAME")
            .unwrap_or_else(|| DEFAULT_BLOB_CONTAINER.to_string()),
        openai_endpoint: required("AZURE_OPENAI_ENDPOINT")?
            .trim_end_matches('/')
            .to_string(),
        openai_key: required("AZURE_OPENAI_KEY")?,
        ai_services,
    })
}

fn required(name: &str) -> Result<String> {
    match optional(name) {
        Some(value) => Ok(value),
        None => bail!("Required environment variable {} is not set", name),
    }
}

fn optional(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}
