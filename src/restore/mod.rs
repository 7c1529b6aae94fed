//! Placeholder restoration and deployment
//!
//! The inverse of sanitization: scans sanitized documents for the fixed
//! placeholder tokens, injects live credential values, and create-or-replaces
//! each document on the target service. Knowledge sources deploy before the
//! knowledge bases that reference them; the service regenerates the indexer
//! pipeline for the source kinds that own one.

use serde_json::{Map, Value};

use crate::models::{ResourceKind, SourceKind};
use crate::sanitize::{
    CONTAINER_PLACEHOLDER, ENDPOINT_PLACEHOLDER, PROTOCOL_METADATA_KEYS, SECRET_PLACEHOLDER,
};
use crate::search::SearchApi;
use crate::store::ConfigStore;

/// Live values injected in place of placeholder tokens.
///
/// Immutable for the duration of a run and shared by reference across every
/// document. The search service's own endpoint and admin key live in the
/// [`crate::search::SearchClient`] used for deployment.
#[derive(Debug, Clone)]
pub struct LiveCredentials {
    pub storage_connection_string: String,
    pub blob_container: String,
    pub openai_endpoint: String,
    pub openai_key: String,
    /// Multi-service AI account for built-in skills. Absence is a valid
    /// outcome: the capability block is removed and ingestion falls back to
    /// the free tier.
    pub ai_services: Option<AiServicesCredentials>,
}

#[derive(Debug, Clone)]
pub struct AiServicesCredentials {
    pub endpoint: String,
    pub key: String,
}

/// Remove the server-generated metadata keys the write protocol rejects.
/// Idempotent - the sanitizer already drops them, this is defense for
/// documents that skipped sanitization.
fn strip_protocol_metadata(doc: &mut Value) {
    if let Some(map) = doc.as_object_mut() {
        for key in PROTOCOL_METADATA_KEYS {
            map.remove(*key);
        }
    }
}

/// Substitute endpoint/secret placeholders inside an `azureOpenAIParameters`
/// block, if the containing map carries one
fn restore_aoai_parameters(container: &mut Map<String, Value>, creds: &LiveCredentials) {
    let Some(Value::Object(aoai)) = container.get_mut("azureOpenAIParameters") else {
        return;
    };
    if aoai.get("resourceUri").and_then(Value::as_str) == Some(ENDPOINT_PLACEHOLDER) {
        aoai.insert(
            "resourceUri".to_string(),
            Value::String(creds.openai_endpoint.clone()),
        );
    }
    if aoai.get("apiKey").and_then(Value::as_str) == Some(SECRET_PLACEHOLDER) {
        aoai.insert(
            "apiKey".to_string(),
            Value::String(creds.openai_key.clone()),
        );
    }
}

/// Restore the ingestion block shared by the indexed source kinds:
/// embedding/chat-completion model credentials, plus the optional
/// AI-services capability block
fn restore_ingestion_parameters(ingestion: &mut Map<String, Value>, creds: &LiveCredentials) {
    for model_key in ["embeddingModel", "chatCompletionModel"] {
        if let Some(Value::Object(model)) = ingestion.get_mut(model_key) {
            restore_aoai_parameters(model, creds);
        }
    }

    // Without a substitute credential the capability block must go away
    // entirely, so the deployed source falls back to the free tier instead
    // of carrying a dead reference
    let has_ai_services_block = ingestion.get("aiServices").is_some_and(Value::is_object);
    if !has_ai_services_block {
        return;
    }
    match &creds.ai_services {
        Some(ai) => {
            if let Some(Value::Object(block)) = ingestion.get_mut("aiServices") {
                if block.get("uri").and_then(Value::as_str) == Some(ENDPOINT_PLACEHOLDER) {
                    block.insert("uri".to_string(), Value::String(ai.endpoint.clone()));
                }
                if block.get("apiKey").and_then(Value::as_str) == Some(SECRET_PLACEHOLDER) {
                    block.insert("apiKey".to_string(), Value::String(ai.key.clone()));
                }
            }
        }
        None => {
            ingestion.remove("aiServices");
        }
    }
}

/// Inject live values into a sanitized knowledge source document
pub fn restore_knowledge_source(doc: &mut Value, creds: &LiveCredentials) {
    strip_protocol_metadata(doc);

    // Only the pipeline-generating kinds carry parameter blocks the
    // sanitizer touches
    for kind in SourceKind::all().iter().filter(|k| k.generates_pipeline()) {
        let Some(Value::Object(params)) = doc.get_mut(kind.parameters_key()) else {
            continue;
        };

        if *kind == SourceKind::AzureBlob {
            // Placeholder, null, empty and absent all mean "fill in"
            let needs_connection = match params.get("connectionString") {
                None | Some(Value::Null) => true,
                Some(Value::String(s)) => s.is_empty() || s == SECRET_PLACEHOLDER,
                _ => false,
            };
            if needs_connection {
                params.insert(
                    "connectionString".to_string(),
                    Value::String(creds.storage_connection_string.clone()),
                );
            }

            if params.get("containerName").and_then(Value::as_str) == Some(CONTAINER_PLACEHOLDER) {
                params.insert(
                    "containerName".to_string(),
                    Value::String(creds.blob_container.clone()),
                );
            }
        }

        if let Some(Value::Object(ingestion)) = params.get_mut("ingestionParameters") {
            restore_ingestion_parameters(ingestion, creds);
        }
    }
}

/// Inject live values into a sanitized knowledge base document.
///
/// Handles the current array-based `models` schema and the older
/// single-block `inferenceParameters` schema.
pub fn restore_knowledge_base(doc: &mut Value, creds: &LiveCredentials) {
    strip_protocol_metadata(doc);

    if let Some(Value::Array(models)) = doc.get_mut("models") {
        for model in models {
            if let Some(map) = model.as_object_mut() {
                restore_aoai_parameters(map, creds);
            }
        }
    }

    if let Some(Value::Object(inference)) = doc.get_mut("inferenceParameters") {
        restore_aoai_parameters(inference, creds);
    }
}

/// Totals reported after a deployment run
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DeploySummary {
    pub knowledge_sources: usize,
    pub knowledge_bases: usize,
}

/// Restore and deploy every sanitized document in the store.
///
/// Knowledge sources deploy first, then knowledge bases, each directory in
/// sorted file order. The first rejected deployment aborts the run with the
/// service's response body; documents already deployed stay deployed.
pub async fn deploy_store(
    api: &dyn SearchApi,
    store: &ConfigStore,
    creds: &LiveCredentials,
) -> anyhow::Result<DeploySummary> {
    let mut summary = DeploySummary::default();

    for path in store.document_paths(ResourceKind::KnowledgeSource)? {
        let Some(name) = ConfigStore::document_name(&path).map(String::from) else {
            continue;
        };
        let Some(mut doc) = ConfigStore::read_document(&path) else {
            continue;
        };
        restore_knowledge_source(&mut doc, creds);
        tracing::info!("Deploying knowledge source: {}", name);
        api.put_resource(ResourceKind::KnowledgeSource, &name, &doc)
            .await?;
        summary.knowledge_sources += 1;
    }

    for path in store.document_paths(ResourceKind::KnowledgeBase)? {
        let Some(name) = ConfigStore::document_name(&path).map(String::from) else {
            continue;
        };
        let Some(mut doc) = ConfigStore::read_document(&path) else {
            continue;
        };
        restore_knowledge_base(&mut doc, creds);
        tracing::info!("Deploying knowledge base: {}", name);
        api.put_resource(ResourceKind::KnowledgeBase, &name, &doc)
            .await?;
        summary.knowledge_bases += 1;
    }

    Ok(summary)
}
