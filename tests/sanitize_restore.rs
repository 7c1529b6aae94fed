//! Sanitize/restore round-trip tests
//!
//! Exercises the redaction transform and its inverse together: sanitizing a
//! live document and restoring it with the same credential values must
//! reproduce the original, except for the server-generated metadata the
//! write protocol rejects.

use serde_json::{Value, json};

use kbsync::restore::{
    AiServicesCredentials, LiveCredentials, restore_knowledge_base, restore_knowledge_source,
};
use kbsync::sanitize::{
    CONTAINER_PLACEHOLDER, ENDPOINT_PLACEHOLDER, SECRET_PLACEHOLDER, preview, sanitize_document,
    sanitize_store,
};
use kbsync::store::ConfigStore;
use kbsync::{ResourceKind, SourceKind};

const LIVE_CONNECTION_STRING: &str =
    "DefaultEndpointsProtocol=https;AccountName=acct;AccountKey=abc123;EndpointSuffix=core.windows.net";
const LIVE_OPENAI_ENDPOINT: &str = "https://my-aoai.openai.azure.com";
const LIVE_AI_SERVICES_ENDPOINT: &str = "https://my-ai.cognitiveservices.azure.com";

fn live_credentials() -> LiveCredentials {
    LiveCredentials {
        storage_connection_string: LIVE_CONNECTION_STRING.to_string(),
        blob_container: "foundry-iq-data".to_string(),
        openai_endpoint: LIVE_OPENAI_ENDPOINT.to_string(),
        openai_key: "aoai-key".to_string(),
        ai_services: Some(AiServicesCredentials {
            endpoint: LIVE_AI_SERVICES_ENDPOINT.to_string(),
            key: "ai-key".to_string(),
        }),
    }
}

/// A knowledge source document the way the service returns it
fn live_blob_source() -> Value {
    json!({
        "@odata.etag": "\"0x8DD\"",
        "name": "ks1",
        "kind": "azureBlob",
        "azureBlobParameters": {
            "connectionString": LIVE_CONNECTION_STRING,
            "containerName": "foundry-iq-data",
            "folderPath": "docs",
            "createdResources": {
                "index": "idx1",
                "indexer": "idxr1",
                "datasource": "ds1",
                "skillset": "ss1"
            },
            "ingestionParameters": {
                "embeddingModel": {
                    "modelName": "text-embedding-3-large",
                    "azureOpenAIParameters": {
                        "resourceUri": LIVE_OPENAI_ENDPOINT,
                        "apiKey": "aoai-key",
                        "deploymentId": "embed"
                    }
                },
                "chatCompletionModel": {
                    "azureOpenAIParameters": {
                        "resourceUri": LIVE_OPENAI_ENDPOINT,
                        "apiKey": "aoai-key",
                        "deploymentId": "chat"
                    }
                },
                "aiServices": {
                    "uri": LIVE_AI_SERVICES_ENDPOINT,
                    "apiKey": "ai-key"
                }
            }
        }
    })
}

fn live_knowledge_base() -> Value {
    json!({
        "@odata.context": "https://svc.search.windows.net/$metadata#knowledgebases/$entity",
        "@odata.etag": "\"0x8DE\"",
        "name": "kb1",
        "knowledgeSources": [{"name": "ks1"}],
        "models": [{
            "kind": "azureOpenAI",
            "azureOpenAIParameters": {
                "resourceUri": LIVE_OPENAI_ENDPOINT,
                "apiKey": "aoai-key",
                "deploymentId": "chat"
            }
        }]
    })
}

/// Strip the keys the round trip is allowed to lose
fn without_protocol_metadata(doc: &Value) -> Value {
    let mut clone = doc.clone();
    if let Some(map) = clone.as_object_mut() {
        map.remove("@odata.context");
        map.remove("@odata.etag");
    }
    clone
}

#[test]
fn test_sanitized_source_carries_no_live_values() {
    let clean = sanitize_document(&live_blob_source());
    let rendered = clean.to_string();

    assert!(!rendered.contains("aoai-key"));
    assert!(!rendered.contains("AccountKey"));
    assert!(!rendered.contains("openai.azure.com"));
    assert!(!rendered.contains("cognitiveservices.azure.com"));
    assert!(!rendered.contains("foundry-iq-data"));
    assert!(!rendered.contains("@odata"));

    // Non-sensitive configuration survives untouched
    assert_eq!(clean["azureBlobParameters"]["folderPath"], "docs");
    assert_eq!(
        clean["azureBlobParameters"]["createdResources"]["skillset"],
        "ss1"
    );
}

#[test]
fn test_source_round_trip_restores_original() {
    let original = live_blob_source();
    let mut restored = sanitize_document(&original);
    restore_knowledge_source(&mut restored, &live_credentials());

    assert_eq!(restored, without_protocol_metadata(&original));
}

#[test]
fn test_knowledge_base_round_trip_restores_original() {
    let original = live_knowledge_base();
    let mut restored = sanitize_document(&original);
    restore_knowledge_base(&mut restored, &live_credentials());

    assert_eq!(restored, without_protocol_metadata(&original));
}

#[test]
fn test_sanitize_is_idempotent_on_real_shapes() {
    for doc in [live_blob_source(), live_knowledge_base()] {
        let once = sanitize_document(&doc);
        assert_eq!(sanitize_document(&once), once);
    }
}

#[test]
fn test_preview_flips_after_sanitizing() {
    let doc = json!({"apiKey": "abc123"});
    assert!(preview(&doc));

    let clean = sanitize_document(&doc);
    assert_eq!(clean, json!({"apiKey": SECRET_PLACEHOLDER}));
    assert!(!preview(&clean));
}

#[test]
fn test_restore_without_ai_services_drops_capability_block() {
    let mut creds = live_credentials();
    creds.ai_services = None;

    let mut restored = sanitize_document(&live_blob_source());
    restore_knowledge_source(&mut restored, &creds);

    let ingestion = restored["azureBlobParameters"]["ingestionParameters"]
        .as_object()
        .unwrap();
    assert!(!ingestion.contains_key("aiServices"));
    assert!(!restored.to_string().contains(ENDPOINT_PLACEHOLDER));
    assert!(!restored.to_string().contains(SECRET_PLACEHOLDER));
}

#[test]
fn test_remote_source_passes_through_restore() {
    let mut doc = json!({
        "name": "ks-web",
        "kind": SourceKind::Web.as_str(),
        "webParameters": {"urls": ["https://example.com/docs"]}
    });
    let expected = doc.clone();
    restore_knowledge_source(&mut doc, &live_credentials());
    assert_eq!(doc, expected);
}

#[test]
fn test_sanitize_store_sweeps_directories_in_place() {
    let dir = tempfile::tempdir().unwrap();
    let store = ConfigStore::new(dir.path());
    store.ensure_layout().unwrap();

    store
        .write(ResourceKind::KnowledgeSource, "ks1", &live_blob_source())
        .unwrap();
    store
        .write(ResourceKind::KnowledgeBase, "kb1", &live_knowledge_base())
        .unwrap();
    store
        .write(ResourceKind::Index, "idx1", &json!({"name": "idx1", "fields": []}))
        .unwrap();

    // Dry run reports but does not touch the files
    let dry = sanitize_store(&store, true).unwrap();
    assert_eq!(dry.total, 3);
    assert_eq!(dry.modified, 2);
    let ks_path = store
        .kind_dir(ResourceKind::KnowledgeSource)
        .join("ks1.json");
    assert_eq!(
        ConfigStore::read_document(&ks_path),
        Some(live_blob_source())
    );

    // Real run rewrites only what changed
    let applied = sanitize_store(&store, false).unwrap();
    assert_eq!(applied.modified, 2);
    let stored = ConfigStore::read_document(&ks_path).unwrap();
    assert_eq!(
        stored["azureBlobParameters"]["containerName"],
        CONTAINER_PLACEHOLDER
    );

    // Second sweep finds nothing left to do
    let again = sanitize_store(&store, false).unwrap();
    assert_eq!(again.modified, 0);
}
