//! Structural redaction of exported documents
//!
//! Replaces secrets, live Azure endpoints, and legacy container names with
//! fixed placeholder tokens so exported configuration can live in version
//! control. The classification tables below are the only encoding of what
//! counts as sensitive - new field names are additions to the tables, not
//! new logic.
//!
//! The transform is idempotent, and the restorer recognizes exactly the
//! placeholder tokens introduced here.

use serde_json::{Map, Value};
use url::Url;

use crate::models::ResourceKind;
use crate::store::ConfigStore;

/// Placeholder substituted for secret values
pub const SECRET_PLACEHOLDER: &str = "<REDACTED>";
/// Placeholder substituted for live Azure service endpoints
pub const ENDPOINT_PLACEHOLDER: &str = "<AZURE_ENDPOINT_PLACEHOLDER>";
/// Placeholder substituted for legacy blob container names
pub const CONTAINER_PLACEHOLDER: &str = "<BLOB_CONTAINER_PLACEHOLDER>";

/// Server-generated metadata keys rejected by the write protocol, dropped
/// wherever they appear
pub const PROTOCOL_METADATA_KEYS: &[&str] = &["@odata.context", "@odata.etag"];

/// Key names (normalized: lowercase, separators stripped) whose string
/// values are secrets
const SENSITIVE_KEYS: &[&str] = &[
    "apikey",
    "key",
    "connectionstring",
    "secret",
    "password",
    "token",
    "accesskey",
    "primarykey",
    "secondarykey",
];

/// Key names (normalized) whose values are service URLs
const URL_KEYS: &[&str] = &[
    "@odatacontext",
    "resourceuri",
    "uri",
    "url",
    "endpoint",
    "subdomainurl",
];

/// Host suffixes identifying Azure service endpoints (search, OpenAI,
/// cognitive services, blob storage, document database)
const AZURE_HOST_SUFFIXES: &[&str] = &[
    ".search.windows.net",
    ".openai.azure.com",
    ".cognitiveservices.azure.com",
    ".blob.core.windows.net",
    ".documents.azure.com",
];

/// Container names from earlier deployments that would identify the
/// originating environment
const LEGACY_CONTAINER_NAMES: &[&str] = &["kr-demos", "sample-documents", "foundry-iq-data"];

/// Lowercase a key and strip separator characters so that `api_key`,
/// `api-key` and `apiKey` all compare equal
fn normalize_key(key: &str) -> String {
    key.chars()
        .filter(|c| !matches!(c, '-' | '_' | '.'))
        .collect::<String>()
        .to_lowercase()
}

fn is_sensitive_key(key: &str) -> bool {
    SENSITIVE_KEYS.contains(&normalize_key(key).as_str())
}

fn is_url_key(key: &str) -> bool {
    URL_KEYS.contains(&normalize_key(key).as_str())
}

fn is_protocol_metadata(key: &str) -> bool {
    PROTOCOL_METADATA_KEYS.contains(&key)
}

/// Check whether a string is a live Azure service URL
pub fn is_azure_endpoint(value: &str) -> bool {
    let Ok(url) = Url::parse(value) else {
        return false;
    };
    if url.scheme() != "https" {
        return false;
    }
    let Some(host) = url.host_str() else {
        return false;
    };
    let host = host.to_ascii_lowercase();
    AZURE_HOST_SUFFIXES
        .iter()
        .any(|suffix| host.len() > suffix.len() && host.ends_with(suffix))
}

/// Apply the redaction transform, returning a new document.
///
/// Structure and key order are preserved exactly; only the values the rules
/// match are replaced, and only the protocol metadata keys are removed.
pub fn sanitize_document(doc: &Value) -> Value {
    match doc {
        Value::Object(map) => sanitize_object(map, ""),
        Value::Array(items) => sanitize_array("", items),
        other => other.clone(),
    }
}

/// Report whether sanitizing would change the document, without mutating
/// anything
pub fn preview(doc: &Value) -> bool {
    sanitize_document(doc) != *doc
}

fn sanitize_object(map: &Map<String, Value>, parent_key: &str) -> Value {
    let mut result = Map::new();
    for (key, value) in map {
        if is_protocol_metadata(key) {
            continue;
        }
        let sanitized = match value {
            Value::Object(inner) => sanitize_object(inner, key),
            Value::Array(items) => sanitize_array(key, items),
            other => sanitize_container_name(parent_key, key, other)
                .unwrap_or_else(|| sanitize_value(key, other)),
        };
        result.insert(key.clone(), sanitized);
    }
    Value::Object(result)
}

fn sanitize_array(parent_key: &str, items: &[Value]) -> Value {
    let sanitized = items
        .iter()
        .map(|item| match item {
            Value::Object(inner) => sanitize_object(inner, parent_key),
            Value::Array(nested) => sanitize_array(parent_key, nested),
            other => sanitize_value(parent_key, other),
        })
        .collect();
    Value::Array(sanitized)
}

/// Replace a legacy container name when the key sits in a container-name
/// position: a `containerName` field, or a `name` field directly under a
/// `container` block
fn sanitize_container_name(parent_key: &str, key: &str, value: &Value) -> Option<Value> {
    let key_lower = key.to_lowercase();
    let container_field = key_lower == "containername"
        || (key_lower == "name" && parent_key.eq_ignore_ascii_case("container"));
    if !container_field {
        return None;
    }
    let name = value.as_str()?;
    if LEGACY_CONTAINER_NAMES.contains(&name) {
        Some(Value::String(CONTAINER_PLACEHOLDER.to_string()))
    } else {
        None
    }
}

/// Sanitize a single scalar based on its key and content
fn sanitize_value(key: &str, value: &Value) -> Value {
    if value.is_null() {
        return Value::Null;
    }

    if is_sensitive_key(key) {
        // An explicit "null" marker is kept so the restorer can tell an
        // intentionally empty credential from a redacted one
        if let Some(s) = value.as_str() {
            if !s.is_empty() && s != "null" {
                return Value::String(SECRET_PLACEHOLDER.to_string());
            }
        }
        return value.clone();
    }

    if is_url_key(key) {
        if value.as_str().is_some_and(is_azure_endpoint) {
            return Value::String(ENDPOINT_PLACEHOLDER.to_string());
        }
        return value.clone();
    }

    // Defense against live URLs stored under keys the tables do not know
    if value.as_str().is_some_and(is_azure_endpoint) {
        return Value::String(ENDPOINT_PLACEHOLDER.to_string());
    }

    value.clone()
}

/// Outcome of a directory sweep
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SanitizeSummary {
    pub total: usize,
    pub modified: usize,
}

/// Sanitize every stored document, directory-by-directory in sorted order.
///
/// With `dry_run` set, nothing is written; the summary still reports how
/// many files a real run would modify.
pub fn sanitize_store(store: &ConfigStore, dry_run: bool) -> anyhow::Result<SanitizeSummary> {
    let mut summary = SanitizeSummary::default();

    let mut kinds = ResourceKind::all().to_vec();
    kinds.sort_by_key(|kind| kind.dir_name());

    for kind in kinds {
        let paths = store.document_paths(kind)?;
        if paths.is_empty() {
            continue;
        }
        tracing::info!("{}/", kind.dir_name());

        for path in paths {
            let Some(doc) = ConfigStore::read_document(&path) else {
                continue;
            };
            summary.total += 1;

            let sanitized = sanitize_document(&doc);
            let file = path
                .file_name()
                .and_then(|f| f.to_str())
                .unwrap_or_default();
            if sanitized == doc {
                tracing::info!("  no changes: {}", file);
                continue;
            }

            summary.modified += 1;
            if dry_run {
                tracing::info!("  would modify: {}", file);
            } else {
                ConfigStore::write_document(&path, &sanitized)?;
                tracing::info!("  sanitized: {}", file);
            }
        }
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_api_key_is_redacted() {
        let doc = json!({"apiKey": "abc123"});
        assert_eq!(sanitize_document(&doc), json!({"apiKey": SECRET_PLACEHOLDER}));
    }

    #[test]
    fn test_key_normalization_matches_separator_variants() {
        let doc = json!({
            "api_key": "s3cret",
            "connection-string": "DefaultEndpointsProtocol=https;AccountKey=x",
            "PrimaryKey": "s3cret"
        });
        let clean = sanitize_document(&doc);
        assert_eq!(clean["api_key"], SECRET_PLACEHOLDER);
        assert_eq!(clean["connection-string"], SECRET_PLACEHOLDER);
        assert_eq!(clean["PrimaryKey"], SECRET_PLACEHOLDER);
    }

    #[test]
    fn test_empty_and_null_marker_secrets_pass_through() {
        let doc = json!({"apiKey": "", "secret": "null", "token": null});
        assert_eq!(sanitize_document(&doc), doc);
    }

    #[test]
    fn test_azure_urls_replaced_under_url_keys_and_anywhere() {
        let doc = json!({
            "resourceUri": "https://my-aoai.openai.azure.com",
            "someField": "https://acct.blob.core.windows.net/container",
            "homepage": "https://example.com"
        });
        let clean = sanitize_document(&doc);
        assert_eq!(clean["resourceUri"], ENDPOINT_PLACEHOLDER);
        assert_eq!(clean["someField"], ENDPOINT_PLACEHOLDER);
        assert_eq!(clean["homepage"], "https://example.com");
    }

    #[test]
    fn test_url_shape_requires_https_and_subdomain() {
        assert!(is_azure_endpoint("https://svc.search.windows.net"));
        assert!(is_azure_endpoint(
            "https://svc.cognitiveservices.azure.com/path?q=1"
        ));
        assert!(!is_azure_endpoint("http://svc.search.windows.net"));
        assert!(!is_azure_endpoint("https://search.windows.net"));
        assert!(!is_azure_endpoint("not a url"));
    }

    #[test]
    fn test_protocol_metadata_dropped_everywhere() {
        let doc = json!({
            "@odata.context": "https://svc.search.windows.net/$metadata",
            "@odata.etag": "\"0x1234\"",
            "nested": {"@odata.etag": "\"0x9\"", "name": "n"}
        });
        let clean = sanitize_document(&doc);
        assert_eq!(clean, json!({"nested": {"name": "n"}}));
    }

    #[test]
    fn test_legacy_container_name_replaced_unknown_kept() {
        let doc = json!({
            "container": {"name": "kr-demos"},
            "containerName": "sample-documents",
            "other": {"name": "kr-demos"}
        });
        let clean = sanitize_document(&doc);
        assert_eq!(clean["container"]["name"], CONTAINER_PLACEHOLDER);
        assert_eq!(clean["containerName"], CONTAINER_PLACEHOLDER);
        // A `name` outside a container block is not a container name
        assert_eq!(clean["other"]["name"], "kr-demos");

        let untouched = json!({"containerName": "my-own-container"});
        assert_eq!(sanitize_document(&untouched), untouched);
    }

    #[test]
    fn test_arrays_are_walked_with_parent_key_context() {
        let doc = json!({
            "models": [
                {"apiKey": "k1", "modelName": "gpt-4o"},
                {"apiKey": "k2", "modelName": "text-embedding-3-large"}
            ]
        });
        let clean = sanitize_document(&doc);
        assert_eq!(clean["models"][0]["apiKey"], SECRET_PLACEHOLDER);
        assert_eq!(clean["models"][1]["apiKey"], SECRET_PLACEHOLDER);
        assert_eq!(clean["models"][0]["modelName"], "gpt-4o");
    }

    #[test]
    fn test_idempotent() {
        let doc = json!({
            "apiKey": "abc123",
            "endpoint": "https://svc.search.windows.net",
            "containerName": "foundry-iq-data",
            "@odata.etag": "\"0x1\""
        });
        let once = sanitize_document(&doc);
        let twice = sanitize_document(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_preview_reports_changes_without_mutation() {
        let doc = json!({"apiKey": "abc123"});
        assert!(preview(&doc));
        assert_eq!(doc, json!({"apiKey": "abc123"}));

        let clean = sanitize_document(&doc);
        assert!(!preview(&clean));
    }

    #[test]
    fn test_structure_preserved() {
        let doc = json!({
            "name": "idx1",
            "fields": [{"name": "id", "type": "Edm.String", "key": true}],
            "nested": {"deep": {"deeper": [1, 2, 3]}}
        });
        // `key: true` is a boolean under a sensitive key name - left alone
        assert_eq!(sanitize_document(&doc), doc);
    }
}
