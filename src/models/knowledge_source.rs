//! Knowledge source kinds and dependent-resource resolution
//!
//! A knowledge source is polymorphic over its `kind` discriminator. Indexed
//! kinds reference or generate an indexer pipeline (index, indexer, data
//! source, skillset); remote kinds query their backend directly and own no
//! generated resources. This module is the single place that knows where
//! each kind keeps the names of its dependent resources - traversal code
//! must call through it instead of inspecting the discriminator ad hoc.

use serde_json::Value;

/// Enumeration of known knowledge source kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    // Indexed sources (reference or generate an indexer pipeline)
    SearchIndex,
    AzureBlob,
    IndexedOneLake,
    IndexedSharePoint,
    // Remote sources (query their backend directly)
    RemoteSharePoint,
    Web,
}

impl SourceKind {
    /// Get the wire-format discriminator value
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::SearchIndex => "searchIndex",
            SourceKind::AzureBlob => "azureBlob",
            SourceKind::IndexedOneLake => "indexedOneLake",
            SourceKind::IndexedSharePoint => "indexedSharePoint",
            SourceKind::RemoteSharePoint => "remoteSharePoint",
            SourceKind::Web => "web",
        }
    }

    /// Try to parse a discriminator value, returning None if unrecognized
    pub fn parse_optional(s: &str) -> Option<Self> {
        match s {
            "searchIndex" => Some(SourceKind::SearchIndex),
            "azureBlob" => Some(SourceKind::AzureBlob),
            "indexedOneLake" => Some(SourceKind::IndexedOneLake),
            "indexedSharePoint" => Some(SourceKind::IndexedSharePoint),
            "remoteSharePoint" => Some(SourceKind::RemoteSharePoint),
            "web" => Some(SourceKind::Web),
            _ => None,
        }
    }

    /// Key of the kind-specific parameter block inside the document
    pub fn parameters_key(&self) -> &'static str {
        match self {
            SourceKind::SearchIndex => "searchIndexParameters",
            SourceKind::AzureBlob => "azureBlobParameters",
            SourceKind::IndexedOneLake => "indexedOneLakeParameters",
            SourceKind::IndexedSharePoint => "indexedSharePointParameters",
            SourceKind::RemoteSharePoint => "remoteSharePointParameters",
            SourceKind::Web => "webParameters",
        }
    }

    /// Whether this kind auto-generates an indexer pipeline on the service
    pub fn generates_pipeline(&self) -> bool {
        matches!(
            self,
            SourceKind::AzureBlob | SourceKind::IndexedOneLake | SourceKind::IndexedSharePoint
        )
    }

    /// Get all known source kinds
    pub fn all() -> &'static [Self] {
        &[
            SourceKind::SearchIndex,
            SourceKind::AzureBlob,
            SourceKind::IndexedOneLake,
            SourceKind::IndexedSharePoint,
            SourceKind::RemoteSharePoint,
            SourceKind::Web,
        ]
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Dependent resource names referenced by a knowledge source
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreatedResources {
    pub index_name: Option<String>,
    pub indexer_name: Option<String>,
    pub data_source_name: Option<String>,
    pub skillset_name: Option<String>,
}

impl CreatedResources {
    pub fn is_empty(&self) -> bool {
        self.index_name.is_none()
            && self.indexer_name.is_none()
            && self.data_source_name.is_none()
            && self.skillset_name.is_none()
    }
}

/// Extract dependent resource names from a knowledge source document based
/// on its kind.
///
/// - `searchIndex` wraps an existing index: the name lives at
///   `searchIndexParameters.searchIndexName` and nothing else is generated
/// - `azureBlob` / `indexedOneLake` / `indexedSharePoint` keep all four
///   generated names under `<kind>Parameters.createdResources`
/// - remote kinds have no indexer pipeline
///
/// Unknown kinds resolve to no dependents - schema additions the tool does
/// not know about yet must not break traversal.
pub fn created_resources(doc: &Value) -> CreatedResources {
    let kind_str = doc.get("kind").and_then(|k| k.as_str()).unwrap_or("");

    let Some(kind) = SourceKind::parse_optional(kind_str) else {
        tracing::warn!("Unknown knowledge source kind: {}", kind_str);
        return CreatedResources::default();
    };

    let params = doc.get(kind.parameters_key());

    match kind {
        SourceKind::SearchIndex => CreatedResources {
            index_name: params
                .and_then(|p| p.get("searchIndexName"))
                .and_then(|n| n.as_str())
                .map(String::from),
            ..Default::default()
        },
        SourceKind::AzureBlob | SourceKind::IndexedOneLake | SourceKind::IndexedSharePoint => {
            let created = params.and_then(|p| p.get("createdResources"));
            let name_of = |field: &str| {
                created
                    .and_then(|c| c.get(field))
                    .and_then(|n| n.as_str())
                    .map(String::from)
            };
            CreatedResources {
                index_name: name_of("index"),
                indexer_name: name_of("indexer"),
                data_source_name: name_of("datasource"),
                skillset_name: name_of("skillset"),
            }
        }
        SourceKind::RemoteSharePoint | SourceKind::Web => {
            tracing::info!(
                "Remote knowledge source (kind={}), no indexer pipeline",
                kind
            );
            CreatedResources::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_search_index_resolves_index_only() {
        let ks = json!({
            "name": "ks-wrap",
            "kind": "searchIndex",
            "searchIndexParameters": { "searchIndexName": "existing-idx" }
        });

        let deps = created_resources(&ks);
        assert_eq!(deps.index_name.as_deref(), Some("existing-idx"));
        assert_eq!(deps.indexer_name, None);
        assert_eq!(deps.data_source_name, None);
        assert_eq!(deps.skillset_name, None);
    }

    #[test]
    fn test_blob_resolves_created_resources() {
        let ks = json!({
            "name": "ks-blob",
            "kind": "azureBlob",
            "azureBlobParameters": {
                "connectionString": "<REDACTED>",
                "createdResources": {
                    "index": "idx1",
                    "indexer": "idxr1",
                    "datasource": "ds1",
                    "skillset": "ss1"
                }
            }
        });

        let deps = created_resources(&ks);
        assert_eq!(deps.index_name.as_deref(), Some("idx1"));
        assert_eq!(deps.indexer_name.as_deref(), Some("idxr1"));
        assert_eq!(deps.data_source_name.as_deref(), Some("ds1"));
        assert_eq!(deps.skillset_name.as_deref(), Some("ss1"));
    }

    #[test]
    fn test_one_lake_and_share_point_use_their_own_blocks() {
        for (kind, block) in [
            ("indexedOneLake", "indexedOneLakeParameters"),
            ("indexedSharePoint", "indexedSharePointParameters"),
        ] {
            let ks = json!({
                "kind": kind,
                (block): { "createdResources": { "index": "idx", "indexer": "idxr" } }
            });

            let deps = created_resources(&ks);
            assert_eq!(deps.index_name.as_deref(), Some("idx"), "kind {}", kind);
            assert_eq!(deps.indexer_name.as_deref(), Some("idxr"), "kind {}", kind);
            assert_eq!(deps.skillset_name, None, "kind {}", kind);
        }
    }

    #[test]
    fn test_remote_kinds_have_no_dependents() {
        for kind in ["remoteSharePoint", "web"] {
            let ks = json!({ "kind": kind });
            assert!(created_resources(&ks).is_empty(), "kind {}", kind);
        }
    }

    #[test]
    fn test_unknown_kind_is_not_an_error() {
        let ks = json!({ "kind": "somethingNew", "somethingNewParameters": {} });
        assert!(created_resources(&ks).is_empty());

        // Missing discriminator behaves the same way
        assert!(created_resources(&json!({})).is_empty());
    }

    #[test]
    fn test_missing_parameter_block_resolves_to_absent() {
        let ks = json!({ "kind": "azureBlob" });
        assert!(created_resources(&ks).is_empty());
    }

    #[test]
    fn test_generates_pipeline() {
        assert!(SourceKind::AzureBlob.generates_pipeline());
        assert!(SourceKind::IndexedOneLake.generates_pipeline());
        assert!(!SourceKind::SearchIndex.generates_pipeline());
        assert!(!SourceKind::Web.generates_pipeline());
    }

    #[test]
    fn test_all_round_trips_through_parse() {
        let all = SourceKind::all();
        assert_eq!(all.len(), 6);
        for kind in all {
            assert_eq!(SourceKind::parse_optional(kind.as_str()), Some(*kind));
        }
    }
}
