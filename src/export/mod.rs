//! Configuration graph export
//!
//! Walks the live configuration graph starting from named knowledge base
//! roots, resolves kind-dependent dependency edges, deduplicates shared
//! nodes, and persists each unique node as one document in the store.
//!
//! Dedup state is owned by the exporter instance for the duration of one
//! run; two runs never share visited sets.

use std::collections::HashSet;
use std::fmt;

use anyhow::Result;
use serde_json::Value;

use crate::models::{ResourceKind, created_resources};
use crate::search::{ApiError, SearchApi};
use crate::store::ConfigStore;

/// Per-kind totals reported after a run
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ExportCounts {
    pub knowledge_bases: usize,
    pub knowledge_sources: usize,
    pub indexes: usize,
    pub indexers: usize,
    pub data_sources: usize,
    pub skillsets: usize,
    pub synonym_maps: usize,
}

impl ExportCounts {
    fn record(&mut self, kind: ResourceKind) {
        match kind {
            ResourceKind::KnowledgeBase => self.knowledge_bases += 1,
            ResourceKind::KnowledgeSource => self.knowledge_sources += 1,
            ResourceKind::Index => self.indexes += 1,
            ResourceKind::Indexer => self.indexers += 1,
            ResourceKind::DataSource => self.data_sources += 1,
            ResourceKind::Skillset => self.skillsets += 1,
            ResourceKind::SynonymMap => self.synonym_maps += 1,
        }
    }

    pub fn get(&self, kind: ResourceKind) -> usize {
        match kind {
            ResourceKind::KnowledgeBase => self.knowledge_bases,
            ResourceKind::KnowledgeSource => self.knowledge_sources,
            ResourceKind::Index => self.indexes,
            ResourceKind::Indexer => self.indexers,
            ResourceKind::DataSource => self.data_sources,
            ResourceKind::Skillset => self.skillsets,
            ResourceKind::SynonymMap => self.synonym_maps,
        }
    }
}

impl fmt::Display for ExportCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Knowledge Bases: {}", self.knowledge_bases)?;
        writeln!(f, "Knowledge Sources: {}", self.knowledge_sources)?;
        writeln!(f, "Indexes: {}", self.indexes)?;
        writeln!(f, "Indexers: {}", self.indexers)?;
        writeln!(f, "Data Sources: {}", self.data_sources)?;
        writeln!(f, "Skillsets: {}", self.skillsets)?;
        write!(f, "Synonym Maps: {}", self.synonym_maps)
    }
}

/// One export run over the configuration graph
pub struct Exporter<'a> {
    api: &'a dyn SearchApi,
    store: &'a ConfigStore,
    seen_sources: HashSet<String>,
    seen_indexes: HashSet<String>,
    seen_indexers: HashSet<String>,
    seen_data_sources: HashSet<String>,
    seen_skillsets: HashSet<String>,
    seen_synonym_maps: HashSet<String>,
    counts: ExportCounts,
}

impl<'a> Exporter<'a> {
    pub fn new(api: &'a dyn SearchApi, store: &'a ConfigStore) -> Self {
        Self {
            api,
            store,
            seen_sources: HashSet::new(),
            seen_indexes: HashSet::new(),
            seen_indexers: HashSet::new(),
            seen_data_sources: HashSet::new(),
            seen_skillsets: HashSet::new(),
            seen_synonym_maps: HashSet::new(),
            counts: ExportCounts::default(),
        }
    }

    /// Export every graph reachable from the given knowledge base roots.
    ///
    /// A root list of exactly `["*"]` expands to all knowledge bases on the
    /// service. A root that fails with a control-plane rejection is reported
    /// and the run continues with the next root; transport failures abort
    /// the whole run.
    pub async fn run(mut self, root_names: &[String]) -> Result<ExportCounts> {
        let roots = if matches!(root_names, [only] if only == "*") {
            self.api.list_names(ResourceKind::KnowledgeBase).await?
        } else {
            root_names.to_vec()
        };

        for root in &roots {
            if let Err(err) = self.export_root(root).await {
                if matches!(
                    err.downcast_ref::<ApiError>(),
                    Some(ApiError::Transport { .. })
                ) {
                    return Err(err);
                }
                tracing::error!("Export of knowledge base '{}' failed: {:#}", root, err);
            }
        }

        Ok(self.counts)
    }

    async fn export_root(&mut self, kb_name: &str) -> Result<()> {
        tracing::info!("Knowledge base: {}", kb_name);
        let Some(kb) = self
            .api
            .get_resource(ResourceKind::KnowledgeBase, kb_name)
            .await?
        else {
            tracing::warn!("Knowledge base '{}' not found, skipping", kb_name);
            return Ok(());
        };
        self.persist(ResourceKind::KnowledgeBase, kb_name, &kb)?;

        for ks_name in referenced_source_names(&kb) {
            if self.seen_sources.contains(&ks_name) {
                continue;
            }
            self.export_source(&ks_name).await?;
        }
        Ok(())
    }

    async fn export_source(&mut self, ks_name: &str) -> Result<()> {
        tracing::info!("  knowledge source: {}", ks_name);
        let Some(ks) = self
            .api
            .get_resource(ResourceKind::KnowledgeSource, ks_name)
            .await?
        else {
            tracing::warn!("Knowledge source '{}' not found, skipping", ks_name);
            return Ok(());
        };
        self.persist(ResourceKind::KnowledgeSource, ks_name, &ks)?;
        self.seen_sources.insert(ks_name.to_string());

        let deps = created_resources(&ks);

        if let Some(index_name) = deps.index_name {
            if !self.seen_indexes.contains(&index_name) {
                self.export_index(&index_name).await?;
            }
        }
        if let Some(indexer_name) = deps.indexer_name {
            if self.seen_indexers.insert(indexer_name.clone()) {
                self.export_leaf(ResourceKind::Indexer, &indexer_name)
                    .await?;
            }
        }
        if let Some(ds_name) = deps.data_source_name {
            if self.seen_data_sources.insert(ds_name.clone()) {
                self.export_leaf(ResourceKind::DataSource, &ds_name).await?;
            }
        }
        if let Some(ss_name) = deps.skillset_name {
            if self.seen_skillsets.insert(ss_name.clone()) {
                self.export_leaf(ResourceKind::Skillset, &ss_name).await?;
            }
        }
        Ok(())
    }

    /// Fetch and persist an index, then resolve the synonym maps it
    /// references, deduplicated globally across all indexes in the run
    async fn export_index(&mut self, index_name: &str) -> Result<()> {
        let Some(index) = self
            .api
            .get_resource(ResourceKind::Index, index_name)
            .await?
        else {
            tracing::warn!("Index '{}' not found", index_name);
            return Ok(());
        };
        self.persist(ResourceKind::Index, index_name, &index)?;
        self.seen_indexes.insert(index_name.to_string());

        for synonym_map in referenced_synonym_maps(&index) {
            if !self.seen_synonym_maps.insert(synonym_map.clone()) {
                continue;
            }
            self.export_leaf(ResourceKind::SynonymMap, &synonym_map)
                .await?;
        }
        Ok(())
    }

    /// Fetch and persist a terminal node, warning when it is missing
    async fn export_leaf(&mut self, kind: ResourceKind, name: &str) -> Result<()> {
        match self.api.get_resource(kind, name).await? {
            Some(doc) => self.persist(kind, name, &doc),
            None => {
                tracing::warn!("{} '{}' not found", kind, name);
                Ok(())
            }
        }
    }

    fn persist(&mut self, kind: ResourceKind, name: &str, doc: &Value) -> Result<()> {
        self.store.write(kind, name, doc)?;
        self.counts.record(kind);
        Ok(())
    }
}

/// Knowledge source names referenced by a knowledge base
fn referenced_source_names(kb: &Value) -> Vec<String> {
    kb.get("knowledgeSources")
        .and_then(|v| v.as_array())
        .map(|refs| {
            refs.iter()
                .filter_map(|r| r.get("name").and_then(|n| n.as_str()))
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}

/// Synonym map names referenced by an index
fn referenced_synonym_maps(index: &Value) -> Vec<String> {
    index
        .get("synonymMaps")
        .and_then(|v| v.as_array())
        .map(|maps| {
            maps.iter()
                .filter_map(|m| m.as_str())
                .filter(|m| !m.is_empty())
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}
