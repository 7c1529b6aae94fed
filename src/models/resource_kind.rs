//! Search resource kind definitions
//!
//! This module provides a centralized enum for all search service object
//! kinds managed by the tool. It eliminates hardcoded strings throughout the
//! codebase and keeps each kind's REST sub-path and on-disk directory name
//! in one place.

use std::fmt;
use std::str::FromStr;

/// Enumeration of all managed search service object kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    KnowledgeBase,
    KnowledgeSource,
    Index,
    Indexer,
    DataSource,
    Skillset,
    SynonymMap,
}

impl ResourceKind {
    /// Get the display name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::KnowledgeBase => "KnowledgeBase",
            ResourceKind::KnowledgeSource => "KnowledgeSource",
            ResourceKind::Index => "Index",
            ResourceKind::Indexer => "Indexer",
            ResourceKind::DataSource => "DataSource",
            ResourceKind::Skillset => "Skillset",
            ResourceKind::SynonymMap => "SynonymMap",
        }
    }

    /// REST collection sub-path on the search service
    pub fn api_path(&self) -> &'static str {
        match self {
            ResourceKind::KnowledgeBase => "knowledgebases",
            ResourceKind::KnowledgeSource => "knowledgesources",
            ResourceKind::Index => "indexes",
            ResourceKind::Indexer => "indexers",
            ResourceKind::DataSource => "datasources",
            ResourceKind::Skillset => "skillsets",
            ResourceKind::SynonymMap => "synonymmaps",
        }
    }

    /// Directory name the kind's documents are stored under
    pub fn dir_name(&self) -> &'static str {
        match self {
            ResourceKind::KnowledgeBase => "knowledge-bases",
            ResourceKind::KnowledgeSource => "knowledge-sources",
            ResourceKind::Index => "indexes",
            ResourceKind::Indexer => "indexers",
            ResourceKind::DataSource => "datasources",
            ResourceKind::Skillset => "skillsets",
            ResourceKind::SynonymMap => "synonymmaps",
        }
    }

    /// Get all resource kinds
    ///
    /// Returns an array of all ResourceKind variants. Useful for iterating
    /// over the storage layout dynamically.
    pub fn all() -> &'static [Self] {
        &[
            ResourceKind::KnowledgeBase,
            ResourceKind::KnowledgeSource,
            ResourceKind::Index,
            ResourceKind::Indexer,
            ResourceKind::DataSource,
            ResourceKind::Skillset,
            ResourceKind::SynonymMap,
        ]
    }

    /// Try to parse a string into a ResourceKind, returning None if invalid
    pub fn parse_optional(s: &str) -> Option<Self> {
        s.parse().ok()
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ResourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "KnowledgeBase" => Ok(ResourceKind::KnowledgeBase),
            "KnowledgeSource" => Ok(ResourceKind::KnowledgeSource),
            "Index" => Ok(ResourceKind::Index),
            "Indexer" => Ok(ResourceKind::Indexer),
            "DataSource" => Ok(ResourceKind::DataSource),
            "Skillset" => Ok(ResourceKind::Skillset),
            "SynonymMap" => Ok(ResourceKind::SynonymMap),
            _ => Err(format!("Unknown resource kind: {}", s)),
        }
    }
}
