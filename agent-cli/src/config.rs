//! TOML-loaded runtime configuration, in the shape of the teacher's
//! `memory-cli::config::Config`: a handful of backend choices plus a default
//! search path, trimmed to only the crates this workspace actually depends
//! on.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum EmbeddingProviderConfig {
    Deterministic,
    #[cfg(feature = "openai")]
    OpenAi { model: String, dimension: usize },
    #[cfg(feature = "mistral")]
    Mistral { model: String, dimension: usize },
}

impl Default for EmbeddingProviderConfig {
    fn default() -> Self {
        Self::Deterministic
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum VectorStoreConfig {
    InMemory,
    #[cfg(feature = "libsql-backend")]
    Libsql { path: String },
}

impl Default for VectorStoreConfig {
    fn default() -> Self {
        Self::InMemory
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum CacheStoreConfig {
    InMemory { byte_budget: u64 },
    #[cfg(feature = "redb-backend")]
    Redb { path: String },
}

impl Default for CacheStoreConfig {
    fn default() -> Self {
        Self::InMemory { byte_budget: 512 * 1024 * 1024 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlapPolicyConfig {
    Skip,
    BufferOne,
    AllowAll,
}

impl From<OverlapPolicyConfig> for agent_workflow::OverlapPolicy {
    fn from(value: OverlapPolicyConfig) -> Self {
        match value {
            OverlapPolicyConfig::Skip => agent_workflow::OverlapPolicy::Skip,
            OverlapPolicyConfig::BufferOne => agent_workflow::OverlapPolicy::BufferOne,
            OverlapPolicyConfig::AllowAll => agent_workflow::OverlapPolicy::AllowAll,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    pub workflow_type: String,
    pub expr: String,
    #[serde(default = "default_overlap_policy")]
    pub overlap_policy: OverlapPolicyConfig,
}

fn default_overlap_policy() -> OverlapPolicyConfig {
    OverlapPolicyConfig::Skip
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CliConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    #[serde(default)]
    pub embedding_provider: EmbeddingProviderConfig,
    #[serde(default)]
    pub vector_store: VectorStoreConfig,
    #[serde(default)]
    pub cache_store: CacheStoreConfig,
    #[serde(default = "default_top_k")]
    pub default_top_k: usize,
    #[serde(default)]
    pub schedules: Vec<ScheduleConfig>,
}

fn default_bind_address() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_top_k() -> usize {
    10
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            embedding_provider: EmbeddingProviderConfig::default(),
            vector_store: VectorStoreConfig::default(),
            cache_store: CacheStoreConfig::default(),
            default_top_k: default_top_k(),
            schedules: Vec::new(),
        }
    }
}

/// Default search path, checked in order when `--config` is not given.
const DEFAULT_CONFIG_PATHS: &[&str] = &["agent-platform.toml", ".agent-platform.toml"];

impl CliConfig {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let resolved = match path {
            Some(path) => Some(path.to_path_buf()),
            None => DEFAULT_CONFIG_PATHS.iter().map(PathBuf::from).find(|candidate| candidate.exists()),
        };

        let Some(resolved) = resolved else {
            return Ok(Self::default());
        };

        let raw = fs::read_to_string(&resolved)
            .with_context(|| format!("reading config file {}", resolved.display()))?;
        toml::from_str(&raw).with_context(|| format!("parsing config file {}", resolved.display()))
    }
}
