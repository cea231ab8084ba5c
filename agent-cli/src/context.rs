//! Bootstraps every long-lived collaborator the CLI's commands share: the
//! memory layer, the durable workflow runtime, the tool registry and the
//! health monitor backing `agent_tools::http::router`.

use std::env;
#[cfg(feature = "redb-backend")]
use std::path::Path;
use std::sync::Arc;

use agent_graph::{GraphCapabilities, MemoryGraphCapabilities};
use agent_memory::embeddings::DeterministicEmbeddingProvider;
#[cfg(feature = "mistral")]
use agent_memory::embeddings::MistralEmbeddingProvider;
#[cfg(feature = "openai")]
use agent_memory::embeddings::OpenAiEmbeddingProvider;
use agent_memory::{EmbeddingProvider, Memory, MemoryConfigBuilder};
use agent_memory_store_cache::InMemoryCacheStore;
#[cfg(feature = "redb-backend")]
use agent_memory_store_cache::RedbCacheStore;
use agent_memory_store_vector::InMemoryVectorStore;
#[cfg(feature = "libsql-backend")]
use agent_memory_store_vector::LibsqlVectorStore;
use agent_memory::{CacheStore, VectorStore};
use agent_tools::{AgentMonitor, WorkflowRegistry};
use agent_workflow::{InMemoryWorkflowEventStore, InvoiceMatcherWorkflow, FeedPublisherWorkflow, Scheduler, WorkflowEventStore, WorkflowExecutor};
use anyhow::{Context as _, Result};

use crate::config::{CacheStoreConfig, CliConfig, EmbeddingProviderConfig, VectorStoreConfig};
use crate::llm::NullLlmClient;

/// Every collaborator a command handler might need, built once at startup.
pub struct RuntimeContext {
    pub memory: Arc<Memory>,
    pub executor: Arc<WorkflowExecutor>,
    pub store: Arc<dyn WorkflowEventStore>,
    pub registry: Arc<WorkflowRegistry>,
    pub scheduler: Arc<Scheduler>,
    pub monitor: Arc<AgentMonitor>,
}

impl RuntimeContext {
    pub async fn bootstrap(config: &CliConfig) -> Result<Self> {
        let provider = build_embedding_provider(&config.embedding_provider)?;
        let vector_store = build_vector_store(&config.vector_store).await?;
        let cache_store = build_cache_store(&config.cache_store)?;

        let monitor = Arc::new(AgentMonitor::new());

        let memory_config = MemoryConfigBuilder::new().default_top_k(config.default_top_k).build();
        let memory = Arc::new(
            Memory::new(provider, vector_store, cache_store, memory_config)
                .with_health_sink(Arc::clone(&monitor) as Arc<dyn agent_memory::HealthSink>),
        );

        let store: Arc<dyn WorkflowEventStore> = Arc::new(InMemoryWorkflowEventStore::new());
        let executor = Arc::new(
            WorkflowExecutor::new(Arc::clone(&store))
                .with_health_sink(Arc::clone(&monitor) as Arc<dyn agent_memory::HealthSink>),
        );

        let capabilities: Arc<dyn GraphCapabilities> =
            Arc::new(MemoryGraphCapabilities::new(Arc::clone(&memory), Arc::new(NullLlmClient)));

        let mut registry = WorkflowRegistry::new();
        registry.register(InvoiceMatcherWorkflow::new(Arc::clone(&capabilities))?);
        registry.register(FeedPublisherWorkflow::new(Arc::clone(&capabilities))?);
        let registry = Arc::new(registry);

        let scheduler = Arc::new(Scheduler::new());
        for schedule in &config.schedules {
            scheduler.add_schedule(schedule.workflow_type.clone(), &schedule.expr, schedule.overlap_policy.clone().into())?;
        }

        Ok(Self { memory, executor, store, registry, scheduler, monitor })
    }
}

fn build_embedding_provider(config: &EmbeddingProviderConfig) -> Result<Arc<dyn EmbeddingProvider>> {
    match config {
        EmbeddingProviderConfig::Deterministic => Ok(Arc::new(DeterministicEmbeddingProvider::new())),
        #[cfg(feature = "openai")]
        EmbeddingProviderConfig::OpenAi { model, dimension } => {
            let api_key = env::var("OPENAI_API_KEY").context("OPENAI_API_KEY must be set to use the openai embedding provider")?;
            Ok(Arc::new(OpenAiEmbeddingProvider::new(api_key, model.clone(), *dimension)))
        }
        #[cfg(feature = "mistral")]
        EmbeddingProviderConfig::Mistral { model, dimension } => {
            let api_key = env::var("MISTRAL_API_KEY").context("MISTRAL_API_KEY must be set to use the mistral embedding provider")?;
            Ok(Arc::new(MistralEmbeddingProvider::new(api_key, model.clone(), *dimension)))
        }
    }
}

async fn build_vector_store(config: &VectorStoreConfig) -> Result<Arc<dyn VectorStore>> {
    match config {
        VectorStoreConfig::InMemory => Ok(Arc::new(InMemoryVectorStore::new())),
        #[cfg(feature = "libsql-backend")]
        VectorStoreConfig::Libsql { path } => {
            let store = LibsqlVectorStore::open(path).await.with_context(|| format!("opening libsql vector store at {path}"))?;
            Ok(Arc::new(store))
        }
    }
}

fn build_cache_store(config: &CacheStoreConfig) -> Result<Arc<dyn CacheStore>> {
    match config {
        CacheStoreConfig::InMemory { byte_budget } => Ok(Arc::new(InMemoryCacheStore::new(*byte_budget))),
        #[cfg(feature = "redb-backend")]
        CacheStoreConfig::Redb { path } => {
            let store = RedbCacheStore::open(Path::new(path)).with_context(|| format!("opening redb cache store at {path}"))?;
            Ok(Arc::new(store))
        }
    }
}
