//! Activities wrapping the C2 [`agent_memory::Memory`] facade's six
//! operations, so a workflow schedules memory access the same way it
//! schedules any other activity — with retry, deadlines, and idempotency
//!.

use std::sync::Arc;

use agent_memory::{FilterExpr, Memory, MemoryStats, Payload, SaveItem, ScoredDocument};
use async_trait::async_trait;

use crate::activity::Activity;
use crate::context::ActivityContext;
use crate::error::ActivityError;

/// Input for [`MemorySaveActivity`].
#[derive(Debug, Clone)]
pub struct SaveInput {
    pub collection: String,
    pub content: String,
    pub metadata: Payload,
}

/// Saves one document to memory.
pub struct MemorySaveActivity {
    memory: Arc<Memory>,
}

impl MemorySaveActivity {
    #[must_use]
    pub fn new(memory: Arc<Memory>) -> Self {
        Self { memory }
    }
}

#[async_trait]
impl Activity for MemorySaveActivity {
    type Input = SaveInput;
    type Output = u64;

    fn activity_type(&self) -> &'static str {
        "memory.save"
    }

    async fn run(&self, ctx: &ActivityContext, input: Self::Input) -> Result<u64, ActivityError> {
        ctx.heartbeat("saving document");
        Ok(self.memory.save(&input.collection, &input.content, input.metadata).await?)
    }
}

/// Input for [`MemoryBatchSaveActivity`].
#[derive(Debug, Clone)]
pub struct BatchSaveInput {
    pub collection: String,
    pub items: Vec<SaveItem>,
}

/// Saves a batch of documents to memory, all-or-nothing.
pub struct MemoryBatchSaveActivity {
    memory: Arc<Memory>,
}

impl MemoryBatchSaveActivity {
    #[must_use]
    pub fn new(memory: Arc<Memory>) -> Self {
        Self { memory }
    }
}

#[async_trait]
impl Activity for MemoryBatchSaveActivity {
    type Input = BatchSaveInput;
    type Output = usize;

    fn activity_type(&self) -> &'static str {
        "memory.batch_save"
    }

    async fn run(&self, ctx: &ActivityContext, input: Self::Input) -> Result<usize, ActivityError> {
        ctx.heartbeat("batch saving documents");
        Ok(self.memory.batch_save(&input.collection, input.items).await?)
    }
}

/// Input for [`MemorySearchActivity`].
#[derive(Debug, Clone)]
pub struct SearchInput {
    pub collection: String,
    pub query: String,
    pub top_k: usize,
    pub filter: Option<FilterExpr>,
}

/// Searches memory for the top-k most similar documents.
pub struct MemorySearchActivity {
    memory: Arc<Memory>,
}

impl MemorySearchActivity {
    #[must_use]
    pub fn new(memory: Arc<Memory>) -> Self {
        Self { memory }
    }
}

#[async_trait]
impl Activity for MemorySearchActivity {
    type Input = SearchInput;
    type Output = Vec<ScoredDocument>;

    fn activity_type(&self) -> &'static str {
        "memory.search"
    }

    async fn run(&self, ctx: &ActivityContext, input: Self::Input) -> Result<Vec<ScoredDocument>, ActivityError> {
        ctx.heartbeat("searching memory");
        Ok(self
            .memory
            .search(&input.collection, &input.query, input.top_k, input.filter.as_ref())
            .await?)
    }
}

/// Input for [`MemoryUpdateMetadataActivity`].
#[derive(Debug, Clone)]
pub struct UpdateMetadataInput {
    pub collection: String,
    pub id: u64,
    pub updates: Payload,
}

/// Updates a document's metadata without re-embedding it.
pub struct MemoryUpdateMetadataActivity {
    memory: Arc<Memory>,
}

impl MemoryUpdateMetadataActivity {
    #[must_use]
    pub fn new(memory: Arc<Memory>) -> Self {
        Self { memory }
    }
}

#[async_trait]
impl Activity for MemoryUpdateMetadataActivity {
    type Input = UpdateMetadataInput;
    type Output = bool;

    fn activity_type(&self) -> &'static str {
        "memory.update_metadata"
    }

    async fn run(&self, ctx: &ActivityContext, input: Self::Input) -> Result<bool, ActivityError> {
        ctx.heartbeat("updating document metadata");
        Ok(self.memory.update_metadata(&input.collection, input.id, input.updates).await?)
    }
}

/// Input for [`MemoryDeleteActivity`].
#[derive(Debug, Clone)]
pub struct DeleteInput {
    pub collection: String,
    pub id: u64,
}

/// Tombstones a document.
pub struct MemoryDeleteActivity {
    memory: Arc<Memory>,
}

impl MemoryDeleteActivity {
    #[must_use]
    pub fn new(memory: Arc<Memory>) -> Self {
        Self { memory }
    }
}

#[async_trait]
impl Activity for MemoryDeleteActivity {
    type Input = DeleteInput;
    type Output = bool;

    fn activity_type(&self) -> &'static str {
        "memory.delete"
    }

    async fn run(&self, ctx: &ActivityContext, input: Self::Input) -> Result<bool, ActivityError> {
        ctx.heartbeat("deleting document");
        Ok(self.memory.delete(&input.collection, input.id).await?)
    }
}

/// Reports aggregate memory-layer statistics; takes no input.
pub struct MemoryStatsActivity {
    memory: Arc<Memory>,
}

impl MemoryStatsActivity {
    #[must_use]
    pub fn new(memory: Arc<Memory>) -> Self {
        Self { memory }
    }
}

#[async_trait]
impl Activity for MemoryStatsActivity {
    type Input = ();
    type Output = MemoryStats;

    fn activity_type(&self) -> &'static str {
        "memory.stats"
    }

    async fn run(&self, _ctx: &ActivityContext, (): ()) -> Result<MemoryStats, ActivityError> {
        Ok(self.memory.stats().await?)
    }
}
