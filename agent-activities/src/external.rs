//! External-I/O collaborators, specified at the interface level only (spec
//! §4.4: activities that cross a process boundary are trait objects so
//! production and test builds can swap implementations without touching
//! workflow code). Concrete adapters (S3, a social API client, a report
//! database) live outside this workspace; `agent-test-support` supplies
//! in-memory fakes.

use async_trait::async_trait;

use crate::error::ActivityError;

/// Blob storage used by activities that fetch source documents (invoices,
/// media) before handing them to a graph.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    async fn fetch_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, ActivityError>;
    async fn list_objects(&self, bucket: &str, prefix: &str) -> Result<Vec<String>, ActivityError>;
}

/// Publishes to a social platform on behalf of the feed-publisher graph's
/// `publish` decision.
#[async_trait]
pub trait SocialPoster: Send + Sync {
    /// Returns the platform's id for the created post.
    async fn post(
        &self,
        platform: &str,
        account: &str,
        caption: &str,
        image_url: Option<&str>,
    ) -> Result<String, ActivityError>;
}

/// Persists an agent's structured report output (e.g. an ad-performance
/// summary) outside the memory layer's document model.
#[async_trait]
pub trait ReportSink: Send + Sync {
    async fn save_report(&self, agent_name: &str, kind: &str, payload: &[u8]) -> Result<(), ActivityError>;
}

use std::sync::Arc;

use crate::activity::Activity;
use crate::context::ActivityContext;

/// Input for [`StorageFetchObjectActivity`].
#[derive(Debug, Clone)]
pub struct FetchObjectInput {
    pub bucket: String,
    pub key: String,
}

/// Fetches one object from blob storage.
pub struct StorageFetchObjectActivity {
    storage: Arc<dyn ObjectStorage>,
}

impl StorageFetchObjectActivity {
    #[must_use]
    pub fn new(storage: Arc<dyn ObjectStorage>) -> Self {
        Self { storage }
    }
}

#[async_trait]
impl Activity for StorageFetchObjectActivity {
    type Input = FetchObjectInput;
    type Output = Vec<u8>;

    fn activity_type(&self) -> &'static str {
        "storage.fetch_object"
    }

    async fn run(&self, ctx: &ActivityContext, input: Self::Input) -> Result<Vec<u8>, ActivityError> {
        ctx.heartbeat("fetching object");
        self.storage.fetch_object(&input.bucket, &input.key).await
    }
}

/// Input for [`StorageListObjectsActivity`].
#[derive(Debug, Clone)]
pub struct ListObjectsInput {
    pub bucket: String,
    pub prefix: String,
}

/// Lists object keys under a prefix.
pub struct StorageListObjectsActivity {
    storage: Arc<dyn ObjectStorage>,
}

impl StorageListObjectsActivity {
    #[must_use]
    pub fn new(storage: Arc<dyn ObjectStorage>) -> Self {
        Self { storage }
    }
}

#[async_trait]
impl Activity for StorageListObjectsActivity {
    type Input = ListObjectsInput;
    type Output = Vec<String>;

    fn activity_type(&self) -> &'static str {
        "storage.list_objects"
    }

    async fn run(&self, ctx: &ActivityContext, input: Self::Input) -> Result<Vec<String>, ActivityError> {
        ctx.heartbeat("listing objects");
        self.storage.list_objects(&input.bucket, &input.prefix).await
    }
}

/// Input for [`PostSocialActivity`].
#[derive(Debug, Clone)]
pub struct PostSocialInput {
    pub platform: String,
    pub account: String,
    pub caption: String,
    pub image_url: Option<String>,
}

/// Publishes a social post.
pub struct PostSocialActivity {
    poster: Arc<dyn SocialPoster>,
}

impl PostSocialActivity {
    #[must_use]
    pub fn new(poster: Arc<dyn SocialPoster>) -> Self {
        Self { poster }
    }
}

#[async_trait]
impl Activity for PostSocialActivity {
    type Input = PostSocialInput;
    type Output = String;

    fn activity_type(&self) -> &'static str {
        "post.social"
    }

    async fn run(&self, ctx: &ActivityContext, input: Self::Input) -> Result<String, ActivityError> {
        ctx.heartbeat("posting to social platform");
        self.poster
            .post(&input.platform, &input.account, &input.caption, input.image_url.as_deref())
            .await
    }
}

/// Input for [`ReportSaveActivity`].
#[derive(Debug, Clone)]
pub struct ReportSaveInput {
    pub agent_name: String,
    pub kind: String,
    pub payload: Vec<u8>,
}

/// Persists a structured agent report.
pub struct ReportSaveActivity {
    sink: Arc<dyn ReportSink>,
}

impl ReportSaveActivity {
    #[must_use]
    pub fn new(sink: Arc<dyn ReportSink>) -> Self {
        Self { sink }
    }
}

#[async_trait]
impl Activity for ReportSaveActivity {
    type Input = ReportSaveInput;
    type Output = ();

    fn activity_type(&self) -> &'static str {
        "report.save"
    }

    async fn run(&self, ctx: &ActivityContext, input: Self::Input) -> Result<(), ActivityError> {
        ctx.heartbeat("saving report");
        self.sink.save_report(&input.agent_name, &input.kind, &input.payload).await
    }
}
