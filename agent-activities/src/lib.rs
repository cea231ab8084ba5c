//! `agent-activities`: C4, the typed activity library workflows schedule.

pub mod activity;
pub mod context;
pub mod error;
pub mod external;
pub mod graph_activity;
pub mod memory_activities;

pub use activity::Activity;
pub use context::{ActivityContext, HeartbeatSink, NoopHeartbeat};
pub use error::ActivityError;
pub use external::{ObjectStorage, ReportSink, SocialPoster};
pub use graph_activity::GraphRunActivity;
pub use memory_activities::{
    BatchSaveInput, DeleteInput, MemoryBatchSaveActivity, MemoryDeleteActivity,
    MemorySaveActivity, MemorySearchActivity, MemoryStatsActivity,
    MemoryUpdateMetadataActivity, SaveInput, SearchInput, UpdateMetadataInput,
};
