//! Concrete [`Workflow`](crate::workflow::Workflow) bodies wiring the two
//! C3 graphs into the durable runtime: trigger → workflow → activity →
//! graph → memory.

pub mod feed_publisher;
pub mod invoice_matcher;

pub use feed_publisher::{FeedPublisherWorkflow, FeedPublisherWorkflowInput};
pub use invoice_matcher::{InvoiceMatcherWorkflow, InvoiceMatcherWorkflowInput};
