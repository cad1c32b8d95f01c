//! Port for pipeline execution.
//!
//! Adapters translate the typed stage descriptors into their native
//! query language and hand back hydrated rows. The composer owns
//! projection; executors own data access.

use async_trait::async_trait;

use crate::domain::read_model::pipeline::{Pipeline, PipelinePage};

use super::StoreError;

/// Runs a composed pipeline against the store.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReadModelExecutor: Send + Sync {
    /// Execute the pipeline and return one page of hydrated rows plus the
    /// pre-page total.
    async fn execute(&self, pipeline: &Pipeline) -> Result<PipelinePage, StoreError>;
}
