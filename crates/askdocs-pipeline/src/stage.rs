use askdocs_core::{ConversationRecord, PipelineState, Result};
use async_trait::async_trait;

/// One step of the request pipeline.
///
/// A stage may only run on a record in its `entry_state`; the pipeline
/// moves the record to `exit_state` once `run` succeeds.
#[async_trait]
pub trait Stage: Send + Sync {
    fn name(&self) -> &'static str;

    fn entry_state(&self) -> PipelineState;

    fn exit_state(&self) -> PipelineState;

    async fn run(&self, record: &mut ConversationRecord) -> Result<()>;
}
