//! Request pipeline for askdocs
//!
//! A request is one sequential pass of four stages over a
//! [`ConversationRecord`](askdocs_core::ConversationRecord):
//! route, retrieve, synthesize, respond. The model and the retrieval
//! engine are injected once and shared by every request.

mod pipeline;
mod responder;
mod retriever;
mod router;
mod stage;
mod synthesizer;

#[cfg(test)]
mod tests;

pub use pipeline::{Pipeline, PipelineConfig};
pub use responder::{ResponderStage, render_history};
pub use retriever::RetrieverStage;
pub use router::{Route, Router};
pub use stage::Stage;
pub use synthesizer::SynthesizerStage;
