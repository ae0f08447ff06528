//! Deterministic stand-ins for the remote services askdocs depends on.

pub mod embedding;
pub mod llm;
pub mod rag;

pub use embedding::KeywordEmbeddings;
pub use llm::{FailingLLM, FixedLLM, RecordingLLM};
pub use rag::StaticRAGEngine;
