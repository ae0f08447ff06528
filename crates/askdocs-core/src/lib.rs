//! Core traits and types for askdocs
//!
//! This crate defines the capability-facing interfaces shared by the whole
//! system: LLM providers, embedding providers, vector stores, document
//! indexers and RAG engines, plus the conversation record threaded through
//! the request pipeline. Concrete services are injected behind these traits,
//! which keeps every stage substitutable with a test double.

pub mod conversation;
pub mod document_indexer;
pub mod embedding;
pub mod error;
pub mod llm;
pub mod rag;
pub mod retry;
pub mod vector_store;

pub use conversation::{ConversationRecord, Message, PipelineState, Role};
pub use document_indexer::{Document, DocumentIndexer, IndexingConfig, IndexingResult};
pub use embedding::{EmbeddingProvider, TaskType};
pub use error::{Error, Result};
pub use llm::{GenerationConfig, GenerationResult, LLMProvider};
pub use rag::{RAGEngine, RAGQuery, RAGResult};
pub use retry::{RetryConfig, with_retry};
pub use vector_store::{SearchConfig, SearchResult, VectorDocument, VectorStore};
