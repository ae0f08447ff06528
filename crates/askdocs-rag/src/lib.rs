//! Retrieval layer for askdocs
//!
//! This crate provides the vector store backends, the offline document
//! indexer with its recursive text splitter, and the RAG engine used by the
//! request pipeline.

mod document_indexer;
mod engine;
mod splitter;
mod vector_store;


pub use document_indexer::LocalDocumentIndexer;
pub use engine::LocalRAGEngine;
pub use splitter::RecursiveTextSplitter;
pub use vector_store::{INDEX_FILE, LocalVectorStore, QdrantVectorStore};

// Re-export core types for convenience
pub use askdocs_core::{
    Document, DocumentIndexer, EmbeddingProvider, Error, IndexingConfig, IndexingResult,
    RAGEngine, RAGQuery, RAGResult, Result, SearchConfig, SearchResult, VectorDocument,
    VectorStore,
};
