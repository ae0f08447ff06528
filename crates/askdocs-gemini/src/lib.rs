//! Gemini integration for askdocs
//!
//! This crate provides the Gemini implementations of the `LLMProvider` and
//! `EmbeddingProvider` traits over the Generative Language REST API.

mod client;
mod config;
mod embeddings;
mod http;


pub use client::GeminiClient;
pub use config::GeminiConfig;
pub use embeddings::GeminiEmbeddings;

// Re-export core types for convenience
pub use askdocs_core::{
    EmbeddingProvider, Error, GenerationConfig, GenerationResult, LLMProvider, Result,
    RetryConfig, TaskType,
};
