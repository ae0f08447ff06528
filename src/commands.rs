//! Subcommand implementations

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use askdocs_core::{DocumentIndexer, RAGEngine, VectorStore};
use askdocs_gemini::{GeminiClient, GeminiConfig, GeminiEmbeddings};
use askdocs_pipeline::Pipeline;
use askdocs_rag::{LocalDocumentIndexer, LocalRAGEngine, LocalVectorStore, QdrantVectorStore};
use askdocs_server::{AppState, run_server};
use colored::*;
use tracing::info;

use crate::config::{AppConfig, VectorBackend};

fn gemini_config(config: &AppConfig) -> Result<GeminiConfig> {
    Ok(GeminiConfig::from_env()?.with_retry(config.retry.clone()))
}

async fn connect_store<V: VectorStore>(mut store: V) -> Result<Arc<V>> {
    store.connect().await?;
    Ok(Arc::new(store))
}

async fn rag_engine(config: &AppConfig, embeddings: Arc<GeminiEmbeddings>) -> Result<Arc<dyn RAGEngine>> {
    let engine: Arc<dyn RAGEngine> = match config.backend {
        VectorBackend::Local => {
            let store = connect_store(LocalVectorStore::persistent(&config.vector_store_dir)).await?;
            Arc::new(LocalRAGEngine::new(store, embeddings))
        }
        VectorBackend::Qdrant => {
            let store = connect_store(QdrantVectorStore::new(
                &config.qdrant_url,
                &config.qdrant_collection,
            ))
            .await?;
            Arc::new(LocalRAGEngine::new(store, embeddings))
        }
    };
    Ok(engine)
}

/// Connect a store for writing; `rebuild` drops everything already indexed
async fn writable_store<V: VectorStore>(store: V, rebuild: bool) -> Result<Arc<V>> {
    let store = connect_store(store).await?;
    if rebuild {
        store.clear().await?;
        info!("cleared existing vector store before rebuild");
    }
    Ok(store)
}

async fn document_indexer(
    config: &AppConfig,
    embeddings: Arc<GeminiEmbeddings>,
    rebuild: bool,
) -> Result<Box<dyn DocumentIndexer>> {
    let indexer: Box<dyn DocumentIndexer> = match config.backend {
        VectorBackend::Local => {
            let store =
                writable_store(LocalVectorStore::persistent(&config.vector_store_dir), rebuild)
                    .await?;
            Box::new(LocalDocumentIndexer::with_config(store, embeddings, config.indexing())?)
        }
        VectorBackend::Qdrant => {
            let store = writable_store(
                QdrantVectorStore::new(&config.qdrant_url, &config.qdrant_collection),
                rebuild,
            )
            .await?;
            Box::new(LocalDocumentIndexer::with_config(store, embeddings, config.indexing())?)
        }
    };
    Ok(indexer)
}

/// Wire the Gemini clients and the vector store into a pipeline
async fn build_pipeline(config: &AppConfig) -> Result<(Arc<Pipeline>, Arc<dyn RAGEngine>)> {
    let gemini = gemini_config(config)?;
    let llm = Arc::new(GeminiClient::new(gemini.clone())?);
    let embeddings = Arc::new(GeminiEmbeddings::new(gemini)?);
    let rag = rag_engine(config, embeddings).await?;

    let pipeline = Arc::new(Pipeline::new(llm, rag.clone(), config.pipeline()));
    Ok((pipeline, rag))
}

pub async fn serve(mut config: AppConfig, host: Option<String>, port: Option<u16>) -> Result<()> {
    if let Some(host) = host {
        config.host = host;
    }
    if let Some(port) = port {
        config.port = port;
    }

    let (pipeline, rag) = build_pipeline(&config).await?;
    if rag.stats().await.is_err() {
        println!(
            "{} Vector store is not reachable yet; /chat will fail until it is",
            "⚠️".yellow()
        );
    }

    println!(
        "{} askdocs serving on http://{}:{}",
        "🚀".green(),
        config.host,
        config.port
    );
    run_server(config.server(), AppState::new(pipeline, rag)).await
}

pub async fn index(
    mut config: AppConfig,
    raw_docs: Option<PathBuf>,
    vector_store: Option<PathBuf>,
    rebuild: bool,
) -> Result<()> {
    if let Some(dir) = raw_docs {
        config.raw_docs_dir = dir;
    }
    if let Some(dir) = vector_store {
        config.vector_store_dir = dir;
    }

    let embeddings = Arc::new(GeminiEmbeddings::new(gemini_config(&config)?)?);
    let indexer = document_indexer(&config, embeddings, rebuild).await?;

    println!(
        "{} Indexing documents from {}",
        "📚".blue(),
        config.raw_docs_dir.display()
    );
    let result = indexer
        .index_directory(&config.raw_docs_dir)
        .await
        .with_context(|| format!("failed to index {}", config.raw_docs_dir.display()))?;
    info!(
        documents = result.documents_indexed,
        chunks = result.chunks_indexed,
        failed = result.documents_failed,
        "index build finished"
    );

    println!(
        "{} Vector store created: {} chunks from {} files",
        "✅".green(),
        result.chunks_indexed,
        result.documents_indexed
    );
    if result.documents_failed > 0 {
        println!(
            "{} {} files could not be indexed:",
            "⚠️".yellow(),
            result.documents_failed
        );
        for error in &result.errors {
            println!("  {} {}", "•".yellow(), error);
        }
    }
    Ok(())
}

pub async fn ask(config: AppConfig, message: String) -> Result<()> {
    let (pipeline, _) = build_pipeline(&config).await?;
    let answer = pipeline.chat(Vec::new(), message).await?;
    println!("{}", answer);
    Ok(())
}

pub async fn stats(config: AppConfig) -> Result<()> {
    let embeddings = Arc::new(GeminiEmbeddings::new(gemini_config(&config)?)?);
    let rag = rag_engine(&config, embeddings).await?;
    let stats = rag.stats().await?;
    println!("{}", serde_json::to_string_pretty(&stats)?);
    Ok(())
}
