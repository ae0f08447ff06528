//! Application configuration loaded from the environment

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use askdocs_core::{Error, IndexingConfig, Result, RetryConfig};
use askdocs_pipeline::PipelineConfig;
use askdocs_server::ServerConfig;
use serde::Serialize;

/// Which vector store backs retrieval
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VectorBackend {
    Local,
    Qdrant,
}

impl FromStr for VectorBackend {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "local" => Ok(VectorBackend::Local),
            "qdrant" => Ok(VectorBackend::Qdrant),
            other => Err(Error::Configuration(format!(
                "ASKDOCS_VECTOR_BACKEND must be 'local' or 'qdrant', got '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppConfig {
    pub raw_docs_dir: PathBuf,
    pub vector_store_dir: PathBuf,
    pub backend: VectorBackend,
    pub qdrant_url: String,
    pub qdrant_collection: String,
    pub top_k: usize,
    /// Minimum cosine similarity a chunk needs to be retrieved
    pub score_threshold: Option<f32>,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub retry: RetryConfig,
    pub host: String,
    pub port: u16,
}

impl AppConfig {
    /// Create configuration from environment variables (`.env` included)
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any variable source; unset variables take their defaults
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let text = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let retry = RetryConfig {
            max_attempts: parse(&lookup, "ASKDOCS_MAX_ATTEMPTS", 3)?,
            timeout: Duration::from_secs(parse(&lookup, "ASKDOCS_REQUEST_TIMEOUT_SECS", 60)?),
            ..RetryConfig::default()
        };

        let config = Self {
            raw_docs_dir: PathBuf::from(text("ASKDOCS_RAW_DOCS_DIR", "data/raw_docs")),
            vector_store_dir: PathBuf::from(text("ASKDOCS_VECTOR_STORE_DIR", "data/vector_store")),
            backend: text("ASKDOCS_VECTOR_BACKEND", "local").parse()?,
            qdrant_url: text("QDRANT_URL", "http://localhost:6334"),
            qdrant_collection: text("QDRANT_COLLECTION", "askdocs"),
            top_k: parse(&lookup, "ASKDOCS_TOP_K", 4)?,
            score_threshold: lookup("ASKDOCS_SCORE_THRESHOLD")
                .map(|_| parse(&lookup, "ASKDOCS_SCORE_THRESHOLD", 0.0_f32))
                .transpose()?,
            chunk_size: parse(&lookup, "ASKDOCS_CHUNK_SIZE", 500)?,
            chunk_overlap: parse(&lookup, "ASKDOCS_CHUNK_OVERLAP", 50)?,
            retry,
            host: text("ASKDOCS_HOST", "127.0.0.1"),
            port: parse(&lookup, "ASKDOCS_PORT", 8000)?,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.top_k == 0 {
            return Err(Error::Configuration("ASKDOCS_TOP_K must be at least 1".to_string()));
        }
        if let Some(threshold) = self.score_threshold {
            if !(-1.0..=1.0).contains(&threshold) {
                return Err(Error::Configuration(format!(
                    "ASKDOCS_SCORE_THRESHOLD must be between -1 and 1, got {}",
                    threshold
                )));
            }
        }
        if self.retry.max_attempts == 0 {
            return Err(Error::Configuration(
                "ASKDOCS_MAX_ATTEMPTS must be at least 1".to_string(),
            ));
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(Error::Configuration(format!(
                "ASKDOCS_CHUNK_OVERLAP ({}) must be smaller than ASKDOCS_CHUNK_SIZE ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }
        Ok(())
    }

    pub fn pipeline(&self) -> PipelineConfig {
        PipelineConfig {
            top_k: self.top_k,
            score_threshold: self.score_threshold,
        }
    }

    pub fn indexing(&self) -> IndexingConfig {
        IndexingConfig {
            chunk_size: self.chunk_size,
            chunk_overlap: self.chunk_overlap,
            ..IndexingConfig::default()
        }
    }

    pub fn server(&self) -> ServerConfig {
        ServerConfig {
            host: self.host.clone(),
            port: self.port,
        }
    }
}

fn parse<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T> {
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|_| {
            Error::Configuration(format!("{} has an invalid value '{}'", key, raw))
        }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults_snapshot() {
        let config = AppConfig::from_lookup(lookup(&[])).unwrap();

        insta::assert_yaml_snapshot!(config, @r###"
        raw_docs_dir: data/raw_docs
        vector_store_dir: data/vector_store
        backend: local
        qdrant_url: "http://localhost:6334"
        qdrant_collection: askdocs
        top_k: 4
        score_threshold: ~
        chunk_size: 500
        chunk_overlap: 50
        retry:
          max_attempts: 3
          timeout:
            secs: 60
            nanos: 0
          initial_backoff:
            secs: 0
            nanos: 500000000
          max_backoff:
            secs: 8
            nanos: 0
        host: 127.0.0.1
        port: 8000
        "###);
    }

    #[test]
    fn test_overrides() {
        let config = AppConfig::from_lookup(lookup(&[
            ("ASKDOCS_VECTOR_BACKEND", "Qdrant"),
            ("ASKDOCS_TOP_K", "6"),
            ("ASKDOCS_PORT", "9000"),
            ("ASKDOCS_REQUEST_TIMEOUT_SECS", "15"),
            ("ASKDOCS_SCORE_THRESHOLD", "0.35"),
        ]))
        .unwrap();

        assert_eq!(config.pipeline().score_threshold, Some(0.35));
        assert_eq!(config.backend, VectorBackend::Qdrant);
        assert_eq!(config.pipeline().top_k, 6);
        assert_eq!(config.server().port, 9000);
        assert_eq!(config.retry.timeout, Duration::from_secs(15));
    }

    #[test]
    fn test_invalid_values_are_configuration_errors() {
        let cases: &[(&str, &str)] = &[
            ("ASKDOCS_TOP_K", "four"),
            ("ASKDOCS_TOP_K", "0"),
            ("ASKDOCS_PORT", "99999"),
            ("ASKDOCS_VECTOR_BACKEND", "pinecone"),
            ("ASKDOCS_CHUNK_OVERLAP", "500"),
            ("ASKDOCS_SCORE_THRESHOLD", "high"),
            ("ASKDOCS_SCORE_THRESHOLD", "1.5"),
        ];

        for &(key, value) in cases {
            let err = AppConfig::from_lookup(lookup(&[(key, value)])).unwrap_err();
            assert!(
                matches!(err, Error::Configuration(_)),
                "{}={} should be rejected",
                key,
                value
            );
        }
    }
}
