use askdocs_core::{EmbeddingProvider, Result};
use async_trait::async_trait;

/// Hashed bag-of-words embedding.
///
/// Texts sharing words land close together under cosine similarity, which
/// is enough to make retrieval tests meaningful without a remote model.
#[derive(Debug, Clone)]
pub struct KeywordEmbeddings {
    dimensions: usize,
}

impl KeywordEmbeddings {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
        }
    }

    pub fn embed(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0_f32; self.dimensions];
        let lowered = text.to_lowercase();
        for token in lowered
            .split(|c: char| !c.is_alphanumeric())
            .filter(|token| !token.is_empty())
        {
            let slot = (fnv1a(token) % self.dimensions as u64) as usize;
            vector[slot] += 1.0;
        }

        let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            vector.iter_mut().for_each(|x| *x /= norm);
        }
        vector
    }
}

impl Default for KeywordEmbeddings {
    fn default() -> Self {
        Self::new(64)
    }
}

fn fnv1a(token: &str) -> u64 {
    token.bytes().fold(0xcbf29ce484222325, |hash, byte| {
        (hash ^ byte as u64).wrapping_mul(0x100000001b3)
    })
}

#[async_trait]
impl EmbeddingProvider for KeywordEmbeddings {
    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|text| self.embed(text)).collect())
    }

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        Ok(self.embed(text))
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}
