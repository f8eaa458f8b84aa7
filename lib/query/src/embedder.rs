//! Text embedding seam
//!
//! Binding a record into a query turns each vector field's text into an
//! embedding. Model-backed providers live outside this crate and plug in
//! through [`Embedder`]; [`HashingEmbedder`] is a deterministic local
//! implementation for development and tests.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Dimension of the embeddings stored in the index
pub const DEFAULT_EMBEDDING_DIM: usize = 1024;

#[derive(Debug, Clone, thiserror::Error)]
pub enum EmbedError {
    #[error("Embedding provider failed: {0}")]
    Provider(String),

    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    Dimension { expected: usize, actual: usize },
}

/// Turns text into a dense vector
pub trait Embedder: Send + Sync {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError>;

    fn dimension(&self) -> usize;
}

/// Trigram + word feature hashing, L2-normalized
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dim: usize,
}

impl HashingEmbedder {
    pub fn new(dim: usize) -> Self {
        Self { dim: dim.max(1) }
    }
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self::new(DEFAULT_EMBEDDING_DIM)
    }
}

fn bucket<T: Hash + ?Sized>(item: &T, dim: usize) -> usize {
    let mut hasher = DefaultHasher::new();
    item.hash(&mut hasher);
    (hasher.finish() as usize) % dim
}

impl Embedder for HashingEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
        let mut vector = vec![0.0f32; self.dim];
        let normalized = text.to_lowercase();

        let chars: Vec<char> = normalized.chars().collect();
        for window in chars.windows(3) {
            vector[bucket(window, self.dim)] += 1.0;
        }

        // Words weigh more than trigrams
        for word in normalized.split_whitespace() {
            vector[bucket(word, self.dim)] += 2.0;
        }

        let magnitude: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if magnitude > 0.0 {
            for v in &mut vector {
                *v /= magnitude;
            }
        }

        Ok(vector)
    }

    fn dimension(&self) -> usize {
        self.dim
    }
}
