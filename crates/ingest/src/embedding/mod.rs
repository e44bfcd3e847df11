pub mod cache;
pub mod hashing;
pub mod local;
pub mod traits;

pub use cache::CachedEmbedder;
pub use hashing::HashingEmbedder;
pub use local::{LocalEmbedder, MINILM_DIMENSIONS};
pub use traits::{Embedder, EmbeddingError};
