pub mod embeddings;
pub mod generation;
pub mod index;
pub mod memory;
pub mod vector_database;

#[cfg(feature = "lancedb-store")]
pub mod lancedb;

pub use embeddings::{Embedder, HashingEmbedder, OpenAiEmbedder, SharedEmbedder};
pub use generation::{Generator, OpenAiGenerator};
pub use index::{PlaybookIndex, PopulateOutcome};
pub use memory::MemoryVectorDatabase;
pub use vector_database::{IndexEntry, VectorDatabase, VectorSearchResult};
