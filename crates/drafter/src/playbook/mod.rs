//! Playbook corpus: record model, normalization and loading

pub mod corpus;
pub mod models;
pub mod normalizer;

pub use corpus::{load_corpus, load_documents, normalize_corpus, parse_corpus};
pub use models::{ActionItem, NormalizedDocument, Phase, PlaybookRecord, RecommendedActions};
pub use normalizer::normalize;
