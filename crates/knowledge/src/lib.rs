//! Knowledge store implementation for Askbase.
//!
//! Named collections of embedded texts with cosine-similarity search.

pub mod store;
pub mod vector;

pub use store::VectorKnowledgeStore;
pub use vector::cosine_similarity;
