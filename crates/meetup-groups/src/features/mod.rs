//! Feature indexing and vectorization.

pub mod vectorizer;
pub mod vocabulary;

pub use vectorizer::{vectorize, FeatureMatrix, GEO_DIMS};
pub use vocabulary::TraitVocabulary;
