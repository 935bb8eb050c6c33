// Candidate-to-position matching.
// Implements: storage retrieval, in-process refinement, similarity ranking, paging.
// Similarity scores are produced upstream; nothing here computes embeddings.

pub mod handlers;
pub mod pipeline;
pub mod ranker;
pub mod retriever;

pub use retriever::{CandidateStore, PgCandidateStore};
