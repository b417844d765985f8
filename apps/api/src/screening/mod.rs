// Screening core: relevance ranking of resumes against a job description.
// Implements: cosine similarity scoring, the ranking engine, and the handlers
// that drive them. All embedding calls go through the `Embedder` trait —
// no direct HTTP calls here.

pub mod engine;
pub mod handlers;
pub mod similarity;
