//! Ranking Engine — embeds a job description and its candidate resumes in one
//! batch, scores them, and returns a deterministically ordered ranking.
//!
//! The engine is stateless and holds no locks; concurrent ranking requests
//! are independent. The embedder call is the one suspension point.

use serde::{Deserialize, Serialize};

use crate::embedder::Embedder;
use crate::errors::AppError;
use crate::screening::similarity;

/// A candidate document for one ranking call. Identifiers are unique within
/// a request — uniqueness is the store adapter's guarantee, not the engine's.
#[derive(Debug, Clone)]
pub struct Document {
    pub identifier: String,
    pub text: String,
}

/// One ranked candidate. The score is full-precision cosine similarity in
/// [-1, 1]; rounding for display is the presentation layer's concern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredResult {
    pub identifier: String,
    pub score: f32,
}

/// Ranks `candidates` against `reference_text` by semantic relevance,
/// descending. The result contains exactly one entry per candidate.
///
/// The whole batch `[reference] ++ candidates` goes to the embedder in a
/// single call: it amortizes per-call overhead and keeps output reproducible
/// if the encoder applies any batch-relative normalization.
///
/// Ties are broken by the candidates' original order (the sort is stable),
/// so identical inputs with a deterministic embedder produce identical
/// output. An empty candidate slice returns an empty ranking; an empty
/// reference is `InvalidInput`, raised before the embedder is ever called.
pub async fn rank(
    embedder: &dyn Embedder,
    reference_text: &str,
    candidates: &[Document],
) -> Result<Vec<ScoredResult>, AppError> {
    if reference_text.trim().is_empty() {
        return Err(AppError::InvalidInput("empty reference".to_string()));
    }

    if candidates.is_empty() {
        return Ok(vec![]);
    }

    let mut batch = Vec::with_capacity(candidates.len() + 1);
    batch.push(reference_text.to_string());
    batch.extend(candidates.iter().map(|c| c.text.clone()));

    let embeddings = embedder.embed(&batch).await?;

    // The HTTP client already validates the count, but a test double or a
    // future backend might not.
    if embeddings.len() != batch.len() {
        return Err(AppError::EmbeddingUnavailable(format!(
            "embedder returned {} vectors for {} texts",
            embeddings.len(),
            batch.len()
        )));
    }

    let reference_vector = &embeddings[0];
    let candidate_vectors = &embeddings[1..];

    let scores = similarity::score(reference_vector, candidate_vectors)?;

    // Positional zip: identifiers and scores correspond only by the batch
    // order established above.
    let mut results: Vec<ScoredResult> = candidates
        .iter()
        .zip(scores)
        .map(|(doc, score)| ScoredResult {
            identifier: doc.identifier.clone(),
            score,
        })
        .collect();

    // sort_by is stable: equal scores keep insertion order.
    results.sort_by(|a, b| b.score.total_cmp(&a.score));

    Ok(results)
}
