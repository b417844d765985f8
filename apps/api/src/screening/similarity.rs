//! Similarity Scorer — pairwise cosine similarity between one reference
//! vector and N candidate vectors.

use crate::errors::AppError;

/// Scores each candidate against the reference. One score per candidate,
/// same order as the input.
///
/// All vectors must share the reference's dimensionality; a mismatch is a
/// contract violation between the embedder and this scorer, surfaced as
/// `DimensionMismatch` rather than silently scored.
pub fn score(reference: &[f32], candidates: &[Vec<f32>]) -> Result<Vec<f32>, AppError> {
    candidates
        .iter()
        .map(|candidate| cosine_similarity(reference, candidate))
        .collect()
}

/// Cosine similarity: dot product over the product of Euclidean norms.
/// A zero-norm vector on either side scores exactly 0 — an explicit branch,
/// not a caught division error.
fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32, AppError> {
    if a.len() != b.len() {
        return Err(AppError::DimensionMismatch {
            expected: a.len(),
            got: b.len(),
        });
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        Ok(0.0)
    } else {
        Ok(dot / (norm_a * norm_b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_vectors_score_one() {
        let v = vec![0.3, 0.4, 0.5];
        let scores = score(&v, &[v.clone()]).unwrap();
        assert!((scores[0] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_orthogonal_vectors_score_zero() {
        let scores = score(&[1.0, 0.0], &[vec![0.0, 1.0]]).unwrap();
        assert!(scores[0].abs() < 1e-6);
    }

    #[test]
    fn test_opposite_vectors_score_negative_one() {
        let scores = score(&[1.0, 2.0], &[vec![-1.0, -2.0]]).unwrap();
        assert!((scores[0] + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_zero_norm_candidate_scores_exactly_zero() {
        let scores = score(&[1.0, 2.0], &[vec![0.0, 0.0]]).unwrap();
        assert_eq!(scores[0], 0.0);
    }

    #[test]
    fn test_zero_norm_reference_scores_exactly_zero() {
        let scores = score(&[0.0, 0.0], &[vec![1.0, 2.0]]).unwrap();
        assert_eq!(scores[0], 0.0);
    }

    #[test]
    fn test_dimension_mismatch_is_an_error() {
        let err = score(&[1.0, 2.0], &[vec![1.0, 2.0, 3.0]]).unwrap_err();
        match err {
            AppError::DimensionMismatch { expected, got } => {
                assert_eq!(expected, 2);
                assert_eq!(got, 3);
            }
            other => panic!("expected DimensionMismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_scores_bounded_to_unit_interval() {
        let reference = vec![0.1, -0.7, 0.3, 0.9];
        let candidates = vec![
            vec![0.5, 0.5, 0.5, 0.5],
            vec![-0.9, 0.1, -0.2, 0.4],
            vec![3.0, -21.0, 9.0, 27.0],
        ];
        for s in score(&reference, &candidates).unwrap() {
            assert!(s >= -1.0 - 1e-6 && s <= 1.0 + 1e-6, "score {s} out of range");
        }
    }

    #[test]
    fn test_one_score_per_candidate_in_order() {
        let reference = vec![1.0, 0.0];
        let candidates = vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![-1.0, 0.0]];
        let scores = score(&reference, &candidates).unwrap();
        assert_eq!(scores.len(), 3);
        assert!(scores[0] > scores[1]);
        assert!(scores[1] > scores[2]);
    }
}
