//! Axum route handlers for the screening API.

use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::extract::extract_text;
use crate::models::job::JobRow;
use crate::screening::engine::rank;
use crate::state::AppState;
use crate::store;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateJobRequest {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Serialize)]
pub struct CreateJobResponse {
    pub job_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct UploadedResume {
    pub resume_id: Uuid,
    pub name: String,
    pub characters: usize,
}

#[derive(Debug, Serialize)]
pub struct UploadResumesResponse {
    pub resumes: Vec<UploadedResume>,
}

/// One row of the ranking table. `score` is rounded to 4 decimal places for
/// display; the engine computes and sorts on full precision.
#[derive(Debug, Serialize)]
pub struct RankedResume {
    pub identifier: String,
    pub score: f64,
}

#[derive(Debug, Serialize)]
pub struct ScreenJobResponse {
    pub job_id: Uuid,
    pub ranking: Vec<RankedResume>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/jobs
pub async fn handle_create_job(
    State(state): State<AppState>,
    Json(req): Json<CreateJobRequest>,
) -> Result<Json<CreateJobResponse>, AppError> {
    let title = req.title.trim();
    let description = req.description.trim();
    if title.is_empty() {
        return Err(AppError::InvalidInput("empty job title".to_string()));
    }
    if description.is_empty() {
        return Err(AppError::InvalidInput("empty job description".to_string()));
    }

    let job_id = store::insert_job(&state.db, title, description).await?;
    Ok(Json(CreateJobResponse { job_id }))
}

/// GET /api/v1/jobs
pub async fn handle_list_jobs(
    State(state): State<AppState>,
) -> Result<Json<Vec<JobRow>>, AppError> {
    let jobs = store::list_jobs(&state.db).await?;
    Ok(Json(jobs))
}

/// POST /api/v1/jobs/:id/resumes
///
/// Multipart upload, one part per file. The whole batch is rejected if any
/// file has an unsupported format or extracts to empty text, with the
/// offending file named — nothing is silently dropped. Validation runs over
/// every file before anything is persisted, and the inserts themselves share
/// one transaction, so a rejected upload leaves no rows behind.
pub async fn handle_upload_resumes(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<UploadResumesResponse>, AppError> {
    // Fail with NotFound before touching any file if the job is unknown.
    store::get_job(&state.db, job_id).await?;

    // Phase 1: read the whole body.
    let mut files: Vec<(String, Vec<u8>)> = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidInput(format!("Malformed multipart body: {e}")))?
    {
        let Some(filename) = field.file_name().map(str::to_string) else {
            continue; // non-file form fields are ignored
        };
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::InvalidInput(format!("Failed to read '{filename}': {e}")))?;
        files.push((filename, bytes.to_vec()));
    }

    // Phase 2: extract and validate every file before any insert.
    let texts = extract_upload_batch(&files)?;

    // Phase 3: persist the batch atomically.
    let new_resumes: Vec<store::NewResume<'_>> = files
        .iter()
        .zip(&texts)
        .map(|((filename, _), text)| store::NewResume {
            name: filename,
            email: None,
            phone: None,
            skills: None,
            extracted_text: text,
            job_id: Some(job_id),
        })
        .collect();
    let ids = store::insert_resumes(&state.db, &new_resumes).await?;

    let resumes = files
        .into_iter()
        .zip(texts)
        .zip(ids)
        .map(|(((name, _), text), resume_id)| UploadedResume {
            resume_id,
            name,
            characters: text.len(),
        })
        .collect();

    Ok(Json(UploadResumesResponse { resumes }))
}

/// Extracts text from every uploaded file, or fails the whole batch on the
/// first unsupported, unreadable, or empty one. Returns one text per file,
/// same order — callers only persist after this succeeds.
fn extract_upload_batch(files: &[(String, Vec<u8>)]) -> Result<Vec<String>, AppError> {
    if files.is_empty() {
        return Err(AppError::InvalidInput(
            "No files found in upload".to_string(),
        ));
    }

    let mut texts = Vec::with_capacity(files.len());
    for (filename, bytes) in files {
        let text = extract_text(filename, bytes)?;
        if text.trim().is_empty() {
            return Err(AppError::InvalidInput(format!(
                "'{filename}' contains no extractable text"
            )));
        }
        texts.push(text);
    }
    Ok(texts)
}

/// POST /api/v1/jobs/:id/screen
///
/// Ranks every resume attached to the job against its description. Zero
/// attached resumes is a valid outcome and returns an empty ranking.
pub async fn handle_screen_job(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> Result<Json<ScreenJobResponse>, AppError> {
    let job = store::get_job(&state.db, job_id).await?;
    let candidates = store::get_resumes_for_job(&state.db, job_id).await?;

    tracing::info!(
        "Screening {} resumes against job {job_id} ({})",
        candidates.len(),
        job.title
    );

    let results = rank(state.embedder.as_ref(), &job.description, &candidates).await?;

    let ranking = results
        .into_iter()
        .map(|r| RankedResume {
            identifier: r.identifier,
            score: round4(r.score),
        })
        .collect();

    Ok(Json(ScreenJobResponse { job_id, ranking }))
}

fn round4(score: f32) -> f64 {
    (f64::from(score) * 10_000.0).round() / 10_000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str, content: &str) -> (String, Vec<u8>) {
        (name.to_string(), content.as_bytes().to_vec())
    }

    #[test]
    fn test_round4_truncates_to_four_places() {
        assert_eq!(round4(0.123_456_78), 0.1235);
        assert_eq!(round4(-0.999_99), -1.0);
        assert_eq!(round4(0.0), 0.0);
    }

    #[test]
    fn test_valid_batch_extracts_one_text_per_file_in_order() {
        let files = vec![file("a.txt", "alice"), file("b.txt", "bob")];
        let texts = extract_upload_batch(&files).unwrap();
        assert_eq!(texts, vec!["alice", "bob"]);
    }

    #[test]
    fn test_one_unsupported_file_rejects_the_whole_batch() {
        // the good file must not survive the bad one: no partial output
        let files = vec![file("good.txt", "fine"), file("bad.odt", "nope")];
        let err = extract_upload_batch(&files).unwrap_err();
        match err {
            AppError::InvalidInput(msg) => assert!(msg.contains("bad.odt")),
            other => panic!("expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_one_empty_file_rejects_the_whole_batch() {
        let files = vec![file("good.txt", "fine"), file("blank.txt", "   \n ")];
        let err = extract_upload_batch(&files).unwrap_err();
        match err {
            AppError::InvalidInput(msg) => assert!(msg.contains("blank.txt")),
            other => panic!("expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_upload_is_rejected() {
        assert!(extract_upload_batch(&[]).is_err());
    }
}
