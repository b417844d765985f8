//! Document Store adapter — the only module that issues SQL.
//!
//! The rest of the service depends on these operations alone, so the storage
//! engine is substitutable without touching the screening core.

use std::collections::HashMap;

use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::job::JobRow;
use crate::models::resume::ResumeRow;
use crate::screening::engine::Document;

/// Fields for a new resume row. Contact details are optional — uploads only
/// carry a filename and extracted text; email/phone/skills arrive later if a
/// parsing step fills them in.
pub struct NewResume<'a> {
    pub name: &'a str,
    pub email: Option<&'a str>,
    pub phone: Option<&'a str>,
    pub skills: Option<&'a str>,
    pub extracted_text: &'a str,
    pub job_id: Option<Uuid>,
}

pub async fn insert_job(pool: &PgPool, title: &str, description: &str) -> Result<Uuid, AppError> {
    let id = Uuid::new_v4();
    sqlx::query("INSERT INTO jobs (id, title, description) VALUES ($1, $2, $3)")
        .bind(id)
        .bind(title)
        .bind(description)
        .execute(pool)
        .await?;
    info!("Inserted job {id}: {title}");
    Ok(id)
}

pub async fn list_jobs(pool: &PgPool) -> Result<Vec<JobRow>, AppError> {
    let jobs = sqlx::query_as("SELECT * FROM jobs ORDER BY created_at")
        .fetch_all(pool)
        .await?;
    Ok(jobs)
}

pub async fn get_job(pool: &PgPool, job_id: Uuid) -> Result<JobRow, AppError> {
    let job: Option<JobRow> = sqlx::query_as("SELECT * FROM jobs WHERE id = $1")
        .bind(job_id)
        .fetch_optional(pool)
        .await?;
    job.ok_or_else(|| AppError::NotFound(format!("Job {job_id} not found")))
}

/// Inserts a batch of resumes in one transaction: every row commits or none
/// does, so a failed upload never leaves a partially persisted batch behind.
pub async fn insert_resumes(pool: &PgPool, resumes: &[NewResume<'_>]) -> Result<Vec<Uuid>, AppError> {
    let mut tx = pool.begin().await?;
    let mut ids = Vec::with_capacity(resumes.len());

    for resume in resumes {
        let id = Uuid::new_v4();
        sqlx::query(
            r#"
            INSERT INTO resumes (id, name, email, phone, skills, extracted_text, job_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(id)
        .bind(resume.name)
        .bind(resume.email)
        .bind(resume.phone)
        .bind(resume.skills)
        .bind(resume.extracted_text)
        .bind(resume.job_id)
        .execute(&mut *tx)
        .await?;
        ids.push(id);
    }

    tx.commit().await?;
    info!("Inserted {} resumes", ids.len());
    Ok(ids)
}

/// Fetches the resumes attached to a job as ranking candidates, in upload
/// order. Duplicate filenames are disambiguated here, never silently merged.
pub async fn get_resumes_for_job(pool: &PgPool, job_id: Uuid) -> Result<Vec<Document>, AppError> {
    let rows: Vec<ResumeRow> =
        sqlx::query_as("SELECT * FROM resumes WHERE job_id = $1 ORDER BY created_at, id")
            .bind(job_id)
            .fetch_all(pool)
            .await?;
    Ok(resolve_identifiers(&rows))
}

/// Turns resume rows into ranking documents with unique identifiers.
/// A name shared by several rows gets a short row-id suffix on each.
fn resolve_identifiers(rows: &[ResumeRow]) -> Vec<Document> {
    let mut name_counts: HashMap<&str, usize> = HashMap::new();
    for row in rows {
        *name_counts.entry(row.name.as_str()).or_insert(0) += 1;
    }

    rows.iter()
        .map(|row| {
            let identifier = if name_counts[row.name.as_str()] > 1 {
                let short = row.id.simple().to_string();
                format!("{} ({})", row.name, &short[..8])
            } else {
                row.name.clone()
            };
            Document {
                identifier,
                text: row.extracted_text.clone(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn row(name: &str, text: &str) -> ResumeRow {
        ResumeRow {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: None,
            phone: None,
            skills: None,
            extracted_text: text.to_string(),
            job_id: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_unique_names_pass_through() {
        let rows = vec![row("alice.pdf", "a"), row("bob.pdf", "b")];
        let docs = resolve_identifiers(&rows);
        assert_eq!(docs[0].identifier, "alice.pdf");
        assert_eq!(docs[1].identifier, "bob.pdf");
    }

    #[test]
    fn test_duplicate_names_get_distinct_identifiers() {
        let rows = vec![row("cv.pdf", "first"), row("cv.pdf", "second")];
        let docs = resolve_identifiers(&rows);
        assert_ne!(docs[0].identifier, docs[1].identifier);
        assert!(docs[0].identifier.starts_with("cv.pdf ("));
        assert!(docs[1].identifier.starts_with("cv.pdf ("));
        // texts stay attached to their own rows
        assert_eq!(docs[0].text, "first");
        assert_eq!(docs[1].text, "second");
    }

    #[test]
    fn test_order_is_preserved() {
        let rows = vec![row("c", "1"), row("a", "2"), row("b", "3")];
        let docs = resolve_identifiers(&rows);
        let ids: Vec<&str> = docs.iter().map(|d| d.identifier.as_str()).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }
}
