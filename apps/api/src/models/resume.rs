use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ResumeRow {
    pub id: Uuid,
    /// Original filename of the upload; the screening identifier is derived
    /// from this, de-duplicated by the store when two uploads share a name.
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub skills: Option<String>,
    pub extracted_text: String,
    pub job_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}
