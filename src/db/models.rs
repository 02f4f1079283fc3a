use chrono::NaiveDateTime;
use serde::Serialize;
use sqlx::FromRow;

/// Database representation of a job with all fields
///
/// Serialized with camelCase keys so `created_at`/`updated_at` appear on the
/// wire as `createdAt`/`updatedAt`.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRow {
    pub id: i32,
    pub url: String,
    pub title: String,
    pub description: Option<String>,
    pub company: String,
    pub location: Option<String>,
    pub logo: Option<String>,
    pub status: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}
