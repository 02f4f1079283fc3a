use sqlx::{Pool, Postgres};
use std::fmt;
use tracing::debug;

use crate::api::job::{NewJob, UpdateJob};
use crate::db::models::JobRow;

/// Errors the repository can surface to callers.
///
/// These are storage-outcome classifications only; mapping them to HTTP
/// statuses happens in the API layer.
#[derive(Debug)]
pub enum RepositoryError {
    /// A job with the same URL already exists
    Conflict(String),

    /// No job row matches the requested id
    NotFound(i32),

    /// The database failed, or returned something that breaks its contract
    Internal(sqlx::Error),
}

impl fmt::Display for RepositoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RepositoryError::Conflict(url) => {
                write!(f, "Job already exists with this URL: {}", url)
            }
            RepositoryError::NotFound(id) => write!(f, "Job not found: {}", id),
            RepositoryError::Internal(e) => write!(f, "Database error: {}", e),
        }
    }
}

impl std::error::Error for RepositoryError {}

/// Repository for Job database operations
///
/// Owns the business rules around jobs: URL uniqueness on create, existence
/// checks before fetch/update/delete, and partial-update assembly. All state
/// lives in the pool; the repository itself is stateless and safe to share
/// across requests.
pub struct JobRepository {
    pool: Pool<Postgres>,
}

impl JobRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Create a new job and return the full record as stored.
    ///
    /// The URL check and the insert are two round-trips; concurrent creates
    /// with the same URL can slip past the check (see DESIGN.md).
    pub async fn create(&self, job: &NewJob) -> Result<JobRow, RepositoryError> {
        debug!("Creating job: url={}, title={}", job.url, job.title);

        if self.get_by_url(&job.url).await?.is_some() {
            return Err(RepositoryError::Conflict(job.url.clone()));
        }

        let row = sqlx::query_as::<_, JobRow>(
            r#"
            INSERT INTO jobs (url, title, description, company, location, logo, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, url, title, description, company, location, logo, status, created_at, updated_at
            "#,
        )
        .bind(&job.url)
        .bind(&job.title)
        .bind(&job.description)
        .bind(&job.company)
        .bind(&job.location)
        .bind(&job.logo)
        .bind(job.status.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(RepositoryError::Internal)?;

        debug!("Job created with id={}", row.id);
        Ok(row)
    }

    /// All jobs in storage order. No ordering is guaranteed.
    pub async fn list(&self) -> Result<Vec<JobRow>, RepositoryError> {
        sqlx::query_as::<_, JobRow>(
            "SELECT id, url, title, description, company, location, logo, status, created_at, updated_at FROM jobs",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(RepositoryError::Internal)
    }

    /// Fetch a job by id, failing with `NotFound` when absent.
    ///
    /// This is the canonical existence check; update and delete go through it
    /// before touching anything.
    pub async fn get_by_id(&self, id: i32) -> Result<JobRow, RepositoryError> {
        let row = sqlx::query_as::<_, JobRow>(
            "SELECT id, url, title, description, company, location, logo, status, created_at, updated_at FROM jobs WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(RepositoryError::Internal)?;

        row.ok_or(RepositoryError::NotFound(id))
    }

    /// Fetch a job by URL. Absence is an ordinary `None`, not an error; this
    /// backs the uniqueness check in [`create`](Self::create).
    pub async fn get_by_url(&self, url: &str) -> Result<Option<JobRow>, RepositoryError> {
        sqlx::query_as::<_, JobRow>(
            "SELECT id, url, title, description, company, location, logo, status, created_at, updated_at FROM jobs WHERE url = $1",
        )
        .bind(url)
        .fetch_optional(&self.pool)
        .await
        .map_err(RepositoryError::Internal)
    }

    /// Apply a partial update: only the supplied fields change, everything
    /// else keeps its prior value, and `updated_at` is bumped by the database.
    ///
    /// An empty field set is a no-op that returns the current row without
    /// issuing a write. Otherwise the row is re-read after the update so the
    /// caller observes the stored state, including the new `updated_at`.
    pub async fn update(&self, id: i32, changes: &UpdateJob) -> Result<JobRow, RepositoryError> {
        let current = self.get_by_id(id).await?;

        let fields = changed_fields(changes);
        if fields.is_empty() {
            debug!("Update for job {} supplied no fields, skipping write", id);
            return Ok(current);
        }

        let statement = build_update_statement(&fields);
        debug!("Updating job {}: {} field(s)", id, fields.len());

        let mut query = sqlx::query(&statement);
        for (_, value) in fields {
            query = query.bind(value);
        }
        query
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(RepositoryError::Internal)?;

        self.get_by_id(id).await
    }

    /// Delete a job, failing with `NotFound` when it does not exist.
    ///
    /// The existence check and the delete are separate statements; losing a
    /// race to a concurrent delete still reports success.
    pub async fn delete(&self, id: i32) -> Result<(), RepositoryError> {
        self.get_by_id(id).await?;

        sqlx::query("DELETE FROM jobs WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(RepositoryError::Internal)?;

        debug!("Job {} deleted", id);
        Ok(())
    }
}

/// Ordered (column, value) pairs for the fields present in an update payload.
///
/// Column names are fixed literals; payload values only ever travel through
/// bind parameters, so field-name confusion cannot reach the SQL text.
fn changed_fields(changes: &UpdateJob) -> Vec<(&'static str, String)> {
    let mut fields = Vec::new();

    if let Some(url) = &changes.url {
        fields.push(("url", url.clone()));
    }
    if let Some(title) = &changes.title {
        fields.push(("title", title.clone()));
    }
    if let Some(description) = &changes.description {
        fields.push(("description", description.clone()));
    }
    if let Some(company) = &changes.company {
        fields.push(("company", company.clone()));
    }
    if let Some(location) = &changes.location {
        fields.push(("location", location.clone()));
    }
    if let Some(logo) = &changes.logo {
        fields.push(("logo", logo.clone()));
    }
    if let Some(status) = changes.status {
        fields.push(("status", status.as_str().to_string()));
    }

    fields
}

/// Build the UPDATE statement for a non-empty field list, with `$1..$n` for
/// the values and `$n+1` for the id. `updated_at` rides along on every write.
fn build_update_statement(fields: &[(&'static str, String)]) -> String {
    let set_clause: Vec<String> = fields
        .iter()
        .enumerate()
        .map(|(i, (column, _))| format!("{} = ${}", column, i + 1))
        .collect();

    format!(
        "UPDATE jobs SET {}, updated_at = NOW() WHERE id = ${}",
        set_clause.join(", "),
        fields.len() + 1
    )
}


// Exercise the repository against a live database. Run with:
//   DATABASE_URL=postgres://... cargo test -- --ignored
#[cfg(test)]
mod pg_tests {
    use super::*;
    use crate::api::job::JobStatus;
    use std::time::{SystemTime, UNIX_EPOCH};

    async fn test_repository() -> JobRepository {
        let database_url =
            std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for database tests");
        let pool = crate::db::connection::get_connection(&database_url, 2)
            .await
            .expect("Failed to connect to database");
        crate::db::migrations::run_migrations(&pool)
            .await
            .expect("Failed to run database migrations");
        JobRepository::new(pool)
    }

    fn unique_url(tag: &str) -> String {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        format!("https://example.com/{}/{}", tag, nanos)
    }

    fn dev_job(url: String) -> NewJob {
        NewJob {
            url,
            title: "Dev".to_string(),
            description: None,
            company: "Acme".to_string(),
            location: None,
            logo: None,
            status: JobStatus::default(),
        }
    }

    #[actix_web::test]
    #[ignore = "needs a running Postgres via DATABASE_URL"]
    async fn create_assigns_id_and_defaults_then_round_trips() {
        let repo = test_repository().await;

        let created = repo
            .create(&dev_job(unique_url("round-trip")))
            .await
            .expect("create failed");
        assert!(created.id > 0);
        assert_eq!(created.status, "applied");
        assert_eq!(created.title, "Dev");
        assert_eq!(created.company, "Acme");

        let fetched = repo.get_by_id(created.id).await.expect("fetch failed");
        assert_eq!(fetched, created);

        repo.delete(created.id).await.expect("cleanup failed");
    }

    #[actix_web::test]
    #[ignore = "needs a running Postgres via DATABASE_URL"]
    async fn duplicate_url_conflicts_and_leaves_store_unchanged() {
        let repo = test_repository().await;

        let url = unique_url("conflict");
        let first = repo.create(&dev_job(url.clone())).await.expect("create failed");

        let second = repo.create(&dev_job(url.clone())).await;
        assert!(matches!(second, Err(RepositoryError::Conflict(_))));

        let survivor = repo
            .get_by_url(&url)
            .await
            .expect("lookup failed")
            .expect("original job vanished");
        assert_eq!(survivor.id, first.id);

        repo.delete(first.id).await.expect("cleanup failed");
    }

    #[actix_web::test]
    #[ignore = "needs a running Postgres via DATABASE_URL"]
    async fn missing_id_fails_with_not_found_everywhere() {
        let repo = test_repository().await;

        // A freshly deleted id is guaranteed absent.
        let created = repo
            .create(&dev_job(unique_url("missing")))
            .await
            .expect("create failed");
        let id = created.id;
        repo.delete(id).await.expect("delete failed");

        assert!(matches!(
            repo.get_by_id(id).await,
            Err(RepositoryError::NotFound(_))
        ));
        assert!(matches!(
            repo.update(id, &UpdateJob::default()).await,
            Err(RepositoryError::NotFound(_))
        ));
        assert!(matches!(
            repo.delete(id).await,
            Err(RepositoryError::NotFound(_))
        ));
    }

    #[actix_web::test]
    #[ignore = "needs a running Postgres via DATABASE_URL"]
    async fn partial_update_merges_and_bumps_updated_at() {
        let repo = test_repository().await;

        let created = repo
            .create(&dev_job(unique_url("merge")))
            .await
            .expect("create failed");

        let changes = UpdateJob {
            title: Some("Staff Dev".to_string()),
            ..UpdateJob::default()
        };
        let updated = repo.update(created.id, &changes).await.expect("update failed");

        assert_eq!(updated.title, "Staff Dev");
        assert_eq!(updated.company, created.company);
        assert_eq!(updated.url, created.url);
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at > created.updated_at);

        repo.delete(created.id).await.expect("cleanup failed");
    }

    #[actix_web::test]
    #[ignore = "needs a running Postgres via DATABASE_URL"]
    async fn empty_update_is_a_no_op() {
        let repo = test_repository().await;

        let created = repo
            .create(&dev_job(unique_url("no-op")))
            .await
            .expect("create failed");

        let unchanged = repo
            .update(created.id, &UpdateJob::default())
            .await
            .expect("update failed");
        assert_eq!(unchanged, created);

        repo.delete(created.id).await.expect("cleanup failed");
    }

    #[actix_web::test]
    #[ignore = "needs a running Postgres via DATABASE_URL"]
    async fn status_update_leaves_other_fields_alone() {
        let repo = test_repository().await;

        let created = repo
            .create(&dev_job(unique_url("status")))
            .await
            .expect("create failed");

        let changes = UpdateJob {
            status: Some(JobStatus::Rejected),
            ..UpdateJob::default()
        };
        let updated = repo.update(created.id, &changes).await.expect("update failed");

        assert_eq!(updated.status, "rejected");
        assert_eq!(updated.title, created.title);
        assert_eq!(updated.company, created.company);

        repo.delete(created.id).await.expect("cleanup failed");
    }

    #[actix_web::test]
    #[ignore = "needs a running Postgres via DATABASE_URL"]
    async fn delete_is_final() {
        let repo = test_repository().await;

        let created = repo
            .create(&dev_job(unique_url("finality")))
            .await
            .expect("create failed");

        repo.delete(created.id).await.expect("delete failed");

        assert!(matches!(
            repo.get_by_id(created.id).await,
            Err(RepositoryError::NotFound(_))
        ));
    }
}
