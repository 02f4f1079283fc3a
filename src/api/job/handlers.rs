use actix_web::{
    HttpResponse, ResponseError, delete, get, http::StatusCode, patch, post,
    web::{Data, Path, ServiceConfig, scope},
};
use actix_web_validator::Json;
use tracing::{error, warn};

use super::dto::{JobListResponse, MessageResponse};
use super::models::{NewJob, UpdateJob};
use crate::db::job_repository::{JobRepository, RepositoryError};

/// Wire mapping for repository errors. The repository stays transport-free;
/// this is the only place error kinds become HTTP statuses. Internal failures
/// are logged in full but never echoed to the caller.
impl ResponseError for RepositoryError {
    fn status_code(&self) -> StatusCode {
        match self {
            RepositoryError::Conflict(_) => StatusCode::CONFLICT,
            RepositoryError::NotFound(_) => StatusCode::NOT_FOUND,
            RepositoryError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            RepositoryError::Conflict(url) => {
                warn!("Rejected duplicate job url: {}", url);
                HttpResponse::Conflict()
                    .json(MessageResponse::new("Job already exists with this URL"))
            }
            RepositoryError::NotFound(id) => {
                warn!("Job not found: {}", id);
                HttpResponse::NotFound().json(MessageResponse::new("Job not found"))
            }
            RepositoryError::Internal(e) => {
                error!("Database error: {:?}", e);
                HttpResponse::InternalServerError()
                    .json(MessageResponse::new("Something went wrong"))
            }
        }
    }
}

#[post("")]
async fn create_job(
    repository: Data<JobRepository>,
    job: Json<NewJob>,
) -> Result<HttpResponse, RepositoryError> {
    let created = repository.create(&job).await?;
    Ok(HttpResponse::Created().json(created))
}

#[get("")]
async fn list_jobs(repository: Data<JobRepository>) -> Result<HttpResponse, RepositoryError> {
    let jobs = repository.list().await?;
    Ok(HttpResponse::Ok().json(JobListResponse { jobs }))
}

#[get("/{id}")]
async fn fetch_job(
    repository: Data<JobRepository>,
    id: Path<i32>,
) -> Result<HttpResponse, RepositoryError> {
    let job = repository.get_by_id(id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(job))
}

#[patch("/{id}")]
async fn update_job(
    repository: Data<JobRepository>,
    id: Path<i32>,
    changes: Json<UpdateJob>,
) -> Result<HttpResponse, RepositoryError> {
    let updated = repository.update(id.into_inner(), &changes).await?;
    Ok(HttpResponse::Ok().json(updated))
}

#[delete("/{id}")]
async fn delete_job(
    repository: Data<JobRepository>,
    id: Path<i32>,
) -> Result<HttpResponse, RepositoryError> {
    repository.delete(id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(MessageResponse::new("Job deleted successfully")))
}

pub fn job_config(config: &mut ServiceConfig) {
    config.service(
        scope("jobs")
            .service(create_job)
            .service(list_jobs)
            .service(fetch_job)
            .service(update_job)
            .service(delete_job),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_kinds_map_to_expected_statuses() {
        let conflict = RepositoryError::Conflict("https://x.com/1".to_string());
        assert_eq!(conflict.status_code(), StatusCode::CONFLICT);

        let not_found = RepositoryError::NotFound(7);
        assert_eq!(not_found.status_code(), StatusCode::NOT_FOUND);

        let internal = RepositoryError::Internal(sqlx::Error::RowNotFound);
        assert_eq!(internal.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn internal_error_body_stays_generic() {
        let internal = RepositoryError::Internal(sqlx::Error::PoolClosed);
        let response = internal.error_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
