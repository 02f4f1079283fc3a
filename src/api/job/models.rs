use serde::{Deserialize, Serialize};
use validator::Validate;

/// Job status enum representing where an application stands
#[derive(Debug, Default, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    #[default]
    Applied,
    InProgress,
    Offer,
    Rejected,
}

impl JobStatus {
    /// The value stored in the jobs.status column
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Applied => "applied",
            JobStatus::InProgress => "in_progress",
            JobStatus::Offer => "offer",
            JobStatus::Rejected => "rejected",
        }
    }
}

/// Payload for creating a job
#[derive(Debug, Deserialize, Validate)]
pub struct NewJob {
    #[validate(length(min = 1, message = "url must not be empty"))]
    pub url: String,

    #[validate(length(min = 1, message = "title must not be empty"))]
    pub title: String,

    pub description: Option<String>,

    #[validate(length(min = 1, message = "company must not be empty"))]
    pub company: String,

    pub location: Option<String>,
    pub logo: Option<String>,

    /// Defaults to `applied` when omitted
    #[serde(default)]
    pub status: JobStatus,
}

/// Partial-update payload; omitted fields keep their stored values
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateJob {
    #[validate(length(min = 1, message = "url must not be empty"))]
    pub url: Option<String>,

    #[validate(length(min = 1, message = "title must not be empty"))]
    pub title: Option<String>,

    pub description: Option<String>,

    #[validate(length(min = 1, message = "company must not be empty"))]
    pub company: Option<String>,

    pub location: Option<String>,
    pub logo: Option<String>,
    pub status: Option<JobStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_defaults_to_applied() {
        assert_eq!(JobStatus::default(), JobStatus::Applied);
    }

    #[test]
    fn status_wire_format_is_snake_case() {
        assert_eq!(
            serde_json::to_string(&JobStatus::InProgress).unwrap(),
            "\"in_progress\""
        );
        let parsed: JobStatus = serde_json::from_str("\"offer\"").unwrap();
        assert_eq!(parsed, JobStatus::Offer);
        assert!(serde_json::from_str::<JobStatus>("\"hired\"").is_err());
    }

    #[test]
    fn status_column_values_match_wire_format() {
        for status in [
            JobStatus::Applied,
            JobStatus::InProgress,
            JobStatus::Offer,
            JobStatus::Rejected,
        ] {
            let wire = serde_json::to_value(status).unwrap();
            assert_eq!(wire, serde_json::Value::String(status.as_str().to_string()));
        }
    }

    #[test]
    fn new_job_without_status_gets_applied() {
        let job: NewJob = serde_json::from_str(
            r#"{"url": "https://x.com/1", "title": "Dev", "company": "Acme"}"#,
        )
        .unwrap();
        assert_eq!(job.status, JobStatus::Applied);
        assert!(job.validate().is_ok());
    }

    #[test]
    fn new_job_rejects_empty_required_fields() {
        let job: NewJob =
            serde_json::from_str(r#"{"url": "", "title": "Dev", "company": "Acme"}"#).unwrap();
        let errors = job.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("url"));
    }

    #[test]
    fn update_job_validates_only_supplied_fields() {
        let changes: UpdateJob = serde_json::from_str(r#"{"title": "Lead Dev"}"#).unwrap();
        assert!(changes.validate().is_ok());
        assert!(changes.url.is_none());

        let bad: UpdateJob = serde_json::from_str(r#"{"company": ""}"#).unwrap();
        assert!(bad.validate().is_err());
    }
}
