use serde::Serialize;

use crate::db::models::JobRow;

/// Envelope for the job listing endpoint
#[derive(Serialize)]
pub struct JobListResponse {
    pub jobs: Vec<JobRow>,
}

/// Plain message body used for delete confirmations and error responses
#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}
