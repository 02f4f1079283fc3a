pub mod dto;
pub mod handlers;
pub mod models;

// Re-export commonly used types
pub use handlers::job_config;
pub use models::{JobStatus, NewJob, UpdateJob};
