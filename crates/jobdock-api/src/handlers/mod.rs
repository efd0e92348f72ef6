pub mod health;
pub mod job_file;
pub mod jobs;
