pub mod jobs;

pub use jobs::{JobService, NewJobUpload};
