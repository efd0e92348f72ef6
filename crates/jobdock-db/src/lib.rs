//! Database access layer for jobdock.
//!
//! One repository per table, each a thin `Clone`-able wrapper over a
//! `PgPool`. Migrations live at the workspace root under `migrations/`.

pub mod jobs;

pub use jobs::{JobFileInfo, JobRepository, JobUpdate};
