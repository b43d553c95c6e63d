//! Upload a BGCFlow DuckDB database to Metabase and sync its dbt models

pub mod client;
pub mod sync;

use crate::external::CommandError;
use crate::report::ReportError;
use std::path::PathBuf;
use thiserror::Error;

pub use client::{DatabaseRequest, DatabaseSummary, MetabaseClient, Session};
pub use sync::{excluded_models, DbtTarget, MetabaseSync, SyncOptions, UploadOutcome, DBT_MODELS};

#[derive(Debug, Error)]
pub enum MetabaseError {
    #[error("Request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("Metabase answered {status} for {url}: {body}")]
    Status { url: String, status: u16, body: String },
    #[error("Unexpected response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("Error: {} does not exist or is not a regular file", .0.display())]
    MissingDatabaseFile(PathBuf),
    #[error("IO error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Report(#[from] ReportError),
    #[error(transparent)]
    Command(#[from] CommandError),
}
