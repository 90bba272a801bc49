//! Error types for visual snapshots

use std::path::PathBuf;
use thiserror::Error;

/// Unrecoverable errors: the environment or the input is broken, not the rendering.
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid threshold {0}: expected a number between 0 and 1")]
    InvalidThreshold(f64),

    #[error("Playwright not found. Install with: npx playwright install")]
    PlaywrightNotFound,

    #[error("Playwright error: {0}")]
    Playwright(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// A snapshot check that ran to completion but did not pass.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SnapshotFailure {
    #[error("--> Snapshots updated. Please review images. {}", .0.display())]
    ReviewRequired(PathBuf),

    #[error("--> New snapshot(s) created. Please review images. {}", .0.display())]
    NewBaseline(PathBuf),

    #[error("--> Snapshots DO NOT match! {mismatched_pixels} pixel(s) differ, see {}", .artifact_dir.display())]
    Mismatch {
        artifact_dir: PathBuf,
        mismatched_pixels: u64,
    },
}
