//! Snapshot comparison and baseline lifecycle

use std::path::PathBuf;

use image::{DynamicImage, RgbaImage};
use tracing::{debug, info};

use crate::capture::CapturedInput;
use crate::codec;
use crate::config::RunConfig;
use crate::error::{Result, SnapshotFailure};
use crate::identity::TestIdentity;
use crate::layout::{self, ArtifactPaths};
use crate::pixelmatch::{pixelmatch, PixelmatchOptions};

/// Per-call overrides
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompareOptions {
    /// Overrides the run-level threshold
    pub threshold: Option<f64>,

    /// Snapshot file name, defaults to `<test name>.png`
    pub name: Option<String>,

    /// Stop counting at the first differing pixel
    pub fail_fast: bool,
}

impl CompareOptions {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = Some(threshold);
        self
    }

    pub fn with_fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }
}

/// How one snapshot check ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Pass,

    /// Update mode rewrote the baseline
    ReviewRequired { baseline: PathBuf },

    /// No baseline existed; one was written
    NewBaseline { baseline: PathBuf },

    /// Baseline and capture differ; artifacts were written
    Mismatch {
        artifact_dir: PathBuf,
        mismatched_pixels: u64,
    },
}

impl Outcome {
    pub fn is_pass(&self) -> bool {
        matches!(self, Outcome::Pass)
    }

    pub fn into_result(self) -> std::result::Result<(), SnapshotFailure> {
        match self {
            Outcome::Pass => Ok(()),
            Outcome::ReviewRequired { baseline } => Err(SnapshotFailure::ReviewRequired(baseline)),
            Outcome::NewBaseline { baseline } => Err(SnapshotFailure::NewBaseline(baseline)),
            Outcome::Mismatch {
                artifact_dir,
                mismatched_pixels,
            } => Err(SnapshotFailure::Mismatch {
                artifact_dir,
                mismatched_pixels,
            }),
        }
    }
}

/// Compares captures against baselines for one test run
#[derive(Debug, Clone, Copy)]
pub struct SnapshotComparator<'a> {
    config: &'a RunConfig,
}

impl<'a> SnapshotComparator<'a> {
    pub fn new(config: &'a RunConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RunConfig {
        self.config
    }

    /// Check `input` against the baseline of `identity`.
    ///
    /// Decode and filesystem failures are returned as errors; every other
    /// ending, including a failed comparison, is an [`Outcome`].
    pub fn compare(
        &self,
        identity: &TestIdentity,
        input: CapturedInput<'_>,
        options: &CompareOptions,
    ) -> Result<Outcome> {
        let name = options
            .name
            .clone()
            .unwrap_or_else(|| identity.default_snapshot_name());
        layout::check_snapshot_name(&name)?;

        let actual_bytes = input.into_bytes()?;
        debug!(
            "Captured {} bytes (sha256 {})",
            actual_bytes.len(),
            codec::sha256_hex(&actual_bytes)
        );

        let baseline_dir = layout::baseline_dir(identity);
        std::fs::create_dir_all(&baseline_dir)?;
        let baseline = baseline_dir.join(&name);

        let failure_root = self.config.resolve_failure_root(identity);
        let artifact_dir = layout::failure_dir(&failure_root, identity);
        if artifact_dir.exists() {
            debug!("Removing previous failure artifacts in {}", artifact_dir.display());
            std::fs::remove_dir_all(&artifact_dir)?;
        }

        if self.config.update_snapshots {
            std::fs::write(&baseline, &actual_bytes)?;
            info!("Updated baseline {}", baseline.display());
            return Ok(Outcome::ReviewRequired { baseline });
        }

        if !baseline.exists() {
            std::fs::write(&baseline, &actual_bytes)?;
            info!("Created baseline {}", baseline.display());
            return Ok(Outcome::NewBaseline { baseline });
        }

        let expected_bytes = std::fs::read(&baseline)?;
        let actual = codec::decode(&actual_bytes)?;
        let expected = codec::decode(&expected_bytes)?;

        let threshold = self.config.resolve_threshold(options.threshold)?;
        debug!("Comparing against {} at threshold {}", baseline.display(), threshold);

        let actual_rgba = actual.to_rgba8();
        let mut diff = RgbaImage::new(actual_rgba.width(), actual_rgba.height());
        let mismatched_pixels = pixelmatch(
            &actual_rgba,
            &expected.to_rgba8(),
            Some(&mut diff),
            &PixelmatchOptions {
                threshold,
                fail_fast: options.fail_fast,
                ..Default::default()
            },
        )?;

        if mismatched_pixels == 0 {
            debug!("Snapshot {} matches", name);
            return Ok(Outcome::Pass);
        }

        std::fs::create_dir_all(&artifact_dir)?;
        let paths = ArtifactPaths::new(&artifact_dir, &name);
        codec::write_image(&paths.diff, None, &DynamicImage::ImageRgba8(diff))?;
        codec::write_image(&paths.actual, Some(&actual_bytes), &actual)?;
        codec::write_image(&paths.expected, Some(&expected_bytes), &expected)?;

        info!(
            "Snapshot {} does not match: {} pixel(s) differ, artifacts in {}",
            name,
            mismatched_pixels,
            artifact_dir.display()
        );

        Ok(Outcome::Mismatch {
            artifact_dir,
            mismatched_pixels,
        })
    }
}
