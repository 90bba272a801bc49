//! Test-side entry point
//!
//! ```no_run
//! use playwright_visual::{CompareOptions, RunConfig, VisualSnapshot};
//!
//! let png: Vec<u8> = std::fs::read("login.png").unwrap();
//! let snapshot = VisualSnapshot::new(RunConfig::default(), file!(), "test_login");
//! snapshot.assert_snapshot(png, &CompareOptions::named("login.png"));
//! ```

use std::path::PathBuf;

use crate::capture::CapturedInput;
use crate::comparator::{CompareOptions, Outcome, SnapshotComparator};
use crate::config::RunConfig;
use crate::error::Result;
use crate::identity::TestIdentity;

/// Snapshot checks bound to one test
#[derive(Debug, Clone)]
pub struct VisualSnapshot {
    config: RunConfig,
    identity: TestIdentity,
}

impl VisualSnapshot {
    pub fn new(config: RunConfig, test_file: impl Into<PathBuf>, test_name: &str) -> Self {
        Self {
            config,
            identity: TestIdentity::new(test_file, test_name),
        }
    }

    pub fn with_identity(config: RunConfig, identity: TestIdentity) -> Self {
        Self { config, identity }
    }

    pub fn identity(&self) -> &TestIdentity {
        &self.identity
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    pub fn check<'a>(
        &self,
        input: impl Into<CapturedInput<'a>>,
        options: &CompareOptions,
    ) -> Result<Outcome> {
        SnapshotComparator::new(&self.config).compare(&self.identity, input.into(), options)
    }

    /// Fail the current test unless the snapshot matches.
    #[track_caller]
    pub fn assert_snapshot<'a>(&self, input: impl Into<CapturedInput<'a>>, options: &CompareOptions) {
        match self.check(input, options) {
            Ok(outcome) => {
                if let Err(failure) = outcome.into_result() {
                    panic!("{}", failure);
                }
            }
            Err(e) => panic!("snapshot check for {} failed: {}", self.identity.full_name(), e),
        }
    }
}
