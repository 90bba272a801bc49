//! Filesystem layout for baselines and failure artifacts
//!
//! ```text
//! <test dir>/snapshots/<file>/<group>/<name>
//! <failure root>/snapshot_tests_failures/<file>/<full name>/
//!     Diff_<name>
//!     Actual_<name>
//!     Expected_<name>
//! ```

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::identity::TestIdentity;

pub const SNAPSHOTS_DIR: &str = "snapshots";
pub const FAILURES_DIR: &str = "snapshot_tests_failures";

/// Directory holding every baseline of one test group
pub fn baseline_dir(identity: &TestIdentity) -> PathBuf {
    identity
        .test_dir()
        .join(SNAPSHOTS_DIR)
        .join(identity.file_name())
        .join(identity.group())
}

/// Reject snapshot names that are not a single file-name segment.
pub fn check_snapshot_name(name: &str) -> Result<()> {
    if Path::new(name).file_name() == Some(OsStr::new(name)) && name != ".." {
        Ok(())
    } else {
        Err(Error::InvalidConfig(format!(
            "snapshot name {:?} must be a plain file name",
            name
        )))
    }
}

pub fn baseline_path(identity: &TestIdentity, name: &str) -> PathBuf {
    baseline_dir(identity).join(name)
}

/// Root of all baselines recorded for one test file
pub fn file_snapshots_dir(identity: &TestIdentity) -> PathBuf {
    identity
        .test_dir()
        .join(SNAPSHOTS_DIR)
        .join(identity.file_name())
}

/// Root of all failure artifacts recorded for one test file
pub fn file_failures_dir(root: &Path, identity: &TestIdentity) -> PathBuf {
    root.join(FAILURES_DIR).join(identity.file_name())
}

/// Directory receiving the artifact set of one test invocation
pub fn failure_dir(root: &Path, identity: &TestIdentity) -> PathBuf {
    file_failures_dir(root, identity).join(identity.full_name())
}

/// The three artifact paths written on mismatch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub diff: PathBuf,
    pub actual: PathBuf,
    pub expected: PathBuf,
}

impl ArtifactPaths {
    pub fn new(dir: &Path, name: &str) -> Self {
        Self {
            diff: dir.join(format!("Diff_{}", name)),
            actual: dir.join(format!("Actual_{}", name)),
            expected: dir.join(format!("Expected_{}", name)),
        }
    }
}
