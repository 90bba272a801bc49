//! Test identity used to key baseline and failure paths

use std::path::{Path, PathBuf};

/// Who is taking the snapshot: one test invocation inside one test file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestIdentity {
    /// Path of the test file as given by the caller
    test_file: PathBuf,

    /// Test file stem, e.g. `test_login` for `tests/test_login.py`
    file_name: String,

    /// Test name without parameter suffix, e.g. `test_form`
    group: String,

    /// Test name including parameter suffix, e.g. `test_form[chromium]`
    full_name: String,
}

impl TestIdentity {
    /// Build the identity for `test_name` declared in `test_file`.
    ///
    /// The group is everything before the first `[`, so parameterised
    /// invocations share a baseline directory but keep distinct file and
    /// failure-directory names.
    pub fn new(test_file: impl Into<PathBuf>, test_name: &str) -> Self {
        let test_file = test_file.into();
        let file_name = test_file
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let group = test_name.split('[').next().unwrap_or(test_name);

        Self {
            file_name: sanitize(&file_name),
            group: sanitize(group),
            full_name: sanitize(test_name),
            test_file,
        }
    }

    pub fn test_file(&self) -> &Path {
        &self.test_file
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    /// Directory containing the test file
    pub fn test_dir(&self) -> PathBuf {
        match self.test_file.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }

    /// Snapshot file name used when the caller does not pick one
    pub fn default_snapshot_name(&self) -> String {
        format!("{}.png", self.full_name)
    }
}

/// Keep a name to a single, non-empty path segment.
fn sanitize(name: &str) -> String {
    match name {
        "" | "." | ".." => "_".to_string(),
        name => name
            .chars()
            .map(|c| match c {
                '/' | '\\' | '\0' => '_',
                c => c,
            })
            .collect(),
    }
}
