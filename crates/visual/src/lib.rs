//! Playwright Visual Snapshots
//!
//! This crate decides whether a screenshot matches a stored baseline and
//! manages the files that go with that decision:
//! - Resolves captured input (raw bytes or a live page) to encoded bytes
//! - Lays out baselines and failure artifacts deterministically per test
//! - Creates or refreshes baselines on first run and in update mode
//! - Runs a pixelmatch comparison and writes Diff/Actual/Expected on mismatch
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  VisualSnapshot (per test)                  │
//! ├─────────────────────────────────────────────────────────────┤
//! │  SnapshotComparator::compare(identity, input, options)      │
//! │    ├── CapturedInput::into_bytes()   (capture)              │
//! │    ├── layout::baseline_path()       (layout)               │
//! │    ├── layout::failure_dir()         (layout)               │
//! │    ├── codec::decode()               (codec)                │
//! │    └── pixelmatch()                  (pixelmatch)           │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Outcome                                                    │
//! │    ├── Pass                                                 │
//! │    ├── ReviewRequired { baseline }                          │
//! │    ├── NewBaseline { baseline }                             │
//! │    └── Mismatch { artifact_dir, mismatched_pixels }         │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod capture;
pub mod codec;
pub mod comparator;
pub mod config;
pub mod error;
pub mod harness;
pub mod identity;
pub mod layout;
pub mod pixelmatch;
pub mod playwright;

pub use capture::{CapturedInput, Screenshot, ScreenshotOptions};
pub use comparator::{CompareOptions, Outcome, SnapshotComparator};
pub use config::RunConfig;
pub use error::{Error, Result, SnapshotFailure};
pub use harness::VisualSnapshot;
pub use identity::TestIdentity;
pub use playwright::{PlaywrightConfig, PlaywrightPage};
