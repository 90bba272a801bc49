//! Compare Command

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use playwright_visual::playwright::Browser;
use playwright_visual::{
    CapturedInput, CompareOptions, Outcome, PlaywrightConfig, PlaywrightPage, RunConfig,
    SnapshotComparator, TestIdentity,
};

use crate::output::{print_error, print_item, print_success, OutputFormat, TableDisplay};

#[derive(Args, Debug)]
pub struct CompareArgs {
    /// Test file the snapshot belongs to
    #[arg(long)]
    pub test_file: PathBuf,

    /// Test name, including any parameter suffix
    #[arg(long)]
    pub test_name: String,

    /// Encoded image to check
    #[arg(long, conflicts_with = "url", required_unless_present = "url")]
    pub image: Option<PathBuf>,

    /// Page to capture with Playwright
    #[arg(long)]
    pub url: Option<String>,

    /// Browser to capture with (chromium, firefox, webkit)
    #[arg(long, default_value = "chromium")]
    pub browser: String,

    /// Selector to wait for before capturing
    #[arg(long)]
    pub wait_for: Option<String>,

    /// Viewport width
    #[arg(long, default_value = "1280")]
    pub viewport_width: u32,

    /// Viewport height
    #[arg(long, default_value = "720")]
    pub viewport_height: u32,

    /// Snapshot file name (default: <test name>.png)
    #[arg(long)]
    pub name: Option<String>,

    /// Per-pixel tolerance in [0, 1]
    #[arg(long)]
    pub threshold: Option<f64>,

    /// Stop at the first differing pixel
    #[arg(long)]
    pub fail_fast: bool,

    /// Overwrite the baseline instead of comparing
    #[arg(long, env = "PLAYWRIGHT_VISUAL_UPDATE_SNAPSHOTS")]
    pub update_snapshots: bool,
}

/// Outcome display wrapper for serialization
#[derive(Serialize)]
pub struct OutcomeDisplay {
    pub test: String,
    pub status: &'static str,
    pub path: Option<String>,
    pub mismatched_pixels: Option<u64>,
}

impl OutcomeDisplay {
    fn new(identity: &TestIdentity, outcome: &Outcome) -> Self {
        let (status, path, mismatched_pixels) = match outcome {
            Outcome::Pass => ("pass", None, None),
            Outcome::ReviewRequired { baseline } => ("review-required", Some(baseline), None),
            Outcome::NewBaseline { baseline } => ("new-baseline", Some(baseline), None),
            Outcome::Mismatch {
                artifact_dir,
                mismatched_pixels,
            } => ("mismatch", Some(artifact_dir), Some(*mismatched_pixels)),
        };

        Self {
            test: identity.full_name().to_string(),
            status,
            path: path.map(|p| p.display().to_string()),
            mismatched_pixels,
        }
    }
}

impl TableDisplay for OutcomeDisplay {
    fn headers() -> Vec<&'static str> {
        vec!["Test", "Status", "Path", "Mismatched Pixels"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.test.clone(),
            self.status.to_string(),
            self.path.clone().unwrap_or_else(|| "-".to_string()),
            self.mismatched_pixels
                .map(|n| n.to_string())
                .unwrap_or_else(|| "-".to_string()),
        ]
    }
}

/// Run one snapshot check; returns the process exit code.
pub fn execute(args: CompareArgs, config: RunConfig, format: OutputFormat) -> Result<i32> {
    let update = config.update_snapshots || args.update_snapshots;
    let config = config.with_update_snapshots(update);
    let identity = TestIdentity::new(&args.test_file, &args.test_name);
    let options = CompareOptions {
        threshold: args.threshold,
        name: args.name.clone(),
        fail_fast: args.fail_fast,
    };

    let page = match &args.url {
        Some(url) => Some(PlaywrightPage::new(PlaywrightConfig {
            url: url.clone(),
            browser: args.browser.parse::<Browser>()?,
            viewport_width: args.viewport_width,
            viewport_height: args.viewport_height,
            wait_for_selector: args.wait_for.clone(),
            ..Default::default()
        })?),
        None => None,
    };

    let input = match (&page, &args.image) {
        (Some(page), _) => CapturedInput::capture(page),
        (None, Some(image)) => CapturedInput::bytes(
            std::fs::read(image).with_context(|| format!("reading {}", image.display()))?,
        ),
        (None, None) => anyhow::bail!("either --image or --url is required"),
    };

    let outcome = SnapshotComparator::new(&config).compare(&identity, input, &options)?;
    print_item(&OutcomeDisplay::new(&identity, &outcome), format);

    match outcome.into_result() {
        Ok(()) => {
            if matches!(format, OutputFormat::Table | OutputFormat::Plain) {
                print_success(&format!("{} matches its baseline", identity.full_name()));
            }
            Ok(0)
        }
        Err(failure) => {
            print_error(&failure.to_string());
            Ok(1)
        }
    }
}
