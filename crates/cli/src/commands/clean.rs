//! Clean Command

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use tracing::info;

use playwright_visual::layout;
use playwright_visual::{RunConfig, TestIdentity};

use crate::output::{print_success, print_warning};

#[derive(Args, Debug)]
pub struct CleanArgs {
    /// Test file whose failure artifacts to remove
    #[arg(long)]
    pub test_file: PathBuf,
}

pub fn execute(args: CleanArgs, config: &RunConfig) -> Result<()> {
    let identity = TestIdentity::new(&args.test_file, "");
    let root = config.resolve_failure_root(&identity);
    let dir = layout::file_failures_dir(&root, &identity);

    if !dir.exists() {
        print_warning(&format!("No failure artifacts at {}", dir.display()));
        return Ok(());
    }

    std::fs::remove_dir_all(&dir)?;
    info!("Removed {}", dir.display());
    print_success(&format!("Removed {}", dir.display()));
    Ok(())
}
