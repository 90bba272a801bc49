//! List Command

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Args;
use serde::Serialize;
use walkdir::WalkDir;

use playwright_visual::codec::sha256_hex;
use playwright_visual::layout;
use playwright_visual::TestIdentity;

use crate::output::{format_size, print_list, OutputFormat, TableDisplay};

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Test file whose baselines to list
    #[arg(long)]
    pub test_file: PathBuf,

    /// Only list baselines of this test's group
    #[arg(long)]
    pub test_name: Option<String>,
}

/// Baseline display wrapper for serialization
#[derive(Serialize)]
pub struct BaselineDisplay {
    pub group: String,
    pub name: String,
    pub size: u64,
    pub sha256: String,
}

impl TableDisplay for BaselineDisplay {
    fn headers() -> Vec<&'static str> {
        vec!["Group", "Name", "Size", "SHA256"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.group.clone(),
            self.name.clone(),
            format_size(self.size),
            self.sha256[..self.sha256.len().min(12)].to_string(),
        ]
    }
}

pub fn execute(args: ListArgs, format: OutputFormat) -> Result<()> {
    let identity = TestIdentity::new(&args.test_file, args.test_name.as_deref().unwrap_or(""));
    let root = layout::file_snapshots_dir(&identity);
    let search = match args.test_name {
        Some(_) => layout::baseline_dir(&identity),
        None => root.clone(),
    };

    let baselines = collect_baselines(&root, &search)?;
    print_list(&baselines, format);
    Ok(())
}

fn collect_baselines(root: &Path, search: &Path) -> Result<Vec<BaselineDisplay>> {
    let mut baselines = Vec::new();
    if !search.exists() {
        return Ok(baselines);
    }

    for entry in WalkDir::new(search).min_depth(1).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let relative = path.strip_prefix(root).unwrap_or(path);
        let group = relative
            .parent()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        let bytes = std::fs::read(path)?;

        baselines.push(BaselineDisplay {
            group,
            name: entry.file_name().to_string_lossy().into_owned(),
            size: bytes.len() as u64,
            sha256: sha256_hex(&bytes),
        });
    }

    Ok(baselines)
}
