//! Playwright page capture
//!
//! A [`PlaywrightPage`] renders a URL by generating a small Node.js script
//! that drives Playwright, running it to completion, and reading back the
//! screenshot it wrote.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::debug;

use crate::capture::{Screenshot, ScreenshotOptions};
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Browser {
    #[default]
    Chromium,
    Firefox,
    Webkit,
}

impl Browser {
    pub fn as_str(&self) -> &'static str {
        match self {
            Browser::Chromium => "chromium",
            Browser::Firefox => "firefox",
            Browser::Webkit => "webkit",
        }
    }
}

impl std::str::FromStr for Browser {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "chromium" => Ok(Browser::Chromium),
            "firefox" => Ok(Browser::Firefox),
            "webkit" => Ok(Browser::Webkit),
            other => Err(Error::InvalidConfig(format!("unknown browser: {}", other))),
        }
    }
}

/// Configuration for a captured page
#[derive(Debug, Clone)]
pub struct PlaywrightConfig {
    pub url: String,
    pub browser: Browser,
    pub viewport_width: u32,
    pub viewport_height: u32,
    pub headless: bool,

    /// Selector to wait for after navigation
    pub wait_for_selector: Option<String>,

    pub node_binary: PathBuf,
}

impl Default for PlaywrightConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:8080".to_string(),
            browser: Browser::Chromium,
            viewport_width: 1280,
            viewport_height: 720,
            headless: true,
            wait_for_selector: None,
            node_binary: PathBuf::from("node"),
        }
    }
}

/// A page that can be screenshotted through Playwright
#[derive(Debug, Clone)]
pub struct PlaywrightPage {
    config: PlaywrightConfig,
}

impl PlaywrightPage {
    /// Create a page handle, checking that Playwright is installed
    pub fn new(config: PlaywrightConfig) -> Result<Self> {
        Self::check_playwright_installed()?;
        Ok(Self { config })
    }

    /// Create a page handle without checking for Playwright
    pub fn unchecked(config: PlaywrightConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PlaywrightConfig {
        &self.config
    }

    fn check_playwright_installed() -> Result<()> {
        let status = Command::new("npx")
            .args(["playwright", "--version"])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();

        match status {
            Ok(status) if status.success() => Ok(()),
            _ => Err(Error::PlaywrightNotFound),
        }
    }

    /// Build the capture script writing to `output`
    pub fn build_script(&self, options: &ScreenshotOptions, output: &Path) -> Result<String> {
        let wait = match &self.config.wait_for_selector {
            Some(selector) => format!("\n    await page.waitForSelector({});", js_string(selector)?),
            None => String::new(),
        };

        let quality = options
            .quality
            .map(|q| format!(", quality: {}", q))
            .unwrap_or_default();

        Ok(format!(
            r#"
const {{ {browser} }} = require('playwright');

(async () => {{
  const browser = await {browser}.launch({{ headless: {headless} }});
  const context = await browser.newContext({{
    viewport: {{ width: {width}, height: {height} }}
  }});
  const page = await context.newPage();

  try {{
    await page.goto({url});{wait}
    await page.screenshot({{ path: {path}, type: '{format}', animations: '{animations}', fullPage: {full_page}{quality} }});
  }} catch (error) {{
    console.error(JSON.stringify({{ success: false, error: error.message }}));
    process.exit(1);
  }} finally {{
    await browser.close();
  }}
}})();
"#,
            browser = self.config.browser.as_str(),
            headless = self.config.headless,
            width = self.config.viewport_width,
            height = self.config.viewport_height,
            url = js_string(&self.config.url)?,
            wait = wait,
            path = js_string(&output.to_string_lossy())?,
            format = options.format.as_str(),
            animations = options.animations.as_str(),
            full_page = options.full_page,
            quality = quality,
        ))
    }
}

impl Screenshot for PlaywrightPage {
    fn screenshot(&self, options: &ScreenshotOptions) -> Result<Vec<u8>> {
        let temp_dir = tempfile::tempdir()?;
        let script_path = temp_dir.path().join("capture.js");
        let output = temp_dir
            .path()
            .join(format!("capture.{}", options.format.extension()));
        std::fs::write(&script_path, self.build_script(options, &output)?)?;

        debug!("Capturing {} via {}", self.config.url, script_path.display());

        let result = Command::new(&self.config.node_binary)
            .arg(&script_path)
            .current_dir(temp_dir.path())
            .output()?;

        if !result.status.success() {
            return Err(Error::Playwright(format!(
                "Capture failed:\nstdout: {}\nstderr: {}",
                String::from_utf8_lossy(&result.stdout),
                String::from_utf8_lossy(&result.stderr)
            )));
        }

        Ok(std::fs::read(&output)?)
    }
}

/// Quote a value as a JavaScript string literal
fn js_string(value: &str) -> Result<String> {
    Ok(serde_json::to_string(value)?)
}
