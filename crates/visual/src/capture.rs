//! Captured input: encoded bytes or something that can produce them

use crate::error::Result;

/// Anything that can render itself to encoded image bytes on demand.
pub trait Screenshot {
    fn screenshot(&self, options: &ScreenshotOptions) -> Result<Vec<u8>>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Animations {
    #[default]
    Allow,
    Disabled,
}

impl Animations {
    pub fn as_str(&self) -> &'static str {
        match self {
            Animations::Allow => "allow",
            Animations::Disabled => "disabled",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ImageType {
    #[default]
    Png,
    Jpeg,
}

impl ImageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageType::Png => "png",
            ImageType::Jpeg => "jpeg",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ImageType::Png => "png",
            ImageType::Jpeg => "jpg",
        }
    }
}

/// Capture settings handed to a [`Screenshot`] implementation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScreenshotOptions {
    pub animations: Animations,
    pub format: ImageType,

    /// 0-100, only meaningful for JPEG
    pub quality: Option<u8>,

    pub full_page: bool,
}

impl ScreenshotOptions {
    /// Settings used for every snapshot capture: no animations, JPEG at quality 100.
    pub fn for_snapshot() -> Self {
        Self {
            animations: Animations::Disabled,
            format: ImageType::Jpeg,
            quality: Some(100),
            full_page: false,
        }
    }
}

/// Input to a snapshot check
pub enum CapturedInput<'a> {
    /// Already encoded image bytes
    Bytes(Vec<u8>),

    /// A live handle captured with [`ScreenshotOptions::for_snapshot`]
    Capture(&'a dyn Screenshot),
}

impl<'a> CapturedInput<'a> {
    pub fn bytes(bytes: impl Into<Vec<u8>>) -> Self {
        CapturedInput::Bytes(bytes.into())
    }

    pub fn capture(handle: &'a dyn Screenshot) -> Self {
        CapturedInput::Capture(handle)
    }

    /// Resolve to encoded bytes, capturing if needed.
    pub fn into_bytes(self) -> Result<Vec<u8>> {
        match self {
            CapturedInput::Bytes(bytes) => Ok(bytes),
            CapturedInput::Capture(handle) => handle.screenshot(&ScreenshotOptions::for_snapshot()),
        }
    }
}

impl From<Vec<u8>> for CapturedInput<'_> {
    fn from(bytes: Vec<u8>) -> Self {
        CapturedInput::Bytes(bytes)
    }
}

impl From<&[u8]> for CapturedInput<'_> {
    fn from(bytes: &[u8]) -> Self {
        CapturedInput::Bytes(bytes.to_vec())
    }
}

impl<'a> From<&'a dyn Screenshot> for CapturedInput<'a> {
    fn from(handle: &'a dyn Screenshot) -> Self {
        CapturedInput::Capture(handle)
    }
}

impl std::fmt::Debug for CapturedInput<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CapturedInput::Bytes(bytes) => write!(f, "Bytes({} bytes)", bytes.len()),
            CapturedInput::Capture(_) => f.write_str("Capture(..)"),
        }
    }
}
