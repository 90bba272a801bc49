//! Encoding and decoding of snapshot images

use std::io::Cursor;
use std::path::Path;

use image::{DynamicImage, ImageFormat, ImageOutputFormat};
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::error::Result;

/// Decode encoded bytes, sniffing the format from the content.
pub fn decode(bytes: &[u8]) -> Result<DynamicImage> {
    Ok(image::load_from_memory(bytes)?)
}

pub fn encode_png(image: &DynamicImage) -> Result<Vec<u8>> {
    let mut cursor = Cursor::new(Vec::new());
    image.write_to(&mut cursor, ImageOutputFormat::Png)?;
    Ok(cursor.into_inner())
}

/// Write `raster` to `path` in the format implied by its extension.
///
/// When `source` holds the bytes the raster was decoded from and they are
/// already in the target format, they are written verbatim instead of being
/// re-encoded.
pub fn write_image(path: &Path, source: Option<&[u8]>, raster: &DynamicImage) -> Result<()> {
    let target = ImageFormat::from_path(path).unwrap_or(ImageFormat::Png);

    if let Some(bytes) = source {
        if image::guess_format(bytes).ok() == Some(target) {
            debug!("Copying source bytes to {}", path.display());
            std::fs::write(path, bytes)?;
            return Ok(());
        }
    }

    match target {
        ImageFormat::Jpeg => {
            DynamicImage::ImageRgb8(raster.to_rgb8()).save_with_format(path, ImageFormat::Jpeg)?
        }
        format => raster.save_with_format(path, format)?,
    }
    Ok(())
}

/// Hex SHA256 of encoded bytes
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}
