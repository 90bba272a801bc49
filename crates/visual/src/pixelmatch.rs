//! Pixel-level image comparison
//!
//! Perceptual colour distance in YIQ space with anti-aliasing detection, in
//! the style of the pixelmatch library. Pixels whose squared YIQ distance is
//! above `35215 * threshold^2` count as different, unless they look like
//! anti-aliasing in one of the two images.

use image::{imageops, Rgba, RgbaImage};
use tracing::warn;

use crate::error::{Error, Result};

/// Largest possible squared YIQ distance between two colours
const MAX_YIQ_DELTA: f64 = 35215.0;

#[derive(Debug, Clone, PartialEq)]
pub struct PixelmatchOptions {
    /// Matching threshold in [0, 1]; smaller is more sensitive
    pub threshold: f64,

    /// Count anti-aliased pixels as differences
    pub include_aa: bool,

    /// Opacity of unchanged pixels in the diff output
    pub alpha: f64,

    pub aa_color: [u8; 3],
    pub diff_color: [u8; 3],

    /// Draw only the differences on a transparent background
    pub diff_mask: bool,

    /// Stop at the first differing pixel
    pub fail_fast: bool,
}

impl Default for PixelmatchOptions {
    fn default() -> Self {
        Self {
            threshold: 0.1,
            include_aa: false,
            alpha: 0.1,
            aa_color: [255, 255, 0],
            diff_color: [255, 0, 0],
            diff_mask: false,
            fail_fast: false,
        }
    }
}

/// Count pixels that differ between `actual` and `expected`, drawing the
/// result into `output` when given.
///
/// `output` must have the dimensions of `actual`. Images of different sizes
/// always yield a nonzero count: the overlap is compared normally and every
/// pixel outside it counts as different.
pub fn pixelmatch(
    actual: &RgbaImage,
    expected: &RgbaImage,
    mut output: Option<&mut RgbaImage>,
    options: &PixelmatchOptions,
) -> Result<u64> {
    if !(0.0..=1.0).contains(&options.threshold) {
        return Err(Error::InvalidThreshold(options.threshold));
    }

    if let Some(out) = output.as_deref() {
        if out.dimensions() != actual.dimensions() {
            return Err(Error::InvalidConfig(format!(
                "diff output is {:?} but actual image is {:?}",
                out.dimensions(),
                actual.dimensions()
            )));
        }
    }

    if actual.dimensions() == expected.dimensions() {
        return Ok(match_same_size(actual, expected, output, options));
    }

    warn!(
        "Snapshot dimensions differ: actual {:?} vs expected {:?}",
        actual.dimensions(),
        expected.dimensions()
    );

    let (aw, ah) = actual.dimensions();
    let (ew, eh) = expected.dimensions();
    let (ow, oh) = (aw.min(ew), ah.min(eh));
    let overlap = ow as u64 * oh as u64;
    let outside = (aw as u64 * ah as u64 - overlap) + (ew as u64 * eh as u64 - overlap);

    if let Some(out) = output.as_deref_mut() {
        let [r, g, b] = options.diff_color;
        for (x, y, pixel) in out.enumerate_pixels_mut() {
            if x >= ow || y >= oh {
                *pixel = Rgba([r, g, b, 255]);
            }
        }
    }

    if options.fail_fast {
        return Ok(outside.max(1));
    }

    let actual_overlap = imageops::crop_imm(actual, 0, 0, ow, oh).to_image();
    let expected_overlap = imageops::crop_imm(expected, 0, 0, ow, oh).to_image();
    let mut overlap_output = RgbaImage::new(ow, oh);
    let inside = match_same_size(
        &actual_overlap,
        &expected_overlap,
        Some(&mut overlap_output),
        options,
    );

    if let Some(out) = output {
        imageops::replace(out, &overlap_output, 0, 0);
    }

    Ok((inside + outside).max(1))
}

fn match_same_size(
    actual: &RgbaImage,
    expected: &RgbaImage,
    mut output: Option<&mut RgbaImage>,
    options: &PixelmatchOptions,
) -> u64 {
    let (width, height) = actual.dimensions();
    let img1 = actual.as_raw();
    let img2 = expected.as_raw();

    if img1 == img2 {
        if let Some(out) = output.as_deref_mut() {
            if !options.diff_mask {
                for y in 0..height {
                    for x in 0..width {
                        draw_gray_pixel(img1, x, y, width, options.alpha, out);
                    }
                }
            }
        }
        return 0;
    }

    let max_delta = MAX_YIQ_DELTA * options.threshold * options.threshold;
    let mut diff = 0u64;

    for y in 0..height {
        for x in 0..width {
            let pos = offset(x, y, width);
            let delta = color_delta(img1, img2, pos, pos, false);

            if delta.abs() > max_delta {
                let is_aa = !options.include_aa
                    && (antialiased(img1, x, y, width, height, img2)
                        || antialiased(img2, x, y, width, height, img1));

                if is_aa {
                    if let Some(out) = output.as_deref_mut() {
                        if !options.diff_mask {
                            draw_pixel(out, x, y, options.aa_color);
                        }
                    }
                } else {
                    if let Some(out) = output.as_deref_mut() {
                        draw_pixel(out, x, y, options.diff_color);
                    }
                    diff += 1;
                    if options.fail_fast {
                        return diff;
                    }
                }
            } else if let Some(out) = output.as_deref_mut() {
                if !options.diff_mask {
                    draw_gray_pixel(img1, x, y, width, options.alpha, out);
                }
            }
        }
    }

    diff
}

fn offset(x: u32, y: u32, width: u32) -> usize {
    (y as usize * width as usize + x as usize) * 4
}

/// Whether the pixel at (x1, y1) in `img` is likely anti-aliasing.
fn antialiased(img: &[u8], x1: u32, y1: u32, width: u32, height: u32, img2: &[u8]) -> bool {
    let x0 = x1.saturating_sub(1);
    let y0 = y1.saturating_sub(1);
    let x2 = (x1 + 1).min(width - 1);
    let y2 = (y1 + 1).min(height - 1);
    let pos = offset(x1, y1, width);

    let mut zeroes = if x1 == x0 || x1 == x2 || y1 == y0 || y1 == y2 { 1 } else { 0 };
    let mut min = 0.0;
    let mut max = 0.0;
    let (mut min_x, mut min_y, mut max_x, mut max_y) = (0, 0, 0, 0);

    for x in x0..=x2 {
        for y in y0..=y2 {
            if x == x1 && y == y1 {
                continue;
            }

            let delta = color_delta(img, img, pos, offset(x, y, width), true);

            if delta == 0.0 {
                zeroes += 1;
                if zeroes > 2 {
                    return false;
                }
            } else if delta < min {
                min = delta;
                min_x = x;
                min_y = y;
            } else if delta > max {
                max = delta;
                max_x = x;
                max_y = y;
            }
        }
    }

    if min == 0.0 || max == 0.0 {
        return false;
    }

    (has_many_siblings(img, min_x, min_y, width, height)
        && has_many_siblings(img2, min_x, min_y, width, height))
        || (has_many_siblings(img, max_x, max_y, width, height)
            && has_many_siblings(img2, max_x, max_y, width, height))
}

/// Whether more than two neighbours share this pixel's exact colour.
fn has_many_siblings(img: &[u8], x1: u32, y1: u32, width: u32, height: u32) -> bool {
    let x0 = x1.saturating_sub(1);
    let y0 = y1.saturating_sub(1);
    let x2 = (x1 + 1).min(width - 1);
    let y2 = (y1 + 1).min(height - 1);
    let pos = offset(x1, y1, width);

    let mut zeroes = if x1 == x0 || x1 == x2 || y1 == y0 || y1 == y2 { 1 } else { 0 };

    for x in x0..=x2 {
        for y in y0..=y2 {
            if x == x1 && y == y1 {
                continue;
            }

            let pos2 = offset(x, y, width);
            if img[pos..pos + 4] == img[pos2..pos2 + 4] {
                zeroes += 1;
            }
            if zeroes > 2 {
                return true;
            }
        }
    }

    false
}

/// Squared YIQ distance between two pixels, signed by which one is brighter.
fn color_delta(img1: &[u8], img2: &[u8], k: usize, m: usize, y_only: bool) -> f64 {
    let [mut r1, mut g1, mut b1, a1] = channels(img1, k);
    let [mut r2, mut g2, mut b2, a2] = channels(img2, m);

    if a1 == a2 && r1 == r2 && g1 == g2 && b1 == b2 {
        return 0.0;
    }

    if a1 < 255.0 {
        let a = a1 / 255.0;
        r1 = blend(r1, a);
        g1 = blend(g1, a);
        b1 = blend(b1, a);
    }

    if a2 < 255.0 {
        let a = a2 / 255.0;
        r2 = blend(r2, a);
        g2 = blend(g2, a);
        b2 = blend(b2, a);
    }

    let y1 = rgb2y(r1, g1, b1);
    let y2 = rgb2y(r2, g2, b2);
    let y = y1 - y2;

    if y_only {
        return y;
    }

    let i = rgb2i(r1, g1, b1) - rgb2i(r2, g2, b2);
    let q = rgb2q(r1, g1, b1) - rgb2q(r2, g2, b2);
    let delta = 0.5053 * y * y + 0.299 * i * i + 0.1957 * q * q;

    if y1 > y2 {
        -delta
    } else {
        delta
    }
}

fn channels(img: &[u8], k: usize) -> [f64; 4] {
    [img[k] as f64, img[k + 1] as f64, img[k + 2] as f64, img[k + 3] as f64]
}

fn rgb2y(r: f64, g: f64, b: f64) -> f64 {
    r * 0.29889531 + g * 0.58662247 + b * 0.11448223
}

fn rgb2i(r: f64, g: f64, b: f64) -> f64 {
    r * 0.59597799 - g * 0.27417610 - b * 0.32180189
}

fn rgb2q(r: f64, g: f64, b: f64) -> f64 {
    r * 0.21147017 - g * 0.52261711 + b * 0.31114694
}

/// Blend a channel with white by alpha
fn blend(c: f64, a: f64) -> f64 {
    255.0 + (c - 255.0) * a
}

fn draw_pixel(out: &mut RgbaImage, x: u32, y: u32, [r, g, b]: [u8; 3]) {
    out.put_pixel(x, y, Rgba([r, g, b, 255]));
}

fn draw_gray_pixel(img: &[u8], x: u32, y: u32, width: u32, alpha: f64, out: &mut RgbaImage) {
    let [r, g, b, a] = channels(img, offset(x, y, width));
    let value = blend(rgb2y(r, g, b), alpha * a / 255.0) as u8;
    draw_pixel(out, x, y, [value, value, value]);
}
