// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Preview stitching: combine the per-label bitmaps returned by the printer
// into one vertical strip so a whole batch can be reviewed in a single image.

use std::io::Cursor;

use cablabel_core::error::{CabError, Result};
use image::{DynamicImage, ImageFormat, RgbImage};
use tracing::{debug, instrument, warn};

/// Accumulates decoded preview images, top to bottom in insertion order.
///
/// ```ignore
/// let mut strip = PreviewStrip::new();
/// for preview in &previews {
///     strip.push(preview)?;
/// }
/// let png = strip.to_png_bytes()?;
/// ```
#[derive(Debug, Default)]
pub struct PreviewStrip {
    images: Vec<RgbImage>,
    width: u32,
    height: u32,
}

impl PreviewStrip {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode `data` and append it below the images already pushed.
    ///
    /// A zero-length buffer means the printer had no preview for that label;
    /// it is skipped and `Ok(false)` is returned. Anything else that fails to
    /// decode is a `CabError::Decode`.
    #[instrument(skip(self, data), fields(data_len = data.len()))]
    pub fn push(&mut self, data: &[u8]) -> Result<bool> {
        if data.is_empty() {
            warn!("skipping empty preview");
            return Ok(false);
        }

        let decoded = image::load_from_memory(data)
            .map_err(|err| CabError::Decode(format!("failed to decode preview: {err}")))?;
        let rgb = decoded.to_rgb8();

        let height = self.height.checked_add(rgb.height()).ok_or_else(|| {
            CabError::Decode("combined preview height overflows u32".into())
        })?;
        self.width = self.width.max(rgb.width());
        self.height = height;

        debug!(
            width = rgb.width(),
            height = rgb.height(),
            total_height = self.height,
            "preview decoded"
        );
        self.images.push(rgb);
        Ok(true)
    }

    /// Number of images that will appear in the strip.
    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Width of the combined image: the widest preview.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height of the combined image: the sum of all preview heights.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Paste every image onto an RGB canvas at x = 0, stacked downwards.
    /// Areas to the right of narrower images stay black.
    pub fn render(&self) -> Result<RgbImage> {
        if self.images.is_empty() {
            return Err(CabError::EmptyPreview);
        }

        let mut canvas = RgbImage::new(self.width, self.height);
        let mut y_offset: i64 = 0;
        for img in &self.images {
            image::imageops::replace(&mut canvas, img, 0, y_offset);
            y_offset += i64::from(img.height());
        }
        Ok(canvas)
    }

    /// Render the strip and encode it as PNG.
    pub fn to_png_bytes(&self) -> Result<Vec<u8>> {
        let canvas = self.render()?;
        let mut buffer = Vec::new();
        DynamicImage::ImageRgb8(canvas)
            .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
            .map_err(|err| CabError::Decode(format!("PNG encoding failed: {err}")))?;
        Ok(buffer)
    }
}

/// Combine preview PNGs into one vertical strip, in input order.
///
/// Empty buffers are ignored. If nothing is left to combine the result is
/// `CabError::EmptyPreview`.
#[instrument(skip_all, fields(count = previews.len()))]
pub fn combine_vertically<B: AsRef<[u8]>>(previews: &[B]) -> Result<Vec<u8>> {
    let mut strip = PreviewStrip::new();
    for preview in previews {
        strip.push(preview.as_ref())?;
    }
    debug!(
        images = strip.len(),
        width = strip.width(),
        height = strip.height(),
        "combining previews"
    );
    strip.to_png_bytes()
}
