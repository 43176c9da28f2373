//! Exclusion mask composition.
//!
//! The combined mask is pulled, not pushed: layer writes only mark it dirty
//! and the union is rebuilt on the next read.

use image::RgbImage;
use tracing::debug;

use crate::plate_engine::color::types::RgbColor;
use crate::plate_engine::common::error::{EngineError, Result};
use crate::plate_engine::common::grid::WellGrid;
use crate::plate_engine::mask::layers::{BoolMask, disk_pixels};

pub struct MaskEngine {
    width: u32,
    height: u32,
    circle_mask: BoolMask,
    flare_mask: BoolMask,
    custom_mask: BoolMask,
    combined: BoolMask,
    dirty: bool,
    recomputations: u64,
}

impl MaskEngine {
    /// Creates empty layers for a `width` x `height` cropped plate.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            circle_mask: BoolMask::new(width, height),
            flare_mask: BoolMask::new(width, height),
            custom_mask: BoolMask::new(width, height),
            combined: BoolMask::new(width, height),
            dirty: false,
            recomputations: 0,
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Excludes everything except a disk of `radius` around each well center.
    pub fn set_circle_mask(&mut self, centers: &WellGrid<(f64, f64)>, radius: f64) {
        self.circle_mask.fill(true);
        for (cx, cy) in centers.iter() {
            self.circle_mask.fill_disk(*cx, *cy, radius, false);
        }
        debug!(
            radius,
            excluded = self.circle_mask.count_set(),
            "Circle mask redrawn"
        );
        self.dirty = true;
    }

    /// Excludes pixels where any channel exceeds `threshold`.
    pub fn set_flare_mask(&mut self, image: &RgbImage, threshold: u8) -> Result<()> {
        self.check_dimensions(image.width(), image.height())?;
        for (x, y, pixel) in image.enumerate_pixels() {
            self.flare_mask
                .set(x, y, pixel.0.iter().any(|channel| *channel > threshold));
        }
        debug!(
            threshold,
            excluded = self.flare_mask.count_set(),
            "Flare mask redrawn"
        );
        self.dirty = true;
        Ok(())
    }

    /// Adds (`add = true`) or erases a brush disk in the free-hand layer.
    /// Strokes reaching past the image edge are clipped.
    pub fn paint_custom_mask(&mut self, x: f64, y: f64, brush_radius: f64, add: bool) {
        self.custom_mask.fill_disk(x, y, brush_radius, add);
        self.dirty = true;
    }

    pub fn clear_custom_mask(&mut self) {
        self.custom_mask.fill(false);
        self.dirty = true;
    }

    /// Replaces the free-hand layer wholesale, e.g. when restoring a bundle.
    pub fn set_custom_mask(&mut self, mask: BoolMask) -> Result<()> {
        self.check_dimensions(mask.width(), mask.height())?;
        self.custom_mask = mask;
        self.dirty = true;
        Ok(())
    }

    pub fn circle_mask(&self) -> &BoolMask {
        &self.circle_mask
    }

    pub fn flare_mask(&self) -> &BoolMask {
        &self.flare_mask
    }

    pub fn custom_mask(&self) -> &BoolMask {
        &self.custom_mask
    }

    /// Union of the three layers, rebuilt only if a layer changed since the
    /// last read.
    pub fn combined_mask(&mut self) -> &BoolMask {
        if self.dirty {
            let mut combined = self.circle_mask.clone();
            combined.union_with(&self.flare_mask);
            combined.union_with(&self.custom_mask);
            self.combined = combined;
            self.dirty = false;
            self.recomputations += 1;
            debug!(
                excluded = self.combined.count_set(),
                recomputations = self.recomputations,
                "Combined mask recomputed"
            );
        }
        &self.combined
    }

    /// Number of times the combined mask has been rebuilt.
    pub fn recomputations(&self) -> u64 {
        self.recomputations
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Pairs `image` with the current combined mask.
    pub fn masked_array<'a>(&'a mut self, image: &'a RgbImage) -> Result<MaskedImage<'a>> {
        self.check_dimensions(image.width(), image.height())?;
        let mask = self.combined_mask();
        Ok(MaskedImage { image, mask })
    }

    fn check_dimensions(&self, width: u32, height: u32) -> Result<()> {
        if (width, height) != (self.width, self.height) {
            return Err(EngineError::InvalidDimensions(width, height));
        }
        Ok(())
    }
}

/// Image view that hides excluded pixels from aggregation.
pub struct MaskedImage<'a> {
    image: &'a RgbImage,
    mask: &'a BoolMask,
}

impl<'a> MaskedImage<'a> {
    pub fn valid_pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if self.mask.get(x, y) {
            return None;
        }
        Some(self.image.get_pixel(x, y).0)
    }

    pub fn valid_count(&self) -> usize {
        self.mask.as_array().iter().filter(|excluded| !**excluded).count()
    }

    /// Copy of the image with excluded pixels set to black.
    pub fn filled(&self) -> RgbImage {
        let mut out = self.image.clone();
        for (x, y, pixel) in out.enumerate_pixels_mut() {
            if self.mask.get(x, y) {
                pixel.0 = [0, 0, 0];
            }
        }
        out
    }

    /// Mean color of the valid pixels in the disk of `radius` around
    /// `(cx, cy)`, rasterized like the circle layer.
    /// A disk without valid pixels averages to black.
    pub fn disk_mean(&self, cx: f64, cy: f64, radius: f64) -> RgbColor {
        let mut sum = [0u64; 3];
        let mut count = 0u64;
        for (x, y) in disk_pixels(cx, cy, radius, self.image.width(), self.image.height()) {
            if let Some(pixel) = self.valid_pixel(x, y) {
                for (acc, channel) in sum.iter_mut().zip(pixel) {
                    *acc += channel as u64;
                }
                count += 1;
            }
        }
        if count == 0 {
            return RgbColor::default();
        }
        let n = count as f64;
        RgbColor::new(sum[0] as f64 / n, sum[1] as f64 / n, sum[2] as f64 / n)
    }
}
