//! Well color extraction for one captured image.
//!
//! Derived values are recomputed on read in a fixed order: geometry, then
//! mask layers, then mean colors, then Lab, then the corrected colors.
//! Setters only mark the affected stage stale.

use image::RgbImage;
use image::imageops;
use tracing::{debug, info, instrument};

use crate::plate_engine::color::space::{lab_grid, rgb_grid_from_lab};
use crate::plate_engine::color::types::{LabColor, RgbColor};
use crate::plate_engine::common::error::{EngineError, Result};
use crate::plate_engine::common::grid::WellGrid;
use crate::plate_engine::config::EngineConfig;
use crate::plate_engine::geometry::plate_geometry::PlateGeometry;
use crate::plate_engine::mask::layers::BoolMask;
use crate::plate_engine::mask::mask_engine::MaskEngine;
use crate::plate_engine::snapshot::WellColorSample;
use crate::plate_engine::snapshot::correction::{ColorCorrectionFactors, ReferenceMode};

pub struct WellColorExtractor {
    config: EngineConfig,
    source: RgbImage,
    geometry: PlateGeometry,
    plate: RgbImage,
    masks: MaskEngine,
    circle_stale: bool,
    flare_stale: bool,
    mean_colors: Option<WellColorSample>,
    lab_colors: Option<WellGrid<LabColor>>,
    reference_mode: ReferenceMode,
    correction: Option<ColorCorrectionFactors>,
}

impl WellColorExtractor {
    pub fn new(source: RgbImage, geometry: PlateGeometry, config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let plate = crop_plate(&source, &geometry)?;
        let masks = MaskEngine::new(plate.width(), plate.height());
        let reference_mode = config.reference_mode;
        Ok(Self {
            config,
            source,
            geometry,
            plate,
            masks,
            circle_stale: true,
            flare_stale: true,
            mean_colors: None,
            lab_colors: None,
            reference_mode,
            correction: None,
        })
    }

    /// Installs a new raw image and geometry. The free-hand mask survives
    /// when the cropped plate keeps its size; correction factors always do.
    #[instrument(skip(self, source), fields(width = source.width(), height = source.height()))]
    pub fn set_source_image(&mut self, source: RgbImage, geometry: PlateGeometry) -> Result<()> {
        let plate = crop_plate(&source, &geometry)?;
        self.source = source;
        self.geometry = geometry;
        self.install_plate(plate);
        Ok(())
    }

    /// Re-crops the current source with a new geometry.
    pub fn set_geometry(&mut self, geometry: PlateGeometry) -> Result<()> {
        let plate = crop_plate(&self.source, &geometry)?;
        self.geometry = geometry;
        self.install_plate(plate);
        Ok(())
    }

    fn install_plate(&mut self, plate: RgbImage) {
        if self.masks.dimensions() != plate.dimensions() {
            debug!(
                width = plate.width(),
                height = plate.height(),
                "Plate size changed, resetting mask layers"
            );
            self.masks = MaskEngine::new(plate.width(), plate.height());
        }
        self.plate = plate;
        self.circle_stale = true;
        self.flare_stale = true;
        self.invalidate_colors();
    }

    pub fn set_radius(&mut self, radius: f64) -> Result<()> {
        if !radius.is_finite() || radius <= 0.0 {
            return Err(EngineError::Validation(format!(
                "radius must be positive, got {}",
                radius
            )));
        }
        self.config.radius = radius;
        self.circle_stale = true;
        self.invalidate_colors();
        Ok(())
    }

    pub fn set_flare_threshold(&mut self, threshold: u8) {
        self.config.flare_threshold = threshold;
        self.flare_stale = true;
        self.invalidate_colors();
    }

    pub fn paint_custom_mask(&mut self, x: f64, y: f64, brush_radius: f64, add: bool) {
        self.masks.paint_custom_mask(x, y, brush_radius, add);
        self.invalidate_colors();
    }

    pub fn clear_custom_mask(&mut self) {
        self.masks.clear_custom_mask();
        self.invalidate_colors();
    }

    pub fn set_custom_mask(&mut self, mask: BoolMask) -> Result<()> {
        self.masks.set_custom_mask(mask)?;
        self.invalidate_colors();
        Ok(())
    }

    fn invalidate_colors(&mut self) {
        self.mean_colors = None;
        self.lab_colors = None;
    }

    fn refresh_layers(&mut self) -> Result<()> {
        if self.circle_stale {
            self.masks
                .set_circle_mask(&self.geometry.well_centers(), self.config.radius);
            self.circle_stale = false;
        }
        if self.flare_stale {
            self.masks
                .set_flare_mask(&self.plate, self.config.flare_threshold)?;
            self.flare_stale = false;
        }
        Ok(())
    }

    /// Mean RGB per well over the valid pixels of its disk. Wells with no
    /// valid pixel report black.
    pub fn mean_colors(&mut self) -> Result<&WellColorSample> {
        let means = match self.mean_colors.take() {
            Some(means) => means,
            None => self.compute_mean_colors()?,
        };
        Ok(&*self.mean_colors.insert(means))
    }

    fn compute_mean_colors(&mut self) -> Result<WellColorSample> {
        self.refresh_layers()?;
        let centers = self.geometry.well_centers();
        let radius = self.config.radius;
        let masked = self.masks.masked_array(&self.plate)?;
        let means = centers.map(|(cx, cy)| masked.disk_mean(*cx, *cy, radius));
        debug!(
            valid_pixels = masked.valid_count(),
            radius, "Mean well colors computed"
        );
        Ok(means)
    }

    /// CIE Lab of a mean-color grid (sRGB, D65).
    pub fn to_lab(rgb: &WellGrid<RgbColor>) -> WellGrid<LabColor> {
        lab_grid(rgb)
    }

    pub fn lab_colors(&mut self) -> Result<&WellGrid<LabColor>> {
        let lab = match self.lab_colors.take() {
            Some(lab) => lab,
            None => lab_grid(self.mean_colors()?),
        };
        Ok(&*self.lab_colors.insert(lab))
    }

    /// Computes factors for `mode` from the current sample without storing them.
    pub fn compute_correction_factors(
        &mut self,
        mode: ReferenceMode,
    ) -> Result<ColorCorrectionFactors> {
        let lab = self.lab_colors()?;
        Ok(ColorCorrectionFactors::compute(lab, mode))
    }

    /// Switches the reference source and returns the newly resolved reference.
    /// Cached colors are kept.
    pub fn set_reference_mode(&mut self, mode: ReferenceMode) -> Result<LabColor> {
        self.reference_mode = mode;
        self.reference_value()
    }

    pub fn reference_mode(&self) -> ReferenceMode {
        self.reference_mode
    }

    pub fn reference_value(&mut self) -> Result<LabColor> {
        let mode = self.reference_mode;
        Ok(mode.reference_for(self.lab_colors()?))
    }

    /// Computes and stores factors from the current sample and reference mode.
    pub fn calibrate(&mut self) -> Result<&ColorCorrectionFactors> {
        let factors = self.compute_correction_factors(self.reference_mode)?;
        info!(
            mode = ?factors.mode(),
            reference = ?factors.reference(),
            "Color correction calibrated"
        );
        Ok(&*self.correction.insert(factors))
    }

    pub fn set_correction_factors(&mut self, factors: Option<ColorCorrectionFactors>) {
        self.correction = factors;
    }

    pub fn correction_factors(&self) -> Option<&ColorCorrectionFactors> {
        self.correction.as_ref()
    }

    pub fn apply_correction(
        lab: &WellGrid<LabColor>,
        factors: &ColorCorrectionFactors,
    ) -> WellGrid<LabColor> {
        factors.apply(lab)
    }

    /// Corrected Lab, or `None` before calibration.
    pub fn corrected_lab(&mut self) -> Result<Option<WellGrid<LabColor>>> {
        let Some(factors) = self.correction.clone() else {
            return Ok(None);
        };
        Ok(Some(factors.apply(self.lab_colors()?)))
    }

    /// Corrected colors mapped back to 0..255 RGB, or `None` before calibration.
    pub fn corrected_rgb(&mut self) -> Result<Option<WellGrid<RgbColor>>> {
        Ok(self.corrected_lab()?.map(|lab| rgb_grid_from_lab(&lab)))
    }

    /// Cropped plate with excluded pixels blacked out, for display.
    pub fn filled_plate(&mut self) -> Result<RgbImage> {
        self.refresh_layers()?;
        Ok(self.masks.masked_array(&self.plate)?.filled())
    }

    pub fn geometry(&self) -> &PlateGeometry {
        &self.geometry
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn radius(&self) -> f64 {
        self.config.radius
    }

    pub fn flare_threshold(&self) -> u8 {
        self.config.flare_threshold
    }

    pub fn plate_image(&self) -> &RgbImage {
        &self.plate
    }

    pub fn custom_mask(&self) -> &BoolMask {
        self.masks.custom_mask()
    }

    pub fn well_centers(&self) -> WellGrid<(f64, f64)> {
        self.geometry.well_centers()
    }

    pub fn mask_recomputations(&self) -> u64 {
        self.masks.recomputations()
    }
}

fn crop_plate(source: &RgbImage, geometry: &PlateGeometry) -> Result<RgbImage> {
    let rect = geometry.crop_rect();
    if rect.width == 0 || rect.height == 0 {
        return Err(EngineError::InvalidDimensions(rect.width, rect.height));
    }
    let plate = imageops::crop_imm(source, rect.x, rect.y, rect.width, rect.height).to_image();
    if plate.width() == 0 || plate.height() == 0 {
        return Err(EngineError::InvalidDimensions(plate.width(), plate.height()));
    }
    if plate.dimensions() != (rect.width, rect.height) {
        debug!(
            requested_width = rect.width,
            requested_height = rect.height,
            width = plate.width(),
            height = plate.height(),
            "Plate region clipped to image bounds"
        );
    }
    Ok(plate)
}
