use std::path::{Path, PathBuf};

use image::{ImageFormat, RgbImage};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::plate_engine::common::error::{EngineError, Result};
use crate::plate_engine::config::{EngineConfig, MaskCompression};
use crate::plate_engine::geometry::plate_geometry::PlateGeometry;
use crate::plate_engine::mask::layers::BoolMask;
use crate::plate_engine::persistence::mask_codec::{MaskCodec, TiffMaskCodec};
use crate::plate_engine::snapshot::WellColorSample;
use crate::plate_engine::snapshot::extractor::WellColorExtractor;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MaskParameters {
    pub radius: f64,
    pub flare_threshold: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotSidecar {
    pub geometry: PlateGeometry,
    pub mask: MaskParameters,
    pub mean_colors: WellColorSample,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundlePaths {
    pub image: PathBuf,
    pub sidecar: PathBuf,
    pub mask: PathBuf,
}

impl BundlePaths {
    pub fn new<P: AsRef<Path>>(directory: P, stem: &str) -> Self {
        let directory = directory.as_ref();
        Self {
            image: directory.join(format!("{}.png", stem)),
            sidecar: directory.join(format!("{}.json", stem)),
            mask: directory.join(format!("{}_mask.tiff", stem)),
        }
    }
}

/// Everything needed to rebuild a snapshot without the original capture.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotBundle {
    pub plate: RgbImage,
    pub sidecar: SnapshotSidecar,
    pub custom_mask: BoolMask,
}

impl SnapshotBundle {
    pub fn capture(extractor: &mut WellColorExtractor) -> Result<Self> {
        let mean_colors = extractor.mean_colors()?.clone();
        Ok(Self {
            plate: extractor.plate_image().clone(),
            sidecar: SnapshotSidecar {
                geometry: *extractor.geometry(),
                mask: MaskParameters {
                    radius: extractor.radius(),
                    flare_threshold: extractor.flare_threshold(),
                },
                mean_colors,
            },
            custom_mask: extractor.custom_mask().clone(),
        })
    }

    pub fn save<P: AsRef<Path>>(&self, directory: P, stem: &str, compression: MaskCompression) -> Result<BundlePaths> {
        self.save_with(&TiffMaskCodec, directory.as_ref(), stem, compression)
    }

    #[instrument(skip(self, codec))]
    pub fn save_with<C: MaskCodec>(
        &self,
        codec: &C,
        directory: &Path,
        stem: &str,
        compression: MaskCompression,
    ) -> Result<BundlePaths> {
        std::fs::create_dir_all(directory)?;
        let paths = BundlePaths::new(directory, stem);

        {
            let _span = tracing::info_span!("write_plate_image").entered();
            self.plate.save_with_format(&paths.image, ImageFormat::Png)?;
        }
        {
            let _span = tracing::info_span!("write_sidecar").entered();
            std::fs::write(&paths.sidecar, serde_json::to_string_pretty(&self.sidecar)?)?;
        }
        {
            let _span = tracing::info_span!("write_mask").entered();
            let mut file = std::fs::File::create(&paths.mask)?;
            codec.write_mask(&self.custom_mask, &mut file, compression)?;
        }

        info!(
            image = %paths.image.display(),
            width = self.plate.width(),
            height = self.plate.height(),
            "Snapshot bundle saved"
        );
        Ok(paths)
    }

    pub fn load<P: AsRef<Path>>(directory: P, stem: &str) -> Result<Self> {
        Self::load_with(&TiffMaskCodec, directory.as_ref(), stem)
    }

    /// Reads all three parts; any unreadable or inconsistent part fails the
    /// whole load.
    #[instrument(skip(codec))]
    pub fn load_with<C: MaskCodec>(codec: &C, directory: &Path, stem: &str) -> Result<Self> {
        let paths = BundlePaths::new(directory, stem);

        let plate = image::open(&paths.image)?.into_rgb8();
        let sidecar: SnapshotSidecar = serde_json::from_str(&std::fs::read_to_string(&paths.sidecar)?)?;
        let custom_mask = codec.read_mask(&std::fs::read(&paths.mask)?)?;

        if custom_mask.width() != plate.width() || custom_mask.height() != plate.height() {
            return Err(EngineError::DecodeError(format!(
                "mask is {}x{} but plate image is {}x{}",
                custom_mask.width(),
                custom_mask.height(),
                plate.width(),
                plate.height()
            )));
        }
        if !sidecar.mask.radius.is_finite() || sidecar.mask.radius <= 0.0 {
            return Err(EngineError::DecodeError(format!(
                "sidecar radius must be positive, got {}",
                sidecar.mask.radius
            )));
        }

        info!(stem, width = plate.width(), height = plate.height(), "Snapshot bundle loaded");
        Ok(Self {
            plate,
            sidecar,
            custom_mask,
        })
    }

    /// Rebuilds an extractor over the stored plate image. The saved radius
    /// and flare threshold override those of `config`.
    pub fn into_extractor(self, config: EngineConfig) -> Result<WellColorExtractor> {
        let config = EngineConfig {
            radius: self.sidecar.mask.radius,
            flare_threshold: self.sidecar.mask.flare_threshold,
            ..config
        };
        let geometry = self.sidecar.geometry.relocated(0, 0);
        let mut extractor = WellColorExtractor::new(self.plate, geometry, config)?;
        extractor.set_custom_mask(self.custom_mask)?;
        Ok(extractor)
    }
}
