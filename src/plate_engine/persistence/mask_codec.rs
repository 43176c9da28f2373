use std::io::{Cursor, Write};

use tiff::ColorType;
use tiff::decoder::{Decoder, DecodingResult};
use tiff::encoder::compression::DeflateLevel;
use tiff::encoder::{Compression, TiffEncoder, colortype};
use tracing::debug;

use crate::plate_engine::common::error::{EngineError, Result};
use crate::plate_engine::config::MaskCompression;
use crate::plate_engine::mask::layers::BoolMask;

const EXCLUDED: u8 = u8::MAX;

pub trait MaskCodec {
    fn write_mask(&self, mask: &BoolMask, output: &mut dyn Write, compression: MaskCompression) -> Result<()>;
    fn read_mask(&self, input: &[u8]) -> Result<BoolMask>;
}

/// Single-channel 8-bit TIFF, 255 for excluded pixels and 0 otherwise.
#[derive(Debug, Clone, Copy, Default)]
pub struct TiffMaskCodec;

impl TiffMaskCodec {
    fn compression(compression: MaskCompression) -> Compression {
        match compression {
            MaskCompression::None => Compression::Uncompressed,
            MaskCompression::Lzw => Compression::Lzw,
            MaskCompression::DeflateFast => Compression::Deflate(DeflateLevel::Fast),
            MaskCompression::DeflateBalanced => Compression::Deflate(DeflateLevel::Balanced),
            MaskCompression::DeflateBest => Compression::Deflate(DeflateLevel::Best),
        }
    }
}

impl MaskCodec for TiffMaskCodec {
    fn write_mask(&self, mask: &BoolMask, output: &mut dyn Write, compression: MaskCompression) -> Result<()> {
        debug!("Encoding mask TIFF: {}x{}", mask.width(), mask.height());

        let pixels: Vec<u8> = mask
            .as_array()
            .iter()
            .map(|&excluded| if excluded { EXCLUDED } else { 0 })
            .collect();

        let mut buffer = Vec::new();
        let mut encoder = TiffEncoder::new(Cursor::new(&mut buffer))
            .map_err(|e| EngineError::EncodeError(e.to_string()))?
            .with_compression(Self::compression(compression));
        encoder
            .write_image::<colortype::Gray8>(mask.width(), mask.height(), &pixels)
            .map_err(|e| EngineError::EncodeError(e.to_string()))?;

        output.write_all(&buffer)?;
        debug!(bytes = buffer.len(), "Mask TIFF encoding complete");
        Ok(())
    }

    fn read_mask(&self, input: &[u8]) -> Result<BoolMask> {
        let mut decoder =
            Decoder::new(Cursor::new(input)).map_err(|e| EngineError::DecodeError(e.to_string()))?;
        let (width, height) = decoder
            .dimensions()
            .map_err(|e| EngineError::DecodeError(e.to_string()))?;
        let color_type = decoder
            .colortype()
            .map_err(|e| EngineError::DecodeError(e.to_string()))?;
        if color_type != ColorType::Gray(8) {
            return Err(EngineError::DecodeError(format!(
                "mask TIFF must be 8-bit grayscale, found {:?}",
                color_type
            )));
        }
        let pixels = match decoder
            .read_image()
            .map_err(|e| EngineError::DecodeError(e.to_string()))?
        {
            DecodingResult::U8(pixels) => pixels,
            _ => {
                return Err(EngineError::DecodeError(
                    "mask TIFF holds non 8-bit samples".to_string(),
                ));
            }
        };
        BoolMask::from_raw(width, height, pixels.into_iter().map(|p| p != 0).collect())
            .map_err(|_| EngineError::DecodeError(format!("mask TIFF data does not fill {}x{}", width, height)))
    }
}
