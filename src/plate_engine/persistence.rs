//! Persistence module
//!
//! On-disk snapshot bundles: the cropped plate image, a JSON sidecar with the
//! layout and mean colors, and the free-hand mask as a compressed TIFF.

pub mod mask_codec;
pub mod snapshot_bundle;


pub use mask_codec::{MaskCodec, TiffMaskCodec};
pub use snapshot_bundle::{BundlePaths, MaskParameters, SnapshotBundle, SnapshotSidecar};
