use image::{Rgb, RgbImage};

use crate::plate_engine::common::error::EngineError;
use crate::plate_engine::geometry::plate_geometry::{PlateDirection, PlateGeometry};
use crate::plate_engine::mask::layers::{BoolMask, disk_pixels};
use crate::plate_engine::mask::mask_engine::MaskEngine;

fn plate_engine_for(geometry: &PlateGeometry, radius: f64) -> MaskEngine {
    let crop = geometry.crop_rect();
    let mut engine = MaskEngine::new(crop.width, crop.height);
    engine.set_circle_mask(&geometry.well_centers(), radius);
    engine
}

#[test]
fn test_disk_fill_is_clipped() {
    let mut mask = BoolMask::new(10, 10);
    mask.fill_disk(0.0, 0.0, 3.0, true);
    assert!(mask.get(0, 0));
    assert!(mask.get(3, 0));
    assert!(!mask.get(3, 3));
    mask.fill_disk(-50.0, 400.0, 2.0, true);
    assert!(mask.get(0, 0));
}

#[test]
fn test_layer_is_row_major_array() {
    let mut mask = BoolMask::new(7, 4);
    assert_eq!(mask.as_array().dim(), (4, 7));
    mask.set(6, 1, true);
    assert!(mask.as_array()[[1, 6]]);
    assert!(mask.get(7, 0));
    assert!(mask.get(0, 4));

    let raw: Vec<bool> = (0..28).map(|i| i % 7 == 0).collect();
    let column = BoolMask::from_raw(7, 4, raw).unwrap();
    assert_eq!(column.count_set(), 4);
    assert!((0..4).all(|y| column.get(0, y)));
    assert!(matches!(
        BoolMask::from_raw(7, 4, vec![false; 27]),
        Err(EngineError::InvalidDimensions(7, 4))
    ));

    mask.union_with(&column);
    assert_eq!(mask.count_set(), 5);
}

#[test]
fn test_disk_pixels_match_filled_disk() {
    let mut mask = BoolMask::new(20, 12);
    mask.fill_disk(2.4, 9.6, 4.2, true);
    let pixels = disk_pixels(2.4, 9.6, 4.2, 20, 12);
    assert_eq!(pixels.len(), mask.count_set());
    assert!(pixels.iter().all(|&(x, y)| mask.get(x, y)));
    assert!(pixels.contains(&(2, 10)));

    mask.fill_disk(2.4, 9.6, 4.2, false);
    assert_eq!(mask.count_set(), 0);
}

#[test]
fn test_circle_mask_keeps_only_well_disks() {
    let geometry = PlateGeometry::new(0, 0, 240, 160, PlateDirection::Horizontal);
    let mut engine = plate_engine_for(&geometry, 5.0);
    let combined = engine.combined_mask();

    // Well A1 center sits at (10, 10).
    assert!(!combined.get(10, 10));
    assert!(!combined.get(14, 10));
    assert!(combined.get(16, 10));
    assert!(combined.get(0, 0));
}

#[test]
fn test_flare_mask_marks_bright_pixels() {
    let mut image = RgbImage::from_pixel(20, 20, Rgb([100, 100, 100]));
    image.put_pixel(3, 4, Rgb([100, 251, 100]));
    image.put_pixel(5, 5, Rgb([250, 250, 250]));

    let mut engine = MaskEngine::new(20, 20);
    engine.set_flare_mask(&image, 250).unwrap();
    assert!(engine.flare_mask().get(3, 4));
    assert!(!engine.flare_mask().get(5, 5));
    assert_eq!(engine.flare_mask().count_set(), 1);
}

#[test]
fn test_flare_mask_rejects_other_shapes() {
    let image = RgbImage::new(5, 5);
    let mut engine = MaskEngine::new(20, 20);
    assert!(matches!(
        engine.set_flare_mask(&image, 200),
        Err(EngineError::InvalidDimensions(5, 5))
    ));
}

#[test]
fn test_custom_paint_and_erase() {
    let mut engine = MaskEngine::new(30, 30);
    engine.paint_custom_mask(15.0, 15.0, 4.0, true);
    assert!(engine.custom_mask().get(15, 15));
    engine.paint_custom_mask(15.0, 15.0, 2.0, false);
    assert!(!engine.custom_mask().get(15, 15));
    assert!(engine.custom_mask().get(15, 11));

    // Off-canvas strokes never panic.
    engine.paint_custom_mask(-100.0, 1e6, 10.0, true);
    engine.paint_custom_mask(29.0, 29.0, 100.0, true);
    assert_eq!(engine.custom_mask().count_set(), 900);
}

#[test]
fn test_combined_mask_is_pulled_once_per_change() {
    let mut image = RgbImage::from_pixel(24, 16, Rgb([10, 10, 10]));
    image.put_pixel(0, 0, Rgb([255, 0, 0]));
    let mut engine = MaskEngine::new(24, 16);
    engine.set_flare_mask(&image, 200).unwrap();
    engine.paint_custom_mask(20.0, 10.0, 1.0, true);
    assert_eq!(engine.recomputations(), 0);

    let excluded = engine.combined_mask().count_set();
    assert_eq!(engine.recomputations(), 1);
    assert_eq!(excluded, 1 + engine.custom_mask().count_set());

    engine.combined_mask();
    engine.combined_mask();
    assert_eq!(engine.recomputations(), 1);

    engine.paint_custom_mask(5.0, 5.0, 1.0, true);
    assert!(engine.is_dirty());
    engine.combined_mask();
    assert_eq!(engine.recomputations(), 2);
}

#[test]
fn test_masked_array_fill_and_disk_mean() {
    let mut image = RgbImage::from_pixel(20, 20, Rgb([40, 80, 120]));
    image.put_pixel(10, 10, Rgb([255, 255, 255]));
    let mut engine = MaskEngine::new(20, 20);
    engine.set_flare_mask(&image, 250).unwrap();

    let masked = engine.masked_array(&image).unwrap();
    assert_eq!(masked.valid_pixel(10, 10), None);
    assert_eq!(masked.valid_count(), 399);
    assert_eq!(masked.filled().get_pixel(10, 10).0, [0, 0, 0]);

    let mean = masked.disk_mean(10.0, 10.0, 3.0);
    assert_eq!(mean.channels(), [40.0, 80.0, 120.0]);
}

#[test]
fn test_fully_masked_disk_is_black() {
    let image = RgbImage::from_pixel(20, 20, Rgb([90, 90, 90]));
    let mut engine = MaskEngine::new(20, 20);
    engine.paint_custom_mask(10.0, 10.0, 6.0, true);
    let masked = engine.masked_array(&image).unwrap();
    assert_eq!(masked.disk_mean(10.0, 10.0, 3.0).channels(), [0.0, 0.0, 0.0]);
}

#[test]
fn test_union_with_smaller_layer_covers_overlap() {
    let mut mask = BoolMask::new(6, 6);
    let small = BoolMask::filled(3, 2, true);
    mask.union_with(&small);
    assert_eq!(mask.count_set(), 6);
    assert!(mask.get(2, 1));
    assert!(!mask.get(3, 1));
    assert!(!mask.get(0, 2));
}
