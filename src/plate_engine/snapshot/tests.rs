use image::{Rgb, RgbImage};

use crate::plate_engine::color::space::rgb_to_lab;
use crate::plate_engine::color::types::{LabColor, RgbColor};
use crate::plate_engine::common::error::EngineError;
use crate::plate_engine::common::grid::{WellGrid, WellIndex};
use crate::plate_engine::config::EngineConfig;
use crate::plate_engine::geometry::plate_geometry::{PlateDirection, PlateGeometry};
use crate::plate_engine::snapshot::correction::{
    ColorCorrectionFactors, CorrectionFactor, ReferenceMode, plate_mean_lab,
};
use crate::plate_engine::snapshot::extractor::WellColorExtractor;

fn well_color(well: WellIndex) -> [u8; 3] {
    [
        10 + well.row() as u8 * 20,
        10 + well.column() as u8 * 15,
        100,
    ]
}

/// Paints a square of each well's color around its center.
fn synthetic_plate(geometry: &PlateGeometry) -> RgbImage {
    let crop = geometry.crop_rect();
    let mut image = RgbImage::from_pixel(crop.x + crop.width, crop.y + crop.height, Rgb([0, 0, 0]));
    for (well, (cx, cy)) in geometry.well_centers().iter_wells() {
        let color = well_color(well);
        for dy in -9i64..=9 {
            for dx in -9i64..=9 {
                let x = (crop.x as f64 + cx) as i64 + dx;
                let y = (crop.y as f64 + cy) as i64 + dy;
                image.put_pixel(x as u32, y as u32, Rgb(color));
            }
        }
    }
    image
}

fn extractor_for(geometry: PlateGeometry) -> WellColorExtractor {
    let config = EngineConfig::builder().radius(6.0).flare_threshold(240).build();
    WellColorExtractor::new(synthetic_plate(&geometry), geometry, config).unwrap()
}

fn assert_rgb(actual: &RgbColor, expected: [u8; 3]) {
    for (a, e) in actual.channels().iter().zip(expected) {
        assert!((a - e as f64).abs() < 1e-9, "expected {:?}, got {:?}", expected, actual);
    }
}

#[test]
fn test_mean_colors_horizontal() {
    let geometry = PlateGeometry::new(0, 0, 480, 320, PlateDirection::Horizontal);
    let mut extractor = extractor_for(geometry);
    let means = extractor.mean_colors().unwrap();
    for (well, color) in means.iter_wells() {
        assert_rgb(color, well_color(well));
    }
}

#[test]
fn test_mean_colors_vertical_with_offset() {
    let geometry = PlateGeometry::new(15, 25, 480, 320, PlateDirection::Vertical);
    let mut extractor = extractor_for(geometry);
    assert_eq!(extractor.plate_image().dimensions(), (320, 480));
    let means = extractor.mean_colors().unwrap().clone();
    for (well, color) in means.iter_wells() {
        assert_rgb(color, well_color(well));
    }
}

#[test]
fn test_fully_masked_well_reports_zero() {
    let geometry = PlateGeometry::new(0, 0, 480, 320, PlateDirection::Horizontal);
    let mut extractor = extractor_for(geometry);
    let (cx, cy) = *extractor.well_centers().get(WellIndex::new(2, 3).unwrap());
    extractor.paint_custom_mask(cx, cy, 12.0, true);

    let means = extractor.mean_colors().unwrap();
    assert_eq!(means.get(WellIndex::new(2, 3).unwrap()).channels(), [0.0, 0.0, 0.0]);
    assert_rgb(means.get(WellIndex::new(2, 4).unwrap()), well_color(WellIndex::new(2, 4).unwrap()));
}

#[test]
fn test_flare_pixels_are_ignored() {
    let geometry = PlateGeometry::new(0, 0, 480, 320, PlateDirection::Horizontal);
    let mut image = synthetic_plate(&geometry);
    let well = WellIndex::new(0, 0).unwrap();
    let (cx, cy) = *geometry.well_centers().get(well);
    image.put_pixel(cx as u32, cy as u32, Rgb([255, 255, 255]));

    let config = EngineConfig::builder().radius(6.0).flare_threshold(240).build();
    let mut extractor = WellColorExtractor::new(image, geometry, config).unwrap();
    assert_rgb(extractor.mean_colors().unwrap().get(well), well_color(well));

    extractor.set_flare_threshold(255);
    let mean = *extractor.mean_colors().unwrap().get(well);
    assert!(mean.r > well_color(well)[0] as f64);
}

#[test]
fn test_mean_colors_are_cached_until_mutation() {
    let geometry = PlateGeometry::new(0, 0, 480, 320, PlateDirection::Horizontal);
    let mut extractor = extractor_for(geometry);
    extractor.mean_colors().unwrap();
    extractor.mean_colors().unwrap();
    extractor.lab_colors().unwrap();
    assert_eq!(extractor.mask_recomputations(), 1);

    extractor.paint_custom_mask(1.0, 1.0, 1.0, true);
    extractor.mean_colors().unwrap();
    assert_eq!(extractor.mask_recomputations(), 2);

    extractor.set_radius(5.0).unwrap();
    extractor.mean_colors().unwrap();
    assert_eq!(extractor.mask_recomputations(), 3);
    assert!(matches!(extractor.set_radius(0.0), Err(EngineError::Validation(_))));
}

#[test]
fn test_new_source_keeps_custom_mask_and_factors() {
    let geometry = PlateGeometry::new(0, 0, 480, 320, PlateDirection::Horizontal);
    let mut extractor = extractor_for(geometry);
    extractor.paint_custom_mask(40.0, 40.0, 3.0, true);
    extractor.calibrate().unwrap();

    extractor
        .set_source_image(synthetic_plate(&geometry), geometry)
        .unwrap();
    assert!(extractor.custom_mask().get(40, 40));
    assert!(extractor.correction_factors().is_some());
}

#[test]
fn test_zero_sized_plate_is_rejected() {
    let geometry = PlateGeometry::new(0, 0, 0, 320, PlateDirection::Horizontal);
    let result = WellColorExtractor::new(RgbImage::new(10, 10), geometry, EngineConfig::default());
    assert!(matches!(result, Err(EngineError::InvalidDimensions(0, 320))));
}

#[test]
fn test_whole_plate_correction_hits_reference_lightness() {
    let geometry = PlateGeometry::new(0, 0, 480, 320, PlateDirection::Horizontal);
    let mut extractor = extractor_for(geometry);
    let reference = extractor.reference_value().unwrap();
    let factors = extractor.calibrate().unwrap().clone();
    assert_eq!(factors.reference(), reference);

    let corrected = extractor.corrected_lab().unwrap().unwrap();
    let mean = plate_mean_lab(&corrected);
    assert!((mean.l - reference.l).abs() < 1e-9);
    assert!((mean.a - reference.a).abs() < 1e-9);
}

#[test]
fn test_single_well_reference() {
    let geometry = PlateGeometry::new(0, 0, 480, 320, PlateDirection::Horizontal);
    let mut extractor = extractor_for(geometry);
    let anchor = WellIndex::new(4, 6).unwrap();
    let reference = extractor
        .set_reference_mode(ReferenceMode::SingleWell(anchor))
        .unwrap();
    let expected = rgb_to_lab(RgbColor::from(well_color(anchor).map(f64::from)));
    assert!((reference.l - expected.l).abs() < 1e-9);

    extractor.calibrate().unwrap();
    let corrected_rgb = extractor.corrected_rgb().unwrap().unwrap();
    for color in corrected_rgb.iter() {
        assert!(color.distance(&RgbColor::from(well_color(anchor).map(f64::from))) < 1.0);
    }
}

#[test]
fn test_mode_switch_keeps_cached_colors() {
    let geometry = PlateGeometry::new(0, 0, 480, 320, PlateDirection::Horizontal);
    let mut extractor = extractor_for(geometry);
    let before = extractor.mean_colors().unwrap().clone();

    let manual = LabColor::new(60.0, 5.0, -5.0);
    assert_eq!(extractor.set_reference_mode(ReferenceMode::Manual(manual)).unwrap(), manual);
    extractor
        .set_reference_mode(ReferenceMode::WholePlate)
        .unwrap();
    assert_eq!(extractor.mask_recomputations(), 1);
    assert_eq!(extractor.mean_colors().unwrap(), &before);
}

#[test]
fn test_corrected_values_absent_before_calibration() {
    let geometry = PlateGeometry::new(0, 0, 480, 320, PlateDirection::Horizontal);
    let mut extractor = extractor_for(geometry);
    assert!(extractor.corrected_lab().unwrap().is_none());
    assert!(extractor.corrected_rgb().unwrap().is_none());
}

#[test]
fn test_correction_factor_formula_and_clamp() {
    let factor = CorrectionFactor::between(LabColor::new(40.0, 10.0, -10.0), LabColor::new(80.0, 0.0, 5.0));
    assert_eq!(factor.scale_l, 2.0);
    assert_eq!(factor.offset_a, -10.0);
    assert_eq!(factor.offset_b, 15.0);
    assert_eq!(factor.apply(LabColor::new(60.0, 130.0, 0.0)), LabColor::new(100.0, 120.0, 15.0));

    let dark = CorrectionFactor::between(LabColor::new(0.0, 0.0, 0.0), LabColor::new(50.0, 0.0, 0.0));
    assert_eq!(dark.scale_l, 50.0);
}

#[test]
fn test_manual_factors_apply_to_any_sample() {
    let lab = WellGrid::from_fn(|well| LabColor::new(20.0 + well.row() as f64, 0.0, 0.0));
    let target = LabColor::new(50.0, 10.0, 10.0);
    let factors = ColorCorrectionFactors::compute(&lab, ReferenceMode::Manual(target));
    let corrected = WellColorExtractor::apply_correction(&lab, &factors);
    for value in corrected.iter() {
        assert!((value.l - 50.0).abs() < 1e-9);
        assert_eq!((value.a, value.b), (10.0, 10.0));
    }
    assert_eq!(ColorCorrectionFactors::identity().apply(&lab), lab);
}

#[test]
fn test_filled_plate_blacks_out_excluded_pixels() {
    let geometry = PlateGeometry::new(10, 5, 480, 320, PlateDirection::Horizontal);
    let config = EngineConfig::builder().radius(6.0).flare_threshold(240).build();
    let mut source = RgbImage::from_pixel(500, 330, Rgb([60, 90, 120]));
    let centers = geometry.well_centers();
    let (fx, fy) = *centers.get(WellIndex::new(4, 4).unwrap());
    source.put_pixel(10 + fx.round() as u32, 5 + fy.round() as u32, Rgb([250, 250, 250]));
    let mut extractor = WellColorExtractor::new(source, geometry, config).unwrap();

    let (cx, cy) = *centers.get(WellIndex::new(0, 0).unwrap());
    let (px, py) = *centers.get(WellIndex::new(2, 3).unwrap());
    extractor.paint_custom_mask(px, py, 1.0, true);

    let filled = extractor.filled_plate().unwrap();
    assert_eq!(filled.dimensions(), (480, 320));
    assert_eq!(*filled.get_pixel(cx.round() as u32, cy.round() as u32), Rgb([60, 90, 120]));
    assert_eq!(*filled.get_pixel(0, 0), Rgb([0, 0, 0]));
    assert_eq!(*filled.get_pixel(px.round() as u32, py.round() as u32), Rgb([0, 0, 0]));
    assert_eq!(*filled.get_pixel(fx.round() as u32, fy.round() as u32), Rgb([0, 0, 0]));

    let black = filled.pixels().filter(|p| p.0 == [0, 0, 0]).count();
    assert!(black > 480 * 320 / 2);
}
