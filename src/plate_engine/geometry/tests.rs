use std::collections::HashSet;

use crate::plate_engine::common::error::EngineError;
use crate::plate_engine::common::grid::WellIndex;
use crate::plate_engine::geometry::plate_geometry::{PlateDirection, PlateGeometry};

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 0.01,
        "expected {}, got {}",
        expected,
        actual
    );
}

#[test]
fn test_horizontal_axes() {
    let geometry = PlateGeometry::new(0, 0, 1000, 600, PlateDirection::Horizontal);

    let columns = geometry.column_axes();
    assert_eq!(columns.len(), 12);
    assert_close(columns[0], 41.67);
    assert_close(columns[1], 125.0);
    assert_close(columns[11], 958.33);

    let rows = geometry.row_axes();
    assert_eq!(rows.len(), 8);
    assert_close(rows[0], 37.5);
    assert_close(rows[1], 112.5);
    assert_close(rows[7], 562.5);
}

#[test]
fn test_vertical_swaps_crop_and_counts() {
    let geometry = PlateGeometry::new(10, 20, 1000, 600, PlateDirection::Vertical);
    let crop = geometry.crop_rect();
    assert_eq!((crop.x, crop.y, crop.width, crop.height), (10, 20, 600, 1000));
    assert_eq!(geometry.column_axes().len(), 8);
    assert_eq!(geometry.row_axes().len(), 12);

    // Logical row runs along image x once the plate is rotated.
    let a1 = geometry.well_centers().get(WellIndex::new(0, 0).unwrap()).clone();
    let h1 = geometry.well_centers().get(WellIndex::new(7, 0).unwrap()).clone();
    assert_close(a1.1, h1.1);
    assert!(h1.0 > a1.0);
}

#[test]
fn test_ninety_six_distinct_centers_in_both_directions() {
    for direction in [PlateDirection::Horizontal, PlateDirection::Vertical] {
        let geometry = PlateGeometry::new(0, 0, 1200, 800, direction);
        let centers: HashSet<(i64, i64)> = geometry
            .well_centers()
            .iter()
            .map(|(x, y)| ((x * 100.0) as i64, (y * 100.0) as i64))
            .collect();
        assert_eq!(centers.len(), 96);
    }
}

#[test]
fn test_double_toggle_restores_axes() {
    let original = PlateGeometry::new(5, 5, 900, 640, PlateDirection::Horizontal);
    let mut geometry = original;
    geometry.toggle_direction();
    assert_ne!(geometry.column_axes(), original.column_axes());
    geometry.toggle_direction();
    assert_eq!(geometry, original);
    assert_eq!(geometry.row_axes(), original.row_axes());
    assert_eq!(geometry.column_axes(), original.column_axes());
}

#[test]
fn test_invalid_direction_has_no_effect() {
    let mut geometry = PlateGeometry::new(0, 0, 120, 80, PlateDirection::Vertical);
    let result = geometry.set_direction(2);
    assert!(matches!(result, Err(EngineError::Validation(_))));
    assert_eq!(geometry.direction(), PlateDirection::Vertical);

    geometry.set_direction(0).unwrap();
    assert_eq!(geometry.direction(), PlateDirection::Horizontal);
}

#[test]
fn test_set_orientation_matches_toggle() {
    let mut toggled = PlateGeometry::new(0, 0, 120, 80, PlateDirection::Horizontal);
    toggled.toggle_direction();
    let mut oriented = PlateGeometry::new(0, 0, 120, 80, PlateDirection::Horizontal);
    oriented.set_orientation(PlateDirection::Vertical);
    assert_eq!(oriented, toggled);
    assert_eq!(oriented.well_centers(), toggled.well_centers());

    oriented.set_orientation(PlateDirection::Vertical);
    assert_eq!(oriented.direction(), PlateDirection::Vertical);
}

#[test]
fn test_set_region_keeps_direction() {
    let mut geometry = PlateGeometry::new(0, 0, 120, 80, PlateDirection::Vertical);
    geometry.set_region(3, 4, 240, 160);
    assert_eq!(geometry.direction(), PlateDirection::Vertical);
    assert_eq!(geometry.crop_rect().width, 160);
}

#[test]
fn test_direction_serializes_as_code() {
    let geometry = PlateGeometry::new(1, 2, 3, 4, PlateDirection::Vertical);
    let json = serde_json::to_value(geometry).unwrap();
    assert_eq!(json["direction"], 1);

    let bad = serde_json::json!({"x": 0, "y": 0, "width": 1, "height": 1, "direction": 7});
    assert!(serde_json::from_value::<PlateGeometry>(bad).is_err());
}
