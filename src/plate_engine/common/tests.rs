use crate::plate_engine::common::error::EngineError;
use crate::plate_engine::common::grid::{WELL_COUNT, WellGrid, WellIndex};

#[test]
fn test_well_index_bounds() {
    assert!(WellIndex::new(7, 11).is_ok());
    assert!(matches!(WellIndex::new(8, 0), Err(EngineError::NotFound(_))));
    assert!(matches!(WellIndex::new(0, 12), Err(EngineError::NotFound(_))));
    assert!(matches!(WellIndex::from_offset(96), Err(EngineError::NotFound(_))));
}

#[test]
fn test_well_labels() {
    assert_eq!(WellIndex::new(0, 0).unwrap().label(), "1-A");
    assert_eq!(WellIndex::new(7, 11).unwrap().label(), "12-H");
    assert_eq!(WellIndex::new(2, 4).unwrap().to_string(), "5-C");
}

#[test]
fn test_row_major_offsets() {
    let wells: Vec<WellIndex> = WellIndex::all().collect();
    assert_eq!(wells.len(), WELL_COUNT);
    assert_eq!(wells[13], WellIndex::new(1, 1).unwrap());
    assert_eq!(WellIndex::from_offset(95).unwrap().offset(), 95);
}

#[test]
fn test_grid_get_mut_writes_one_cell() {
    let mut grid = WellGrid::filled(0u32);
    let well = WellIndex::new(3, 7).unwrap();
    *grid.get_mut(well) += 5;
    assert_eq!(*grid.get(well), 5);
    assert_eq!(grid.as_slice()[well.offset()], 5);
    assert_eq!(grid.iter().sum::<u32>(), 5);
}

#[test]
fn test_grid_json_shape() {
    let grid = WellGrid::from_fn(|well| well.offset() as u32);
    let json = serde_json::to_value(&grid).unwrap();
    let rows = json.as_array().unwrap();
    assert_eq!(rows.len(), 8);
    assert_eq!(rows[1].as_array().unwrap().len(), 12);
    assert_eq!(rows[1][0], 12);

    let restored: WellGrid<u32> = serde_json::from_value(json).unwrap();
    assert_eq!(restored, grid);
}

#[test]
fn test_grid_rejects_wrong_shape() {
    let bad = serde_json::json!([[1, 2, 3]]);
    assert!(serde_json::from_value::<WellGrid<u32>>(bad).is_err());
    assert!(matches!(WellGrid::from_vec(vec![0u8; 10]), Err(EngineError::Validation(_))));
}
