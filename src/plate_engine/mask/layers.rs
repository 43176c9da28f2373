//! Boolean pixel layers

use image::Luma;
use imageproc::drawing::{Canvas, draw_filled_circle_mut};
use ndarray::{Array2, Zip, s};

use crate::plate_engine::common::error::{EngineError, Result};

const EXCLUDED: Luma<u8> = Luma([u8::MAX]);
const INCLUDED: Luma<u8> = Luma([0]);

/// Boolean layer indexed `[y, x]`, `true` marks an excluded pixel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoolMask {
    data: Array2<bool>,
}

impl BoolMask {
    pub fn new(width: u32, height: u32) -> Self {
        Self::filled(width, height, false)
    }

    pub fn filled(width: u32, height: u32, value: bool) -> Self {
        Self {
            data: Array2::from_elem((height as usize, width as usize), value),
        }
    }

    /// Layer from row-major values.
    pub fn from_raw(width: u32, height: u32, data: Vec<bool>) -> Result<Self> {
        let data = Array2::from_shape_vec((height as usize, width as usize), data)
            .map_err(|_| EngineError::InvalidDimensions(width, height))?;
        Ok(Self { data })
    }

    pub fn width(&self) -> u32 {
        self.data.ncols() as u32
    }

    pub fn height(&self) -> u32 {
        self.data.nrows() as u32
    }

    pub fn as_array(&self) -> &Array2<bool> {
        &self.data
    }

    /// Out-of-bounds reads count as excluded.
    pub fn get(&self, x: u32, y: u32) -> bool {
        self.data
            .get((y as usize, x as usize))
            .copied()
            .unwrap_or(true)
    }

    pub fn set(&mut self, x: u32, y: u32, value: bool) {
        if let Some(cell) = self.data.get_mut((y as usize, x as usize)) {
            *cell = value;
        }
    }

    pub fn fill(&mut self, value: bool) {
        self.data.fill(value);
    }

    /// Writes `value` into a filled disk of `radius` around `(cx, cy)`,
    /// both rounded to whole pixels. Parts outside the layer are dropped.
    pub fn fill_disk(&mut self, cx: f64, cy: f64, radius: f64, value: bool) {
        let color = if value { EXCLUDED } else { INCLUDED };
        draw_filled_circle_mut(self, pixel_center(cx, cy), pixel_radius(radius), color);
    }

    /// Logical OR with `other` over the area both layers cover.
    pub fn union_with(&mut self, other: &BoolMask) {
        let rows = self.data.nrows().min(other.data.nrows());
        let cols = self.data.ncols().min(other.data.ncols());
        Zip::from(self.data.slice_mut(s![..rows, ..cols]))
            .and(other.data.slice(s![..rows, ..cols]))
            .for_each(|a, &b| *a |= b);
    }

    pub fn count_set(&self) -> usize {
        self.data.iter().filter(|v| **v).count()
    }
}

impl Canvas for BoolMask {
    type Pixel = Luma<u8>;

    fn dimensions(&self) -> (u32, u32) {
        (self.width(), self.height())
    }

    fn get_pixel(&self, x: u32, y: u32) -> Self::Pixel {
        if self.get(x, y) { EXCLUDED } else { INCLUDED }
    }

    fn draw_pixel(&mut self, x: u32, y: u32, color: Self::Pixel) {
        self.set(x, y, color[0] != 0);
    }
}

fn pixel_center(cx: f64, cy: f64) -> (i32, i32) {
    (cx.round() as i32, cy.round() as i32)
}

fn pixel_radius(radius: f64) -> i32 {
    radius.max(0.0).round() as i32
}

/// Pixels covered by the same disk [`BoolMask::fill_disk`] draws, clipped to a
/// `width` x `height` area.
pub(crate) fn disk_pixels(cx: f64, cy: f64, radius: f64, width: u32, height: u32) -> Vec<(u32, u32)> {
    let r = pixel_radius(radius);
    let side = 2 * r as u32 + 1;
    let mut stamp = BoolMask::new(side, side);
    draw_filled_circle_mut(&mut stamp, (r, r), r, EXCLUDED);

    let (x0, y0) = pixel_center(cx, cy);
    stamp
        .data
        .indexed_iter()
        .filter(|(_, covered)| **covered)
        .filter_map(|((dy, dx), _)| {
            let x = x0 as i64 - r as i64 + dx as i64;
            let y = y0 as i64 - r as i64 + dy as i64;
            (x >= 0 && y >= 0 && x < width as i64 && y < height as i64).then_some((x as u32, y as u32))
        })
        .collect()
}
