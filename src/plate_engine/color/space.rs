use palette::white_point::D65;
use palette::{IntoColor, Lab, LinSrgb, Srgb, Yxy};

use crate::plate_engine::color::types::{ColorSpace, LabColor, RgbColor, XyyColor};
use crate::plate_engine::common::grid::WellGrid;

type LabD65 = Lab<D65, f64>;
type YxyD65 = Yxy<D65, f64>;

const CHANNEL_MAX: f64 = 255.0;

fn linear_from_rgb(rgb: RgbColor) -> LinSrgb<f64> {
    let srgb = Srgb::new(
        (rgb.r / CHANNEL_MAX).clamp(0.0, 1.0),
        (rgb.g / CHANNEL_MAX).clamp(0.0, 1.0),
        (rgb.b / CHANNEL_MAX).clamp(0.0, 1.0),
    );
    srgb.into_linear()
}

pub fn rgb_to_lab(rgb: RgbColor) -> LabColor {
    let lab: LabD65 = linear_from_rgb(rgb).into_color();
    LabColor::new(lab.l, lab.a, lab.b)
}

/// Inverse of [`rgb_to_lab`]; out-of-gamut values are clipped to 0..255.
pub fn lab_to_rgb(lab: LabColor) -> RgbColor {
    let lin: LinSrgb<f64> = LabD65::new(lab.l, lab.a, lab.b).into_color();
    let srgb: Srgb<f64> = Srgb::from_linear(lin);
    RgbColor::new(
        srgb.red.clamp(0.0, 1.0) * CHANNEL_MAX,
        srgb.green.clamp(0.0, 1.0) * CHANNEL_MAX,
        srgb.blue.clamp(0.0, 1.0) * CHANNEL_MAX,
    )
}

pub fn rgb_to_xyy(rgb: RgbColor) -> XyyColor {
    let yxy: YxyD65 = linear_from_rgb(rgb).into_color();
    // Black has no chromaticity.
    let finite = |v: f64| if v.is_finite() { v } else { 0.0 };
    XyyColor {
        x: finite(yxy.x),
        y: finite(yxy.y),
        luma: finite(yxy.luma),
    }
}

/// Channels of `rgb` expressed in `space`.
pub fn space_channels(rgb: RgbColor, space: ColorSpace) -> [f64; 3] {
    match space {
        ColorSpace::Rgb => rgb.channels(),
        ColorSpace::Xyy => rgb_to_xyy(rgb).channels(),
        ColorSpace::Lab => rgb_to_lab(rgb).channels(),
    }
}

pub fn lab_grid(rgb: &WellGrid<RgbColor>) -> WellGrid<LabColor> {
    rgb.map(|c| rgb_to_lab(*c))
}

pub fn xyy_grid(rgb: &WellGrid<RgbColor>) -> WellGrid<XyyColor> {
    rgb.map(|c| rgb_to_xyy(*c))
}

pub fn rgb_grid_from_lab(lab: &WellGrid<LabColor>) -> WellGrid<RgbColor> {
    lab.map(|c| lab_to_rgb(*c))
}
