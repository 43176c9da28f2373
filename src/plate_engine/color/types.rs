//! Color value types

use serde::{Deserialize, Serialize};

/// Mean sensor color, channels on the 0..255 scale.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f64; 3]", into = "[f64; 3]")]
pub struct RgbColor {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl RgbColor {
    pub fn new(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    pub fn channels(&self) -> [f64; 3] {
        [self.r, self.g, self.b]
    }

    /// Euclidean distance in RGB, channels treated independently.
    pub fn distance(&self, other: &RgbColor) -> f64 {
        euclidean(self.channels(), other.channels())
    }
}

impl From<[f64; 3]> for RgbColor {
    fn from([r, g, b]: [f64; 3]) -> Self {
        Self { r, g, b }
    }
}

impl From<RgbColor> for [f64; 3] {
    fn from(color: RgbColor) -> Self {
        color.channels()
    }
}

/// CIE L*a*b* value (D65).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LabColor {
    pub l: f64,
    pub a: f64,
    pub b: f64,
}

impl LabColor {
    pub const L_RANGE: (f64, f64) = (0.0, 100.0);
    pub const AB_RANGE: (f64, f64) = (-128.0, 128.0);

    pub fn new(l: f64, a: f64, b: f64) -> Self {
        Self { l, a, b }
    }

    pub fn channels(&self) -> [f64; 3] {
        [self.l, self.a, self.b]
    }

    /// Clamps into L in [0, 100] and a, b in [-128, 128].
    pub fn clamped(&self) -> Self {
        Self {
            l: self.l.clamp(Self::L_RANGE.0, Self::L_RANGE.1),
            a: self.a.clamp(Self::AB_RANGE.0, Self::AB_RANGE.1),
            b: self.b.clamp(Self::AB_RANGE.0, Self::AB_RANGE.1),
        }
    }
}

/// CIE xyY value (D65), `luma` is Y on the 0..1 scale.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct XyyColor {
    pub x: f64,
    pub y: f64,
    pub luma: f64,
}

impl XyyColor {
    pub fn channels(&self) -> [f64; 3] {
        [self.x, self.y, self.luma]
    }
}

/// Space a color difference is measured in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColorSpace {
    Rgb,
    Xyy,
    Lab,
}

impl ColorSpace {
    pub const ALL: [ColorSpace; 3] = [ColorSpace::Rgb, ColorSpace::Xyy, ColorSpace::Lab];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rgb => "RGB",
            Self::Xyy => "XYY",
            Self::Lab => "Lab",
        }
    }
}

impl std::str::FromStr for ColorSpace {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "rgb" => Ok(Self::Rgb),
            "xyy" => Ok(Self::Xyy),
            "lab" => Ok(Self::Lab),
            _ => Err(format!("Unknown color space: {}", s)),
        }
    }
}

pub fn euclidean(a: [f64; 3], b: [f64; 3]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y).powi(2))
        .sum::<f64>()
        .sqrt()
}
