//! Reference-based Lab correction.
//!
//! Every mode reduces to one reference Lab value and the same per-well affine
//! map: `L' = L * scale_l`, `a' = a + offset_a`, `b' = b + offset_b`, clamped
//! to the Lab ranges.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::plate_engine::color::types::LabColor;
use crate::plate_engine::common::grid::{WellGrid, WellIndex};

/// Where the correction reference comes from.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceMode {
    /// Plate-wide mean Lab of the current sample
    #[default]
    WholePlate,
    /// Lab of one designated well
    SingleWell(WellIndex),
    /// User-entered Lab triple
    Manual(LabColor),
}

impl ReferenceMode {
    /// Resolves the reference Lab value against a sample.
    pub fn reference_for(&self, lab: &WellGrid<LabColor>) -> LabColor {
        match self {
            Self::WholePlate => plate_mean_lab(lab),
            Self::SingleWell(well) => *lab.get(*well),
            Self::Manual(value) => *value,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CorrectionFactor {
    pub scale_l: f64,
    pub offset_a: f64,
    pub offset_b: f64,
}

impl CorrectionFactor {
    pub const IDENTITY: CorrectionFactor = CorrectionFactor {
        scale_l: 1.0,
        offset_a: 0.0,
        offset_b: 0.0,
    };

    /// Factor mapping `sample` onto `reference`. A black sample has no
    /// lightness to scale, so the reference L is used as the scale itself.
    pub fn between(sample: LabColor, reference: LabColor) -> Self {
        let scale_l = if sample.l == 0.0 {
            reference.l
        } else {
            reference.l / sample.l
        };
        Self {
            scale_l,
            offset_a: reference.a - sample.a,
            offset_b: reference.b - sample.b,
        }
    }

    pub fn apply(&self, lab: LabColor) -> LabColor {
        LabColor::new(
            lab.l * self.scale_l,
            lab.a + self.offset_a,
            lab.b + self.offset_b,
        )
        .clamped()
    }
}

/// Per-well factors computed once from a calibration sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorCorrectionFactors {
    mode: ReferenceMode,
    reference: LabColor,
    factors: WellGrid<CorrectionFactor>,
}

impl ColorCorrectionFactors {
    /// Calibrates each well of `lab` against the reference resolved by `mode`.
    pub fn compute(lab: &WellGrid<LabColor>, mode: ReferenceMode) -> Self {
        let reference = mode.reference_for(lab);
        debug!(?mode, ?reference, "Computing correction factors");
        Self {
            mode,
            reference,
            factors: lab.map(|sample| CorrectionFactor::between(*sample, reference)),
        }
    }

    /// Factors that leave every well unchanged.
    pub fn identity() -> Self {
        Self {
            mode: ReferenceMode::WholePlate,
            reference: LabColor::default(),
            factors: WellGrid::filled(CorrectionFactor::IDENTITY),
        }
    }

    pub fn mode(&self) -> ReferenceMode {
        self.mode
    }

    pub fn reference(&self) -> LabColor {
        self.reference
    }

    pub fn factor(&self, well: WellIndex) -> &CorrectionFactor {
        self.factors.get(well)
    }

    pub fn factors(&self) -> &WellGrid<CorrectionFactor> {
        &self.factors
    }

    pub fn apply(&self, lab: &WellGrid<LabColor>) -> WellGrid<LabColor> {
        apply_correction(lab, self)
    }
}

pub fn apply_correction(
    lab: &WellGrid<LabColor>,
    factors: &ColorCorrectionFactors,
) -> WellGrid<LabColor> {
    lab.zip_map(&factors.factors, |value, factor| factor.apply(*value))
}

pub fn plate_mean_lab(lab: &WellGrid<LabColor>) -> LabColor {
    let n = lab.as_slice().len().max(1) as f64;
    let (l, a, b) = lab
        .iter()
        .fold((0.0, 0.0, 0.0), |(l, a, b), c| (l + c.l, a + c.a, b + c.b));
    LabColor::new(l / n, a / n, b / n)
}
