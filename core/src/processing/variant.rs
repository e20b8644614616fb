//! Per-variant retrieval strategies.
//!
//! The variant is resolved to a strategy once per generation; every later
//! decision that differs between variants goes through the trait.

use crate::config::{ProfileConfig, Variant};

/// What happens after the first least-squares fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefitPolicy {
    /// Keep the first fit.
    Single,
    /// Drop outliers, recheck azimuth coverage and fit once more.
    RejectOutliersOnce,
}

/// State of the quantity a count field belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountState {
    /// The quantity passed its gates.
    Valid,
    /// Samples or a fit exist but a gate rejected them.
    Gated,
    /// Nothing to gate: no fit, or no samples.
    Empty,
}

/// Outcome of the quality gates for one layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayerGates {
    pub wind: bool,
    pub reflectivity: bool,
}

pub trait RetrievalStrategy: Sync {
    fn variant(&self) -> Variant;

    /// One row of the design matrix for a sample at `azimuth`/`elevation` (radians).
    fn design_row(&self, azimuth: f64, elevation: f64) -> [f64; 3];

    /// Whether velocity sweeps below `nimin` are skipped.
    fn screens_nyquist(&self) -> bool;

    /// Elevation/height conditioning of velocity samples.
    fn admits_velocity(&self, config: &ProfileConfig, elevation_deg: f64, height: f64) -> bool;

    fn checks_azimuth_gaps(&self) -> bool;

    fn refit_policy(&self) -> RefitPolicy;

    /// Divisor of the residual sum of squares for `samples` accepted points.
    fn chi_square_divisor(&self, samples: usize) -> f64;

    /// `speed` is `None` when no fit was obtained.
    fn gates(&self, config: &ProfileConfig, nv: usize, nz: usize, speed: Option<f64>) -> LayerGates;

    /// Value written to a count field.
    fn count_value(&self, count: usize, state: CountState) -> f64;
}

/// Single-elevation VAD: `v = a sin(az) + b cos(az) + c`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LegacyStrategy;

/// Multi-elevation VVP: `v = a sin(az) cos(el) + b cos(az) cos(el) + c sin(el)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnhancedStrategy;

static LEGACY: LegacyStrategy = LegacyStrategy;
static ENHANCED: EnhancedStrategy = EnhancedStrategy;

impl Variant {
    pub fn strategy(&self) -> &'static dyn RetrievalStrategy {
        match self {
            Variant::Legacy => &LEGACY,
            Variant::Enhanced => &ENHANCED,
        }
    }
}

impl RetrievalStrategy for LegacyStrategy {
    fn variant(&self) -> Variant {
        Variant::Legacy
    }

    fn design_row(&self, azimuth: f64, _elevation: f64) -> [f64; 3] {
        [azimuth.sin(), azimuth.cos(), 1.0]
    }

    fn screens_nyquist(&self) -> bool {
        false
    }

    fn admits_velocity(&self, _config: &ProfileConfig, _elevation_deg: f64, _height: f64) -> bool {
        true
    }

    fn checks_azimuth_gaps(&self) -> bool {
        false
    }

    fn refit_policy(&self) -> RefitPolicy {
        RefitPolicy::Single
    }

    fn chi_square_divisor(&self, samples: usize) -> f64 {
        samples as f64
    }

    // One combined floor gates wind and reflectivity together.
    fn gates(&self, config: &ProfileConfig, nv: usize, nz: usize, speed: Option<f64>) -> LayerGates {
        let combined = nv >= config.nmin && nz >= config.nmin;
        let wind = combined
            && nv >= config.nmin_wnd
            && speed.is_some_and(|ff| ff <= config.ff_max);
        LayerGates {
            wind,
            reflectivity: combined,
        }
    }

    fn count_value(&self, count: usize, state: CountState) -> f64 {
        match state {
            CountState::Valid => count as f64,
            CountState::Gated => -1.0,
            CountState::Empty => 0.0,
        }
    }
}

impl RetrievalStrategy for EnhancedStrategy {
    fn variant(&self) -> Variant {
        Variant::Enhanced
    }

    fn design_row(&self, azimuth: f64, elevation: f64) -> [f64; 3] {
        let (sin_el, cos_el) = elevation.sin_cos();
        [azimuth.sin() * cos_el, azimuth.cos() * cos_el, sin_el]
    }

    fn screens_nyquist(&self) -> bool {
        true
    }

    fn admits_velocity(&self, config: &ProfileConfig, elevation_deg: f64, height: f64) -> bool {
        elevation_deg <= config.econdmax || height >= config.hthr
    }

    fn checks_azimuth_gaps(&self) -> bool {
        true
    }

    fn refit_policy(&self) -> RefitPolicy {
        RefitPolicy::RejectOutliersOnce
    }

    fn chi_square_divisor(&self, samples: usize) -> f64 {
        samples as f64 - 3.0
    }

    fn gates(&self, config: &ProfileConfig, nv: usize, nz: usize, speed: Option<f64>) -> LayerGates {
        let wind = nv > 3
            && nv >= config.nmin_wnd
            && speed.is_some_and(|ff| ff <= config.ff_max);
        LayerGates {
            wind,
            reflectivity: nz >= config.nmin_ref,
        }
    }

    fn count_value(&self, count: usize, state: CountState) -> f64 {
        match state {
            CountState::Valid => count as f64,
            CountState::Gated | CountState::Empty => -1.0,
        }
    }
}
