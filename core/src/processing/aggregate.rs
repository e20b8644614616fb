//! Turns fit results and reflectivity samples into profile levels and
//! output field values.

use crate::config::{ProfileConfig, ProfileField};
use crate::math::stats::ReflectivityStats;
use crate::processing::collector::{HeightLayer, LayerSamples, Sample};
use crate::processing::fit::{FitOutcome, FitResult};
use crate::processing::variant::{CountState, RetrievalStrategy};
use crate::profile::{ProfileLevel, ReflectivityEstimate, WindEstimate, WindStatus};
use std::f64::consts::PI;

/// Meteorological direction (degrees, wind blowing from) of the horizontal
/// wind whose eastward and northward fit coefficients are `a` and `b`.
pub fn wind_direction(a: f64, b: f64) -> f64 {
    let alpha = a.hypot(b);
    let beta = b.atan2(a);
    // TODO: confirm the intended sign test with the algorithm owners; alpha is
    // a magnitude so the first arm never runs.
    let radians = if alpha < 0.0 {
        0.5 * PI - beta
    } else if alpha > 0.0 {
        1.5 * PI - beta
    } else {
        return 0.0;
    };
    radians.to_degrees().rem_euclid(360.0)
}

impl WindEstimate {
    pub fn from_fit(fit: &FitResult) -> Self {
        let [a, b, _] = fit.coefficients;
        let speed = a.hypot(b);
        let direction = wind_direction(a, b);
        let toward = direction.to_radians() - PI;
        Self {
            speed,
            direction,
            std_dev: fit.chi_square.sqrt(),
            u: speed * toward.sin(),
            v: speed * toward.cos(),
        }
    }
}

impl ReflectivityEstimate {
    /// Statistics of linear reflectivity samples; `None` without samples.
    pub fn from_samples(samples: &[Sample]) -> Option<Self> {
        let linear: Vec<f64> = samples.iter().map(|s| s.value).collect();
        let stats = ReflectivityStats::from_linear(&linear)?;
        Some(Self {
            mean_dbz: stats.mean_dbz(),
            std_dbz: (stats.std_z > 0.0).then(|| stats.std_dbz()),
        })
    }
}

fn wind_count_state(level: &ProfileLevel) -> CountState {
    match (level.wind, level.wind_status) {
        (Some(_), _) => CountState::Valid,
        (None, WindStatus::Gated) => CountState::Gated,
        (None, _) => CountState::Empty,
    }
}

fn reflectivity_count_state(level: &ProfileLevel) -> CountState {
    if level.reflectivity.is_some() {
        CountState::Valid
    } else if level.nz > 0 {
        CountState::Gated
    } else {
        CountState::Empty
    }
}

pub struct LayerAggregator<'a> {
    config: &'a ProfileConfig,
    strategy: &'a dyn RetrievalStrategy,
}

impl<'a> LayerAggregator<'a> {
    pub fn new(config: &'a ProfileConfig, strategy: &'a dyn RetrievalStrategy) -> Self {
        Self { config, strategy }
    }

    pub fn aggregate(&self, layer: &HeightLayer, samples: &LayerSamples, fit: &FitOutcome) -> ProfileLevel {
        let nv = fit.accepted();
        let nz = samples.reflectivity.len();
        let estimate = fit.result().map(WindEstimate::from_fit);
        let gates = self
            .strategy
            .gates(self.config, nv, nz, estimate.map(|w| w.speed));

        let wind_status = match fit {
            FitOutcome::Fitted(_) if gates.wind => WindStatus::Valid,
            FitOutcome::Fitted(_) => WindStatus::Gated,
            FitOutcome::Insufficient { .. } => WindStatus::TooFewSamples,
            FitOutcome::AzimuthGap { .. } => WindStatus::AzimuthGap,
            FitOutcome::Singular { .. } => WindStatus::SingularFit,
        };
        let reflectivity = if gates.reflectivity {
            ReflectivityEstimate::from_samples(samples.reflectivity.as_slice())
        } else {
            None
        };

        ProfileLevel {
            index: layer.index,
            height: layer.center(),
            wind: estimate.filter(|_| gates.wind),
            wind_status,
            nv,
            reflectivity,
            nz,
            velocity_dropped: samples.velocity.dropped(),
            reflectivity_dropped: samples.reflectivity.dropped(),
        }
    }

    /// Value of `field` at `level` as written to the output.
    pub fn field_value(&self, field: ProfileField, level: &ProfileLevel) -> f64 {
        let config = self.config;
        let wind = |select: fn(&WindEstimate) -> f64| {
            level
                .wind
                .as_ref()
                .map_or(config.nodata_vp, |w| config.pack(select(w)))
        };

        match field {
            ProfileField::Hght => level.height / 1000.0,
            ProfileField::Nv => self.strategy.count_value(level.nv, wind_count_state(level)),
            ProfileField::Nz => self
                .strategy
                .count_value(level.nz, reflectivity_count_state(level)),
            ProfileField::Uwnd => wind(|w| w.u),
            ProfileField::Vwnd => wind(|w| w.v),
            ProfileField::Ff => wind(|w| w.speed),
            ProfileField::FfDev => wind(|w| w.std_dev),
            ProfileField::Dd => wind(|w| w.direction),
            ProfileField::Dbzh => level
                .reflectivity
                .map_or(config.nodata_vp, |r| config.pack(r.mean_dbz)),
            ProfileField::DbzhDev => level.reflectivity.map_or(config.nodata_vp, |r| {
                r.std_dbz.map_or(config.undetect_vp, |std| config.pack(std))
            }),
        }
    }
}
