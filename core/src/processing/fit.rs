//! Least-squares fit of the azimuthal radial-velocity model.
//!
//! Legacy fits `v = a sin(az) + b cos(az) + c` once. Enhanced fits
//! `v = a sin(az) cos(el) + b cos(az) cos(el) + c sin(el)`, rejects samples
//! whose residual reaches the outlier threshold and fits a second time.
//! Both variants refuse to fit layers with poor azimuth coverage when the
//! strategy asks for the gap check.

use crate::config::ProfileConfig;
use crate::math::lsq::LeastSquares;
use crate::processing::collector::Sample;
use crate::processing::variant::{RefitPolicy, RetrievalStrategy};
use crate::telemetry::LogManager;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitResult {
    pub coefficients: [f64; 3],
    pub chi_square: f64,
    /// Samples used by the final fit.
    pub accepted: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FitOutcome {
    Fitted(FitResult),
    /// Three or fewer samples left.
    Insufficient { samples: usize },
    /// Azimuth coverage gap; the layer's samples are discarded.
    AzimuthGap { samples: usize },
    /// Rank deficient design matrix.
    Singular { samples: usize },
}

impl FitOutcome {
    pub fn result(&self) -> Option<&FitResult> {
        match self {
            FitOutcome::Fitted(result) => Some(result),
            _ => None,
        }
    }

    /// Post-fit accepted sample count; zero when no fit was obtained.
    pub fn accepted(&self) -> usize {
        self.result().map_or(0, |result| result.accepted)
    }
}

/// Detects azimuth coverage gaps.
///
/// The circle is split into `ngapbin` equal sectors; a gap is two circularly
/// adjacent sectors both holding fewer than `ngapmin` azimuths (radians).
pub fn azimuth_gap<I>(azimuths: I, ngapbin: usize, ngapmin: usize) -> bool
where
    I: IntoIterator<Item = f64>,
{
    if ngapbin == 0 {
        return false;
    }
    let mut sectors = vec![0usize; ngapbin];
    for azimuth in azimuths {
        let degrees = azimuth.to_degrees().rem_euclid(360.0);
        let sector = (degrees * ngapbin as f64 / 360.0) as usize % ngapbin;
        sectors[sector] += 1;
    }
    (0..ngapbin).any(|m| sectors[m] < ngapmin && sectors[(m + 1) % ngapbin] < ngapmin)
}

fn predict(row: &[f64; 3], coefficients: &[f64; 3]) -> f64 {
    row.iter().zip(coefficients).map(|(x, c)| x * c).sum()
}

pub struct FitSolver<'a> {
    config: &'a ProfileConfig,
    strategy: &'a dyn RetrievalStrategy,
    logger: LogManager,
}

impl<'a> FitSolver<'a> {
    pub fn new(config: &'a ProfileConfig, strategy: &'a dyn RetrievalStrategy) -> Self {
        Self {
            config,
            strategy,
            logger: LogManager::new("fit"),
        }
    }

    pub fn fit(&self, samples: &[Sample]) -> FitOutcome {
        let count = samples.len();
        if self.strategy.checks_azimuth_gaps() && self.has_gap(samples) {
            return FitOutcome::AzimuthGap { samples: count };
        }
        if count <= 3 {
            return FitOutcome::Insufficient { samples: count };
        }
        let Some(first) = self.solve(samples) else {
            return FitOutcome::Singular { samples: count };
        };

        match self.strategy.refit_policy() {
            RefitPolicy::Single => FitOutcome::Fitted(first),
            RefitPolicy::RejectOutliersOnce => self.refit_without_outliers(samples, &first),
        }
    }

    fn has_gap(&self, samples: &[Sample]) -> bool {
        azimuth_gap(
            samples.iter().map(|s| s.azimuth),
            self.config.ngapbin,
            self.config.ngapmin,
        )
    }

    fn residual(&self, sample: &Sample, coefficients: &[f64; 3]) -> f64 {
        let row = self.strategy.design_row(sample.azimuth, sample.elevation);
        sample.value - predict(&row, coefficients)
    }

    fn solve(&self, samples: &[Sample]) -> Option<FitResult> {
        let rows: Vec<[f64; 3]> = samples
            .iter()
            .map(|s| self.strategy.design_row(s.azimuth, s.elevation))
            .collect();
        let observed: Vec<f64> = samples.iter().map(|s| s.value).collect();
        let coefficients = LeastSquares::solve_rows(&rows, &observed)?;

        let residual_sum: f64 = rows
            .iter()
            .zip(&observed)
            .map(|(row, &v)| {
                let r = v - predict(row, &coefficients);
                r * r
            })
            .sum();

        Some(FitResult {
            coefficients,
            chi_square: residual_sum / self.strategy.chi_square_divisor(samples.len()),
            accepted: samples.len(),
        })
    }

    fn refit_without_outliers(&self, samples: &[Sample], first: &FitResult) -> FitOutcome {
        let threshold = if self.config.maxnstd > 0.0 {
            self.config.maxnstd * first.chi_square.sqrt()
        } else {
            self.config.maxvdiff
        };

        let kept: Vec<Sample> = samples
            .iter()
            .filter(|s| self.residual(s, &first.coefficients).abs() < threshold)
            .copied()
            .collect();
        self.logger.detail(&format!(
            "outlier threshold {:.3} m/s removed {} of {} samples",
            threshold,
            samples.len() - kept.len(),
            samples.len()
        ));

        if kept.len() <= 3 {
            return FitOutcome::Insufficient {
                samples: kept.len(),
            };
        }
        if self.has_gap(&kept) {
            return FitOutcome::AzimuthGap {
                samples: kept.len(),
            };
        }
        match self.solve(&kept) {
            Some(result) => FitOutcome::Fitted(result),
            None => FitOutcome::Singular {
                samples: kept.len(),
            },
        }
    }
}
