//! Volume-level pass run once before the layer loop.
//!
//! Decides which sweeps take part, which of their parameters are usable,
//! precomputes bin geometry and gathers the profile metadata (time span,
//! elevation angles, task names).

use crate::config::ProfileConfig;
use crate::math::geometry::Geometry;
use crate::prelude::{ProfileError, ProfileResult};
use crate::processing::variant::RetrievalStrategy;
use crate::telemetry::LogManager;
use crate::volume::{PolarScan, PolarVolume, ScanParameter};
use chrono::NaiveDateTime;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BinGeometry {
    pub distance: f64,
    pub height: f64,
}

/// An accepted sweep with the parameters the collector may read.
#[derive(Debug, Clone)]
pub struct SweepPlan<'a> {
    pub index: usize,
    pub scan: &'a PolarScan,
    pub elevation_deg: f64,
    /// `None` when absent or screened out by the Nyquist check.
    pub velocity: Option<&'a ScanParameter>,
    pub reflectivity: Option<&'a ScanParameter>,
    /// Geometry of each range bin, indexed by bin.
    pub bins: Vec<BinGeometry>,
}

/// Distinct task names in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskSet {
    order: Vec<String>,
    seen: BTreeSet<String>,
}

impl TaskSet {
    /// Adds `task` unless already present; returns whether it was new.
    pub fn insert(&mut self, task: &str) -> bool {
        if self.seen.contains(task) {
            return false;
        }
        self.seen.insert(task.to_string());
        self.order.push(task.to_string());
        true
    }

    pub fn contains(&self, task: &str) -> bool {
        self.seen.contains(task)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn into_vec(self) -> Vec<String> {
        self.order
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VolumeMetadata {
    /// Earliest start among accepted sweeps.
    pub start: NaiveDateTime,
    /// Latest end among accepted sweeps.
    pub end: NaiveDateTime,
    /// Accepted elevations in degrees, ascending, unique at 0.1°.
    pub elevation_angles: Vec<f64>,
    pub tasks: TaskSet,
    pub accepted_sweeps: usize,
    pub rejected_sweeps: usize,
}

#[derive(Debug, Clone)]
pub struct VolumeSurvey<'a> {
    pub sweeps: Vec<SweepPlan<'a>>,
    pub metadata: VolumeMetadata,
}

/// Nyquist interval of a velocity sweep: sweep attribute, then volume
/// attribute, then the magnitude of the parameter offset.
pub fn nyquist_interval(volume: &PolarVolume, scan: &PolarScan, velocity: &ScanParameter) -> f64 {
    scan.attributes
        .nyquist
        .or(volume.nyquist)
        .unwrap_or_else(|| velocity.offset.abs())
}

impl<'a> VolumeSurvey<'a> {
    pub fn build<G: Geometry + ?Sized>(
        volume: &'a PolarVolume,
        config: &ProfileConfig,
        strategy: &dyn RetrievalStrategy,
        geometry: &G,
    ) -> ProfileResult<Self> {
        let logger = LogManager::new("survey");
        let mut sweeps = Vec::new();
        let mut span: Option<(NaiveDateTime, NaiveDateTime)> = None;
        let mut angles = Vec::new();
        let mut tasks = TaskSet::default();
        let mut rejected = 0;

        for (index, scan) in volume.scans().iter().enumerate() {
            let elevation_deg = scan.elevation_deg();
            if elevation_deg < config.emin || elevation_deg > config.emax {
                logger.detail(&format!(
                    "sweep {} at {:.2} deg outside elevation window",
                    index, elevation_deg
                ));
                rejected += 1;
                continue;
            }
            if scan.is_malfunctioning() {
                logger.caution(&format!(
                    "sweep {} at {:.2} deg flagged malfunctioning",
                    index, elevation_deg
                ));
                rejected += 1;
                continue;
            }

            span = Some(match span {
                None => (scan.start, scan.end),
                Some((start, end)) => (start.min(scan.start), end.max(scan.end)),
            });
            angles.push((elevation_deg * 10.0).round() / 10.0);
            if let Some(task) = scan.attributes.task.as_deref() {
                tasks.insert(task);
            }

            let velocity = scan.velocity().filter(|param| {
                if !strategy.screens_nyquist() {
                    return true;
                }
                let nyquist = nyquist_interval(volume, scan, param);
                let usable = nyquist >= config.nimin;
                if !usable {
                    logger.detail(&format!(
                        "sweep {} velocity skipped, Nyquist interval {:.1} below {:.1}",
                        index, nyquist, config.nimin
                    ));
                }
                usable
            });
            let reflectivity = scan.reflectivity();
            if velocity.is_none() && reflectivity.is_none() {
                continue;
            }

            let bins = (0..scan.nbins())
                .map(|bin| {
                    let range = (bin as f64 + 0.5) * scan.rscale;
                    let (distance, height) =
                        geometry.distance_height(&volume.site, range, scan.elangle);
                    BinGeometry { distance, height }
                })
                .collect();

            sweeps.push(SweepPlan {
                index,
                scan,
                elevation_deg,
                velocity,
                reflectivity,
                bins,
            });
        }

        let (start, end) = span.ok_or(ProfileError::NoUsableData)?;
        let accepted_sweeps = angles.len();
        angles.sort_by(f64::total_cmp);
        angles.dedup();

        logger.record(&format!(
            "{} sweeps accepted, {} rejected, {} with usable parameters",
            accepted_sweeps,
            rejected,
            sweeps.len()
        ));

        Ok(Self {
            sweeps,
            metadata: VolumeMetadata {
                start,
                end,
                elevation_angles: angles,
                tasks,
                accepted_sweeps,
                rejected_sweeps: rejected,
            },
        })
    }
}
