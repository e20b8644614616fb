use crate::processing::survey::VolumeMetadata;
use crate::profile::{ProfileLevel, WindStatus};
use serde::Serialize;

/// Counters of one profile generation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunMetrics {
    pub sweeps_accepted: usize,
    pub sweeps_rejected: usize,
    pub layers: usize,
    pub wind_layers: usize,
    pub reflectivity_layers: usize,
    pub gap_layers: usize,
    pub velocity_dropped: usize,
    pub reflectivity_dropped: usize,
}

impl RunMetrics {
    pub fn from_survey(metadata: &VolumeMetadata) -> Self {
        Self {
            sweeps_accepted: metadata.accepted_sweeps,
            sweeps_rejected: metadata.rejected_sweeps,
            ..Self::default()
        }
    }

    pub fn record_level(&mut self, level: &ProfileLevel) {
        self.layers += 1;
        if level.wind.is_some() {
            self.wind_layers += 1;
        }
        if level.reflectivity.is_some() {
            self.reflectivity_layers += 1;
        }
        if level.wind_status == WindStatus::AzimuthGap {
            self.gap_layers += 1;
        }
        self.velocity_dropped += level.velocity_dropped;
        self.reflectivity_dropped += level.reflectivity_dropped;
    }

    pub fn dropped_samples(&self) -> usize {
        self.velocity_dropped + self.reflectivity_dropped
    }

    pub fn summary(&self) -> String {
        format!(
            "{} layers: {} with wind, {} with reflectivity, {} azimuth gaps, {} samples dropped",
            self.layers,
            self.wind_layers,
            self.reflectivity_layers,
            self.gap_layers,
            self.dropped_samples()
        )
    }
}
