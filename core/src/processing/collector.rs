use crate::config::ProfileConfig;
use crate::math::stats::dbz_to_z;
use crate::processing::buffer::SampleBuffer;
use crate::processing::survey::{SweepPlan, VolumeSurvey};
use crate::processing::variant::RetrievalStrategy;
use crate::telemetry::LogManager;
use crate::volume::ScanParameter;
use std::f64::consts::PI;

/// Height slice `[bottom, top)` of the profile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeightLayer {
    pub index: usize,
    pub bottom: f64,
    pub top: f64,
}

impl HeightLayer {
    pub fn new(index: usize, dz: u32) -> Self {
        let dz = f64::from(dz);
        Self {
            index,
            bottom: index as f64 * dz,
            top: (index + 1) as f64 * dz,
        }
    }

    pub fn center(&self) -> f64 {
        0.5 * (self.bottom + self.top)
    }

    pub fn contains(&self, height: f64) -> bool {
        height >= self.bottom && height < self.top
    }
}

/// One admitted observation. `value` is m/s for velocity and linear Z for reflectivity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub azimuth: f64,
    pub elevation: f64,
    pub height: f64,
    pub distance: f64,
    pub value: f64,
}

/// Samples of one layer, released before the next layer is collected.
#[derive(Debug, Clone)]
pub struct LayerSamples {
    pub velocity: SampleBuffer<Sample>,
    pub reflectivity: SampleBuffer<Sample>,
}

/// Gathers the velocity and reflectivity samples falling into a height layer.
pub struct SampleCollector<'a> {
    config: &'a ProfileConfig,
    strategy: &'a dyn RetrievalStrategy,
    logger: LogManager,
}

impl<'a> SampleCollector<'a> {
    pub fn new(config: &'a ProfileConfig, strategy: &'a dyn RetrievalStrategy) -> Self {
        Self {
            config,
            strategy,
            logger: LogManager::new("collector"),
        }
    }

    pub fn collect(&self, layer: &HeightLayer, survey: &VolumeSurvey<'_>) -> LayerSamples {
        let mut samples = LayerSamples {
            velocity: SampleBuffer::with_capacity(self.config.max_samples),
            reflectivity: SampleBuffer::with_capacity(self.config.max_samples),
        };

        for sweep in &survey.sweeps {
            let bins = self.bins_in_layer(layer, sweep);
            if bins.is_empty() {
                continue;
            }
            if let Some(velocity) = sweep.velocity {
                self.collect_velocity(sweep, velocity, &bins, &mut samples.velocity);
            }
            if let Some(reflectivity) = sweep.reflectivity {
                self.collect_reflectivity(sweep, reflectivity, &bins, &mut samples.reflectivity);
            }
        }

        if samples.velocity.dropped() > 0 || samples.reflectivity.dropped() > 0 {
            self.logger.caution(&format!(
                "layer {} buffer full: {} velocity and {} reflectivity samples dropped",
                layer.index,
                samples.velocity.dropped(),
                samples.reflectivity.dropped()
            ));
        }
        samples
    }

    /// Bins of `sweep` inside the layer and the range window.
    fn bins_in_layer(&self, layer: &HeightLayer, sweep: &SweepPlan<'_>) -> Vec<usize> {
        sweep
            .bins
            .iter()
            .enumerate()
            .filter(|(_, geo)| {
                layer.contains(geo.height)
                    && geo.distance >= self.config.dmin
                    && geo.distance <= self.config.dmax
            })
            .map(|(bin, _)| bin)
            .collect()
    }

    fn collect_velocity(
        &self,
        sweep: &SweepPlan<'_>,
        param: &ScanParameter,
        bins: &[usize],
        out: &mut SampleBuffer<Sample>,
    ) {
        let nrays = param.nrays();
        for ray in 0..nrays {
            let azimuth = ray_azimuth(ray, nrays);
            for &bin in bins {
                let geo = sweep.bins[bin];
                if !self
                    .strategy
                    .admits_velocity(self.config, sweep.elevation_deg, geo.height)
                {
                    continue;
                }
                let Some(velocity) = param.value(ray, bin) else {
                    continue;
                };
                if velocity.abs() < self.config.vmin {
                    continue;
                }
                out.push(Sample {
                    azimuth,
                    elevation: sweep.scan.elangle,
                    height: geo.height,
                    distance: geo.distance,
                    value: velocity,
                });
            }
        }
    }

    fn collect_reflectivity(
        &self,
        sweep: &SweepPlan<'_>,
        param: &ScanParameter,
        bins: &[usize],
        out: &mut SampleBuffer<Sample>,
    ) {
        let nrays = param.nrays();
        for ray in 0..nrays {
            let azimuth = ray_azimuth(ray, nrays);
            for &bin in bins {
                let geo = sweep.bins[bin];
                let Some(dbz) = param.value(ray, bin) else {
                    continue;
                };
                out.push(Sample {
                    azimuth,
                    elevation: sweep.scan.elangle,
                    height: geo.height,
                    distance: geo.distance,
                    value: dbz_to_z(dbz),
                });
            }
        }
    }
}

/// Azimuth of the start of ray `ray` in radians.
pub fn ray_azimuth(ray: usize, nrays: usize) -> f64 {
    2.0 * PI * ray as f64 / nrays as f64
}
