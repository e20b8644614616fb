use crate::config::ProfileConfig;
use crate::math::geometry::{EffectiveEarth, Geometry};
use crate::prelude::{ProfileError, ProfileResult};
use crate::processing::aggregate::LayerAggregator;
use crate::processing::collector::{HeightLayer, SampleCollector};
use crate::processing::fit::FitSolver;
use crate::processing::survey::{VolumeMetadata, VolumeSurvey};
use crate::profile::{OutputField, ProfileAttributes, VerticalProfile};
use crate::telemetry::{LogManager, RunMetrics};
use crate::volume::PolarVolume;

/// Builds a vertical profile from a polar volume.
///
/// Each call surveys the volume once, then walks the height layers from the
/// ground up. Only one layer's samples are held at a time.
pub struct ProfileGenerator<G: Geometry = EffectiveEarth> {
    config: ProfileConfig,
    geometry: G,
    logger: LogManager,
}

impl ProfileGenerator {
    pub fn new(config: ProfileConfig) -> Self {
        Self::with_geometry(config, EffectiveEarth::default())
    }
}

impl<G: Geometry> ProfileGenerator<G> {
    pub fn with_geometry(config: ProfileConfig, geometry: G) -> Self {
        Self {
            config,
            geometry,
            logger: LogManager::new("profile"),
        }
    }

    pub fn config(&self) -> &ProfileConfig {
        &self.config
    }

    pub fn generate(&self, volume: &PolarVolume) -> ProfileResult<VerticalProfile> {
        let config = &self.config;
        config.validate()?;
        let strategy = config.variant.strategy();
        let level_count = config.level_count();

        let mut fields = config
            .fields
            .iter()
            .map(|field| OutputField::allocate(field, config, level_count))
            .collect::<ProfileResult<Vec<_>>>()?;
        let mut levels = Vec::new();
        levels
            .try_reserve_exact(level_count)
            .map_err(|err| ProfileError::Allocation(format!("{} levels: {}", level_count, err)))?;

        let survey = VolumeSurvey::build(volume, config, strategy, &self.geometry)?;
        self.logger.record(&format!(
            "{} profile of {} levels from {} ({} sweeps)",
            strategy.variant(),
            level_count,
            volume.source,
            volume.scan_count()
        ));

        let collector = SampleCollector::new(config, strategy);
        let solver = FitSolver::new(config, strategy);
        let aggregator = LayerAggregator::new(config, strategy);
        let mut metrics = RunMetrics::from_survey(&survey.metadata);

        for index in 0..level_count {
            let layer = HeightLayer::new(index, config.dz);
            let samples = collector.collect(&layer, &survey);
            let fit = solver.fit(samples.velocity.as_slice());
            let level = aggregator.aggregate(&layer, &samples, &fit);
            self.logger.detail(&format!(
                "layer {} at {:.0} m: {:?}, nv {}, nz {}",
                index, level.height, level.wind_status, level.nv, level.nz
            ));

            for field in fields.iter_mut() {
                field.values.push(aggregator.field_value(field.field, &level));
            }
            metrics.record_level(&level);
            levels.push(level);
        }

        self.logger.record(&metrics.summary());
        Ok(VerticalProfile {
            attributes: self.attributes(volume, survey.metadata),
            levels,
            fields,
            metrics,
        })
    }

    fn attributes(&self, volume: &PolarVolume, metadata: VolumeMetadata) -> ProfileAttributes {
        let config = &self.config;
        ProfileAttributes {
            product: "VP".to_string(),
            source: volume.source.clone(),
            latitude: volume.site.latitude,
            longitude: volume.site.longitude,
            site_height: volume.site.height,
            date_time: volume.date_time,
            start: metadata.start,
            end: metadata.end,
            interval: config.dz,
            min_height: 0,
            max_height: config.hmax,
            min_range_km: config.dmin / 1000.0,
            max_range_km: config.dmax / 1000.0,
            angles: metadata.elevation_angles,
            tasks: metadata.tasks.into_vec(),
            variant: config.variant,
        }
    }
}

/// Generates a profile with the default beam geometry.
pub fn generate(volume: &PolarVolume, config: &ProfileConfig) -> ProfileResult<VerticalProfile> {
    ProfileGenerator::new(config.clone()).generate(volume)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FieldSet, ProfileField};
    use crate::volume::{PolarScan, ScanParameter, SiteLocation};
    use chrono::NaiveDate;
    use ndarray::Array2;

    fn volume(elevation_deg: f64) -> PolarVolume {
        let t = NaiveDate::from_ymd_opt(2024, 5, 1)
            .and_then(|d| d.and_hms_opt(12, 0, 0))
            .unwrap();
        let site = SiteLocation {
            latitude: 52.0,
            longitude: 5.0,
            height: 0.0,
        };
        let scan = PolarScan::new(elevation_deg.to_radians(), 500.0, t, t).with_parameter(
            ScanParameter::new("DBZH", Array2::from_elem((36, 80), 20.0)),
        );
        PolarVolume::new(site, "NOD:test", t).with_scan(scan)
    }

    #[test]
    fn invalid_config_fails_before_reading_volume() {
        let config = ProfileConfig {
            gain_vp: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            generate(&volume(5.0), &config),
            Err(ProfileError::Configuration(_))
        ));
    }

    #[test]
    fn fields_follow_selection_and_level_count() {
        let config = ProfileConfig {
            hmax: 2_000,
            ..Default::default()
        }
        .with_fields(FieldSet::parse("HGHT,DBZH").unwrap());
        let profile = generate(&volume(5.0), &config).unwrap();
        assert_eq!(profile.level_count(), 10);
        assert_eq!(profile.fields.len(), 2);
        assert!(profile.field(ProfileField::Ff).is_none());
        let heights = profile.values(ProfileField::Hght).unwrap();
        assert_eq!(heights[0], 0.1);
        assert_eq!(heights.len(), 10);
        assert_eq!(profile.attributes.angles_attribute(), "5.0");
        assert_eq!(profile.attributes.max_range_km, 40.0);
    }
}
