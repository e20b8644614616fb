use anyhow::{ensure, Context};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use ndarray::Array2;
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use vvpcore::math::{EffectiveEarth, Geometry};
use vvpcore::processing::collector::ray_azimuth;
use vvpcore::volume::{PolarScan, PolarVolume, ScanAttributes, ScanParameter, SiteLocation};

const VELOCITY_GAIN: f64 = 0.01;
const VELOCITY_OFFSET: f64 = -327.68;
const VELOCITY_NODATA: f64 = 65_535.0;
const REFLECTIVITY_GAIN: f64 = 0.5;
const REFLECTIVITY_OFFSET: f64 = -32.0;
const REFLECTIVITY_NODATA: f64 = 255.0;
const UNDETECT: f64 = 0.0;

/// Synthetic weather scenario scanned by a virtual radar.
///
/// Wind speed grows linearly with height and veers clockwise; reflectivity
/// decreases linearly up to the echo top.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    pub source: String,
    pub latitude: f64,
    pub longitude: f64,
    pub site_height: f64,
    pub date_time: NaiveDateTime,
    /// Seconds taken by one sweep.
    pub sweep_seconds: i64,
    /// Elevation angles in degrees, scanned in this order.
    pub elevations: Vec<f64>,
    pub nrays: usize,
    pub nbins: usize,
    pub rscale: f64,
    pub nyquist: Option<f64>,
    pub task: Option<String>,
    /// Surface wind speed in m/s.
    pub wind_speed: f64,
    /// Surface wind direction in degrees (blowing from).
    pub wind_direction: f64,
    /// Speed increase in m/s per km.
    pub wind_shear: f64,
    /// Clockwise turning in degrees per km.
    pub wind_veer: f64,
    /// Vertical velocity of the scatterers, positive upwards.
    pub vertical_velocity: f64,
    /// Half-width of the uniform velocity noise in m/s.
    pub velocity_noise: f64,
    pub surface_dbz: f64,
    /// dBZ per km.
    pub dbz_lapse: f64,
    pub dbz_noise: f64,
    /// Height above which bins are undetected.
    pub echo_top: f64,
    pub seed: u64,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            source: "NOD:synthetic".to_string(),
            latitude: 52.1,
            longitude: 5.18,
            site_height: 50.0,
            date_time: NaiveDate::from_ymd_opt(2024, 5, 1)
                .and_then(|d| d.and_hms_opt(12, 0, 0))
                .unwrap_or(NaiveDateTime::MIN),
            sweep_seconds: 20,
            elevations: vec![0.5, 1.5, 3.0, 5.0, 8.0, 12.0, 20.0],
            nrays: 360,
            nbins: 200,
            rscale: 250.0,
            nyquist: Some(25.0),
            task: Some("synthetic_vol".to_string()),
            wind_speed: 15.0,
            wind_direction: 225.0,
            wind_shear: 2.0,
            wind_veer: 10.0,
            vertical_velocity: -1.0,
            velocity_noise: 1.0,
            surface_dbz: 30.0,
            dbz_lapse: -2.0,
            dbz_noise: 2.0,
            echo_top: 8_000.0,
            seed: 0,
        }
    }
}

impl ScenarioConfig {
    fn site(&self) -> SiteLocation {
        SiteLocation {
            latitude: self.latitude,
            longitude: self.longitude,
            height: self.site_height,
        }
    }

    /// True `(speed, direction)` at `height` metres above the site.
    pub fn wind_at(&self, height: f64) -> (f64, f64) {
        let km = height / 1000.0;
        let speed = (self.wind_speed + self.wind_shear * km).max(0.0);
        let direction = (self.wind_direction + self.wind_veer * km).rem_euclid(360.0);
        (speed, direction)
    }

    fn radial_velocity(&self, height: f64, azimuth: f64, elevation: f64) -> f64 {
        let (speed, direction) = self.wind_at(height);
        let toward = direction.to_radians() - std::f64::consts::PI;
        let u = speed * toward.sin();
        let v = speed * toward.cos();
        (u * azimuth.sin() + v * azimuth.cos()) * elevation.cos()
            + self.vertical_velocity * elevation.sin()
    }

    fn reflectivity(&self, height: f64) -> Option<f64> {
        (height <= self.echo_top).then(|| self.surface_dbz + self.dbz_lapse * height / 1000.0)
    }
}

fn jitter(rng: &mut StdRng, half_width: f64) -> f64 {
    if half_width > 0.0 {
        rng.gen_range(-half_width..half_width)
    } else {
        0.0
    }
}

fn encode_reflectivity(dbz: f64) -> f64 {
    ((dbz - REFLECTIVITY_OFFSET) / REFLECTIVITY_GAIN)
        .round()
        .clamp(1.0, 254.0)
}

fn build_scan(
    config: &ScenarioConfig,
    index: usize,
    elevation_deg: f64,
    rng: &mut StdRng,
) -> PolarScan {
    let geometry = EffectiveEarth::default();
    let site = config.site();
    let elevation = elevation_deg.to_radians();
    let mut velocity = Array2::from_elem((config.nrays, config.nbins), VELOCITY_NODATA);
    let mut dbz = Array2::from_elem((config.nrays, config.nbins), UNDETECT);

    for bin in 0..config.nbins {
        let range = (bin as f64 + 0.5) * config.rscale;
        let (_, height) = geometry.distance_height(&site, range, elevation);
        for ray in 0..config.nrays {
            let azimuth = ray_azimuth(ray, config.nrays);
            let Some(reflectivity) = config.reflectivity(height) else {
                continue;
            };
            dbz[[ray, bin]] = encode_reflectivity(reflectivity + jitter(rng, config.dbz_noise));
            let v = config.radial_velocity(height, azimuth, elevation)
                + jitter(rng, config.velocity_noise);
            velocity[[ray, bin]] = ((v - VELOCITY_OFFSET) / VELOCITY_GAIN).round();
        }
    }

    let start = config.date_time + Duration::seconds(config.sweep_seconds * index as i64);
    let end = start + Duration::seconds(config.sweep_seconds);
    PolarScan::new(elevation, config.rscale, start, end)
        .with_parameter(
            ScanParameter::new("VRADH", velocity)
                .with_scaling(VELOCITY_GAIN, VELOCITY_OFFSET)
                .with_sentinels(VELOCITY_NODATA, UNDETECT),
        )
        .with_parameter(
            ScanParameter::new("DBZH", dbz)
                .with_scaling(REFLECTIVITY_GAIN, REFLECTIVITY_OFFSET)
                .with_sentinels(REFLECTIVITY_NODATA, UNDETECT),
        )
        .with_attributes(ScanAttributes {
            malfunc: Some("False".to_string()),
            task: config.task.clone(),
            nyquist: config.nyquist,
        })
}

/// Scans the scenario into a polar volume. Deterministic for a given seed.
pub fn build_volume(config: &ScenarioConfig) -> anyhow::Result<PolarVolume> {
    ensure!(config.nrays > 0, "scenario needs at least one ray");
    ensure!(config.nbins > 0, "scenario needs at least one bin");
    ensure!(config.rscale > 0.0, "scenario rscale must be positive");
    config
        .nrays
        .checked_mul(config.nbins)
        .context("overflow computing sweep size")?;

    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut volume = PolarVolume::new(config.site(), config.source.clone(), config.date_time);
    volume.nyquist = config.nyquist;
    for (index, &elevation) in config.elevations.iter().enumerate() {
        volume.add_scan(build_scan(config, index, elevation, &mut rng));
    }
    Ok(volume)
}
