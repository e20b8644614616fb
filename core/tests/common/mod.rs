#![allow(dead_code)]

use chrono::{Duration, NaiveDate, NaiveDateTime};
use ndarray::Array2;
use rand::{rngs::StdRng, Rng, SeedableRng};
use vvpcore::processing::collector::ray_azimuth;
use vvpcore::volume::{PolarScan, PolarVolume, ScanAttributes, ScanParameter, SiteLocation};

pub const NODATA: f64 = -9999.0;
pub const UNDETECT: f64 = -8888.0;

pub fn nominal_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 5, 1)
        .and_then(|d| d.and_hms_opt(12, 0, 0))
        .unwrap()
}

/// Uniform wind field scanned at a set of elevations.
#[derive(Debug, Clone)]
pub struct Synthetic {
    pub elevations: Vec<f64>,
    pub nrays: usize,
    pub nbins: usize,
    pub rscale: f64,
    /// Eastward and northward wind, m/s.
    pub u: f64,
    pub v: f64,
    pub w: f64,
    pub velocity_noise: f64,
    pub dbz: f64,
    pub dbz_noise: f64,
    /// Rays from 0 that carry reflectivity; the rest are undetect.
    pub echo_rays: usize,
    pub nyquist: Option<f64>,
    pub task: Option<String>,
    pub seed: u64,
}

impl Default for Synthetic {
    fn default() -> Self {
        Self {
            elevations: vec![3.0, 5.0, 8.0, 12.0],
            nrays: 360,
            nbins: 100,
            rscale: 500.0,
            u: 10.0,
            v: 5.0,
            w: 0.0,
            velocity_noise: 0.0,
            dbz: 25.0,
            dbz_noise: 0.0,
            echo_rays: 360,
            nyquist: Some(25.0),
            task: Some("vol_a".to_string()),
            seed: 42,
        }
    }
}

impl Synthetic {
    /// Wind blowing from `direction` degrees at `speed` m/s.
    pub fn from_wind(speed: f64, direction: f64) -> Self {
        let toward = direction.to_radians() - std::f64::consts::PI;
        Self {
            u: speed * toward.sin(),
            v: speed * toward.cos(),
            ..Self::default()
        }
    }

    pub fn radial(&self, azimuth: f64, elevation: f64) -> f64 {
        (self.u * azimuth.sin() + self.v * azimuth.cos()) * elevation.cos() + self.w * elevation.sin()
    }

    pub fn build(&self) -> PolarVolume {
        self.build_with(|az, el| Some(self.radial(az, el)))
    }

    /// Builds the volume with a custom noiseless velocity pattern; `None` marks nodata.
    pub fn build_with<F>(&self, velocity: F) -> PolarVolume
    where
        F: Fn(f64, f64) -> Option<f64>,
    {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let site = SiteLocation {
            latitude: 52.1,
            longitude: 5.18,
            height: 50.0,
        };
        let mut volume = PolarVolume::new(site, "NOD:nltst", nominal_time());
        volume.nyquist = self.nyquist;

        for (index, &elevation_deg) in self.elevations.iter().enumerate() {
            let el = elevation_deg.to_radians();
            let mut vrad = Array2::from_elem((self.nrays, self.nbins), NODATA);
            let mut dbzh = Array2::from_elem((self.nrays, self.nbins), UNDETECT);
            for ray in 0..self.nrays {
                let az = ray_azimuth(ray, self.nrays);
                for bin in 0..self.nbins {
                    if let Some(v) = velocity(az, el) {
                        vrad[[ray, bin]] = v + noise(&mut rng, self.velocity_noise);
                    }
                    if ray < self.echo_rays {
                        dbzh[[ray, bin]] = self.dbz + noise(&mut rng, self.dbz_noise);
                    }
                }
            }

            let start = nominal_time() + Duration::seconds(30 * index as i64);
            let scan = PolarScan::new(el, self.rscale, start, start + Duration::seconds(25))
                .with_parameter(ScanParameter::new("VRADH", vrad).with_sentinels(NODATA, UNDETECT))
                .with_parameter(ScanParameter::new("DBZH", dbzh).with_sentinels(NODATA, UNDETECT))
                .with_attributes(ScanAttributes {
                    malfunc: Some("False".to_string()),
                    task: self.task.clone(),
                    nyquist: None,
                });
            volume.add_scan(scan);
        }
        volume
    }
}

fn noise(rng: &mut StdRng, half_width: f64) -> f64 {
    if half_width > 0.0 {
        rng.gen_range(-half_width..half_width)
    } else {
        0.0
    }
}
