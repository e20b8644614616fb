//! Radar beam geometry: slant range and elevation to ground distance and height.

use crate::volume::SiteLocation;

const EQUATOR_RADIUS: f64 = 6_378_160.0;
const POLAR_RADIUS: f64 = 6_356_780.0;
const DEFAULT_DNDH: f64 = -3.9e-8;

/// Maps a radar bin to `(ground_distance, height_above_site)`, both in metres.
pub trait Geometry {
    fn distance_height(&self, site: &SiteLocation, range: f64, elevation: f64) -> (f64, f64);
}

/// Effective-earth beam propagation with a latitude dependent earth radius.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectiveEarth {
    /// Refractivity gradient per metre.
    pub dndh: f64,
}

impl EffectiveEarth {
    pub fn new(dndh: f64) -> Self {
        Self { dndh }
    }

    /// Local earth radius on the reference ellipsoid.
    pub fn earth_radius(latitude_deg: f64) -> f64 {
        let (sin_lat, cos_lat) = latitude_deg.to_radians().sin_cos();
        let a = EQUATOR_RADIUS;
        let b = POLAR_RADIUS;
        let numerator = (a * a * cos_lat).powi(2) + (b * b * sin_lat).powi(2);
        let denominator = (a * cos_lat).powi(2) + (b * sin_lat).powi(2);
        (numerator / denominator).sqrt()
    }

    pub fn effective_radius(&self, latitude_deg: f64) -> f64 {
        let radius = Self::earth_radius(latitude_deg);
        radius / (1.0 + self.dndh * radius)
    }
}

impl Default for EffectiveEarth {
    fn default() -> Self {
        Self::new(DEFAULT_DNDH)
    }
}

impl Geometry for EffectiveEarth {
    fn distance_height(&self, site: &SiteLocation, range: f64, elevation: f64) -> (f64, f64) {
        let rh = self.effective_radius(site.latitude);
        let height = (range * range + rh * rh + 2.0 * range * rh * elevation.sin()).sqrt() - rh;
        let distance = rh * (range * elevation.cos() / (rh + height)).asin();
        (distance, height)
    }
}
