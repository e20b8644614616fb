//! Read-only polar volume model consumed by the retrieval.
//!
//! Reading and writing volumes from files is left to the caller; the types here
//! only expose what the profile generator needs.

pub mod parameter;
pub mod scan;

pub use parameter::ScanParameter;
pub use scan::{PolarScan, ScanAttributes};

use chrono::NaiveDateTime;

/// Radar site position. Latitude and longitude in degrees, height in metres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SiteLocation {
    pub latitude: f64,
    pub longitude: f64,
    pub height: f64,
}

/// A volumetric scan: several elevation sweeps from one site.
#[derive(Debug, Clone, PartialEq)]
pub struct PolarVolume {
    pub site: SiteLocation,
    pub source: String,
    /// Nominal date/time of the volume.
    pub date_time: NaiveDateTime,
    /// Volume-level `how/NI`.
    pub nyquist: Option<f64>,
    scans: Vec<PolarScan>,
}

impl PolarVolume {
    pub fn new(site: SiteLocation, source: impl Into<String>, date_time: NaiveDateTime) -> Self {
        Self {
            site,
            source: source.into(),
            date_time,
            nyquist: None,
            scans: Vec::new(),
        }
    }

    pub fn with_scan(mut self, scan: PolarScan) -> Self {
        self.scans.push(scan);
        self
    }

    pub fn add_scan(&mut self, scan: PolarScan) {
        self.scans.push(scan);
    }

    pub fn scans(&self) -> &[PolarScan] {
        &self.scans
    }

    pub fn scan_count(&self) -> usize {
        self.scans.len()
    }
}
