//! Output types of a profile generation.

use crate::config::{ProfileConfig, ProfileField, Variant};
use crate::prelude::{ProfileError, ProfileResult};
use crate::telemetry::RunMetrics;
use chrono::NaiveDateTime;
use serde::Serialize;

/// Sentinels and packing of one output field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FieldScaling {
    pub nodata: f64,
    pub undetect: f64,
    pub gain: f64,
    pub offset: f64,
}

impl FieldScaling {
    pub fn for_field(field: ProfileField, config: &ProfileConfig) -> Self {
        match field {
            ProfileField::Nv | ProfileField::Nz => Self {
                nodata: -1.0,
                undetect: -1.0,
                gain: 1.0,
                offset: 0.0,
            },
            ProfileField::Hght => Self {
                nodata: -9999.0,
                undetect: -9999.0,
                gain: 1.0,
                offset: 0.0,
            },
            _ => Self {
                nodata: config.nodata_vp,
                undetect: config.undetect_vp,
                gain: config.gain_vp,
                offset: config.offset_vp,
            },
        }
    }
}

/// One column of the profile, one value per level, lowest level first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutputField {
    pub field: ProfileField,
    pub quantity: &'static str,
    pub scaling: FieldScaling,
    pub values: Vec<f64>,
}

impl OutputField {
    /// Reserves room for `levels` values up front.
    pub fn allocate(field: ProfileField, config: &ProfileConfig, levels: usize) -> ProfileResult<Self> {
        let mut values = Vec::new();
        values.try_reserve_exact(levels).map_err(|err| {
            ProfileError::Allocation(format!("{} field of {} levels: {}", field, levels, err))
        })?;
        Ok(Self {
            field,
            quantity: field.quantity(),
            scaling: FieldScaling::for_field(field, config),
            values,
        })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Horizontal wind of a layer. Direction is degrees clockwise from north,
/// the direction the wind blows from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WindEstimate {
    pub speed: f64,
    pub direction: f64,
    pub std_dev: f64,
    pub u: f64,
    pub v: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ReflectivityEstimate {
    /// dBZ of the mean linear reflectivity.
    pub mean_dbz: f64,
    /// dBZ of the linear standard deviation; `None` when every sample was equal.
    pub std_dbz: Option<f64>,
}

/// Why a layer has or lacks a wind value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WindStatus {
    Valid,
    TooFewSamples,
    AzimuthGap,
    SingularFit,
    /// A fit exists but failed a sample count or speed gate.
    Gated,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileLevel {
    pub index: usize,
    /// Layer centre in metres.
    pub height: f64,
    pub wind: Option<WindEstimate>,
    pub wind_status: WindStatus,
    /// Velocity samples accepted by the final fit.
    pub nv: usize,
    pub reflectivity: Option<ReflectivityEstimate>,
    pub nz: usize,
    pub velocity_dropped: usize,
    pub reflectivity_dropped: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileAttributes {
    pub product: String,
    pub source: String,
    pub latitude: f64,
    pub longitude: f64,
    pub site_height: f64,
    /// Nominal time of the volume.
    pub date_time: NaiveDateTime,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub interval: u32,
    pub min_height: u32,
    pub max_height: u32,
    pub min_range_km: f64,
    pub max_range_km: f64,
    /// Accepted elevations in degrees, ascending.
    pub angles: Vec<f64>,
    pub tasks: Vec<String>,
    pub variant: Variant,
}

impl ProfileAttributes {
    /// Elevations formatted with one decimal and joined by commas.
    pub fn angles_attribute(&self) -> String {
        self.angles
            .iter()
            .map(|angle| format!("{:.1}", angle))
            .collect::<Vec<_>>()
            .join(",")
    }

    pub fn task_attribute(&self) -> Option<String> {
        if self.tasks.is_empty() {
            None
        } else {
            Some(self.tasks.join(","))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VerticalProfile {
    pub attributes: ProfileAttributes,
    pub levels: Vec<ProfileLevel>,
    pub fields: Vec<OutputField>,
    pub metrics: RunMetrics,
}

impl VerticalProfile {
    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    pub fn field(&self, field: ProfileField) -> Option<&OutputField> {
        self.fields.iter().find(|f| f.field == field)
    }

    pub fn values(&self, field: ProfileField) -> Option<&[f64]> {
        self.field(field).map(|f| f.values.as_slice())
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
