use crate::prelude::{ProfileError, ProfileResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Retrieval flavour. `Legacy` is the single-elevation VAD model, `Enhanced`
/// the multi-elevation VVP model with gap screening and outlier rejection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    Legacy,
    #[default]
    Enhanced,
}

impl FromStr for Variant {
    type Err = ProfileError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "legacy" | "smhi" => Ok(Self::Legacy),
            "enhanced" | "knmi" => Ok(Self::Enhanced),
            other => Err(ProfileError::Configuration(format!(
                "unknown variant '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Legacy => write!(f, "legacy"),
            Self::Enhanced => write!(f, "enhanced"),
        }
    }
}

/// One output quantity of the vertical profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ProfileField {
    #[serde(rename = "NV")]
    Nv,
    #[serde(rename = "HGHT")]
    Hght,
    #[serde(rename = "UWND")]
    Uwnd,
    #[serde(rename = "VWND")]
    Vwnd,
    #[serde(rename = "ff")]
    Ff,
    #[serde(rename = "ff_dev")]
    FfDev,
    #[serde(rename = "dd")]
    Dd,
    #[serde(rename = "DBZH")]
    Dbzh,
    #[serde(rename = "DBZH_dev")]
    DbzhDev,
    #[serde(rename = "NZ")]
    Nz,
}

impl ProfileField {
    pub const ALL: [ProfileField; 10] = [
        ProfileField::Nv,
        ProfileField::Hght,
        ProfileField::Uwnd,
        ProfileField::Vwnd,
        ProfileField::Ff,
        ProfileField::FfDev,
        ProfileField::Dd,
        ProfileField::Dbzh,
        ProfileField::DbzhDev,
        ProfileField::Nz,
    ];

    /// Identifier used in field lists.
    pub fn id(&self) -> &'static str {
        match self {
            Self::Nv => "NV",
            Self::Hght => "HGHT",
            Self::Uwnd => "UWND",
            Self::Vwnd => "VWND",
            Self::Ff => "ff",
            Self::FfDev => "ff_dev",
            Self::Dd => "dd",
            Self::Dbzh => "DBZH",
            Self::DbzhDev => "DBZH_dev",
            Self::Nz => "NZ",
        }
    }

    /// Quantity name written to the output field. The wind sample count is `n`.
    pub fn quantity(&self) -> &'static str {
        match self {
            Self::Nv => "n",
            other => other.id(),
        }
    }

    pub fn is_count(&self) -> bool {
        matches!(self, Self::Nv | Self::Nz)
    }

    /// Fields packed through the configured gain/offset.
    pub fn is_packed(&self) -> bool {
        !matches!(self, Self::Nv | Self::Nz | Self::Hght)
    }
}

impl FromStr for ProfileField {
    type Err = ProfileError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        ProfileField::ALL
            .iter()
            .copied()
            .find(|field| field.id() == value)
            .ok_or_else(|| ProfileError::Configuration(format!("unknown field '{}'", value)))
    }
}

impl fmt::Display for ProfileField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Requested output fields, kept in canonical order without duplicates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<ProfileField>", into = "Vec<ProfileField>")]
pub struct FieldSet(Vec<ProfileField>);

impl FieldSet {
    pub fn all() -> Self {
        Self(ProfileField::ALL.to_vec())
    }

    pub fn from_fields<I: IntoIterator<Item = ProfileField>>(fields: I) -> Self {
        let mut fields: Vec<ProfileField> = fields.into_iter().collect();
        if fields.is_empty() {
            return Self::all();
        }
        fields.sort();
        fields.dedup();
        Self(fields)
    }

    /// Parses a comma separated list such as `"ff,dd,NV"`. An empty list means all fields.
    pub fn parse(list: &str) -> ProfileResult<Self> {
        let fields = list
            .split(',')
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(ProfileField::from_str)
            .collect::<ProfileResult<Vec<_>>>()?;
        Ok(Self::from_fields(fields))
    }

    pub fn contains(&self, field: ProfileField) -> bool {
        self.0.contains(&field)
    }

    pub fn iter(&self) -> impl Iterator<Item = ProfileField> + '_ {
        self.0.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<ProfileField>> for FieldSet {
    fn from(fields: Vec<ProfileField>) -> Self {
        Self::from_fields(fields)
    }
}

impl From<FieldSet> for Vec<ProfileField> {
    fn from(set: FieldSet) -> Self {
        set.0
    }
}

impl Default for FieldSet {
    fn default() -> Self {
        Self::all()
    }
}

/// Parameters of one profile generation. Heights and distances are metres,
/// angles degrees, velocities m/s.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileConfig {
    /// Layer thickness.
    pub dz: u32,
    /// Profile ceiling; must be a multiple of `dz`.
    pub hmax: u32,
    pub dmin: f64,
    pub dmax: f64,
    pub emin: f64,
    pub emax: f64,
    /// Elevations above this are only used at or above `hthr` (enhanced).
    pub econdmax: f64,
    pub hthr: f64,
    /// Minimum Nyquist interval of a velocity sweep (enhanced).
    pub nimin: f64,
    pub ngapbin: usize,
    pub ngapmin: usize,
    /// Outlier threshold in residual standard deviations; `<= 0` selects `maxvdiff`.
    pub maxnstd: f64,
    pub maxvdiff: f64,
    /// Combined sample floor of the legacy variant.
    pub nmin: usize,
    pub nmin_wnd: usize,
    pub nmin_ref: usize,
    pub vmin: f64,
    pub ff_max: f64,
    pub nodata_vp: f64,
    pub undetect_vp: f64,
    pub gain_vp: f64,
    pub offset_vp: f64,
    pub variant: Variant,
    pub fields: FieldSet,
    /// Capacity of each per-layer sample buffer.
    pub max_samples: usize,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            dz: 200,
            hmax: 12_000,
            dmin: 4_000.0,
            dmax: 40_000.0,
            emin: 2.5,
            emax: 45.0,
            econdmax: 10.0,
            hthr: 2_000.0,
            nimin: 10.0,
            ngapbin: 8,
            ngapmin: 5,
            maxnstd: 3.0,
            maxvdiff: 10.0,
            nmin: 36,
            nmin_wnd: 40,
            nmin_ref: 40,
            vmin: 2.0,
            ff_max: 60.0,
            nodata_vp: -9999.0,
            undetect_vp: -9999.0,
            gain_vp: 1.0,
            offset_vp: 0.0,
            variant: Variant::Enhanced,
            fields: FieldSet::all(),
            max_samples: 20_000,
        }
    }
}

impl ProfileConfig {
    pub fn with_variant(mut self, variant: Variant) -> Self {
        self.variant = variant;
        self
    }

    pub fn with_fields(mut self, fields: FieldSet) -> Self {
        self.fields = fields;
        self
    }

    /// Rejects parameter sets the retrieval cannot run with.
    pub fn validate(&self) -> ProfileResult<()> {
        let fail = |msg: String| Err(ProfileError::Configuration(msg));

        if self.gain_vp == 0.0 || !self.gain_vp.is_finite() {
            return fail(format!("gain_vp must be finite and non-zero, got {}", self.gain_vp));
        }
        if self.dz == 0 {
            return fail("dz must be > 0".to_string());
        }
        if self.hmax == 0 {
            return fail("hmax must be > 0".to_string());
        }
        if self.hmax % self.dz != 0 {
            return fail(format!(
                "hmax {} is not a multiple of dz {}",
                self.hmax, self.dz
            ));
        }
        if self.dmin > self.dmax {
            return fail(format!("dmin {} exceeds dmax {}", self.dmin, self.dmax));
        }
        if self.emin > self.emax {
            return fail(format!("emin {} exceeds emax {}", self.emin, self.emax));
        }
        if self.variant == Variant::Enhanced && self.ngapbin == 0 {
            return fail("ngapbin must be > 0".to_string());
        }
        if self.max_samples == 0 {
            return fail("max_samples must be > 0".to_string());
        }
        Ok(())
    }

    /// Number of height layers, `hmax / dz`.
    pub fn level_count(&self) -> usize {
        if self.dz == 0 {
            return 0;
        }
        (self.hmax / self.dz) as usize
    }

    /// Applies the output packing `(value - offset) / gain`.
    pub fn pack(&self, value: f64) -> f64 {
        (value - self.offset_vp) / self.gain_vp
    }
}
