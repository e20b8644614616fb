use crate::volume::parameter::ScanParameter;
use chrono::NaiveDateTime;

/// Optional `how/` attributes of a sweep.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanAttributes {
    /// `how/malfunc`; only the literal `"False"` or absence means healthy.
    pub malfunc: Option<String>,
    /// `how/task`
    pub task: Option<String>,
    /// `how/NI`, Nyquist interval in m/s.
    pub nyquist: Option<f64>,
}

/// One elevation sweep of a polar volume.
#[derive(Debug, Clone, PartialEq)]
pub struct PolarScan {
    /// Elevation angle in radians.
    pub elangle: f64,
    /// Range bin length in metres.
    pub rscale: f64,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub attributes: ScanAttributes,
    parameters: Vec<ScanParameter>,
}

impl PolarScan {
    pub fn new(elangle: f64, rscale: f64, start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self {
            elangle,
            rscale,
            start,
            end,
            attributes: ScanAttributes::default(),
            parameters: Vec::new(),
        }
    }

    pub fn with_parameter(mut self, parameter: ScanParameter) -> Self {
        self.add_parameter(parameter);
        self
    }

    pub fn with_attributes(mut self, attributes: ScanAttributes) -> Self {
        self.attributes = attributes;
        self
    }

    /// Adds a parameter, replacing any existing one with the same quantity.
    pub fn add_parameter(&mut self, parameter: ScanParameter) {
        self.parameters
            .retain(|existing| existing.quantity != parameter.quantity);
        self.parameters.push(parameter);
    }

    pub fn parameter(&self, quantity: &str) -> Option<&ScanParameter> {
        self.parameters
            .iter()
            .find(|parameter| parameter.quantity == quantity)
    }

    pub fn parameters(&self) -> &[ScanParameter] {
        &self.parameters
    }

    /// Radial velocity, `VRAD` with `VRADH` as fallback.
    pub fn velocity(&self) -> Option<&ScanParameter> {
        self.parameter("VRAD").or_else(|| self.parameter("VRADH"))
    }

    pub fn reflectivity(&self) -> Option<&ScanParameter> {
        self.parameter("DBZH")
    }

    pub fn elevation_deg(&self) -> f64 {
        self.elangle.to_degrees()
    }

    pub fn is_malfunctioning(&self) -> bool {
        matches!(self.attributes.malfunc.as_deref(), Some(flag) if flag != "False")
    }

    /// Largest bin count over all parameters.
    pub fn nbins(&self) -> usize {
        self.parameters
            .iter()
            .map(ScanParameter::nbins)
            .max()
            .unwrap_or(0)
    }
}
