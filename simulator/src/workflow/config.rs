use crate::generator::volume::ScenarioConfig;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use vvpcore::{FieldSet, ProfileConfig, ProfileField, Variant};

/// A profile run: retrieval parameters plus the scenario to scan.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    pub profile: ProfileConfig,
    pub scenario: ScenarioConfig,
}

/// Command line values taking precedence over the workflow file.
#[derive(Clone, Debug, Default)]
pub struct ProfileOverrides {
    pub variant: Option<String>,
    pub dz: Option<u32>,
    pub hmax: Option<u32>,
    pub dmin: Option<f64>,
    pub dmax: Option<f64>,
    pub emin: Option<f64>,
    pub vmin: Option<f64>,
    pub fields: Option<String>,
    pub nodata: Option<f64>,
    pub undetect: Option<f64>,
    pub gain: Option<f64>,
    pub offset: Option<f64>,
    pub seed: Option<u64>,
}

impl WorkflowConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading workflow config {}", path_ref.display()))?;
        let config: WorkflowConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing workflow config {}", path_ref.display()))?;
        Ok(config)
    }

    pub fn apply(&mut self, overrides: &ProfileOverrides) -> anyhow::Result<()> {
        let profile = &mut self.profile;
        if let Some(variant) = &overrides.variant {
            profile.variant = variant
                .parse::<Variant>()
                .with_context(|| format!("parsing --variant {}", variant))?;
        }
        if let Some(fields) = &overrides.fields {
            profile.fields = FieldSet::parse(fields)
                .with_context(|| format!("parsing --fields {}", fields))?;
        }
        set(&mut profile.dz, overrides.dz);
        set(&mut profile.hmax, overrides.hmax);
        set(&mut profile.dmin, overrides.dmin);
        set(&mut profile.dmax, overrides.dmax);
        set(&mut profile.emin, overrides.emin);
        set(&mut profile.vmin, overrides.vmin);
        set(&mut profile.nodata_vp, overrides.nodata);
        set(&mut profile.undetect_vp, overrides.undetect);
        set(&mut profile.gain_vp, overrides.gain);
        set(&mut profile.offset_vp, overrides.offset);
        set(&mut self.scenario.seed, overrides.seed);

        profile.validate().context("validating profile parameters")?;
        Ok(())
    }
}

fn set<T>(target: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *target = value;
    }
}
