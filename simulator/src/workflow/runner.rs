use crate::generator::volume::build_volume;
use crate::workflow::config::WorkflowConfig;
use anyhow::Context;
use vvpcore::{ProfileGenerator, VerticalProfile};

pub struct WorkflowResult {
    pub profile: VerticalProfile,
    /// Mean absolute speed error against the scenario over layers with wind.
    pub speed_error: Option<f64>,
    /// Mean absolute direction error in degrees over the same layers.
    pub direction_error: Option<f64>,
}

#[derive(Clone)]
pub struct Runner {
    config: WorkflowConfig,
}

impl Runner {
    pub fn new(config: WorkflowConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self) -> anyhow::Result<WorkflowResult> {
        let volume = build_volume(&self.config.scenario).context("building synthetic volume")?;
        let generator = ProfileGenerator::new(self.config.profile.clone());
        let profile = generator
            .generate(&volume)
            .context("generating vertical profile")?;

        let errors: Vec<(f64, f64)> = profile
            .levels
            .iter()
            .filter_map(|level| {
                let wind = level.wind?;
                let (speed, direction) = self.config.scenario.wind_at(level.height);
                let turn = (wind.direction - direction).rem_euclid(360.0);
                Some(((wind.speed - speed).abs(), turn.min(360.0 - turn)))
            })
            .collect();
        let mean = |select: fn(&(f64, f64)) -> f64| {
            (!errors.is_empty())
                .then(|| errors.iter().map(select).sum::<f64>() / errors.len() as f64)
        };

        Ok(WorkflowResult {
            speed_error: mean(|e| e.0),
            direction_error: mean(|e| e.1),
            profile,
        })
    }
}
