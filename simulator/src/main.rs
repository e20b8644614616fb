use anyhow::Context;
use clap::Parser;
use std::fs;
use std::path::PathBuf;
use vvpcore::ProfileField;
use workflow::config::{ProfileOverrides, WorkflowConfig};
use workflow::runner::{Runner, WorkflowResult};

mod generator;
mod workflow;

#[derive(Parser)]
#[command(author, version, about = "Vertical wind and reflectivity profile driver")]
struct Args {
    /// Load a workflow config from YAML
    #[arg(long)]
    workflow: Option<PathBuf>,
    /// Retrieval variant: legacy or enhanced
    #[arg(long)]
    variant: Option<String>,
    /// Layer thickness in metres
    #[arg(long)]
    dz: Option<u32>,
    /// Profile ceiling in metres
    #[arg(long)]
    hmax: Option<u32>,
    #[arg(long)]
    dmin: Option<f64>,
    #[arg(long)]
    dmax: Option<f64>,
    /// Minimum elevation angle in degrees
    #[arg(long)]
    emin: Option<f64>,
    /// Minimum absolute radial velocity in m/s
    #[arg(long)]
    vmin: Option<f64>,
    /// Comma separated output fields, e.g. "HGHT,ff,dd"
    #[arg(long)]
    fields: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    nodata: Option<f64>,
    #[arg(long, allow_hyphen_values = true)]
    undetect: Option<f64>,
    #[arg(long, allow_hyphen_values = true)]
    gain: Option<f64>,
    #[arg(long, allow_hyphen_values = true)]
    offset: Option<f64>,
    /// Seed of the synthetic scenario noise
    #[arg(long)]
    seed: Option<u64>,
    /// Write the profile as JSON to this file
    #[arg(long)]
    output: Option<PathBuf>,
    /// Print the profile as JSON instead of a table
    #[arg(long, default_value_t = false)]
    json: bool,
    /// Enable debug logging
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

impl Args {
    fn overrides(&self) -> ProfileOverrides {
        ProfileOverrides {
            variant: self.variant.clone(),
            dz: self.dz,
            hmax: self.hmax,
            dmin: self.dmin,
            dmax: self.dmax,
            emin: self.emin,
            vmin: self.vmin,
            fields: self.fields.clone(),
            nodata: self.nodata,
            undetect: self.undetect,
            gain: self.gain,
            offset: self.offset,
            seed: self.seed,
        }
    }
}

fn print_table(result: &WorkflowResult) {
    let profile = &result.profile;
    let attrs = &profile.attributes;
    println!(
        "{} {} {} angles [{}] tasks [{}]",
        attrs.product,
        attrs.source,
        attrs.date_time,
        attrs.angles_attribute(),
        attrs.task_attribute().unwrap_or_default()
    );

    let header: Vec<String> = profile
        .fields
        .iter()
        .map(|field| format!("{:>10}", field.field))
        .collect();
    println!("{}", header.join(""));
    for index in 0..profile.level_count() {
        let row: Vec<String> = profile
            .fields
            .iter()
            .map(|field| match field.field {
                ProfileField::Nv | ProfileField::Nz => format!("{:>10.0}", field.values[index]),
                _ => format!("{:>10.2}", field.values[index]),
            })
            .collect();
        println!("{}", row.join(""));
    }

    println!("{}", profile.metrics.summary());
    if let (Some(speed), Some(direction)) = (result.speed_error, result.direction_error) {
        println!(
            "scenario error: speed {:.2} m/s, direction {:.1} deg",
            speed, direction
        );
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let mut workflow_config = if let Some(path) = &args.workflow {
        WorkflowConfig::load(path)?
    } else {
        WorkflowConfig::default()
    };
    workflow_config.apply(&args.overrides())?;

    let runner = Runner::new(workflow_config);
    let result = runner.execute()?;

    if let Some(path) = &args.output {
        let json = result.profile.to_json().context("serializing profile")?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
        log::info!("profile written to {}", path.display());
    }

    if args.json {
        println!("{}", result.profile.to_json().context("serializing profile")?);
    } else {
        print_table(&result);
    }

    Ok(())
}
