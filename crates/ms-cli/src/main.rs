//! ms-sweep: plan a malaria intervention sweep and write the submission request
//!
//! Reads a TOML settings file, assembles the baseline configuration for the
//! chosen archetype, expands the fresh-start or resume sweep, and writes the
//! resulting request (plus, when resuming, a CSV of the prior simulations)
//! to the output directory.

mod settings;

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use ms_store::{export_csv, ExperimentStore, StoreConfig};
use ms_sweep::{plan_experiment, CoverageGrid, SetupBlock, SweepMode};
use ms_types::ArchetypeRegistry;
use tracing::info;
use tracing_subscriber::prelude::*;
use uuid::Uuid;

use settings::Settings;

#[derive(Parser, Debug)]
#[command(name = "ms-sweep")]
#[command(about = "Plan malaria intervention parameter sweeps")]
struct Cli {
    /// Path to the settings file
    #[arg(short, long, default_value = "ms-sweep.toml", env = "MS_SWEEP_CONFIG")]
    config: PathBuf,

    /// Archetype (overrides settings file)
    #[arg(long, env = "MS_SWEEP_ARCHETYPE")]
    archetype: Option<String>,

    /// Experiment name (overrides settings file)
    #[arg(long)]
    exp_name: Option<String>,

    /// Setup block: HPC or LOCAL
    #[arg(long)]
    location: Option<SetupBlock>,

    /// Resume from the most recent experiment with this id
    #[arg(long)]
    resume: Option<Uuid>,

    /// Read prior experiments from a manifest directory instead of COMPS
    #[arg(long, env = "MS_SWEEP_MANIFEST_DIR")]
    manifest: Option<PathBuf>,

    /// Output directory for the request and metadata files
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// Log level (debug, info, warn, error)
    #[arg(long, default_value = "info", env = "LOG_LEVEL")]
    log_level: String,
}

impl Cli {
    fn apply(self, mut settings: Settings) -> Settings {
        if let Some(archetype) = self.archetype {
            settings.archetype = archetype;
        }
        if let Some(exp_name) = self.exp_name {
            settings.exp_name = exp_name;
        }
        if let Some(location) = self.location {
            settings.location = location;
        }
        if let Some(experiment_id) = self.resume {
            let coverage_grid = match settings.sweep {
                SweepMode::Resume { coverage_grid, .. } => coverage_grid,
                SweepMode::FreshStart { .. } => CoverageGrid::default(),
            };
            settings.sweep = SweepMode::Resume {
                experiment_id,
                coverage_grid,
            };
        }
        if let Some(directory) = self.manifest {
            settings.store = StoreConfig::Manifest { directory };
        }
        if let Some(out) = self.out {
            settings.output_dir = out;
        }
        settings
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "ms_cli={0},ms_sweep={0},ms_config={0},ms_store={0},info",
                    cli.log_level
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Settings file: {}", cli.config.display());
    let settings = Settings::load(&cli.config)?;
    let settings = cli.apply(settings);

    info!("Archetype: {}", settings.archetype);
    info!("Experiment: {}", settings.exp_name);
    info!("Sweep mode: {}", settings.sweep.name());

    let store: Option<Box<dyn ExperimentStore>> = if settings.sweep.needs_store() {
        let mut store = settings.store.build();
        info!("Experiment store: {}", store.name());
        store
            .authenticate()
            .await
            .with_context(|| format!("authenticating with {}", store.name()))?;
        Some(store)
    } else {
        None
    };

    let registry = ArchetypeRegistry::builtin();
    let plan = plan_experiment(
        &registry,
        &settings.assembly_inputs(),
        &settings.sweep,
        settings.location,
        store.as_deref(),
    )
    .await?;

    std::fs::create_dir_all(&settings.output_dir)
        .with_context(|| format!("creating {}", settings.output_dir.display()))?;

    let request_path = settings.request_path();
    plan.request.write_json(&request_path)?;
    info!(
        "Wrote {} runs to {}",
        plan.request.run_count(),
        request_path.display()
    );

    if !plan.resume_rows.is_empty() {
        let metadata_path = settings.metadata_path();
        export_csv(&plan.resume_rows, &metadata_path)?;
        info!(
            "Wrote {} prior simulations to {}",
            plan.resume_rows.len(),
            metadata_path.display()
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_overrides_settings() {
        let id = Uuid::new_v4();
        let cli = Cli::parse_from([
            "ms-sweep",
            "--archetype",
            "moine",
            "--location",
            "local",
            "--resume",
            &id.to_string(),
            "--manifest",
            "/data/experiments",
        ]);

        let settings = cli.apply(Settings::default());
        assert_eq!(settings.archetype, "moine");
        assert_eq!(settings.location, SetupBlock::Local);
        assert_eq!(
            settings.sweep,
            SweepMode::Resume {
                experiment_id: id,
                coverage_grid: CoverageGrid::default(),
            }
        );
        assert_eq!(
            settings.store,
            StoreConfig::Manifest {
                directory: PathBuf::from("/data/experiments")
            }
        );
    }

    #[test]
    fn no_flags_keep_settings() {
        let cli = Cli::parse_from(["ms-sweep"]);
        let settings = cli.apply(Settings::default());
        assert_eq!(settings, Settings::default());
    }
}
