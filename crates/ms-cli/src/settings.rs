//! Experiment settings file

use anyhow::Context;
use ms_config::AssemblyInputs;
use ms_store::StoreConfig;
use ms_sweep::{SetupBlock, SweepMode};
use ms_types::InterventionKind;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Setup block the request targets
    #[serde(default)]
    pub location: SetupBlock,

    #[serde(default = "default_archetype")]
    pub archetype: String,

    #[serde(default = "default_exp_name")]
    pub exp_name: String,

    /// Simulated years
    #[serde(default = "default_years")]
    pub years: u32,

    /// Interventions: `itn`, `irs`, `act`
    #[serde(default)]
    pub interventions: Vec<InterventionKind>,

    /// Serialize population state at the end of each run
    #[serde(default)]
    pub serialize: bool,

    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    #[serde(default)]
    pub sweep: SweepMode,

    /// Prior-experiment store, consulted in resume mode
    #[serde(default)]
    pub store: StoreConfig,
}

fn default_archetype() -> String { "karen".to_string() }
fn default_exp_name() -> String { "karen_burnin".to_string() }
fn default_years() -> u32 { 2 }
fn default_output_dir() -> PathBuf { PathBuf::from("requests") }

impl Default for Settings {
    fn default() -> Self {
        Self {
            location: SetupBlock::default(),
            archetype: default_archetype(),
            exp_name: default_exp_name(),
            years: default_years(),
            interventions: Vec::new(),
            serialize: false,
            output_dir: default_output_dir(),
            sweep: SweepMode::default(),
            store: StoreConfig::default(),
        }
    }
}

impl Settings {
    /// Read settings from `path`, falling back to defaults when it is absent.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            info!("Settings file {} not found, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))
    }

    pub fn assembly_inputs(&self) -> AssemblyInputs {
        AssemblyInputs::new(&self.archetype, &self.exp_name)
            .with_years(self.years)
            .with_interventions(self.interventions.iter().copied())
            .with_serialization(self.serialize)
    }

    pub fn request_path(&self) -> PathBuf {
        self.output_dir.join(format!("{}.request.json", self.exp_name))
    }

    pub fn metadata_path(&self) -> PathBuf {
        self.output_dir.join(format!("{}.metadata.csv", self.exp_name))
    }
}
