use ms_types::{params, MsResult, StoreError};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::listing::list_state_files;
use crate::store::{Experiment, ExperimentId, ExperimentStore, SimulationRecord};

/// Subdirectory of a simulation's working directory holding serialized state
pub const OUTPUT_SUBDIR: &str = "output";

/// Metadata of one prior simulation, the seed of a resume group
#[derive(Debug, Clone, PartialEq)]
pub struct ResumeRow {
    pub simulation_id: String,
    pub tags: BTreeMap<String, Value>,
    pub output_dir: PathBuf,
}

impl ResumeRow {
    pub fn from_simulation(simulation: &SimulationRecord) -> Self {
        Self {
            simulation_id: simulation.id.clone(),
            tags: simulation.tags.clone(),
            output_dir: simulation.path.clone(),
        }
    }

    /// Tag value exactly as recorded by the experiment service.
    pub fn tag(&self, name: &str) -> MsResult<&Value> {
        self.tags.get(name).ok_or_else(|| {
            StoreError::MissingTag {
                simulation_id: self.simulation_id.clone(),
                tag: name.to_string(),
            }
            .into()
        })
    }

    pub fn run_number(&self) -> MsResult<&Value> {
        self.tag(params::RUN_NUMBER)
    }

    pub fn habitat_multiplier(&self) -> MsResult<&Value> {
        self.tag(params::LARVAL_HABITAT_MULTIPLIER)
    }

    /// Directory holding this simulation's serialized population files.
    pub fn state_dir(&self) -> PathBuf {
        self.output_dir.join(OUTPUT_SUBDIR)
    }

    /// Serialized-state file names, sorted. Fails with `PathNotFound`.
    pub fn state_files(&self) -> MsResult<Vec<String>> {
        list_state_files(&self.state_dir())
    }
}

/// One resume row per simulation, in the order the store returned them.
pub fn resume_rows(experiment: &Experiment) -> Vec<ResumeRow> {
    experiment
        .simulations
        .iter()
        .map(ResumeRow::from_simulation)
        .collect()
}

/// Look up the most recent experiment under `id` and tabulate its simulations.
pub async fn fetch_resume_rows(
    store: &dyn ExperimentStore,
    id: &ExperimentId,
) -> MsResult<Vec<ResumeRow>> {
    let experiment = store.get_most_recent_experiment(id).await?;
    let rows = resume_rows(&experiment);
    info!(
        "Loaded {} resume rows from experiment {} via {}",
        rows.len(),
        experiment.name,
        store.name()
    );
    Ok(rows)
}

#[derive(Debug, Serialize)]
struct MetadataRecord<'a> {
    simulation_id: &'a str,
    run_number: String,
    habitat_multiplier: String,
    output_dir: String,
}

fn tag_text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}

/// Write the resume metadata table as CSV. Missing tags become empty cells.
pub fn export_csv(rows: &[ResumeRow], path: &Path) -> MsResult<()> {
    let export_failed = |e: csv::Error| StoreError::ExportFailed {
        message: format!("{}: {}", path.display(), e),
    };

    let mut writer = csv::Writer::from_path(path).map_err(export_failed)?;
    for row in rows {
        writer
            .serialize(MetadataRecord {
                simulation_id: &row.simulation_id,
                run_number: tag_text(row.tags.get(params::RUN_NUMBER)),
                habitat_multiplier: tag_text(row.tags.get(params::LARVAL_HABITAT_MULTIPLIER)),
                output_dir: row.state_dir().to_string_lossy().to_string(),
            })
            .map_err(export_failed)?;
    }
    writer.flush()?;

    debug!("Exported {} metadata rows to {}", rows.len(), path.display());
    Ok(())
}
