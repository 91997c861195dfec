//! Expansion of the baseline into per-run modification sets.

use ms_store::{fetch_resume_rows, ExperimentId, ExperimentStore, ResumeRow};
use ms_types::{
    config_error, params, ItnAgeSeasonParams, ModificationSet, MsResult, OverlaySpec,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::grid::{CoverageGrid, HabitatGrid, SeedRange};

/// How the sweep is expanded. The two modes are mutually exclusive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode")]
pub enum SweepMode {
    /// Seed × larval-habitat-scale grid starting from an empty population.
    #[serde(rename = "fresh")]
    FreshStart {
        #[serde(default)]
        seeds: SeedRange,
        #[serde(default)]
        habitat_grid: HabitatGrid,
    },
    /// One group per prior simulation, resumed from its serialized state and
    /// expanded across ITN coverage levels.
    #[serde(rename = "resume")]
    Resume {
        experiment_id: ExperimentId,
        #[serde(default)]
        coverage_grid: CoverageGrid,
    },
}

impl Default for SweepMode {
    fn default() -> Self {
        Self::FreshStart {
            seeds: SeedRange::default(),
            habitat_grid: HabitatGrid::default(),
        }
    }
}

impl SweepMode {
    pub fn name(&self) -> &'static str {
        match self {
            Self::FreshStart { .. } => "fresh",
            Self::Resume { .. } => "resume",
        }
    }

    pub fn needs_store(&self) -> bool {
        matches!(self, Self::Resume { .. })
    }
}

/// Larval habitat multiplier for a log10 scale.
pub fn habitat_multiplier(scale: f64) -> f64 {
    10f64.powf(scale)
}

/// Fresh-start grid: scales ascending in the outer loop, seeds in the inner.
pub fn fresh_start_sweep(
    seeds: &SeedRange,
    habitat_grid: &HabitatGrid,
) -> MsResult<Vec<ModificationSet>> {
    let seeds = seeds.values()?;
    let scales = habitat_grid.values()?;

    let mut sets = Vec::with_capacity(seeds.len() * scales.len());
    for scale in &scales {
        let multiplier = habitat_multiplier(*scale);
        for seed in &seeds {
            sets.push(
                ModificationSet::new()
                    .set_param(params::RUN_NUMBER, *seed)
                    .set_param(params::LARVAL_HABITAT_MULTIPLIER, multiplier),
            );
        }
    }

    info!(
        "Fresh-start sweep: {} scales x {} seeds = {} runs",
        scales.len(),
        seeds.len(),
        sets.len()
    );
    Ok(sets)
}

/// Resume grid: every prior simulation crossed with every coverage level.
///
/// State files are listed once per row; a missing output directory or tag
/// aborts the whole sweep.
pub fn resume_sweep(
    rows: &[ResumeRow],
    coverage_grid: &CoverageGrid,
) -> MsResult<Vec<ModificationSet>> {
    let coverages = coverage_grid.values()?;

    let mut sets = Vec::with_capacity(rows.len() * coverages.len());
    for row in rows {
        let run_number = row.run_number()?.clone();
        let habitat = row.habitat_multiplier()?.clone();
        let state_dir = row.state_dir();
        let state_files = row.state_files()?;
        debug!(
            "Simulation {}: {} state files in {}",
            row.simulation_id,
            state_files.len(),
            state_dir.display()
        );

        let state_path = Value::String(state_dir.to_string_lossy().to_string());
        let state_files = json!(state_files);
        for coverage in &coverages {
            sets.push(
                ModificationSet::new()
                    .set_param(params::SERIALIZED_POPULATION_PATH, state_path.clone())
                    .set_param(params::SERIALIZED_POPULATION_FILENAMES, state_files.clone())
                    .set_param(params::RUN_NUMBER, run_number.clone())
                    .set_param(params::LARVAL_HABITAT_MULTIPLIER, habitat.clone())
                    .overlay(OverlaySpec::ItnAgeSeason(ItnAgeSeasonParams::with_coverage(
                        *coverage,
                    ))),
            );
        }
    }

    info!(
        "Resume sweep: {} simulations x {} coverages = {} runs",
        rows.len(),
        coverages.len(),
        sets.len()
    );
    Ok(sets)
}

/// Single entry point for both sweep modes.
///
/// `store` must be authenticated; it is only consulted in resume mode.
pub async fn build_sweep(
    mode: &SweepMode,
    store: Option<&dyn ExperimentStore>,
) -> MsResult<Vec<ModificationSet>> {
    Ok(expand_sweep(mode, store).await?.0)
}

/// Like [`build_sweep`], also returning the resume rows the sets came from.
pub(crate) async fn expand_sweep(
    mode: &SweepMode,
    store: Option<&dyn ExperimentStore>,
) -> MsResult<(Vec<ModificationSet>, Vec<ResumeRow>)> {
    match mode {
        SweepMode::FreshStart {
            seeds,
            habitat_grid,
        } => Ok((fresh_start_sweep(seeds, habitat_grid)?, Vec::new())),
        SweepMode::Resume {
            experiment_id,
            coverage_grid,
        } => {
            let store = store
                .ok_or_else(|| config_error!("resume sweep requires an experiment store"))?;
            let rows = fetch_resume_rows(store, experiment_id).await?;
            let sets = resume_sweep(&rows, coverage_grid)?;
            Ok((sets, rows))
        }
    }
}
