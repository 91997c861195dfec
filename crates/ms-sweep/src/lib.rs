//! # ms-sweep
//!
//! Sweep expansion for the malaria sweep planner.
//!
//! Turns an assembled baseline into an ordered list of modification sets,
//! either as a fresh-start seed × habitat grid or by resuming prior
//! simulations across ITN coverage levels, and packages the result as a
//! submission request.

mod grid;
mod plan;
mod submission;

pub use grid::{ArangeSegment, CoverageGrid, HabitatGrid, SeedRange};
pub use plan::{build_sweep, fresh_start_sweep, habitat_multiplier, resume_sweep, SweepMode};
pub use submission::{SetupBlock, SubmissionRequest};

use ms_config::{assemble_baseline, AssemblyInputs};
use ms_store::{ExperimentStore, ResumeRow};
use ms_types::{ArchetypeRegistry, MsResult};
use tracing::info;

/// A planned experiment and, in resume mode, the prior simulations it resumes
#[derive(Debug, Clone)]
pub struct ExperimentPlan {
    pub request: SubmissionRequest,
    pub resume_rows: Vec<ResumeRow>,
}

/// Assemble the baseline, expand the sweep and package both.
pub async fn plan_experiment(
    registry: &ArchetypeRegistry,
    inputs: &AssemblyInputs,
    mode: &SweepMode,
    setup: SetupBlock,
    store: Option<&dyn ExperimentStore>,
) -> MsResult<ExperimentPlan> {
    let baseline = assemble_baseline(registry, inputs)?;
    if let Some(summary) = &baseline.irs_summary {
        info!(
            "IRS: coverage {} from day {} with half-life {}",
            summary.coverage, summary.start, summary.halflife
        );
    }

    let (modifications, resume_rows) = plan::expand_sweep(mode, store).await?;
    let request = SubmissionRequest::new(&inputs.exp_name, setup, baseline.config, modifications);
    info!(
        "Planned {} {} runs for {} on {}",
        request.run_count(),
        mode.name(),
        request.experiment_name,
        request.setup
    );
    Ok(ExperimentPlan {
        request,
        resume_rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ms_types::{params, InterventionKind};
    use serde_json::json;

    #[tokio::test]
    async fn plans_fresh_start_experiment() {
        let registry = ArchetypeRegistry::builtin();
        let inputs = AssemblyInputs::new("karen", "karen_fresh")
            .with_interventions([InterventionKind::Irs])
            .with_serialization(true);

        let plan = plan_experiment(
            &registry,
            &inputs,
            &SweepMode::default(),
            SetupBlock::Local,
            None,
        )
        .await
        .unwrap();
        assert!(plan.resume_rows.is_empty());
        let request = plan.request;
        assert_eq!(request.setup, SetupBlock::Local);

        assert_eq!(request.run_count(), 265);
        assert_eq!(request.experiment_name, "karen_fresh");
        assert_eq!(request.base_config.campaign.events.len(), 1);

        let run = request.materialize(7).unwrap();
        assert_eq!(run.get_param(params::RUN_NUMBER), Some(&json!(2)));
        assert_eq!(
            run.get_param(params::SERIALIZATION_TIME_STEPS),
            Some(&json!([730]))
        );
    }

    #[tokio::test]
    async fn unknown_archetype_aborts_planning() {
        let registry = ArchetypeRegistry::builtin();
        let inputs = AssemblyInputs::new("atlantis", "nowhere");
        let result = plan_experiment(
            &registry,
            &inputs,
            &SweepMode::default(),
            SetupBlock::Hpc,
            None,
        )
        .await;
        assert!(result.is_err());
    }
}
