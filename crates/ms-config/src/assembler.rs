use ms_types::{
    Archetype, ArchetypeRegistry, HealthSeekingParams, InterventionKind, IrsParams, IrsSummary,
    MsResult, SimConfig,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::info;

use crate::defaults::{from_defaults, MALARIA_SIM};
use crate::interventions::irs_summary;
use crate::overlays::{
    ConstantClimate, EventRecorder, HealthSeekingOverlay, IrsOverlay, ScalarOverrides,
    SerializationStep, SpeciesHabitat, SummaryReport,
};
use crate::pipeline::ConfigPipeline;

pub const DAYS_PER_YEAR: u32 = 365;

/// Everything the baseline configuration depends on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssemblyInputs {
    pub template: String,
    pub archetype: String,
    pub exp_name: String,
    pub years: u32,
    pub interventions: BTreeSet<InterventionKind>,
    /// Save population state at the end of the run.
    pub serialize: bool,
    pub irs: IrsParams,
    pub health_seeking: HealthSeekingParams,
}

impl AssemblyInputs {
    pub fn new(archetype: impl Into<String>, exp_name: impl Into<String>) -> Self {
        Self {
            template: MALARIA_SIM.to_string(),
            archetype: archetype.into(),
            exp_name: exp_name.into(),
            years: 2,
            interventions: BTreeSet::new(),
            serialize: false,
            // actellic-like spraying
            irs: IrsParams {
                coverage: 0.8,
                start_days: vec![60],
                decay: 180,
            },
            health_seeking: HealthSeekingParams::default(),
        }
    }

    pub fn with_years(mut self, years: u32) -> Self {
        self.years = years;
        self
    }

    pub fn with_interventions(
        mut self,
        interventions: impl IntoIterator<Item = InterventionKind>,
    ) -> Self {
        self.interventions = interventions.into_iter().collect();
        self
    }

    pub fn with_serialization(mut self, serialize: bool) -> Self {
        self.serialize = serialize;
        self
    }

    pub fn duration_days(&self) -> u32 {
        DAYS_PER_YEAR * self.years
    }

    pub fn wants(&self, kind: InterventionKind) -> bool {
        self.interventions.contains(&kind)
    }
}

/// Assembled baseline plus the bookkeeping produced along the way
#[derive(Debug, Clone, PartialEq)]
pub struct Baseline {
    pub config: SimConfig,
    pub archetype: Archetype,
    pub irs_summary: Option<IrsSummary>,
}

/// The fixed-order overlay pipeline for one archetype.
pub fn build_pipeline(archetype: &Archetype, inputs: &AssemblyInputs) -> ConfigPipeline {
    let duration = inputs.duration_days();
    ConfigPipeline::new()
        .then(ScalarOverrides::for_experiment(
            &inputs.exp_name,
            duration,
            &archetype.demographics,
        ))
        .then_if(
            inputs.serialize,
            SerializationStep {
                time_steps: vec![duration],
            },
        )
        .then(SummaryReport::default())
        .then(ConstantClimate::default())
        .then(SpeciesHabitat::new(archetype.species.clone()))
        .then(EventRecorder::default())
        .then_if(
            inputs.wants(InterventionKind::Irs),
            IrsOverlay(inputs.irs.clone()),
        )
        .then_if(
            inputs.wants(InterventionKind::Act),
            HealthSeekingOverlay(inputs.health_seeking.clone()),
        )
}

/// Build the baseline configuration for an experiment.
pub fn assemble_baseline(
    registry: &ArchetypeRegistry,
    inputs: &AssemblyInputs,
) -> MsResult<Baseline> {
    let archetype = registry.get(&inputs.archetype)?.clone();
    info!(
        "Assembling {} baseline for archetype {} ({} days)",
        inputs.template,
        archetype.name,
        inputs.duration_days()
    );

    let pipeline = build_pipeline(&archetype, inputs);
    let config = pipeline.run(from_defaults(&inputs.template)?)?;

    let irs_summary = if inputs.wants(InterventionKind::Irs) {
        Some(irs_summary(&inputs.irs)?)
    } else {
        None
    };

    info!(
        "Baseline assembled: {} parameters, {} campaign events, {} reports",
        config.parameters.len(),
        config.campaign.events.len(),
        config.custom_reports.len()
    );

    Ok(Baseline {
        config,
        archetype,
        irs_summary,
    })
}
