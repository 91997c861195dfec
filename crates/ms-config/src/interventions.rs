//! Declarative intervention builders.
//!
//! Each builder takes the configuration by value and returns it with the
//! intervention's campaign events appended. Re-applying a builder with the
//! same inputs leaves the campaign unchanged.

use ms_types::{
    validation_error, CoverageBand, HealthSeekingParams, HealthSeekingTarget, IrsParams,
    IrsSummary, ItnAgeSeasonParams, MsResult, SimConfig, WaningEffect,
};
use serde_json::{json, Value};
use tracing::debug;

/// Events broadcast by usage-dependent bednets; must appear in `Listed_Events`.
pub const BEDNET_RECEIVED_EVENT: &str = "Bednet_Got_New_One";
pub const BEDNET_USING_EVENT: &str = "Bednet_Using";
pub const BEDNET_DISCARDED_EVENT: &str = "Bednet_Discarded";

const IRS_KILLING_INITIAL_EFFECT: f64 = 0.6;
const IRS_BLOCKING_INITIAL_EFFECT: f64 = 0.0;
const IRS_BLOCKING_DECAY: f64 = 730.0;
const IRS_AGE_MIN: f64 = 0.0;
const IRS_AGE_MAX: f64 = 200.0;

fn check_coverage(what: &str, coverage: f64) -> MsResult<()> {
    if !(0.0..=1.0).contains(&coverage) {
        return Err(validation_error!(
            "{} coverage must lie in [0, 1], got {}",
            what,
            coverage
        ));
    }
    Ok(())
}

/// Bookkeeping record for an IRS layer.
pub fn irs_summary(params: &IrsParams) -> MsResult<IrsSummary> {
    let start = *params
        .start_days
        .first()
        .ok_or_else(|| validation_error!("IRS requires at least one start day"))?;
    Ok(IrsSummary {
        halflife: params.decay,
        start,
        coverage: params.coverage,
    })
}

/// Indoor residual spraying: one exponentially waning killing layer plus a
/// weak blocking layer, distributed at every start day.
pub fn add_irs(mut config: SimConfig, params: &IrsParams) -> MsResult<(SimConfig, IrsSummary)> {
    check_coverage("IRS", params.coverage)?;
    let summary = irs_summary(params)?;

    let killing = WaningEffect::exponential(IRS_KILLING_INITIAL_EFFECT, params.decay as f64);
    let blocking = WaningEffect::exponential(IRS_BLOCKING_INITIAL_EFFECT, IRS_BLOCKING_DECAY);
    let band = CoverageBand {
        min: IRS_AGE_MIN,
        max: IRS_AGE_MAX,
        coverage: params.coverage,
    };

    for start in &params.start_days {
        let event = json!({
            "class": "CampaignEvent",
            "Start_Day": start,
            "Nodeset_Config": {"class": "NodeSetAll"},
            "Event_Coordinator_Config": {
                "class": "StandardInterventionDistributionEventCoordinator",
                "Demographic_Coverage": band.coverage,
                "Target_Demographic": "ExplicitAgeRanges",
                "Target_Age_Min": band.min,
                "Target_Age_Max": band.max,
                "Intervention_Config": {
                    "class": "IRSHousingModification",
                    "Cost_To_Consumer": 1.0,
                    "Killing_Config": killing,
                    "Blocking_Config": blocking
                }
            }
        });
        if config.add_event(event) {
            debug!("Added IRS event at day {} (coverage {})", start, params.coverage);
        }
    }

    Ok((config, summary))
}

fn treatment_config(params: &HealthSeekingParams, target: &HealthSeekingTarget) -> Value {
    let mut interventions: Vec<Value> = params
        .drugs
        .iter()
        .map(|drug| {
            json!({
                "class": "AntimalarialDrug",
                "Drug_Type": drug,
                "Dosing_Type": params.dosing,
                "Cost_To_Consumer": 1.5
            })
        })
        .collect();
    interventions.push(json!({
        "class": "BroadcastEvent",
        "Broadcast_Event": params.broadcast_event_name
    }));

    let distributor = json!({
        "class": "MultiInterventionDistributor",
        "Intervention_List": interventions
    });

    if (target.rate - 1.0).abs() > f64::EPSILON && target.rate > 0.0 {
        json!({
            "class": "DelayedIntervention",
            "Delay_Period_Distribution": "EXPONENTIAL_DISTRIBUTION",
            "Delay_Period_Exponential": 1.0 / target.rate,
            "Actual_IndividualIntervention_Configs": [distributor]
        })
    } else {
        distributor
    }
}

/// Treatment seeking: a health-triggered layer per target that gives the
/// drug combination and broadcasts the treatment event.
pub fn add_health_seeking(
    mut config: SimConfig,
    params: &HealthSeekingParams,
) -> MsResult<SimConfig> {
    if params.drugs.is_empty() {
        return Err(validation_error!("treatment seeking requires at least one drug"));
    }

    for target in &params.targets {
        check_coverage("treatment seeking", target.coverage)?;
        check_coverage("care seeking", target.seek)?;

        let event = json!({
            "class": "CampaignEvent",
            "Start_Day": params.start_day,
            "Nodeset_Config": params.nodes,
            "Event_Coordinator_Config": {
                "class": "StandardInterventionDistributionEventCoordinator",
                "Number_Repetitions": params.repetitions,
                "Timesteps_Between_Repetitions": params.tsteps_btwn_repetitions,
                "Intervention_Config": {
                    "class": "NodeLevelHealthTriggeredIV",
                    "Trigger_Condition_List": [target.trigger],
                    "Demographic_Coverage": target.coverage * target.seek,
                    "Target_Demographic": "ExplicitAgeRanges",
                    "Target_Age_Min": target.agemin,
                    "Target_Age_Max": target.agemax,
                    "Duration": -1,
                    "Actual_IndividualIntervention_Config": treatment_config(params, target)
                }
            }
        });
        if config.add_event(event) {
            debug!(
                "Added treatment seeking on {} (coverage {}, ages {}-{})",
                target.trigger, target.coverage, target.agemin, target.agemax
            );
        }
    }

    Ok(config)
}

/// Bednets with age- and season-dependent usage.
pub fn add_itn_age_season(
    mut config: SimConfig,
    params: &ItnAgeSeasonParams,
) -> MsResult<SimConfig> {
    check_coverage("ITN", params.coverage_all)?;

    let usage = vec![
        WaningEffect::MapLinearAge {
            initial_effect: 1.0,
            durability_map: params.age_dependence.clone(),
        },
        WaningEffect::MapLinearSeasonal {
            initial_effect: 1.0,
            durability_map: params.seasonal_dependence.clone(),
        },
    ];

    let event = json!({
        "class": "CampaignEvent",
        "Start_Day": params.start,
        "Nodeset_Config": params.nodes,
        "Event_Coordinator_Config": {
            "class": "StandardInterventionDistributionEventCoordinator",
            "Demographic_Coverage": params.coverage_all,
            "Target_Demographic": "Everyone",
            "Duration": params.duration,
            "Intervention_Config": {
                "class": "UsageDependentBednet",
                "Bednet_Type": "ITN",
                "Cost_To_Consumer": params.cost,
                "Blocking_Config": params.blocking,
                "Killing_Config": params.killing,
                "Usage_Config_List": usage,
                "Received_Event": BEDNET_RECEIVED_EVENT,
                "Using_Event": BEDNET_USING_EVENT,
                "Discard_Event": BEDNET_DISCARDED_EVENT,
                "Expiration_Period_Distribution": "DUAL_EXPONENTIAL_DISTRIBUTION",
                "Expiration_Period_Mean_1": params.discard.halflife1,
                "Expiration_Period_Mean_2": params.discard.halflife2,
                "Expiration_Period_Proportion_1": params.discard.fraction1
            }
        }
    });
    if config.add_event(event) {
        debug!(
            "Added ITN age/season distribution at day {} (coverage {})",
            params.start, params.coverage_all
        );
    }

    Ok(config)
}
