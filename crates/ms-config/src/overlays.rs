//! Overlay steps used to assemble the baseline configuration.

use ms_types::{
    params, HealthSeekingParams, IrsParams, ItnAgeSeasonParams, MsResult, OverlaySpec, SimConfig,
    SpeciesProfile,
};
use serde_json::{json, Map, Value};
use tracing::{debug, info};

use crate::defaults::species_defaults;
use crate::interventions::{
    add_health_seeking, add_irs, add_itn_age_season, BEDNET_DISCARDED_EVENT,
    BEDNET_RECEIVED_EVENT, BEDNET_USING_EVENT,
};
use crate::pipeline::Overlay;

/// Within-host parasite parameters calibrated for these sites.
pub fn calibrated_within_host() -> Map<String, Value> {
    let mut params = Map::new();
    params.insert("Antigen_Switch_Rate".into(), json!(10f64.powf(-9.116590124)));
    params.insert("Base_Gametocyte_Production_Rate".into(), json!(0.06150582));
    params.insert("Base_Gametocyte_Mosquito_Survival_Rate".into(), json!(0.002011099));
    params.insert("Falciparum_MSP_Variants".into(), json!(32));
    params.insert("Falciparum_Nonspecific_Types".into(), json!(76));
    params.insert("Falciparum_PfEMP1_Variants".into(), json!(1070));
    params.insert("Gametocyte_Stage_Survival_Rate".into(), json!(0.588569307));
    params.insert("MSP1_Merozoite_Kill_Fraction".into(), json!(0.511735322));
    params.insert("Max_Individual_Infections".into(), json!(3));
    params.insert("Nonspecific_Antigenicity_Factor".into(), json!(0.415111634));
    params
}

/// Top-level scalar overrides applied right after template instantiation.
#[derive(Debug, Clone)]
pub struct ScalarOverrides {
    updates: Map<String, Value>,
}

impl ScalarOverrides {
    pub fn new(updates: Map<String, Value>) -> Self {
        Self { updates }
    }

    pub fn for_experiment(exp_name: &str, duration_days: u32, demographics: &str) -> Self {
        let mut updates = Map::new();
        updates.insert("Simulation_Duration".into(), json!(duration_days));
        updates.insert("Config_Name".into(), json!(exp_name));
        updates.insert("Demographics_Filenames".into(), json!([demographics]));
        updates.insert("Birth_Rate_Dependence".into(), json!("FIXED_BIRTH_RATE"));
        updates.insert("Num_Cores".into(), json!(1));
        updates.insert("Valid_Intervention_States".into(), json!([]));
        updates.insert(
            "Listed_Events".into(),
            json!([
                BEDNET_DISCARDED_EVENT,
                BEDNET_RECEIVED_EVENT,
                BEDNET_USING_EVENT
            ]),
        );
        updates.extend(calibrated_within_host());
        Self { updates }
    }
}

impl Overlay for ScalarOverrides {
    fn name(&self) -> &str {
        "scalar_overrides"
    }

    fn apply(&self, config: SimConfig) -> MsResult<SimConfig> {
        Ok(config.update_params(self.updates.clone()))
    }
}

/// Save population state at the listed time steps.
#[derive(Debug, Clone)]
pub struct SerializationStep {
    pub time_steps: Vec<u32>,
}

impl Overlay for SerializationStep {
    fn name(&self) -> &str {
        "serialization"
    }

    fn apply(&self, config: SimConfig) -> MsResult<SimConfig> {
        config.with_param(params::SERIALIZATION_TIME_STEPS, json!(self.time_steps))
    }
}

/// Attach the malaria summary report.
#[derive(Debug, Clone)]
pub struct SummaryReport {
    pub start_day: u32,
    pub interval: u32,
    pub age_bins: Vec<f64>,
    pub description: String,
}

impl Default for SummaryReport {
    fn default() -> Self {
        Self {
            start_day: 0,
            interval: 365,
            age_bins: vec![2.0, 10.0, 125.0],
            description: "Annual_Report".to_string(),
        }
    }
}

impl Overlay for SummaryReport {
    fn name(&self) -> &str {
        "summary_report"
    }

    fn apply(&self, mut config: SimConfig) -> MsResult<SimConfig> {
        config.add_report(json!({
            "class": "MalariaSummaryReport",
            "Report_Description": self.description,
            "Start_Day": self.start_day,
            "Reporting_Interval": self.interval,
            "Max_Number_Reports": 10000,
            "Age_Bins": self.age_bins,
            "Parasitemia_Bins": [0, 50, 200, 500, 2000000],
            "Infectiousness_Bins": [0, 100]
        }));
        Ok(config)
    }
}

/// Constant climate in every node.
#[derive(Debug, Clone)]
pub struct ConstantClimate {
    pub air_temperature: f64,
    pub land_temperature: f64,
    pub rainfall: f64,
    pub relative_humidity: f64,
}

impl Default for ConstantClimate {
    fn default() -> Self {
        Self {
            air_temperature: 27.0,
            land_temperature: 27.0,
            rainfall: 10.0,
            relative_humidity: 0.75,
        }
    }
}

impl Overlay for ConstantClimate {
    fn name(&self) -> &str {
        "constant_climate"
    }

    fn apply(&self, config: SimConfig) -> MsResult<SimConfig> {
        let mut updates = Map::new();
        updates.insert("Climate_Model".into(), json!("CLIMATE_CONSTANT"));
        updates.insert("Base_Air_Temperature".into(), json!(self.air_temperature));
        updates.insert("Base_Land_Temperature".into(), json!(self.land_temperature));
        updates.insert("Base_Rainfall".into(), json!(self.rainfall));
        updates.insert("Base_Relative_Humidity".into(), json!(self.relative_humidity));
        updates.insert("Enable_Climate_Stochasticity".into(), json!(0));
        Ok(config.update_params(updates))
    }
}

/// Register vector species and their seasonal larval habitat.
#[derive(Debug, Clone)]
pub struct SpeciesHabitat {
    pub species: Vec<SpeciesProfile>,
    pub adult_life_expectancy: f64,
    pub max_larval_capacity: f64,
}

impl SpeciesHabitat {
    pub fn new(species: Vec<SpeciesProfile>) -> Self {
        Self {
            species,
            adult_life_expectancy: 20.0,
            max_larval_capacity: 1e8,
        }
    }
}

impl Overlay for SpeciesHabitat {
    fn name(&self) -> &str {
        "species_habitat"
    }

    fn apply(&self, mut config: SimConfig) -> MsResult<SimConfig> {
        let names: Vec<&str> = self.species.iter().map(|s| s.name.as_str()).collect();
        config.set_param("Vector_Species_Names", json!(names))?;

        for species in &self.species {
            info!("Setting params for species {}", species.name);
            let prefix = format!("Vector_Species_Params.{}", species.name);
            config.set_param(&prefix, species_defaults(&species.name)?)?;
            config.set_param(
                &format!("{prefix}.Adult_Life_Expectancy"),
                json!(self.adult_life_expectancy),
            )?;
            config.set_param(
                &format!("{prefix}.Larval_Habitat_Types"),
                json!({
                    "LINEAR_SPLINE": {
                        "Capacity_Distribution_Over_Time": species.seasonality,
                        "Capacity_Distribution_Number_Of_Years": 1,
                        "Max_Larval_Capacity": self.max_larval_capacity
                    }
                }),
            )?;
        }
        Ok(config)
    }
}

/// Event recorder report settings.
///
/// `ignore_events_in_list` is passed to the engine verbatim; its meaning is
/// the engine's.
#[derive(Debug, Clone)]
pub struct EventRecorder {
    pub events: Vec<String>,
    pub ignore_events_in_list: u8,
}

impl Default for EventRecorder {
    fn default() -> Self {
        Self {
            events: vec![BEDNET_USING_EVENT.to_string()],
            ignore_events_in_list: 0,
        }
    }
}

impl Overlay for EventRecorder {
    fn name(&self) -> &str {
        "event_recorder"
    }

    fn apply(&self, config: SimConfig) -> MsResult<SimConfig> {
        let mut updates = Map::new();
        updates.insert("Report_Event_Recorder".into(), json!(1));
        updates.insert("Report_Event_Recorder_Events".into(), json!(self.events));
        updates.insert(
            "Report_Event_Recorder_Ignore_Events_In_List".into(),
            json!(self.ignore_events_in_list),
        );
        Ok(config.update_params(updates))
    }
}

#[derive(Debug, Clone)]
pub struct IrsOverlay(pub IrsParams);

impl Overlay for IrsOverlay {
    fn name(&self) -> &str {
        "irs"
    }

    fn apply(&self, config: SimConfig) -> MsResult<SimConfig> {
        let (config, summary) = add_irs(config, &self.0)?;
        debug!("IRS summary: {:?}", summary);
        Ok(config)
    }
}

#[derive(Debug, Clone)]
pub struct HealthSeekingOverlay(pub HealthSeekingParams);

impl Overlay for HealthSeekingOverlay {
    fn name(&self) -> &str {
        "health_seeking"
    }

    fn apply(&self, config: SimConfig) -> MsResult<SimConfig> {
        add_health_seeking(config, &self.0)
    }
}

#[derive(Debug, Clone)]
pub struct ItnAgeSeasonOverlay(pub ItnAgeSeasonParams);

impl Overlay for ItnAgeSeasonOverlay {
    fn name(&self) -> &str {
        "itn_age_season"
    }

    fn apply(&self, config: SimConfig) -> MsResult<SimConfig> {
        add_itn_age_season(config, &self.0)
    }
}

/// Overlay step for an intervention named in a modification set.
pub fn intervention_overlay(spec: &OverlaySpec) -> Box<dyn Overlay> {
    match spec {
        OverlaySpec::ItnAgeSeason(p) => Box::new(ItnAgeSeasonOverlay(p.clone())),
        OverlaySpec::Irs(p) => Box::new(IrsOverlay(p.clone())),
        OverlaySpec::HealthSeeking(p) => Box::new(HealthSeekingOverlay(p.clone())),
    }
}
