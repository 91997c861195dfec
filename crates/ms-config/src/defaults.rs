//! Default configuration templates and per-species vector parameters.

use ms_types::{ArchetypeError, MsResult, SimConfig};
use serde_json::{json, Map, Value};

pub const MALARIA_SIM: &str = "MALARIA_SIM";

/// Instantiate a named default configuration.
pub fn from_defaults(template: &str) -> MsResult<SimConfig> {
    let parameters = match template {
        MALARIA_SIM => malaria_sim_defaults(),
        other => {
            return Err(ArchetypeError::UnknownTemplate {
                name: other.to_string(),
            }
            .into())
        }
    };
    Ok(SimConfig::new(parameters))
}

fn malaria_sim_defaults() -> Map<String, Value> {
    let defaults = json!({
        "Simulation_Type": "MALARIA_SIM",
        "Simulation_Duration": 365,
        "Simulation_Timestep": 1,
        "Start_Time": 0,
        "Config_Name": "",
        "Run_Number": 0,
        "Num_Cores": 1,
        "Demographics_Filenames": [],
        "Enable_Demographics_Builtin": 0,
        "Enable_Vital_Dynamics": 1,
        "Enable_Birth": 1,
        "Birth_Rate_Dependence": "POPULATION_DEP_RATE",
        "Death_Rate_Dependence": "NONDISEASE_MORTALITY_BY_AGE_AND_GENDER",
        "Enable_Interventions": 1,
        "Campaign_Filename": "campaign.json",
        "Listed_Events": [],
        "Valid_Intervention_States": [],
        "Climate_Model": "CLIMATE_BY_DATA",
        "Vector_Species_Names": [],
        "Vector_Species_Params": {},
        "Vector_Sampling_Type": "VECTOR_COMPARTMENTS_NUMBER",
        "x_Temporary_Larval_Habitat": 1,
        "Malaria_Model": "MALARIA_MECHANISTIC_MODEL",
        "Malaria_Drug_Params": {},
        "Antigen_Switch_Rate": 2.96e-9,
        "Base_Gametocyte_Production_Rate": 0.0615,
        "Base_Gametocyte_Mosquito_Survival_Rate": 0.00088,
        "Falciparum_MSP_Variants": 32,
        "Falciparum_Nonspecific_Types": 76,
        "Falciparum_PfEMP1_Variants": 1070,
        "Gametocyte_Stage_Survival_Rate": 0.5886,
        "MSP1_Merozoite_Kill_Fraction": 0.511735322,
        "Max_Individual_Infections": 3,
        "Nonspecific_Antigenicity_Factor": 0.415111634,
        "Report_Event_Recorder": 0,
        "Enable_Default_Reporting": 1,
        "Serialization_Time_Steps": [],
        "Serialized_Population_Path": "",
        "Serialized_Population_Filenames": []
    });
    match defaults {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

/// Default vector parameters for a known species.
pub fn species_defaults(species: &str) -> MsResult<Value> {
    let params = match species {
        "gambiae" => json!({
            "Acquire_Modifier": 0.2,
            "Adult_Life_Expectancy": 20,
            "Anthropophily": 0.85,
            "Aquatic_Arrhenius_1": 84200000000.0,
            "Aquatic_Arrhenius_2": 8328,
            "Aquatic_Mortality_Rate": 0.1,
            "Days_Between_Feeds": 3,
            "Egg_Batch_Size": 100,
            "Immature_Duration": 2,
            "Indoor_Feeding_Fraction": 0.95,
            "Infected_Arrhenius_1": 117000000000.0,
            "Infected_Arrhenius_2": 8336,
            "Infected_Egg_Batch_Factor": 0.8,
            "Infectious_Human_Feed_Mortality_Factor": 1.5,
            "Larval_Habitat_Types": {"TEMPORARY_RAINFALL": 11250000000.0},
            "Transmission_Rate": 0.9,
            "Vector_Sugar_Feeding_Frequency": "VECTOR_SUGAR_FEEDING_NONE"
        }),
        "minimus" => json!({
            "Acquire_Modifier": 0.2,
            "Adult_Life_Expectancy": 20,
            "Anthropophily": 0.5,
            "Aquatic_Arrhenius_1": 84200000000.0,
            "Aquatic_Arrhenius_2": 8328,
            "Aquatic_Mortality_Rate": 0.1,
            "Days_Between_Feeds": 3,
            "Egg_Batch_Size": 100,
            "Immature_Duration": 4,
            "Indoor_Feeding_Fraction": 0.6,
            "Infected_Arrhenius_1": 117000000000.0,
            "Infected_Arrhenius_2": 8336,
            "Infected_Egg_Batch_Factor": 0.8,
            "Infectious_Human_Feed_Mortality_Factor": 1.5,
            "Larval_Habitat_Types": {"WATER_VEGETATION": 20000000.0},
            "Transmission_Rate": 0.9,
            "Vector_Sugar_Feeding_Frequency": "VECTOR_SUGAR_FEEDING_NONE"
        }),
        "funestus" => json!({
            "Acquire_Modifier": 0.2,
            "Adult_Life_Expectancy": 20,
            "Anthropophily": 0.65,
            "Aquatic_Arrhenius_1": 84200000000.0,
            "Aquatic_Arrhenius_2": 8328,
            "Aquatic_Mortality_Rate": 0.1,
            "Days_Between_Feeds": 3,
            "Egg_Batch_Size": 100,
            "Immature_Duration": 2,
            "Indoor_Feeding_Fraction": 0.95,
            "Infected_Arrhenius_1": 117000000000.0,
            "Infected_Arrhenius_2": 8336,
            "Infected_Egg_Batch_Factor": 0.8,
            "Infectious_Human_Feed_Mortality_Factor": 1.5,
            "Larval_Habitat_Types": {"WATER_VEGETATION": 2000000000.0},
            "Transmission_Rate": 0.9,
            "Vector_Sugar_Feeding_Frequency": "VECTOR_SUGAR_FEEDING_NONE"
        }),
        other => {
            return Err(ArchetypeError::UnknownSpecies {
                name: other.to_string(),
            }
            .into())
        }
    };
    Ok(params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ms_types::MsError;

    #[test]
    fn malaria_template_has_simulation_type() {
        let config = from_defaults(MALARIA_SIM).unwrap();
        assert_eq!(config.get_param("Simulation_Type"), Some(&json!("MALARIA_SIM")));
        assert!(config.campaign.events.is_empty());
        assert!(config.custom_reports.is_empty());
    }

    #[test]
    fn unknown_template_fails() {
        let err = from_defaults("GENERIC_SIM").unwrap_err();
        assert!(matches!(
            err,
            MsError::Archetype(ArchetypeError::UnknownTemplate { .. })
        ));
    }

    #[test]
    fn species_defaults_known_and_unknown() {
        let gambiae = species_defaults("gambiae").unwrap();
        assert_eq!(gambiae["Anthropophily"], json!(0.85));
        assert!(species_defaults("stephensi").is_err());
    }
}
