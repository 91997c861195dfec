use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::errors::{ArchetypeError, MsResult};

/// Seasonal larval capacity curve as parallel time/value sequences.
///
/// Values are fractions of the species' maximum larval capacity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Seasonality {
    #[serde(rename = "Times")]
    pub times: Vec<f64>,
    #[serde(rename = "Values")]
    pub values: Vec<f64>,
}

impl Seasonality {
    pub fn new(times: Vec<f64>, values: Vec<f64>) -> Self {
        Self { times, values }
    }
}

/// One vector species and its seasonal habitat curve
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeciesProfile {
    pub name: String,
    pub seasonality: Seasonality,
}

/// Named bundle of demographics and vector species configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Archetype {
    pub name: String,
    pub demographics: String,
    pub species: Vec<SpeciesProfile>,
}

impl Archetype {
    pub fn species_names(&self) -> Vec<String> {
        self.species.iter().map(|s| s.name.clone()).collect()
    }
}

/// Immutable lookup of archetypes by exact name
#[derive(Debug, Clone, Default)]
pub struct ArchetypeRegistry {
    archetypes: BTreeMap<String, Archetype>,
}

impl ArchetypeRegistry {
    pub fn new(archetypes: Vec<Archetype>) -> MsResult<Self> {
        let mut map = BTreeMap::new();
        for archetype in archetypes {
            for species in &archetype.species {
                let times = species.seasonality.times.len();
                let values = species.seasonality.values.len();
                if times != values {
                    return Err(ArchetypeError::MismatchedSeasonality {
                        species: species.name.clone(),
                        times,
                        values,
                    }
                    .into());
                }
            }
            map.insert(archetype.name.clone(), archetype);
        }
        Ok(Self { archetypes: map })
    }

    /// Registry holding the site archetypes shipped with the planner.
    pub fn builtin() -> Self {
        let karen = Archetype {
            name: "karen".to_string(),
            demographics: "demog/demog_karen.json".to_string(),
            species: vec![SpeciesProfile {
                name: "minimus".to_string(),
                seasonality: Seasonality::new(
                    vec![0.0, 1.0, 244.0, 274.0, 363.0],
                    vec![0.2, 0.2, 0.7, 3.0, 3.0],
                ),
            }],
        };

        let moine = Archetype {
            name: "moine".to_string(),
            demographics: "demog/demog_moine.json".to_string(),
            species: vec![SpeciesProfile {
                name: "gambiae".to_string(),
                seasonality: Seasonality::new(
                    vec![
                        0.0, 30.417, 60.833, 91.25, 121.667, 152.083, 182.5, 212.917, 243.333,
                        273.75, 304.167, 334.583,
                    ],
                    vec![
                        0.0429944166751962,
                        0.145106159922212,
                        0.220520011001099,
                        0.318489404300663,
                        0.0617610600835594,
                        0.0462380862878181,
                        0.0367590381502996,
                        0.02474944109524821,
                        0.0300445801767523,
                        0.021859890543704,
                        0.0261404367939001,
                        0.0253992634551118,
                    ],
                ),
            }],
        };

        let mut archetypes = BTreeMap::new();
        archetypes.insert(karen.name.clone(), karen);
        archetypes.insert(moine.name.clone(), moine);
        Self { archetypes }
    }

    /// Fails with `UnknownArchetype` when `name` is not registered.
    pub fn get(&self, name: &str) -> MsResult<&Archetype> {
        self.archetypes.get(name).ok_or_else(|| {
            ArchetypeError::UnknownArchetype {
                name: name.to_string(),
            }
            .into()
        })
    }

    pub fn names(&self) -> Vec<&str> {
        self.archetypes.keys().map(String::as_str).collect()
    }
}
