use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;

use crate::intervention::{HealthSeekingParams, IrsParams, ItnAgeSeasonParams};

/// Well-known parameter names touched by sweeps
pub mod params {
    pub const RUN_NUMBER: &str = "Run_Number";
    pub const LARVAL_HABITAT_MULTIPLIER: &str = "x_Temporary_Larval_Habitat";
    pub const SERIALIZED_POPULATION_PATH: &str = "Serialized_Population_Path";
    pub const SERIALIZED_POPULATION_FILENAMES: &str = "Serialized_Population_Filenames";
    pub const SERIALIZATION_TIME_STEPS: &str = "Serialization_Time_Steps";
}

/// Intervention overlay applied to a run's campaign
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum OverlaySpec {
    ItnAgeSeason(ItnAgeSeasonParams),
    Irs(IrsParams),
    HealthSeeking(HealthSeekingParams),
}

/// One deviation from the baseline configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Modification {
    SetParam { path: String, value: Value },
    Overlay { overlay: OverlaySpec },
}

impl Modification {
    pub fn set_param(path: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::SetParam {
            path: path.into(),
            value: value.into(),
        }
    }

    pub fn overlay(overlay: OverlaySpec) -> Self {
        Self::Overlay { overlay }
    }

    /// Tags recorded on the submitted run for this modification.
    pub fn tags(&self) -> BTreeMap<String, Value> {
        let mut tags = BTreeMap::new();
        match self {
            Self::SetParam { path, value } => {
                tags.insert(path.clone(), value.clone());
            }
            Self::Overlay { overlay } => match overlay {
                OverlaySpec::ItnAgeSeason(itn) => {
                    tags.insert("ITN_Start".to_string(), json!(itn.start));
                    tags.insert("ITN_Coverage".to_string(), json!(itn.coverage_all));
                }
                OverlaySpec::Irs(irs) => {
                    tags.insert("IRS_halflife".to_string(), json!(irs.decay));
                    tags.insert(
                        "IRS_start".to_string(),
                        json!(irs.start_days.first().copied()),
                    );
                    tags.insert("Coverage".to_string(), json!(irs.coverage));
                }
                OverlaySpec::HealthSeeking(hs) => {
                    let coverage = hs.targets.first().map(|t| t.coverage);
                    tags.insert("Health_Seeking_Coverage".to_string(), json!(coverage));
                }
            },
        }
        tags
    }
}

/// Ordered list of modifications describing one simulation run
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ModificationSet {
    pub modifications: Vec<Modification>,
}

impl ModificationSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_param(mut self, path: impl Into<String>, value: impl Into<Value>) -> Self {
        self.modifications.push(Modification::set_param(path, value));
        self
    }

    pub fn overlay(mut self, overlay: OverlaySpec) -> Self {
        self.modifications.push(Modification::overlay(overlay));
        self
    }

    pub fn len(&self) -> usize {
        self.modifications.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modifications.is_empty()
    }

    /// Value assigned to `path` by this set, if any. Later assignments win.
    pub fn param(&self, path: &str) -> Option<&Value> {
        self.modifications.iter().rev().find_map(|m| match m {
            Modification::SetParam { path: p, value } if p == path => Some(value),
            _ => None,
        })
    }

    pub fn overlays(&self) -> impl Iterator<Item = &OverlaySpec> {
        self.modifications.iter().filter_map(|m| match m {
            Modification::Overlay { overlay } => Some(overlay),
            _ => None,
        })
    }

    /// Merged run tags, in modification order.
    pub fn tags(&self) -> BTreeMap<String, Value> {
        let mut tags = BTreeMap::new();
        for modification in &self.modifications {
            tags.extend(modification.tags());
        }
        tags
    }
}
