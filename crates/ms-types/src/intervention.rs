use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::MsError;

/// Interventions that can be requested for the baseline configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterventionKind {
    /// Insecticide-treated nets, distributed by age and season
    Itn,
    /// Indoor residual spraying
    Irs,
    /// Treatment seeking with artemisinin combination therapy
    Act,
}

impl fmt::Display for InterventionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Itn => write!(f, "itn"),
            Self::Irs => write!(f, "irs"),
            Self::Act => write!(f, "act"),
        }
    }
}

impl FromStr for InterventionKind {
    type Err = MsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "itn" => Ok(Self::Itn),
            "irs" => Ok(Self::Irs),
            "act" => Ok(Self::Act),
            other => Err(MsError::Validation(format!("unknown intervention: {other}"))),
        }
    }
}

/// Time/value lookup table used by map-based waning effects
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DurabilityMap {
    #[serde(rename = "Times")]
    pub times: Vec<f64>,
    #[serde(rename = "Values")]
    pub values: Vec<f64>,
}

/// Time-decaying efficacy curve attached to an intervention
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "class")]
pub enum WaningEffect {
    #[serde(rename = "WaningEffectExponential")]
    Exponential {
        #[serde(rename = "Initial_Effect")]
        initial_effect: f64,
        #[serde(rename = "Decay_Time_Constant")]
        decay_time_constant: f64,
    },
    #[serde(rename = "WaningEffectMapLinearAge")]
    MapLinearAge {
        #[serde(rename = "Initial_Effect")]
        initial_effect: f64,
        #[serde(rename = "Durability_Map")]
        durability_map: DurabilityMap,
    },
    #[serde(rename = "WaningEffectMapLinearSeasonal")]
    MapLinearSeasonal {
        #[serde(rename = "Initial_Effect")]
        initial_effect: f64,
        #[serde(rename = "Durability_Map")]
        durability_map: DurabilityMap,
    },
}

impl WaningEffect {
    pub fn exponential(initial_effect: f64, decay_time_constant: f64) -> Self {
        Self::Exponential {
            initial_effect,
            decay_time_constant,
        }
    }
}

/// Node selection for campaign events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "class")]
pub enum NodeSet {
    NodeSetAll,
    NodeSetNodeList {
        #[serde(rename = "Node_List")]
        node_list: Vec<u32>,
    },
}

impl Default for NodeSet {
    fn default() -> Self {
        Self::NodeSetAll
    }
}

/// Age band receiving an intervention at a given coverage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverageBand {
    pub min: f64,
    pub max: f64,
    pub coverage: f64,
}

/// Indoor residual spraying layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IrsParams {
    pub coverage: f64,
    pub start_days: Vec<u32>,
    /// Killing effect decay time constant, in days.
    pub decay: u32,
}

impl Default for IrsParams {
    fn default() -> Self {
        Self {
            coverage: 1.0,
            start_days: vec![60],
            decay: 270,
        }
    }
}

/// Bookkeeping record returned by the IRS builder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IrsSummary {
    #[serde(rename = "IRS_halflife")]
    pub halflife: u32,
    #[serde(rename = "IRS_start")]
    pub start: u32,
    #[serde(rename = "Coverage")]
    pub coverage: f64,
}

/// One trigger/coverage target of a treatment-seeking layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthSeekingTarget {
    pub trigger: String,
    pub coverage: f64,
    pub agemin: f64,
    pub agemax: f64,
    /// Probability that a triggered individual seeks care.
    pub seek: f64,
    /// Rate of seeking care per day; 1 means same-day treatment.
    pub rate: f64,
}

/// Repeating treatment-seeking layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthSeekingParams {
    pub targets: Vec<HealthSeekingTarget>,
    pub drugs: Vec<String>,
    pub dosing: String,
    #[serde(default)]
    pub nodes: NodeSet,
    pub start_day: u32,
    pub repetitions: i32,
    pub tsteps_btwn_repetitions: u32,
    pub broadcast_event_name: String,
}

impl Default for HealthSeekingParams {
    fn default() -> Self {
        Self {
            targets: vec![HealthSeekingTarget {
                trigger: "NewClinicalCase".to_string(),
                coverage: 0.8,
                agemin: 0.0,
                agemax: 100.0,
                seek: 1.0,
                rate: 1.0,
            }],
            drugs: vec!["Artemether".to_string(), "Lumefantrine".to_string()],
            dosing: "FullTreatmentNewDetectionTech".to_string(),
            nodes: NodeSet::NodeSetAll,
            start_day: 0,
            repetitions: 1,
            tsteps_btwn_repetitions: 365,
            broadcast_event_name: "Received_Treatment".to_string(),
        }
    }
}

/// Net retention: dual exponential discard curve
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscardConfig {
    pub halflife1: f64,
    pub halflife2: f64,
    pub fraction1: f64,
}

impl Default for DiscardConfig {
    fn default() -> Self {
        Self {
            halflife1: 260.0,
            halflife2: 2106.0,
            fraction1: 0.1,
        }
    }
}

/// Bednet distribution with age- and season-dependent usage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItnAgeSeasonParams {
    pub start: u32,
    pub coverage_all: f64,
    pub blocking: WaningEffect,
    pub killing: WaningEffect,
    pub age_dependence: DurabilityMap,
    pub seasonal_dependence: DurabilityMap,
    pub discard: DiscardConfig,
    #[serde(default)]
    pub nodes: NodeSet,
    pub cost: f64,
    /// Distribution duration in days; -1 means a single distribution.
    pub duration: i32,
}

impl ItnAgeSeasonParams {
    pub fn with_coverage(coverage_all: f64) -> Self {
        Self {
            coverage_all,
            ..Self::default()
        }
    }
}

impl Default for ItnAgeSeasonParams {
    fn default() -> Self {
        Self {
            start: 1,
            coverage_all: 1.0,
            blocking: WaningEffect::exponential(0.9, 7300.0),
            killing: WaningEffect::exponential(0.6, 7300.0),
            age_dependence: DurabilityMap {
                times: vec![0.0, 100.0],
                values: vec![1.0, 1.0],
            },
            seasonal_dependence: DurabilityMap {
                times: vec![0.0, 365.0],
                values: vec![1.0, 1.0],
            },
            discard: DiscardConfig::default(),
            nodes: NodeSet::NodeSetAll,
            cost: 5.0,
            duration: -1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn intervention_kind_parses_case_insensitively() {
        assert_eq!("ITN".parse::<InterventionKind>().unwrap(), InterventionKind::Itn);
        assert_eq!("act".parse::<InterventionKind>().unwrap(), InterventionKind::Act);
        assert!("smc".parse::<InterventionKind>().is_err());
    }

    #[test]
    fn waning_effect_carries_engine_class() {
        let waning = WaningEffect::exponential(0.6, 180.0);
        let json = serde_json::to_value(&waning).unwrap();
        assert_eq!(
            json,
            json!({
                "class": "WaningEffectExponential",
                "Initial_Effect": 0.6,
                "Decay_Time_Constant": 180.0
            })
        );
    }

    #[test]
    fn irs_summary_uses_bookkeeping_keys() {
        let summary = IrsSummary {
            halflife: 180,
            start: 60,
            coverage: 0.8,
        };
        assert_eq!(
            serde_json::to_value(&summary).unwrap(),
            json!({"IRS_halflife": 180, "IRS_start": 60, "Coverage": 0.8})
        );
    }

    #[test]
    fn node_set_all_is_default() {
        let json = serde_json::to_value(NodeSet::default()).unwrap();
        assert_eq!(json, json!({"class": "NodeSetAll"}));
    }

    #[test]
    fn itn_with_coverage_keeps_defaults() {
        let params = ItnAgeSeasonParams::with_coverage(0.35);
        assert_eq!(params.coverage_all, 0.35);
        assert_eq!(params.start, 1);
        assert_eq!(params.duration, -1);
    }
}
