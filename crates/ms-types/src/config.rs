use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeSet;

use crate::errors::{MsResult, SweepError};

/// Campaign file contents: the intervention events distributed during a run.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Campaign {
    #[serde(rename = "Use_Defaults")]
    pub use_defaults: bool,
    #[serde(rename = "Events")]
    pub events: Vec<Value>,
}

/// Engine configuration under construction.
///
/// `parameters` is the engine's config object; nested keys are addressed with
/// dotted paths such as `Vector_Species_Params.gambiae.Adult_Life_Expectancy`.
/// The schema belongs to the engine, this type only stores it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SimConfig {
    pub parameters: Map<String, Value>,
    pub campaign: Campaign,
    #[serde(default)]
    pub custom_reports: Vec<Value>,
}

/// Keys and entry counts present in a configuration at one point in time.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Footprint {
    pub param_paths: BTreeSet<String>,
    pub events: usize,
    pub reports: usize,
}

impl Footprint {
    /// First key of `self` that is absent from `later`, if any.
    pub fn first_missing_in(&self, later: &Footprint) -> Option<String> {
        if let Some(path) = self
            .param_paths
            .iter()
            .find(|path| !later.param_paths.contains(*path))
        {
            return Some(path.clone());
        }
        if later.events < self.events {
            return Some(format!("Events[{}]", later.events));
        }
        if later.reports < self.reports {
            return Some(format!("Custom_Reports[{}]", later.reports));
        }
        None
    }
}

impl SimConfig {
    pub fn new(parameters: Map<String, Value>) -> Self {
        Self {
            parameters,
            campaign: Campaign::default(),
            custom_reports: Vec::new(),
        }
    }

    /// Set a parameter, creating intermediate objects along a dotted path.
    pub fn set_param(&mut self, path: &str, value: Value) -> MsResult<()> {
        let mut segments = path.split('.').peekable();
        let mut current = &mut self.parameters;
        while let Some(segment) = segments.next() {
            if segments.peek().is_none() {
                current.insert(segment.to_string(), value);
                return Ok(());
            }
            let entry = current
                .entry(segment.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            current = entry.as_object_mut().ok_or_else(|| SweepError::InvalidPath {
                path: path.to_string(),
            })?;
        }
        Err(SweepError::InvalidPath {
            path: path.to_string(),
        }
        .into())
    }

    pub fn with_param(mut self, path: &str, value: Value) -> MsResult<Self> {
        self.set_param(path, value)?;
        Ok(self)
    }

    /// Apply a flat set of top-level updates.
    pub fn update_params(mut self, updates: Map<String, Value>) -> Self {
        for (key, value) in updates {
            self.parameters.insert(key, value);
        }
        self
    }

    pub fn get_param(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let first = segments.next()?;
        let mut current = self.parameters.get(first)?;
        for segment in segments {
            current = current.as_object()?.get(segment)?;
        }
        Some(current)
    }

    /// Append a campaign event unless an identical one is already present.
    ///
    /// Returns `true` when the event was added.
    pub fn add_event(&mut self, event: Value) -> bool {
        if self.campaign.events.contains(&event) {
            return false;
        }
        self.campaign.events.push(event);
        true
    }

    /// Attach a custom report unless an identical one is already present.
    pub fn add_report(&mut self, report: Value) -> bool {
        if self.custom_reports.contains(&report) {
            return false;
        }
        self.custom_reports.push(report);
        true
    }

    pub fn footprint(&self) -> Footprint {
        let mut param_paths = BTreeSet::new();
        collect_paths(&self.parameters, "", &mut param_paths);
        Footprint {
            param_paths,
            events: self.campaign.events.len(),
            reports: self.custom_reports.len(),
        }
    }
}

fn collect_paths(map: &Map<String, Value>, prefix: &str, out: &mut BTreeSet<String>) {
    for (key, value) in map {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        if let Value::Object(inner) = value {
            collect_paths(inner, &path, out);
        }
        out.insert(path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::MsError;
    use serde_json::json;

    #[test]
    fn set_param_creates_nested_objects() {
        let mut config = SimConfig::default();
        config
            .set_param("Vector_Species_Params.gambiae.Adult_Life_Expectancy", json!(20))
            .unwrap();

        assert_eq!(
            config.get_param("Vector_Species_Params.gambiae.Adult_Life_Expectancy"),
            Some(&json!(20))
        );
        assert!(config.get_param("Vector_Species_Params.funestus").is_none());
    }

    #[test]
    fn set_param_through_scalar_fails() {
        let mut config = SimConfig::default();
        config.set_param("Run_Number", json!(3)).unwrap();
        let err = config.set_param("Run_Number.inner", json!(1)).unwrap_err();
        assert!(matches!(err, MsError::Sweep(SweepError::InvalidPath { .. })));
    }

    #[test]
    fn duplicate_events_are_not_added() {
        let mut config = SimConfig::default();
        let event = json!({"class": "CampaignEvent", "Start_Day": 60});
        assert!(config.add_event(event.clone()));
        assert!(!config.add_event(event));
        assert_eq!(config.campaign.events.len(), 1);
    }

    #[test]
    fn footprint_detects_removed_keys() {
        let before = SimConfig::default()
            .with_param("Report_Event_Recorder", json!(1))
            .unwrap()
            .with_param("Vector_Species_Params.gambiae.Adult_Life_Expectancy", json!(20))
            .unwrap();

        let mut after = before.clone();
        after.parameters.remove("Report_Event_Recorder");

        let missing = before.footprint().first_missing_in(&after.footprint());
        assert_eq!(missing.as_deref(), Some("Report_Event_Recorder"));

        let grown = before
            .clone()
            .with_param("Climate_Model", json!("CLIMATE_CONSTANT"))
            .unwrap();
        assert!(before.footprint().first_missing_in(&grown.footprint()).is_none());
    }

    #[test]
    fn campaign_serializes_with_engine_keys() {
        let mut config = SimConfig::default();
        config.add_event(json!({"class": "CampaignEvent"}));
        let json = serde_json::to_value(&config.campaign).unwrap();
        assert_eq!(json["Use_Defaults"], json!(false));
        assert_eq!(json["Events"].as_array().unwrap().len(), 1);
    }
}
