use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ms_types::MsResult;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::PathBuf;
use uuid::Uuid;

/// Unique experiment identifier on the experiment service
pub type ExperimentId = Uuid;

/// One completed simulation of a prior experiment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationRecord {
    pub id: String,
    #[serde(default)]
    pub tags: BTreeMap<String, Value>,
    /// Working directory of the simulation; serialized state lives in its
    /// `output` subdirectory.
    pub path: PathBuf,
}

/// A prior experiment and its simulations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Experiment {
    pub id: ExperimentId,
    pub name: String,
    pub date_created: DateTime<Utc>,
    pub simulations: Vec<SimulationRecord>,
}

/// Read-only access to prior experiments
#[async_trait]
pub trait ExperimentStore: Send + Sync + std::fmt::Debug {
    /// Establish a session. Fails with `AuthenticationFailure`.
    async fn authenticate(&mut self) -> MsResult<()>;

    /// Most recent experiment recorded under `id`. Fails with
    /// `ExperimentNotFound` when there is none.
    async fn get_most_recent_experiment(&self, id: &ExperimentId) -> MsResult<Experiment>;

    /// Get store name
    fn name(&self) -> &str;

    /// Get store configuration
    fn config(&self) -> Value;
}

/// Pick the newest of several experiment records sharing an id.
pub(crate) fn most_recent(experiments: Vec<Experiment>) -> Option<Experiment> {
    experiments.into_iter().max_by_key(|e| e.date_created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn experiment(name: &str, day: u32) -> Experiment {
        Experiment {
            id: Uuid::nil(),
            name: name.to_string(),
            date_created: Utc.with_ymd_and_hms(2018, 6, day, 12, 0, 0).unwrap(),
            simulations: Vec::new(),
        }
    }

    #[test]
    fn most_recent_picks_latest_date() {
        let picked = most_recent(vec![
            experiment("first", 1),
            experiment("third", 20),
            experiment("second", 10),
        ])
        .unwrap();
        assert_eq!(picked.name, "third");
        assert!(most_recent(Vec::new()).is_none());
    }

    #[test]
    fn simulation_record_defaults_tags() {
        let record: SimulationRecord =
            serde_json::from_str(r#"{"id": "sim-1", "path": "/data/sim-1"}"#).unwrap();
        assert!(record.tags.is_empty());
        assert_eq!(record.path, PathBuf::from("/data/sim-1"));
    }
}
