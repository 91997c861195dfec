use async_trait::async_trait;
use ms_types::{MsResult, StoreError};
use std::path::{Path, PathBuf};

use crate::store::{most_recent, Experiment, ExperimentId, ExperimentStore};

/// Offline experiment store backed by JSON manifests.
///
/// Every `*.json` file in the directory holds one [`Experiment`]. Several
/// manifests may share an id; the newest `date_created` wins.
#[derive(Debug)]
pub struct ManifestStore {
    pub name: String,
    pub directory: PathBuf,
}

impl ManifestStore {
    pub fn new<P: AsRef<Path>>(directory: P) -> Self {
        Self {
            name: "Manifest Store".to_string(),
            directory: directory.as_ref().to_path_buf(),
        }
    }

    async fn load_all(&self) -> MsResult<Vec<Experiment>> {
        let mut entries = tokio::fs::read_dir(&self.directory).await.map_err(|_| {
            StoreError::PathNotFound {
                path: self.directory.to_string_lossy().to_string(),
            }
        })?;

        let mut experiments = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let contents = tokio::fs::read_to_string(&path).await?;
            let experiment: Experiment =
                serde_json::from_str(&contents).map_err(|e| StoreError::ParseError {
                    message: format!("{}: {}", path.display(), e),
                })?;
            experiments.push(experiment);
        }
        Ok(experiments)
    }
}

#[async_trait]
impl ExperimentStore for ManifestStore {
    async fn authenticate(&mut self) -> MsResult<()> {
        if !self.directory.is_dir() {
            return Err(StoreError::AuthenticationFailure {
                url: self.directory.to_string_lossy().to_string(),
                message: "manifest directory does not exist".to_string(),
            }
            .into());
        }
        Ok(())
    }

    async fn get_most_recent_experiment(&self, id: &ExperimentId) -> MsResult<Experiment> {
        tracing::info!("Looking up experiment {} in {}", id, self.directory.display());

        let matching: Vec<Experiment> = self
            .load_all()
            .await?
            .into_iter()
            .filter(|e| &e.id == id)
            .collect();

        let experiment = most_recent(matching).ok_or_else(|| StoreError::ExperimentNotFound {
            experiment_id: id.to_string(),
        })?;

        tracing::info!(
            "Found experiment {} with {} simulations",
            experiment.name,
            experiment.simulations.len()
        );
        Ok(experiment)
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn config(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "manifest",
            "directory": self.directory
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::SimulationRecord;
    use chrono::{TimeZone, Utc};
    use ms_types::MsError;
    use std::collections::BTreeMap;
    use uuid::Uuid;

    fn write_manifest(dir: &Path, file: &str, experiment: &Experiment) {
        let json = serde_json::to_string_pretty(experiment).unwrap();
        std::fs::write(dir.join(file), json).unwrap();
    }

    fn experiment(id: Uuid, name: &str, day: u32, sims: usize) -> Experiment {
        Experiment {
            id,
            name: name.to_string(),
            date_created: Utc.with_ymd_and_hms(2018, 6, day, 0, 0, 0).unwrap(),
            simulations: (0..sims)
                .map(|i| SimulationRecord {
                    id: format!("sim-{i}"),
                    tags: BTreeMap::new(),
                    path: PathBuf::from(format!("/sims/{i}")),
                })
                .collect(),
        }
    }

    #[tokio::test]
    async fn returns_most_recent_matching_experiment() {
        let dir = tempfile::tempdir().unwrap();
        let id = Uuid::new_v4();
        write_manifest(dir.path(), "old.json", &experiment(id, "old", 1, 1));
        write_manifest(dir.path(), "new.json", &experiment(id, "new", 15, 3));
        write_manifest(dir.path(), "other.json", &experiment(Uuid::new_v4(), "other", 28, 2));
        std::fs::write(dir.path().join("README.txt"), "not a manifest").unwrap();

        let mut store = ManifestStore::new(dir.path());
        store.authenticate().await.unwrap();
        let found = store.get_most_recent_experiment(&id).await.unwrap();

        assert_eq!(found.name, "new");
        assert_eq!(found.simulations.len(), 3);
    }

    #[tokio::test]
    async fn unknown_id_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        write_manifest(dir.path(), "a.json", &experiment(Uuid::new_v4(), "a", 1, 1));

        let store = ManifestStore::new(dir.path());
        let missing = Uuid::new_v4();
        match store.get_most_recent_experiment(&missing).await {
            Err(MsError::Store(StoreError::ExperimentNotFound { experiment_id })) => {
                assert_eq!(experiment_id, missing.to_string())
            }
            other => panic!("expected ExperimentNotFound, got {other:?}"),
        }
    }

    #[test]
    fn missing_directory_fails_authentication() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = ManifestStore::new(dir.path().join("nope"));
        let result = tokio_test::block_on(store.authenticate());
        assert!(matches!(
            result,
            Err(MsError::Store(StoreError::AuthenticationFailure { .. }))
        ));
    }

    #[tokio::test]
    async fn malformed_manifest_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("broken.json"), "{ not json").unwrap();
        let store = ManifestStore::new(dir.path());
        let result = store.get_most_recent_experiment(&Uuid::new_v4()).await;
        assert!(matches!(
            result,
            Err(MsError::Store(StoreError::ParseError { .. }))
        ));
    }
}
