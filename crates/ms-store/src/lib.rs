//! # ms-store
//!
//! Access to prior experiments and their serialized population state.
//!
//! Resume sweeps start from simulations recorded on the COMPS
//! experiment-tracking service (or an offline manifest directory). This crate
//! fetches the most recent experiment for an id, tabulates one resume row per
//! simulation, and lists the serialized-state files in each simulation's
//! output directory.

pub mod comps;
pub mod listing;
pub mod manifest;
pub mod metadata;
pub mod store;

pub use comps::{CompsClient, PathRewrite};
pub use listing::{list_state_files, select_state_files, STATE_FILE_MARKER};
pub use manifest::ManifestStore;
pub use metadata::{export_csv, fetch_resume_rows, resume_rows, ResumeRow, OUTPUT_SUBDIR};
pub use store::{Experiment, ExperimentId, ExperimentStore, SimulationRecord};

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Which experiment store a resume sweep reads from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StoreConfig {
    Comps {
        url: String,
        #[serde(default)]
        mount: Option<MountConfig>,
    },
    Manifest {
        directory: PathBuf,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MountConfig {
    pub from: String,
    pub to: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::Comps {
            url: "https://comps.idmod.org".to_string(),
            mount: None,
        }
    }
}

impl StoreConfig {
    /// Build the configured store. Call `authenticate` before use.
    pub fn build(&self) -> Box<dyn ExperimentStore> {
        match self {
            Self::Comps { url, mount } => {
                let client = CompsClient::new(url.clone());
                let client = match mount {
                    Some(m) => client.with_mount(PathRewrite {
                        from: m.from.clone(),
                        to: m.to.clone(),
                    }),
                    None => client,
                };
                Box::new(client)
            }
            Self::Manifest { directory } => Box::new(ManifestStore::new(directory)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_config_builds_named_store() {
        let comps = StoreConfig::default().build();
        assert_eq!(comps.name(), "COMPS");

        let config: StoreConfig =
            serde_json::from_str(r#"{"type": "manifest", "directory": "/data/experiments"}"#)
                .unwrap();
        let store = config.build();
        assert_eq!(store.name(), "Manifest Store");
        assert_eq!(store.config()["directory"], "/data/experiments");
    }
}
