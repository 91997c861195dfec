//! The document handed to the job-submission layer.

use chrono::{DateTime, Utc};
use ms_config::materialize;
use ms_types::{validation_error, ModificationSet, MsResult, SimConfig, SweepError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use std::str::FromStr;
use uuid::Uuid;

/// Execution environment block of the setup file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SetupBlock {
    #[default]
    Hpc,
    Local,
}

impl fmt::Display for SetupBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hpc => write!(f, "HPC"),
            Self::Local => write!(f, "LOCAL"),
        }
    }
}

impl FromStr for SetupBlock {
    type Err = ms_types::MsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "HPC" => Ok(Self::Hpc),
            "LOCAL" => Ok(Self::Local),
            other => Err(validation_error!("unknown setup block: {}", other)),
        }
    }
}

/// Baseline plus the ordered per-run modifications of one experiment.
///
/// Each modification set is applied to its own copy of `base_config`; sets
/// never observe each other's changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionRequest {
    pub id: Uuid,
    pub experiment_name: String,
    pub setup: SetupBlock,
    pub base_config: SimConfig,
    pub modifications: Vec<ModificationSet>,
    pub created_at: DateTime<Utc>,
}

impl SubmissionRequest {
    pub fn new(
        experiment_name: impl Into<String>,
        setup: SetupBlock,
        base_config: SimConfig,
        modifications: Vec<ModificationSet>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            experiment_name: experiment_name.into(),
            setup,
            base_config,
            modifications,
            created_at: Utc::now(),
        }
    }

    pub fn run_count(&self) -> usize {
        self.modifications.len()
    }

    fn set(&self, index: usize) -> MsResult<&ModificationSet> {
        self.modifications.get(index).ok_or_else(|| {
            SweepError::IndexOutOfRange {
                index,
                len: self.modifications.len(),
            }
            .into()
        })
    }

    /// Full configuration of run `index`.
    pub fn materialize(&self, index: usize) -> MsResult<SimConfig> {
        materialize(&self.base_config, self.set(index)?)
    }

    /// Tags recorded on run `index`.
    pub fn run_tags(&self, index: usize) -> MsResult<BTreeMap<String, Value>> {
        Ok(self.set(index)?.tags())
    }

    pub fn write_json(&self, path: &Path) -> MsResult<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.flush()?;
        Ok(())
    }

    pub fn read_json(path: &Path) -> MsResult<Self> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }
}
