use ms_types::{MsResult, StoreError};
use std::path::Path;
use tracing::debug;

/// Substring marking serialized population state files.
pub const STATE_FILE_MARKER: &str = "state";

/// Keep only serialized-state file names, sorted lexicographically.
///
/// Directory listings come back in file-system order; sorting keeps the
/// resulting file list identical across machines.
pub fn select_state_files<I, S>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut selected: Vec<String> = names
        .into_iter()
        .map(Into::into)
        .filter(|name| name.contains(STATE_FILE_MARKER))
        .collect();
    selected.sort();
    selected
}

/// List the serialized-state files in `dir`.
///
/// A missing or unreadable directory fails with `PathNotFound`.
pub fn list_state_files(dir: &Path) -> MsResult<Vec<String>> {
    let path_not_found = || StoreError::PathNotFound {
        path: dir.to_string_lossy().to_string(),
    };

    let entries = std::fs::read_dir(dir).map_err(|_| path_not_found())?;
    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|_| path_not_found())?;
        names.push(entry.file_name().to_string_lossy().to_string());
    }

    let selected = select_state_files(names);
    debug!("Found {} state files in {}", selected.len(), dir.display());
    Ok(selected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ms_types::MsError;

    #[test]
    fn filter_keeps_only_state_files() {
        let selected = select_state_files(["state-00100.dtk", "notes.txt", "state-00200.dtk"]);
        assert_eq!(selected, vec!["state-00100.dtk", "state-00200.dtk"]);
    }

    #[test]
    fn filter_sorts_listing_order() {
        let selected = select_state_files(vec![
            "state-00730-001.dtk".to_string(),
            "InsetChart.json".to_string(),
            "state-00730-000.dtk".to_string(),
        ]);
        assert_eq!(selected, vec!["state-00730-000.dtk", "state-00730-001.dtk"]);
    }

    #[test]
    fn lists_directory_contents() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["state-00200.dtk", "notes.txt", "state-00100.dtk"] {
            std::fs::write(dir.path().join(name), b"").unwrap();
        }

        let files = list_state_files(dir.path()).unwrap();
        assert_eq!(files, vec!["state-00100.dtk", "state-00200.dtk"]);
    }

    #[test]
    fn missing_directory_is_path_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("output");
        match list_state_files(&missing) {
            Err(MsError::Store(StoreError::PathNotFound { path })) => {
                assert!(path.ends_with("output"))
            }
            other => panic!("expected PathNotFound, got {other:?}"),
        }
    }
}
