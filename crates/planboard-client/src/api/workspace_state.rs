use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The workspace the terminal front-end acts on, remembered between runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceState {
    pub workspace_id: Uuid,
}

impl WorkspaceState {
    /// Get the path to the workspace state file
    pub fn state_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not find config directory")?
            .join("planboard");

        Ok(config_dir.join("workspace.json"))
    }

    /// Load workspace state from disk
    pub fn load() -> Result<Option<Self>> {
        Self::load_from(&Self::state_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(path)
            .context("Could not read workspace state file")?;

        let state: Self = serde_json::from_str(&contents)
            .context("Could not parse workspace state file")?;

        Ok(Some(state))
    }

    /// Save workspace state to disk
    pub fn save(workspace_id: Uuid) -> Result<()> {
        Self::save_to(&Self::state_path()?, workspace_id)
    }

    pub fn save_to(path: &Path, workspace_id: Uuid) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).context("Could not create config directory")?;
        }

        let state = Self { workspace_id };
        let contents = serde_json::to_string_pretty(&state)
            .context("Could not serialize workspace state")?;

        fs::write(path, contents)
            .context("Could not write workspace state file")?;

        Ok(())
    }

    /// Forget the selection, e.g. after the workspace was deleted.
    pub fn clear_at(path: &Path) -> Result<()> {
        if path.exists() {
            fs::remove_file(path).context("Could not remove workspace state file")?;
        }
        Ok(())
    }

    pub fn clear() -> Result<()> {
        Self::clear_at(&Self::state_path()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_means_no_selection() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("workspace.json");
        assert_eq!(WorkspaceState::load_from(&path).unwrap(), None);
    }

    #[test]
    fn saved_selection_is_loaded_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("workspace.json");
        let workspace_id = Uuid::new_v4();

        WorkspaceState::save_to(&path, workspace_id).unwrap();
        let state = WorkspaceState::load_from(&path).unwrap();
        assert_eq!(state, Some(WorkspaceState { workspace_id }));

        WorkspaceState::clear_at(&path).unwrap();
        assert_eq!(WorkspaceState::load_from(&path).unwrap(), None);
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("workspace.json");
        fs::write(&path, "not json").unwrap();
        assert!(WorkspaceState::load_from(&path).is_err());
    }
}
