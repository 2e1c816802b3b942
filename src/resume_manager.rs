use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};
use log::{info, error};

const PROGRESS_FILE: &str = "progress.json";

/// Completed query keys, persisted between batch runs so an interrupted
/// run picks up where it left off.
#[derive(Serialize, Deserialize, Default)]
pub struct ProgressState {
    #[serde(skip)]
    path: PathBuf,
    pub completed_queries: HashSet<String>,
}

impl ProgressState {
    pub fn load() -> Self {
        Self::load_from(Path::new(PROGRESS_FILE))
    }

    pub fn load_from(path: &Path) -> Self {
        let fresh = || ProgressState {
            path: path.to_path_buf(),
            completed_queries: HashSet::new(),
        };

        if !path.exists() {
            info!("No progress file found. Starting fresh.");
            return fresh();
        }

        let content = match fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) => {
                error!("Failed to read progress file: {}", e);
                return fresh();
            }
        };

        match serde_json::from_str::<ProgressState>(&content) {
            Ok(mut state) => {
                info!(
                    "Resumed previous session: {} queries completed.",
                    state.completed_queries.len()
                );
                state.path = path.to_path_buf();
                state
            }
            Err(e) => {
                error!("Failed to parse progress file: {}. Starting fresh.", e);
                fresh()
            }
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.completed_queries.contains(key)
    }

    pub fn mark_complete(&mut self, key: String) {
        self.completed_queries.insert(key);
        self.save();
    }

    fn save(&self) {
        let json = match serde_json::to_string_pretty(self) {
            Ok(j) => j,
            Err(e) => {
                error!("Failed to serialize progress state: {}", e);
                return;
            }
        };

        if let Err(e) = fs::write(&self.path, json) {
            error!("Failed to write progress file: {}", e);
        }
    }
}
