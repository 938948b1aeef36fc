use log::{info, warn};
use std::path::{Path, PathBuf};

use crate::stats::{RosterEntry, StatsError, StatsProvider};

#[derive(Debug, thiserror::Error)]
pub enum RosterError {
    #[error("Failed to read roster file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse roster: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Failed to fetch roster: {0}")]
    Stats(#[from] StatsError),
    #[error("Roster is empty")]
    Empty,
}

/// Read-only snapshot of known players, in provider order.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    entries: Vec<RosterEntry>,
}

impl Roster {
    pub fn new(entries: Vec<RosterEntry>) -> Self {
        Self { entries }
    }

    /// Parses a JSON array of `{"id": .., "full_name": ..}` objects. Extra
    /// fields are ignored.
    pub fn from_json(contents: &str) -> Result<Self, RosterError> {
        Ok(Self::new(serde_json::from_str(contents)?))
    }

    pub fn from_file(path: &Path) -> Result<Self, RosterError> {
        let contents = std::fs::read_to_string(path).map_err(|source| RosterError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&contents)
    }

    pub async fn fetch(provider: &dyn StatsProvider) -> Result<Self, RosterError> {
        Ok(Self::new(provider.all_players().await?))
    }

    /// Startup loader: a local snapshot file when configured, the provider otherwise.
    pub async fn load(
        path: Option<&Path>,
        provider: &dyn StatsProvider,
    ) -> Result<Self, RosterError> {
        let roster = match path {
            Some(path) => {
                info!("Loading roster snapshot from {}", path.display());
                Self::from_file(path)?
            }
            None => {
                info!("Fetching roster snapshot from stats provider");
                Self::fetch(provider).await?
            }
        };

        if roster.is_empty() {
            warn!("Roster snapshot contains no players");
            return Err(RosterError::Empty);
        }
        info!("Roster snapshot loaded with {} players", roster.len());
        Ok(roster)
    }

    /// Exact, case-insensitive match on the full name. The first entry wins.
    pub fn find_by_name(&self, name: &str) -> Option<&RosterEntry> {
        let needle = name.to_lowercase();
        self.entries
            .iter()
            .find(|entry| entry.full_name.to_lowercase() == needle)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
