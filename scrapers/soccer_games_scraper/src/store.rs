use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::competition::Competition;
use crate::sources::SecondarySource;
use crate::types::Match;

/// Locations of the flat JSON artifacts under one data directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    data_dir: PathBuf,
}

impl ArtifactPaths {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn matches(&self) -> PathBuf {
        self.data_dir.join("matches.json")
    }

    pub fn secondary(&self, source: SecondarySource) -> PathBuf {
        self.data_dir.join(source.artifact_name())
    }

    pub fn teams_dir(&self) -> PathBuf {
        self.data_dir.join("teams")
    }

    /// `teams/{code}.json` for an API competition.
    pub fn teams(&self, competition: &Competition) -> Option<PathBuf> {
        competition
            .football_data_code()
            .map(|code| self.teams_dir().join(format!("{}.json", code)))
    }
}

/// Read an artifact. Records that do not deserialize are logged and dropped;
/// only an unreadable file or a non-array document is an error.
pub fn read_matches(path: &Path) -> Result<Vec<Match>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let records: Vec<Value> = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse {}", path.display()))?;

    let total = records.len();
    let matches: Vec<Match> = records
        .into_iter()
        .enumerate()
        .filter_map(|(index, record)| match serde_json::from_value::<Match>(record) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                warn!("Skipping record {} of {}: {}", index, path.display(), e);
                None
            }
        })
        .collect();
    if matches.len() < total {
        warn!(
            "Dropped {} malformed records from {}",
            total - matches.len(),
            path.display()
        );
    }
    Ok(matches)
}

/// Pretty-print `value` to `path`, replacing any previous file in one rename.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let dir = path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create directory {}", dir.display()))?;

    let json = serde_json::to_string_pretty(value)?;
    let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
    tmp_name.push(".tmp");
    let tmp = dir.join(tmp_name);

    fs::write(&tmp, json).with_context(|| format!("Failed to write {}", tmp.display()))?;
    fs::rename(&tmp, path)
        .with_context(|| format!("Failed to move {} into place", path.display()))?;
    Ok(())
}

pub fn write_matches(path: &Path, matches: &[Match]) -> Result<()> {
    write_json(path, matches)?;
    info!("Successfully saved {} matches to {}", matches.len(), path.display());
    Ok(())
}
