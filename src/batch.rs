//! Concurrent multi-file import and the merged project collection

use crate::error::{PortfolioError, PortfolioResult};
use crate::excel::{import_bytes, source_name, ImportOptions};
use crate::types::Project;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Import result of one file
#[derive(Debug)]
pub struct FileOutcome {
    pub path: PathBuf,
    pub result: PortfolioResult<Vec<Project>>,
}

/// Import every file concurrently.
///
/// Each file is read asynchronously and decoded on the blocking pool. Outcomes
/// come back in input order and one file's failure never affects the others.
pub async fn import_files(paths: &[PathBuf], options: &ImportOptions) -> Vec<FileOutcome> {
    let handles: Vec<_> = paths
        .iter()
        .cloned()
        .map(|path| {
            let options = options.clone();
            tokio::spawn(async move { import_file(&path, options).await })
        })
        .collect();

    let mut outcomes = Vec::with_capacity(paths.len());
    for (path, handle) in paths.iter().zip(handles) {
        let result = handle
            .await
            .unwrap_or_else(|e| Err(PortfolioError::Task(e.to_string())));
        match &result {
            Ok(projects) => debug!(
                file = %path.display(),
                projects = projects.len(),
                "file imported"
            ),
            Err(e) => warn!(file = %path.display(), error = %e, "file import failed"),
        }
        outcomes.push(FileOutcome {
            path: path.clone(),
            result,
        });
    }
    outcomes
}

async fn import_file(path: &Path, options: ImportOptions) -> PortfolioResult<Vec<Project>> {
    let bytes = tokio::fs::read(path).await?;
    let name = source_name(path);
    tokio::task::spawn_blocking(move || import_bytes(&name, bytes, &options))
        .await
        .map_err(|e| PortfolioError::Task(e.to_string()))?
}

/// Merged project collection, unique by id
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Portfolio {
    pub projects: Vec<Project>,
}

impl Portfolio {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append projects whose id is not present yet; the first one seen wins.
    /// Returns how many were added.
    pub fn merge(&mut self, incoming: Vec<Project>) -> usize {
        let mut known: HashSet<String> = self.projects.iter().map(|p| p.id.clone()).collect();
        let before = self.projects.len();
        for project in incoming {
            if known.insert(project.id.clone()) {
                self.projects.push(project);
            } else {
                debug!(id = %project.id, "duplicate project ignored");
            }
        }
        self.projects.len() - before
    }

    /// Distinct squads, upper-cased and sorted
    pub fn squads(&self) -> Vec<String> {
        self.projects
            .iter()
            .filter_map(|p| p.team.squad.as_deref())
            .map(|squad| squad.trim().to_uppercase())
            .filter(|squad| !squad.is_empty())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.projects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }

    /// Load a saved portfolio; `.json` is read as JSON, `.yaml`/`.yml` as YAML
    pub fn load<P: AsRef<Path>>(path: P) -> PortfolioResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        match StoreFormat::from_path(path)? {
            StoreFormat::Yaml => Ok(serde_yaml::from_str(&content)?),
            StoreFormat::Json => Ok(serde_json::from_str(&content)?),
        }
    }

    /// Save in the format given by the file extension
    pub fn save<P: AsRef<Path>>(&self, path: P) -> PortfolioResult<()> {
        let path = path.as_ref();
        let content = match StoreFormat::from_path(path)? {
            StoreFormat::Yaml => serde_yaml::to_string(self)?,
            StoreFormat::Json => serde_json::to_string_pretty(self)?,
        };
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StoreFormat {
    Yaml,
    Json,
}

impl StoreFormat {
    fn from_path(path: &Path) -> PortfolioResult<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_lowercase);
        match extension.as_deref() {
            Some("yaml") | Some("yml") => Ok(StoreFormat::Yaml),
            Some("json") => Ok(StoreFormat::Json),
            _ => Err(PortfolioError::Config(format!(
                "Unsupported portfolio file '{}': use .yaml, .yml or .json",
                path.display()
            ))),
        }
    }
}

/// True when the path names a saved portfolio rather than a workbook
pub fn is_portfolio_file(path: &Path) -> bool {
    StoreFormat::from_path(path).is_ok()
}
