pub mod ingest;
pub mod listings;
pub mod photos;
pub mod stats;
pub mod status;

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;

use crate::archive::Archive;
use crate::archive::config::ArchiveConfig;
use crate::archive::paths::ArchivePaths;
use crate::archive::store::{ArchiveStore, LoadOutcome};

#[derive(Debug, Clone, Serialize)]
pub struct CommandReport {
    pub command: String,
    pub ok: bool,
    pub details: Vec<String>,
    pub issues: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl CommandReport {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            ok: true,
            details: Vec::new(),
            issues: Vec::new(),
            data: None,
        }
    }

    pub fn detail(&mut self, text: impl Into<String>) {
        self.details.push(text.into());
    }

    pub fn issue(&mut self, text: impl Into<String>) {
        self.ok = false;
        self.issues.push(text.into());
    }

    pub fn set_data<T: Serialize>(&mut self, value: &T) -> Result<()> {
        self.data = Some(serde_json::to_value(value).context("failed to encode command output")?);
        Ok(())
    }
}

#[derive(Debug)]
pub struct LoadedArchive {
    pub store: ArchiveStore,
    pub archive: Archive,
    pub outcome: LoadOutcome,
}

pub fn load_archive(paths: &ArchivePaths, config: &ArchiveConfig) -> Result<LoadedArchive> {
    let store = ArchiveStore::new(&paths.archive_file, config.store.clone());
    let (photos, outcome) = store
        .load()
        .with_context(|| format!("failed to load {}", paths.archive_file.display()))?;
    let archive = Archive::from_photos(photos, config.brand_catalog(), config.query.clone());
    Ok(LoadedArchive {
        store,
        archive,
        outcome,
    })
}

pub fn describe_load(outcome: &LoadOutcome, report: &mut CommandReport) {
    match outcome {
        LoadOutcome::Missing => report.detail("archive.load=missing (starting empty)"),
        LoadOutcome::Loaded { count, dropped } => {
            report.detail(format!("archive.load=ok count={count} dropped={dropped}"))
        }
        LoadOutcome::Recovered { reason } => {
            report.detail(format!("archive.load=recovered reason={reason}"))
        }
    }
}
