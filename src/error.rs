use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("io failure on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize archive snapshot: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error(
        "refusing to overwrite {path}: it holds {on_disk} records but memory holds {in_memory} (set allow_shrink to force)"
    )]
    ShrinkRefused {
        path: PathBuf,
        on_disk: usize,
        in_memory: usize,
    },
    #[error("archive is locked by another writer: {0}")]
    Locked(PathBuf),
    #[error("config file invalid or unreadable: {0}")]
    InvalidConfig(String),
}

impl ArchiveError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type ArchiveResult<T> = Result<T, ArchiveError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveWarnCode {
    LoadMalformed,
    RecordMissingId,
    RecordUnreadable,
    DateUnparseable,
}

impl ArchiveWarnCode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::LoadMalformed => "W001_LOAD_MALFORMED",
            Self::RecordMissingId => "W002_RECORD_MISSING_ID",
            Self::RecordUnreadable => "W003_RECORD_UNREADABLE",
            Self::DateUnparseable => "W004_DATE_UNPARSEABLE",
        }
    }
}
