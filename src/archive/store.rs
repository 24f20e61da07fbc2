use crate::archive::config::StoreConfig;
use crate::archive::paths::sibling_with_suffix;
use crate::archive::record::PhotoRecord;
use crate::archive::util::now_timestamp;
use crate::archive::warn::{self, WarnEvent};
use crate::error::{ArchiveError, ArchiveResult, ArchiveWarnCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

#[derive(Debug, Serialize)]
struct SnapshotOut<'a> {
    updated_at: String,
    photo_count: usize,
    photos: Vec<&'a PhotoRecord>,
}

#[derive(Debug, Deserialize)]
struct SnapshotIn {
    photos: Vec<Value>,
}

/// Records read from a snapshot, parsed one entry at a time.
#[derive(Debug, Default)]
struct ParsedSnapshot {
    photos: BTreeMap<String, PhotoRecord>,
    missing_id: usize,
    unreadable: usize,
}

impl ParsedSnapshot {
    fn dropped(&self) -> usize {
        self.missing_id + self.unreadable
    }
}

fn parse_snapshot(raw: &str) -> Result<ParsedSnapshot, serde_json::Error> {
    let snapshot: SnapshotIn = serde_json::from_str(raw)?;
    let mut parsed = ParsedSnapshot::default();
    for entry in snapshot.photos {
        match serde_json::from_value::<PhotoRecord>(entry) {
            Ok(record) if record.has_id() => {
                parsed.photos.insert(record.id.clone(), record);
            }
            Ok(_) => parsed.missing_id += 1,
            Err(_) => parsed.unreadable += 1,
        }
    }
    Ok(parsed)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// No backing file yet.
    Missing,
    Loaded { count: usize, dropped: usize },
    /// The file was unreadable as an archive and memory starts empty. The
    /// file itself is left untouched; the next `save` copies it aside first.
    Recovered { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveOutcome {
    pub path: PathBuf,
    pub photo_count: usize,
    pub backup: Option<PathBuf>,
    /// Copy of an unreadable file that this save replaced.
    pub quarantined: Option<PathBuf>,
}

/// Whole-file JSON persistence for the archive.
#[derive(Debug, Clone)]
pub struct ArchiveStore {
    path: PathBuf,
    policy: StoreConfig,
}

fn file_hash(path: &Path) -> ArchiveResult<String> {
    let bytes = fs::read(path).map_err(|err| ArchiveError::io(path, err))?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(format!("{:x}", hasher.finalize()))
}

fn ensure_parent(path: &Path) -> ArchiveResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|err| ArchiveError::io(parent, err))?;
    }
    Ok(())
}

impl ArchiveStore {
    pub fn new(path: impl Into<PathBuf>, policy: StoreConfig) -> Self {
        Self {
            path: path.into(),
            policy,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn backup_path(&self, generation: usize) -> PathBuf {
        sibling_with_suffix(&self.path, &format!(".bak.{generation}"))
    }

    pub fn existing_backups(&self) -> Vec<PathBuf> {
        (1..=self.policy.backup_keep)
            .map(|generation| self.backup_path(generation))
            .filter(|path| path.is_file())
            .collect()
    }

    /// Read the backing file into a map keyed by id.
    ///
    /// A missing file yields an empty map. A file that exists but is not a
    /// valid archive also yields an empty map after a warning; only I/O
    /// failures reading the file are errors. Stored entries that are not
    /// records, or carry no id, are dropped with a warning. Nothing is
    /// written.
    pub fn load(&self) -> ArchiveResult<(BTreeMap<String, PhotoRecord>, LoadOutcome)> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return Ok((BTreeMap::new(), LoadOutcome::Missing));
            }
            Err(err) if err.kind() == ErrorKind::InvalidData => {
                return Ok(self.recover(&format!("archive is not valid utf-8: {err}")));
            }
            Err(err) => return Err(ArchiveError::io(&self.path, err)),
        };

        let parsed = match parse_snapshot(&raw) {
            Ok(parsed) => parsed,
            Err(err) => return Ok(self.recover(&err.to_string())),
        };

        let path_display = self.path.display().to_string();
        if parsed.missing_id > 0 {
            warn::emit(WarnEvent {
                code: ArchiveWarnCode::RecordMissingId,
                stage: "store",
                action: "load",
                record: "",
                path: &path_display,
                reason: &format!("dropped {} stored records without id", parsed.missing_id),
                err: "",
            });
        }
        if parsed.unreadable > 0 {
            warn::emit(WarnEvent {
                code: ArchiveWarnCode::RecordUnreadable,
                stage: "store",
                action: "load",
                record: "",
                path: &path_display,
                reason: &format!("dropped {} stored entries that are not records", parsed.unreadable),
                err: "",
            });
        }

        let dropped = parsed.dropped();
        let photos = parsed.photos;
        tracing::debug!(path = %path_display, count = photos.len(), "archive loaded");
        let count = photos.len();
        Ok((photos, LoadOutcome::Loaded { count, dropped }))
    }

    fn recover(&self, reason: &str) -> (BTreeMap<String, PhotoRecord>, LoadOutcome) {
        warn::emit(WarnEvent {
            code: ArchiveWarnCode::LoadMalformed,
            stage: "store",
            action: "load",
            record: "",
            path: &self.path.display().to_string(),
            reason: "malformed-archive-starting-empty",
            err: reason,
        });
        (
            BTreeMap::new(),
            LoadOutcome::Recovered {
                reason: reason.to_string(),
            },
        )
    }

    /// Copy the unreadable file aside, named by content hash so the same
    /// bytes are only ever copied once.
    fn quarantine(&self) -> ArchiveResult<PathBuf> {
        let hash = file_hash(&self.path)?;
        let target = sibling_with_suffix(&self.path, &format!(".corrupt-{}", &hash[..12]));
        if !target.exists() {
            fs::copy(&self.path, &target).map_err(|err| ArchiveError::io(&target, err))?;
        }
        Ok(target)
    }

    /// Number of identified records in the file currently on disk, or
    /// `None` when there is no readable archive there.
    pub fn on_disk_count(&self) -> Option<usize> {
        let raw = fs::read_to_string(&self.path).ok()?;
        parse_snapshot(&raw).ok().map(|parsed| parsed.photos.len())
    }

    fn rotate_backups(&self) -> ArchiveResult<Option<PathBuf>> {
        let keep = self.policy.backup_keep;
        if keep == 0 || !self.path.is_file() {
            return Ok(None);
        }

        let newest = self.backup_path(1);
        if newest.is_file() && file_hash(&newest)? == file_hash(&self.path)? {
            return Ok(Some(newest));
        }

        let oldest = self.backup_path(keep);
        if oldest.exists() {
            fs::remove_file(&oldest).map_err(|err| ArchiveError::io(&oldest, err))?;
        }
        for generation in (1..keep).rev() {
            let from = self.backup_path(generation);
            if from.exists() {
                let to = self.backup_path(generation + 1);
                fs::rename(&from, &to).map_err(|err| ArchiveError::io(&from, err))?;
            }
        }
        fs::copy(&self.path, &newest).map_err(|err| ArchiveError::io(&newest, err))?;
        Ok(Some(newest))
    }

    /// Write the full record set, replacing the backing file atomically.
    ///
    /// Refuses to replace a file that holds more records than `photos`
    /// unless the policy allows shrinking. A file that does not parse as an
    /// archive is first copied to `<file>.corrupt-<hash>`. The previous file
    /// is kept as a rotating backup.
    pub fn save(&self, photos: &BTreeMap<String, PhotoRecord>) -> ArchiveResult<SaveOutcome> {
        let on_disk = self.on_disk_count();
        if !self.policy.allow_shrink
            && let Some(on_disk) = on_disk
            && on_disk > photos.len()
        {
            return Err(ArchiveError::ShrinkRefused {
                path: self.path.clone(),
                on_disk,
                in_memory: photos.len(),
            });
        }

        let quarantined = if on_disk.is_none() && self.path.is_file() {
            let target = self.quarantine()?;
            tracing::info!(copy = %target.display(), "kept unreadable archive before replacing it");
            Some(target)
        } else {
            None
        };

        ensure_parent(&self.path)?;
        let backup = self.rotate_backups()?;

        let snapshot = SnapshotOut {
            updated_at: now_timestamp(),
            photo_count: photos.len(),
            photos: photos.values().collect(),
        };
        let mut data = serde_json::to_string_pretty(&snapshot)?;
        data.push('\n');

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let mut tmp = NamedTempFile::new_in(&dir).map_err(|err| ArchiveError::io(&dir, err))?;
        tmp.write_all(data.as_bytes())
            .map_err(|err| ArchiveError::io(tmp.path(), err))?;
        tmp.as_file()
            .sync_all()
            .map_err(|err| ArchiveError::io(tmp.path(), err))?;
        tmp.persist(&self.path)
            .map_err(|err| ArchiveError::io(&self.path, err.error))?;

        tracing::info!(
            path = %self.path.display(),
            photo_count = photos.len(),
            "archive saved"
        );
        Ok(SaveOutcome {
            path: self.path.clone(),
            photo_count: photos.len(),
            backup,
            quarantined,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::Archive;
    use serde_json::{Value, json};
    use tempfile::tempdir;

    fn store_at(dir: &Path, policy: StoreConfig) -> ArchiveStore {
        ArchiveStore::new(dir.join("data").join("archive.json"), policy)
    }

    fn sample_archive() -> Archive {
        let batch: Vec<PhotoRecord> = serde_json::from_value(json!([
            {"id": "100", "player_name": "LeBron James", "photo_date": "2024-01-05", "headline": "Nike LeBron 21"},
            {"id": "101", "player_name": "Luka Doncic", "photo_date": "2024-01-06", "caption": "Jordan Luka 3", "hover_url": "https://cdn/h.jpg"},
        ]))
        .expect("batch");
        let mut archive = Archive::default();
        archive.add_photos(batch);
        archive
    }

    #[test]
    fn missing_file_loads_empty() {
        let tmp = tempdir().expect("tempdir");
        let store = store_at(tmp.path(), StoreConfig::default());
        let (photos, outcome) = store.load().expect("load");
        assert!(photos.is_empty());
        assert_eq!(outcome, LoadOutcome::Missing);
    }

    #[test]
    fn save_then_load_round_trips_every_field() {
        let tmp = tempdir().expect("tempdir");
        let store = store_at(tmp.path(), StoreConfig::default());
        let archive = sample_archive();

        let saved = store.save(archive.photos()).expect("save");
        assert_eq!(saved.photo_count, 2);
        assert_eq!(saved.backup, None);
        assert_eq!(saved.quarantined, None);

        let (loaded, outcome) = store.load().expect("load");
        assert_eq!(&loaded, archive.photos());
        assert_eq!(
            outcome,
            LoadOutcome::Loaded {
                count: 2,
                dropped: 0
            }
        );
    }

    #[test]
    fn snapshot_carries_timestamp_and_count() {
        let tmp = tempdir().expect("tempdir");
        let store = store_at(tmp.path(), StoreConfig::default());
        store.save(sample_archive().photos()).expect("save");

        let raw = fs::read_to_string(store.path()).expect("read");
        let doc: Value = serde_json::from_str(&raw).expect("json");
        assert_eq!(doc["photo_count"], json!(2));
        assert!(doc["updated_at"].as_str().is_some_and(|s| !s.is_empty()));
        assert_eq!(doc["photos"][0]["id"], json!("100"));
        assert_eq!(doc["photos"][0]["player_slug"], json!("lebron-james"));
    }

    #[test]
    fn malformed_file_recovers_empty_without_touching_disk() {
        let tmp = tempdir().expect("tempdir");
        let store = store_at(tmp.path(), StoreConfig::default());
        let data_dir = store.path().parent().expect("parent").to_path_buf();
        fs::create_dir_all(&data_dir).expect("mkdir");
        fs::write(store.path(), "{\"photos\": [oops").expect("write");

        let (photos, outcome) = store.load().expect("load");
        assert!(photos.is_empty());
        assert!(matches!(outcome, LoadOutcome::Recovered { .. }));
        let entries = fs::read_dir(&data_dir).expect("read dir").count();
        assert_eq!(entries, 1);
    }

    #[test]
    fn save_over_malformed_file_quarantines_it_once() {
        let tmp = tempdir().expect("tempdir");
        let store = store_at(tmp.path(), StoreConfig::default());
        fs::create_dir_all(store.path().parent().expect("parent")).expect("mkdir");
        fs::write(store.path(), "{\"photos\": [oops").expect("write");

        let (photos, _) = store.load().expect("load");
        let saved = store.save(&photos).expect("save");
        let quarantined = saved.quarantined.expect("quarantine copy");
        assert_eq!(
            fs::read_to_string(&quarantined).expect("read quarantine"),
            "{\"photos\": [oops"
        );

        let again = store.save(&photos).expect("second save");
        assert_eq!(again.quarantined, None);
    }

    #[test]
    fn null_fields_in_stored_records_load_as_empty() {
        let tmp = tempdir().expect("tempdir");
        let store = store_at(tmp.path(), StoreConfig::default());
        fs::create_dir_all(store.path().parent().expect("parent")).expect("mkdir");
        fs::write(
            store.path(),
            r#"{"photos": [
                {"imagn_id": "1", "headline": null, "caption": "Nike Ja 1", "keywords": null, "photo_date": "2024-01-05"},
                {"imagn_id": "2", "headline": "Adidas Harden", "photographer": 12}
            ]}"#,
        )
        .expect("write");

        let (photos, outcome) = store.load().expect("load");
        assert_eq!(
            outcome,
            LoadOutcome::Loaded {
                count: 2,
                dropped: 0
            }
        );
        assert!(photos["1"].headline.is_empty());
        assert!(photos["1"].keywords.is_empty());
        assert_eq!(photos["1"].caption, "Nike Ja 1");
        assert!(photos["2"].photographer.is_empty());
        assert_eq!(store.on_disk_count(), Some(2));
    }

    #[test]
    fn entries_that_are_not_records_are_dropped_alone() {
        let tmp = tempdir().expect("tempdir");
        let store = store_at(tmp.path(), StoreConfig::default());
        fs::create_dir_all(store.path().parent().expect("parent")).expect("mkdir");
        fs::write(
            store.path(),
            r#"{"photos": [{"id": "1"}, "stray", 42, {"id": "2"}]}"#,
        )
        .expect("write");

        let (photos, outcome) = store.load().expect("load");
        assert_eq!(photos.len(), 2);
        assert_eq!(
            outcome,
            LoadOutcome::Loaded {
                count: 2,
                dropped: 2
            }
        );
    }

    #[test]
    fn wrong_shape_counts_as_malformed() {
        let tmp = tempdir().expect("tempdir");
        let store = store_at(tmp.path(), StoreConfig::default());
        fs::create_dir_all(store.path().parent().expect("parent")).expect("mkdir");
        fs::write(store.path(), "{\"items\": []}").expect("write");

        let (_, outcome) = store.load().expect("load");
        assert!(matches!(outcome, LoadOutcome::Recovered { .. }));
    }

    #[test]
    fn stored_records_without_id_are_dropped_on_load() {
        let tmp = tempdir().expect("tempdir");
        let store = store_at(tmp.path(), StoreConfig::default());
        fs::create_dir_all(store.path().parent().expect("parent")).expect("mkdir");
        fs::write(
            store.path(),
            r#"{"photos": [{"imagn_id": "5", "headline": "legacy"}, {"headline": "orphan"}]}"#,
        )
        .expect("write");

        let (photos, outcome) = store.load().expect("load");
        assert_eq!(photos.len(), 1);
        assert_eq!(photos["5"].headline, "legacy");
        assert_eq!(
            outcome,
            LoadOutcome::Loaded {
                count: 1,
                dropped: 1
            }
        );
        assert_eq!(store.on_disk_count(), Some(1));
    }

    #[test]
    fn save_refuses_to_shrink_a_larger_archive() {
        let tmp = tempdir().expect("tempdir");
        let store = store_at(tmp.path(), StoreConfig::default());
        store.save(sample_archive().photos()).expect("seed");

        let err = store.save(&BTreeMap::new()).expect_err("shrink refused");
        assert!(matches!(
            err,
            ArchiveError::ShrinkRefused {
                on_disk: 2,
                in_memory: 0,
                ..
            }
        ));
        assert_eq!(store.on_disk_count(), Some(2));

        let permissive = store_at(
            tmp.path(),
            StoreConfig {
                allow_shrink: true,
                ..StoreConfig::default()
            },
        );
        permissive.save(&BTreeMap::new()).expect("forced shrink");
        assert_eq!(store.on_disk_count(), Some(0));
    }

    #[test]
    fn backups_rotate_and_skip_identical_content() {
        let tmp = tempdir().expect("tempdir");
        let store = store_at(
            tmp.path(),
            StoreConfig {
                backup_keep: 2,
                allow_shrink: false,
            },
        );
        let mut archive = sample_archive();

        store.save(archive.photos()).expect("save 1");
        assert!(store.existing_backups().is_empty());

        archive.add_photos([PhotoRecord::new("102")]);
        let second = store.save(archive.photos()).expect("save 2");
        assert_eq!(second.backup, Some(store.backup_path(1)));
        assert_eq!(store.existing_backups().len(), 1);

        archive.add_photos([PhotoRecord::new("103")]);
        store.save(archive.photos()).expect("save 3");
        assert_eq!(store.existing_backups().len(), 2);

        archive.add_photos([PhotoRecord::new("104")]);
        store.save(archive.photos()).expect("save 4");
        assert_eq!(store.existing_backups().len(), 2);
        assert!(!store.backup_path(3).exists());

        let newest = ArchiveStore::new(store.backup_path(1), StoreConfig::default());
        assert_eq!(newest.on_disk_count(), Some(4));
        let oldest = ArchiveStore::new(store.backup_path(2), StoreConfig::default());
        assert_eq!(oldest.on_disk_count(), Some(3));
    }

    #[test]
    fn malformed_load_then_save_keeps_original_bytes_somewhere() {
        let tmp = tempdir().expect("tempdir");
        let store = store_at(tmp.path(), StoreConfig::default());
        fs::create_dir_all(store.path().parent().expect("parent")).expect("mkdir");
        fs::write(store.path(), "not json at all").expect("write");

        let (photos, _) = store.load().expect("load");
        let mut archive = Archive::from_photos(photos, Default::default(), Default::default());
        archive.add_photos([PhotoRecord::new("1")]);
        store.save(archive.photos()).expect("save");

        assert_eq!(
            fs::read_to_string(store.backup_path(1)).expect("backup"),
            "not json at all"
        );
        assert!(store.on_disk_count().is_some());
    }
}
