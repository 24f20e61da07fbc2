use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::archive::config::load_config;
use crate::archive::lock::ArchiveLock;
use crate::archive::paths::resolve_paths;
use crate::archive::record::PhotoRecord;
use crate::archive::util::truncate_with_ellipsis;
use crate::commands::{CommandReport, describe_load, load_archive};

const RECENT_PREVIEW_LIMIT: usize = 20;

#[derive(Debug, Clone)]
pub struct IngestOptions {
    /// Batch file, or `-` for stdin.
    pub input: PathBuf,
    pub dry_run: bool,
}

#[derive(Debug, Clone, Serialize)]
struct IngestOutput<'a> {
    new_photos: usize,
    merged_photos: usize,
    skipped_candidates: usize,
    total_photos: usize,
    total_players: usize,
    recent_photos: Vec<&'a PhotoRecord>,
}

#[derive(Debug, Default)]
pub struct ParsedBatch {
    pub candidates: Vec<PhotoRecord>,
    pub rejected: usize,
}

fn read_input(input: &Path) -> Result<String> {
    if input.as_os_str() == "-" {
        let mut raw = String::new();
        std::io::stdin()
            .read_to_string(&mut raw)
            .context("failed to read batch from stdin")?;
        return Ok(raw);
    }
    fs::read_to_string(input).with_context(|| format!("failed to read {}", input.display()))
}

/// Accepts either a bare array of candidates or a `{ "photos": [...] }`
/// document. Entries that are not JSON objects are counted and dropped;
/// fields of the wrong type inside a record read as empty.
pub fn parse_batch(raw: &str) -> Result<ParsedBatch> {
    let doc: Value = serde_json::from_str(raw).context("batch is not valid JSON")?;
    let items = match doc {
        Value::Array(items) => items,
        Value::Object(mut obj) => match obj.remove("photos") {
            Some(Value::Array(items)) => items,
            _ => anyhow::bail!("batch object has no `photos` array"),
        },
        _ => anyhow::bail!("batch must be an array or an object with `photos`"),
    };

    let mut out = ParsedBatch::default();
    for item in items {
        match serde_json::from_value::<PhotoRecord>(item) {
            Ok(record) => out.candidates.push(record),
            Err(err) => {
                tracing::debug!(error = %err, "rejecting malformed candidate");
                out.rejected += 1;
            }
        }
    }
    Ok(out)
}

pub fn run(opts: &IngestOptions) -> Result<CommandReport> {
    let paths = resolve_paths()?;
    let config = load_config(&paths)?;
    let mut report = CommandReport::new("ingest");

    let raw = read_input(&opts.input)?;
    let batch = parse_batch(&raw)?;
    report.detail(format!("input={}", opts.input.display()));
    report.detail(format!("candidates={}", batch.candidates.len()));
    if batch.rejected > 0 {
        report.detail(format!("rejected_entries={}", batch.rejected));
    }

    let lock = ArchiveLock::acquire(&paths.lock_file())?;
    report.detail(format!("lock={}", lock.path().display()));

    let mut loaded = load_archive(&paths, &config)?;
    describe_load(&loaded.outcome, &mut report);

    let summary = loaded.archive.add_photos(batch.candidates);
    report.detail(format!("new={}", summary.new));
    report.detail(format!("merged={}", summary.merged));
    report.detail(format!("skipped={}", summary.skipped + batch.rejected));

    if opts.dry_run {
        report.detail("dry-run: archive not written");
    } else {
        let saved = loaded
            .store
            .save(loaded.archive.photos())
            .with_context(|| format!("failed to save {}", paths.archive_file.display()))?;
        report.detail(format!("saved={}", saved.path.display()));
        report.detail(format!("photo_count={}", saved.photo_count));
        if let Some(backup) = saved.backup {
            report.detail(format!("backup={}", backup.display()));
        }
        if let Some(copy) = saved.quarantined {
            report.detail(format!("quarantined={}", copy.display()));
        }
    }
    drop(lock);

    let archive = &loaded.archive;
    let recent: Vec<&PhotoRecord> = archive
        .recent_photos(archive.query_config().recent_days)
        .into_iter()
        .take(RECENT_PREVIEW_LIMIT)
        .collect();
    for photo in &recent {
        report.detail(format!(
            "recent id={} date={} headline={}",
            photo.id,
            photo.photo_date,
            truncate_with_ellipsis(&photo.headline, 60)
        ));
    }

    let output = IngestOutput {
        new_photos: summary.new,
        merged_photos: summary.merged,
        skipped_candidates: summary.skipped + batch.rejected,
        total_photos: archive.len(),
        total_players: archive.all_players().len(),
        recent_photos: recent,
    };
    report.set_data(&output)?;
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_array_and_photos_document_both_parse() {
        let bare = parse_batch(r#"[{"id":"1"},{"id":"2"}]"#).expect("bare");
        assert_eq!(bare.candidates.len(), 2);

        let wrapped = parse_batch(r#"{"fetched_at":"x","photos":[{"imagn_id":"3"}]}"#)
            .expect("wrapped");
        assert_eq!(wrapped.candidates.len(), 1);
        assert_eq!(wrapped.candidates[0].id, "3");
    }

    #[test]
    fn numeric_ids_become_strings() {
        let batch = parse_batch(r#"[{"id": 22501234, "headline": "Nike"}]"#).expect("parse");
        assert_eq!(batch.candidates[0].id, "22501234");
    }

    #[test]
    fn non_record_entries_are_rejected_not_fatal() {
        let batch = parse_batch(r#"[{"id":"1"}, 42, "text", {"id":"2","caption":7}]"#)
            .expect("parse");
        assert_eq!(batch.rejected, 2);
        assert_eq!(batch.candidates.len(), 2);
        assert_eq!(batch.candidates[1].id, "2");
        assert!(batch.candidates[1].caption.is_empty());
    }

    #[test]
    fn null_fields_keep_the_candidate() {
        let batch = parse_batch(r#"[{"imagn_id":"9","headline":null,"caption":"Nike Ja 1"}]"#)
            .expect("parse");
        assert_eq!(batch.rejected, 0);
        assert_eq!(batch.candidates[0].id, "9");
        assert!(batch.candidates[0].headline.is_empty());
        assert_eq!(batch.candidates[0].caption, "Nike Ja 1");
    }

    #[test]
    fn wrong_top_level_shape_is_an_error() {
        assert!(parse_batch("17").is_err());
        assert!(parse_batch(r#"{"items": []}"#).is_err());
        assert!(parse_batch("not json").is_err());
    }
}
