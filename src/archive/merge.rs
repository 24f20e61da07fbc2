use crate::archive::Archive;
use crate::archive::dates::{normalize_photo_date, parse_stored_date};
use crate::archive::record::{PhotoRecord, is_blank_value};
use crate::archive::slug::player_slug;
use crate::archive::util::now_timestamp;
use crate::archive::warn::{self, WarnEvent};
use crate::error::ArchiveWarnCode;
use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IngestSummary {
    /// Records created by this batch.
    pub new: usize,
    /// Candidates whose id already existed.
    pub merged: usize,
    /// Candidates dropped for lacking an id.
    pub skipped: usize,
}

/// Copy every non-empty incoming field into a currently-empty slot of
/// `existing`. Populated fields are never replaced. Returns whether anything
/// changed.
fn fill_forward(existing: &mut PhotoRecord, incoming: PhotoRecord) -> bool {
    let mut changed = false;
    for (slot, value) in existing
        .mergeable_fields_mut()
        .into_iter()
        .zip(incoming.mergeable_fields())
    {
        if slot.is_empty() && !value.is_empty() {
            slot.clone_from(value);
            changed = true;
        }
    }

    for (key, value) in incoming.extra {
        match existing.extra.get_mut(&key) {
            Some(slot) => {
                if is_blank_value(slot) && !is_blank_value(&value) {
                    *slot = value;
                    changed = true;
                }
            }
            None => {
                existing.extra.insert(key, value);
                changed = true;
            }
        }
    }
    changed
}

impl Archive {
    /// Merge a batch of candidate records from the fetcher.
    ///
    /// New ids get derived slugs and an `added_at` stamp; known ids are
    /// fill-forward merged. Each candidate is applied on its own, so a batch
    /// abandoned midway leaves only whole records behind. Nothing is written
    /// to disk.
    pub fn add_photos<I>(&mut self, batch: I) -> IngestSummary
    where
        I: IntoIterator<Item = PhotoRecord>,
    {
        let mut summary = IngestSummary::default();
        for mut candidate in batch {
            candidate.id = candidate.id.trim().to_string();
            if !candidate.has_id() {
                summary.skipped += 1;
                tracing::debug!("skipping candidate without id");
                continue;
            }
            candidate.photo_date = normalize_photo_date(&candidate.photo_date);
            if !candidate.photo_date.is_empty() && parse_stored_date(&candidate.photo_date).is_none()
            {
                warn::emit(WarnEvent {
                    code: ArchiveWarnCode::DateUnparseable,
                    stage: "merge",
                    action: "keep-verbatim",
                    record: &candidate.id,
                    path: "",
                    reason: "photo date matches no known format",
                    err: &candidate.photo_date,
                });
            }

            if let Some(existing) = self.photos.get_mut(&candidate.id) {
                let id = candidate.id.clone();
                if fill_forward(existing, candidate) {
                    tracing::debug!(id = %id, "filled empty fields on existing record");
                }
                summary.merged += 1;
                continue;
            }

            candidate.player_slug = player_slug(&candidate.player_name);
            candidate.brand_slug = self.brands.classify(&candidate.brand_text()).to_string();
            candidate.added_at = now_timestamp();
            self.photos.insert(candidate.id.clone(), candidate);
            summary.new += 1;
        }

        tracing::info!(
            new = summary.new,
            merged = summary.merged,
            skipped = summary.skipped,
            total = self.photos.len(),
            "ingested photo batch"
        );
        summary
    }
}
