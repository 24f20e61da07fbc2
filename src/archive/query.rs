use crate::archive::Archive;
use crate::archive::brands::OTHER_BRAND_SLUG;
use crate::archive::dates::{format_stored_date, parse_stored_date, week_label};
use crate::archive::record::PhotoRecord;
use chrono::{NaiveDate, TimeDelta};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerSummary {
    pub name: String,
    pub slug: String,
    pub count: usize,
    pub latest_date: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BrandSummary {
    pub name: String,
    pub slug: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeekSummary {
    pub week: String,
    pub count: usize,
}

/// Newest `photo_date` first; equal dates fall back to `id` ascending.
fn newest_first(a: &&PhotoRecord, b: &&PhotoRecord) -> Ordering {
    b.photo_date
        .cmp(&a.photo_date)
        .then_with(|| a.id.cmp(&b.id))
}

fn brand_slug_of(record: &PhotoRecord) -> &str {
    if record.brand_slug.is_empty() {
        OTHER_BRAND_SLUG
    } else {
        &record.brand_slug
    }
}

fn week_of(record: &PhotoRecord) -> Option<String> {
    parse_stored_date(&record.photo_date).map(week_label)
}

impl Archive {
    fn select<F>(&self, keep: F) -> Vec<&PhotoRecord>
    where
        F: Fn(&PhotoRecord) -> bool,
    {
        let mut out: Vec<&PhotoRecord> = self.photos.values().filter(|p| keep(p)).collect();
        out.sort_by(newest_first);
        out
    }

    pub fn all_photos(&self) -> Vec<&PhotoRecord> {
        self.select(|_| true)
    }

    pub fn photos_by_player(&self, player_slug: &str) -> Vec<&PhotoRecord> {
        self.select(|p| p.player_slug == player_slug)
    }

    pub fn photos_by_brand(&self, brand_slug: &str) -> Vec<&PhotoRecord> {
        self.select(|p| brand_slug_of(p) == brand_slug)
    }

    /// Photos whose date falls in `label` (e.g. `2024-W01`). Records with
    /// unparseable dates never match.
    pub fn photos_by_week(&self, label: &str) -> Vec<&PhotoRecord> {
        self.select(|p| week_of(p).is_some_and(|week| week == label))
    }

    pub fn recent_photos(&self, days: i64) -> Vec<&PhotoRecord> {
        self.recent_photos_as_of(self.query.today(), days)
    }

    /// Photos dated on or after `today - days`. The comparison is on the
    /// zero-padded date strings; records whose date does not parse are left
    /// out.
    pub fn recent_photos_as_of(&self, today: NaiveDate, days: i64) -> Vec<&PhotoRecord> {
        let cutoff = TimeDelta::try_days(days)
            .and_then(|window| today.checked_sub_signed(window))
            .unwrap_or(NaiveDate::MIN);
        let cutoff = format_stored_date(cutoff);
        self.select(|p| {
            parse_stored_date(&p.photo_date).is_some() && p.photo_date.as_str() >= cutoff.as_str()
        })
    }

    /// Players with at least one named photo, most photographed first.
    /// The display name is taken from the player's newest photo.
    pub fn all_players(&self) -> Vec<PlayerSummary> {
        let mut groups: BTreeMap<&str, PlayerSummary> = BTreeMap::new();
        for photo in self.all_photos() {
            if photo.player_slug.is_empty() || photo.player_name.is_empty() {
                continue;
            }
            // Newest-first iteration: the first hit carries the latest date.
            let entry = groups
                .entry(photo.player_slug.as_str())
                .or_insert_with(|| PlayerSummary {
                    name: photo.player_name.clone(),
                    slug: photo.player_slug.clone(),
                    count: 0,
                    latest_date: photo.photo_date.clone(),
                });
            entry.count += 1;
        }

        let mut players: Vec<PlayerSummary> = groups.into_values().collect();
        players.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.slug.cmp(&b.slug)));
        players
    }

    /// Every brand bucket present, including `other`.
    pub fn all_brands(&self) -> Vec<BrandSummary> {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for photo in self.photos.values() {
            *counts.entry(brand_slug_of(photo)).or_default() += 1;
        }

        let mut brands: Vec<BrandSummary> = counts
            .into_iter()
            .map(|(slug, count)| BrandSummary {
                name: self.brands.display_name(slug),
                slug: slug.to_string(),
                count,
            })
            .collect();
        brands.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.slug.cmp(&b.slug)));
        brands
    }

    /// Week buckets, newest label first.
    pub fn all_weeks(&self) -> Vec<WeekSummary> {
        let mut counts: BTreeMap<String, usize> = BTreeMap::new();
        for photo in self.photos.values() {
            if let Some(week) = week_of(photo) {
                *counts.entry(week).or_default() += 1;
            }
        }
        counts
            .into_iter()
            .rev()
            .map(|(week, count)| WeekSummary { week, count })
            .collect()
    }
}
