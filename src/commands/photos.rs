use anyhow::Result;

use crate::archive::config::load_config;
use crate::archive::paths::resolve_paths;
use crate::archive::record::PhotoRecord;
use crate::commands::{CommandReport, describe_load, load_archive};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhotoFilter {
    All,
    Player(String),
    Brand(String),
    Week(String),
    /// `None` uses the configured recency window.
    Recent(Option<u32>),
}

#[derive(Debug, Clone)]
pub struct PhotosOptions {
    pub filter: PhotoFilter,
    pub limit: Option<usize>,
}

pub fn run(opts: &PhotosOptions) -> Result<CommandReport> {
    let paths = resolve_paths()?;
    let config = load_config(&paths)?;
    let mut report = CommandReport::new("photos");

    let loaded = load_archive(&paths, &config)?;
    describe_load(&loaded.outcome, &mut report);
    let archive = &loaded.archive;

    let mut photos: Vec<&PhotoRecord> = match &opts.filter {
        PhotoFilter::All => archive.all_photos(),
        PhotoFilter::Player(slug) => archive.photos_by_player(slug),
        PhotoFilter::Brand(slug) => archive.photos_by_brand(slug),
        PhotoFilter::Week(label) => archive.photos_by_week(label),
        PhotoFilter::Recent(days) => {
            let days = days
                .map(i64::from)
                .unwrap_or(archive.query_config().recent_days);
            report.detail(format!("recent_days={days}"));
            archive.recent_photos(days)
        }
    };
    report.detail(format!("filter={:?}", opts.filter));
    report.detail(format!("matched={}", photos.len()));

    if let Some(limit) = opts.limit {
        photos.truncate(limit);
    }
    report.set_data(&photos)?;
    Ok(report)
}
