use anyhow::Result;

use crate::archive::config::load_config;
use crate::archive::paths::resolve_paths;
use crate::commands::{CommandReport, describe_load, load_archive};

pub fn run() -> Result<CommandReport> {
    let paths = resolve_paths()?;
    let config = load_config(&paths)?;
    let mut report = CommandReport::new("stats");

    let loaded = load_archive(&paths, &config)?;
    describe_load(&loaded.outcome, &mut report);

    if loaded.archive.is_empty() {
        report.detail("archive has no photos yet");
    }
    let stats = loaded.archive.stats();
    report.detail(format!("total_photos={}", stats.total_photos));
    report.detail(format!("total_players={}", stats.total_players));
    report.detail(format!("total_brands={}", stats.total_brands));
    report.detail(format!("total_weeks={}", stats.total_weeks));
    report.set_data(&stats)?;
    Ok(report)
}
