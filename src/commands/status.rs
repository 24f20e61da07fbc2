use anyhow::Result;

use crate::archive::config::load_config;
use crate::archive::paths::resolve_paths;
use crate::archive::store::LoadOutcome;
use crate::commands::{CommandReport, describe_load, load_archive};

pub fn run() -> Result<CommandReport> {
    let paths = resolve_paths()?;
    let mut report = CommandReport::new("status");

    report.detail(format!("home={}", paths.home.display()));
    report.detail(format!("archive_file={}", paths.archive_file.display()));
    report.detail(format!(
        "config_file={} exists={}",
        paths.config_file.display(),
        paths.config_file.exists()
    ));
    report.detail(format!("lock_file={}", paths.lock_file().display()));

    let config = match load_config(&paths) {
        Ok(config) => config,
        Err(err) => {
            report.issue(format!("config invalid: {err:#}"));
            return Ok(report);
        }
    };
    report.detail(format!("store.backup_keep={}", config.store.backup_keep));
    report.detail(format!("store.allow_shrink={}", config.store.allow_shrink));
    report.detail(format!("query.recent_days={}", config.query.recent_days));
    report.detail(format!(
        "query.timezone={}",
        config.query.timezone.as_deref().unwrap_or("local")
    ));
    report.detail(format!("brands.rules={}", config.brands.len()));

    let loaded = load_archive(&paths, &config)?;
    describe_load(&loaded.outcome, &mut report);
    if let LoadOutcome::Recovered { reason, .. } = &loaded.outcome {
        report.issue(format!(
            "archive file is malformed and would be treated as empty: {reason}"
        ));
    }
    report.detail(format!("photo_count={}", loaded.archive.len()));
    for backup in loaded.store.existing_backups() {
        report.detail(format!("backup={}", backup.display()));
    }

    Ok(report)
}
