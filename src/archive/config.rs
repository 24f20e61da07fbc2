use crate::archive::brands::{BrandCatalog, BrandRule, OTHER_BRAND_SLUG};
use crate::archive::paths::ArchivePaths;
use crate::error::ArchiveError;
use anyhow::{Result, anyhow};
use chrono::{Local, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::env;
use std::fs;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub backup_keep: usize,
    pub allow_shrink: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backup_keep: 3,
            allow_shrink: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    pub recent_days: i64,
    pub top_players: usize,
    pub top_brands: usize,
    pub recent_weeks: usize,
    pub timezone: Option<String>,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            recent_days: 7,
            top_players: 10,
            top_brands: 5,
            recent_weeks: 4,
            timezone: None,
        }
    }
}

impl QueryConfig {
    /// Calendar date used as "now" by recency queries.
    pub fn today(&self) -> NaiveDate {
        match self.timezone.as_deref().and_then(|tz| tz.parse::<Tz>().ok()) {
            Some(tz) => Utc::now().with_timezone(&tz).date_naive(),
            None => Local::now().date_naive(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchiveConfig {
    pub store: StoreConfig,
    pub query: QueryConfig,
    pub brands: Vec<BrandRule>,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            store: StoreConfig::default(),
            query: QueryConfig::default(),
            brands: BrandCatalog::default().rules().to_vec(),
        }
    }
}

impl ArchiveConfig {
    pub fn brand_catalog(&self) -> BrandCatalog {
        BrandCatalog::new(self.brands.clone())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct PartialArchiveConfig {
    store: Option<StoreConfig>,
    query: Option<QueryConfig>,
    brands: Option<Vec<BrandRule>>,
}

fn env_or_usize(var: &str, fallback: usize) -> usize {
    match env::var(var) {
        Ok(v) => v.trim().parse::<usize>().ok().unwrap_or(fallback),
        Err(_) => fallback,
    }
}

fn env_or_i64(var: &str, fallback: i64) -> i64 {
    match env::var(var) {
        Ok(v) => v.trim().parse::<i64>().ok().unwrap_or(fallback),
        Err(_) => fallback,
    }
}

fn env_or_bool(var: &str, fallback: bool) -> bool {
    match env::var(var) {
        Ok(v) => {
            let trimmed = v.trim();
            match trimmed {
                "1" | "true" | "TRUE" | "yes" | "on" => true,
                "0" | "false" | "FALSE" | "no" | "off" => false,
                _ => fallback,
            }
        }
        Err(_) => fallback,
    }
}

fn env_or_optional_string(var: &str, fallback: Option<String>) -> Option<String> {
    match env::var(var) {
        Ok(v) if !v.trim().is_empty() => Some(v.trim().to_string()),
        _ => fallback,
    }
}

pub fn validate(cfg: &ArchiveConfig) -> Result<(), ArchiveError> {
    let invalid = |msg: String| Err(ArchiveError::InvalidConfig(msg));

    if cfg.query.recent_days < 0 {
        return invalid("query.recent_days must be >= 0".to_string());
    }
    if cfg.query.top_players == 0 || cfg.query.top_brands == 0 || cfg.query.recent_weeks == 0 {
        return invalid("query limits must be >= 1".to_string());
    }
    if let Some(tz) = cfg.query.timezone.as_deref()
        && tz.parse::<Tz>().is_err()
    {
        return invalid(format!("unknown timezone `{tz}`"));
    }
    if cfg.brands.is_empty() {
        return invalid("brand table cannot be empty".to_string());
    }

    let mut seen_keywords = BTreeSet::new();
    for rule in &cfg.brands {
        if rule.keyword.trim().is_empty() || rule.slug.trim().is_empty() {
            return invalid("brand keyword and slug cannot be empty".to_string());
        }
        if rule.slug == OTHER_BRAND_SLUG {
            return invalid(format!(
                "brand slug `{OTHER_BRAND_SLUG}` is reserved for unmatched photos"
            ));
        }
        if !seen_keywords.insert(rule.keyword.to_lowercase()) {
            return invalid(format!("duplicate brand keyword `{}`", rule.keyword));
        }
    }
    Ok(())
}

fn merge_file_config(base: &mut ArchiveConfig, paths: &ArchivePaths) -> Result<()> {
    let path = &paths.config_file;
    if !path.exists() {
        return Ok(());
    }

    let raw = fs::read_to_string(path)?;
    let parsed: PartialArchiveConfig = toml::from_str(&raw)
        .map_err(|err| anyhow!("failed to parse archive config {}: {err}", path.display()))?;
    if let Some(store) = parsed.store {
        base.store = store;
    }
    if let Some(query) = parsed.query {
        base.query = query;
    }
    if let Some(brands) = parsed.brands {
        base.brands = brands;
    }
    Ok(())
}

pub fn load_config(paths: &ArchivePaths) -> Result<ArchiveConfig> {
    let mut cfg = ArchiveConfig::default();
    merge_file_config(&mut cfg, paths)?;

    cfg.store.backup_keep = env_or_usize("PHOTO_ARCHIVE_BACKUP_KEEP", cfg.store.backup_keep);
    cfg.store.allow_shrink = env_or_bool("PHOTO_ARCHIVE_ALLOW_SHRINK", cfg.store.allow_shrink);
    cfg.query.recent_days = env_or_i64("PHOTO_ARCHIVE_RECENT_DAYS", cfg.query.recent_days);
    cfg.query.timezone =
        env_or_optional_string("PHOTO_ARCHIVE_TIMEZONE", cfg.query.timezone.take());

    validate(&cfg)?;
    Ok(cfg)
}
