use anyhow::Result;
use std::env;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct ArchivePaths {
    pub home: PathBuf,
    pub archive_file: PathBuf,
    pub config_file: PathBuf,
}

impl ArchivePaths {
    /// Layout rooted at `home`, used by tests and by `resolve_paths`.
    pub fn under(home: &Path) -> Self {
        Self {
            home: home.to_path_buf(),
            archive_file: home.join("data").join("archive.json"),
            config_file: home.join("config.toml"),
        }
    }

    pub fn lock_file(&self) -> PathBuf {
        sibling_with_suffix(&self.archive_file, ".lock")
    }
}

/// `archive.json` + `.bak.1` → `archive.json.bak.1`.
pub fn sibling_with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "archive.json".into());
    name.push(suffix);
    path.with_file_name(name)
}

fn required_home_dir() -> Result<PathBuf> {
    if let Some(home) = dirs::home_dir() {
        return Ok(home);
    }
    Err(anyhow::anyhow!("HOME directory could not be resolved"))
}

fn env_or_default_path(var: &str, fallback: PathBuf) -> PathBuf {
    match env::var(var) {
        Ok(v) if !v.trim().is_empty() => PathBuf::from(v.trim()),
        _ => fallback,
    }
}

pub fn resolve_paths() -> Result<ArchivePaths> {
    let home = match env::var("PHOTO_ARCHIVE_HOME") {
        Ok(v) if !v.trim().is_empty() => PathBuf::from(v.trim()),
        _ => required_home_dir()?.join(".photo-archive"),
    };
    let defaults = ArchivePaths::under(&home);

    Ok(ArchivePaths {
        archive_file: env_or_default_path("PHOTO_ARCHIVE_FILE", defaults.archive_file),
        config_file: env_or_default_path("PHOTO_ARCHIVE_CONFIG_PATH", defaults.config_file),
        home,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_layout_under_home() {
        let paths = ArchivePaths::under(Path::new("/srv/kicks"));
        assert_eq!(
            paths.archive_file,
            PathBuf::from("/srv/kicks/data/archive.json")
        );
        assert_eq!(paths.config_file, PathBuf::from("/srv/kicks/config.toml"));
        assert_eq!(
            paths.lock_file(),
            PathBuf::from("/srv/kicks/data/archive.json.lock")
        );
    }

    #[test]
    fn sibling_suffix_keeps_directory() {
        assert_eq!(
            sibling_with_suffix(Path::new("/a/b/archive.json"), ".bak.2"),
            PathBuf::from("/a/b/archive.json.bak.2")
        );
    }
}
