use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Env var naming the database file, loaded after `.env` (dotenvy)
pub const DATABASE_ENV: &str = "PODIUM_DATABASE";

/// Fallback database path when nothing else names one
pub const DEFAULT_DATABASE: &str = "olympics.db";

/// Optional defaults from `podium.toml`. Every field may be omitted; the
/// CLI and env override anything set here.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PodiumConfig {
    pub database: Option<String>,
    pub csv: Option<String>,
    pub from_year: Option<u16>,
    pub to_year: Option<u16>,
    pub batch_size: Option<usize>,
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("podium.toml")
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Option<PodiumConfig>> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)?;
    let config: PodiumConfig = toml::from_str(&contents)?;
    Ok(Some(config))
}

/// Pick the database path: CLI flag, then env, then config file, then the
/// default.
pub fn resolve_database(cli: Option<PathBuf>, config: &PodiumConfig) -> PathBuf {
    cli.or_else(|| std::env::var(DATABASE_ENV).ok().map(PathBuf::from))
        .or_else(|| config.database.clone().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE))
}

pub fn ensure_db_dir(db_path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
