//! Runtime configuration
//!
//! Resolution order: built-in defaults, `<data_dir>/config.json`, then
//! environment (`HEALTHLOG_DIR`, `HEALTHLOG_USER`), then CLI flags.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use directories::BaseDirs;
use serde::{Deserialize, Serialize};

use crate::types::{HealthLogError, Result, UserId, UserProfile, DEFAULT_HEIGHT_M};

pub const CONFIG_FILE: &str = "config.json";
pub const DATA_DIR_ENV: &str = "HEALTHLOG_DIR";
pub const USER_ENV: &str = "HEALTHLOG_USER";

/// Daily water goal (ml)
pub const DEFAULT_WATER_GOAL_ML: f64 = 2000.0;

/// Optional overrides stored in `config.json`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub users: Option<Vec<UserProfile>>,
    pub default_user: Option<String>,
    pub water_goal_ml: Option<f64>,
    pub height_m: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub data_dir: PathBuf,
    /// Fixed household roster; aggregation iterates in this order
    pub users: Vec<UserProfile>,
    pub current_user: UserId,
    pub water_goal_ml: f64,
    pub height_m: f64,
}

pub fn default_roster() -> Vec<UserProfile> {
    vec![
        UserProfile::new("Me", "我"),
        UserProfile::new("Wife", "老婆"),
        UserProfile::new("Family", "家人"),
    ]
}

impl Config {
    /// Resolve configuration for the CLI
    pub fn load(data_dir: Option<PathBuf>, user: Option<String>) -> Result<Self> {
        let data_dir = match data_dir.or_else(|| env::var_os(DATA_DIR_ENV).map(PathBuf::from)) {
            Some(dir) => dir,
            None => Self::default_data_dir()?,
        };
        let user = user.or_else(|| env::var(USER_ENV).ok().filter(|u| !u.is_empty()));
        Self::resolve(data_dir, user.as_deref())
    }

    /// `~/.healthlog`
    pub fn default_data_dir() -> Result<PathBuf> {
        let base_dirs = BaseDirs::new()
            .ok_or_else(|| HealthLogError::Config("Cannot determine home directory".into()))?;
        Ok(base_dirs.home_dir().join(".healthlog"))
    }

    /// Build from a data directory and an optional user override; no env lookups.
    pub fn resolve(data_dir: PathBuf, user: Option<&str>) -> Result<Self> {
        let file = read_file_config(&data_dir)?;

        let users = file.users.unwrap_or_else(default_roster);
        validate_roster(&users)?;

        let current = user
            .map(str::to_string)
            .or(file.default_user)
            .unwrap_or_else(|| users[0].id.as_str().to_string());
        let current_user = UserId::new(current);
        if !users.iter().any(|u| u.id == current_user) {
            return Err(HealthLogError::Config(format!(
                "unknown user {:?}; roster is {}",
                current_user.as_str(),
                users
                    .iter()
                    .map(|u| u.id.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            )));
        }

        let water_goal_ml = file.water_goal_ml.unwrap_or(DEFAULT_WATER_GOAL_ML);
        if !(water_goal_ml > 0.0) {
            return Err(HealthLogError::Config("water_goal_ml must be positive".into()));
        }

        Ok(Self {
            data_dir,
            users,
            current_user,
            water_goal_ml,
            height_m: file.height_m.unwrap_or(DEFAULT_HEIGHT_M),
        })
    }

    pub fn roster_ids(&self) -> Vec<UserId> {
        self.users.iter().map(|u| u.id.clone()).collect()
    }

    /// Display label for a user, falling back to the raw id
    pub fn label_for<'a>(&'a self, user: &'a UserId) -> &'a str {
        self.users
            .iter()
            .find(|u| &u.id == user)
            .map(|u| u.label.as_str())
            .unwrap_or_else(|| user.as_str())
    }
}

fn read_file_config(data_dir: &Path) -> Result<FileConfig> {
    let path = data_dir.join(CONFIG_FILE);
    if !path.exists() {
        return Ok(FileConfig::default());
    }
    let content = fs::read_to_string(&path)?;
    serde_json::from_str(&content)
        .map_err(|e| HealthLogError::Config(format!("{}: {}", path.display(), e)))
}

fn validate_roster(users: &[UserProfile]) -> Result<()> {
    if users.is_empty() {
        return Err(HealthLogError::Config("user roster is empty".into()));
    }
    for (i, user) in users.iter().enumerate() {
        if user.id.as_str().trim().is_empty() {
            return Err(HealthLogError::Config("user id must not be empty".into()));
        }
        if users[..i].iter().any(|u| u.id == user.id) {
            return Err(HealthLogError::Config(format!(
                "duplicate user id {:?}",
                user.id.as_str()
            )));
        }
    }
    Ok(())
}
