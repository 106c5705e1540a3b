//! Environment-driven settings of a migration run.
use std::path::PathBuf;

use crate::errors::ConfigError;
use crate::plan::EntitySelection;

pub(crate) const DATABASE_URL: &str = "DATABASE_URL";
const EXPORT_DIR: &str = "MIGRATION_EXPORT_DIR";
const INCLUDE: &str = "MIGRATION_INCLUDE";
const EXCLUDE: &str = "MIGRATION_EXCLUDE";
const DRY_RUN: &str = "MIGRATION_DRY_RUN";
const AUDIT_DIR: &str = "MIGRATION_AUDIT_DIR";
const MAX_CONNECTIONS: &str = "MIGRATION_MAX_CONNECTIONS";
const APPLY_SCHEMA: &str = "MIGRATION_APPLY_SCHEMA";

const DEFAULT_EXPORT_DIR: &str = "./data";
const DEFAULT_MAX_CONNECTIONS: u32 = 1;

/// Settings of a migration run.
#[derive(Debug, Clone, PartialEq)]
pub struct MigrationConfig {
    /// PostgreSQL connection string; `None` only in dry-run mode.
    pub database_url: Option<String>,
    pub export_dir: PathBuf,
    pub selection: EntitySelection,
    /// Run against an in-memory store instead of PostgreSQL.
    pub dry_run: bool,
    pub audit_dir: Option<PathBuf>,
    pub max_connections: u32,
    pub apply_schema: bool,
}

impl MigrationConfig {
    /// Reads the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads the configuration through `lookup`, which returns the value of a
    /// variable or `None` when it is unset. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let dry_run = parse_bool(DRY_RUN, get(DRY_RUN), false)?;
        let database_url = get(DATABASE_URL);
        if database_url.is_none() && !dry_run {
            return Err(ConfigError::MissingVar(DATABASE_URL));
        }

        let max_connections = match get(MAX_CONNECTIONS) {
            None => DEFAULT_MAX_CONNECTIONS,
            Some(raw) => raw
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or(ConfigError::InvalidVar {
                    name: MAX_CONNECTIONS,
                    value: raw,
                })?,
        };

        Ok(Self {
            database_url,
            export_dir: get(EXPORT_DIR)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_EXPORT_DIR)),
            selection: EntitySelection {
                include: get(INCLUDE).map(|raw| parse_list(&raw)),
                exclude: get(EXCLUDE).map(|raw| parse_list(&raw)).unwrap_or_default(),
            },
            dry_run,
            audit_dir: get(AUDIT_DIR).map(PathBuf::from),
            max_connections,
            apply_schema: parse_bool(APPLY_SCHEMA, get(APPLY_SCHEMA), true)?,
        })
    }
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_bool(name: &'static str, raw: Option<String>, default: bool) -> Result<bool, ConfigError> {
    let Some(raw) = raw else {
        return Ok(default);
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidVar { name, value: raw }),
    }
}
