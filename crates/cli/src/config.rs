// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Config file discovery.
//!
//! Lookup order:
//! 1. `--config PATH` (must exist)
//! 2. `$TICK_CONFIG` (must exist)
//! 3. `<user config dir>/tick/config.toml` (optional)
//! 4. built-in defaults
//!
//! `--server` then overrides whatever was loaded.

use std::path::{Path, PathBuf};

use tk_sync::SyncConfig;
use tracing::debug;

use crate::error::{Error, Result};

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "TICK_CONFIG";

const APP_DIR_NAME: &str = "tick";
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default config file location under the user config dir.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR_NAME).join(CONFIG_FILE_NAME))
}

/// Resolves the effective config from flags and the environment.
pub fn resolve(flag: Option<PathBuf>, server: Option<String>) -> Result<SyncConfig> {
    let env = std::env::var_os(CONFIG_ENV)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from);
    resolve_with(flag, env, default_config_path(), server)
}

pub(crate) fn resolve_with(
    flag: Option<PathBuf>,
    env: Option<PathBuf>,
    fallback: Option<PathBuf>,
    server: Option<String>,
) -> Result<SyncConfig> {
    let mut config = match flag.or(env) {
        Some(path) => load_required(&path)?,
        None => match fallback {
            Some(path) if path.is_file() => {
                debug!("using config at {}", path.display());
                SyncConfig::load(&path)?
            }
            _ => SyncConfig::default(),
        },
    };

    if let Some(server) = server {
        config.server = server;
        config.validate()?;
    }
    Ok(config)
}

fn load_required(path: &Path) -> Result<SyncConfig> {
    if !path.is_file() {
        return Err(Error::ConfigNotFound(path.to_path_buf()));
    }
    debug!("using config at {}", path.display());
    Ok(SyncConfig::load(path)?)
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
