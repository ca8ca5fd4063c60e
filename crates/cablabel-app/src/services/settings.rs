// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Settings file handling for the CLI.
//
// Settings live in a flat JSON object keyed like the host plugin settings
// (`IP_ADDRESS`, `PRINTER_USE_TLS`, ...). Each key can be overridden with a
// `CABLABEL_<KEY>` environment variable.

use std::path::{Path, PathBuf};

use cablabel_core::PrinterSettings;
use cablabel_core::config::keys;
use cablabel_core::error::{CabError, Result};
use cablabel_host::{MapSettings, load_settings_file};
use tracing::{debug, info};

use super::data_dir::config_dir;

pub const ENV_PREFIX: &str = "CABLABEL_";

pub fn default_settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

/// Load settings from `explicit`, or from the default location if present.
///
/// An explicitly named file must exist. A missing default file just means
/// everything comes from defaults and the environment.
pub fn load(explicit: Option<&Path>) -> Result<MapSettings> {
    let mut settings = match explicit {
        Some(path) => load_settings_file(path)?,
        None => {
            let path = default_settings_path();
            if path.exists() {
                load_settings_file(&path)?
            } else {
                debug!(path = %path.display(), "no settings file, using defaults");
                MapSettings::new()
            }
        }
    };
    settings.overlay_env(ENV_PREFIX, &keys::ALL);
    Ok(settings)
}

/// Write the default settings to `path`. Refuses to replace an existing file
/// unless `force` is set.
pub fn write_defaults(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        return Err(CabError::Configuration(format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        )));
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(&PrinterSettings::default())?;
    std::fs::write(path, json + "\n")?;
    info!(path = %path.display(), "default settings written");
    Ok(())
}
