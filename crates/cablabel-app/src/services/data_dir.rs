// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Platform-aware config and data directory resolution.

use std::path::PathBuf;

const APP_DIR: &str = "cablabel";

/// Directory holding `settings.json`. Not created here.
pub fn config_dir() -> PathBuf {
    base_dir("XDG_CONFIG_HOME", &[".config"]).join(APP_DIR)
}

fn data_dir() -> PathBuf {
    base_dir("XDG_DATA_HOME", &[".local", "share"]).join(APP_DIR)
}

/// Return a subdirectory inside the data dir (e.g. "previews"), creating it
/// if needed.
pub fn data_subdir(name: &str) -> PathBuf {
    ensure_subdir(data_dir(), name)
}

fn ensure_subdir(base: PathBuf, name: &str) -> PathBuf {
    let dir = base.join(name);
    std::fs::create_dir_all(&dir).ok();
    dir
}

fn base_dir(xdg_var: &str, home_relative: &[&str]) -> PathBuf {
    if let Some(xdg) = std::env::var_os(xdg_var).filter(|v| !v.is_empty()) {
        return PathBuf::from(xdg);
    }
    if let Some(home) = std::env::var_os("HOME") {
        return home_relative
            .iter()
            .fold(PathBuf::from(home), |path, part| path.join(part));
    }
    // Last resort
    PathBuf::from("/tmp")
}
