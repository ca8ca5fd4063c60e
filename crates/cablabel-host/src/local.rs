// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Filesystem-backed host capabilities.

use std::path::{Path, PathBuf};

use cablabel_core::error::{CabError, Result};
use tracing::{info, instrument};

use crate::memory::MapSettings;
use crate::traits::PreviewStore;

/// Load a flat JSON settings file.
#[instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn load_settings_file(path: impl AsRef<Path>) -> Result<MapSettings> {
    let raw = std::fs::read_to_string(path.as_ref())?;
    let value: serde_json::Value = serde_json::from_str(&raw)?;
    MapSettings::from_json(&value)
}

/// Writes preview images into a directory, one file per request.
#[derive(Debug, Clone)]
pub struct DirectoryPreviewStore {
    dir: PathBuf,
}

impl DirectoryPreviewStore {
    /// Use `dir`, creating it if needed.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// `labels.png` becomes `labels-<timestamp>.png` so earlier previews are
    /// not overwritten.
    fn unique_path(&self, filename: &str) -> PathBuf {
        let name = Path::new(filename);
        let stem = name
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("preview");
        let ext = name.extension().and_then(|s| s.to_str()).unwrap_or("png");
        let stamp = chrono::Utc::now().format("%Y%m%dT%H%M%S%.3f");

        let mut candidate = self.dir.join(format!("{stem}-{stamp}.{ext}"));
        let mut n = 1;
        while candidate.exists() {
            candidate = self.dir.join(format!("{stem}-{stamp}-{n}.{ext}"));
            n += 1;
        }
        candidate
    }
}

impl PreviewStore for DirectoryPreviewStore {
    fn store(&self, filename: &str, png: Vec<u8>) -> Result<String> {
        let path = self.unique_path(filename);
        std::fs::write(&path, &png)
            .map_err(|e| CabError::Storage(format!("write {}: {e}", path.display())))?;
        info!(path = %path.display(), bytes = png.len(), "preview stored");
        Ok(format!("file://{}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::HostSettings;
    use cablabel_core::config::keys;

    #[test]
    fn settings_file_round_trips_into_printer_settings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(
            &path,
            r#"{"IP_ADDRESS": "192.168.1.50", "WEB_SERVICE_AUTHENTICATION": "none", "PRINTER_VERIFY_TLS": true}"#,
        )
        .unwrap();

        let settings = load_settings_file(&path).unwrap();
        assert_eq!(settings.get(keys::IP_ADDRESS).as_deref(), Some("192.168.1.50"));

        let printer = settings.printer_settings().unwrap();
        assert!(printer.printer_verify_tls);
        assert_eq!(printer.web_service_authentication, "none");
    }

    #[test]
    fn malformed_settings_file_is_serialization_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            load_settings_file(&path),
            Err(CabError::Serialization(_))
        ));
    }

    #[test]
    fn stores_do_not_overwrite_each_other() {
        let dir = tempfile::tempdir().unwrap();
        let store = DirectoryPreviewStore::new(dir.path().join("previews")).unwrap();

        let first = store.store("labels.png", vec![1]).unwrap();
        let second = store.store("labels.png", vec![2]).unwrap();
        assert_ne!(first, second);

        let first_path = first.strip_prefix("file://").unwrap();
        assert_eq!(std::fs::read(first_path).unwrap(), vec![1]);
        assert!(first_path.ends_with(".png"));
        assert_eq!(std::fs::read_dir(store.dir()).unwrap().count(), 2);
    }
}
