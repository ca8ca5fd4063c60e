// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// In-memory host capabilities for tests and embedding.

use std::collections::HashMap;
use std::sync::Mutex;

use cablabel_core::OffloadPayload;
use cablabel_core::error::{CabError, Result};
use tracing::debug;

use crate::traits::{HostSettings, JobOffload, PreviewStore};

/// Settings held in a plain map.
#[derive(Debug, Clone, Default)]
pub struct MapSettings {
    values: HashMap<String, String>,
}

impl MapSettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: &str, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.values.insert(key.to_string(), value.into());
    }

    /// Build from a flat JSON object. Strings are taken verbatim, booleans and
    /// numbers are stringified, nulls are treated as unset.
    pub fn from_json(value: &serde_json::Value) -> Result<Self> {
        let object = value.as_object().ok_or_else(|| {
            CabError::Configuration("settings must be a JSON object of KEY: value pairs".into())
        })?;

        let mut settings = Self::new();
        for (key, value) in object {
            match value {
                serde_json::Value::Null => {}
                serde_json::Value::String(s) => settings.set(key, s.clone()),
                serde_json::Value::Bool(_) | serde_json::Value::Number(_) => {
                    settings.set(key, value.to_string())
                }
                other => {
                    return Err(CabError::Configuration(format!(
                        "setting {key} must be a string, number or boolean, got {other}"
                    )));
                }
            }
        }
        Ok(settings)
    }

    /// Overlay values from environment variables named `{prefix}{KEY}`.
    pub fn overlay_env(&mut self, prefix: &str, keys: &[&str]) {
        for key in keys {
            if let Ok(value) = std::env::var(format!("{prefix}{key}")) {
                debug!(key, "setting overridden from environment");
                self.set(key, value);
            }
        }
    }
}

impl HostSettings for MapSettings {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}

/// Offload facility that just records what it was given.
#[derive(Debug, Default)]
pub struct RecordingOffload {
    submitted: Mutex<Vec<OffloadPayload>>,
}

impl RecordingOffload {
    pub fn new() -> Self {
        Self::default()
    }

    /// Payloads submitted so far, in order.
    pub fn submitted(&self) -> Vec<OffloadPayload> {
        self.submitted
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl JobOffload for RecordingOffload {
    fn submit(&self, payload: OffloadPayload) -> Result<()> {
        debug!(job_id = %payload.job_id, item = %payload.item_id, "payload recorded");
        self.submitted
            .lock()
            .map_err(|_| CabError::Offload("offload lock poisoned".into()))?
            .push(payload);
        Ok(())
    }
}

/// Preview store keeping images in memory under `memory://` URLs.
#[derive(Debug, Default)]
pub struct MemoryPreviewStore {
    images: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryPreviewStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch a stored image by the URL returned from `store`.
    pub fn get(&self, url: &str) -> Option<Vec<u8>> {
        let name = url.strip_prefix("memory://")?;
        self.images
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(name)
            .cloned()
    }
}

impl PreviewStore for MemoryPreviewStore {
    fn store(&self, filename: &str, png: Vec<u8>) -> Result<String> {
        self.images
            .lock()
            .map_err(|_| CabError::Storage("preview store lock poisoned".into()))?
            .insert(filename.to_string(), png);
        Ok(format!("memory://{filename}"))
    }
}
