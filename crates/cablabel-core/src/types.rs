// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for a label print request.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for an offloaded print job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobId(pub Uuid);

impl JobId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How a request is executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrintMode {
    /// Send each label synchronously and collect the printer's preview bitmap.
    Preview,
    /// Hand each label to the host's background job runner and return at once.
    Print,
}

impl PrintMode {
    /// Map the `preview` printing option onto an execution mode.
    pub fn from_preview_flag(preview: bool) -> Self {
        if preview { Self::Preview } else { Self::Print }
    }
}

/// Runtime options chosen by the user for one print request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrintingOptions {
    /// Selected label template is for preview instead of printing.
    #[serde(default)]
    pub preview: bool,
}

impl PrintingOptions {
    pub fn mode(&self) -> PrintMode {
        PrintMode::from_preview_flag(self.preview)
    }
}

/// One inventory item to label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelItem {
    /// Host identity of the item (e.g. a stock item primary key).
    pub id: String,
    /// Opaque context handed to the renderer.
    #[serde(default)]
    pub data: serde_json::Value,
}

impl LabelItem {
    pub fn new(id: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            id: id.into(),
            data,
        }
    }
}

/// A batch print request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrintRequest {
    /// Label template name or reference understood by the renderer.
    pub template: String,
    pub items: Vec<LabelItem>,
    #[serde(default)]
    pub options: PrintingOptions,
    /// User who triggered the request, if known.
    #[serde(default)]
    pub user: Option<String>,
}

impl PrintRequest {
    pub fn mode(&self) -> PrintMode {
        self.options.mode()
    }
}

/// Label size declared by a template, in millimetres.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LabelDimensions {
    pub width_mm: f64,
    pub height_mm: f64,
}

/// Renderer output for one item.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderedLabel {
    /// HTML text. For CAB templates this carries the JScript source.
    pub html: String,
    pub pdf: Vec<u8>,
    pub png: Vec<u8>,
    /// Output filename generated by the host for this label.
    pub filename: String,
}

/// Everything the host's background runner needs to print one label.
#[derive(Debug, Clone)]
pub struct OffloadPayload {
    pub job_id: JobId,
    /// Normalised job script text, ready to upload.
    pub job_script: String,
    pub rendered: RenderedLabel,
    pub filename: String,
    pub item_id: String,
    pub user: Option<String>,
    pub dimensions: LabelDimensions,
    pub options: PrintingOptions,
    pub submitted_at: DateTime<Utc>,
}

/// Outcome reported back to the caller of a print request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrintResponse {
    pub success: bool,
    pub message: String,
    /// URL of the stored combined preview (preview mode only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

impl PrintResponse {
    /// Response for a preview request whose combined image was stored at `url`.
    pub fn generated(count: usize, url: String) -> Self {
        Self {
            success: true,
            message: format!("{count} labels generated"),
            file: Some(url),
        }
    }

    /// Response for a request whose labels were handed off for printing.
    pub fn printed(count: usize) -> Self {
        Self {
            success: true,
            message: format!("{count} labels printed"),
            file: None,
        }
    }
}
