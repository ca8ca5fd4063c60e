// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for cablabel.

use thiserror::Error;

/// Top-level error type for all cablabel operations.
#[derive(Debug, Error)]
pub enum CabError {
    // -- Configuration --
    #[error("configuration error: {0}")]
    Configuration(String),

    // -- Printer transport --
    #[error("printer transport failed: {0}")]
    Transport(String),

    #[error("unexpected status code {0} from printer preview endpoint")]
    PreviewStatus(u16),

    // -- Preview images --
    #[error("preview image could not be decoded: {0}")]
    Decode(String),

    #[error("no preview images to combine")]
    EmptyPreview,

    // -- Host collaborators --
    #[error("label rendering failed: {0}")]
    Render(String),

    #[error("job offload rejected: {0}")]
    Offload(String),

    #[error("preview storage failed: {0}")]
    Storage(String),

    // -- Storage / persistence --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CabError {
    /// Whether this error came from talking to the printer (control channel
    /// or web endpoint), as opposed to configuration or local processing.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::PreviewStatus(_))
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, CabError>;
