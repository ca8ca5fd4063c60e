// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Capability traits implemented by the host application.

use cablabel_core::error::Result;
use cablabel_core::{LabelDimensions, LabelItem, OffloadPayload, PrinterSettings, RenderedLabel};

/// Read access to the plugin settings persisted by the host.
pub trait HostSettings: Send + Sync {
    /// Raw value for `key`, or `None` if the host has nothing stored.
    fn get(&self, key: &str) -> Option<String>;

    /// All printer settings, with defaults for missing keys.
    fn printer_settings(&self) -> Result<PrinterSettings> {
        PrinterSettings::from_lookup(|key| self.get(key))
    }
}

/// Turns a label template plus one item into printable outputs.
pub trait LabelRenderer: Send + Sync {
    /// Render `item` with `template` to HTML, PDF and PNG.
    fn render(&self, template: &str, item: &LabelItem) -> Result<RenderedLabel>;

    /// Label size declared by `template`.
    fn dimensions(&self, _template: &str) -> LabelDimensions {
        LabelDimensions::default()
    }
}

/// The host's background job runner.
///
/// `submit` returns once the payload is accepted; the caller never observes
/// whether or when it is printed.
pub trait JobOffload: Send + Sync {
    fn submit(&self, payload: OffloadPayload) -> Result<()>;
}

/// Media storage for generated preview images.
pub trait PreviewStore: Send + Sync {
    /// Store `png` under (a name derived from) `filename` and return the URL
    /// it can be fetched from.
    fn store(&self, filename: &str, png: Vec<u8>) -> Result<String>;
}

/// The collaborators needed to serve one print request.
#[derive(Clone, Copy)]
pub struct Host<'a> {
    pub settings: &'a dyn HostSettings,
    pub renderer: &'a dyn LabelRenderer,
    pub offload: &'a dyn JobOffload,
    pub previews: &'a dyn PreviewStore,
}
