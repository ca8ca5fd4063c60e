// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// cablabel-host — the narrow set of capabilities the printer bridge needs from
// the inventory application that embeds it.
//
// The host owns settings storage, label rendering, background job execution
// and media storage. `traits` defines those seams; `memory` and `local`
// provide implementations for tests and for standalone use from the CLI.

pub mod local;
pub mod memory;
pub mod render;
pub mod traits;

pub use local::{DirectoryPreviewStore, load_settings_file};
pub use memory::{MapSettings, MemoryPreviewStore, RecordingOffload};
pub use render::TemplateRenderer;
pub use traits::{Host, HostSettings, JobOffload, LabelRenderer, PreviewStore};
