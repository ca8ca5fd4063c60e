// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// cablabel-document — turning rendered labels into what the printer consumes
// and what the user sees.
//
// Provides JScript normalisation (rendered HTML → printer job script) and
// stitching of per-label preview bitmaps into a single vertical strip.

pub mod image;
pub mod jscript;

pub use crate::image::stitch::{PreviewStrip, combine_vertically};
pub use jscript::JobScript;
