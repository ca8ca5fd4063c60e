// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image module: combining printer preview bitmaps.

pub mod stitch;

pub use stitch::PreviewStrip;
