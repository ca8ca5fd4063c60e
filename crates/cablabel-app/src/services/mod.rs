// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Service layer: host capabilities backing the CLI commands.

pub mod data_dir;
pub mod offload;
pub mod settings;
