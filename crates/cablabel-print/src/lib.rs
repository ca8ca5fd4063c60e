// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// cablabel Print — everything that talks to a CAB printer.
//
// Job scripts go to the printer over an FTP(S) control session; previews come
// back from its web service over HTTPS. The orchestrator ties rendering,
// transport and preview stitching together for a batch of labels.

mod addr;
pub mod client;
pub mod ftp_session;
pub mod orchestrator;
pub mod preview;
pub mod tls;
pub mod transport;

pub use client::CabPrinterClient;
pub use orchestrator::PrintOrchestrator;
pub use transport::{CabTransportFactory, PrinterTransport, TransportFactory};
