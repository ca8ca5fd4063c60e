// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Transport seam between the orchestrator and the printer.

use cablabel_core::PrinterConnectionConfig;
use cablabel_core::error::Result;
use cablabel_document::JobScript;

use crate::client::CabPrinterClient;

/// Operations the orchestrator needs from a printer connection.
#[allow(async_fn_in_trait)]
pub trait PrinterTransport {
    /// Deliver a job script to the printer.
    async fn send_job_script(&self, script: &JobScript) -> Result<()>;

    /// Retrieve the preview bitmap of the last job script delivered.
    async fn fetch_preview(&self) -> Result<Vec<u8>>;
}

/// Builds a transport for a printer connection config.
pub trait TransportFactory {
    type Transport: PrinterTransport;

    fn build(&self, config: &PrinterConnectionConfig) -> Result<Self::Transport>;
}

/// Produces real [`CabPrinterClient`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct CabTransportFactory;

impl TransportFactory for CabTransportFactory {
    type Transport = CabPrinterClient;

    fn build(&self, config: &PrinterConnectionConfig) -> Result<CabPrinterClient> {
        CabPrinterClient::new(config.clone())
    }
}
