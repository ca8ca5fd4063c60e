// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Batch print orchestration.
//
// A request is executed in one of two modes, chosen per request:
//   - Preview: every label is sent synchronously, its preview fetched, and the
//     previews are stitched into one image stored through the host.
//   - Print:   every label is handed to the host's background runner and the
//     call returns without waiting.
//
// Items are processed in input order. The first failure aborts the batch and
// nothing produced for earlier items is returned.

use chrono::Utc;
use tracing::{debug, info, instrument};

use cablabel_core::error::{CabError, Result};
use cablabel_core::{
    JobId, LabelItem, OffloadPayload, PrintMode, PrintRequest, PrintResponse,
    PrinterConnectionConfig, RenderedLabel,
};
use cablabel_document::{JobScript, combine_vertically};
use cablabel_host::Host;

use crate::transport::{CabTransportFactory, PrinterTransport, TransportFactory};

/// Name the combined preview is stored under.
pub const PREVIEW_FILENAME: &str = "labels.png";

/// Runs print requests against one configured printer.
#[derive(Debug, Clone, Default)]
pub struct PrintOrchestrator<F = CabTransportFactory> {
    factory: F,
}

impl PrintOrchestrator<CabTransportFactory> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<F: TransportFactory> PrintOrchestrator<F> {
    /// Use a custom transport (e.g. a different network stack or a fake).
    pub fn with_factory(factory: F) -> Self {
        Self { factory }
    }

    /// Handle one batch print request.
    ///
    /// Fails with `CabError::Configuration` before rendering anything if the
    /// printer address is missing or the settings are invalid.
    #[instrument(
        skip_all,
        fields(template = %request.template, items = request.items.len(), mode = ?request.mode())
    )]
    pub async fn handle_print_request(
        &self,
        host: &Host<'_>,
        request: &PrintRequest,
    ) -> Result<PrintResponse> {
        let settings = host.settings.printer_settings()?;
        if settings.ip_address.is_empty() {
            return Err(CabError::Configuration(
                "IP address of printer must be defined before printing".into(),
            ));
        }
        let config = settings.connection_config()?;
        debug!(model = %settings.model, host = %config.host(), "printer configured");

        match request.mode() {
            PrintMode::Preview => self.preview_batch(host, request, &config).await,
            PrintMode::Print => offload_batch(host, request),
        }
    }

    async fn preview_batch(
        &self,
        host: &Host<'_>,
        request: &PrintRequest,
        config: &PrinterConnectionConfig,
    ) -> Result<PrintResponse> {
        let printer = self.factory.build(config)?;
        let mut previews = Vec::with_capacity(request.items.len());

        for item in &request.items {
            let (_, script) = render_item(host, &request.template, item)?;
            printer.send_job_script(&script).await?;
            let preview = printer.fetch_preview().await?;
            debug!(item = %item.id, bytes = preview.len(), "preview collected");
            previews.push(preview);
        }

        let combined = combine_vertically(&previews)?;
        let url = host.previews.store(PREVIEW_FILENAME, combined)?;
        info!(count = request.items.len(), url = %url, "preview generated");
        Ok(PrintResponse::generated(request.items.len(), url))
    }
}

fn offload_batch(host: &Host<'_>, request: &PrintRequest) -> Result<PrintResponse> {
    let dimensions = host.renderer.dimensions(&request.template);

    for item in &request.items {
        let (rendered, script) = render_item(host, &request.template, item)?;
        let payload = OffloadPayload {
            job_id: JobId::new(),
            job_script: script.into_string(),
            filename: rendered.filename.clone(),
            rendered,
            item_id: item.id.clone(),
            user: request.user.clone(),
            dimensions,
            options: request.options,
            submitted_at: Utc::now(),
        };
        debug!(item = %item.id, job_id = %payload.job_id, "offloading label");
        host.offload.submit(payload)?;
    }

    info!(count = request.items.len(), "labels offloaded for printing");
    Ok(PrintResponse::printed(request.items.len()))
}

fn render_item(
    host: &Host<'_>,
    template: &str,
    item: &LabelItem,
) -> Result<(RenderedLabel, JobScript)> {
    let rendered = host.renderer.render(template, item)?;
    let script = JobScript::from_rendered_html(&rendered.html);
    Ok((rendered, script))
}
