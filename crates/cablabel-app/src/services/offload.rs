// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Background print runner for the CLI.
//
// Each submitted label becomes a tokio task that uploads its job script to the
// printer. `submit` returns as soon as the task is spawned. A short-lived
// process must `drain` before exiting or queued labels are lost.

use std::sync::Mutex;

use cablabel_core::error::{CabError, Result};
use cablabel_core::human_errors::humanize_error;
use cablabel_core::{JobId, OffloadPayload};
use cablabel_document::JobScript;
use cablabel_host::JobOffload;
use cablabel_print::CabPrinterClient;
use tokio::runtime::Handle;
use tokio::task::JoinSet;
use tracing::{error, info};

type JobOutcome = (JobId, String, Result<()>);

pub struct BackgroundOffload {
    client: CabPrinterClient,
    runtime: Handle,
    jobs: Mutex<JoinSet<JobOutcome>>,
}

impl BackgroundOffload {
    /// Must be called from within a tokio runtime.
    pub fn new(client: CabPrinterClient) -> Self {
        Self {
            client,
            runtime: Handle::current(),
            jobs: Mutex::new(JoinSet::new()),
        }
    }

    /// Wait for every submitted label. Returns how many were printed, or an
    /// `Offload` error if any of them failed.
    pub async fn drain(self) -> Result<usize> {
        let mut jobs = self
            .jobs
            .into_inner()
            .map_err(|_| CabError::Offload("job list lock poisoned".into()))?;

        let mut printed = 0;
        let mut failed = 0;
        while let Some(joined) = jobs.join_next().await {
            match joined {
                Ok((job_id, _, Ok(()))) => {
                    info!(job_id = %job_id, "label printed");
                    printed += 1;
                }
                Ok((job_id, item, Err(e))) => {
                    let human = humanize_error(&e);
                    error!(job_id = %job_id, item = %item, error = %e, suggestion = %human.suggestion, "label failed");
                    failed += 1;
                }
                Err(e) => {
                    error!(error = %e, "print task aborted");
                    failed += 1;
                }
            }
        }

        if failed > 0 {
            return Err(CabError::Offload(format!(
                "{failed} of {} labels failed to print",
                printed + failed
            )));
        }
        Ok(printed)
    }
}

impl JobOffload for BackgroundOffload {
    fn submit(&self, payload: OffloadPayload) -> Result<()> {
        let script = JobScript::from_normalized(payload.job_script).ok_or_else(|| {
            CabError::Offload(format!("job script for item {} is not normalised", payload.item_id))
        })?;
        let client = self.client.clone();
        let job_id = payload.job_id;
        let item = payload.item_id;

        self.jobs
            .lock()
            .map_err(|_| CabError::Offload("job list lock poisoned".into()))?
            .spawn_on(
                async move {
                    let outcome = client.send_job_script(&script).await;
                    (job_id, item, outcome)
                },
                &self.runtime,
            );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cablabel_core::{LabelDimensions, PrinterConnectionConfig, PrintingOptions, RenderedLabel};

    fn payload(script: &str) -> OffloadPayload {
        OffloadPayload {
            job_id: JobId::new(),
            job_script: script.into(),
            rendered: RenderedLabel::default(),
            filename: "part-1.pdf".into(),
            item_id: "1".into(),
            user: None,
            dimensions: LabelDimensions::default(),
            options: PrintingOptions::default(),
            submitted_at: chrono::Utc::now(),
        }
    }

    /// A client pointing at a port nothing listens on.
    fn dead_client() -> CabPrinterClient {
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let config = PrinterConnectionConfig::new("127.0.0.1", "none")
            .unwrap()
            .with_tls(false, false)
            .with_ftp_port(port);
        CabPrinterClient::new(config).unwrap()
    }

    #[tokio::test]
    async fn unnormalised_script_is_refused() {
        let offload = BackgroundOffload::new(dead_client());
        let err = offload.submit(payload("no newline")).unwrap_err();
        assert!(matches!(err, CabError::Offload(_)));
        assert_eq!(offload.drain().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn failures_surface_when_draining() {
        let offload = BackgroundOffload::new(dead_client());
        offload.submit(payload("A 1\n")).unwrap();
        offload.submit(payload("A 1\n")).unwrap();

        match offload.drain().await.unwrap_err() {
            CabError::Offload(msg) => assert_eq!(msg, "2 of 2 labels failed to print"),
            other => panic!("unexpected error {other:?}"),
        }
    }
}
