// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// CAB printer client.
//
// One client per printer per request. It owns a copy of the connection
// config and performs every network operation sequentially: each call opens
// its own FTP session and closes it before returning.

use std::sync::Arc;

use rustls::ClientConfig;
use tracing::{info, instrument};

use cablabel_core::error::{CabError, Result};
use cablabel_core::{Credential, PrinterConnectionConfig};
use cablabel_document::JobScript;

use crate::ftp_session::FtpSession;
use crate::preview::PreviewFetcher;
use crate::tls;
use crate::transport::PrinterTransport;

/// File name the printer watches for incoming job scripts.
pub const JSCRIPT_FILENAME: &str = "jscript.txt";

/// Directory on the printer memory card holding images referenced by
/// templates.
pub const IMAGE_DIR: &str = "images";

/// Network client for a single CAB printer.
#[derive(Debug, Clone)]
pub struct CabPrinterClient {
    config: PrinterConnectionConfig,
    tls: Option<Arc<ClientConfig>>,
    preview: PreviewFetcher,
}

impl CabPrinterClient {
    /// Build a client. No connection is made until an operation is called.
    pub fn new(config: PrinterConnectionConfig) -> Result<Self> {
        let tls = if config.use_tls() {
            Some(tls::client_config(config.verify_tls())?)
        } else {
            None
        };
        let preview = PreviewFetcher::new(&config)?;

        Ok(Self {
            config,
            tls,
            preview,
        })
    }

    pub fn preview_url(&self) -> &str {
        self.preview.url()
    }

    /// Upload a job script as `jscript.txt` using the `ftpprint` account.
    #[instrument(skip(self, script), fields(host = %self.config.host(), bytes = script.as_bytes().len()))]
    pub async fn send_job_script(&self, script: &JobScript) -> Result<()> {
        self.upload(
            self.config.ftpprint_credential().clone(),
            None,
            JSCRIPT_FILENAME.to_string(),
            script.as_bytes().to_vec(),
        )
        .await?;
        info!("job script sent");
        Ok(())
    }

    /// Fetch the printer's rendering of the last job script it received.
    #[instrument(skip(self), fields(host = %self.config.host()))]
    pub async fn fetch_preview(&self) -> Result<Vec<u8>> {
        self.preview.fetch().await
    }

    /// Store an image in the printer memory (`images/{name}`) using the
    /// `ftpcard` account, so templates can reference it.
    #[instrument(skip(self, data), fields(host = %self.config.host(), bytes = data.len()))]
    pub async fn store_image(&self, name: &str, data: Vec<u8>) -> Result<()> {
        if name.is_empty() || name.contains(['/', '\\']) || name == "." || name == ".." {
            return Err(CabError::Configuration(format!(
                "'{name}' is not a valid printer image file name"
            )));
        }
        self.upload(
            self.config.ftpcard_credential().clone(),
            Some(IMAGE_DIR),
            name.to_string(),
            data,
        )
        .await?;
        info!(name, "image stored in printer memory");
        Ok(())
    }

    /// Open a session, optionally change directory, upload, and quit, on the
    /// blocking pool.
    async fn upload(
        &self,
        credential: Credential,
        dir: Option<&'static str>,
        filename: String,
        data: Vec<u8>,
    ) -> Result<u64> {
        let host = self.config.host().to_string();
        let port = self.config.ftp_port();
        let tls = self.tls.clone();

        tokio::task::spawn_blocking(move || {
            let mut session = FtpSession::open(&host, port, tls, &credential)?;
            if let Some(dir) = dir {
                session.cwd(dir)?;
            }
            let sent = session.upload(&filename, &data)?;
            session.close()?;
            Ok(sent)
        })
        .await
        .map_err(|e| CabError::Transport(format!("FTP worker failed: {e}")))?
    }
}

impl PrinterTransport for CabPrinterClient {
    async fn send_job_script(&self, script: &JobScript) -> Result<()> {
        CabPrinterClient::send_job_script(self, script).await
    }

    async fn fetch_preview(&self) -> Result<Vec<u8>> {
        CabPrinterClient::fetch_preview(self).await
    }
}
