// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// CLI command implementations.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::info;

use cablabel_core::error::{CabError, Result};
use cablabel_core::{LabelDimensions, LabelItem, PrintRequest, PrintResponse, PrintingOptions};
use cablabel_document::JobScript;
use cablabel_host::{DirectoryPreviewStore, Host, HostSettings, MapSettings, TemplateRenderer};
use cablabel_print::{CabPrinterClient, PrintOrchestrator};

use crate::services::data_dir::data_subdir;
use crate::services::offload::BackgroundOffload;

/// A batch of labels described in a JSON file.
#[derive(Debug, Deserialize)]
pub struct Manifest {
    /// JScript template, relative to the manifest file.
    pub template: PathBuf,
    pub items: Vec<LabelItem>,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub dimensions: LabelDimensions,
}

impl Manifest {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let mut manifest: Self = serde_json::from_str(&raw)?;
        if manifest.template.is_relative() {
            if let Some(dir) = path.parent() {
                manifest.template = dir.join(&manifest.template);
            }
        }
        Ok(manifest)
    }
}

fn printer_client(settings: &MapSettings) -> Result<CabPrinterClient> {
    let printer = settings.printer_settings()?;
    if printer.ip_address.is_empty() {
        return Err(CabError::Configuration(
            "IP address of printer must be defined before printing".into(),
        ));
    }
    CabPrinterClient::new(printer.connection_config()?)
}

fn read_script(file: &Path) -> Result<JobScript> {
    let text = std::fs::read_to_string(file)?;
    Ok(JobScript::from_text(&text))
}

pub async fn send(settings: &MapSettings, file: &Path) -> Result<()> {
    let client = printer_client(settings)?;
    client.send_job_script(&read_script(file)?).await?;
    info!(file = %file.display(), "job script sent");
    Ok(())
}

pub async fn preview(settings: &MapSettings, file: &Path, out: &Path) -> Result<()> {
    let client = printer_client(settings)?;
    client.send_job_script(&read_script(file)?).await?;
    let png = client.fetch_preview().await?;
    std::fs::write(out, &png)
        .map_err(|e| CabError::Storage(format!("write {}: {e}", out.display())))?;
    info!(out = %out.display(), bytes = png.len(), "preview saved");
    Ok(())
}

pub async fn store_image(settings: &MapSettings, file: &Path, name: Option<&str>) -> Result<String> {
    let name = match name {
        Some(name) => name.to_string(),
        None => file
            .file_name()
            .and_then(|n| n.to_str())
            .map(str::to_string)
            .ok_or_else(|| {
                CabError::Configuration(format!("cannot derive an image name from {}", file.display()))
            })?,
    };
    let data = std::fs::read(file)?;

    let client = printer_client(settings)?;
    client.store_image(&name, data).await?;
    Ok(name)
}

pub async fn batch(
    settings: &MapSettings,
    manifest_path: &Path,
    preview: bool,
    out_dir: Option<&Path>,
) -> Result<PrintResponse> {
    let manifest = Manifest::load(manifest_path)?;
    let renderer = TemplateRenderer::new().load_file(&manifest.template, manifest.dimensions)?;
    let previews = match out_dir {
        Some(dir) => DirectoryPreviewStore::new(dir)?,
        None => DirectoryPreviewStore::new(data_subdir("previews"))?,
    };
    let offload = BackgroundOffload::new(printer_client(settings)?);

    let request = PrintRequest {
        template: manifest.template.display().to_string(),
        items: manifest.items,
        options: PrintingOptions { preview },
        user: manifest.user,
    };

    let host = Host {
        settings,
        renderer: &renderer,
        offload: &offload,
        previews: &previews,
    };
    let outcome = PrintOrchestrator::new()
        .handle_print_request(&host, &request)
        .await;

    // Labels offloaded before a failure still go out.
    let drained = offload.drain().await;
    let response = outcome?;
    let printed = drained?;
    if !preview {
        info!(printed, "batch complete");
    }
    Ok(response)
}
