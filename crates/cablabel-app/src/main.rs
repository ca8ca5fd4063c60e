// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// cablabel — label printing for networked CAB thermal printers
//
// Entry point. Initialises logging, loads printer settings and dispatches the
// requested command.

mod commands;
mod services;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use cablabel_core::error::Result;
use cablabel_core::human_errors::humanize_error;

use services::settings;

#[derive(Debug, Parser)]
#[command(name = "cablabel", version, about = "Send label jobs to CAB thermal printers")]
struct Cli {
    /// Printer settings file (flat JSON object of KEY: value pairs).
    #[arg(long, global = true, env = "CABLABEL_SETTINGS")]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Upload a JScript file to the printer.
    Send { file: PathBuf },
    /// Upload a JScript file and save the printer's preview of it.
    Preview {
        file: PathBuf,
        #[arg(long, default_value = "labels.png")]
        out: PathBuf,
    },
    /// Store an image in printer memory for use by templates.
    StoreImage {
        file: PathBuf,
        /// Name on the printer (defaults to the file name).
        #[arg(long)]
        name: Option<String>,
    },
    /// Render and print (or preview) a batch of labels from a JSON manifest.
    Batch {
        manifest: PathBuf,
        #[arg(long)]
        preview: bool,
        /// Where combined previews are written.
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
    /// Write a settings file with the printer defaults.
    InitSettings {
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let human = humanize_error(&e);
            tracing::error!(error = %e, severity = ?human.severity, "command failed");
            eprintln!("error: {}\n  {}", human.message, human.suggestion);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    if let Command::InitSettings { force } = cli.command {
        let path = cli.settings.unwrap_or_else(settings::default_settings_path);
        settings::write_defaults(&path, force)?;
        println!("{}", path.display());
        return Ok(());
    }

    let host_settings = settings::load(cli.settings.as_deref())?;

    match cli.command {
        Command::Send { file } => commands::send(&host_settings, &file).await,
        Command::Preview { file, out } => {
            commands::preview(&host_settings, &file, &out).await?;
            println!("{}", out.display());
            Ok(())
        }
        Command::StoreImage { file, name } => {
            let name = commands::store_image(&host_settings, &file, name.as_deref()).await?;
            println!("images/{name}");
            Ok(())
        }
        Command::Batch {
            manifest,
            preview,
            out_dir,
        } => {
            let response =
                commands::batch(&host_settings, &manifest, preview, out_dir.as_deref()).await?;
            println!("{}", serde_json::to_string_pretty(&response)?);
            Ok(())
        }
        Command::InitSettings { .. } => Ok(()),
    }
}
