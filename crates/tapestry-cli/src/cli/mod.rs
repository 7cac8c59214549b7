//! CLI for the Tapestry content-preparation utilities.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::io;
use std::path::PathBuf;
use tapestry_core::config;

use commands::{
    run_extract_html, run_init_config, run_safe_download, run_sanitize_filename,
    run_validate_url, run_vtt_to_text,
};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "tapestry")]
#[command(about = "Tapestry: safe URL, download, filename, and text utilities", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Check that a URL is safe to fetch (prints "valid").
    ValidateUrl {
        /// URL to check.
        url: String,
    },

    /// Download a URL to a file under a size and time budget.
    SafeDownload {
        /// HTTP/HTTPS URL to download.
        url: String,
        /// Destination file; parent directories are created.
        output: PathBuf,
        /// Maximum body size in bytes (default from config, 104857600).
        #[arg(long, value_name = "BYTES")]
        max_size: Option<u64>,
        /// Whole-request timeout in seconds (default from config, 300).
        #[arg(long, value_name = "SECONDS")]
        timeout: Option<u64>,
    },

    /// Turn a string into a filesystem-safe filename.
    SanitizeFilename {
        /// Raw name (e.g. a page or video title).
        name: String,
        /// Maximum length in characters (default from config, 100).
        max_length: Option<usize>,
    },

    /// Extract the title and readable text from an HTML page or file.
    ExtractHtml {
        /// http(s) URL or path to a local HTML file.
        source: String,
        /// Write the result here instead of stdout.
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
        /// Fetch timeout in seconds (default from config, 30).
        #[arg(long, value_name = "SECONDS")]
        timeout: Option<u64>,
    },

    /// Convert a WebVTT caption file to deduplicated plain text.
    VttToText {
        /// Path to the .vtt file.
        path: PathBuf,
        /// Write the result here instead of stdout.
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Write the default config file.
    InitConfig {
        /// Overwrite an existing config file.
        #[arg(long)]
        force: bool,
    },
}

impl CliCommand {
    pub fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let mut out = io::stdout().lock();

        match cli.command {
            CliCommand::ValidateUrl { url } => run_validate_url(&mut out, &url)?,
            CliCommand::SafeDownload {
                url,
                output,
                max_size,
                timeout,
            } => {
                let cfg = load_config()?;
                run_safe_download(&mut out, &cfg, &url, &output, max_size, timeout)?;
            }
            CliCommand::SanitizeFilename { name, max_length } => {
                let max_length = match max_length {
                    Some(n) => n,
                    None => load_config()?.sanitize_max_length,
                };
                run_sanitize_filename(&mut out, &name, max_length)?;
            }
            CliCommand::ExtractHtml {
                source,
                output,
                timeout,
            } => {
                let cfg = load_config()?;
                run_extract_html(&mut out, &cfg, &source, output.as_deref(), timeout)?;
            }
            CliCommand::VttToText { path, output } => {
                run_vtt_to_text(&mut out, &path, output.as_deref())?
            }
            // Works even when the existing config does not parse.
            CliCommand::InitConfig { force } => {
                run_init_config(&mut out, &config::config_path()?, force)?
            }
        }

        Ok(())
    }
}

fn load_config() -> Result<config::TapestryConfig> {
    let cfg = config::load()?;
    tracing::debug!("loaded config: {:?}", cfg);
    Ok(cfg)
}

#[cfg(test)]
mod tests;
