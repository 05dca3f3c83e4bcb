//! `factura generate` — run the full fallback pipeline for one invoice.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use factura_core::types::InvoiceData;
use factura_core::{profiles, RenderProfiles};
use factura_engine::ChromeBackend;
use factura_pipeline::{GenerateResponse, InvoicePipeline};

/// Arguments for `factura generate`.
#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Path to the invoice JSON snapshot.
    pub input: PathBuf,

    /// Where to write the PDF (defaults to `invoice-<number>.pdf` in the
    /// current directory).
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Render profile YAML (defaults to `~/.factura/profiles.yaml` when
    /// present, otherwise built-in defaults).
    #[arg(long)]
    pub profiles: Option<PathBuf>,

    /// Explicit Chrome/Chromium binary; auto-detected when omitted.
    #[arg(long)]
    pub browser: Option<PathBuf>,

    /// Print the JSON response envelope instead of status lines.
    #[arg(long)]
    pub json: bool,
}

impl GenerateArgs {
    pub fn run(self) -> Result<()> {
        let invoice = read_invoice(&self.input)?;
        let profile_table = load_profiles(self.profiles.as_deref())?;

        let backend = match self.browser.clone() {
            Some(path) => ChromeBackend::with_browser_path(path),
            None => ChromeBackend::new(),
        };
        let pipeline = InvoicePipeline::new(&backend, profile_table)
            .context("failed to build the render pipeline")?;

        let outcome = pipeline.generate(&invoice);

        if self.json {
            let envelope = GenerateResponse::from_outcome(&outcome);
            println!("{}", serde_json::to_string_pretty(&envelope)?);
        }

        match outcome {
            Ok(generated) => {
                let out_path = self
                    .out
                    .clone()
                    .unwrap_or_else(|| PathBuf::from(&generated.filename));
                fs::write(&out_path, &generated.pdf)
                    .with_context(|| format!("failed to write {}", out_path.display()))?;
                if !self.json {
                    let note = if generated.used_fallback() {
                        " (degraded fallback)"
                    } else {
                        ""
                    };
                    println!(
                        "{} wrote {} ({} bytes){note}",
                        "✓".green(),
                        out_path.display(),
                        generated.pdf.len()
                    );
                }
                Ok(())
            }
            Err(err) => {
                if !self.json {
                    eprintln!("{} {err}", "✗".red());
                }
                Err(err).with_context(|| {
                    format!("generation failed for '{}'", invoice.invoice_number)
                })
            }
        }
    }
}

fn read_invoice(path: &Path) -> Result<InvoiceData> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read invoice snapshot {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("invalid invoice JSON in {}", path.display()))
}

fn load_profiles(explicit: Option<&Path>) -> Result<RenderProfiles> {
    if let Some(path) = explicit {
        return profiles::load_from(path)
            .with_context(|| format!("failed to load render profiles from {}", path.display()));
    }
    match dirs::home_dir() {
        Some(home) if profiles::profiles_path_at(&home).exists() => profiles::load_at(&home)
            .context("failed to load render profiles from ~/.factura/profiles.yaml"),
        _ => Ok(RenderProfiles::default()),
    }
}
