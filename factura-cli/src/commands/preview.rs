//! `factura preview` — render invoice markup without a browser.
//!
//! The operational tool for template work: inspect exactly what either
//! variant would feed the engine, including user template overrides.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use factura_core::types::InvoiceData;
use factura_renderer::Renderer;

use crate::VariantArg;

/// Arguments for `factura preview`.
#[derive(Args, Debug)]
pub struct PreviewArgs {
    /// Path to the invoice JSON snapshot.
    pub input: PathBuf,

    /// Markup variant to render.
    #[arg(long, default_value = "full")]
    pub variant: VariantArg,

    /// Directory of `.tera` template overrides.
    #[arg(long)]
    pub templates: Option<PathBuf>,

    /// Write markup here instead of stdout.
    #[arg(long)]
    pub out: Option<PathBuf>,
}

impl PreviewArgs {
    pub fn run(self) -> Result<()> {
        let invoice = read_invoice(&self.input)?;

        let renderer = match self.templates.as_deref() {
            Some(dir) => Renderer::with_template_dir(dir),
            None => Renderer::new(),
        }
        .context("failed to build the template renderer")?;

        let markup = renderer
            .render(&invoice, self.variant.0)
            .with_context(|| format!("failed to render the {} variant", self.variant))?;

        match self.out {
            Some(path) => fs::write(&path, markup)
                .with_context(|| format!("failed to write {}", path.display()))?,
            None => print!("{markup}"),
        }
        Ok(())
    }
}

fn read_invoice(path: &Path) -> Result<InvoiceData> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read invoice snapshot {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("invalid invoice JSON in {}", path.display()))
}
