//! Factura — invoice PDF generation CLI.
//!
//! # Usage
//!
//! ```text
//! factura generate <invoice.json> [--out <file>] [--profiles <yaml>] [--browser <path>] [--json]
//! factura preview <invoice.json> [--variant full|degraded] [--templates <dir>] [--out <file>]
//! factura profiles init [--file <yaml>]
//! factura profiles show [--file <yaml>]
//! ```

mod commands;

use std::fmt;
use std::str::FromStr;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{generate::GenerateArgs, preview::PreviewArgs, profiles::ProfilesCommand};
use factura_renderer::TemplateVariant;

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "factura",
    version,
    about = "Generate invoice PDFs with a headless-browser fallback pipeline",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate an invoice PDF from a JSON snapshot.
    Generate(GenerateArgs),

    /// Render invoice markup without launching a browser.
    Preview(PreviewArgs),

    /// Manage the render profile table.
    Profiles {
        #[command(subcommand)]
        command: ProfilesCommand,
    },
}

// ---------------------------------------------------------------------------
// Shared TemplateVariant argument — parsed from CLI strings
// ---------------------------------------------------------------------------

/// Thin wrapper so clap can parse `TemplateVariant` from CLI args.
#[derive(Debug, Clone, Copy)]
pub struct VariantArg(pub TemplateVariant);

impl Default for VariantArg {
    fn default() -> Self {
        VariantArg(TemplateVariant::Full)
    }
}

impl FromStr for VariantArg {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "full" => Ok(Self(TemplateVariant::Full)),
            "degraded" => Ok(Self(TemplateVariant::Degraded)),
            other => Err(format!("unknown variant '{other}'; expected: full, degraded")),
        }
    }
}

impl fmt::Display for VariantArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    match cli.command {
        Commands::Generate(args) => args.run(),
        Commands::Preview(args) => args.run(),
        Commands::Profiles { command } => commands::profiles::run(command),
    }
}
