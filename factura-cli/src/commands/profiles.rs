//! `factura profiles` — manage the render profile table.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;

use factura_core::profiles;
use factura_core::RenderProfiles;

/// Subcommands for `factura profiles`.
#[derive(Subcommand, Debug)]
pub enum ProfilesCommand {
    /// Write the default profile table if none exists yet (idempotent).
    Init {
        /// Target YAML path (defaults to `~/.factura/profiles.yaml`).
        #[arg(long)]
        file: Option<PathBuf>,
    },

    /// Print the active profile table as YAML.
    Show {
        /// YAML path to read (defaults to `~/.factura/profiles.yaml`,
        /// falling back to built-in defaults when absent).
        #[arg(long)]
        file: Option<PathBuf>,
    },
}

pub fn run(command: ProfilesCommand) -> Result<()> {
    match command {
        ProfilesCommand::Init { file } => init(file),
        ProfilesCommand::Show { file } => show(file),
    }
}

fn init(file: Option<PathBuf>) -> Result<()> {
    let path = match file {
        Some(path) => {
            if path.exists() {
                profiles::load_from(&path).with_context(|| {
                    format!("existing file {} is not a valid profile table", path.display())
                })?;
                println!(
                    "{} {} already exists; left unchanged",
                    "✓".green(),
                    path.display()
                );
                return Ok(());
            }
            profiles::save_to(&path, &RenderProfiles::default())
                .with_context(|| format!("failed to write {}", path.display()))?;
            path
        }
        None => {
            let home = dirs::home_dir().context("could not determine home directory")?;
            profiles::init_at(&home).context("failed to initialize ~/.factura/profiles.yaml")?;
            profiles::profiles_path_at(&home)
        }
    };
    println!(
        "{} wrote default render profiles to {}",
        "✓".green(),
        path.display()
    );
    Ok(())
}

fn show(file: Option<PathBuf>) -> Result<()> {
    let table = match file {
        Some(path) => profiles::load_from(&path)
            .with_context(|| format!("failed to load render profiles from {}", path.display()))?,
        None => match dirs::home_dir() {
            Some(home) if profiles::profiles_path_at(&home).exists() => {
                profiles::load_at(&home).context("failed to load ~/.factura/profiles.yaml")?
            }
            _ => RenderProfiles::default(),
        },
    };
    let yaml = serde_yaml::to_string(&table).context("failed to serialize profile table")?;
    print!("{yaml}");
    Ok(())
}
