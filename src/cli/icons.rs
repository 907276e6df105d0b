//! Icon CLI subcommands.
//!
//! - `list`: Logical names found in the icon directory
//! - `check`: Report assets that cannot be decoded
//! - `render`: Rasterize an icon to a PNG file

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Subcommand;

use crate::config::ResolvedConfig;
use crate::icons::IconResolver;

/// Icon-related subcommands
#[derive(Subcommand, Debug)]
pub enum IconCommands {
    /// List available icon names
    List,

    /// Report icons whose file cannot be decoded
    Check,

    /// Render an icon to a PNG file (falls back to a gray square)
    Render {
        /// Logical icon name, e.g. brands/SiRust
        name: String,

        /// Output file
        #[arg(short, long)]
        out: PathBuf,

        /// Edge length in pixels (defaults to icons.size from the config)
        #[arg(short, long)]
        size: Option<u32>,
    },
}

fn load_resolver(config: &ResolvedConfig) -> Result<IconResolver> {
    IconResolver::load(&config.icons)
        .with_context(|| format!("Failed to read icon directory: {}", config.icons.display()))
}

pub fn execute(config: &ResolvedConfig, command: IconCommands) -> Result<()> {
    match command {
        IconCommands::List => {
            let resolver = load_resolver(config)?;
            for name in resolver.names() {
                println!("{}", name);
            }
            println!("\n{} icons in {}", resolver.len(), config.icons.display());
        }
        IconCommands::Check => {
            let resolver = load_resolver(config)?;
            let invalid = resolver.report_invalid_assets();
            if invalid.is_empty() {
                println!("All {} icons are valid", resolver.len());
            } else {
                for name in &invalid {
                    println!("✗ {}", name);
                }
                anyhow::bail!("{} of {} icons are invalid", invalid.len(), resolver.len());
            }
        }
        IconCommands::Render { name, out, size } => {
            let resolver = IconResolver::load_or_empty(&config.icons);
            let image = resolver.resolve(&name, size.unwrap_or(config.icon_size));
            image
                .save(&out)
                .with_context(|| format!("Failed to write {}", out.display()))?;
            let (width, height) = image.dimensions();
            println!("Rendered {} ({}x{}) to {}", name, width, height, out.display());
        }
    }
    Ok(())
}
