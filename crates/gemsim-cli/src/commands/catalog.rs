//! Catalog export

use crate::context::CliContext;
use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;
use tracing::info;

#[derive(Args)]
pub struct ExportArgs {
    /// Write to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub fn export(ctx: &CliContext, args: ExportArgs) -> Result<()> {
    let document = ctx.workbench.export_catalog()?;
    match args.output {
        Some(path) => {
            std::fs::write(&path, document)
                .with_context(|| format!("writing catalog to {}", path.display()))?;
            info!(path = %path.display(), "catalog exported");
        }
        None => println!("{document}"),
    }
    Ok(())
}
