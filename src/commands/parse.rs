use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;

use super::{present, OutputArgs};
use crate::roadmap::{build_view, RoadmapDocument};

#[derive(Debug, clap::Args)]
pub struct ParseArgs {
    /// Markdown file holding the generated roadmap
    pub roadmap: PathBuf,
    /// Text file holding the scholar references block
    #[arg(long)]
    pub references: Option<PathBuf>,
    /// Topic keywords, used for placeholder references
    #[arg(long, value_delimiter = ',')]
    pub keywords: Vec<String>,
    #[command(flatten)]
    pub output: OutputArgs,
}

async fn read(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))
}

pub async fn parse(args: ParseArgs) -> Result<()> {
    let roadmap_text = read(&args.roadmap).await?;
    let references_text = match &args.references {
        Some(path) => read(path).await?,
        None => String::new(),
    };

    let keywords = args
        .keywords
        .into_iter()
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty())
        .collect();

    info!(path = %args.roadmap.display(), "parsing roadmap file");
    let view = build_view(&RoadmapDocument {
        roadmap_text,
        keywords,
        references_text,
    });
    present(view, args.output).await
}
