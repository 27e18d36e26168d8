mod generate;
mod health;
mod parse;

use anyhow::Result;
use clap::Subcommand;
use serde::Serialize;

use crate::config::Config;
use crate::roadmap::render::render_view;
use crate::roadmap::RoadmapView;

pub use generate::GenerateArgs;
pub use parse::ParseArgs;

#[derive(Subcommand)]
pub enum Commands {
    /// Generate a roadmap from the research service and display it
    Generate(GenerateArgs),
    /// Parse a roadmap (and optional references) from local files
    Parse(ParseArgs),
    /// Check that the research service is up
    Health,
}

pub async fn run(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Generate(args) => generate::generate(args, config).await,
        Commands::Parse(args) => parse::parse(args).await,
        Commands::Health => health::health(config).await,
    }
}

/// How a parsed roadmap is handed to the user.
#[derive(Debug, Clone, Copy, Default, clap::Args)]
pub struct OutputArgs {
    /// Print the parsed stages and references as JSON
    #[arg(long, conflicts_with = "interactive")]
    pub json: bool,
    /// Open an interactive session to expand and collapse tasks
    #[arg(long, short)]
    pub interactive: bool,
}

/// `--json` shape: the view's fields plus an explicit empty-state flag.
#[derive(Serialize)]
struct JsonView<'a> {
    #[serde(flatten)]
    view: &'a RoadmapView,
    empty: bool,
}

fn to_json(view: &RoadmapView) -> Result<String> {
    let out = JsonView {
        view,
        empty: view.is_empty(),
    };
    Ok(serde_json::to_string_pretty(&out)?)
}

async fn present(view: RoadmapView, output: OutputArgs) -> Result<()> {
    if output.json {
        println!("{}", to_json(&view)?);
        return Ok(());
    }

    print!("{}", render_view(&view));
    if output.interactive && !view.is_empty() {
        crate::session::run(view).await?;
    }
    Ok(())
}
