use anyhow::Result;
use tracing::{debug, info};

use super::{present, OutputArgs};
use crate::config::Config;
use crate::roadmap::build_view;
use crate::service::{KnowledgeLevel, RoadmapClient, RoadmapRequest};

#[derive(Debug, clap::Args)]
pub struct GenerateArgs {
    /// Research topic, e.g. "AI in food industry"
    #[arg(long)]
    pub topic: String,
    /// What you want to achieve with the research
    #[arg(long)]
    pub goal: String,
    /// Your current knowledge level
    #[arg(long, value_enum, default_value_t = KnowledgeLevel::Beginner)]
    pub level: KnowledgeLevel,
    #[command(flatten)]
    pub output: OutputArgs,
}

pub async fn generate(args: GenerateArgs, config: &Config) -> Result<()> {
    let request = RoadmapRequest::new(&args.topic, &args.goal, args.level)?;
    let client = RoadmapClient::new(config)?;

    // Nothing is rendered unless the whole call succeeds.
    let doc = match client.generate(&request).await {
        Ok(doc) => doc,
        Err(e) => {
            debug!(error = ?e, topic = %request.research_topic, "roadmap generation failed");
            return Err(e.into());
        }
    };

    let view = build_view(&doc);
    info!(topic = %request.research_topic, empty = view.is_empty(), "roadmap ready");
    present(view, args.output).await
}
