use anyhow::Result;

use crate::config::Config;
use crate::service::RoadmapClient;

pub async fn health(config: &Config) -> Result<()> {
    let client = RoadmapClient::new(config)?;
    let status = client.health().await?;
    println!("{}: {}", status.status, status.message);
    Ok(())
}
