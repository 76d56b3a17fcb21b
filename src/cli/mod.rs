use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::Config;
use crate::core::{Source, SourceEngine};
use crate::sources::UniqueStreamSource;

#[derive(Parser)]
#[command(name = "uniquestream")]
#[command(about = "Query the UniqueStream dubbed catalog the way a media host would")]
#[command(version)]
pub struct Cli {
    /// TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Only keep search results flagged as dubbed
    #[arg(short, long)]
    pub dubbed_only: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Search the catalog by keyword
    Search { keyword: String },
    /// Describe a title from its watch URL
    Details { url: String },
    /// List dubbed episodes of a title
    Episodes { url: String },
    /// Resolve an episode URL to its HLS manifest
    Stream { url: String },
}

impl Cli {
    pub async fn run(&self) -> Result<()> {
        let mut config = Config::load(self.config.as_deref())?;
        if self.dubbed_only {
            config.filter_dubbed = true;
        }

        let mut engine = SourceEngine::new();
        engine.register_source(Box::new(UniqueStreamSource::new(config)?));

        let output = match &self.command {
            Command::Search { keyword } => {
                let source = engine
                    .find_by_name("uniquestream")
                    .ok_or_else(|| anyhow::anyhow!("No search source registered"))?;
                serde_json::to_string_pretty(&source.search(keyword).await)?
            }
            Command::Details { url } => {
                let record = resolve(&engine, url)?.extract_details(url).await;
                serde_json::to_string_pretty(&[record])?
            }
            Command::Episodes { url } => {
                serde_json::to_string_pretty(&resolve(&engine, url)?.extract_episodes(url).await)?
            }
            Command::Stream { url } => {
                serde_json::to_string_pretty(&resolve(&engine, url)?.extract_stream_url(url).await)?
            }
        };

        println!("{}", output);
        Ok(())
    }
}

fn resolve<'a>(engine: &'a SourceEngine, url: &str) -> Result<&'a dyn Source> {
    engine
        .find_for_url(url)
        .ok_or_else(|| anyhow::anyhow!("No suitable source found for URL: {}", url))
}
