mod serve;
mod show;

use crate::error::Result;
use clap::{Parser, Subcommand};

pub use show::ShowResource;

#[derive(Parser, Debug)]
#[command(name = "sheets-proxy")]
#[command(about = "Proxy Google Sheets data to a web front end over OAuth", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub async fn run(&self) -> Result<()> {
        match &self.command {
            Commands::Serve { bind } => serve::execute(bind.as_deref()).await,
            Commands::Show { resource } => resource.execute().await,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP API
    Serve {
        /// Address to listen on, overriding the configured one
        #[arg(long)]
        bind: Option<String>,
    },
    Show {
        #[command(subcommand)]
        resource: ShowResource,
    },
}
