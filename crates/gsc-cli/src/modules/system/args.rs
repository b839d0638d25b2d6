use std::path::PathBuf;

use clap::{Args, Subcommand};

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    #[command(about = "Update stored settings")]
    Set(SetConfigArgs),
    #[command(about = "Print stored settings")]
    Show,
}

#[derive(Args)]
pub struct SetConfigArgs {
    #[arg(long, help = "Path to client_secret.json")]
    pub client_secret: Option<PathBuf>,
    #[arg(long, help = "Search Console site URL")]
    pub site: Option<String>,
}
