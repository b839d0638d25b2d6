use clap::{ArgAction, Parser, Subcommand};

pub use crate::modules::auth::args::*;
pub use crate::modules::system::args::*;

#[derive(Parser)]
#[command(name = "gsc")]
#[command(about = "Google Search Console CLI")]
pub struct Cli {
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    #[command(about = "Manage authentication")]
    Auth(AuthArgs),
    #[command(about = "Manage CLI configuration")]
    Config(ConfigArgs),
}
