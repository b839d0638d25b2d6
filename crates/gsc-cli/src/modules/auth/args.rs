use std::path::PathBuf;

use clap::{Args, Subcommand};

#[derive(Args)]
pub struct AuthArgs {
    #[command(subcommand)]
    pub command: AuthCommand,
}

#[derive(Subcommand)]
pub enum AuthCommand {
    #[command(about = "Authenticate in the browser and store the token in the OS keychain")]
    Login(LoginArgs),
    #[command(about = "Remove stored credentials")]
    Logout,
    #[command(about = "Show authentication status (never refreshes)")]
    Status,
    #[command(about = "Print a valid access token, refreshing it if needed")]
    Token(TokenArgs),
}

#[derive(Args)]
pub struct LoginArgs {
    #[arg(long, env = "GSC_CLIENT_SECRET", help = "Path to client_secret.json")]
    pub client_secret: Option<PathBuf>,
    #[arg(long, help = "Search Console site URL (e.g. sc-domain:example.com)")]
    pub site: Option<String>,
}

#[derive(Args)]
pub struct TokenArgs {
    #[arg(long, env = "GSC_CLIENT_SECRET", help = "Path to client_secret.json")]
    pub client_secret: Option<PathBuf>,
}
