use clap::Parser;
use gsc_auth::{Authenticator, CredentialStore};
use tracing_subscriber::EnvFilter;

mod cli_args;
mod modules;

use crate::cli_args::*;
use crate::modules::auth::handle_auth_command;
use crate::modules::system::{config_path, handle_config_command, load_config, save_config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;
    let path = config_path()?;
    let mut config = load_config(&path)?;

    match cli.command {
        Command::Config(args) => {
            handle_config_command(args, &mut config)?;
            save_config(&path, &config)?;
        }
        Command::Auth(args) => {
            let client = reqwest::Client::builder().build()?;
            let store = CredentialStore::new(gsc_keystore::default_store());
            let auth = Authenticator::new(store, client);
            let before = config.clone();
            handle_auth_command(args, &auth, &mut config).await?;
            if config != before {
                save_config(&path, &config)?;
            }
        }
    }

    Ok(())
}

fn init_logging(verbosity: u8) -> anyhow::Result<()> {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(filter)?)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}
