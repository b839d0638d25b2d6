pub(crate) mod args;
pub(crate) mod config;
pub(crate) mod types;

pub(crate) use config::{
    config_path, handle_config_command, load_config, render_config, resolve_client_secret,
    resolve_site, save_config,
};
pub(crate) use types::CliConfig;
