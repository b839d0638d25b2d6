use std::fs;
use std::io::{self, IsTerminal, Write};
use std::path::{Path, PathBuf};

use super::types::CliConfig;
use crate::cli_args::{ConfigArgs, ConfigCommand};

pub(crate) fn handle_config_command(
    args: ConfigArgs,
    config: &mut CliConfig,
) -> anyhow::Result<()> {
    match args.command {
        ConfigCommand::Set(args) => {
            if args.client_secret.is_none() && args.site.is_none() {
                anyhow::bail!("nothing to set; pass --client-secret or --site");
            }
            if let Some(path) = args.client_secret {
                config.client_secret_path = Some(path);
            }
            if let Some(site) = args.site {
                config.site_url = Some(site);
            }
            println!("Configuration saved.");
        }
        ConfigCommand::Show => {
            print!("{}", render_config(config));
        }
    }
    Ok(())
}

pub(crate) fn render_config(config: &CliConfig) -> String {
    let client_secret = config
        .client_secret_path
        .as_deref()
        .map(|path| path.display().to_string())
        .unwrap_or_else(|| "(not set)".to_string());
    let site = config.site_url.as_deref().unwrap_or("(not set)");
    format!("client_secret: {client_secret}\nsite_url:      {site}\n")
}

/// Picks the client secret path from the flag, then the saved config, then
/// an interactive prompt when stdin is a terminal.
pub(crate) fn resolve_client_secret(
    arg: Option<PathBuf>,
    config: &CliConfig,
) -> anyhow::Result<PathBuf> {
    if let Some(path) = arg.or_else(|| config.client_secret_path.clone()) {
        return Ok(path);
    }
    if !io::stdin().is_terminal() {
        anyhow::bail!(
            "client secret not configured; pass --client-secret PATH or run 'gsc config set --client-secret PATH'"
        );
    }
    let input = prompt_line("Path to client_secret.json: ")?;
    if input.is_empty() {
        anyhow::bail!("client secret path is required");
    }
    Ok(PathBuf::from(input))
}

/// Picks the site from the flag or the saved config. On a terminal the user
/// is asked once; an empty answer leaves the site unset.
pub(crate) fn resolve_site(
    arg: Option<String>,
    config: &CliConfig,
) -> anyhow::Result<Option<String>> {
    if let Some(site) = arg.or_else(|| config.site_url.clone()) {
        return Ok(Some(site));
    }
    if !io::stdin().is_terminal() {
        return Ok(None);
    }
    eprintln!("Enter your Search Console site URL (leave empty to skip).");
    eprintln!("  - sc-domain:example.com (domain property)");
    eprintln!("  - https://example.com/ (URL prefix property)");
    let input = prompt_line("Site URL: ")?;
    Ok(Some(input).filter(|site| !site.is_empty()))
}

fn prompt_line(prompt: &str) -> anyhow::Result<String> {
    let mut input = String::new();
    eprint!("{prompt}");
    io::stderr().flush()?;
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

pub(crate) fn config_path() -> anyhow::Result<PathBuf> {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .map_err(|_| anyhow::anyhow!("HOME is not set"))?;
    Ok(Path::new(&home)
        .join(".config")
        .join("gsc-cli")
        .join("config.json"))
}

pub(crate) fn load_config(path: &Path) -> anyhow::Result<CliConfig> {
    if !path.exists() {
        return Ok(CliConfig::default());
    }
    let contents = fs::read_to_string(path)?;
    let config = serde_json::from_str(&contents)
        .map_err(|err| anyhow::anyhow!("invalid config file {}: {err}", path.display()))?;
    Ok(config)
}

pub(crate) fn save_config(path: &Path, config: &CliConfig) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let contents = serde_json::to_string_pretty(config)?;
    fs::write(path, contents)?;
    Ok(())
}
