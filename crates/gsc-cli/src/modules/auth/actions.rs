use std::path::Path;

use gsc_auth::{AuthError, Authenticator, ClientCredentials, TokenStatus, SEARCH_CONSOLE_SCOPE};

use crate::cli_args::{AuthArgs, AuthCommand, LoginArgs, TokenArgs};
use crate::modules::system::{resolve_client_secret, resolve_site, CliConfig};

pub(crate) async fn handle_auth_command(
    args: AuthArgs,
    auth: &Authenticator,
    config: &mut CliConfig,
) -> anyhow::Result<()> {
    match args.command {
        AuthCommand::Login(args) => handle_login(args, auth, config).await,
        AuthCommand::Logout => handle_logout(auth),
        AuthCommand::Status => handle_status(auth, config),
        AuthCommand::Token(args) => handle_token(args, auth, config).await,
    }
}

pub(crate) fn load_credentials(path: &Path) -> anyhow::Result<ClientCredentials> {
    Ok(ClientCredentials::from_client_secret_file(
        path,
        SEARCH_CONSOLE_SCOPE,
    )?)
}

async fn handle_login(
    args: LoginArgs,
    auth: &Authenticator,
    config: &mut CliConfig,
) -> anyhow::Result<()> {
    let path = resolve_client_secret(args.client_secret, config)?;
    let credentials = load_credentials(&path)?;
    let site = resolve_site(args.site, config)?;
    let token = auth.login(&credentials).await?;
    tracing::info!(expiry = %token.expiry, "login complete");

    config.client_secret_path = Some(path);
    if let Some(site) = site {
        config.site_url = Some(site);
    }
    println!("Authentication successful. Credentials saved to the system keychain.");
    if let Some(site) = config.site_url.as_deref() {
        println!("Default site: {site}");
    }
    Ok(())
}

fn handle_logout(auth: &Authenticator) -> anyhow::Result<()> {
    auth.logout()?;
    println!("Logged out. Credentials removed from the system keychain.");
    Ok(())
}

fn handle_status(auth: &Authenticator, config: &CliConfig) -> anyhow::Result<()> {
    let status = auth.inspect()?;
    print!("{}", render_status(&status, config.site_url.as_deref()));
    Ok(())
}

async fn handle_token(
    args: TokenArgs,
    auth: &Authenticator,
    config: &CliConfig,
) -> anyhow::Result<()> {
    if auth.inspect()? == TokenStatus::Absent {
        return Err(AuthError::NotAuthenticated.into());
    }
    let path = resolve_client_secret(args.client_secret, config)?;
    let credentials = load_credentials(&path)?;
    let token = auth.valid_token(&credentials).await?;
    println!("{}", token.access_token);
    Ok(())
}

pub(crate) fn render_status(status: &TokenStatus, site: Option<&str>) -> String {
    let mut out = String::new();
    match status {
        TokenStatus::Absent => {
            out.push_str("Not logged in. Run 'gsc auth login' to authenticate.\n");
        }
        TokenStatus::Present {
            expiry,
            expired,
            token_type,
        } => {
            out.push_str("Logged in.\n");
            out.push_str(&format!("  Token type: {token_type}\n"));
            if *expired {
                out.push_str("  Status:     Expired (will refresh on next use)\n");
            } else {
                out.push_str("  Status:     Valid\n");
            }
            out.push_str(&format!(
                "  Expires:    {}\n",
                expiry.format("%Y-%m-%d %H:%M:%S UTC")
            ));
        }
    }
    if let Some(site) = site {
        out.push_str(&format!("Site: {site}\n"));
    }
    out
}
