use std::path::Path;

use reqwest::Url;
use serde::Deserialize;

use crate::error::{AuthError, AuthResult};

pub const SEARCH_CONSOLE_SCOPE: &str = "https://www.googleapis.com/auth/webmasters.readonly";
pub const DEFAULT_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/auth";
pub const DEFAULT_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
pub const DEFAULT_REDIRECT_TEMPLATE: &str = "http://localhost:{port}/callback";
const PORT_PLACEHOLDER: &str = "{port}";

/// OAuth client registration used by every auth operation.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub scope: String,
    pub auth_url: String,
    pub token_url: String,
    /// Redirect URI with a `{port}` placeholder.
    pub redirect_template: String,
}

impl std::fmt::Debug for ClientCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("scope", &self.scope)
            .field("auth_url", &self.auth_url)
            .field("token_url", &self.token_url)
            .field("redirect_template", &self.redirect_template)
            .finish()
    }
}

#[derive(Deserialize)]
struct ClientSecretFile {
    installed: Option<ClientSecretEntry>,
    web: Option<ClientSecretEntry>,
}

#[derive(Deserialize)]
struct ClientSecretEntry {
    #[serde(default)]
    client_id: String,
    #[serde(default)]
    client_secret: String,
    auth_uri: Option<String>,
    token_uri: Option<String>,
    project_id: Option<String>,
}

impl ClientCredentials {
    pub fn new(client_id: &str, client_secret: &str, scope: &str) -> Self {
        Self {
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
            scope: scope.to_string(),
            auth_url: DEFAULT_AUTH_URL.to_string(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
            redirect_template: DEFAULT_REDIRECT_TEMPLATE.to_string(),
        }
    }

    /// Loads a downloaded `client_secret.json` descriptor.
    pub fn from_client_secret_file(path: &Path, scope: &str) -> AuthResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|err| {
            AuthError::Configuration(format!(
                "could not read client secret file {}: {err}",
                path.display()
            ))
        })?;
        Self::from_client_secret_json(&contents, scope)
    }

    pub fn from_client_secret_json(contents: &str, scope: &str) -> AuthResult<Self> {
        let file: ClientSecretFile = serde_json::from_str(contents).map_err(|err| {
            AuthError::Configuration(format!("could not parse client secret: {err}"))
        })?;
        let entry = file.installed.or(file.web).ok_or_else(|| {
            AuthError::Configuration(
                "client secret must contain an \"installed\" or \"web\" section".to_string(),
            )
        })?;
        if let Some(project_id) = entry.project_id.as_deref() {
            tracing::debug!(project_id = %project_id, "loaded client secret");
        }

        let mut credentials = Self::new(&entry.client_id, &entry.client_secret, scope);
        if let Some(auth_url) = entry.auth_uri {
            credentials.auth_url = auth_url;
        }
        if let Some(token_url) = entry.token_uri {
            credentials.token_url = token_url;
        }
        credentials.validate()?;
        Ok(credentials)
    }

    pub fn validate(&self) -> AuthResult<()> {
        if self.client_id.trim().is_empty() {
            return Err(AuthError::Configuration("client_id is required".to_string()));
        }
        if self.client_secret.trim().is_empty() {
            return Err(AuthError::Configuration(
                "client_secret is required".to_string(),
            ));
        }
        if self.scope.trim().is_empty() {
            return Err(AuthError::Configuration("scope is required".to_string()));
        }
        parse_endpoint("auth_url", &self.auth_url)?;
        parse_endpoint("token_url", &self.token_url)?;

        if !self.redirect_template.contains(PORT_PLACEHOLDER) {
            return Err(AuthError::Configuration(format!(
                "redirect template must contain {PORT_PLACEHOLDER}: {}",
                self.redirect_template
            )));
        }
        let sample = Url::parse(&self.redirect_uri(1)).map_err(|err| {
            AuthError::Configuration(format!("invalid redirect template: {err}"))
        })?;
        if sample.scheme() != "http" {
            return Err(AuthError::Configuration(
                "redirect template must use http://".to_string(),
            ));
        }
        // The callback listener only binds 127.0.0.1.
        match sample.host_str() {
            Some("localhost") | Some("127.0.0.1") => Ok(()),
            other => Err(AuthError::Configuration(format!(
                "redirect template must use localhost or 127.0.0.1, got {}",
                other.unwrap_or("<none>")
            ))),
        }
    }

    pub fn redirect_uri(&self, port: u16) -> String {
        self.redirect_template
            .replace(PORT_PLACEHOLDER, &port.to_string())
    }
}

fn parse_endpoint(name: &str, value: &str) -> AuthResult<Url> {
    Url::parse(value).map_err(|err| AuthError::Configuration(format!("invalid {name}: {err}")))
}
