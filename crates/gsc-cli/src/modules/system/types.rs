use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Serialize, Deserialize, Default, Debug, Clone, PartialEq, Eq)]
pub struct CliConfig {
    #[serde(default)]
    pub client_secret_path: Option<PathBuf>,
    #[serde(default)]
    pub site_url: Option<String>,
}
