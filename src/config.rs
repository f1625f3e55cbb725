use serde::Deserialize;
use std::collections::HashMap;
use std::error::Error;
use std::path::Path;

#[derive(Deserialize, Clone, Debug)]
pub struct Config {
    pub asana: AsanaConfig,
    #[serde(default)]
    pub trello: Option<TrelloConfig>,
    /// Trello member id -> Asana user gid.
    #[serde(default)]
    pub member: HashMap<String, String>,
}

#[derive(Deserialize, Clone, Debug)]
pub struct AsanaConfig {
    #[serde(default)]
    pub personal_access_token: String,
    #[serde(default)]
    pub workspace: Option<String>,
    #[serde(default)]
    pub team: Option<String>,
}

#[derive(Deserialize, Clone, Debug)]
pub struct TrelloConfig {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub token: String,
}

/// Reads the JSON config file. Credentials left empty in the file fall back
/// to environment variables, and empty workspace/team ids count as unset so
/// the selection listings kick in.
pub fn load(path: &Path) -> Result<Config, Box<dyn Error>> {
    let payload = std::fs::read_to_string(path)?;
    let mut config: Config = serde_json::from_str(&payload)?;

    if config.asana.personal_access_token.is_empty() {
        config.asana.personal_access_token = load_env("ASANA_PERSONAL_ACCESS_TOKEN");
    }
    if let Some(trello) = &mut config.trello {
        if trello.key.is_empty() {
            trello.key = load_env("TRELLO_KEY");
        }
        if trello.token.is_empty() {
            trello.token = load_env("TRELLO_TOKEN");
        }
    }
    let workspace = config.asana.workspace.take();
    config.asana.workspace = workspace.filter(|gid| !gid.is_empty());
    let team = config.asana.team.take();
    config.asana.team = team.filter(|gid| !gid.is_empty());
    Ok(config)
}

fn load_env(key: &str) -> String {
    let result = std::env::var(key);
    result.unwrap_or_default()
}

impl Config {
    /// Trello credentials are only needed for comment copying; treat a blank
    /// pair as absent.
    pub fn trello_credentials(&self) -> Option<&TrelloConfig> {
        self.trello
            .as_ref()
            .filter(|trello| !trello.key.is_empty() && !trello.token.is_empty())
    }
}
