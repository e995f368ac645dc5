use anyhow::{Context, Result, anyhow};
use std::{collections::HashMap, path::PathBuf};
use tokio::fs;

use serde::{Deserialize, Serialize};

#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
pub struct Profile {
    /// OAuth 2.0 Client Identifier <https://www.rfc-editor.org/rfc/rfc6749#section-2.2>
    pub client_id: Option<String>,

    /// OAuth 2.0 Client Secret. Prefer `--prompt-client-secret` over storing it here.  <https://www.rfc-editor.org/rfc/rfc6749#section-2.3.1>
    pub client_secret: Option<String>,

    /// SurveyMonkey API base url
    pub api_base: Option<String>,

    /// Path of the token cache file
    pub cache_file: Option<PathBuf>,
}

#[derive(Deserialize, Serialize, Clone, Debug, Default)]
pub struct Config {
    #[serde(default)]
    pub profile: HashMap<String, Profile>,
}

pub struct ConfigFile {
    file_path: PathBuf,
}

impl ConfigFile {
    pub fn new() -> Result<ConfigFile> {
        let mut home_dir = home::home_dir().context("Couldn't access $HOME_DIR")?;
        home_dir.push(".surveymonkey/config.toml");

        Ok(ConfigFile {
            file_path: home_dir,
        })
    }

    pub fn from(file_path: PathBuf) -> ConfigFile {
        ConfigFile { file_path }
    }

    async fn read(&self) -> Config {
        log::debug!("Reading the config file");
        let text = fs::read_to_string(&self.file_path)
            .await
            .unwrap_or_default();

        toml::from_str::<Config>(&text).unwrap_or_else(|e| {
            log::warn!(
                "Cannot parse config file {}. Error: {:?}",
                &self.file_path.to_string_lossy(),
                anyhow!(e)
            );

            Config::default()
        })
    }

    /// Returns the named profile, or an empty one when no name is given.
    pub async fn profile(&self, name: Option<&str>) -> Result<Profile> {
        let Some(name) = name else {
            return Ok(Profile::default());
        };

        let mut config = self.read().await;

        config
            .profile
            .remove(name)
            .with_context(|| format!("The given profile `{}` doesn't exist", name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn config_with(content: &str) -> (TempDir, ConfigFile) {
        let tmp_dir = tempfile::tempdir().unwrap();
        let path = tmp_dir.path().join("config.toml");
        fs::write(&path, content).await.unwrap();

        (tmp_dir, ConfigFile::from(path))
    }

    #[tokio::test]
    async fn it_reads_named_profile() {
        let (_tmp_dir, config_file) = config_with(
            r#"
[profile.work]
client_id = "work-client"
client_secret = "work-secret"
api_base = "https://api.eu.surveymonkey.com"

[profile.home]
client_id = "home-client"
cache_file = "/tmp/home.json"
"#,
        )
        .await;

        let profile = config_file.profile(Some("work")).await.unwrap();

        assert_eq!(
            profile,
            Profile {
                client_id: Some("work-client".to_owned()),
                client_secret: Some("work-secret".to_owned()),
                api_base: Some("https://api.eu.surveymonkey.com".to_owned()),
                cache_file: None,
            }
        );
        assert_eq!(
            config_file.profile(Some("home")).await.unwrap().cache_file,
            Some(PathBuf::from("/tmp/home.json"))
        );
    }

    #[tokio::test]
    async fn it_fails_on_unknown_profile() {
        let (_tmp_dir, config_file) = config_with("[profile.work]\nclient_id = \"id\"\n").await;

        assert!(config_file.profile(Some("missing")).await.is_err());
    }

    #[tokio::test]
    async fn it_returns_empty_profile_without_name() {
        let config_file = ConfigFile::from(PathBuf::from("/path/that/does/not/exist.toml"));

        assert_eq!(config_file.profile(None).await.unwrap(), Profile::default());
    }

    #[tokio::test]
    async fn it_treats_broken_config_as_empty() {
        let (_tmp_dir, config_file) = config_with("this is [not toml").await;

        assert!(config_file.read().await.profile.is_empty());
        assert!(config_file.profile(None).await.is_ok());
    }
}
