use crate::args::Arguments;
use anyhow::Result;
use thiserror::Error;
use url::Url;

pub const API_BASE: &str = "https://api.surveymonkey.com";

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Client id is required. Use `--client-id`, SURVEYMONKEY_CLIENT_ID or a profile")]
    MissingClientId,
    #[error(
        "Client secret is required. Use `--client-secret`, `--prompt-client-secret`, SURVEYMONKEY_CLIENT_SECRET or a profile"
    )]
    MissingClientSecret,
    #[error("`{0}` is not a correct absolute API base URL")]
    InvalidApiBase(String),
}

/// Everything the client needs to authenticate and build endpoint URLs.
#[derive(Clone, Debug)]
pub struct Settings {
    pub client_id: String,

    pub client_secret: String,

    pub api_base: Url,

    /// Skip the cache lookup and always exchange credentials
    pub ignore_cache: bool,
}

impl Settings {
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        api_base: &str,
    ) -> Result<Settings> {
        Ok(Settings {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            api_base: parse_api_base(api_base)?,
            ignore_cache: false,
        })
    }

    /// Appends `segments` to the API base, each one percent-encoded as a single path segment.
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.api_base.clone();

        url.path_segments_mut()
            .map_err(|_| SettingsError::InvalidApiBase(self.api_base.to_string()))?
            .pop_if_empty()
            .extend(segments);

        Ok(url)
    }
}

fn parse_api_base(api_base: &str) -> Result<Url> {
    let url =
        Url::parse(api_base).map_err(|_| SettingsError::InvalidApiBase(api_base.to_owned()))?;

    if url.cannot_be_a_base() {
        return Err(SettingsError::InvalidApiBase(api_base.to_owned()).into());
    }

    Ok(url)
}

impl TryFrom<&Arguments> for Settings {
    type Error = anyhow::Error;

    fn try_from(args: &Arguments) -> Result<Settings> {
        let client_id = args
            .client_id
            .to_owned()
            .ok_or(SettingsError::MissingClientId)?;
        let client_secret = args
            .client_secret
            .to_owned()
            .ok_or(SettingsError::MissingClientSecret)?;
        let api_base = args.api_base.as_deref().unwrap_or(API_BASE);

        let mut settings = Settings::new(client_id, client_secret, api_base)?;
        settings.ignore_cache = args.force;

        Ok(settings)
    }
}
