use crate::args::{Arguments, Command};
use crate::config_file::ConfigFile;
use crate::file_cache::FileTokenCache;
use anyhow::{Context, Result};
use serde_json::Value;

pub mod api_client;
pub mod args;
pub mod auth_headers;
pub mod config_file;
pub mod file_cache;
pub mod oauth_client;
pub mod retrievers;
pub mod settings;
pub mod token_cache;

pub use api_client::SurveyMonkeyClient;
pub use settings::Settings;
pub use token_cache::{MemoryTokenCache, TokenCache};

/// Resolves settings from the arguments and the selected profile,
/// then runs the requested API call.
pub async fn run(args: Arguments) -> Result<Value> {
    let profile = ConfigFile::new()?
        .profile(args.profile.as_deref())
        .await?;
    let mut args = args.with_profile(profile);

    if args.prompt_client_secret {
        args.client_secret = Some(
            rpassword::prompt_password("Client secret: ")
                .context("Failed to read the client secret")?,
        );
    }

    let settings = Settings::try_from(&args)?;
    let cache = match args.cache_file.to_owned() {
        Some(path) => FileTokenCache::from(path),
        None => FileTokenCache::new()?,
    };
    log::debug!("Using token cache {}", cache.file_path().to_string_lossy());

    let client = SurveyMonkeyClient::connect(settings, &cache).await?;

    match &args.command {
        Command::Surveys { params } => client.get_surveys(params).await,
        Command::Collectors { survey_id, params } => {
            client.get_collectors(survey_id, params).await
        }
        Command::Responses {
            collector_id,
            params,
        } => client.get_collector_responses(collector_id, params).await,
    }
}
