use crate::settings::Settings;
use anyhow::{Context, Result};
use oauth2::basic::{BasicClient, BasicTokenResponse};
use oauth2::{ClientId, ClientSecret, TokenUrl};

pub struct OAuthClient<'a> {
    settings: &'a Settings,
    http_client: reqwest::Client,
}

impl<'a> OAuthClient<'a> {
    pub fn new(settings: &Settings) -> Result<OAuthClient<'_>> {
        log::debug!("Creating OAuthClient...");

        // oauth2 requires redirects to be disabled for the token endpoint
        let http_client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .context("Failed to create a HTTP client for the token exchange")?;

        log::debug!("OAuthClient created");

        Ok(OAuthClient {
            settings,
            http_client,
        })
    }

    pub fn token_url(&self) -> Result<TokenUrl> {
        let url = self.settings.endpoint(&["oauth", "token"])?;

        Ok(TokenUrl::from_url(url))
    }

    pub async fn exchange_client_credentials(&self) -> Result<BasicTokenResponse> {
        let token_url = self.token_url()?;
        log::debug!(
            "Exchanging credentials for a token at {}...",
            token_url.as_str()
        );

        let client = BasicClient::new(ClientId::new(self.settings.client_id.to_owned()))
            .set_client_secret(ClientSecret::new(self.settings.client_secret.to_owned()))
            .set_token_uri(token_url);

        let token = client
            .exchange_client_credentials()
            .request_async(&self.http_client)
            .await
            .context("Failed to exchange of client credentials for a token")?;

        log::debug!("Exchange done");
        Ok(token)
    }
}
