//! Authenticated access to the SurveyMonkey v3 API.
//!
//! [`SurveyMonkeyClient::connect`] reuses authorization headers stored in a
//! [`TokenCache`] under a per-client-id key and only falls back to the OAuth 2.0
//! client credentials exchange when nothing usable is cached.

use crate::auth_headers::AuthHeaders;
use crate::oauth_client::OAuthClient;
use crate::retrievers::cache_retriever::CacheRetriever;
use crate::retrievers::client_credentials_retriever::ClientCredentialsRetriever;
use crate::retrievers::token_retriever::TokenRetriever;
use crate::settings::Settings;
use crate::token_cache::TokenCache;
use anyhow::{Context, Result};
use reqwest::{Response, StatusCode};
use serde::Serialize;
use serde_json::{Map, Value};
use std::time::Duration;
use url::Url;

pub const SURVEY_MONKEY_API_TAG: &str = "api_survey_monkey";

/// TTL of cached authorization headers.
pub const CACHE_TIMEOUT: Duration = Duration::from_secs(86400);

/// Query string for calls that take no parameters.
pub const NO_PARAMS: &[(&str, &str)] = &[];

pub fn cache_key(client_id: &str) -> String {
    format!("{}-{}", SURVEY_MONKEY_API_TAG, client_id)
}

pub struct SurveyMonkeyClient {
    settings: Settings,
    session: reqwest::Client,
}

impl SurveyMonkeyClient {
    pub async fn connect(settings: Settings, cache: &dyn TokenCache) -> Result<SurveyMonkeyClient> {
        let key = cache_key(&settings.client_id);

        let headers = match Self::cached_headers(&settings, cache, &key).await {
            Some(headers) => headers,
            None => {
                let headers = Self::authenticate(&settings).await?;

                cache
                    .set(&key, &headers, CACHE_TIMEOUT)
                    .await
                    .context("Failed to store authorization headers in the token cache")?;

                headers
            }
        };

        let session = reqwest::Client::builder()
            .default_headers(headers.to_header_map()?)
            .build()
            .context("Failed to create a HTTP session")?;

        Ok(SurveyMonkeyClient { settings, session })
    }

    async fn cached_headers(
        settings: &Settings,
        cache: &dyn TokenCache,
        key: &str,
    ) -> Option<AuthHeaders> {
        if settings.ignore_cache {
            log::debug!("Skipping the token cache");
            return None;
        }

        match CacheRetriever::new(cache, key).retrieve().await {
            Ok(headers) => {
                log::debug!("Using cached authorization headers for key: {}", key);
                Some(headers)
            }
            Err(e) => {
                log::debug!("No usable cached headers for key: {}. {:#}", key, e);
                None
            }
        }
    }

    /// Exchanges the client credentials for a token and returns the bearer
    /// `Authorization` header built from it.
    pub async fn authenticate(settings: &Settings) -> Result<AuthHeaders> {
        let oauth_client = OAuthClient::new(settings)?;

        ClientCredentialsRetriever::new(&oauth_client)
            .retrieve()
            .await
            .context("Failed to retrieve a token")
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub async fn call_api_post<B>(&self, url: Url, data: &B) -> Result<Response>
    where
        B: Serialize + ?Sized,
    {
        let response = self
            .session
            .post(url)
            .json(data)
            .send()
            .await
            .context("Failed to send a POST request to SurveyMonkey")?;

        log::info!(
            "Surveymonkey post response with status code = {}",
            response.status().as_u16()
        );
        Ok(response)
    }

    pub async fn call_api_get<P>(&self, url: Url, params: &P) -> Result<Response>
    where
        P: Serialize + ?Sized,
    {
        let response = self
            .session
            .get(url)
            .query(params)
            .send()
            .await
            .context("Failed to send a GET request to SurveyMonkey")?;

        log::info!(
            "Surveymonkey get response with status code = {}",
            response.status().as_u16()
        );
        Ok(response)
    }

    async fn get_json<P>(&self, url: Url, params: &P, resource: &str) -> Result<Value>
    where
        P: Serialize + ?Sized,
    {
        let response = self.call_api_get(url, params).await?;
        let status = response.status();

        if status == StatusCode::OK {
            return response
                .json::<Value>()
                .await
                .with_context(|| format!("Couldn't process json with {}", resource));
        }

        log::error!(
            "An error has occurred trying to get {} = {}",
            resource,
            status.as_u16()
        );
        Ok(Value::Object(Map::new()))
    }

    /// Retrieves a list of full expanded responses, including answers to all questions.
    pub async fn get_collector_responses<P>(&self, collector_id: &str, params: &P) -> Result<Value>
    where
        P: Serialize + ?Sized,
    {
        let url = self
            .settings
            .endpoint(&["v3", "collectors", collector_id, "responses", "bulk"])?;

        self.get_json(url, params, "collector responses").await
    }

    /// Returns a list of surveys owned or shared with the authenticated user.
    pub async fn get_surveys<P>(&self, params: &P) -> Result<Value>
    where
        P: Serialize + ?Sized,
    {
        let url = self.settings.endpoint(&["v3", "surveys"])?;

        self.get_json(url, params, "surveys").await
    }

    /// Returns a list of collectors for a given survey.
    pub async fn get_collectors<P>(&self, survey_id: &str, params: &P) -> Result<Value>
    where
        P: Serialize + ?Sized,
    {
        let url = self
            .settings
            .endpoint(&["v3", "surveys", survey_id, "collectors"])?;

        self.get_json(url, params, "collectors").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_keys_cache_by_client_id() {
        assert_eq!(cache_key("abc"), "api_survey_monkey-abc");
        assert_ne!(cache_key("abc"), cache_key("abd"));
    }
}
