use anyhow::{Context, Result};
use oauth2::TokenResponse;
use oauth2::basic::BasicTokenResponse;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const AUTHORIZATION: &str = "Authorization";

/// Headers attached to every API call once the client is authenticated.
#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(transparent)]
pub struct AuthHeaders(BTreeMap<String, String>);

impl AuthHeaders {
    pub fn bearer(access_token: &str) -> AuthHeaders {
        let mut headers = BTreeMap::new();
        headers.insert(AUTHORIZATION.to_owned(), format!("Bearer {}", access_token));

        AuthHeaders(headers)
    }

    pub fn from_token_response(response: &BasicTokenResponse) -> AuthHeaders {
        AuthHeaders::bearer(response.access_token().secret())
    }

    #[cfg(test)]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_header_map(&self) -> Result<HeaderMap> {
        let mut map = HeaderMap::with_capacity(self.0.len());

        for (name, value) in &self.0 {
            let header_name = HeaderName::from_bytes(name.as_bytes())
                .with_context(|| format!("`{}` is not a valid header name", name))?;
            let mut header_value = HeaderValue::from_str(value)
                .with_context(|| format!("Value of `{}` header is not valid", name))?;

            if header_name == reqwest::header::AUTHORIZATION {
                header_value.set_sensitive(true);
            }

            map.insert(header_name, header_value);
        }

        Ok(map)
    }
}
