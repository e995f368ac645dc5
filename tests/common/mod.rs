use serde_json::json;
use surveymonkey_api::Settings;
use wiremock::matchers::{body_string_contains, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const CLIENT_ID: &str = "test-client-id";
pub const CLIENT_SECRET: &str = "test-client-secret";
pub const ACCESS_TOKEN: &str = "test-access-token";

pub fn settings(server: &MockServer) -> Settings {
    Settings::new(CLIENT_ID, CLIENT_SECRET, &server.uri()).unwrap()
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}

/// Mounts the OAuth token endpoint, expecting exactly `times` exchanges.
pub async fn mount_token_endpoint(server: &MockServer, times: u64) {
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .and(header_exists("authorization"))
        .and(body_string_contains("grant_type=client_credentials"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": ACCESS_TOKEN,
            "token_type": "bearer",
            "expires_in": 31536000
        })))
        .expect(times)
        .mount(server)
        .await;
}
