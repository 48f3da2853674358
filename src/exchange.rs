/// Form-encoded token endpoint exchanges
use crate::error::{Error, Result};
use crate::site::Site;
use serde::Deserialize;
use std::time::Duration;

/// Out-of-band redirect target for the manual code-entry flow.
pub const OOB_REDIRECT_URI: &str = "urn:ietf:wg:oauth:2.0:oob";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Normalized result of a successful token exchange.
///
/// `refresh_token` is `None` when the endpoint did not rotate it, which is
/// common for refresh-grant responses.
#[derive(Debug, Clone)]
pub struct TokenGrant {
    pub access_token: String,
    pub refresh_token: Option<String>,
    /// Seconds until the access token expires (delta, not absolute).
    pub expires_in: u64,
}

/// Raw token endpoint response, shared by both grants.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: String,
    #[serde(default)]
    refresh_token: String,
    #[serde(default)]
    expires_in: u64,

    #[serde(default)]
    error: String,
    #[serde(default)]
    error_description: String,
}

/// Seam between the lifecycle controller and the network.
///
/// Implemented by `TokenClient` in production and by stubs in tests, so
/// batch semantics can be exercised without HTTP.
pub trait TokenExchanger {
    /// Exchange an operator-entered authorization code for tokens.
    fn exchange_code(&self, site: &Site, code: &str) -> Result<TokenGrant>;

    /// Mint a new access token from the site's refresh token.
    fn refresh(&self, site: &Site) -> Result<TokenGrant>;
}

/// Blocking HTTP client for the two OAuth2 grant exchanges.
///
/// Never mutates a `Site`; applying a grant atomically is the controller's
/// job, so a failed exchange cannot leave an entry half-updated.
pub struct TokenClient {
    http: reqwest::blocking::Client,
}

impl TokenClient {
    pub fn new() -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { http })
    }

    fn post_form(&self, token_url: &str, params: &[(&str, &str)]) -> Result<TokenGrant> {
        let body = self.http.post(token_url).form(params).send()?.text()?;

        let response: TokenResponse = serde_json::from_str(&body)?;

        if !response.error.is_empty() {
            return Err(Error::TokenEndpoint {
                code: response.error,
                description: response.error_description,
            });
        }

        if response.access_token.is_empty() {
            return Err(Error::EmptyToken);
        }

        let refresh_token = if response.refresh_token.is_empty() {
            None
        } else {
            Some(response.refresh_token)
        };

        Ok(TokenGrant {
            access_token: response.access_token,
            refresh_token,
            expires_in: response.expires_in,
        })
    }
}

impl TokenExchanger for TokenClient {
    fn exchange_code(&self, site: &Site, code: &str) -> Result<TokenGrant> {
        self.post_form(
            &site.token_url,
            &[
                ("client_id", site.client_id.as_str()),
                ("client_secret", site.client_secret.as_str()),
                ("code", code),
                ("redirect_uri", OOB_REDIRECT_URI),
                ("grant_type", "authorization_code"),
            ],
        )
    }

    fn refresh(&self, site: &Site) -> Result<TokenGrant> {
        self.post_form(
            &site.token_url,
            &[
                ("client_id", site.client_id.as_str()),
                ("client_secret", site.client_secret.as_str()),
                ("refresh_token", site.refresh_token.as_str()),
                ("grant_type", "refresh_token"),
            ],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn site(token_url: &str) -> Site {
        Site {
            name: "example".to_string(),
            client_id: "client".to_string(),
            client_secret: "secret".to_string(),
            auth_url: "https://auth.example.com/authorize".to_string(),
            token_url: token_url.to_string(),
            scopes: vec![],
            access_token: String::new(),
            refresh_token: "R1".to_string(),
            expires_at: 0,
        }
    }

    #[test]
    fn test_refresh_grant_success() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/token")
            .match_header("content-type", "application/x-www-form-urlencoded")
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("client_id".into(), "client".into()),
                Matcher::UrlEncoded("client_secret".into(), "secret".into()),
                Matcher::UrlEncoded("refresh_token".into(), "R1".into()),
                Matcher::UrlEncoded("grant_type".into(), "refresh_token".into()),
            ]))
            .with_body(r#"{"access_token":"T1","refresh_token":"R2","expires_in":3600}"#)
            .create();

        let client = TokenClient::new().unwrap();
        let grant = client
            .refresh(&site(&format!("{}/token", server.url())))
            .unwrap();

        mock.assert();
        assert_eq!(grant.access_token, "T1");
        assert_eq!(grant.refresh_token, Some("R2".to_string()));
        assert_eq!(grant.expires_in, 3600);
    }

    #[test]
    fn test_code_grant_sends_oob_redirect() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/token")
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("code".into(), "CODE".into()),
                Matcher::UrlEncoded("redirect_uri".into(), OOB_REDIRECT_URI.into()),
                Matcher::UrlEncoded("grant_type".into(), "authorization_code".into()),
            ]))
            .with_body(r#"{"access_token":"T1","expires_in":60}"#)
            .create();

        let client = TokenClient::new().unwrap();
        let grant = client
            .exchange_code(&site(&format!("{}/token", server.url())), "CODE")
            .unwrap();

        mock.assert();
        assert_eq!(grant.access_token, "T1");
        // Endpoint omitted the refresh token; caller keeps the old one.
        assert_eq!(grant.refresh_token, None);
    }

    #[test]
    fn test_endpoint_error_is_classified() {
        let mut server = mockito::Server::new();
        server
            .mock("POST", "/token")
            .with_status(400)
            .with_body(r#"{"error":"invalid_grant","error_description":"expired"}"#)
            .create();

        let client = TokenClient::new().unwrap();
        let err = client
            .refresh(&site(&format!("{}/token", server.url())))
            .unwrap_err();

        match err {
            Error::TokenEndpoint { code, description } => {
                assert_eq!(code, "invalid_grant");
                assert_eq!(description, "expired");
            }
            other => panic!("expected TokenEndpoint, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_access_token_is_rejected() {
        let mut server = mockito::Server::new();
        server
            .mock("POST", "/token")
            .with_body(r#"{"expires_in":3600}"#)
            .create();

        let client = TokenClient::new().unwrap();
        let err = client
            .refresh(&site(&format!("{}/token", server.url())))
            .unwrap_err();

        assert!(matches!(err, Error::EmptyToken));
    }

    #[test]
    fn test_non_json_body_is_a_parse_error() {
        let mut server = mockito::Server::new();
        server
            .mock("POST", "/token")
            .with_body("<html>gateway timeout</html>")
            .create();

        let client = TokenClient::new().unwrap();
        let err = client
            .refresh(&site(&format!("{}/token", server.url())))
            .unwrap_err();

        assert!(matches!(err, Error::Json(_)));
    }
}
