use super::{AuthorizationRequest, OAuthProvider, with_timeout};
use crate::config::{ClientIdentity, GoogleConfig};
use crate::error::{AppError, Result};
use crate::models::Credential;
use async_trait::async_trait;
use chrono::Utc;
use oauth2::{
    AuthUrl, AuthorizationCode, Client, ClientId, ClientSecret, CsrfToken, EndpointNotSet,
    EndpointSet, RedirectUrl, RefreshToken, RequestTokenError, Scope,
    StandardRevocableToken, TokenResponse, TokenUrl,
    basic::{
        BasicClient, BasicErrorResponse, BasicRevocationErrorResponse,
        BasicTokenIntrospectionResponse, BasicTokenResponse,
    },
};
use reqwest::redirect::Policy;
use std::time::Duration;
use tracing::{debug, info, instrument};

const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

const GOOGLE_SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/spreadsheets.readonly",
    "https://www.googleapis.com/auth/drive.readonly",
];

// Type alias for the client when Auth and Token URLs are set
type ConfiguredClient = Client<
    BasicErrorResponse,
    BasicTokenResponse,
    BasicTokenIntrospectionResponse,
    StandardRevocableToken,
    BasicRevocationErrorResponse,
    EndpointSet,    // HasAuthUrl
    EndpointNotSet, // HasDeviceAuthUrl
    EndpointNotSet, // HasIntrospectionUrl
    EndpointNotSet, // HasRevocationUrl
    EndpointSet,    // HasTokenUrl
>;

/// Web-server authorization code flow against Google's OAuth endpoints.
pub struct GoogleOAuth {
    config: GoogleConfig,
    http_client: reqwest::Client,
    timeout: Duration,
}

impl GoogleOAuth {
    pub fn new(config: &GoogleConfig, timeout: Duration) -> Result<Self> {
        // Redirects are disabled so the token endpoint can't bounce the code elsewhere
        let http_client = reqwest::ClientBuilder::new()
            .redirect(Policy::none())
            .build()
            .map_err(|e| AppError::Auth(format!("Failed to build reqwest client: {}", e)))?;

        Ok(Self {
            config: config.clone(),
            http_client,
            timeout,
        })
    }

    /// Build the OAuth client from configuration. Fails if the client identity is unset.
    fn client(&self) -> Result<(ConfiguredClient, ClientIdentity)> {
        let identity = self.config.identity()?;

        let auth_url = AuthUrl::new(GOOGLE_AUTH_URL.to_string())
            .map_err(|e| AppError::Config(format!("Invalid auth URL: {}", e)))?;
        let token_url = TokenUrl::new(GOOGLE_TOKEN_URL.to_string())
            .map_err(|e| AppError::Config(format!("Invalid token URL: {}", e)))?;
        let redirect_url = RedirectUrl::new(identity.redirect_uri.clone())
            .map_err(|e| AppError::Config(format!("Invalid redirect URI: {}", e)))?;

        let client = BasicClient::new(ClientId::new(identity.client_id.clone()))
            .set_client_secret(ClientSecret::new(identity.client_secret.clone()))
            .set_auth_uri(auth_url)
            .set_token_uri(token_url)
            .set_redirect_uri(redirect_url);

        Ok((client, identity))
    }
}

#[async_trait]
impl OAuthProvider for GoogleOAuth {
    fn authorize_url(&self) -> Result<AuthorizationRequest> {
        let (client, _) = self.client()?;

        let scopes = GOOGLE_SCOPES
            .iter()
            .map(|s| Scope::new(s.to_string()))
            .collect::<Vec<Scope>>();
        let (auth_url, csrf_token) = client
            .authorize_url(CsrfToken::new_random)
            .add_scopes(scopes)
            .add_extra_param("access_type", "offline")
            .add_extra_param("include_granted_scopes", "true")
            .url();

        Ok(AuthorizationRequest {
            auth_url: auth_url.to_string(),
            state: csrf_token.secret().clone(),
        })
    }

    #[instrument(name = "Exchanging authorization code", skip_all)]
    async fn exchange_code(&self, code: &str) -> Result<Credential> {
        let (client, identity) = self.client()?;

        let token_result = with_timeout(self.timeout, "authorization code exchange", async {
            client
                .exchange_code(AuthorizationCode::new(code.to_string()))
                .request_async(&self.http_client)
                .await
                .map_err(|e| {
                    AppError::Auth(format!("Failed to exchange code: {}", describe_error(e)))
                })
        })
        .await?;

        info!(
            has_refresh_token = token_result.refresh_token().is_some(),
            "Authorization code exchanged"
        );

        Ok(credential_from_response(
            &token_result,
            GOOGLE_TOKEN_URL,
            &identity.client_id,
            &identity.client_secret,
            None,
        ))
    }

    #[instrument(name = "Refreshing access token", skip_all)]
    async fn refresh(&self, credential: &Credential) -> Result<Credential> {
        let refresh_token = credential
            .refresh_token
            .as_deref()
            .ok_or_else(|| AppError::Auth("No refresh token available".to_string()))?;

        let token_url = TokenUrl::new(credential.token_endpoint.clone())
            .map_err(|e| AppError::Auth(format!("Invalid token URL: {}", e)))?;
        let client = BasicClient::new(ClientId::new(credential.client_id.clone()))
            .set_client_secret(ClientSecret::new(credential.client_secret.clone()))
            .set_token_uri(token_url);

        let token_result = with_timeout(self.timeout, "token refresh", async {
            let refresh_token = RefreshToken::new(refresh_token.to_string());
            client
                .exchange_refresh_token(&refresh_token)
                .request_async(&self.http_client)
                .await
                .map_err(|e| {
                    AppError::Auth(format!("Failed to refresh token: {}", describe_error(e)))
                })
        })
        .await?;

        debug!("Token refresh response received");

        Ok(credential_from_response(
            &token_result,
            &credential.token_endpoint,
            &credential.client_id,
            &credential.client_secret,
            Some(credential),
        ))
    }
}

fn describe_error<RE>(error: RequestTokenError<RE, BasicErrorResponse>) -> String
where
    RE: std::error::Error + 'static,
{
    match error {
        RequestTokenError::ServerResponse(response) => response.to_string(),
        RequestTokenError::Request(e) => format!("Request failed: {}", e),
        other => other.to_string(),
    }
}

/// Turn a token response into a credential.
///
/// When `previous` is provided, its refresh token and scopes are kept for any
/// field the response leaves out (common in refresh flows).
fn credential_from_response(
    token_result: &BasicTokenResponse,
    token_endpoint: &str,
    client_id: &str,
    client_secret: &str,
    previous: Option<&Credential>,
) -> Credential {
    let refresh_token = token_result
        .refresh_token()
        .map(|token| token.secret().clone())
        .or_else(|| previous.and_then(|p| p.refresh_token.clone()));

    let scopes = match (token_result.scopes(), previous) {
        (Some(scopes), _) => scopes.iter().map(|s| s.to_string()).collect(),
        (None, Some(previous)) => previous.scopes.clone(),
        (None, None) => GOOGLE_SCOPES.iter().map(|s| s.to_string()).collect(),
    };

    let expiry = token_result
        .expires_in()
        .map(|d| Utc::now() + chrono::Duration::seconds(d.as_secs() as i64));

    Credential {
        access_token: token_result.access_token().secret().clone(),
        refresh_token,
        token_endpoint: token_endpoint.to_string(),
        client_id: client_id.to_string(),
        client_secret: client_secret.to_string(),
        scopes,
        expiry,
    }
}
