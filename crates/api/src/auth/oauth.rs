//! Federated login via OAuth 2.0 authorization-code exchange.
//!
//! Each provider implements [`OauthProvider`]: given the authorization code
//! from the provider's redirect, it exchanges the code for an access token,
//! fetches the user's profile, and normalizes it into a [`NormalizedProfile`].
//! Providers are registered at startup from environment variables; an
//! unconfigured provider simply does not appear in the registry.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

/// A provider-agnostic view of a federated identity.
#[derive(Debug, Clone)]
pub struct NormalizedProfile {
    /// Registry name of the provider that authenticated the user.
    pub provider: &'static str,
    /// The provider's stable id for this account.
    pub provider_id: String,
    /// Email address reported by the provider.
    pub email: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Profile photo URL, when the provider exposes one.
    pub photo: Option<String>,
}

/// Error type for the code-exchange and profile-fetch steps.
#[derive(Debug, thiserror::Error)]
pub enum OauthError {
    /// Transport-level failure talking to the provider.
    #[error("OAuth HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider rejected the code or returned an unusable response.
    #[error("OAuth exchange failed: {0}")]
    Exchange(String),
}

/// A federated identity provider that can redeem an authorization code.
#[async_trait]
pub trait OauthProvider: Send + Sync {
    /// Registry name, also the `{provider}` path segment of the callback URL.
    fn name(&self) -> &'static str;

    /// Exchange the authorization code for the user's normalized profile.
    async fn exchange_code(&self, code: &str) -> Result<NormalizedProfile, OauthError>;
}

/// Client credentials and redirect URL for one provider.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_url: String,
}

impl ProviderConfig {
    /// Load `<PREFIX>_CLIENT_ID`, `<PREFIX>_CLIENT_SECRET`, and
    /// `<PREFIX>_REDIRECT_URL` from the environment.
    ///
    /// Returns `None` if any of the three is unset, leaving the provider
    /// unregistered.
    pub fn from_env(prefix: &str) -> Option<Self> {
        Some(Self {
            client_id: std::env::var(format!("{prefix}_CLIENT_ID")).ok()?,
            client_secret: std::env::var(format!("{prefix}_CLIENT_SECRET")).ok()?,
            redirect_url: std::env::var(format!("{prefix}_REDIRECT_URL")).ok()?,
        })
    }
}

/// Access token returned by a standard OAuth 2.0 token endpoint.
#[derive(Debug, Deserialize)]
struct TokenExchangeResponse {
    access_token: String,
}

/// Split a display name into (first, last) on the first whitespace.
fn split_name(name: &str) -> (String, String) {
    match name.split_once(' ') {
        Some((first, last)) => (first.to_string(), last.trim().to_string()),
        None => (name.to_string(), String::new()),
    }
}

// ---------------------------------------------------------------------------
// Google
// ---------------------------------------------------------------------------

const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const GOOGLE_USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v2/userinfo";

pub struct GoogleProvider {
    config: ProviderConfig,
    http: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct GoogleUserInfo {
    id: String,
    email: String,
    given_name: Option<String>,
    family_name: Option<String>,
    picture: Option<String>,
}

impl GoogleProvider {
    pub fn new(config: ProviderConfig, http: reqwest::Client) -> Self {
        Self { config, http }
    }
}

#[async_trait]
impl OauthProvider for GoogleProvider {
    fn name(&self) -> &'static str {
        "google"
    }

    async fn exchange_code(&self, code: &str) -> Result<NormalizedProfile, OauthError> {
        let token: TokenExchangeResponse = self
            .http
            .post(GOOGLE_TOKEN_URL)
            .form(&[
                ("code", code),
                ("client_id", &self.config.client_id),
                ("client_secret", &self.config.client_secret),
                ("redirect_uri", &self.config.redirect_url),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await?
            .error_for_status()
            .map_err(|e| OauthError::Exchange(format!("Google token endpoint: {e}")))?
            .json()
            .await?;

        let info: GoogleUserInfo = self
            .http
            .get(GOOGLE_USERINFO_URL)
            .bearer_auth(&token.access_token)
            .send()
            .await?
            .error_for_status()
            .map_err(|e| OauthError::Exchange(format!("Google userinfo endpoint: {e}")))?
            .json()
            .await?;

        Ok(NormalizedProfile {
            provider: self.name(),
            provider_id: info.id,
            email: info.email,
            first_name: info.given_name.unwrap_or_default(),
            last_name: info.family_name.unwrap_or_default(),
            photo: info.picture,
        })
    }
}

// ---------------------------------------------------------------------------
// Facebook
// ---------------------------------------------------------------------------

const FACEBOOK_TOKEN_URL: &str = "https://graph.facebook.com/v19.0/oauth/access_token";
const FACEBOOK_PROFILE_URL: &str = "https://graph.facebook.com/me";

pub struct FacebookProvider {
    config: ProviderConfig,
    http: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct FacebookProfile {
    id: String,
    email: Option<String>,
    first_name: String,
    last_name: String,
    picture: Option<FacebookPicture>,
}

#[derive(Debug, Deserialize)]
struct FacebookPicture {
    data: FacebookPictureData,
}

#[derive(Debug, Deserialize)]
struct FacebookPictureData {
    url: String,
}

impl FacebookProvider {
    pub fn new(config: ProviderConfig, http: reqwest::Client) -> Self {
        Self { config, http }
    }
}

#[async_trait]
impl OauthProvider for FacebookProvider {
    fn name(&self) -> &'static str {
        "facebook"
    }

    async fn exchange_code(&self, code: &str) -> Result<NormalizedProfile, OauthError> {
        let token: TokenExchangeResponse = self
            .http
            .get(FACEBOOK_TOKEN_URL)
            .query(&[
                ("code", code),
                ("client_id", &self.config.client_id),
                ("client_secret", &self.config.client_secret),
                ("redirect_uri", &self.config.redirect_url),
            ])
            .send()
            .await?
            .error_for_status()
            .map_err(|e| OauthError::Exchange(format!("Facebook token endpoint: {e}")))?
            .json()
            .await?;

        let profile: FacebookProfile = self
            .http
            .get(FACEBOOK_PROFILE_URL)
            .query(&[
                ("fields", "id,email,first_name,last_name,picture"),
                ("access_token", &token.access_token),
            ])
            .send()
            .await?
            .error_for_status()
            .map_err(|e| OauthError::Exchange(format!("Facebook profile endpoint: {e}")))?
            .json()
            .await?;

        // Accounts registered by phone number have no email; synthesize a
        // provider-scoped address so the unique-email invariant holds.
        let email = profile
            .email
            .unwrap_or_else(|| format!("{}@users.facebook.com", profile.id));

        Ok(NormalizedProfile {
            provider: self.name(),
            provider_id: profile.id,
            email,
            first_name: profile.first_name,
            last_name: profile.last_name,
            photo: profile.picture.map(|p| p.data.url),
        })
    }
}

// ---------------------------------------------------------------------------
// Twitter
// ---------------------------------------------------------------------------

const TWITTER_TOKEN_URL: &str = "https://api.twitter.com/2/oauth2/token";
const TWITTER_USERS_ME_URL: &str = "https://api.twitter.com/2/users/me";

pub struct TwitterProvider {
    config: ProviderConfig,
    http: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct TwitterUserResponse {
    data: TwitterUser,
}

#[derive(Debug, Deserialize)]
struct TwitterUser {
    id: String,
    name: String,
    username: String,
    profile_image_url: Option<String>,
}

impl TwitterProvider {
    pub fn new(config: ProviderConfig, http: reqwest::Client) -> Self {
        Self { config, http }
    }
}

#[async_trait]
impl OauthProvider for TwitterProvider {
    fn name(&self) -> &'static str {
        "twitter"
    }

    async fn exchange_code(&self, code: &str) -> Result<NormalizedProfile, OauthError> {
        let token: TokenExchangeResponse = self
            .http
            .post(TWITTER_TOKEN_URL)
            .basic_auth(&self.config.client_id, Some(&self.config.client_secret))
            .form(&[
                ("code", code),
                ("grant_type", "authorization_code"),
                ("client_id", &self.config.client_id),
                ("redirect_uri", &self.config.redirect_url),
            ])
            .send()
            .await?
            .error_for_status()
            .map_err(|e| OauthError::Exchange(format!("Twitter token endpoint: {e}")))?
            .json()
            .await?;

        let response: TwitterUserResponse = self
            .http
            .get(TWITTER_USERS_ME_URL)
            .query(&[("user.fields", "profile_image_url")])
            .bearer_auth(&token.access_token)
            .send()
            .await?
            .error_for_status()
            .map_err(|e| OauthError::Exchange(format!("Twitter users/me endpoint: {e}")))?
            .json()
            .await?;

        let user = response.data;
        let (first_name, last_name) = split_name(&user.name);

        // The v2 API does not expose the account email; synthesize a
        // provider-scoped address so the unique-email invariant holds.
        let email = format!("{}@users.twitter.com", user.username);

        Ok(NormalizedProfile {
            provider: self.name(),
            provider_id: user.id,
            email,
            first_name,
            last_name,
            photo: user.profile_image_url,
        })
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// The set of providers configured at startup, keyed by registry name.
pub struct OauthProviders {
    providers: HashMap<&'static str, Arc<dyn OauthProvider>>,
}

impl OauthProviders {
    /// Empty registry.
    pub fn new() -> Self {
        Self {
            providers: HashMap::new(),
        }
    }

    /// Build the registry from environment variables.
    ///
    /// Registers each provider whose `GOOGLE_*` / `FACEBOOK_*` / `TWITTER_*`
    /// credentials are fully set.
    pub fn from_env() -> Self {
        let http = reqwest::Client::new();
        let mut registry = Self::new();

        if let Some(config) = ProviderConfig::from_env("GOOGLE") {
            registry.register(Arc::new(GoogleProvider::new(config, http.clone())));
        }
        if let Some(config) = ProviderConfig::from_env("FACEBOOK") {
            registry.register(Arc::new(FacebookProvider::new(config, http.clone())));
        }
        if let Some(config) = ProviderConfig::from_env("TWITTER") {
            registry.register(Arc::new(TwitterProvider::new(config, http)));
        }

        registry
    }

    /// Add a provider to the registry.
    pub fn register(&mut self, provider: Arc<dyn OauthProvider>) {
        self.providers.insert(provider.name(), provider);
    }

    /// Look up a provider by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn OauthProvider>> {
        self.providers.get(name).cloned()
    }

    /// Names of every registered provider.
    pub fn names(&self) -> Vec<&'static str> {
        self.providers.keys().copied().collect()
    }
}

impl Default for OauthProviders {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_name() {
        assert_eq!(split_name("Ada Lovelace"), ("Ada".into(), "Lovelace".into()));
        assert_eq!(split_name("Prince"), ("Prince".into(), String::new()));
        assert_eq!(
            split_name("Ada King Lovelace"),
            ("Ada".into(), "King Lovelace".into())
        );
    }

    #[test]
    fn test_provider_config_requires_all_vars() {
        assert!(ProviderConfig::from_env("NO_SUCH_PROVIDER_PREFIX").is_none());
    }

    #[test]
    fn test_registry_lookup_miss() {
        let registry = OauthProviders::new();
        assert!(registry.get("google").is_none());
        assert!(registry.names().is_empty());
    }

    #[test]
    fn test_facebook_profile_parses_nested_picture() {
        let json = serde_json::json!({
            "id": "123",
            "email": "fb@x.com",
            "first_name": "A",
            "last_name": "B",
            "picture": { "data": { "url": "https://cdn/pic.jpg" } }
        });
        let profile: FacebookProfile =
            serde_json::from_value(json).expect("profile should deserialize");
        assert_eq!(profile.picture.unwrap().data.url, "https://cdn/pic.jpg");
    }

    #[test]
    fn test_twitter_users_me_parses() {
        let json = serde_json::json!({
            "data": {
                "id": "42",
                "name": "Ada Lovelace",
                "username": "ada",
                "profile_image_url": "https://pbs/img.png"
            }
        });
        let response: TwitterUserResponse =
            serde_json::from_value(json).expect("response should deserialize");
        assert_eq!(response.data.username, "ada");
    }
}
