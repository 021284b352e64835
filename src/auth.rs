use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::config::JenkinsConfig;
use crate::error::{JenkinsError, Result};

/// An API secret that never shows up in `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct Token(String);

impl Token {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Token {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for Token {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl std::fmt::Debug for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Token(***)")
    }
}

/// How requests are authenticated against Jenkins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Auth {
    Bearer(Token),
    Basic { user: String, api_token: Token },
}

impl Auth {
    /// Value of the `Authorization` header for this scheme.
    pub fn header_value(&self) -> String {
        match self {
            Self::Bearer(token) => format!("Bearer {}", token.as_str()),
            Self::Basic { user, api_token } => {
                let raw = format!("{user}:{}", api_token.as_str());
                format!("Basic {}", STANDARD.encode(raw))
            }
        }
    }

    pub fn scheme(&self) -> &'static str {
        match self {
            Self::Bearer(_) => "bearer",
            Self::Basic { .. } => "basic",
        }
    }
}

/// Base URL and authorization header used for every request of a client.
///
/// Immutable once built. The base URL never ends with a slash.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    base_url: String,
    auth_header: String,
    scheme: &'static str,
}

impl Credentials {
    /// Credentials supplied directly by the caller, bypassing configuration.
    pub fn new(base_url: impl Into<String>, auth_header: impl Into<String>) -> Self {
        let auth_header = auth_header.into();
        Self {
            base_url: normalize_base_url(&base_url.into()),
            scheme: scheme_of(&auth_header),
            auth_header,
        }
    }

    pub fn from_auth(base_url: impl Into<String>, auth: &Auth) -> Self {
        Self {
            base_url: normalize_base_url(&base_url.into()),
            auth_header: auth.header_value(),
            scheme: auth.scheme(),
        }
    }

    /// Resolves credentials from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`JenkinsError::Config`] when the URL is missing and
    /// [`JenkinsError::MissingCredentials`] when neither a bearer token nor a
    /// user + API token pair is configured.
    pub fn from_config(config: &JenkinsConfig) -> Result<Self> {
        let url = config
            .url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .ok_or_else(|| {
                JenkinsError::Config(
                    "Missing JENKINS_URL. Set JENKINS_URL to your Jenkins server URL.".to_string(),
                )
            })?;

        let auth = resolve_auth(config)?;

        Ok(Self::from_auth(url, &auth))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn auth_header(&self) -> &str {
        &self.auth_header
    }

    /// Auth scheme name for logs: `bearer`, `basic` or `custom`.
    pub fn scheme(&self) -> &'static str {
        self.scheme
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("base_url", &self.base_url)
            .field("scheme", &self.scheme)
            .field("auth_header", &"***")
            .finish()
    }
}

/// Picks the auth scheme from configuration. A bearer token wins over basic auth.
pub fn resolve_auth(config: &JenkinsConfig) -> Result<Auth> {
    let present = |v: &Option<String>| v.as_deref().filter(|s| !s.is_empty()).map(str::to_string);

    if let Some(token) = present(&config.bearer_token) {
        return Ok(Auth::Bearer(Token::from(token)));
    }

    match (present(&config.user), present(&config.api_token)) {
        (Some(user), Some(api_token)) => Ok(Auth::Basic {
            user,
            api_token: Token::from(api_token),
        }),
        _ => Err(JenkinsError::MissingCredentials),
    }
}

fn scheme_of(auth_header: &str) -> &'static str {
    match auth_header.split_once(' ') {
        Some((scheme, _)) if scheme.eq_ignore_ascii_case("bearer") => "bearer",
        Some((scheme, _)) if scheme.eq_ignore_ascii_case("basic") => "basic",
        _ => "custom",
    }
}

fn normalize_base_url(url: &str) -> String {
    url.strip_suffix('/').unwrap_or(url).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(
        url: Option<&str>,
        user: Option<&str>,
        api_token: Option<&str>,
        bearer: Option<&str>,
    ) -> JenkinsConfig {
        JenkinsConfig {
            url: url.map(ToString::to_string),
            user: user.map(ToString::to_string),
            api_token: api_token.map(ToString::to_string),
            bearer_token: bearer.map(ToString::to_string),
        }
    }

    #[test]
    fn test_basic_auth_header() {
        let creds = Credentials::from_config(&config(
            Some("https://ci.example.com/"),
            Some("alice"),
            Some("secret"),
            None,
        ))
        .unwrap();

        assert_eq!(creds.base_url(), "https://ci.example.com");
        assert_eq!(creds.auth_header(), "Basic YWxpY2U6c2VjcmV0");
    }

    #[test]
    fn test_bearer_wins_over_basic() {
        let creds = Credentials::from_config(&config(
            Some("https://ci.example.com"),
            Some("alice"),
            Some("secret"),
            Some("tkn"),
        ))
        .unwrap();

        assert_eq!(creds.auth_header(), "Bearer tkn");
        assert_eq!(creds.scheme(), "bearer");
    }

    #[test]
    fn test_scheme_follows_resolved_auth() {
        let basic = Credentials::from_config(&config(
            Some("https://ci.example.com"),
            Some("alice"),
            Some("secret"),
            None,
        ))
        .unwrap();

        assert_eq!(basic.scheme(), "basic");
        assert_eq!(Credentials::new("https://ci.example.com", "bearer x").scheme(), "bearer");
        assert_eq!(Credentials::new("https://ci.example.com", "Token x").scheme(), "custom");
    }

    #[test]
    fn test_missing_url_is_config_error() {
        let err = Credentials::from_config(&config(None, None, None, Some("tkn"))).unwrap_err();
        assert!(matches!(err, JenkinsError::Config(_)));
    }

    #[test]
    fn test_user_without_token_is_rejected() {
        let err = Credentials::from_config(&config(
            Some("https://ci.example.com"),
            Some("alice"),
            None,
            None,
        ))
        .unwrap_err();
        assert!(matches!(err, JenkinsError::MissingCredentials));
    }

    #[test]
    fn test_explicit_credentials_strip_trailing_slash() {
        let creds = Credentials::new("https://ci.example.com/jenkins/", "Bearer x");
        assert_eq!(creds.base_url(), "https://ci.example.com/jenkins");
        assert_eq!(creds.auth_header(), "Bearer x");
    }

    #[test]
    fn test_debug_hides_secrets() {
        let creds = Credentials::new("https://ci.example.com", "Bearer hunter2");
        let auth = Auth::Bearer(Token::from("hunter2"));

        assert!(!format!("{creds:?}").contains("hunter2"));
        assert!(!format!("{auth:?}").contains("hunter2"));
    }
}
