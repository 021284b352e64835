mod builds;
mod jobs;
mod queue;
mod system;
mod transport;

use log::{debug, info, warn};
use reqwest::cookie::Jar;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::redirect::Policy;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use url::Url;

use crate::auth::Credentials;
use crate::config::{Config, HttpConfig};
use crate::error::{JenkinsError, Result};

use super::links;
use super::types::Crumb;

use transport::PostResponse;

pub use builds::{log_snippet, DEFAULT_RECENT_BUILDS, DEFAULT_SNIPPET_LENGTH};

/// Jenkins REST client.
///
/// One method per Jenkins capability. Each method issues at most a couple of
/// sequential requests and normalizes the response into a stable shape.
/// State-changing calls attach a CSRF crumb, fetched once and then reused for
/// the lifetime of the client.
///
/// Reads follow redirects. POSTs do not, so the queue `Location` header of a
/// trigger stays visible. Both share one cookie jar: Jenkins binds a crumb to
/// the session that issued it.
pub struct JenkinsClient {
    http: Client,
    http_post: Client,
    credentials: Credentials,
    base: Url,
    timeout: Duration,
    crumb: Mutex<Option<Crumb>>,
}

impl JenkinsClient {
    /// Creates a client for explicit credentials.
    ///
    /// # Errors
    ///
    /// Returns [`JenkinsError::Config`] if the base URL is not an absolute
    /// http(s) URL or the HTTP client cannot be built.
    pub fn new(credentials: Credentials, http_config: &HttpConfig) -> Result<Self> {
        let base = Url::parse(credentials.base_url())
            .map_err(|e| JenkinsError::Config(format!("Invalid Jenkins URL: {e}")))?;
        if base.cannot_be_a_base() {
            return Err(JenkinsError::Config(format!(
                "Invalid Jenkins URL: {}",
                credentials.base_url()
            )));
        }

        let jar = Arc::new(Jar::default());
        let http = build_http(http_config, &jar, Policy::default())?;
        let http_post = build_http(http_config, &jar, Policy::none())?;

        info!(
            "Jenkins client initialized for {} ({} auth)",
            credentials.base_url(),
            credentials.scheme()
        );

        Ok(Self {
            http,
            http_post,
            credentials,
            base,
            timeout: Duration::from_millis(http_config.timeout_ms),
            crumb: Mutex::new(None),
        })
    }

    /// Creates a client from configuration, resolving credentials first.
    ///
    /// # Errors
    ///
    /// Fails when the Jenkins URL or credentials are missing.
    pub fn from_config(config: &Config) -> Result<Self> {
        let credentials = Credentials::from_config(&config.jenkins)?;
        Self::new(credentials, &config.http)
    }

    pub fn base_url(&self) -> &str {
        self.credentials.base_url()
    }

    fn endpoint<'a>(&self, segments: impl IntoIterator<Item = &'a str>, query: Option<&str>) -> Url {
        links::endpoint(&self.base, segments, query)
    }

    fn job_endpoint<'a>(
        &self,
        job: &'a str,
        tail: impl IntoIterator<Item = &'a str>,
        query: Option<&str>,
    ) -> Url {
        links::job_endpoint(&self.base, job, tail, query)
    }

    /// Returns the cached crumb, fetching it on first use.
    ///
    /// A failed fetch is not an error: Jenkins without CSRF protection has no
    /// crumb issuer. Nothing is cached in that case, so the next mutating call
    /// tries again.
    async fn ensure_crumb(&self) -> Option<Crumb> {
        let mut cached = self.crumb.lock().await;
        if let Some(crumb) = cached.as_ref() {
            return Some(crumb.clone());
        }

        let url = self.endpoint(["crumbIssuer", "api", "json"], None);
        match self.get_json::<Crumb>(url).await {
            Ok(crumb) => {
                debug!("Fetched CSRF crumb ({})", crumb.field_name);
                *cached = Some(crumb.clone());
                Some(crumb)
            }
            Err(e) => {
                warn!("Crumb fetch failed (continuing): {e}");
                None
            }
        }
    }

    async fn crumb_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        let Some(crumb) = self.ensure_crumb().await else {
            return headers;
        };

        match (
            HeaderName::from_bytes(crumb.field_name.as_bytes()),
            HeaderValue::from_str(&crumb.value),
        ) {
            (Ok(name), Ok(value)) => {
                headers.insert(name, value);
            }
            _ => warn!(
                "Ignoring crumb with unusable header field {:?}",
                crumb.field_name
            ),
        }
        headers
    }

    /// POSTs to a state-changing endpoint with the crumb attached.
    ///
    /// A 404 becomes `not_found` when given and is tolerated otherwise. Any
    /// other 4xx/5xx status becomes [`JenkinsError::Http`].
    async fn mutate(
        &self,
        url: Url,
        form: Option<Vec<(String, String)>>,
        not_found: Option<JenkinsError>,
    ) -> Result<PostResponse> {
        let headers = self.crumb_headers().await;
        let response = self.post(url.clone(), headers, form).await?;

        match response.status {
            404 => match not_found {
                Some(err) => Err(err),
                None => Ok(response),
            },
            status if status >= 400 => Err(JenkinsError::Http {
                status,
                url: url.to_string(),
            }),
            _ => Ok(response),
        }
    }
}

fn build_http(http_config: &HttpConfig, jar: &Arc<Jar>, redirect: Policy) -> Result<Client> {
    Client::builder()
        .user_agent(http_config.user_agent.as_str())
        .cookie_provider(Arc::clone(jar))
        .redirect(redirect)
        .build()
        .map_err(|e| JenkinsError::Config(format!("Failed to create HTTP client: {e}")))
}
