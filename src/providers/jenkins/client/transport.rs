use log::debug;
use reqwest::header::{HeaderMap, AUTHORIZATION, LOCATION};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use url::Url;

use crate::error::{JenkinsError, Result};

use super::JenkinsClient;

/// Status and queue location of a POST. Status codes are not filtered here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostResponse {
    pub status: u16,
    pub location: Option<String>,
}

fn classify(e: reqwest::Error) -> JenkinsError {
    if e.is_timeout() {
        JenkinsError::Timeout
    } else {
        JenkinsError::Network(e)
    }
}

fn ensure_success(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(JenkinsError::Http {
            status: status.as_u16(),
            url: response.url().to_string(),
        })
    }
}

impl JenkinsClient {
    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        debug!("{method} {url}");
        let http = if method == Method::POST {
            &self.http_post
        } else {
            &self.http
        };
        http.request(method, url)
            .header(AUTHORIZATION, self.credentials.auth_header())
            .timeout(self.timeout)
    }

    /// Sends a request. Dropping the in-flight future on timeout aborts it.
    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = request.send().await.map_err(classify)?;
        if response.status() == StatusCode::UNAUTHORIZED {
            return Err(JenkinsError::AuthFailed);
        }
        Ok(response)
    }

    async fn get(&self, url: Url) -> Result<Response> {
        let response = self.send(self.request(Method::GET, url)).await?;
        ensure_success(response)
    }

    pub(super) async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        let body = self.get_bytes(url).await?;
        Ok(serde_json::from_slice(&body)?)
    }

    pub(super) async fn get_text(&self, url: Url) -> Result<String> {
        self.get(url).await?.text().await.map_err(classify)
    }

    pub(super) async fn get_bytes(&self, url: Url) -> Result<Vec<u8>> {
        let body = self.get(url).await?.bytes().await.map_err(classify)?;
        Ok(body.to_vec())
    }

    /// Response headers of a HEAD request, whatever its status.
    pub(super) async fn head(&self, url: Url) -> Result<HeaderMap> {
        let response = self.send(self.request(Method::HEAD, url)).await?;
        Ok(response.headers().clone())
    }

    pub(super) async fn post(
        &self,
        url: Url,
        headers: HeaderMap,
        form: Option<Vec<(String, String)>>,
    ) -> Result<PostResponse> {
        let mut request = self.request(Method::POST, url).headers(headers);
        if let Some(form) = form {
            request = request.form(&form);
        }

        let response = self.send(request).await?;
        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string);

        Ok(PostResponse {
            status: response.status().as_u16(),
            location,
        })
    }
}
