use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration file structure for jenkins-tools.
///
/// Holds the Jenkins connection settings and HTTP transport tuning.
/// Values from the environment can be layered on top with [`Config::apply_env`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    /// Jenkins server and credentials
    #[serde(default)]
    pub jenkins: JenkinsConfig,

    /// HTTP transport settings
    #[serde(default)]
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct JenkinsConfig {
    /// Jenkins server URL (e.g., 'https://ci.example.com')
    pub url: Option<String>,

    /// User name for basic auth
    pub user: Option<String>,

    /// API token paired with `user` for basic auth
    pub api_token: Option<String>,

    /// Bearer token, preferred over basic auth when set
    pub bearer_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct HttpConfig {
    /// Per-request timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// User-Agent sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_timeout_ms() -> u64 {
    10_000
}

fn default_user_agent() -> String {
    format!("jenkins-tools/{}", env!("CARGO_PKG_VERSION"))
}

impl Config {
    /// Load configuration from a file.
    ///
    /// Searches for configuration files in this order:
    /// 1. Specified path
    /// 2. ./jenkins-tools.toml
    /// 3. ./jenkins-tools.json
    /// 4. ./jenkins-tools.yaml
    /// 5. ./jenkins-tools.yml
    ///
    /// Returns default configuration if no file is found.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            if path.exists() {
                return Self::load_from_path(path);
            }
            return Ok(Self::default());
        }

        let candidates = [
            "jenkins-tools.toml",
            "jenkins-tools.json",
            "jenkins-tools.yaml",
            "jenkins-tools.yml",
        ];

        for candidate in &candidates {
            let path = Path::new(candidate);
            if path.exists() {
                return Self::load_from_path(path);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file path.
    fn load_from_path(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("");

        match extension {
            "toml" => toml::from_str(&contents)
                .with_context(|| format!("Failed to parse TOML config: {}", path.display())),
            "json" => serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display())),
            "yaml" | "yml" => serde_yaml::from_str(&contents)
                .with_context(|| format!("Failed to parse YAML config: {}", path.display())),
            _ => toml::from_str(&contents)
                .or_else(|_| serde_json::from_str(&contents))
                .or_else(|_| serde_yaml::from_str(&contents))
                .with_context(|| format!("Failed to parse config file: {}", path.display())),
        }
    }

    /// Save configuration to a file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let contents = match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => serde_json::to_string_pretty(self)?,
            Some("yaml") | Some("yml") => serde_yaml::to_string(self)?,
            _ => toml::to_string_pretty(self)?,
        };

        std::fs::write(path, contents)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Overlay `JENKINS_*` variables resolved through `lookup`.
    ///
    /// Unset or empty variables leave the existing value untouched.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

        if let Some(url) = get("JENKINS_URL") {
            self.jenkins.url = Some(url);
        }
        if let Some(user) = get("JENKINS_USER") {
            self.jenkins.user = Some(user);
        }
        if let Some(token) = get("JENKINS_API_TOKEN") {
            self.jenkins.api_token = Some(token);
        }
        if let Some(token) = get("JENKINS_BEARER_TOKEN") {
            self.jenkins.bearer_token = Some(token);
        }
        if let Some(timeout) = get("JENKINS_TIMEOUT_MS") {
            self.http.timeout_ms = timeout
                .parse()
                .with_context(|| format!("Invalid JENKINS_TIMEOUT_MS: {timeout}"))?;
        }

        Ok(())
    }

    /// Defaults overlaid with the process environment.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }
}
