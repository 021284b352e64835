use crate::error::Result;

use super::super::types::{
    Node, Plugin, RawComputers, RawPlugins, RawSystemInfo, SystemInfo, Version,
};
use super::JenkinsClient;

const VERSION_HEADER: &str = "x-jenkins";

impl JenkinsClient {
    /// Controller and agents with their executor counts.
    pub async fn list_nodes(&self) -> Result<Vec<Node>> {
        let url = self.endpoint(["computer", "api", "json"], Some("depth=1"));
        let data: RawComputers = self.get_json(url).await?;
        Ok(data
            .computer
            .unwrap_or_default()
            .into_iter()
            .map(Node::from)
            .collect())
    }

    pub async fn get_system_info(&self) -> Result<SystemInfo> {
        let url = self.endpoint(["api", "json"], None);
        let data: RawSystemInfo = self.get_json(url).await?;
        Ok(SystemInfo::from(data))
    }

    /// Reads the version from the `X-Jenkins` response header of a HEAD request.
    pub async fn get_version(&self) -> Result<Version> {
        let url = self.endpoint(["api", "json"], None);
        let headers = self.head(url).await?;
        let version = headers
            .get(VERSION_HEADER)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .unwrap_or("unknown")
            .to_string();
        Ok(Version { version })
    }

    pub async fn get_plugins(&self) -> Result<Vec<Plugin>> {
        let url = self.endpoint(["pluginManager", "api", "json"], Some("depth=1"));
        let data: RawPlugins = self.get_json(url).await?;
        Ok(data
            .plugins
            .unwrap_or_default()
            .into_iter()
            .map(Plugin::from)
            .collect())
    }
}
