use log::debug;
use serde_json::{Map, Value};

use crate::error::{JenkinsError, Result};

use super::super::types::{
    JobConfig, JobDeleted, JobDisabled, JobEnabled, JobRef, QueuedBuild, RawJobList,
};
use super::JenkinsClient;

fn job_not_found(job: &str) -> impl FnOnce() -> JenkinsError + '_ {
    move || JenkinsError::JobNotFound(job.to_string())
}

/// Renders a build parameter the way Jenkins expects it in a form field.
fn param_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl JenkinsClient {
    /// Lists top-level jobs. An instance without jobs yields an empty list.
    pub async fn list_jobs(&self) -> Result<Vec<JobRef>> {
        let url = self.endpoint(["api", "json"], None);
        let data: RawJobList = self.get_json(url).await?;
        Ok(data
            .jobs
            .unwrap_or_default()
            .into_iter()
            .map(JobRef::from)
            .collect())
    }

    /// Jobs whose name contains `query`, ignoring case.
    ///
    /// A blank query matches nothing and does not touch the network.
    pub async fn search_jobs(&self, query: &str) -> Result<Vec<JobRef>> {
        if query.trim().is_empty() {
            return Ok(Vec::new());
        }

        let needle = query.to_lowercase();
        let jobs = self.list_jobs().await?;
        debug!("Searching {} jobs for {query:?}", jobs.len());

        Ok(jobs
            .into_iter()
            .filter(|job| job.name.to_lowercase().contains(&needle))
            .collect())
    }

    /// Queues a build, using `buildWithParameters` iff `params` is non-empty.
    pub async fn trigger_build(
        &self,
        job_name: &str,
        params: Option<&Map<String, Value>>,
    ) -> Result<QueuedBuild> {
        let params = params.filter(|p| !p.is_empty());
        let action = if params.is_some() {
            "buildWithParameters"
        } else {
            "build"
        };
        let form = params.map(|p| {
            p.iter()
                .map(|(k, v)| (k.clone(), param_value(v)))
                .collect::<Vec<_>>()
        });

        let url = self.job_endpoint(job_name, [action], None);
        let response = self
            .mutate(url, form, Some(JenkinsError::JobNotFound(job_name.to_string())))
            .await?;

        Ok(QueuedBuild {
            job_name: job_name.to_string(),
            build_number: None,
            queue_url: response.location,
        })
    }

    pub async fn get_job_config(&self, job_name: &str) -> Result<JobConfig> {
        let url = self.job_endpoint(job_name, ["config.xml"], None);
        let config = self
            .get_text(url)
            .await
            .map_err(|e| e.map_not_found(job_not_found(job_name)))?;

        Ok(JobConfig {
            job_name: job_name.to_string(),
            config,
        })
    }

    pub async fn enable_job(&self, job_name: &str) -> Result<JobEnabled> {
        self.job_action(job_name, "enable").await?;
        Ok(JobEnabled {
            job_name: job_name.to_string(),
            enabled: true,
        })
    }

    pub async fn disable_job(&self, job_name: &str) -> Result<JobDisabled> {
        self.job_action(job_name, "disable").await?;
        Ok(JobDisabled {
            job_name: job_name.to_string(),
            disabled: true,
        })
    }

    /// Permanently deletes a job.
    pub async fn delete_job(&self, job_name: &str) -> Result<JobDeleted> {
        self.job_action(job_name, "doDelete").await?;
        Ok(JobDeleted {
            job_name: job_name.to_string(),
            deleted: true,
        })
    }

    async fn job_action(&self, job_name: &str, action: &str) -> Result<()> {
        let url = self.job_endpoint(job_name, [action], None);
        self.mutate(url, None, Some(JenkinsError::JobNotFound(job_name.to_string())))
            .await?;
        Ok(())
    }
}
