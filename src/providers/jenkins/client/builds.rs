use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::error::{JenkinsError, Result};

use super::super::links;
use super::super::types::{
    Artifact, ArtifactContent, BuildChanges, BuildDeleted, BuildStopped, Change, ConsoleLog,
    NormalizedBuild, PipelineStages, QueuedBuild, RawArtifacts, RawBuild, RawBuildChangeSet,
    RawJobBuilds, RawTestReport, RawWorkflowRun, Stage, TestResults,
};
use super::JenkinsClient;

/// Default number of characters kept in a console log snippet.
pub const DEFAULT_SNIPPET_LENGTH: usize = 200;

/// Default number of builds returned by [`JenkinsClient::get_recent_builds`].
pub const DEFAULT_RECENT_BUILDS: usize = 5;

/// Trims the log, drops carriage returns and keeps the first `max_len` characters.
pub fn log_snippet(log: &str, max_len: usize) -> String {
    log.trim()
        .chars()
        .filter(|c| *c != '\r')
        .take(max_len)
        .collect()
}

impl JenkinsClient {
    /// The first `limit` builds of a job, newest first.
    pub async fn get_recent_builds(
        &self,
        job_name: &str,
        limit: usize,
    ) -> Result<Vec<NormalizedBuild>> {
        let url = self.job_endpoint(job_name, ["api", "json"], Some("depth=1"));
        let data: RawJobBuilds = self
            .get_json(url)
            .await
            .map_err(|e| e.map_not_found(|| JenkinsError::JobNotFound(job_name.to_string())))?;

        Ok(data
            .builds
            .unwrap_or_default()
            .into_iter()
            .take(limit)
            .map(NormalizedBuild::from)
            .collect())
    }

    pub async fn get_last_build(&self, job_name: &str) -> Result<NormalizedBuild> {
        self.fetch_build(job_name, "lastBuild").await
    }

    pub async fn get_build(&self, job_name: &str, build_number: u64) -> Result<NormalizedBuild> {
        self.fetch_build(job_name, &build_number.to_string()).await
    }

    async fn fetch_build(&self, job_name: &str, selector: &str) -> Result<NormalizedBuild> {
        let url = self.job_endpoint(job_name, [selector, "api", "json"], None);
        let raw: RawBuild = self
            .get_json(url)
            .await
            .map_err(|e| e.map_not_found(|| JenkinsError::JobNotFound(job_name.to_string())))?;
        Ok(NormalizedBuild::from(raw))
    }

    /// Console output of a build, resolving the last build when no number is given.
    pub async fn get_console_log(
        &self,
        job_name: &str,
        build_number: Option<u64>,
        max_snippet_length: usize,
    ) -> Result<ConsoleLog> {
        let build_number = match build_number {
            Some(n) => n,
            None => {
                let last = self.get_last_build(job_name).await?;
                last.id.parse().map_err(|_| {
                    JenkinsError::Unexpected(format!(
                        "Last build of {job_name} has no usable build number: {:?}",
                        last.id
                    ))
                })?
            }
        };

        let number = build_number.to_string();
        let url = self.job_endpoint(job_name, [number.as_str(), "consoleText"], None);
        let full_log = self
            .get_text(url)
            .await
            .map_err(|e| e.map_not_found(|| JenkinsError::JobNotFound(job_name.to_string())))?;

        Ok(ConsoleLog {
            job_name: job_name.to_string(),
            build_number,
            log_snippet: log_snippet(&full_log, max_snippet_length),
            full_log,
        })
    }

    pub async fn list_artifacts(&self, job_name: &str, build_number: u64) -> Result<Vec<Artifact>> {
        let number = build_number.to_string();
        let url = self.job_endpoint(
            job_name,
            [number.as_str(), "api", "json"],
            Some("tree=artifacts[fileName,relativePath]"),
        );
        let data: RawArtifacts = self
            .get_json(url)
            .await
            .map_err(|e| e.map_not_found(|| JenkinsError::JobNotFound(job_name.to_string())))?;

        Ok(data
            .artifacts
            .unwrap_or_default()
            .into_iter()
            .map(|a| {
                let relative_path = a.relative_path.unwrap_or_default();
                let url = links::artifact_url(&self.base, job_name, build_number, &relative_path);
                Artifact {
                    file_name: a.file_name.unwrap_or_default(),
                    relative_path,
                    url: url.to_string(),
                    size: None,
                }
            })
            .collect())
    }

    /// Downloads an artifact as base64.
    pub async fn get_artifact(
        &self,
        job_name: &str,
        build_number: u64,
        relative_path: &str,
    ) -> Result<ArtifactContent> {
        let url = links::artifact_url(&self.base, job_name, build_number, relative_path);
        let bytes = self.get_bytes(url).await.map_err(|e| {
            e.map_not_found(|| JenkinsError::ArtifactNotFound(relative_path.to_string()))
        })?;

        let file_name = relative_path
            .rsplit('/')
            .next()
            .filter(|name| !name.is_empty())
            .unwrap_or(relative_path);

        Ok(ArtifactContent {
            file_name: file_name.to_string(),
            relative_path: relative_path.to_string(),
            size: bytes.len() as u64,
            base64: STANDARD.encode(&bytes),
        })
    }

    pub async fn stop_build(&self, job_name: &str, build_number: u64) -> Result<BuildStopped> {
        self.build_action(job_name, build_number, &["stop"]).await?;
        Ok(BuildStopped {
            job_name: job_name.to_string(),
            build_number,
            stopped: true,
        })
    }

    pub async fn delete_build(&self, job_name: &str, build_number: u64) -> Result<BuildDeleted> {
        self.build_action(job_name, build_number, &["doDelete"]).await?;
        Ok(BuildDeleted {
            job_name: job_name.to_string(),
            build_number,
            deleted: true,
        })
    }

    /// Re-runs a pipeline build with its original script and parameters.
    pub async fn replay_build(&self, job_name: &str, build_number: u64) -> Result<QueuedBuild> {
        let queue_url = self
            .build_action(job_name, build_number, &["replay", "rebuild"])
            .await?;
        Ok(QueuedBuild {
            job_name: job_name.to_string(),
            build_number: Some(build_number),
            queue_url,
        })
    }

    /// POSTs to `/job/{job}/{n}/{action..}` and returns the `Location` header.
    async fn build_action(
        &self,
        job_name: &str,
        build_number: u64,
        action: &[&str],
    ) -> Result<Option<String>> {
        let number = build_number.to_string();
        let url = self.job_endpoint(
            job_name,
            std::iter::once(number.as_str()).chain(action.iter().copied()),
            None,
        );
        let response = self
            .mutate(url, None, Some(JenkinsError::JobNotFound(job_name.to_string())))
            .await?;
        Ok(response.location)
    }

    /// Test report counts. A build without a report is not an error.
    pub async fn get_test_results(&self, job_name: &str, build_number: u64) -> Result<TestResults> {
        let number = build_number.to_string();
        let url = self.job_endpoint(job_name, [number.as_str(), "testReport", "api", "json"], None);

        match self.get_json::<RawTestReport>(url).await {
            Ok(report) => Ok(TestResults::from_report(job_name, build_number, report)),
            Err(e) if e.http_status() == Some(404) => Ok(TestResults::missing(job_name, build_number)),
            Err(e) => Err(e),
        }
    }

    pub async fn get_build_changes(&self, job_name: &str, build_number: u64) -> Result<BuildChanges> {
        let number = build_number.to_string();
        let url = self.job_endpoint(
            job_name,
            [number.as_str(), "api", "json"],
            Some("tree=changeSet[items[author[fullName],msg,commitId,timestamp]]"),
        );
        let data: RawBuildChangeSet = self
            .get_json(url)
            .await
            .map_err(|e| e.map_not_found(|| JenkinsError::JobNotFound(job_name.to_string())))?;

        let changes = data
            .change_set
            .and_then(|set| set.items)
            .unwrap_or_default()
            .into_iter()
            .map(Change::from)
            .collect();

        Ok(BuildChanges {
            job_name: job_name.to_string(),
            build_number,
            changes,
        })
    }

    /// Stages from the workflow API. Non-pipeline builds yield a message, not an error.
    pub async fn get_pipeline_stages(
        &self,
        job_name: &str,
        build_number: u64,
    ) -> Result<PipelineStages> {
        let number = build_number.to_string();
        let url = self.job_endpoint(job_name, [number.as_str(), "wfapi", "describe"], None);

        match self.get_json::<RawWorkflowRun>(url).await {
            Ok(run) => Ok(PipelineStages {
                job_name: job_name.to_string(),
                build_number,
                status: Some(run.status.unwrap_or_default()),
                stages: Some(
                    run.stages
                        .unwrap_or_default()
                        .into_iter()
                        .map(Stage::from)
                        .collect(),
                ),
                message: None,
            }),
            Err(e) if e.http_status() == Some(404) => Ok(PipelineStages {
                job_name: job_name.to_string(),
                build_number,
                status: None,
                stages: None,
                message: Some("Not a pipeline build or workflow API not available".to_string()),
            }),
            Err(e) => Err(e),
        }
    }
}
