//! Tool adapters.
//!
//! Each tool maps a JSON argument object onto exactly one [`JenkinsClient`]
//! method and returns its result as JSON. Listing the tools and routing
//! protocol messages is left to the host.

mod definitions;
mod inputs;


use log::{debug, error};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::error::{ErrorResponse, JenkinsError, Result};
use crate::providers::jenkins::{DEFAULT_RECENT_BUILDS, DEFAULT_SNIPPET_LENGTH};
use crate::providers::JenkinsClient;

pub use definitions::{tool_definitions, ToolDefinition};
pub use inputs::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tool {
    ListJobs,
    SearchJobs,
    GetJobStatus,
    GetBuildStatus,
    GetRecentBuilds,
    GetConsoleLog,
    TriggerBuild,
    ListArtifacts,
    GetArtifact,
    StopBuild,
    DeleteBuild,
    GetTestResults,
    GetBuildChanges,
    GetPipelineStages,
    ReplayBuild,
    GetQueue,
    CancelQueue,
    EnableJob,
    DisableJob,
    DeleteJob,
    GetJobConfig,
    ListNodes,
    GetSystemInfo,
    GetVersion,
    GetPlugins,
}

impl Tool {
    pub const ALL: [Tool; 25] = [
        Tool::ListJobs,
        Tool::SearchJobs,
        Tool::GetJobStatus,
        Tool::GetBuildStatus,
        Tool::GetRecentBuilds,
        Tool::GetConsoleLog,
        Tool::TriggerBuild,
        Tool::ListArtifacts,
        Tool::GetArtifact,
        Tool::StopBuild,
        Tool::DeleteBuild,
        Tool::GetTestResults,
        Tool::GetBuildChanges,
        Tool::GetPipelineStages,
        Tool::ReplayBuild,
        Tool::GetQueue,
        Tool::CancelQueue,
        Tool::EnableJob,
        Tool::DisableJob,
        Tool::DeleteJob,
        Tool::GetJobConfig,
        Tool::ListNodes,
        Tool::GetSystemInfo,
        Tool::GetVersion,
        Tool::GetPlugins,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::ListJobs => "jenkins_list_jobs",
            Self::SearchJobs => "jenkins_search_jobs",
            Self::GetJobStatus => "jenkins_get_job_status",
            Self::GetBuildStatus => "jenkins_get_build_status",
            Self::GetRecentBuilds => "jenkins_get_recent_builds",
            Self::GetConsoleLog => "jenkins_get_console_log",
            Self::TriggerBuild => "jenkins_trigger_build",
            Self::ListArtifacts => "jenkins_list_artifacts",
            Self::GetArtifact => "jenkins_get_artifact",
            Self::StopBuild => "jenkins_stop_build",
            Self::DeleteBuild => "jenkins_delete_build",
            Self::GetTestResults => "jenkins_get_test_results",
            Self::GetBuildChanges => "jenkins_get_build_changes",
            Self::GetPipelineStages => "jenkins_get_pipeline_stages",
            Self::ReplayBuild => "jenkins_replay_build",
            Self::GetQueue => "jenkins_get_queue",
            Self::CancelQueue => "jenkins_cancel_queue",
            Self::EnableJob => "jenkins_enable_job",
            Self::DisableJob => "jenkins_disable_job",
            Self::DeleteJob => "jenkins_delete_job",
            Self::GetJobConfig => "jenkins_get_job_config",
            Self::ListNodes => "jenkins_list_nodes",
            Self::GetSystemInfo => "jenkins_get_system_info",
            Self::GetVersion => "jenkins_get_version",
            Self::GetPlugins => "jenkins_get_plugins",
        }
    }
}

impl FromStr for Tool {
    type Err = JenkinsError;

    fn from_str(name: &str) -> Result<Self> {
        Tool::ALL
            .iter()
            .copied()
            .find(|tool| tool.name() == name)
            .ok_or_else(|| JenkinsError::ToolNotFound(name.to_string()))
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn parse_input<T: DeserializeOwned>(tool: Tool, arguments: Value) -> Result<T> {
    let arguments = match arguments {
        Value::Null => Value::Object(serde_json::Map::new()),
        other => other,
    };
    serde_json::from_value(arguments)
        .map_err(|e| JenkinsError::InvalidInput(format!("{tool}: {e}")))
}

fn to_json<T: Serialize>(result: T) -> Result<Value> {
    Ok(serde_json::to_value(result)?)
}

/// Runs the tool called `name` with `arguments`.
///
/// # Errors
///
/// [`JenkinsError::ToolNotFound`] for an unknown name,
/// [`JenkinsError::InvalidInput`] when the arguments do not fit the tool, and
/// whatever the client method raised otherwise.
pub async fn call_tool(client: &JenkinsClient, name: &str, arguments: Value) -> Result<Value> {
    let tool: Tool = name.parse()?;
    debug!("Calling tool {tool}");

    let result = run(client, tool, arguments).await;
    if let Err(e) = &result {
        error!("Tool execution failed: {tool} ({}): {e}", e.kind().as_str());
    }
    result
}

async fn run(client: &JenkinsClient, tool: Tool, arguments: Value) -> Result<Value> {
    match tool {
        Tool::ListJobs => to_json(client.list_jobs().await?),
        Tool::SearchJobs => {
            let input: SearchJobsInput = parse_input(tool, arguments)?;
            to_json(client.search_jobs(&input.query).await?)
        }
        Tool::GetJobStatus => {
            let input: JobInput = parse_input(tool, arguments)?;
            to_json(client.get_last_build(&input.job_name).await?)
        }
        Tool::GetBuildStatus => {
            let input: BuildInput = parse_input(tool, arguments)?;
            to_json(client.get_build(&input.job_name, input.build_number).await?)
        }
        Tool::GetRecentBuilds => {
            let input: RecentBuildsInput = parse_input(tool, arguments)?;
            let limit = input.limit.unwrap_or(DEFAULT_RECENT_BUILDS);
            to_json(client.get_recent_builds(&input.job_name, limit).await?)
        }
        Tool::GetConsoleLog => {
            let input: ConsoleLogInput = parse_input(tool, arguments)?;
            let max_len = input.max_snippet_length.unwrap_or(DEFAULT_SNIPPET_LENGTH);
            to_json(
                client
                    .get_console_log(&input.job_name, input.build_number, max_len)
                    .await?,
            )
        }
        Tool::TriggerBuild => {
            let input: TriggerBuildInput = parse_input(tool, arguments)?;
            to_json(
                client
                    .trigger_build(&input.job_name, input.params.as_ref())
                    .await?,
            )
        }
        Tool::ListArtifacts => {
            let input: BuildInput = parse_input(tool, arguments)?;
            to_json(client.list_artifacts(&input.job_name, input.build_number).await?)
        }
        Tool::GetArtifact => {
            let input: ArtifactInput = parse_input(tool, arguments)?;
            to_json(
                client
                    .get_artifact(&input.job_name, input.build_number, &input.relative_path)
                    .await?,
            )
        }
        Tool::StopBuild => {
            let input: BuildInput = parse_input(tool, arguments)?;
            to_json(client.stop_build(&input.job_name, input.build_number).await?)
        }
        Tool::DeleteBuild => {
            let input: BuildInput = parse_input(tool, arguments)?;
            to_json(client.delete_build(&input.job_name, input.build_number).await?)
        }
        Tool::GetTestResults => {
            let input: BuildInput = parse_input(tool, arguments)?;
            to_json(client.get_test_results(&input.job_name, input.build_number).await?)
        }
        Tool::GetBuildChanges => {
            let input: BuildInput = parse_input(tool, arguments)?;
            to_json(client.get_build_changes(&input.job_name, input.build_number).await?)
        }
        Tool::GetPipelineStages => {
            let input: BuildInput = parse_input(tool, arguments)?;
            to_json(
                client
                    .get_pipeline_stages(&input.job_name, input.build_number)
                    .await?,
            )
        }
        Tool::ReplayBuild => {
            let input: BuildInput = parse_input(tool, arguments)?;
            to_json(client.replay_build(&input.job_name, input.build_number).await?)
        }
        Tool::GetQueue => to_json(client.get_queue().await?),
        Tool::CancelQueue => {
            let input: QueueInput = parse_input(tool, arguments)?;
            to_json(client.cancel_queue(input.queue_id).await?)
        }
        Tool::EnableJob => {
            let input: JobInput = parse_input(tool, arguments)?;
            to_json(client.enable_job(&input.job_name).await?)
        }
        Tool::DisableJob => {
            let input: JobInput = parse_input(tool, arguments)?;
            to_json(client.disable_job(&input.job_name).await?)
        }
        Tool::DeleteJob => {
            let input: JobInput = parse_input(tool, arguments)?;
            to_json(client.delete_job(&input.job_name).await?)
        }
        Tool::GetJobConfig => {
            let input: JobInput = parse_input(tool, arguments)?;
            to_json(client.get_job_config(&input.job_name).await?)
        }
        Tool::ListNodes => to_json(client.list_nodes().await?),
        Tool::GetSystemInfo => to_json(client.get_system_info().await?),
        Tool::GetVersion => to_json(client.get_version().await?),
        Tool::GetPlugins => to_json(client.get_plugins().await?),
    }
}

/// Serializes a tool result as the text handed back to the caller.
pub fn render_result(result: &Value, pretty: bool) -> Result<String> {
    let text = if pretty {
        serde_json::to_string_pretty(result)?
    } else {
        serde_json::to_string(result)?
    };
    Ok(text)
}

/// Serializes a failed call as `{"error": ..., "code": ...}`.
pub fn render_error(err: &JenkinsError) -> Result<String> {
    Ok(serde_json::to_string(&ErrorResponse::from(err))?)
}
