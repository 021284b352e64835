use serde::Serialize;
use serde_json::{json, Map, Value};

use super::Tool;

/// Name, description and JSON input schema of one tool, as listed to callers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    pub name: &'static str,
    pub description: &'static str,
    pub input_schema: Value,
}

fn job_name() -> (&'static str, Value) {
    (
        "jobName",
        json!({ "type": "string", "description": "Name of the Jenkins job" }),
    )
}

fn build_number(description: &str) -> (&'static str, Value) {
    (
        "buildNumber",
        json!({ "type": "number", "description": description }),
    )
}

fn object_schema(properties: Vec<(&'static str, Value)>, required: &[&str]) -> Value {
    let properties: Map<String, Value> = properties
        .into_iter()
        .map(|(name, schema)| (name.to_string(), schema))
        .collect();
    json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}

fn no_input() -> Value {
    object_schema(Vec::new(), &[])
}

fn job_only() -> Value {
    object_schema(vec![job_name()], &["jobName"])
}

fn job_and_build(description: &str) -> Value {
    object_schema(
        vec![job_name(), build_number(description)],
        &["jobName", "buildNumber"],
    )
}

impl Tool {
    pub fn description(self) -> &'static str {
        match self {
            Self::ListJobs => "List all Jenkins jobs with their names and URLs",
            Self::SearchJobs => "Search for Jenkins jobs by name (case-insensitive substring match)",
            Self::GetJobStatus => "Get the status of the last build for a specific job",
            Self::GetBuildStatus => "Get detailed status of a specific build number for a job",
            Self::GetRecentBuilds => "Get recent builds for a job with their status and metadata",
            Self::GetConsoleLog => {
                "Get console log output from a build. Returns both a snippet and full log."
            }
            Self::TriggerBuild => "Trigger a new build for a job, optionally with parameters",
            Self::ListArtifacts => "List all artifacts produced by a specific build",
            Self::GetArtifact => {
                "Download a specific artifact from a build (returns base64-encoded content)"
            }
            Self::StopBuild => "Stop/abort a running build",
            Self::DeleteBuild => "Delete a specific build",
            Self::GetTestResults => "Get test results for a build (pass/fail counts, test suites)",
            Self::GetBuildChanges => "Get Git commits/changes for a build",
            Self::GetPipelineStages => "Get pipeline stages and their status for a build",
            Self::ReplayBuild => "Replay/rerun a pipeline build with the same parameters",
            Self::GetQueue => "Get the current build queue showing pending builds",
            Self::CancelQueue => "Cancel a queued build by queue ID",
            Self::EnableJob => "Enable a disabled job",
            Self::DisableJob => "Disable a job to prevent it from running",
            Self::DeleteJob => "Permanently delete a job (WARNING: cannot be undone)",
            Self::GetJobConfig => "Get job configuration XML",
            Self::ListNodes => "List all Jenkins nodes/agents and their status",
            Self::GetSystemInfo => "Get Jenkins system information",
            Self::GetVersion => "Get Jenkins version",
            Self::GetPlugins => "List all installed Jenkins plugins",
        }
    }

    pub fn input_schema(self) -> Value {
        match self {
            Self::ListJobs
            | Self::GetQueue
            | Self::ListNodes
            | Self::GetSystemInfo
            | Self::GetVersion
            | Self::GetPlugins => no_input(),
            Self::SearchJobs => object_schema(
                vec![(
                    "query",
                    json!({ "type": "string", "description": "Search query to filter jobs by name" }),
                )],
                &["query"],
            ),
            Self::GetJobStatus
            | Self::EnableJob
            | Self::DisableJob
            | Self::DeleteJob
            | Self::GetJobConfig => job_only(),
            Self::GetBuildStatus => job_and_build("Build number to retrieve"),
            Self::GetRecentBuilds => object_schema(
                vec![
                    job_name(),
                    (
                        "limit",
                        json!({
                            "type": "number",
                            "description": "Maximum number of builds to return (default: 5)",
                            "default": 5
                        }),
                    ),
                ],
                &["jobName"],
            ),
            Self::GetConsoleLog => object_schema(
                vec![
                    job_name(),
                    build_number("Build number (optional, defaults to last build)"),
                    (
                        "maxSnippetLength",
                        json!({
                            "type": "number",
                            "description": "Maximum length of the returned log snippet (default: 200)",
                            "default": 200
                        }),
                    ),
                ],
                &["jobName"],
            ),
            Self::TriggerBuild => object_schema(
                vec![
                    (
                        "jobName",
                        json!({ "type": "string", "description": "Name of the Jenkins job to trigger" }),
                    ),
                    (
                        "params",
                        json!({
                            "type": "object",
                            "description": "Optional build parameters as key-value pairs",
                            "additionalProperties": true
                        }),
                    ),
                ],
                &["jobName"],
            ),
            Self::GetArtifact => object_schema(
                vec![
                    job_name(),
                    build_number("Build number"),
                    (
                        "relativePath",
                        json!({
                            "type": "string",
                            "description": "Relative path to the artifact (e.g., \"dist/app.jar\")"
                        }),
                    ),
                ],
                &["jobName", "buildNumber", "relativePath"],
            ),
            Self::StopBuild => job_and_build("Build number to stop"),
            Self::DeleteBuild => job_and_build("Build number to delete"),
            Self::ReplayBuild => job_and_build("Build number to replay"),
            Self::ListArtifacts
            | Self::GetTestResults
            | Self::GetBuildChanges
            | Self::GetPipelineStages => job_and_build("Build number"),
            Self::CancelQueue => object_schema(
                vec![(
                    "queueId",
                    json!({ "type": "number", "description": "Queue item ID to cancel" }),
                )],
                &["queueId"],
            ),
        }
    }

    pub fn definition(self) -> ToolDefinition {
        ToolDefinition {
            name: self.name(),
            description: self.description(),
            input_schema: self.input_schema(),
        }
    }
}

/// Definitions of every tool, in listing order.
pub fn tool_definitions() -> Vec<ToolDefinition> {
    Tool::ALL.iter().map(|tool| tool.definition()).collect()
}
