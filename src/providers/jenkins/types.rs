use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

// Raw Jenkins payloads. Every field is optional: Jenkins omits or nulls
// fields depending on job type, plugins and the `tree` filter in use.

#[derive(Debug, Default, Deserialize)]
pub(super) struct RawJobList {
    pub jobs: Option<Vec<RawJob>>,
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct RawJob {
    pub name: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct RawJobBuilds {
    pub builds: Option<Vec<RawBuild>>,
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct RawBuild {
    pub number: Option<u64>,
    pub id: Option<String>,
    pub building: Option<bool>,
    pub result: Option<String>,
    pub duration: Option<i64>,
    pub timestamp: Option<i64>,
    pub url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct RawArtifacts {
    pub artifacts: Option<Vec<RawArtifact>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct RawArtifact {
    pub file_name: Option<String>,
    pub relative_path: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct RawTestReport {
    pub total_count: Option<u64>,
    pub pass_count: Option<u64>,
    pub fail_count: Option<u64>,
    pub skip_count: Option<u64>,
    pub duration: Option<f64>,
    pub suites: Option<Vec<Value>>,
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct RawQueue {
    pub items: Option<Vec<RawQueueItem>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct RawQueueItem {
    pub id: Option<u64>,
    pub blocked: Option<bool>,
    pub buildable: Option<bool>,
    pub stuck: Option<bool>,
    pub why: Option<String>,
    pub task: Option<RawJob>,
    pub in_queue_since: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct RawComputers {
    pub computer: Option<Vec<RawComputer>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct RawComputer {
    pub display_name: Option<String>,
    pub offline: Option<bool>,
    pub idle: Option<bool>,
    pub num_executors: Option<u32>,
    pub monitor_data: Option<serde_json::Map<String, Value>>,
    pub temporarily_offline: Option<bool>,
    pub offline_cause_reason: Option<String>,
}

const SWAP_SPACE_MONITOR: &str = "hudson.node_monitors.SwapSpaceMonitor";

impl RawComputer {
    /// Reports zero busy executors whenever the swap monitor publishes a
    /// non-zero `availablePhysicalMemory`, and every executor as busy otherwise.
    ///
    /// This mirrors what deployed consumers already see; the swap monitor
    /// says nothing about executor usage.
    fn busy_executors(&self) -> u32 {
        let has_physical_memory = self
            .monitor_data
            .as_ref()
            .and_then(|data| data.get(SWAP_SPACE_MONITOR))
            .and_then(|monitor| monitor.get("availablePhysicalMemory"))
            .is_some_and(is_truthy);

        if has_physical_memory {
            0
        } else {
            self.num_executors.unwrap_or(0)
        }
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct RawSystemInfo {
    pub node_description: Option<String>,
    pub node_name: Option<String>,
    pub num_executors: Option<u32>,
    pub mode: Option<String>,
    pub quieting_down: Option<bool>,
    pub use_crumbs: Option<bool>,
    pub use_security: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct RawPlugins {
    pub plugins: Option<Vec<RawPlugin>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct RawPlugin {
    pub short_name: Option<String>,
    pub long_name: Option<String>,
    pub version: Option<String>,
    pub enabled: Option<bool>,
    pub active: Option<bool>,
    pub has_update: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct RawBuildChangeSet {
    pub change_set: Option<RawChangeSet>,
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct RawChangeSet {
    pub items: Option<Vec<RawChange>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct RawChange {
    pub author: Option<RawAuthor>,
    pub msg: Option<String>,
    pub commit_id: Option<String>,
    pub timestamp: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct RawAuthor {
    pub full_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct RawWorkflowRun {
    pub status: Option<String>,
    pub stages: Option<Vec<RawStage>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct RawStage {
    pub id: Option<String>,
    pub name: Option<String>,
    pub status: Option<String>,
    pub start_time_millis: Option<i64>,
    pub duration_millis: Option<i64>,
    pub pause_duration_millis: Option<i64>,
}

/// CSRF token returned by `/crumbIssuer/api/json`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Crumb {
    /// Header name to send the crumb under (server-supplied)
    #[serde(rename = "crumbRequestField")]
    pub field_name: String,
    #[serde(rename = "crumb")]
    pub value: String,
}

/// Formats epoch milliseconds like `2023-10-31T16:00:00.000Z`.
///
/// Zero is treated as "no timestamp", as Jenkins uses it for unset times.
pub(crate) fn iso_millis(millis: i64) -> Option<String> {
    if millis == 0 {
        return None;
    }
    DateTime::<Utc>::from_timestamp_millis(millis)
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true))
}

fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Build result reported while a build is still executing.
pub const RUNNING: &str = "RUNNING";

/// Reference to a job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRef {
    pub name: String,
    pub url: String,
}

impl From<RawJob> for JobRef {
    fn from(raw: RawJob) -> Self {
        Self {
            name: raw.name.unwrap_or_default(),
            url: raw.url.unwrap_or_default(),
        }
    }
}

/// Stable projection of a Jenkins build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedBuild {
    /// Build number as a string
    pub id: String,
    /// SUCCESS, FAILURE, ABORTED, RUNNING or whatever Jenkins reported
    pub result: String,
    pub duration_ms: u64,
    /// ISO-8601 start time
    pub timestamp: String,
    pub url: String,
}

impl From<RawBuild> for NormalizedBuild {
    fn from(raw: RawBuild) -> Self {
        let result = if raw.building == Some(true) {
            RUNNING.to_string()
        } else {
            raw.result
                .filter(|r| !r.is_empty())
                .unwrap_or_else(|| RUNNING.to_string())
        };

        let id = match (raw.number, raw.id) {
            (Some(number), _) => number.to_string(),
            (None, Some(id)) => id,
            (None, None) => String::new(),
        };

        Self {
            id,
            result,
            duration_ms: raw.duration.map_or(0, |d| d.max(0).unsigned_abs()),
            timestamp: raw.timestamp.and_then(iso_millis).unwrap_or_else(now_iso),
            url: raw.url.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsoleLog {
    pub job_name: String,
    pub build_number: u64,
    /// Trimmed, carriage-return free prefix of the log
    pub log_snippet: String,
    /// Log exactly as served by Jenkins
    pub full_log: String,
}

/// Result of queueing a build. `queue_url` comes from the `Location` header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueuedBuild {
    pub job_name: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub build_number: Option<u64>,
    pub queue_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    pub file_name: String,
    pub relative_path: String,
    /// Download URL, built from the job, build and relative path
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub size: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactContent {
    pub file_name: String,
    pub relative_path: String,
    pub size: u64,
    /// Standard base64 of the exact artifact bytes
    pub base64: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildStopped {
    pub job_name: String,
    pub build_number: u64,
    pub stopped: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildDeleted {
    pub job_name: String,
    pub build_number: u64,
    pub deleted: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobEnabled {
    pub job_name: String,
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobDisabled {
    pub job_name: String,
    pub disabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobDeleted {
    pub job_name: String,
    pub deleted: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueCancelled {
    pub queue_id: u64,
    pub cancelled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResults {
    pub job_name: String,
    pub build_number: u64,
    pub total_tests: u64,
    pub passed_tests: u64,
    pub failed_tests: u64,
    pub skipped_tests: u64,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub duration: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub suites: Option<Vec<Value>>,
    /// Set instead of `duration`/`suites` when the build has no test report
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub message: Option<String>,
}

impl TestResults {
    pub(super) fn from_report(job_name: &str, build_number: u64, raw: RawTestReport) -> Self {
        Self {
            job_name: job_name.to_string(),
            build_number,
            total_tests: raw.total_count.unwrap_or(0),
            passed_tests: raw.pass_count.unwrap_or(0),
            failed_tests: raw.fail_count.unwrap_or(0),
            skipped_tests: raw.skip_count.unwrap_or(0),
            duration: Some(raw.duration.unwrap_or(0.0)),
            suites: Some(raw.suites.unwrap_or_default()),
            message: None,
        }
    }

    pub(super) fn missing(job_name: &str, build_number: u64) -> Self {
        Self {
            job_name: job_name.to_string(),
            build_number,
            total_tests: 0,
            passed_tests: 0,
            failed_tests: 0,
            skipped_tests: 0,
            duration: None,
            suites: None,
            message: Some("No test results found".to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueItem {
    pub id: u64,
    pub blocked: bool,
    pub buildable: bool,
    pub stuck: bool,
    pub why: String,
    pub task: JobRef,
    pub in_queue_since: Option<String>,
}

impl From<RawQueueItem> for QueueItem {
    fn from(raw: RawQueueItem) -> Self {
        Self {
            id: raw.id.unwrap_or_default(),
            blocked: raw.blocked.unwrap_or(false),
            buildable: raw.buildable.unwrap_or(false),
            stuck: raw.stuck.unwrap_or(false),
            why: raw.why.unwrap_or_default(),
            task: raw.task.map(JobRef::from).unwrap_or_else(|| JobRef {
                name: String::new(),
                url: String::new(),
            }),
            in_queue_since: raw.in_queue_since.and_then(iso_millis),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobConfig {
    pub job_name: String,
    /// Raw `config.xml`
    pub config: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub name: String,
    pub offline: bool,
    pub idle: bool,
    pub num_executors: u32,
    pub busy_executors: u32,
    pub temporarily_offline: bool,
    pub offline_cause_reason: String,
}

impl From<RawComputer> for Node {
    fn from(raw: RawComputer) -> Self {
        let busy_executors = raw.busy_executors();
        Self {
            name: raw.display_name.unwrap_or_default(),
            offline: raw.offline.unwrap_or(false),
            idle: raw.idle.unwrap_or(false),
            num_executors: raw.num_executors.unwrap_or(0),
            busy_executors,
            temporarily_offline: raw.temporarily_offline.unwrap_or(false),
            offline_cause_reason: raw.offline_cause_reason.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemInfo {
    pub node_description: String,
    pub node_name: String,
    pub num_executors: u32,
    pub mode: String,
    pub quieting_down: bool,
    pub use_crumbs: bool,
    pub use_security: bool,
}

impl From<RawSystemInfo> for SystemInfo {
    fn from(raw: RawSystemInfo) -> Self {
        Self {
            node_description: raw.node_description.unwrap_or_default(),
            node_name: raw.node_name.unwrap_or_default(),
            num_executors: raw.num_executors.unwrap_or(0),
            mode: raw.mode.unwrap_or_default(),
            quieting_down: raw.quieting_down.unwrap_or(false),
            use_crumbs: raw.use_crumbs.unwrap_or(false),
            use_security: raw.use_security.unwrap_or(false),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Version {
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plugin {
    pub short_name: String,
    pub long_name: String,
    pub version: String,
    pub enabled: bool,
    pub active: bool,
    pub has_update: bool,
}

impl From<RawPlugin> for Plugin {
    fn from(raw: RawPlugin) -> Self {
        Self {
            short_name: raw.short_name.unwrap_or_default(),
            long_name: raw.long_name.unwrap_or_default(),
            version: raw.version.unwrap_or_default(),
            enabled: raw.enabled.unwrap_or(false),
            active: raw.active.unwrap_or(false),
            has_update: raw.has_update.unwrap_or(false),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildChanges {
    pub job_name: String,
    pub build_number: u64,
    pub changes: Vec<Change>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Change {
    pub author: String,
    pub message: String,
    pub commit_id: String,
    pub timestamp: Option<String>,
}

impl From<RawChange> for Change {
    fn from(raw: RawChange) -> Self {
        Self {
            author: raw
                .author
                .and_then(|a| a.full_name)
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| "unknown".to_string()),
            message: raw.msg.unwrap_or_default(),
            commit_id: raw.commit_id.unwrap_or_default(),
            timestamp: raw.timestamp.and_then(iso_millis),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineStages {
    pub job_name: String,
    pub build_number: u64,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub stages: Option<Vec<Stage>>,
    /// Set when the build is not a pipeline
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stage {
    pub id: String,
    pub name: String,
    pub status: String,
    pub start_time_millis: i64,
    pub duration_millis: i64,
    pub pause_duration_millis: i64,
}

impl From<RawStage> for Stage {
    fn from(raw: RawStage) -> Self {
        Self {
            id: raw.id.unwrap_or_default(),
            name: raw.name.unwrap_or_default(),
            status: raw.status.unwrap_or_default(),
            start_time_millis: raw.start_time_millis.unwrap_or(0),
            duration_millis: raw.duration_millis.unwrap_or(0),
            pause_duration_millis: raw.pause_duration_millis.unwrap_or(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw_build(value: Value) -> RawBuild {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_building_overrides_stale_result() {
        let build = NormalizedBuild::from(raw_build(json!({
            "number": 42,
            "building": true,
            "result": "FAILURE",
            "duration": 0,
            "timestamp": 1698768000000_i64,
            "url": "https://ci.example.com/job/api/42/"
        })));

        assert_eq!(build.result, "RUNNING");
        assert_eq!(build.id, "42");
    }

    #[test]
    fn test_finished_result_passes_through() {
        for result in ["SUCCESS", "FAILURE", "ABORTED", "UNSTABLE", "NOT_BUILT"] {
            let build = NormalizedBuild::from(raw_build(json!({
                "number": 1,
                "building": false,
                "result": result,
            })));
            assert_eq!(build.result, result);
        }
    }

    #[test]
    fn test_missing_result_defaults_to_running() {
        let build = NormalizedBuild::from(raw_build(json!({
            "number": 7,
            "building": false,
            "result": null
        })));
        assert_eq!(build.result, RUNNING);
    }

    #[test]
    fn test_build_timestamp_and_duration() {
        let build = NormalizedBuild::from(raw_build(json!({
            "number": 100,
            "result": "SUCCESS",
            "duration": 5000,
            "timestamp": 1698768000000_i64,
            "url": "https://ci.example.com/job/api/100/"
        })));

        assert_eq!(build.duration_ms, 5000);
        assert_eq!(build.timestamp, "2023-10-31T16:00:00.000Z");
        assert_eq!(build.url, "https://ci.example.com/job/api/100/");
    }

    #[test]
    fn test_build_without_timestamp_gets_current_time() {
        let before = Utc::now();
        let build = NormalizedBuild::from(raw_build(json!({ "id": "abc" })));

        assert_eq!(build.id, "abc");
        assert_eq!(build.duration_ms, 0);
        let parsed = DateTime::parse_from_rfc3339(&build.timestamp).unwrap();
        assert!(parsed.timestamp() >= before.timestamp());
    }

    #[test]
    fn test_negative_duration_clamps_to_zero() {
        let build = NormalizedBuild::from(raw_build(json!({ "number": 1, "duration": -5 })));
        assert_eq!(build.duration_ms, 0);
    }

    #[test]
    fn test_normalized_build_serializes_camel_case() {
        let build = NormalizedBuild::from(raw_build(json!({
            "number": 3,
            "result": "SUCCESS",
            "duration": 10,
            "timestamp": 1698768000000_i64
        })));
        let value = serde_json::to_value(&build).unwrap();

        assert_eq!(value["durationMs"], 10);
        assert!(value.get("duration_ms").is_none());
    }

    #[test]
    fn test_busy_executors_follows_swap_monitor() {
        let with_memory: RawComputer = serde_json::from_value(json!({
            "displayName": "agent-1",
            "numExecutors": 4,
            "monitorData": {
                "hudson.node_monitors.SwapSpaceMonitor": { "availablePhysicalMemory": 1024 }
            }
        }))
        .unwrap();
        let without_monitor: RawComputer = serde_json::from_value(json!({
            "displayName": "agent-2",
            "numExecutors": 4,
            "monitorData": { "hudson.node_monitors.SwapSpaceMonitor": null }
        }))
        .unwrap();

        assert_eq!(Node::from(with_memory).busy_executors, 0);
        assert_eq!(Node::from(without_monitor).busy_executors, 4);
    }

    #[test]
    fn test_queue_item_defaults() {
        let item: RawQueueItem = serde_json::from_value(json!({
            "id": 12,
            "why": null,
            "inQueueSince": 1698768000000_i64
        }))
        .unwrap();
        let item = QueueItem::from(item);

        assert_eq!(item.id, 12);
        assert!(!item.blocked);
        assert_eq!(item.why, "");
        assert_eq!(item.task.name, "");
        assert_eq!(item.in_queue_since.as_deref(), Some("2023-10-31T16:00:00.000Z"));
    }

    #[test]
    fn test_change_author_defaults_to_unknown() {
        let change: RawChange = serde_json::from_value(json!({
            "msg": "fix build",
            "commitId": "abc123"
        }))
        .unwrap();
        let change = Change::from(change);

        assert_eq!(change.author, "unknown");
        assert_eq!(change.timestamp, None);
    }

    #[test]
    fn test_missing_test_results_shape() {
        let results = TestResults::missing("api", 5);
        let value = serde_json::to_value(&results).unwrap();

        assert_eq!(value["totalTests"], 0);
        assert_eq!(value["skippedTests"], 0);
        assert_eq!(value["message"], "No test results found");
        assert!(value.get("suites").is_none());
    }

    #[test]
    fn test_iso_millis_zero_is_none() {
        assert_eq!(iso_millis(0), None);
        assert_eq!(
            iso_millis(1698764400000).as_deref(),
            Some("2023-10-31T15:00:00.000Z")
        );
    }
}
