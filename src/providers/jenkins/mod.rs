mod client;
mod links;
mod types;


pub use client::{log_snippet, JenkinsClient, DEFAULT_RECENT_BUILDS, DEFAULT_SNIPPET_LENGTH};
pub use types::{
    Artifact, ArtifactContent, BuildChanges, BuildDeleted, BuildStopped, Change, ConsoleLog,
    Crumb, JobConfig, JobDeleted, JobDisabled, JobEnabled, JobRef, Node, NormalizedBuild,
    PipelineStages, Plugin, QueueCancelled, QueueItem, QueuedBuild, Stage, SystemInfo,
    TestResults, Version, RUNNING,
};
