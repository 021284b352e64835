//! Jenkins REST operations as typed tool calls.
//!
//! [`JenkinsClient`] wraps one Jenkins capability per method: list and search
//! jobs, inspect builds, fetch console logs and artifacts, trigger, stop,
//! replay and delete builds, manage the queue and inspect nodes, plugins and
//! system info. [`tools::call_tool`] exposes those methods under stable tool
//! names with JSON arguments and results.
//!
//! ```no_run
//! use jenkins_tools::{tools, Config, JenkinsClient};
//! use serde_json::json;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let client = JenkinsClient::from_config(&Config::from_env()?)?;
//! let result = tools::call_tool(&client, "jenkins_get_job_status", json!({ "jobName": "api" })).await?;
//! println!("{}", tools::render_result(&result, true)?);
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod config;
pub mod error;
pub mod providers;
pub mod tools;

pub use auth::{Auth, Credentials, Token};
pub use config::{Config, HttpConfig, JenkinsConfig};
pub use error::{ErrorKind, ErrorResponse, JenkinsError, Result};
pub use providers::JenkinsClient;
