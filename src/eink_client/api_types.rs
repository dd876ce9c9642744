use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Number;

/// Body of `GET /api/eink/relevant`.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct PollResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub data: Option<WorkspaceData>,
    #[serde(default)]
    pub config: Option<RemoteConfig>,
}

/// `workspace` and `tasks` are required whenever `data` is present.
#[derive(Debug, Deserialize, Clone)]
pub struct WorkspaceData {
    pub workspace: String,
    pub tasks: Vec<Task>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Task {
    pub priority: Priority,
    pub title: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum Priority {
    Text(String),
    Number(Number),
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Priority::Text(text) => f.write_str(text),
            Priority::Number(number) => write!(f, "{number}"),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct RemoteConfig {
    #[serde(default)]
    pub refresh_interval: Option<u64>,
}

/// Queries for the poll endpoint.
#[derive(Serialize)]
pub(super) struct PollQuery<'a> {
    pub token: &'a str,
    pub bat: u8,
    pub res: &'a str,
}

/// Shape of the backend's error bodies, e.g. `{"error":"Invalid device token"}`.
#[derive(Deserialize)]
pub(super) struct ErrorBody {
    pub error: String,
}
