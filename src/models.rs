use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Latency reported when no response was obtained.
pub const UNMEASURED_LATENCY: i64 = -1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Outcome {
    Ok,
    Warning,
    Error,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Ok => "OK",
            Outcome::Warning => "WARNING",
            Outcome::Error => "ERROR",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResult {
    pub url: String,
    #[serde(rename = "status")]
    pub outcome: Outcome,
    pub latency_ms: i64,
}

impl CheckResult {
    pub fn unreachable(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            outcome: Outcome::Error,
            latency_ms: UNMEASURED_LATENCY,
        }
    }

    pub fn is_measured(&self) -> bool {
        self.latency_ms != UNMEASURED_LATENCY
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lifecycle {
    Starting,
    Running,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CycleState {
    #[serde(rename = "status")]
    pub lifecycle: Lifecycle,
    #[serde(rename = "checks")]
    pub results: Vec<CheckResult>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Default for CycleState {
    fn default() -> Self {
        Self {
            lifecycle: Lifecycle::Starting,
            results: Vec::new(),
            updated_at: None,
        }
    }
}
