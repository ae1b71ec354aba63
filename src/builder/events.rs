//! Build event types for JSON output.
//!
//! This module defines the JSON schema for machine-readable build output.
//! These events are emitted when using `--message-format=json`.
//!
//! # Event Types
//!
//! - `rule-started`: A rule's action began running
//! - `rule-fresh`: A rule was up to date and skipped
//! - `rule-finished`: A rule's target was written
//! - `rule-failed`: A rule's action failed or was skipped after a failure
//! - `build-finished`: Execution completed (success or failure)

use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;

/// A build event emitted during execution.
///
/// Each event is serialized as a single JSON object per line.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "reason")]
pub enum BuildEvent {
    /// A rule's action started.
    #[serde(rename = "rule-started")]
    RuleStarted {
        /// Build-relative target name
        target: String,
    },

    /// A rule was fresh and not re-run.
    #[serde(rename = "rule-fresh")]
    RuleFresh { target: String },

    /// A rule's target was written.
    #[serde(rename = "rule-finished")]
    RuleFinished {
        target: String,
        /// Absolute target path
        path: PathBuf,
        /// Action duration in milliseconds
        duration_ms: u64,
    },

    /// A rule failed, or was skipped because a prerequisite failed.
    #[serde(rename = "rule-failed")]
    RuleFailed { target: String, message: String },

    /// Execution completed (success or failure).
    #[serde(rename = "build-finished")]
    BuildFinished {
        /// Whether every rule succeeded
        success: bool,
        /// Total duration in milliseconds
        duration_ms: u64,
        /// Number of rules whose action ran
        rules_run: u64,
        /// Number of rules skipped as fresh
        rules_fresh: u64,
    },
}

impl BuildEvent {
    pub fn started(target: impl Into<String>) -> Self {
        BuildEvent::RuleStarted {
            target: target.into(),
        }
    }

    pub fn fresh(target: impl Into<String>) -> Self {
        BuildEvent::RuleFresh {
            target: target.into(),
        }
    }

    pub fn finished_rule(target: impl Into<String>, path: PathBuf, duration_ms: u64) -> Self {
        BuildEvent::RuleFinished {
            target: target.into(),
            path,
            duration_ms,
        }
    }

    pub fn failed(target: impl Into<String>, message: impl Into<String>) -> Self {
        BuildEvent::RuleFailed {
            target: target.into(),
            message: message.into(),
        }
    }

    /// Create a build finished event.
    pub fn finished(success: bool, duration_ms: u64, rules_run: u64, rules_fresh: u64) -> Self {
        BuildEvent::BuildFinished {
            success,
            duration_ms,
            rules_run,
            rules_fresh,
        }
    }

    /// Serialize this event to a JSON string.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// Receives build events. Called from worker threads.
pub type EventSink = Arc<dyn Fn(&BuildEvent) + Send + Sync>;

/// Sink that prints each event as a JSON line on stdout.
pub fn json_lines_sink() -> EventSink {
    Arc::new(|event: &BuildEvent| println!("{}", event.to_json()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_finished_serialization() {
        let event = BuildEvent::finished_rule(
            "GoPackage/util/deps.json",
            PathBuf::from("/work/GoPackage/util/deps.json"),
            12,
        );
        let json = event.to_json();
        assert!(json.contains("\"reason\":\"rule-finished\""));
        assert!(json.contains("\"target\":\"GoPackage/util/deps.json\""));
        assert!(json.contains("\"duration_ms\":12"));
    }

    #[test]
    fn test_finished_serialization() {
        let event = BuildEvent::finished(true, 2340, 3, 1);
        let json = event.to_json();
        assert!(json.contains("\"reason\":\"build-finished\""));
        assert!(json.contains("\"success\":true"));
        assert!(json.contains("\"rules_fresh\":1"));
    }

    #[test]
    fn test_failed_serialization() {
        let json = BuildEvent::failed("a.json", "boom").to_json();
        assert_eq!(
            json,
            r#"{"reason":"rule-failed","target":"a.json","message":"boom"}"#
        );
    }
}
