//! Diagnostic preview records for ForEach body steps.
//!
//! A preview sequence is rebuilt on every `process` call and reflects
//! only the most recently processed element — bounded memory, no
//! history. External observers read it between runs.

use serde::Serialize;
use serde_json::Value;

/// One slot per body-spec index; `None` until the step has run once
/// during the current call.
pub type PreviewSeq = Vec<Option<StepPreview>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Running,
    Done,
}

/// Snapshot of one body step as last observed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepPreview {
    /// Step name (the resolved module's name).
    pub step: String,
    pub last_input: Option<Value>,
    pub last_output: Option<Value>,
    pub status: StepStatus,
    /// Present when the step is itself a ForEach: its own body preview.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nested: Option<PreviewSeq>,
}

impl StepPreview {
    /// Entry recorded just before a step runs.
    pub fn running(step: impl Into<String>, input: Value) -> Self {
        Self {
            step: step.into(),
            last_input: Some(input),
            last_output: None,
            status: StepStatus::Running,
            nested: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_running_entry_shape() {
        let entry = StepPreview::running("Multiply", json!(3));
        assert_eq!(entry.status, StepStatus::Running);
        assert_eq!(entry.last_input, Some(json!(3)));
        assert!(entry.last_output.is_none());
    }

    #[test]
    fn test_serializes_without_empty_nested() {
        let entry = StepPreview::running("Multiply", json!(1));
        let v = serde_json::to_value(&entry).unwrap();
        assert_eq!(v["status"], json!("running"));
        assert!(v.get("nested").is_none());
    }
}
