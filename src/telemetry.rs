use serde::Serialize;
use serde_json::json;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::sync::{Arc, Mutex};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

/// One generateContent exchange, as observed by the client.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisEvent {
    pub model: String,
    pub modality: String,
    #[serde(with = "time::serde::rfc3339")]
    pub started_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub finished_at: OffsetDateTime,
    pub input_tokens: Option<u32>,
    pub output_tokens: Option<u32>,
    pub total_tokens: Option<u32>,
    pub retries: usize,
}

impl AnalysisEvent {
    pub fn duration_seconds(&self) -> f64 {
        (self.finished_at - self.started_at)
            .as_seconds_f64()
            .max(0.0)
    }
}

#[derive(Debug, Default, Serialize)]
pub struct RunSummary {
    pub total_requests: usize,
    pub total_retries: usize,
    pub total_input_tokens: u64,
    pub total_output_tokens: u64,
    pub total_tokens: u64,
    pub total_duration_seconds: f64,
}

/// Shared recorder for events and side-channel notes. Diagnostics only,
/// never part of the functional contract.
#[derive(Clone, Default)]
pub struct RunMonitor {
    inner: Arc<Mutex<RunState>>,
}

#[derive(Default)]
struct RunState {
    events: Vec<AnalysisEvent>,
    notes: Vec<Note>,
}

#[derive(Debug, Clone, Serialize)]
struct Note {
    name: String,
    payload: serde_json::Value,
    #[serde(with = "time::serde::rfc3339")]
    timestamp: OffsetDateTime,
}

impl RunMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, event: AnalysisEvent) {
        self.inner.lock().unwrap().events.push(event);
    }

    pub fn note_event(&self, name: &str, payload: serde_json::Value) {
        let mut state = self.inner.lock().unwrap();
        state.notes.push(Note {
            name: name.to_string(),
            payload,
            timestamp: OffsetDateTime::now_utc(),
        });
    }

    pub fn events(&self) -> Vec<AnalysisEvent> {
        self.inner.lock().unwrap().events.clone()
    }

    pub fn summarize(&self) -> RunSummary {
        let state = self.inner.lock().unwrap();
        let mut summary = RunSummary::default();
        summary.total_requests = state.events.len();
        for event in &state.events {
            summary.total_retries += event.retries;
            summary.total_input_tokens += u64::from(event.input_tokens.unwrap_or(0));
            summary.total_output_tokens += u64::from(event.output_tokens.unwrap_or(0));
            summary.total_tokens += u64::from(event.total_tokens.unwrap_or(0));
            summary.total_duration_seconds += event.duration_seconds();
        }
        summary
    }

    pub fn flush_summary(&self, to: &Path) -> anyhow::Result<()> {
        if let Some(parent) = to.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let summary = self.summarize();
        let state = self.inner.lock().unwrap();
        let payload = json!({
            "written_utc": OffsetDateTime::now_utc().format(&Rfc3339)?,
            "totals": summary,
            "events": state.events,
            "notes": state.notes,
        });
        let mut file = File::create(to)?;
        file.write_all(serde_json::to_string_pretty(&payload)?.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(retries: usize, total_tokens: Option<u32>) -> AnalysisEvent {
        let now = OffsetDateTime::now_utc();
        AnalysisEvent {
            model: "gemini-flash-latest".into(),
            modality: "text".into(),
            started_at: now,
            finished_at: now,
            input_tokens: Some(10),
            output_tokens: Some(5),
            total_tokens,
            retries,
        }
    }

    #[test]
    fn summarize_accumulates_retries_and_tokens() {
        let monitor = RunMonitor::new();
        monitor.record(event(2, Some(15)));
        monitor.record(event(0, None));
        let summary = monitor.summarize();
        assert_eq!(summary.total_requests, 2);
        assert_eq!(summary.total_retries, 2);
        assert_eq!(summary.total_input_tokens, 20);
        assert_eq!(summary.total_output_tokens, 10);
        assert_eq!(summary.total_tokens, 15);
    }

    #[test]
    fn flush_summary_writes_events_and_notes() {
        let dir = tempfile::tempdir().unwrap();
        let monitor = RunMonitor::new();
        monitor.record(event(1, Some(15)));
        monitor.note_event("retry.generateContent", json!({ "attempt": 1 }));
        let path = dir.path().join("run-summary.json");
        monitor.flush_summary(&path).unwrap();

        let payload: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(payload["totals"]["total_requests"], 1);
        assert_eq!(payload["events"].as_array().unwrap().len(), 1);
        assert_eq!(payload["notes"][0]["name"], "retry.generateContent");
    }
}
