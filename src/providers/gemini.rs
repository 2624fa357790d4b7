//! Gemini generateContent client: request assembly, the bounded retry
//! loop, and the analysis pipeline built on top of them.

use std::thread;
use std::time::Duration;

use reqwest::blocking::Client;
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::constants::{
    DEFAULT_MAX_RETRIES, DEFAULT_RETRY_DELAY_SECS, DEFAULT_TEMPERATURE, GENERATE_ENDPOINT_BASE,
    HTTP_TIMEOUT_SECS,
};
use crate::core::{ContentPart, GenerateTransport, MeetingMinutes, MeetingSource, ParseMode};
use crate::error::{AnalysisError, GenerationError};
use crate::media::{encode_content, validate_mime};
use crate::prompts;
use crate::response;
use crate::telemetry::{AnalysisEvent, RunMonitor};
use time::OffsetDateTime;

/// Retry and sampling policy for one client instance.
#[derive(Debug, Clone)]
pub struct GenerationOptions {
    pub max_retries: usize,
    pub retry_delay: Duration,
    pub temperature: f64,
    pub parse_mode: ParseMode,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            retry_delay: Duration::from_secs(DEFAULT_RETRY_DELAY_SECS),
            temperature: DEFAULT_TEMPERATURE,
            parse_mode: ParseMode::Strict,
        }
    }
}

/// Assembles the generateContent body: the fixed instruction first, then
/// the caller's content parts, plus the structured-output config. Pure.
pub fn build_request(instruction: &str, parts: &[ContentPart], temperature: f64) -> Value {
    let mut request_parts = vec![json!({ "text": instruction })];
    for part in parts {
        request_parts.push(match part {
            ContentPart::Text { text } => json!({ "text": text }),
            ContentPart::Media { mime_type, data } => json!({
                "inline_data": {
                    "mime_type": mime_type,
                    "data": data,
                }
            }),
        });
    }

    json!({
        "contents": [
            {
                "role": "user",
                "parts": request_parts,
            }
        ],
        "generationConfig": {
            "temperature": temperature,
            "responseMimeType": "application/json",
            "responseSchema": prompts::response_schema(),
        }
    })
}

/// Production transport: one POST to the generateContent endpoint.
pub struct HttpTransport {
    api_key: String,
    model: String,
    http: Client,
}

impl HttpTransport {
    pub fn new(api_key: String, model: String) -> Self {
        let http = Client::builder()
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build()
            .expect("failed to build reqwest client");
        Self {
            api_key,
            model,
            http,
        }
    }
}

impl GenerateTransport for HttpTransport {
    fn generate(&self, request: &Value) -> Result<Value, GenerationError> {
        let url = format!("{}/{}:generateContent", GENERATE_ENDPOINT_BASE, self.model);
        match self
            .http
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(request)
            .send()
        {
            Ok(resp) => {
                let status = resp.status();
                if status.is_success() {
                    resp.json().map_err(|err| {
                        GenerationError::network(format!(
                            "decoding generateContent response: {err}"
                        ))
                    })
                } else {
                    let text = resp.text().unwrap_or_default();
                    Err(GenerationError::status(
                        status.as_u16(),
                        format!("generateContent failed with status {status}: {text}"),
                    ))
                }
            }
            Err(err) if err.is_timeout() || err.is_connect() => Err(GenerationError::network(
                format!("Network error calling generateContent: {err}"),
            )),
            Err(err) => Err(GenerationError::network(format!(
                "calling generateContent: {err}"
            ))),
        }
    }
}

pub struct GeminiClient {
    transport: Box<dyn GenerateTransport>,
    monitor: RunMonitor,
    options: GenerationOptions,
    sleep: Box<dyn Fn(Duration) + Send + Sync>,
}

impl GeminiClient {
    pub fn new(
        transport: Box<dyn GenerateTransport>,
        monitor: RunMonitor,
        options: GenerationOptions,
    ) -> Self {
        Self {
            transport,
            monitor,
            options,
            sleep: Box::new(thread::sleep),
        }
    }

    /// Replaces the inter-attempt pause. Lets tests observe delays without
    /// a real clock.
    pub fn with_sleep(mut self, sleep: impl Fn(Duration) + Send + Sync + 'static) -> Self {
        self.sleep = Box::new(sleep);
        self
    }

    /// Full pipeline for one recording: validate, encode, build, invoke
    /// with retry, normalize. Strictly sequential; nothing is shared
    /// across invocations.
    pub fn analyze_meeting(
        &self,
        source: &MeetingSource,
        bytes: &[u8],
        model: &str,
    ) -> Result<MeetingMinutes, AnalysisError> {
        let category = validate_mime(&source.mime)?;
        info!(
            file = %source.name,
            mime = %source.mime,
            modality = category.as_str(),
            "analyzing meeting recording"
        );

        let part = encode_content(&source.mime, bytes);
        let request = build_request(
            prompts::SYSTEM_INSTRUCTION,
            std::slice::from_ref(&part),
            self.options.temperature,
        );

        let payload = self.generate(&request, model, category.as_str())?;
        let minutes = response::normalize(&payload, self.options.parse_mode)?;
        Ok(minutes)
    }

    /// Bounded attempt loop. Each attempt is stateless; a retryable
    /// failure waits the fixed delay, anything else surfaces unchanged.
    pub fn generate(
        &self,
        request: &Value,
        model: &str,
        modality: &str,
    ) -> Result<Value, GenerationError> {
        let mut attempt = 0;
        let mut retries = 0;
        loop {
            let started_at = OffsetDateTime::now_utc();
            match self.transport.generate(request) {
                Ok(payload) => {
                    let finished_at = OffsetDateTime::now_utc();
                    let (input_tokens, output_tokens, total_tokens) = usage_tokens(&payload);
                    self.monitor.record(AnalysisEvent {
                        model: model.to_string(),
                        modality: modality.to_string(),
                        started_at,
                        finished_at,
                        input_tokens,
                        output_tokens,
                        total_tokens,
                        retries,
                    });
                    return Ok(payload);
                }
                Err(err) => {
                    if err.is_retryable() && attempt < self.options.max_retries {
                        warn!(
                            attempt = attempt + 1,
                            delay_ms = self.options.retry_delay.as_millis() as u64,
                            error = %err,
                            "transient generateContent failure, retrying"
                        );
                        self.monitor.note_event(
                            "retry.generateContent",
                            json!({
                                "attempt": attempt + 1,
                                "delay_ms": self.options.retry_delay.as_millis() as u64,
                                "status": err.status,
                                "error": err.to_string(),
                            }),
                        );
                        (self.sleep)(self.options.retry_delay);
                        attempt += 1;
                        retries += 1;
                        continue;
                    }
                    return Err(err);
                }
            }
        }
    }
}

fn usage_tokens(payload: &Value) -> (Option<u32>, Option<u32>, Option<u32>) {
    let usage = payload.get("usageMetadata");
    let field = |name: &str| {
        usage
            .and_then(|u| u.get(name))
            .and_then(Value::as_u64)
            .map(|v| v as u32)
    };
    (
        field("promptTokenCount"),
        field("candidatesTokenCount"),
        field("totalTokenCount"),
    )
}
