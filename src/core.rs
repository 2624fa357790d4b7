use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::GenerationError;

/// Coarse classification of a declared MIME type. Derived on demand,
/// never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MimeCategory {
    Text,
    Audio,
    Video,
    Unsupported,
}

impl MimeCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            MimeCategory::Text => "text",
            MimeCategory::Audio => "audio",
            MimeCategory::Video => "video",
            MimeCategory::Unsupported => "unsupported",
        }
    }
}

/// A recording handed to the pipeline: a display name plus the MIME type
/// the caller declared for it. The declared type is trusted as-is.
#[derive(Debug, Clone)]
pub struct MeetingSource {
    pub name: String,
    pub mime: String,
}

/// One unit of the user turn sent to the model. Built per request and
/// discarded after the call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentPart {
    Text { text: String },
    Media { mime_type: String, data: String },
}

/// The structured ata produced by a successful analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetingMinutes {
    pub category: String,
    pub quick_summary: String,
    pub styled_content: String,
}

/// How to treat model output that cannot be parsed into [`MeetingMinutes`].
/// Strict fails loudly; best-effort degrades to empty-string defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseMode {
    Strict,
    BestEffort,
}

/// Seam over the generateContent wire call so the retry loop can be
/// exercised against scripted endpoints.
pub trait GenerateTransport: Send + Sync {
    fn generate(&self, request: &Value) -> Result<Value, GenerationError>;
}
