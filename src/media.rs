//! Pre-flight format validation and content-part encoding.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

use crate::core::{ContentPart, MimeCategory};
use crate::error::AnalysisError;

/// Prefix prepended to decoded text recordings so the model knows what the
/// raw dump is.
pub const TEXT_CONTENT_PREFIX: &str = "Conteúdo da reunião (texto/log):\n";

pub fn classify_mime(mime_type: &str) -> MimeCategory {
    match mime_type.parse::<mime::Mime>() {
        Ok(parsed) => match parsed.type_() {
            mime::TEXT => MimeCategory::Text,
            mime::AUDIO => MimeCategory::Audio,
            mime::VIDEO => MimeCategory::Video,
            _ => MimeCategory::Unsupported,
        },
        Err(_) => MimeCategory::Unsupported,
    }
}

/// Gate called before any network access. Images get a dedicated message;
/// anything outside text/audio/video is rejected generically.
pub fn validate_mime(mime_type: &str) -> Result<MimeCategory, AnalysisError> {
    if mime_type.starts_with("image/") {
        return Err(AnalysisError::UnsupportedImage {
            mime: mime_type.to_string(),
        });
    }
    match classify_mime(mime_type) {
        MimeCategory::Unsupported => Err(AnalysisError::UnsupportedFormat {
            mime: mime_type.to_string(),
        }),
        category => Ok(category),
    }
}

/// Turns raw recording bytes into the part the endpoint accepts: UTF-8
/// passthrough for text, standard base64 for everything else. The declared
/// type is trusted; no sniffing.
pub fn encode_content(mime_type: &str, bytes: &[u8]) -> ContentPart {
    if classify_mime(mime_type) == MimeCategory::Text {
        let text = String::from_utf8_lossy(bytes);
        return ContentPart::Text {
            text: format!("{TEXT_CONTENT_PREFIX}{text}"),
        };
    }

    let mime_type = if mime_type.is_empty() {
        mime::APPLICATION_OCTET_STREAM.as_ref().to_string()
    } else {
        mime_type.to_string()
    };
    ContentPart::Media {
        mime_type,
        data: BASE64.encode(bytes),
    }
}
