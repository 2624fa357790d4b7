//! Shared constants for the atagen pipeline.

pub const GEMINI_FLASH_LATEST: &str = "gemini-flash-latest";
pub const GEMINI_2_5_FLASH: &str = "gemini-2.5-flash";
pub const GEMINI_2_5_FLASH_LITE: &str = "gemini-2.5-flash-lite";
pub const GEMINI_2_5_PRO: &str = "gemini-2.5-pro";

pub const AVAILABLE_MODELS: &[&str] = &[
    GEMINI_FLASH_LATEST,
    GEMINI_2_5_FLASH,
    GEMINI_2_5_FLASH_LITE,
    GEMINI_2_5_PRO,
];

pub const DEFAULT_MODEL: &str = GEMINI_FLASH_LATEST;

/// Rejects model names outside [`AVAILABLE_MODELS`] before any request is
/// built, naming the accepted set.
pub fn validate_model(model: &str) -> anyhow::Result<()> {
    if AVAILABLE_MODELS.contains(&model) {
        return Ok(());
    }
    anyhow::bail!(
        "Unknown model '{model}'. Available models: {}",
        AVAILABLE_MODELS.join(", ")
    )
}

pub const GENERATE_ENDPOINT_BASE: &str =
    "https://generativelanguage.googleapis.com/v1beta/models";

/// Retries after the first attempt, so 4 calls total by default.
pub const DEFAULT_MAX_RETRIES: usize = 3;
/// Fixed pause between attempts. No backoff, no jitter.
pub const DEFAULT_RETRY_DELAY_SECS: u64 = 5;
/// Lowered to favor deterministic, schema-shaped output.
pub const DEFAULT_TEMPERATURE: f64 = 0.2;

/// Whole-file in-memory bound enforced before the pipeline runs.
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 20 * 1024 * 1024;

pub const HTTP_TIMEOUT_SECS: u64 = 600;
