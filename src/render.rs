//! Writes the analyzed ata to disk: an HTML document ready for display
//! plus a JSON sidecar with the raw fields.

use anyhow::Context;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::core::MeetingMinutes;

pub struct AtaPaths {
    pub dir: PathBuf,
    pub html: PathBuf,
    pub json: PathBuf,
}

pub struct AtaWriter;

impl AtaWriter {
    pub fn write(
        &self,
        base: &Path,
        name: &str,
        minutes: &MeetingMinutes,
    ) -> anyhow::Result<AtaPaths> {
        let slug = slugify(name);
        let dir = base.join(&slug);
        fs::create_dir_all(&dir)
            .with_context(|| format!("creating {}", dir.display()))?;

        let html_path = dir.join(format!("{slug}.html"));
        let mut html_file = File::create(&html_path)
            .with_context(|| format!("creating {}", html_path.display()))?;
        html_file.write_all(render_html(minutes).as_bytes())?;

        let json_path = dir.join(format!("{slug}.json"));
        let mut json_file = File::create(&json_path)
            .with_context(|| format!("creating {}", json_path.display()))?;
        json_file.write_all(serde_json::to_string_pretty(minutes)?.as_bytes())?;
        json_file.write_all(b"\n")?;

        Ok(AtaPaths {
            dir,
            html: html_path,
            json: json_path,
        })
    }
}

/// Wraps `styled_content` in a minimal shell. The body is model-produced
/// HTML and is embedded as-is; the header fields are plain text and get
/// escaped.
fn render_html(minutes: &MeetingMinutes) -> String {
    let category = escape_text(&minutes.category);
    let summary = escape_text(&minutes.quick_summary);
    format!(
        "<!doctype html>\n\
         <html lang=\"pt-BR\">\n\
         <head>\n\
         <meta charset=\"utf-8\">\n\
         <title>Ata: {category}</title>\n\
         </head>\n\
         <body>\n\
         <header>\n\
         <h1>{category}</h1>\n\
         <p>{summary}</p>\n\
         </header>\n\
         <main>\n{content}\n</main>\n\
         </body>\n\
         </html>\n",
        content = minutes.styled_content
    )
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

pub fn slugify<S: AsRef<str>>(input: S) -> String {
    input
        .as_ref()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect::<String>()
        .trim_matches('-')
        .to_string()
}
