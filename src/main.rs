mod cli;
mod config;
mod constants;
mod core;
mod error;
mod media;
mod prompts;
mod providers;
mod render;
mod response;
mod store;
mod telemetry;

use anyhow::{bail, Context};
use bytesize::ByteSize;
use clap::Parser;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::AppConfig;
use crate::core::{MeetingSource, ParseMode};
use crate::providers::gemini::{GeminiClient, GenerationOptions, HttpTransport};
use crate::render::AtaWriter;
use crate::store::{AtaIndex, AtaRecord, INDEX_FILE_NAME};
use crate::telemetry::RunMonitor;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = cli::Cli::parse();
    match cli.cmd {
        cli::Command::Analyze {
            source,
            output_dir,
            model,
            mime,
            best_effort,
            config,
        } => run_analyze(source, output_dir, model, mime, best_effort, config),
        cli::Command::List { output_dir, config } => run_list(output_dir, config),
        cli::Command::Delete {
            id,
            output_dir,
            config,
        } => run_delete(id, output_dir, config),
    }
}

fn run_analyze(
    source: PathBuf,
    output_dir: Option<PathBuf>,
    model: Option<String>,
    mime: Option<String>,
    best_effort: bool,
    config: Option<String>,
) -> anyhow::Result<()> {
    let mut cfg = AppConfig::load(config.as_deref())?;
    if best_effort {
        cfg.parse_mode = ParseMode::BestEffort;
    }
    let model = model.unwrap_or_else(|| cfg.default_model.clone());
    constants::validate_model(&model)?;
    let output_dir = output_dir.unwrap_or_else(|| cfg.output_dir.clone());

    let metadata = fs::metadata(&source)
        .with_context(|| format!("reading {}", source.display()))?;
    if metadata.len() > cfg.max_upload_bytes {
        bail!(
            "{} is {}, above the {} upload limit",
            source.display(),
            ByteSize(metadata.len()),
            ByteSize(cfg.max_upload_bytes)
        );
    }

    let declared_mime = mime
        .or_else(|| {
            mime_guess::from_path(&source)
                .first_raw()
                .map(|s| s.to_string())
        })
        .unwrap_or_else(|| "application/octet-stream".to_string());
    let file_name = source
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "recording".to_string());
    let bytes = fs::read(&source)
        .with_context(|| format!("reading {}", source.display()))?;

    let monitor = RunMonitor::new();
    let transport = HttpTransport::new(cfg.api_key.clone(), model.clone());
    let client = GeminiClient::new(
        Box::new(transport),
        monitor.clone(),
        GenerationOptions {
            max_retries: cfg.max_retries,
            retry_delay: cfg.retry_delay,
            temperature: cfg.temperature,
            parse_mode: cfg.parse_mode,
        },
    );

    let meeting = MeetingSource {
        name: file_name.clone(),
        mime: declared_mime.clone(),
    };
    let minutes = client.analyze_meeting(&meeting, &bytes, &model)?;

    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "ata".to_string());
    let paths = AtaWriter.write(&output_dir, &stem, &minutes)?;
    monitor.flush_summary(&paths.dir.join("run-summary.json"))?;

    let mut index = AtaIndex::load(&output_dir.join(INDEX_FILE_NAME));
    let id = AtaIndex::next_id();
    index.append(AtaRecord {
        id,
        category: minutes.category.clone(),
        summary: minutes.quick_summary.clone(),
        file_name,
        mime_type: declared_mime,
        created_utc: time::OffsetDateTime::now_utc()
            .format(&time::format_description::well_known::Rfc3339)?,
        html_path: paths.html.clone(),
        json_path: paths.json.clone(),
    });
    index.save()?;

    println!("[{id}] {}", minutes.category);
    if !minutes.quick_summary.is_empty() {
        println!("    {}", minutes.quick_summary);
    }
    println!("    ata: {}", paths.html.display());
    Ok(())
}

fn run_list(output_dir: Option<PathBuf>, config: Option<String>) -> anyhow::Result<()> {
    let output_dir = resolve_output_dir(output_dir, config.as_deref());
    let index = AtaIndex::load(&output_dir.join(INDEX_FILE_NAME));
    if index.records().is_empty() {
        println!("no atas recorded yet in {}", output_dir.display());
        return Ok(());
    }
    for record in index.records() {
        println!(
            "[{}] {}  {}  ({}, {})",
            record.id, record.created_utc, record.category, record.file_name, record.mime_type
        );
        if !record.summary.is_empty() {
            println!("    {}", record.summary);
        }
        println!("    ata: {}", record.html_path.display());
    }
    Ok(())
}

fn run_delete(id: u64, output_dir: Option<PathBuf>, config: Option<String>) -> anyhow::Result<()> {
    let output_dir = resolve_output_dir(output_dir, config.as_deref());
    let mut index = AtaIndex::load(&output_dir.join(INDEX_FILE_NAME));
    if !index.delete(id) {
        bail!("no ata with id {id} in {}", output_dir.display());
    }
    index.save()?;
    println!("removed ata {id} from the index (artifacts on disk are kept)");
    Ok(())
}

/// list/delete work offline; only fall back to the config when the flag is
/// absent, and tolerate a missing API key by using the default directory.
fn resolve_output_dir(output_dir: Option<PathBuf>, config: Option<&str>) -> PathBuf {
    output_dir
        .or_else(|| AppConfig::load(config).ok().map(|cfg| cfg.output_dir))
        .unwrap_or_else(|| Path::new("atas").to_path_buf())
}
