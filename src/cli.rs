use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "atagen",
    version,
    about = "Generates structured meeting minutes (atas) from recordings with Gemini"
)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Analyze a recording and write the resulting ata
    Analyze {
        source: PathBuf,
        #[arg(short = 'o', long)]
        output_dir: Option<PathBuf>,
        #[arg(long)]
        model: Option<String>,
        /// Override the declared MIME type (defaults to a guess from the
        /// file extension)
        #[arg(long)]
        mime: Option<String>,
        /// Degrade unparsable model output to empty fields instead of
        /// failing
        #[arg(long, default_value_t = false)]
        best_effort: bool,
        #[arg(long)]
        config: Option<String>,
    },
    /// List stored atas
    List {
        #[arg(short = 'o', long)]
        output_dir: Option<PathBuf>,
        #[arg(long)]
        config: Option<String>,
    },
    /// Remove an ata from the index
    Delete {
        id: u64,
        #[arg(short = 'o', long)]
        output_dir: Option<PathBuf>,
        #[arg(long)]
        config: Option<String>,
    },
}
