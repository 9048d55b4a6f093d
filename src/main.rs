use std::path::PathBuf;

use abr_compiler::compile::{self, CompileOptions, DEFAULT_OUTPUT_NAME};
use abr_compiler::{Result, ToolError};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    if let Err(error) = run(cli) {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    init_logging()?;
    let options = CompileOptions {
        directory: cli.directory,
        output_name: cli.output,
    };
    let summary = compile::compile_directory(&options)?;
    info!(
        files = summary.files,
        rows = summary.rows,
        columns = summary.columns,
        output = %summary.output.display(),
        "workbook written"
    );
    Ok(())
}

fn init_logging() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| ToolError::Logging(error.to_string()))
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Merge a directory of ABR sweep exports into one styled workbook."
)]
struct Cli {
    /// Directory containing the `.txt` exports.
    #[arg(default_value = ".")]
    directory: PathBuf,

    /// File name of the merged workbook, written inside the directory.
    #[arg(long, default_value = DEFAULT_OUTPUT_NAME)]
    output: String,
}
