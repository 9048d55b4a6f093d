use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument, warn};

use crate::error::{Result, ToolError};
use crate::io::discovery::discover_exports;
use crate::io::excel_write;
use crate::io::text_read::{RawRecord, read_record};
use crate::model::{MasterTable, SweepTable};
use crate::transform::amplitude::derive_wave_amplitudes;
use crate::transform::metadata::{HeaderLayout, SessionMetadata, extract_metadata};
use crate::transform::normalize::normalize;
use crate::transform::reorder::reorder_columns;
use crate::transform::suppress::suppress_below_threshold;

/// File name of the merged workbook.
pub const DEFAULT_OUTPUT_NAME: &str = "Merged_dataframe.xlsx";

/// Settings for one compilation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileOptions {
    /// Directory holding the exports; the workbook is written here too.
    pub directory: PathBuf,
    pub output_name: String,
}

impl CompileOptions {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            output_name: DEFAULT_OUTPUT_NAME.to_string(),
        }
    }

    pub fn output_path(&self) -> PathBuf {
        self.directory.join(&self.output_name)
    }
}

/// Outcome of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileSummary {
    pub files: usize,
    pub rows: usize,
    pub columns: usize,
    pub output: PathBuf,
}

/// A single export after every transformation stage.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedSweep {
    pub metadata: SessionMetadata,
    pub table: SweepTable,
}

/// Runs the transformation stages over one parsed export.
#[instrument(level = "debug", skip(record), fields(rows = record.len()))]
pub fn process_record(record: &RawRecord, file_name: &str) -> Result<ProcessedSweep> {
    let layout = HeaderLayout::detect(record, file_name)?;
    let metadata = extract_metadata(record, &layout, file_name)?;
    let mut table = normalize(record, &layout, &metadata)?;
    let waves = derive_wave_amplitudes(&mut table);
    reorder_columns(&mut table)?;
    let suppressed = suppress_below_threshold(&mut table)?;
    debug!(?layout, waves = waves.len(), suppressed, "export transformed");
    Ok(ProcessedSweep { metadata, table })
}

/// Reads and transforms one export file.
pub fn process_file(path: &Path) -> Result<ProcessedSweep> {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let record = read_record(path)?;
    process_record(&record, &file_name)
}

/// Transforms every export of a directory and merges them in processing order.
#[instrument(level = "info", skip_all, fields(directory = %directory.display()))]
pub fn compile_master_table(directory: &Path) -> Result<(MasterTable, usize)> {
    let files = discover_exports(directory)?;
    if files.is_empty() {
        warn!("no .txt exports found, writing an empty workbook");
    }

    let mut master = MasterTable::new();
    for path in &files {
        let sweep = process_file(path)?;
        println!(
            "Transforming {} {}...",
            sweep.metadata.identifier, sweep.metadata.frequency
        );
        master = master.append(sweep.table);
    }

    info!(
        file_count = files.len(),
        row_count = master.rows.len(),
        "merged exports"
    );
    Ok((master, files.len()))
}

/// Compiles the exports of `options.directory` into a single workbook.
#[instrument(
    level = "info",
    skip_all,
    fields(directory = %options.directory.display(), output = %options.output_name)
)]
pub fn compile_directory(options: &CompileOptions) -> Result<CompileSummary> {
    if !options.directory.is_dir() {
        return Err(ToolError::MissingInput(options.directory.clone()));
    }

    let (master, files) = compile_master_table(&options.directory)?;
    let output = options.output_path();
    excel_write::write_workbook(&output, &master)?;
    println!("Processing complete. The Excel file has been saved.");

    Ok(CompileSummary {
        files,
        rows: master.rows.len(),
        columns: master.columns.len(),
        output,
    })
}
