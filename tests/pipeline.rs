use std::fs;
use std::path::Path;

use abr_compiler::ToolError;
use abr_compiler::compile::{self, CompileOptions, DEFAULT_OUTPUT_NAME};
use abr_compiler::model::CellValue;
use calamine::{DataType, Reader, Xlsx, open_workbook};
use tempfile::tempdir;

const CLICKS_EXPORT: &str = "Threshold (dB SPL): 30\n\
Frequency (kHz): 0.00\n\
Threshold method: auto\n\
Averages: 512\n\
Filter: 300-3000 Hz\n\
Analysis: peaks\n\
Level\tCorrCoef\tP1 Latency,P1 Amplitude,N1 Latency,N1 Amplitude\t0.3msec Avg\n\
20\t0.40\t1.60,0.30,2.10,-0.10\t0.01\n\
50\t\t1.45,0.90,1.95,-0.40\t0.02\n\
40\t0.85\t1.50,0.70,2.00,-0.20\t0.015\n";

const TONE_EXPORT: &str = "Threshold (dB SPL): None\r\n\
Frequency (kHz): 16.00\r\n\
Noise floor: 0.05\r\n\
Threshold method: manual\r\n\
Averages: 512\r\n\
Filter: 300-3000 Hz\r\n\
Analysis: peaks\r\n\
Level\tCorrCoef\tP1 Amplitude,N1 Amplitude,P2 Amplitude,N2 Amplitude\r\n\
30\t0.9\t0.5,0.1,0.4,0.6\r\n";

fn write_fixtures(directory: &Path) {
    fs::write(directory.join("M12 16 kHz-analyzed.txt"), TONE_EXPORT).expect("tone export");
    fs::write(directory.join("M12 Clicks-analyzed.txt"), CLICKS_EXPORT).expect("click export");
    fs::write(directory.join("README.md"), "not an export").expect("unrelated file");
}

fn as_f64(cell: &DataType) -> f64 {
    match cell {
        DataType::Float(value) => *value,
        DataType::Int(value) => *value as f64,
        other => panic!("expected a number, found {other:?}"),
    }
}

fn as_str(cell: &DataType) -> &str {
    match cell {
        DataType::String(value) => value,
        other => panic!("expected text, found {other:?}"),
    }
}

#[test]
fn compiles_directory_into_single_sheet() {
    let temp_dir = tempdir().expect("temporary directory");
    write_fixtures(temp_dir.path());

    let summary = compile::compile_directory(&CompileOptions::new(temp_dir.path()))
        .expect("directory compiled");
    assert_eq!(summary.files, 2);
    assert_eq!(summary.rows, 4);
    assert_eq!(summary.columns, 15);
    assert_eq!(summary.output, temp_dir.path().join(DEFAULT_OUTPUT_NAME));

    let mut workbook: Xlsx<_> = open_workbook(&summary.output).expect("workbook opened");
    let range = workbook
        .worksheet_range("Sheet1")
        .expect("sheet present")
        .expect("sheet read");
    assert_eq!(range.get_size(), (5, 15));

    let rows: Vec<&[DataType]> = range.rows().collect();
    let header: Vec<&str> = rows[0].iter().map(as_str).collect();
    assert_eq!(
        header,
        [
            "ID",
            "Frequency",
            "Threshold",
            "Threshold Method",
            "Intensity",
            "CorrCoef",
            "P1 Latency",
            "P1 Amplitude",
            "N1 Latency",
            "N1 Amplitude",
            "Wave 1 Amplitude",
            "0.3msec Avg",
            "P2 Amplitude",
            "N2 Amplitude",
            "Wave 2 Amplitude",
        ]
    );

    // Click export first, sorted by intensity.
    let intensities: Vec<f64> = rows[1..].iter().map(|row| as_f64(&row[4])).collect();
    assert_eq!(intensities, [20.0, 40.0, 50.0, 30.0]);
    assert_eq!(as_str(&rows[1][0]), "M12");
    assert_eq!(as_str(&rows[1][1]), "Clicks");
    assert_eq!(as_f64(&rows[1][2]), 30.0);
    assert_eq!(as_str(&rows[1][3]), "Auto)");

    // Intensity 20 is below the threshold of 30.
    for col in 6..=10 {
        assert_eq!(as_f64(&rows[1][col]), 0.0, "column {col} suppressed");
    }
    assert_eq!(as_f64(&rows[1][5]), 0.40);
    assert_eq!(as_f64(&rows[1][11]), 0.01);

    assert!((as_f64(&rows[2][10]) - 0.9).abs() < 1e-9);
    assert_eq!(as_f64(&rows[3][5]), 1.0);

    let tone = rows[4];
    assert_eq!(as_str(&tone[1]), "16 kHz");
    assert_eq!(as_str(&tone[2]), "None");
    assert_eq!(as_str(&tone[3]), "Manual");
    assert_eq!(tone[6], DataType::Empty);
    assert!((as_f64(&tone[10]) - 0.4).abs() < 1e-9);
    assert_eq!(as_f64(&tone[14]), 0.0);
}

#[test]
fn repeated_runs_produce_identical_tables() {
    let temp_dir = tempdir().expect("temporary directory");
    write_fixtures(temp_dir.path());

    let (first, _) = compile::compile_master_table(temp_dir.path()).expect("first run");
    let (second, _) = compile::compile_master_table(temp_dir.path()).expect("second run");
    assert_eq!(first, second);

    let intensity = first
        .columns
        .iter()
        .position(|column| column.name == "Intensity")
        .expect("intensity column");
    assert_eq!(first.rows[0][intensity], CellValue::Number(20.0));
}

#[test]
fn existing_output_is_replaced() {
    let temp_dir = tempdir().expect("temporary directory");
    write_fixtures(temp_dir.path());
    let output = temp_dir.path().join("merged.xlsx");
    fs::write(&output, "stale").expect("stale output");

    let options = CompileOptions {
        directory: temp_dir.path().to_path_buf(),
        output_name: "merged.xlsx".to_string(),
    };
    compile::compile_directory(&options).expect("directory compiled");

    let written = fs::read(&output).expect("output read");
    assert!(written.starts_with(b"PK"));
}

#[test]
fn empty_directory_writes_empty_workbook() {
    let temp_dir = tempdir().expect("temporary directory");
    let summary = compile::compile_directory(&CompileOptions::new(temp_dir.path()))
        .expect("empty directory compiled");
    assert_eq!(summary.files, 0);
    assert_eq!(summary.rows, 0);
    assert_eq!(summary.columns, 0);

    let mut workbook: Xlsx<_> = open_workbook(&summary.output).expect("workbook opened");
    let range = workbook
        .worksheet_range("Sheet1")
        .expect("sheet present")
        .expect("sheet read");
    assert!(range.is_empty());
}

#[test]
fn missing_directory_is_rejected() {
    let temp_dir = tempdir().expect("temporary directory");
    let missing = temp_dir.path().join("absent");
    let error = compile::compile_directory(&CompileOptions::new(&missing)).unwrap_err();
    assert!(matches!(error, ToolError::MissingInput(path) if path == missing));
}

#[test]
fn unorderable_file_aborts_without_output() {
    let temp_dir = tempdir().expect("temporary directory");
    write_fixtures(temp_dir.path());
    fs::write(temp_dir.path().join("M12 Tones-analyzed.txt"), CLICKS_EXPORT).expect("export");

    let error = compile::compile_directory(&CompileOptions::new(temp_dir.path())).unwrap_err();
    assert!(matches!(error, ToolError::InvalidFileName { .. }));
    assert!(!temp_dir.path().join(DEFAULT_OUTPUT_NAME).exists());
}

#[test]
fn malformed_frequency_aborts_without_output() {
    let temp_dir = tempdir().expect("temporary directory");
    let broken = CLICKS_EXPORT.replace("0.00", "tone");
    fs::write(temp_dir.path().join("M3 Clicks-analyzed.txt"), broken).expect("export");

    let error = compile::compile_directory(&CompileOptions::new(temp_dir.path())).unwrap_err();
    assert!(matches!(error, ToolError::InvalidFrequency(_)));
    assert!(!temp_dir.path().join(DEFAULT_OUTPUT_NAME).exists());
}
