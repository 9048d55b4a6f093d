use std::path::Path;

use crate::error::{Result, ToolError};
use crate::io::text_read::RawRecord;

/// Marker found on the third line of exports that carry an extra noise line.
pub const NOISE_MARKER: &str = "Noise";
/// Row inspected for [`NOISE_MARKER`].
pub const NOISE_MARKER_ROW: usize = 2;
/// Raw frequency value that denotes a click stimulus.
pub const CLICKS_FREQUENCY: &str = "0.00";

/// Row positions of the metadata block at the top of an export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderLayout {
    pub threshold_row: usize,
    pub frequency_row: usize,
    pub method_row: usize,
    /// Row holding the column names of the measurement table.
    pub column_header_row: usize,
}

impl HeaderLayout {
    /// Layout of exports without a noise line.
    pub const STANDARD: HeaderLayout = HeaderLayout {
        threshold_row: 0,
        frequency_row: 1,
        method_row: 2,
        column_header_row: 6,
    };

    /// Layout of exports whose third line is a noise line.
    pub const WITH_NOISE: HeaderLayout = HeaderLayout {
        threshold_row: 0,
        frequency_row: 1,
        method_row: 3,
        column_header_row: 7,
    };

    /// Picks the layout matching `record` and checks that the record is long
    /// enough to hold its metadata block and column header.
    pub fn detect(record: &RawRecord, file_name: &str) -> Result<Self> {
        let marker = record
            .cell(NOISE_MARKER_ROW, 0)
            .ok_or_else(|| malformed(file_name, "fewer than three lines"))?;
        let layout = if marker.contains(NOISE_MARKER) {
            HeaderLayout::WITH_NOISE
        } else {
            HeaderLayout::STANDARD
        };
        if record.len() <= layout.column_header_row {
            return Err(malformed(
                file_name,
                &format!("missing column header on line {}", layout.column_header_row + 1),
            ));
        }
        Ok(layout)
    }
}

/// Session attributes shared by every sweep of one export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionMetadata {
    pub identifier: String,
    /// Numeric text, or `None` when no threshold was determined.
    pub threshold: String,
    /// `Clicks` or `<value> kHz`.
    pub frequency: String,
    pub threshold_method: String,
}

/// Reads the session attributes from the metadata block and the file name.
pub fn extract_metadata(
    record: &RawRecord,
    layout: &HeaderLayout,
    file_name: &str,
) -> Result<SessionMetadata> {
    let threshold = field_value(record, layout.threshold_row, file_name)?.to_string();
    let frequency = format_frequency(field_value(record, layout.frequency_row, file_name)?)?;
    let threshold_method =
        format_threshold_method(field_value(record, layout.method_row, file_name)?);

    Ok(SessionMetadata {
        identifier: identifier_from_file_name(file_name),
        threshold,
        frequency,
        threshold_method,
    })
}

fn field_value<'a>(record: &'a RawRecord, row: usize, file_name: &str) -> Result<&'a str> {
    let cell = record
        .cell(row, 0)
        .ok_or_else(|| malformed(file_name, &format!("missing line {}", row + 1)))?;
    Ok(after_last_colon(cell))
}

fn after_last_colon(cell: &str) -> &str {
    cell.rsplit(':').next().unwrap_or(cell).trim()
}

fn malformed(file_name: &str, reason: &str) -> ToolError {
    ToolError::MalformedHeader {
        file_name: file_name.to_string(),
        reason: reason.to_string(),
    }
}

/// Renders the frequency field: `Clicks` for click stimuli, otherwise the
/// value to two significant figures followed by `kHz`.
pub fn format_frequency(raw: &str) -> Result<String> {
    let value = if raw.contains(' ') {
        raw.split(' ').nth(1).unwrap_or_default()
    } else {
        raw
    };
    if value == CLICKS_FREQUENCY {
        return Ok("Clicks".to_string());
    }
    let number = value
        .trim()
        .parse::<f64>()
        .map_err(|_| ToolError::InvalidFrequency(value.to_string()))?;
    Ok(format!("{} kHz", two_significant_figures(number)))
}

fn two_significant_figures(value: f64) -> String {
    if value == 0.0 || !value.is_finite() {
        return format!("{value}");
    }
    let rounded = round_significant(value, 2);
    let magnitude = rounded.abs().log10().floor() as i32;
    let decimals = (1 - magnitude).max(0) as usize;
    format!("{rounded:.decimals$}")
}

fn round_significant(value: f64, digits: i32) -> f64 {
    let magnitude = value.abs().log10().floor() as i32;
    let shift = digits - 1 - magnitude;
    if shift >= 0 {
        let scale = 10f64.powi(shift);
        (value * scale).round() / scale
    } else {
        let scale = 10f64.powi(-shift);
        (value / scale).round() * scale
    }
}

/// Maps the raw threshold method onto its presentation form.
pub fn format_threshold_method(raw: &str) -> String {
    match raw {
        "" => "None".to_string(),
        "manual" => "Manual".to_string(),
        other => format!("{})", capitalize(other)),
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Derives the series identifier: `M12 16 kHz-analyzed.txt` becomes `M12`,
/// `Mouse 3 Clicks-analyzed.txt` becomes `Mouse-3`.
pub fn identifier_from_file_name(file_name: &str) -> String {
    let stem = Path::new(file_name)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or(file_name);

    let mut segments: Vec<&str> = stem.split('-').collect();
    segments.pop();
    let joined = segments.join(" ");

    let mut tokens: Vec<&str> = joined.split(' ').collect();
    let suffix_len = if tokens.contains(&"kHz") { 2 } else { 1 };
    tokens.truncate(tokens.len().saturating_sub(suffix_len));
    tokens.join(" ").replace(' ', "-")
}
