use std::fmt;

use crate::error::{Result, ToolError};

/// Name of the column holding the series identifier.
pub const ID_COLUMN: &str = "ID";
/// Name of the column holding the detection threshold.
pub const THRESHOLD_COLUMN: &str = "Threshold";
/// Name of the column holding the rendered stimulus frequency.
pub const FREQUENCY_COLUMN: &str = "Frequency";
/// Name of the threshold method column as created by the normalizer.
pub const THRESHOLD_METHOD_COLUMN: &str = "Threshold method";
/// Name of the stimulus intensity column in the instrument export.
pub const LEVEL_COLUMN: &str = "Level";
/// Presentation name of the stimulus intensity column.
pub const INTENSITY_COLUMN: &str = "Intensity";
/// Name of the correlation coefficient column.
pub const CORR_COEF_COLUMN: &str = "CorrCoef";

/// A single table cell after tolerant numeric coercion.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// Cell parsed as a floating point number.
    Number(f64),
    /// Cell kept verbatim because it is not numeric.
    Text(String),
    /// Empty cell, or a cell absent from a shorter row.
    Missing,
}

impl CellValue {
    /// Coerces a raw cell. Never fails: non-numeric text is kept as text and
    /// blank cells become [`CellValue::Missing`].
    pub fn coerce(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return CellValue::Missing;
        }
        match trimmed.parse::<f64>() {
            Ok(value) => CellValue::Number(value),
            Err(_) => CellValue::Text(raw.to_string()),
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, CellValue::Missing)
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Number(value) => write!(f, "{value}"),
            CellValue::Text(value) => write!(f, "{value}"),
            CellValue::Missing => Ok(()),
        }
    }
}

/// Returns `true` when the cells form a numeric column: no cell holds text.
/// A column left entirely blank counts as numeric.
pub fn is_numeric_column<'a>(cells: impl IntoIterator<Item = &'a CellValue>) -> bool {
    cells
        .into_iter()
        .all(|cell| !matches!(cell, CellValue::Text(_)))
}

/// Polarity of a waveform peak.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sign {
    /// `P` peaks.
    Positive,
    /// `N` troughs.
    Negative,
}

/// What a per-wave measurement column records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeasurementKind {
    Amplitude,
    Latency,
    Other,
}

/// Semantic tag attached to a column when it is created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnRole {
    /// The series identifier derived from the file name.
    Identifier,
    /// Session-level attributes (threshold, frequency, threshold method).
    Session,
    /// Stimulus intensity (`Level` in the export, `Intensity` once renamed).
    Intensity,
    /// Correlation coefficient.
    CorrCoef,
    /// A `{sign}{wave} {kind}` column from the export.
    Measurement {
        sign: Sign,
        wave: String,
        kind: MeasurementKind,
    },
    /// A computed `Wave {wave} Amplitude` column.
    DerivedAmplitude { wave: String },
    /// Anything else carried through unchanged.
    Other,
}

impl ColumnRole {
    /// Classifies a header cell from an instrument export.
    pub fn classify(name: &str) -> Self {
        match name {
            ID_COLUMN => return ColumnRole::Identifier,
            THRESHOLD_COLUMN | FREQUENCY_COLUMN | THRESHOLD_METHOD_COLUMN => {
                return ColumnRole::Session;
            }
            LEVEL_COLUMN | INTENSITY_COLUMN => return ColumnRole::Intensity,
            CORR_COEF_COLUMN => return ColumnRole::CorrCoef,
            _ => {}
        }

        if let Some(wave) = name
            .strip_prefix("Wave ")
            .and_then(|rest| rest.strip_suffix(" Amplitude"))
            .filter(|wave| is_wave_number(wave))
        {
            return ColumnRole::DerivedAmplitude {
                wave: wave.to_string(),
            };
        }

        let sign = match name.chars().next() {
            Some('P') => Sign::Positive,
            Some('N') => Sign::Negative,
            _ => return ColumnRole::Other,
        };
        let Some((wave, kind)) = name[1..].split_once(' ') else {
            return ColumnRole::Other;
        };
        if !is_wave_number(wave) {
            return ColumnRole::Other;
        }
        let kind = match kind {
            "Amplitude" => MeasurementKind::Amplitude,
            "Latency" => MeasurementKind::Latency,
            _ => MeasurementKind::Other,
        };
        ColumnRole::Measurement {
            sign,
            wave: wave.to_string(),
            kind,
        }
    }

    /// Role of the `{sign}{wave} Amplitude` measurement.
    pub fn amplitude(sign: Sign, wave: &str) -> Self {
        ColumnRole::Measurement {
            sign,
            wave: wave.to_string(),
            kind: MeasurementKind::Amplitude,
        }
    }
}

fn is_wave_number(text: &str) -> bool {
    !text.is_empty() && text.chars().all(|ch| ch.is_ascii_digit())
}

/// A named column together with its semantic role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub role: ColumnRole,
}

impl Column {
    /// Creates a column from an export header cell, classifying its role.
    pub fn from_header(name: impl Into<String>) -> Self {
        let name = name.into();
        let role = ColumnRole::classify(&name);
        Self { name, role }
    }

    pub fn with_role(name: impl Into<String>, role: ColumnRole) -> Self {
        Self {
            name: name.into(),
            role,
        }
    }

    /// The computed trough-to-peak column for `wave`.
    pub fn derived_amplitude(wave: &str) -> Self {
        Self {
            name: format!("Wave {wave} Amplitude"),
            role: ColumnRole::DerivedAmplitude {
                wave: wave.to_string(),
            },
        }
    }
}

/// Sweeps of a single export: one row per stimulus intensity.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SweepTable {
    pub columns: Vec<Column>,
    pub rows: Vec<Vec<CellValue>>,
}

impl SweepTable {
    pub fn new(columns: Vec<Column>, rows: Vec<Vec<CellValue>>) -> Self {
        Self { columns, rows }
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column.name == name)
    }

    pub fn position_of_role(&self, role: &ColumnRole) -> Option<usize> {
        self.columns.iter().position(|column| &column.role == role)
    }

    /// Looks up a column that downstream rules cannot do without.
    pub fn require(&self, name: &str) -> Result<usize> {
        self.position(name)
            .ok_or_else(|| ToolError::MissingColumn(name.to_string()))
    }

    /// Iterates over the cells of one column.
    pub fn column_cells(&self, index: usize) -> impl Iterator<Item = &CellValue> + '_ {
        self.rows
            .iter()
            .map(move |row| row.get(index).unwrap_or(&CellValue::Missing))
    }

    pub fn is_numeric(&self, index: usize) -> bool {
        is_numeric_column(self.column_cells(index))
    }

    /// Writes `values` into the column named like `column`, appending the
    /// column when it does not exist yet. `values` holds one cell per row.
    pub fn set_column(&mut self, column: Column, values: Vec<CellValue>) {
        debug_assert_eq!(values.len(), self.rows.len());
        let index = match self.position(&column.name) {
            Some(index) => {
                self.columns[index] = column;
                index
            }
            None => {
                self.columns.push(column);
                self.columns.len() - 1
            }
        };
        for (row, value) in self.rows.iter_mut().zip(values) {
            if row.len() <= index {
                row.resize(index + 1, CellValue::Missing);
            }
            row[index] = value;
        }
    }

    /// Rearranges the columns to follow `order`, a list of column indices.
    /// Columns not listed are dropped.
    pub fn select(&mut self, order: &[usize]) {
        self.columns = order.iter().map(|&idx| self.columns[idx].clone()).collect();
        for row in &mut self.rows {
            *row = order
                .iter()
                .map(|&idx| row.get(idx).cloned().unwrap_or(CellValue::Missing))
                .collect();
        }
    }
}

/// Concatenation of every processed [`SweepTable`], in processing order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MasterTable {
    pub columns: Vec<Column>,
    pub rows: Vec<Vec<CellValue>>,
}

impl MasterTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends the rows of `table`, extending the column set with any column
    /// not seen before. Cells a table does not provide are left missing.
    pub fn append(mut self, table: SweepTable) -> Self {
        let mut mapping = Vec::with_capacity(table.columns.len());
        for column in table.columns {
            let index = match self.columns.iter().position(|c| c.name == column.name) {
                Some(index) => index,
                None => {
                    self.columns.push(column);
                    self.columns.len() - 1
                }
            };
            mapping.push(index);
        }

        let width = self.columns.len();
        for row in &mut self.rows {
            row.resize(width, CellValue::Missing);
        }
        for row in table.rows {
            let mut merged = vec![CellValue::Missing; width];
            for (cell, &target) in row.into_iter().zip(&mapping) {
                merged[target] = cell;
            }
            self.rows.push(merged);
        }
        self
    }

    pub fn column_cells(&self, index: usize) -> impl Iterator<Item = &CellValue> + '_ {
        self.rows
            .iter()
            .map(move |row| row.get(index).unwrap_or(&CellValue::Missing))
    }

    pub fn is_numeric(&self, index: usize) -> bool {
        is_numeric_column(self.column_cells(index))
    }
}
