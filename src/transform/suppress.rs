use crate::error::{Result, ToolError};
use crate::model::{CORR_COEF_COLUMN, CellValue, INTENSITY_COLUMN, SweepTable, THRESHOLD_COLUMN};

/// Numeric columns that keep their values on sub-threshold sweeps.
pub const UNSUPPRESSED_COLUMNS: [&str; 5] = [
    THRESHOLD_COLUMN,
    INTENSITY_COLUMN,
    CORR_COEF_COLUMN,
    "0.3msec Avg",
    "0.3msec StDev",
];

/// Indices of the numeric measurement columns zeroed below threshold.
pub fn suppressible_columns(table: &SweepTable) -> Vec<usize> {
    table
        .columns
        .iter()
        .enumerate()
        .filter(|(idx, column)| {
            !UNSUPPRESSED_COLUMNS.contains(&column.name.as_str()) && table.is_numeric(*idx)
        })
        .map(|(idx, _)| idx)
        .collect()
}

/// Zeroes the numeric measurements of every sweep presented below the
/// detection threshold. Returns the number of sweeps zeroed.
pub fn suppress_below_threshold(table: &mut SweepTable) -> Result<usize> {
    let threshold = table.require(THRESHOLD_COLUMN)?;
    let intensity = table.require(INTENSITY_COLUMN)?;
    let columns = suppressible_columns(table);

    let mut suppressed = 0;
    for row in &mut table.rows {
        let Some(limit) = threshold_value(&row[threshold])? else {
            continue;
        };
        let Some(level) = intensity_value(&row[intensity])? else {
            continue;
        };
        if level < limit {
            for &col in &columns {
                row[col] = CellValue::Number(0.0);
            }
            suppressed += 1;
        }
    }
    Ok(suppressed)
}

fn threshold_value(cell: &CellValue) -> Result<Option<f64>> {
    match cell {
        CellValue::Text(text) if text == "None" => Ok(Some(0.0)),
        other => numeric(THRESHOLD_COLUMN, other),
    }
}

fn intensity_value(cell: &CellValue) -> Result<Option<f64>> {
    numeric(INTENSITY_COLUMN, cell)
}

fn numeric(column: &str, cell: &CellValue) -> Result<Option<f64>> {
    match cell {
        CellValue::Number(value) => Ok(Some(*value)),
        CellValue::Missing => Ok(None),
        CellValue::Text(text) => {
            text.trim()
                .parse::<f64>()
                .map(Some)
                .map_err(|_| ToolError::InvalidNumber {
                    column: column.to_string(),
                    value: text.clone(),
                })
        }
    }
}
