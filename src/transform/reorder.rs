use std::cmp::Ordering;

use crate::error::Result;
use crate::model::{
    CORR_COEF_COLUMN, CellValue, ColumnRole, FREQUENCY_COLUMN, ID_COLUMN, INTENSITY_COLUMN,
    LEVEL_COLUMN, MeasurementKind, Sign, SweepTable, THRESHOLD_COLUMN, THRESHOLD_METHOD_COLUMN,
};

/// Columns that always lead the sheet, in this order.
pub const LEADING_COLUMNS: [&str; 6] = [
    ID_COLUMN,
    FREQUENCY_COLUMN,
    THRESHOLD_COLUMN,
    THRESHOLD_METHOD_COLUMN,
    LEVEL_COLUMN,
    CORR_COEF_COLUMN,
];

/// Puts the columns in presentation order, renames them for display and
/// sorts the sweeps by ascending intensity.
///
/// Each derived wave amplitude is placed right after its `N` amplitude
/// column; derived columns without one are dropped along with any other
/// column mentioning `Wave`.
pub fn reorder_columns(table: &mut SweepTable) -> Result<()> {
    let mut interleaved = Vec::with_capacity(table.columns.len());
    for (idx, column) in table.columns.iter().enumerate() {
        if column.name.contains("Wave") {
            continue;
        }
        interleaved.push(idx);
        if let ColumnRole::Measurement {
            sign: Sign::Negative,
            wave,
            kind: MeasurementKind::Amplitude,
        } = &column.role
        {
            let derived = ColumnRole::DerivedAmplitude { wave: wave.clone() };
            if let Some(derived) = table.position_of_role(&derived) {
                if !interleaved.contains(&derived) {
                    interleaved.push(derived);
                }
            }
        }
    }

    let leading = LEADING_COLUMNS
        .iter()
        .map(|name| table.require(name))
        .collect::<Result<Vec<_>>>()?;
    let mut order = leading.clone();
    order.extend(interleaved.into_iter().filter(|idx| !leading.contains(idx)));
    table.select(&order);

    for column in &mut table.columns {
        if column.name == LEVEL_COLUMN {
            column.name = INTENSITY_COLUMN.to_string();
        }
        column.name = column.name.replace("method", "Method");
    }

    let intensity = table.require(INTENSITY_COLUMN)?;
    table
        .rows
        .sort_by(|lhs, rhs| compare_intensity(&lhs[intensity], &rhs[intensity]));
    Ok(())
}

/// Numbers ascending, then text, then missing cells.
fn compare_intensity(lhs: &CellValue, rhs: &CellValue) -> Ordering {
    fn rank(cell: &CellValue) -> u8 {
        match cell {
            CellValue::Number(_) => 0,
            CellValue::Text(_) => 1,
            CellValue::Missing => 2,
        }
    }
    match (lhs, rhs) {
        (CellValue::Number(a), CellValue::Number(b)) => a.total_cmp(b),
        (CellValue::Text(a), CellValue::Text(b)) => a.cmp(b),
        _ => rank(lhs).cmp(&rank(rhs)),
    }
}
