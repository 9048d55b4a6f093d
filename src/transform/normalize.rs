use crate::error::Result;
use crate::io::text_read::RawRecord;
use crate::model::{
    CORR_COEF_COLUMN, CellValue, Column, ColumnRole, FREQUENCY_COLUMN, ID_COLUMN, SweepTable,
    THRESHOLD_COLUMN, THRESHOLD_METHOD_COLUMN,
};
use crate::transform::metadata::{HeaderLayout, SessionMetadata};

/// Builds the sweep table of one export: promotes the column header row,
/// attaches the session attributes and coerces every cell.
pub fn normalize(
    record: &RawRecord,
    layout: &HeaderLayout,
    metadata: &SessionMetadata,
) -> Result<SweepTable> {
    let width = record.width();
    let header = record.row(layout.column_header_row).unwrap_or_default();
    let columns = (0..width)
        .map(|idx| Column::from_header(header.get(idx).map(String::as_str).unwrap_or_default()))
        .collect();

    let rows = (layout.column_header_row + 1..record.len())
        .map(|row| {
            (0..width)
                .map(|col| CellValue::coerce(record.cell(row, col).unwrap_or_default()))
                .collect()
        })
        .collect();

    let mut table = SweepTable::new(columns, rows);

    let constants = [
        (ID_COLUMN, ColumnRole::Identifier, metadata.identifier.as_str()),
        (THRESHOLD_COLUMN, ColumnRole::Session, metadata.threshold.as_str()),
        (FREQUENCY_COLUMN, ColumnRole::Session, metadata.frequency.as_str()),
        (
            THRESHOLD_METHOD_COLUMN,
            ColumnRole::Session,
            metadata.threshold_method.as_str(),
        ),
    ];
    for (name, role, value) in constants {
        let values = vec![CellValue::coerce(value); table.rows.len()];
        table.set_column(Column::with_role(name, role), values);
    }

    let corr_coef = table.require(CORR_COEF_COLUMN)?;
    for row in &mut table.rows {
        if row[corr_coef].is_missing() {
            row[corr_coef] = CellValue::Number(1.0);
        }
    }

    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ToolError;

    fn metadata() -> SessionMetadata {
        SessionMetadata {
            identifier: "M7".into(),
            threshold: "None".into(),
            frequency: "Clicks".into(),
            threshold_method: "None".into(),
        }
    }

    fn export(body: &[&str]) -> RawRecord {
        let mut lines = vec!["Threshold: None", "Frequency: 0.00", "Method: ", "", "", ""];
        lines.extend_from_slice(body);
        RawRecord::parse(&lines.join("\n"))
    }

    #[test]
    fn promotes_header_and_appends_session_columns() {
        let record = export(&[
            "Level\tCorrCoef\tP1 Latency,P1 Amplitude",
            "80\t0.91\t1.52,0.75",
            "70\t\t1.60,n/a",
        ]);
        let table = normalize(&record, &HeaderLayout::STANDARD, &metadata()).unwrap();

        let names: Vec<_> = table.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(
            names,
            [
                "Level",
                "CorrCoef",
                "P1 Latency",
                "P1 Amplitude",
                "ID",
                "Threshold",
                "Frequency",
                "Threshold method"
            ]
        );
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0][0], CellValue::Number(80.0));
        assert_eq!(table.rows[1][1], CellValue::Number(1.0));
        assert_eq!(table.rows[1][3], CellValue::Text("n/a".into()));
        assert_eq!(table.rows[1][4], CellValue::Text("M7".into()));
        assert_eq!(table.rows[0][5], CellValue::Text("None".into()));
    }

    #[test]
    fn numeric_threshold_is_coerced() {
        let record = export(&["Level\tCorrCoef", "30\t0.5"]);
        let mut metadata = metadata();
        metadata.threshold = "25".into();
        let table = normalize(&record, &HeaderLayout::STANDARD, &metadata).unwrap();
        let threshold = table.position(THRESHOLD_COLUMN).unwrap();
        assert_eq!(table.rows[0][threshold], CellValue::Number(25.0));
    }

    #[test]
    fn short_rows_are_padded_with_missing_cells() {
        let record = export(&["Level\tCorrCoef\tN1 Amplitude", "30"]);
        let table = normalize(&record, &HeaderLayout::STANDARD, &metadata()).unwrap();
        assert_eq!(table.rows[0][1], CellValue::Number(1.0));
        assert_eq!(table.rows[0][2], CellValue::Missing);
    }

    #[test]
    fn missing_corr_coef_is_fatal() {
        let record = export(&["Level\tP1 Amplitude", "30\t1.0"]);
        let error = normalize(&record, &HeaderLayout::STANDARD, &metadata()).unwrap_err();
        assert!(matches!(error, ToolError::MissingColumn(name) if name == "CorrCoef"));
    }
}
