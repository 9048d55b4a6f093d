use std::fs;
use std::path::Path;

use rust_xlsxwriter::{
    Color, ConditionalFormat3ColorScale, ConditionalFormatType, Table, TableColumn, TableStyle,
    Workbook,
};
use tracing::debug;

use crate::error::Result;
use crate::model::{CellValue, MasterTable};

/// Name of the single worksheet.
pub const SHEET_NAME: &str = "Sheet1";
/// Name of the table spanning the data range.
pub const TABLE_NAME: &str = "DataTable";
/// Characters added to the widest value of a column.
pub const COLUMN_PADDING: usize = 2;

const SCALE_MINIMUM: u32 = 0xF0F0F0;
const SCALE_MIDPOINT: u32 = 0xC8C8C8;
const SCALE_MAXIMUM: u32 = 0xA0A0A0;

/// Layout decisions for the merged sheet, computed before anything is written.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportPlan {
    /// Width of each column in characters.
    pub column_widths: Vec<usize>,
    /// Last row covered by the table. The header sits on row 0.
    pub last_row: u32,
    pub last_col: u16,
    /// Columns receiving the three-colour scale.
    pub color_scale_columns: Vec<u16>,
}

impl ExportPlan {
    pub fn for_table(master: &MasterTable) -> Self {
        let column_widths = master
            .columns
            .iter()
            .enumerate()
            .map(|(idx, column)| {
                let widest = master
                    .column_cells(idx)
                    .map(|cell| cell.to_string().chars().count())
                    .chain(std::iter::once(column.name.chars().count()))
                    .max()
                    .unwrap_or(0);
                widest + COLUMN_PADDING
            })
            .collect();

        let color_scale_columns = if master.rows.is_empty() {
            Vec::new()
        } else {
            (0..master.columns.len())
                .filter(|&idx| master.is_numeric(idx))
                .map(|idx| idx as u16)
                .collect()
        };

        Self {
            column_widths,
            // Excel tables need at least one data row.
            last_row: master.rows.len().max(1) as u32,
            last_col: (master.columns.len() as u16).saturating_sub(1),
            color_scale_columns,
        }
    }
}

/// Builds the merged workbook in memory.
pub fn build_workbook(master: &MasterTable) -> Result<Workbook> {
    let plan = ExportPlan::for_table(master);
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;

    for (col_idx, column) in master.columns.iter().enumerate() {
        worksheet.write_string(0, col_idx as u16, &column.name)?;
    }

    for (row_idx, row) in master.rows.iter().enumerate() {
        let row_num = (row_idx + 1) as u32;
        for (col_idx, cell) in row.iter().enumerate() {
            match cell {
                CellValue::Number(value) if value.is_finite() => {
                    worksheet.write_number(row_num, col_idx as u16, *value)?;
                }
                CellValue::Text(value) => {
                    worksheet.write_string(row_num, col_idx as u16, value)?;
                }
                _ => {}
            }
        }
    }

    for (col_idx, width) in plan.column_widths.iter().enumerate() {
        worksheet.set_column_width(col_idx as u16, *width as f64)?;
    }

    if master.columns.is_empty() {
        return Ok(workbook);
    }

    let columns: Vec<TableColumn> = master
        .columns
        .iter()
        .map(|column| TableColumn::new().set_header(&column.name))
        .collect();
    let mut table = Table::new();
    table
        .set_name(TABLE_NAME)
        .set_style(TableStyle::Light1)
        .set_banded_rows(true)
        .set_banded_columns(false)
        .set_first_column(false)
        .set_last_column(false)
        .set_columns(&columns);
    worksheet.add_table(0, 0, plan.last_row, plan.last_col, &table)?;

    for &col in &plan.color_scale_columns {
        let scale = ConditionalFormat3ColorScale::new()
            .set_minimum_color(Color::RGB(SCALE_MINIMUM))
            .set_midpoint(ConditionalFormatType::Percentile, 50)
            .set_midpoint_color(Color::RGB(SCALE_MIDPOINT))
            .set_maximum_color(Color::RGB(SCALE_MAXIMUM));
        worksheet.add_conditional_format(1, col, plan.last_row, col, &scale)?;
    }

    debug!(
        rows = master.rows.len(),
        columns = master.columns.len(),
        scaled_columns = plan.color_scale_columns.len(),
        "workbook laid out"
    );
    Ok(workbook)
}

/// Writes the merged workbook to `path`, replacing any existing file. The
/// workbook is serialised in full before the file is touched.
pub fn write_workbook(path: &Path, master: &MasterTable) -> Result<()> {
    let mut workbook = build_workbook(master)?;
    let buffer = workbook.save_to_buffer()?;
    fs::write(path, buffer)?;
    Ok(())
}
