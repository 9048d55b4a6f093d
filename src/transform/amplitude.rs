use tracing::warn;

use crate::model::{CellValue, Column, ColumnRole, MeasurementKind, Sign, SweepTable};

/// Trough-to-peak amplitude of a wave, clipped at zero.
pub fn trough_to_peak(positive: f64, negative: f64) -> f64 {
    (positive - negative).max(0.0)
}

/// Adds a `Wave n Amplitude` column for every wave that has both a `Pn
/// Amplitude` and an `Nn Amplitude` column. Returns the waves derived.
pub fn derive_wave_amplitudes(table: &mut SweepTable) -> Vec<String> {
    let pairs: Vec<(String, usize, usize)> = table
        .columns
        .iter()
        .enumerate()
        .filter_map(|(positive, column)| match &column.role {
            ColumnRole::Measurement {
                sign: Sign::Positive,
                wave,
                kind: MeasurementKind::Amplitude,
            } => table
                .position_of_role(&ColumnRole::amplitude(Sign::Negative, wave))
                .map(|negative| (wave.clone(), positive, negative)),
            _ => None,
        })
        .collect();

    for (wave, positive, negative) in &pairs {
        let values = table
            .rows
            .iter()
            .map(|row| {
                let cell = |idx: usize| row.get(idx).unwrap_or(&CellValue::Missing);
                wave_amplitude(wave, cell(*positive), cell(*negative))
            })
            .collect();
        table.set_column(Column::derived_amplitude(wave), values);
    }

    pairs.into_iter().map(|(wave, _, _)| wave).collect()
}

fn wave_amplitude(wave: &str, positive: &CellValue, negative: &CellValue) -> CellValue {
    match (positive, negative) {
        (CellValue::Number(p), CellValue::Number(n)) => {
            if (p - n).is_nan() {
                CellValue::Missing
            } else {
                CellValue::Number(trough_to_peak(*p, *n))
            }
        }
        (CellValue::Text(_), _) | (_, CellValue::Text(_)) => {
            warn!(wave, "non-numeric peak value, wave amplitude left empty");
            CellValue::Missing
        }
        _ => CellValue::Missing,
    }
}
