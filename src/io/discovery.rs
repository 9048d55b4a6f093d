use std::cmp::Ordering;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{Result, ToolError};

/// Extension of the instrument's text exports.
pub const EXPORT_EXTENSION: &str = ".txt";
/// Second file-name token of the click-stimulus export, ordered first in its series.
pub const CLICKS_TOKEN: &str = "Clicks-analyzed.txt";

/// Position of an export within the processing order.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepFileKey {
    /// First space-delimited token of the file name.
    pub series: String,
    /// Numeric value of the second token; clicks map to 0.
    pub order: f64,
    pub file_name: String,
}

impl SweepFileKey {
    /// Parses the ordering key out of a file name such as `M12 16 kHz-analyzed.txt`.
    pub fn parse(file_name: &str) -> Result<Self> {
        let mut tokens = file_name.split(' ');
        let series = tokens.next().unwrap_or_default().to_string();
        let second = tokens.next().ok_or_else(|| ToolError::InvalidFileName {
            file_name: file_name.to_string(),
            reason: "expected a space-separated second token".to_string(),
        })?;

        let order = if second == CLICKS_TOKEN {
            0.0
        } else {
            let numeric = second.split('.').next().unwrap_or_default();
            numeric
                .trim()
                .parse::<f64>()
                .map_err(|_| ToolError::InvalidFileName {
                    file_name: file_name.to_string(),
                    reason: format!("'{second}' does not start with a number"),
                })?
        };

        Ok(Self {
            series,
            order,
            file_name: file_name.to_string(),
        })
    }
}

impl Eq for SweepFileKey {}

impl PartialOrd for SweepFileKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SweepFileKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.series
            .cmp(&other.series)
            .then_with(|| self.order.total_cmp(&other.order))
            .then_with(|| self.file_name.cmp(&other.file_name))
    }
}

/// Lists the exports in `directory` in processing order. Symbolic links to
/// files count as exports.
pub fn discover_exports(directory: &Path) -> Result<Vec<PathBuf>> {
    let mut keyed = Vec::new();
    for entry in fs::read_dir(directory)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let Some(os_name) = path.file_name() else {
            continue;
        };
        let name = match os_name.to_str() {
            Some(name) => name.to_string(),
            None => {
                let lossy = os_name.to_string_lossy().into_owned();
                warn!(file = %path.display(), "file name is not valid UTF-8, ordering by '{lossy}'");
                lossy
            }
        };
        if name.ends_with(EXPORT_EXTENSION) {
            keyed.push((SweepFileKey::parse(&name)?, path));
        }
    }

    keyed.sort_by(|(left, _), (right, _)| left.cmp(right));
    debug!(file_count = keyed.len(), directory = %directory.display(), "discovered exports");
    Ok(keyed.into_iter().map(|(_, path)| path).collect())
}

/// Sorts export file names by series, then frequency, clicks first.
pub fn order_file_names<I, S>(names: I) -> Result<Vec<String>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut keys = names
        .into_iter()
        .map(|name| SweepFileKey::parse(name.as_ref()))
        .collect::<Result<Vec<_>>>()?;
    keys.sort();
    Ok(keys.into_iter().map(|key| key.file_name).collect())
}
