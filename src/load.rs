use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::clean::{clean_records, CleaningParams};
use crate::error::Result;
use crate::models::CategoryTable;
use crate::raw_types::{ColumnMap, RawRecord};

/// Load one category file from disk.
pub fn load_category_path(category: &str, path: &Path, params: &CleaningParams) -> Result<CategoryTable> {
    debug!("Opening category source - category={}, path={}", category, path.display());
    let file = File::open(path)?;
    load_category(category, file, params)
}

/// Read, validate and clean one category table.
///
/// Fails with `DashboardError::Schema` when a required column is absent.
/// Rows the CSV reader cannot parse are skipped; bad cells inside a
/// parsed row degrade to defaults, and invalid UTF-8 is replaced lossily.
pub fn load_category<R: Read>(category: &str, source: R, params: &CleaningParams) -> Result<CategoryTable> {
    let start = std::time::Instant::now();

    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(source);

    let columns = ColumnMap::from_headers(category, rdr.headers()?)?;

    let mut raw: Vec<RawRecord> = Vec::new();
    let mut skipped = 0usize;
    for (line, result) in rdr.byte_records().enumerate() {
        match result {
            Ok(row) => {
                if std::str::from_utf8(row.as_slice()).is_err() {
                    warn!("Row is not valid UTF-8, decoding lossily - category={}, row={}", category, line + 1);
                }
                raw.push(columns.extract(&row));
            }
            Err(e) => {
                warn!("Skipping malformed row - category={}, row={}, error={}", category, line + 1, e);
                skipped += 1;
            }
        }
    }

    let raw_rows = raw.len();
    let cleaned = clean_records(&raw, columns.has_duration(), params);

    info!(
        "Category load completed - category={}, duration={:.2}s, raw_rows={}, skipped={}, records={}, durations={}",
        category,
        start.elapsed().as_secs_f32(),
        raw_rows,
        skipped,
        cleaned.records.len(),
        columns.has_duration()
    );

    Ok(CategoryTable {
        name: category.to_string(),
        records: cleaned.records,
        duration_buckets: cleaned.duration_buckets,
    })
}
