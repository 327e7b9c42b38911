use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use anyhow::{bail, Context, Result};
use arrow::array::Array;
use arrow::util::display::array_value_to_string;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::catalog::AttributeCatalog;

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load an attribute catalog from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.json`    – `{ "gender": ["male", "female"], ... }` or a records array
/// * `.csv`     – one column per attribute, one record per row
/// * `.parquet` – one column per attribute (any scalar type)
pub fn load_file(path: &Path) -> Result<AttributeCatalog> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let catalog = match ext.as_str() {
        "json" => load_json(path)?,
        "csv" => load_csv(path)?,
        "parquet" | "pq" => load_parquet(path)?,
        other => bail!("Unsupported file extension: .{other}"),
    };
    log::info!(
        "Loaded catalog with {} attributes from {}",
        catalog.len(),
        path.display()
    );
    Ok(catalog)
}

// ---------------------------------------------------------------------------
// Distinct value collection
// ---------------------------------------------------------------------------

/// Collects distinct values per attribute, keeping first-seen order.
#[derive(Default)]
struct DistinctColumns {
    columns: BTreeMap<String, (Vec<String>, HashSet<String>)>,
}

impl DistinctColumns {
    /// Make sure an attribute exists even if it never gets a value.
    fn touch(&mut self, column: &str) {
        self.columns.entry(column.to_string()).or_default();
    }

    fn push(&mut self, column: &str, value: String) {
        let (ordered, seen) = self.columns.entry(column.to_string()).or_default();
        if seen.insert(value.clone()) {
            ordered.push(value);
        }
    }

    fn into_catalog(self) -> AttributeCatalog {
        self.columns
            .into_iter()
            .map(|(col, (ordered, _))| (col, ordered))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Two accepted shapes:
///
/// ```json
/// { "gender": ["male", "female"], "age": [18, 21, 40] }
/// ```
///
/// ```json
/// [ { "gender": "male", "age": 18 }, { "gender": "female", "age": 21 } ]
/// ```
fn load_json(path: &Path) -> Result<AttributeCatalog> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;
    catalog_from_json(&root)
}

/// Build a catalog from an already parsed JSON document.
pub fn catalog_from_json(root: &JsonValue) -> Result<AttributeCatalog> {
    let mut columns = DistinctColumns::default();

    match root {
        JsonValue::Object(obj) => {
            for (key, val) in obj {
                let values = val
                    .as_array()
                    .with_context(|| format!("Attribute '{key}' is not an array of values"))?;
                columns.touch(key);
                for v in values {
                    if let Some(s) = json_scalar_to_string(v) {
                        columns.push(key, s);
                    }
                }
            }
        }
        JsonValue::Array(records) => {
            for (i, rec) in records.iter().enumerate() {
                let obj = rec
                    .as_object()
                    .with_context(|| format!("Row {i} is not a JSON object"))?;
                for (key, val) in obj {
                    columns.touch(key);
                    if let Some(s) = json_scalar_to_string(val) {
                        columns.push(key, s);
                    }
                }
            }
        }
        _ => bail!("Expected a JSON object or an array of records"),
    }

    Ok(columns.into_catalog())
}

fn json_scalar_to_string(val: &JsonValue) -> Option<String> {
    match val {
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Null => None,
        other => Some(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with attribute names, one record per row.
/// Empty cells are skipped.
fn load_csv(path: &Path) -> Result<AttributeCatalog> {
    let reader = csv::Reader::from_path(path).context("opening CSV")?;
    catalog_from_csv(reader)
}

fn catalog_from_csv<R: std::io::Read>(mut reader: csv::Reader<R>) -> Result<AttributeCatalog> {
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut columns = DistinctColumns::default();
    for h in &headers {
        columns.touch(h);
    }

    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        for (col_idx, value) in record.iter().enumerate() {
            let Some(col_name) = headers.get(col_idx) else {
                continue;
            };
            if !value.is_empty() {
                columns.push(col_name, value.to_string());
            }
        }
    }

    Ok(columns.into_catalog())
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file; every column becomes an attribute and each non-null
/// cell contributes its display text.
fn load_parquet(path: &Path) -> Result<AttributeCatalog> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut columns = DistinctColumns::default();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let schema = batch.schema();

        for (col_idx, field) in schema.fields().iter().enumerate() {
            let name = field.name();
            columns.touch(name);
            let col = batch.column(col_idx);
            for row in 0..batch.num_rows() {
                if col.is_null(row) {
                    continue;
                }
                let text = array_value_to_string(col.as_ref(), row)
                    .with_context(|| format!("Row {row}: failed to read '{name}'"))?;
                columns.push(name, text);
            }
        }
    }

    Ok(columns.into_catalog())
}
