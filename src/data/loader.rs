use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::array::{
    Array, AsArray, BooleanArray, Float32Array, Float64Array, Int32Array, Int64Array, StringArray,
};
use arrow::datatypes::DataType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;
use thiserror::Error;

use super::model::{Field, OwnerDataset, OwnerRecord};

// ---------------------------------------------------------------------------
// LoadError
// ---------------------------------------------------------------------------

/// Loading is all-or-nothing: any of these aborts the load and the previous
/// dataset (if any) stays in place.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported file extension: .{0}")]
    UnsupportedExtension(String),

    /// Every schema column is required: each one feeds a filter or a chart.
    #[error("missing required column '{0}'")]
    MissingColumn(&'static str),

    #[error("row {row}, column '{column}': {message}")]
    BadValue {
        row: usize,
        column: &'static str,
        message: String,
    },

    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed parquet: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("malformed parquet data: {0}")]
    Arrow(#[from] arrow::error::ArrowError),
}

fn bad_value(row: usize, field: Field, message: impl Into<String>) -> LoadError {
    LoadError::BadValue {
        row,
        column: field.column(),
        message: message.into(),
    }
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load an owner dataset from a file.  Dispatch by extension.
///
/// Supported formats, all carrying the same row-oriented schema:
/// * `.csv`     – canonical: header row + one row per owner
/// * `.json`    – records-oriented array: `[{ "OwnerID": "O001", ... }, ...]`
/// * `.parquet` – scalar columns, one row per owner
///
/// Headers may use either the canonical CamelCase names or the
/// flattened-lowercase aliases (see [`Field`]); unknown columns are ignored.
pub fn load_file(path: &Path) -> Result<OwnerDataset, LoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" => load_csv(path),
        "json" => load_json(path),
        "parquet" | "pq" => load_parquet(path),
        other => Err(LoadError::UnsupportedExtension(other.to_string())),
    }
}

// ---------------------------------------------------------------------------
// Shared cell parsing
// ---------------------------------------------------------------------------

/// "Yes"/"No" (any ASCII case) to bool.
fn parse_yes_no(s: &str) -> Option<bool> {
    if s.eq_ignore_ascii_case("yes") {
        Some(true)
    } else if s.eq_ignore_ascii_case("no") {
        Some(false)
    } else {
        None
    }
}

fn parse_f64(s: &str, row: usize, field: Field) -> Result<f64, LoadError> {
    s.trim()
        .parse::<f64>()
        .map_err(|_| bad_value(row, field, format!("'{s}' is not a number")))
}

/// Counts and ages arrive as "47" from the generator but as 47.0 from JSON
/// round trips; accept both, reject negatives and fractions.
fn to_u32(v: f64, row: usize, field: Field) -> Result<u32, LoadError> {
    if v.is_finite() && v >= 0.0 && v.fract() == 0.0 && v <= u32::MAX as f64 {
        Ok(v as u32)
    } else {
        Err(bad_value(
            row,
            field,
            format!("'{v}' is not a non-negative integer"),
        ))
    }
}

fn parse_u32(s: &str, row: usize, field: Field) -> Result<u32, LoadError> {
    to_u32(parse_f64(s, row, field)?, row, field)
}

// ---------------------------------------------------------------------------
// CSV loader (canonical format)
// ---------------------------------------------------------------------------

/// Map every schema field to a header position, first match wins. Fails on
/// the first field no header resolves to.
fn resolve_columns(headers: &[String]) -> Result<BTreeMap<Field, usize>, LoadError> {
    let mut columns = BTreeMap::new();
    for (i, header) in headers.iter().enumerate() {
        if let Some(field) = Field::from_header(header) {
            columns.entry(field).or_insert(i);
        }
    }
    for field in Field::ALL {
        if !columns.contains_key(&field) {
            return Err(LoadError::MissingColumn(field.column()));
        }
    }
    Ok(columns)
}

fn load_csv(path: &Path) -> Result<OwnerDataset, LoadError> {
    let file = std::fs::File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut reader = csv::Reader::from_reader(file);

    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();
    let columns = resolve_columns(&headers)?;

    let mut records = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let row = result?;
        let cell = |field: Field| row.get(columns[&field]).unwrap_or("");
        records.push(owner_from_cells(row_no, cell)?);
    }

    Ok(OwnerDataset::from_records(records))
}

/// Build one record from string cells; shared by the CSV path and by any
/// caller that can hand over header-resolved cells.
fn owner_from_cells<'a, F>(row: usize, cell: F) -> Result<OwnerRecord, LoadError>
where
    F: Fn(Field) -> &'a str,
{
    let modified_cell = cell(Field::Modified);
    let modified = parse_yes_no(modified_cell)
        .ok_or_else(|| bad_value(row, Field::Modified, format!("'{modified_cell}' is not Yes/No")))?;

    Ok(OwnerRecord {
        owner_id: cell(Field::OwnerId).to_string(),
        gender: cell(Field::Gender).to_string(),
        ethnicity: cell(Field::Ethnicity).to_string(),
        age: parse_u32(cell(Field::Age), row, Field::Age)?,
        income: parse_f64(cell(Field::Income), row, Field::Income)?,
        occupation: cell(Field::Occupation).to_string(),
        make: cell(Field::Make).to_string(),
        model: cell(Field::Model).to_string(),
        car_age: parse_u32(cell(Field::CarAge), row, Field::CarAge)?,
        engine_size: parse_f64(cell(Field::EngineSize), row, Field::EngineSize)?,
        body_style: cell(Field::BodyStyle).to_string(),
        cost: parse_f64(cell(Field::Cost), row, Field::Cost)?,
        fuel_type: cell(Field::FuelType).to_string(),
        driving_style: cell(Field::DrivingStyle).to_string(),
        modified,
        mileage_per_year: parse_u32(cell(Field::MileagePerYear), row, Field::MileagePerYear)?,
        service_visits: parse_u32(cell(Field::ServiceVisits), row, Field::ServiceVisits)?,
        number_of_owners: parse_u32(cell(Field::NumberOfOwners), row, Field::NumberOfOwners)?,
    })
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected schema: records orientation, the default
/// `df.to_json(orient='records')` shape:
///
/// ```json
/// [
///   { "OwnerID": "O001", "Gender": "Female", "Age": 34, ... },
///   ...
/// ]
/// ```
fn load_json(path: &Path) -> Result<OwnerDataset, LoadError> {
    let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let root: JsonValue = serde_json::from_str(&text)?;

    let rows = root.as_array().ok_or_else(|| LoadError::BadValue {
        row: 0,
        column: "",
        message: "expected a top-level JSON array of records".to_string(),
    })?;

    let mut records = Vec::with_capacity(rows.len());
    for (row_no, value) in rows.iter().enumerate() {
        let obj = value.as_object().ok_or_else(|| LoadError::BadValue {
            row: row_no,
            column: "",
            message: "row is not a JSON object".to_string(),
        })?;
        records.push(owner_from_json(row_no, obj)?);
    }

    Ok(OwnerDataset::from_records(records))
}

fn json_field<'a>(
    obj: &'a serde_json::Map<String, JsonValue>,
    field: Field,
) -> Option<&'a JsonValue> {
    obj.get(field.column())
        .or_else(|| field.aliases().iter().find_map(|alias| obj.get(*alias)))
}

fn owner_from_json(
    row: usize,
    obj: &serde_json::Map<String, JsonValue>,
) -> Result<OwnerRecord, LoadError> {
    let value = |field: Field| -> Result<&JsonValue, LoadError> {
        json_field(obj, field).ok_or(LoadError::MissingColumn(field.column()))
    };
    let string = |field: Field| -> Result<String, LoadError> {
        value(field)?
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| bad_value(row, field, "expected a string"))
    };
    let number = |field: Field| -> Result<f64, LoadError> {
        value(field)?
            .as_f64()
            .ok_or_else(|| bad_value(row, field, "expected a number"))
    };
    let count = |field: Field| -> Result<u32, LoadError> { to_u32(number(field)?, row, field) };

    // Modified travels either as "Yes"/"No" or as a plain JSON bool.
    let modified = match value(Field::Modified)? {
        JsonValue::Bool(b) => *b,
        JsonValue::String(s) => parse_yes_no(s)
            .ok_or_else(|| bad_value(row, Field::Modified, format!("'{s}' is not Yes/No")))?,
        other => return Err(bad_value(row, Field::Modified, format!("'{other}' is not Yes/No"))),
    };

    Ok(OwnerRecord {
        owner_id: string(Field::OwnerId)?,
        gender: string(Field::Gender)?,
        ethnicity: string(Field::Ethnicity)?,
        age: count(Field::Age)?,
        income: number(Field::Income)?,
        occupation: string(Field::Occupation)?,
        make: string(Field::Make)?,
        model: string(Field::Model)?,
        car_age: count(Field::CarAge)?,
        engine_size: number(Field::EngineSize)?,
        body_style: string(Field::BodyStyle)?,
        cost: number(Field::Cost)?,
        fuel_type: string(Field::FuelType)?,
        driving_style: string(Field::DrivingStyle)?,
        modified,
        mileage_per_year: count(Field::MileagePerYear)?,
        service_visits: count(Field::ServiceVisits)?,
        number_of_owners: count(Field::NumberOfOwners)?,
    })
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a parquet file of scalar owner columns.  Works with files written
/// by Pandas (`df.to_parquet()`), Polars (`df.write_parquet()`) and our own
/// generator.
fn load_parquet(path: &Path) -> Result<OwnerDataset, LoadError> {
    let file = std::fs::File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
    let reader = builder.build()?;

    let mut records = Vec::new();
    let mut row_base = 0usize;

    for batch_result in reader {
        let batch = batch_result?;
        let schema = batch.schema();

        // Resolve schema columns once per batch, first match wins.
        let mut columns: BTreeMap<Field, usize> = BTreeMap::new();
        for (i, f) in schema.fields().iter().enumerate() {
            if let Some(field) = Field::from_header(f.name()) {
                columns.entry(field).or_insert(i);
            }
        }
        for field in Field::ALL {
            if !columns.contains_key(&field) {
                return Err(LoadError::MissingColumn(field.column()));
            }
        }

        for row in 0..batch.num_rows() {
            let row_no = row_base + row;
            let col = |field: Field| batch.column(columns[&field]);

            let string = |field: Field| extract_string(col(field), row, row_no, field);
            let number = |field: Field| extract_f64(col(field), row, row_no, field);
            let count =
                |field: Field| -> Result<u32, LoadError> { to_u32(number(field)?, row_no, field) };

            records.push(OwnerRecord {
                owner_id: string(Field::OwnerId)?,
                gender: string(Field::Gender)?,
                ethnicity: string(Field::Ethnicity)?,
                age: count(Field::Age)?,
                income: number(Field::Income)?,
                occupation: string(Field::Occupation)?,
                make: string(Field::Make)?,
                model: string(Field::Model)?,
                car_age: count(Field::CarAge)?,
                engine_size: number(Field::EngineSize)?,
                body_style: string(Field::BodyStyle)?,
                cost: number(Field::Cost)?,
                fuel_type: string(Field::FuelType)?,
                driving_style: string(Field::DrivingStyle)?,
                modified: extract_modified(col(Field::Modified), row, row_no)?,
                mileage_per_year: count(Field::MileagePerYear)?,
                service_visits: count(Field::ServiceVisits)?,
                number_of_owners: count(Field::NumberOfOwners)?,
            });
        }
        row_base += batch.num_rows();
    }

    Ok(OwnerDataset::from_records(records))
}

// -- Arrow column helpers --

fn extract_string(
    col: &Arc<dyn Array>,
    row: usize,
    row_no: usize,
    field: Field,
) -> Result<String, LoadError> {
    if col.is_null(row) {
        return Err(bad_value(row_no, field, "null value"));
    }
    match col.data_type() {
        DataType::Utf8 => {
            let arr = col
                .as_any()
                .downcast_ref::<StringArray>()
                .ok_or_else(|| bad_value(row_no, field, "expected StringArray"))?;
            Ok(arr.value(row).to_string())
        }
        DataType::LargeUtf8 => Ok(col.as_string::<i64>().value(row).to_string()),
        other => Err(bad_value(
            row_no,
            field,
            format!("expected a string column, got {other:?}"),
        )),
    }
}

fn extract_f64(
    col: &Arc<dyn Array>,
    row: usize,
    row_no: usize,
    field: Field,
) -> Result<f64, LoadError> {
    if col.is_null(row) {
        return Err(bad_value(row_no, field, "null value"));
    }
    match col.data_type() {
        DataType::Int32 => Ok(col.as_any().downcast_ref::<Int32Array>().unwrap().value(row) as f64),
        DataType::Int64 => Ok(col.as_any().downcast_ref::<Int64Array>().unwrap().value(row) as f64),
        DataType::Float32 => {
            Ok(col.as_any().downcast_ref::<Float32Array>().unwrap().value(row) as f64)
        }
        DataType::Float64 => Ok(col.as_any().downcast_ref::<Float64Array>().unwrap().value(row)),
        other => Err(bad_value(
            row_no,
            field,
            format!("expected a numeric column, got {other:?}"),
        )),
    }
}

/// The modified flag is Utf8 "Yes"/"No" in generator output but a Boolean
/// column in files written from typed frames; accept both.
fn extract_modified(col: &Arc<dyn Array>, row: usize, row_no: usize) -> Result<bool, LoadError> {
    if col.is_null(row) {
        return Err(bad_value(row_no, Field::Modified, "null value"));
    }
    match col.data_type() {
        DataType::Boolean => Ok(col
            .as_any()
            .downcast_ref::<BooleanArray>()
            .unwrap()
            .value(row)),
        DataType::Utf8 | DataType::LargeUtf8 => {
            let s = extract_string(col, row, row_no, Field::Modified)?;
            parse_yes_no(&s)
                .ok_or_else(|| bad_value(row_no, Field::Modified, format!("'{s}' is not Yes/No")))
        }
        other => Err(bad_value(
            row_no,
            Field::Modified,
            format!("expected Yes/No or boolean, got {other:?}"),
        )),
    }
}
