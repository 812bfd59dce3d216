use csv::{ReaderBuilder, StringRecord};
use std::{fs::File, io::Read, path::Path};

use crate::{
    error::{AppError, AppResult},
    models::Place,
};

const DRIVE_TIME_COLUMN: &str = "이동시간_분_차";
const WALK_TIME_COLUMN: &str = "이동시간_분_보행";

/// Column names of one source file, mapped onto the shared `Place` schema
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceSchema {
    pub label: &'static str,
    pub category: &'static str,
    pub name: &'static str,
    pub address: &'static str,
    pub drive_time: &'static str,
    pub walk_time: &'static str,
}

/// Tourist attraction source
pub const TOURISM_SCHEMA: SourceSchema = SourceSchema {
    label: "tourism",
    category: "구분",
    name: "명소명",
    address: "소재지",
    drive_time: DRIVE_TIME_COLUMN,
    walk_time: WALK_TIME_COLUMN,
};

/// Small business source
pub const BUSINESS_SCHEMA: SourceSchema = SourceSchema {
    label: "small_business",
    category: "상권업종소분류명",
    name: "상호명",
    address: "도로명주소",
    drive_time: DRIVE_TIME_COLUMN,
    walk_time: WALK_TIME_COLUMN,
};

/// Header positions of the schema columns inside one file
struct ColumnIndex {
    category: usize,
    name: usize,
    address: usize,
    drive_time: usize,
    walk_time: usize,
}

impl ColumnIndex {
    fn resolve(schema: &SourceSchema, headers: &StringRecord, source: &str) -> AppResult<Self> {
        let find = |column: &str| {
            headers
                .iter()
                .position(|h| h.trim_start_matches('\u{feff}').trim() == column)
                .ok_or_else(|| {
                    AppError::DataLoad(format!("{}: missing expected column {:?}", source, column))
                })
        };

        Ok(Self {
            category: find(schema.category)?,
            name: find(schema.name)?,
            address: find(schema.address)?,
            drive_time: find(schema.drive_time)?,
            walk_time: find(schema.walk_time)?,
        })
    }
}

/// Reads one source file into `Place` rows, preserving row order.
pub fn read_places_from_path(path: &Path, schema: &SourceSchema) -> AppResult<Vec<Place>> {
    let file = File::open(path).map_err(|e| {
        AppError::DataLoad(format!("failed to open {} ({}): {}", path.display(), schema.label, e))
    })?;
    read_places(file, schema, &path.display().to_string())
}

/// Reads CSV rows from any reader. `source` only labels error messages.
pub fn read_places<R: Read>(reader: R, schema: &SourceSchema, source: &str) -> AppResult<Vec<Place>> {
    let mut reader = ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = reader.headers()?.clone();
    let columns = ColumnIndex::resolve(schema, &headers, source)?;

    let mut places = Vec::new();
    for (row, record) in reader.records().enumerate() {
        let record = record?;
        // header is line 1
        let line = row + 2;

        let drive_time = numeric_cell(&record, columns.drive_time, schema.drive_time, source, line)?;
        let walk_time = numeric_cell(&record, columns.walk_time, schema.walk_time, source, line)?;

        places.push(Place::new(
            text_cell(&record, columns.category).map(str::to_string),
            text_cell(&record, columns.name).unwrap_or_default(),
            text_cell(&record, columns.address).unwrap_or_default(),
            drive_time,
            walk_time,
        ));
    }

    tracing::debug!(source = %source, rows = places.len(), "Source file read");

    Ok(places)
}

fn text_cell(record: &StringRecord, index: usize) -> Option<&str> {
    record
        .get(index)
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

fn numeric_cell(
    record: &StringRecord,
    index: usize,
    column: &str,
    source: &str,
    line: usize,
) -> AppResult<Option<f64>> {
    match text_cell(record, index) {
        None => Ok(None),
        Some(raw) => raw.parse::<f64>().map(Some).map_err(|_| {
            AppError::DataLoad(format!(
                "{}: line {}: column {:?} is not numeric: {:?}",
                source, line, column, raw
            ))
        }),
    }
}
