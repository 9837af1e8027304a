use csv::{ReaderBuilder, StringRecord, Trim};
use serde::de::DeserializeOwned;

use crate::GtfsInputError;

/// A row that was readable as CSV but did not fit the record type; it is left out of `rows`.
#[derive(Debug, Clone, PartialEq)]
pub struct MalformedRow {
    pub row_number: u64,
    /// Header of the offending column, when the parser could tell.
    pub field: Option<String>,
    pub message: String,
}

/// Rows of one GTFS file together with their CSV line numbers.
#[derive(Debug, Clone)]
pub struct CsvTable<T> {
    pub headers: Vec<String>,
    pub rows: Vec<T>,
    pub row_numbers: Vec<u64>,
    pub malformed_rows: Vec<MalformedRow>,
}

impl<T> Default for CsvTable<T> {
    fn default() -> Self {
        Self {
            headers: Vec::new(),
            rows: Vec::new(),
            row_numbers: Vec::new(),
            malformed_rows: Vec::new(),
        }
    }
}

impl<T> CsvTable<T> {
    /// Builds a table as if `rows` followed a header line.
    pub fn from_rows(rows: Vec<T>) -> Self {
        let row_numbers = (0..rows.len() as u64).map(|index| index + 2).collect();
        Self {
            headers: Vec::new(),
            rows,
            row_numbers,
            malformed_rows: Vec::new(),
        }
    }

    /// 1-based line of the row in its file; the header is line 1.
    pub fn row_number(&self, index: usize) -> u64 {
        self.row_numbers
            .get(index)
            .copied()
            .unwrap_or(index as u64 + 2)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.rows.iter()
    }
}

/// Header and IO failures are errors. Rows that are not UTF-8 or whose cells
/// do not deserialize are skipped and recorded in `malformed_rows`.
pub fn parse_csv_table<T: DeserializeOwned>(
    file: &str,
    data: &[u8],
) -> Result<CsvTable<T>, GtfsInputError> {
    let mut reader = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_reader(strip_utf8_bom(data));

    let csv_error = |source: csv::Error| GtfsInputError::Csv {
        file: file.to_string(),
        source,
    };

    let header_record: StringRecord = reader.headers().map_err(csv_error)?.clone();
    let headers: Vec<String> = header_record.iter().map(str::to_string).collect();

    let mut rows = Vec::new();
    let mut row_numbers = Vec::new();
    let mut malformed_rows = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let record = match record {
            Ok(record) => record,
            Err(err) if matches!(err.kind(), csv::ErrorKind::Utf8 { .. }) => {
                let row_number = err
                    .position()
                    .map(|position| position.line())
                    .unwrap_or(index as u64 + 2);
                malformed_rows.push(malformed_row(row_number, &headers, &err));
                continue;
            }
            Err(err) => return Err(csv_error(err)),
        };
        if record.iter().all(|field| field.is_empty()) {
            continue;
        }
        let row_number = record
            .position()
            .map(|position| position.line())
            .unwrap_or(index as u64 + 2);
        let parsed: Result<T, csv::Error> = record.deserialize(Some(&header_record));
        match parsed {
            Ok(row) => {
                rows.push(row);
                row_numbers.push(row_number);
            }
            Err(err) => {
                tracing::debug!("{} row {} skipped: {}", file, row_number, err);
                malformed_rows.push(malformed_row(row_number, &headers, &err));
            }
        }
    }

    Ok(CsvTable {
        headers,
        rows,
        row_numbers,
        malformed_rows,
    })
}

fn malformed_row(row_number: u64, headers: &[String], err: &csv::Error) -> MalformedRow {
    match err.kind() {
        csv::ErrorKind::Deserialize { err, .. } => MalformedRow {
            row_number,
            field: err
                .field()
                .and_then(|index| headers.get(index as usize))
                .cloned(),
            message: err.kind().to_string(),
        },
        _ => MalformedRow {
            row_number,
            field: None,
            message: err.to_string(),
        },
    }
}

fn strip_utf8_bom(data: &[u8]) -> &[u8] {
    data.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(data)
}
