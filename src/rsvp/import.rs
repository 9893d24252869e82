//! Bulk guest import from delimited text and spreadsheet files.
//!
//! The first row is the header. Columns are matched case-insensitively
//! against a small set of aliases; unknown columns are ignored. Data rows are
//! numbered from 1 and wholly blank rows are skipped.

use std::io::Cursor;

use calamine::{Data, Reader, open_workbook_auto_from_rs};
use metrics::counter;
use sea_orm::{ConnectionTrait, TransactionTrait};
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::{ApiError, RepositoryError, validation_error};
use crate::repositories::guest::NewGuest;
use crate::repositories::{GuestRepository, TenantScope};

/// Supported upload formats, chosen by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportFormat {
    Csv,
    Tsv,
    Spreadsheet,
}

impl ImportFormat {
    pub fn from_filename(filename: &str) -> Option<Self> {
        let (_, ext) = filename.rsplit_once('.')?;
        match ext.to_ascii_lowercase().as_str() {
            "csv" => Some(ImportFormat::Csv),
            "tsv" | "txt" => Some(ImportFormat::Tsv),
            "xlsx" | "xls" | "ods" => Some(ImportFormat::Spreadsheet),
            _ => None,
        }
    }
}

/// A problem with one data row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct RowError {
    /// 1-based data row number (the header is not counted)
    pub row: usize,
    pub field: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedImport {
    pub guests: Vec<NewGuest>,
    pub errors: Vec<RowError>,
}

/// Outcome reported back to the uploader
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ImportSummary {
    pub parsed: usize,
    pub inserted: u64,
    pub skipped_duplicates: u64,
    pub errors: Vec<RowError>,
}

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("unsupported file type '{0}', expected .csv, .tsv, .txt, .xlsx, .xls or .ods")]
    UnsupportedFormat(String),
    #[error("the file has no header row")]
    MissingHeader,
    #[error("the header row has no name column")]
    MissingNameColumn,
    #[error("the header row is not valid UTF-8")]
    UndecodableHeader,
    #[error("could not read delimited file: {0}")]
    Csv(#[from] csv::Error),
    #[error("could not read spreadsheet: {0}")]
    Spreadsheet(String),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        match err {
            ImportError::Repository(err) => err.into(),
            other => validation_error(
                "Import file could not be read",
                serde_json::json!({ "errors": [{ "field": "file", "message": other.to_string() }] }),
            ),
        }
    }
}

#[derive(Debug, Default)]
struct ColumnMap {
    name: Option<usize>,
    email: Option<usize>,
    phone: Option<usize>,
    party: Option<usize>,
    party_size: Option<usize>,
}

impl ColumnMap {
    fn from_header(header: &[String]) -> Self {
        let mut map = ColumnMap::default();
        for (index, raw) in header.iter().enumerate() {
            let normalized = raw
                .trim_start_matches('\u{feff}')
                .trim()
                .to_lowercase()
                .replace(['_', '-'], " ");
            let slot = match normalized.as_str() {
                "name" | "guest name" | "full name" => &mut map.name,
                "email" | "email address" => &mut map.email,
                "phone" | "phone number" => &mut map.phone,
                "party" | "group" | "household" => &mut map.party,
                "party size" | "size" | "headcount" => &mut map.party_size,
                _ => continue,
            };
            slot.get_or_insert(index);
        }
        map
    }
}

fn cell(row: &[String], index: Option<usize>) -> Option<String> {
    let value = row.get(index?)?.trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// A decoded input row, or why the row could not be decoded.
pub type RawRow = Result<Vec<String>, String>;

/// Turn a header row plus data rows into guests and per-row errors.
pub fn parse_rows<I>(mut rows: I) -> Result<ParsedImport, ImportError>
where
    I: Iterator<Item = RawRow>,
{
    let header = rows
        .next()
        .ok_or(ImportError::MissingHeader)?
        .map_err(|_| ImportError::UndecodableHeader)?;
    let columns = ColumnMap::from_header(&header);
    if columns.name.is_none() {
        return Err(ImportError::MissingNameColumn);
    }

    let mut parsed = ParsedImport::default();
    for (offset, row) in rows.enumerate() {
        let row_number = offset + 1;
        let row = match row {
            Ok(row) => row,
            Err(message) => {
                parsed.errors.push(RowError {
                    row: row_number,
                    field: "row".to_string(),
                    message,
                });
                continue;
            }
        };
        if row.iter().all(|value| value.trim().is_empty()) {
            continue;
        }

        let Some(name) = cell(&row, columns.name) else {
            parsed.errors.push(RowError {
                row: row_number,
                field: "name".to_string(),
                message: "Name is required".to_string(),
            });
            continue;
        };

        let party_size = match cell(&row, columns.party_size) {
            None => 1,
            Some(raw) => match parse_party_size(&raw) {
                Some(size) => size,
                None => {
                    parsed.errors.push(RowError {
                        row: row_number,
                        field: "party_size".to_string(),
                        message: format!("'{raw}' is not a whole number of at least 1"),
                    });
                    continue;
                }
            },
        };

        let guest = NewGuest {
            name,
            email: cell(&row, columns.email),
            phone: cell(&row, columns.phone),
            party: cell(&row, columns.party),
            party_size,
        };
        let problems = guest.validate();
        if problems.is_empty() {
            parsed.guests.push(guest);
        } else {
            parsed
                .errors
                .extend(problems.into_iter().map(|problem| RowError {
                    row: row_number,
                    field: problem.field,
                    message: problem.message,
                }));
        }
    }

    Ok(parsed)
}

fn parse_party_size(raw: &str) -> Option<i32> {
    let size = match raw.parse::<i64>() {
        Ok(whole) => i32::try_from(whole).ok()?,
        Err(_) => {
            let float = raw.parse::<f64>().ok()?;
            if float.fract() != 0.0 || !(1.0..=f64::from(i32::MAX)).contains(&float) {
                return None;
            }
            float as i32
        }
    };
    (size >= 1).then_some(size)
}

fn delimited_rows(bytes: &[u8], delimiter: u8) -> Result<Vec<RawRow>, ImportError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);

    let mut rows = Vec::new();
    for record in reader.byte_records() {
        let record = record?;
        let row = record
            .iter()
            .map(|field| std::str::from_utf8(field).map(str::to_string))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| "Row is not valid UTF-8; re-save the file as UTF-8".to_string());
        rows.push(row);
    }
    Ok(rows)
}

fn cell_text(value: &Data) -> String {
    match value {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(f) if f.fract() == 0.0 => format!("{}", *f as i64),
        other => other.to_string(),
    }
}

fn spreadsheet_rows(bytes: &[u8]) -> Result<Vec<RawRow>, ImportError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
        .map_err(|err| ImportError::Spreadsheet(err.to_string()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(ImportError::MissingHeader)?
        .map_err(|err| ImportError::Spreadsheet(err.to_string()))?;

    Ok(range
        .rows()
        .map(|row| Ok(row.iter().map(cell_text).collect()))
        .collect())
}

/// Parse an uploaded guest file according to its extension.
pub fn parse_guest_file(filename: &str, bytes: &[u8]) -> Result<ParsedImport, ImportError> {
    let format = ImportFormat::from_filename(filename)
        .ok_or_else(|| ImportError::UnsupportedFormat(filename.to_string()))?;
    let rows = match format {
        ImportFormat::Csv => delimited_rows(bytes, b',')?,
        ImportFormat::Tsv => delimited_rows(bytes, b'\t')?,
        ImportFormat::Spreadsheet => spreadsheet_rows(bytes)?,
    };
    parse_rows(rows.into_iter())
}

/// Parse the file and insert every valid row, skipping names already present.
pub async fn import_guests<C: ConnectionTrait + TransactionTrait>(
    db: &C,
    scope: TenantScope,
    filename: &str,
    bytes: &[u8],
) -> Result<ImportSummary, ImportError> {
    let ParsedImport { guests, errors } = parse_guest_file(filename, bytes)?;
    let parsed = guests.len();

    let txn = db.begin().await.map_err(RepositoryError::from)?;
    let inserted = GuestRepository::new(&txn)
        .insert_ignoring_duplicates(scope, guests)
        .await?;
    txn.commit().await.map_err(RepositoryError::from)?;
    let skipped_duplicates = parsed as u64 - inserted;

    counter!("guest_import_rows_total", "outcome" => "inserted").increment(inserted);
    counter!("guest_import_rows_total", "outcome" => "duplicate").increment(skipped_duplicates);
    counter!("guest_import_rows_total", "outcome" => "invalid").increment(errors.len() as u64);
    tracing::info!(
        wedding_id = %scope.wedding_id,
        parsed,
        inserted,
        skipped_duplicates,
        invalid = errors.len(),
        "Guest import finished"
    );

    Ok(ImportSummary {
        parsed,
        inserted,
        skipped_duplicates,
        errors,
    })
}
