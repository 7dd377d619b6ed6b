//! Batch file intake: explicit identifier-column resolution, identifier
//! validation, and deduplication, all before any job exists.

use std::collections::HashSet;
use std::io::Read;

use crate::verification::domain::{BusinessId, InvalidBusinessId};

/// Validation failures rejected before a job is created.
#[derive(Debug, thiserror::Error)]
pub enum BatchValidationError {
    #[error("row {row}: {source}")]
    MalformedIdentifier {
        row: usize,
        #[source]
        source: InvalidBusinessId,
    },
    #[error("no identifier column: no header mentions id/number and column 0 does not hold identifiers")]
    MissingIdentifierColumn,
    #[error("ambiguous identifier column: headers {candidates:?} all look like identifier columns")]
    AmbiguousIdentifierColumn { candidates: Vec<String> },
    #[error("batch contains no identifiers")]
    EmptyBatch,
    #[error("batch of {count} identifiers exceeds the maximum of {max}")]
    BatchTooLarge { count: usize, max: usize },
    #[error("unreadable batch file: {0}")]
    Csv(#[from] csv::Error),
}

/// Where the identifiers live in the parsed file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnResolution {
    /// A header row names the column; data starts on the next row.
    Header { column: usize },
    /// No header row; column 0 holds identifiers from the first row on.
    Headerless,
}

/// Resolve which column carries identifiers, or fail loudly. A header cell
/// containing "id" or "number" (case-insensitive) claims the column; exactly
/// one claim must win. A cell that is itself a well-formed identifier is
/// data, never a header, even when it happens to contain "id". Without any
/// claim, the first row must itself start with a well-formed identifier in
/// column 0 to count as headerless data.
pub fn resolve_identifier_column(first_row: &csv::StringRecord) -> Result<ColumnResolution, BatchValidationError> {
    let mut candidates: Vec<(usize, String)> = Vec::new();
    for (column, cell) in first_row.iter().enumerate() {
        if BusinessId::parse(cell).is_ok() {
            continue;
        }
        let lowered = cell.to_ascii_lowercase();
        if lowered.contains("id") || lowered.contains("number") {
            candidates.push((column, cell.to_string()));
        }
    }

    match candidates.len() {
        1 => Ok(ColumnResolution::Header {
            column: candidates[0].0,
        }),
        0 => {
            let looks_like_data = first_row
                .get(0)
                .map(|cell| BusinessId::parse(cell).is_ok())
                .unwrap_or(false);
            if looks_like_data {
                Ok(ColumnResolution::Headerless)
            } else {
                Err(BatchValidationError::MissingIdentifierColumn)
            }
        }
        _ => Err(BatchValidationError::AmbiguousIdentifierColumn {
            candidates: candidates.into_iter().map(|(_, name)| name).collect(),
        }),
    }
}

/// Parse a delimited batch file into validated, deduplicated identifiers in
/// first-seen order. `max_batch` caps the post-dedup size; oversized batches
/// are rejected outright, never truncated.
pub fn parse_identifiers<R: Read>(
    reader: R,
    max_batch: usize,
) -> Result<Vec<BusinessId>, BatchValidationError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut rows = csv_reader.records();
    let first_row = match rows.next() {
        Some(row) => row?,
        None => return Err(BatchValidationError::EmptyBatch),
    };
    let resolution = resolve_identifier_column(&first_row)?;

    let mut identifiers = Vec::new();
    let mut seen = HashSet::new();
    let mut push = |cell: &str, row: usize| -> Result<(), BatchValidationError> {
        if cell.is_empty() {
            return Ok(());
        }
        let id = BusinessId::parse(cell)
            .map_err(|source| BatchValidationError::MalformedIdentifier { row, source })?;
        if seen.insert(id.clone()) {
            identifiers.push(id);
        }
        Ok(())
    };

    let column = match resolution {
        ColumnResolution::Headerless => {
            if let Some(cell) = first_row.get(0) {
                push(cell, 1)?;
            }
            0
        }
        ColumnResolution::Header { column } => column,
    };

    for (offset, row) in rows.enumerate() {
        let row_number = offset + 2;
        let record = row?;
        if let Some(cell) = record.get(column) {
            push(cell, row_number)?;
        }
    }

    if identifiers.is_empty() {
        return Err(BatchValidationError::EmptyBatch);
    }
    if identifiers.len() > max_batch {
        return Err(BatchValidationError::BatchTooLarge {
            count: identifiers.len(),
            max: max_batch,
        });
    }
    Ok(identifiers)
}
