// Copyright 2025 Keygraph Contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

use thiserror::Error;

use crate::tsv::{TsvDocument, TsvRow};

/// One co-occurrence row as returned by the query service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoOccurrenceRecord {
    pub keyword1: String,
    pub keyword2: String,
    pub amount: u64,
}

/// Why a single row was dropped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RowError {
    #[error("missing column {0}")]
    MissingColumn(&'static str),
    #[error("amount is not a non-negative integer: {0:?}")]
    InvalidAmount(String),
    #[error("frequency is not a non-negative integer: {0:?}")]
    InvalidFrequency(String),
}

/// A dropped row: 1-based data row number plus the reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRow {
    pub row: usize,
    pub error: RowError,
}

impl CoOccurrenceRecord {
    /// Read one record from a row. Fails on a missing column or an amount
    /// that does not parse as a non-negative integer.
    pub fn from_row(row: &TsvRow<'_>) -> Result<Self, RowError> {
        let keyword1 = row
            .get("keyword1")
            .ok_or(RowError::MissingColumn("keyword1"))?;
        let keyword2 = row
            .get("keyword2")
            .ok_or(RowError::MissingColumn("keyword2"))?;
        let raw_amount = row.get("amount").ok_or(RowError::MissingColumn("amount"))?;
        let amount = raw_amount
            .trim()
            .parse::<u64>()
            .map_err(|_| RowError::InvalidAmount(raw_amount.to_string()))?;
        Ok(Self {
            keyword1: keyword1.to_string(),
            keyword2: keyword2.to_string(),
            amount,
        })
    }
}

/// Extract every parseable co-occurrence record from a document. Rows that
/// fail are collected as diagnostics instead of aborting the batch.
pub fn co_occurrence_records(document: &TsvDocument) -> (Vec<CoOccurrenceRecord>, Vec<SkippedRow>) {
    let mut records = Vec::with_capacity(document.len());
    let mut skipped = Vec::new();
    for (index, row) in document.rows().enumerate() {
        match CoOccurrenceRecord::from_row(&row) {
            Ok(record) => records.push(record),
            Err(error) => skipped.push(SkippedRow {
                row: index + 1,
                error,
            }),
        }
    }
    (records, skipped)
}
