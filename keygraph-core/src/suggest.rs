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

use serde::Serialize;

use crate::record::{RowError, SkippedRow};
use crate::tsv::{TsvDocument, TsvRow};

/// One autosuggest candidate.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Suggestion {
    pub value: String,
    pub frequency: u64,
}

impl Suggestion {
    /// Read one suggestion from a row. Fails on a missing column or a
    /// frequency that does not parse as a non-negative integer.
    pub fn from_row(row: &TsvRow<'_>) -> Result<Self, RowError> {
        let value = row.get("object").ok_or(RowError::MissingColumn("object"))?;
        let raw_frequency = row
            .get("frequency")
            .ok_or(RowError::MissingColumn("frequency"))?;
        let frequency = raw_frequency
            .trim()
            .parse::<u64>()
            .map_err(|_| RowError::InvalidFrequency(raw_frequency.to_string()))?;
        Ok(Self {
            value: value.to_string(),
            frequency,
        })
    }
}

/// Extract suggestions from a document, preserving remote ordering. The
/// query service already sorts by descending frequency; re-sorting here
/// would hide that contract.
pub fn collect_suggestions(document: &TsvDocument) -> (Vec<Suggestion>, Vec<SkippedRow>) {
    let mut suggestions = Vec::with_capacity(document.len());
    let mut skipped = Vec::new();
    for (index, row) in document.rows().enumerate() {
        match Suggestion::from_row(&row) {
            Ok(suggestion) => suggestions.push(suggestion),
            Err(error) => skipped.push(SkippedRow {
                row: index + 1,
                error,
            }),
        }
    }
    (suggestions, skipped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_ordering_is_preserved() {
        let doc = TsvDocument::parse("?object\t?frequency\nbronze\t3\tignored\nsilver\t9\ngold\t5\n");
        let (suggestions, skipped) = collect_suggestions(&doc);
        assert!(skipped.is_empty());
        let values: Vec<&str> = suggestions.iter().map(|s| s.value.as_str()).collect();
        assert_eq!(values, vec!["bronze", "silver", "gold"]);
        assert_eq!(suggestions[1].frequency, 9);
    }

    #[test]
    fn test_bad_frequency_rows_are_skipped() {
        let doc = TsvDocument::parse("?object\t?frequency\ngood\t2\nbad\toften\n");
        let (suggestions, skipped) = collect_suggestions(&doc);
        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].value, "good");
        assert_eq!(
            skipped,
            vec![SkippedRow {
                row: 2,
                error: RowError::InvalidFrequency("often".to_string()),
            }]
        );
    }

    #[test]
    fn test_serialized_shape() {
        let suggestion = Suggestion {
            value: "denarius".to_string(),
            frequency: 12,
        };
        assert_eq!(
            serde_json::to_string(&suggestion).unwrap(),
            r#"{"value":"denarius","frequency":12}"#
        );
    }

    #[test]
    fn test_empty_document_yields_nothing() {
        let (suggestions, skipped) = collect_suggestions(&TsvDocument::parse(""));
        assert!(suggestions.is_empty());
        assert!(skipped.is_empty());
    }
}
