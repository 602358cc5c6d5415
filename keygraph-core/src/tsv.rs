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

//! Tab-separated response text, split into rows addressable by column name.
//!
//! Query services name result columns after output variables, so headers
//! arrive with the variable sigil still attached (`?keyword1`). The sigil
//! is one leading non-alphanumeric character and is stripped here so the
//! rest of the pipeline can use bare column names.

/// A parsed tab-separated document. Rows keep their original order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TsvDocument {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

/// One data row, addressable by bare column name.
#[derive(Debug, Clone, Copy)]
pub struct TsvRow<'a> {
    headers: &'a [String],
    values: &'a [String],
}

impl TsvDocument {
    /// Parse tabular text. The first line is the header row; blank lines are
    /// ignored; trailing carriage returns are tolerated.
    pub fn parse(text: &str) -> Self {
        let mut lines = text.lines().map(|line| line.trim_end_matches('\r'));
        let headers = match lines.find(|line| !line.is_empty()) {
            Some(header_line) => header_line
                .split('\t')
                .map(|column| strip_sigil(column).to_string())
                .collect(),
            None => return Self::default(),
        };
        let rows = lines
            .filter(|line| !line.is_empty())
            .map(|line| line.split('\t').map(str::to_string).collect())
            .collect();
        Self { headers, rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Iterate data rows in document order.
    pub fn rows(&self) -> impl Iterator<Item = TsvRow<'_>> {
        self.rows.iter().map(|values| TsvRow {
            headers: &self.headers,
            values,
        })
    }

    /// All values of one column, in row order. Rows too short to carry the
    /// column are skipped.
    pub fn column(&self, name: &str) -> Vec<String> {
        self.rows()
            .filter_map(|row| row.get(name).map(str::to_string))
            .collect()
    }
}

impl<'a> TsvRow<'a> {
    /// Look up a value by bare column name.
    pub fn get(&self, column: &str) -> Option<&'a str> {
        let index = self.headers.iter().position(|header| header == column)?;
        self.values.get(index).map(String::as_str)
    }
}

/// Strip one leading non-alphanumeric marker character from a header cell.
fn strip_sigil(raw: &str) -> &str {
    let trimmed = raw.trim();
    match trimmed.chars().next() {
        Some(first) if !first.is_alphanumeric() => &trimmed[first.len_utf8()..],
        _ => trimmed,
    }
}
