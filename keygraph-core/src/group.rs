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

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Serialize, Serializer};

static YEAR_RANGE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\d{4}-\d{4}\b").expect("valid year-range pattern"));

/// Display group for a graph node. Values carrying a four-digit year range
/// anywhere in their text are `Dated`; everything else is `Plain`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeGroup {
    Plain,
    Dated,
}

impl NodeGroup {
    /// Classify a keyword value by the year-range heuristic.
    pub fn classify(value: &str) -> Self {
        if YEAR_RANGE.is_match(value) {
            NodeGroup::Dated
        } else {
            NodeGroup::Plain
        }
    }

    /// Integer used on the wire by the visualization front end.
    pub fn as_wire(self) -> u8 {
        match self {
            NodeGroup::Plain => 1,
            NodeGroup::Dated => 2,
        }
    }
}

impl Serialize for NodeGroup {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u8(self.as_wire())
    }
}
