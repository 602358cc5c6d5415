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

//! Keygraph Core
//!
//! Domain types and pure transforms for the keyword co-occurrence graph:
//! request filters, tabular response parsing, node classification, and
//! graph/suggestion assembly. No I/O lives here.

pub mod filter;
pub mod graph;
pub mod group;
pub mod record;
pub mod suggest;
pub mod tsv;

pub use filter::{GraphFilter, RequestMode, RequestParams};
pub use graph::{GraphAssembler, GraphEdge, GraphNode, GraphResult};
pub use group::NodeGroup;
pub use record::{co_occurrence_records, CoOccurrenceRecord, RowError, SkippedRow};
pub use suggest::{collect_suggestions, Suggestion};
pub use tsv::{TsvDocument, TsvRow};
