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

//! Keygraph Query
//!
//! SPARQL construction, the HTTP client for the remote store, and the
//! engine tying both to the assembly passes in `keygraph-core`.

pub mod builder;
pub mod client;
pub mod engine;

pub use builder::{QueryBuilder, QueryError, QueryTemplate, PREDICATE_LIMIT};
pub use client::{SparqlClient, SparqlError, DEFAULT_REQUEST_TIMEOUT};
pub use engine::{QueryEngine, QuerySettings, DEFAULT_KEYWORD_PREDICATE};
