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

//! Request orchestration: build the query, post it, parse the rows,
//! assemble the answer.
//!
//! The engine owns the degrade-to-empty policy. A store that is down,
//! slow, or answering with an error must never take the HTTP surface down
//! with it; every remote failure is logged and turned into an empty row
//! set. Only request validation errors propagate to the caller.

use tracing::{debug, warn};

use keygraph_core::{
    co_occurrence_records, collect_suggestions, GraphAssembler, GraphFilter, GraphResult,
    SkippedRow, Suggestion, TsvDocument,
};

use crate::builder::{QueryBuilder, QueryError, QueryTemplate};
use crate::client::SparqlClient;

/// Default keywords relation: used when no `field` restriction is given
/// and by the suggest query.
pub const DEFAULT_KEYWORD_PREDICATE: &str = "http://purl.org/dc/terms/subject";

/// Deployment-level knobs for query construction and assembly.
#[derive(Debug, Clone)]
pub struct QuerySettings {
    pub template: QueryTemplate,
    pub keyword_predicate: String,
    pub minimum_amount: u64,
}

impl Default for QuerySettings {
    fn default() -> Self {
        Self {
            template: QueryTemplate::default(),
            keyword_predicate: DEFAULT_KEYWORD_PREDICATE.to_string(),
            minimum_amount: 1,
        }
    }
}

/// One engine is shared across all requests; it holds no per-request
/// state, so concurrent use needs no coordination beyond the client's
/// connection pool.
#[derive(Debug, Clone)]
pub struct QueryEngine {
    client: SparqlClient,
    settings: QuerySettings,
}

impl QueryEngine {
    pub fn new(client: SparqlClient, settings: QuerySettings) -> Self {
        Self { client, settings }
    }

    pub fn settings(&self) -> &QuerySettings {
        &self.settings
    }

    /// Build the co-occurrence graph for one request. Remote failures
    /// yield an empty graph; only an unusable `field` value is an error.
    pub async fn co_occurrence_graph(
        &self,
        filter: &GraphFilter,
    ) -> Result<GraphResult, QueryError> {
        let query = self.builder().co_occurrence(filter)?;
        debug!(template = %self.settings.template, "dispatching co-occurrence query");
        let Some(body) = self.fetch(&query).await else {
            return Ok(GraphResult::default());
        };

        let document = TsvDocument::parse(&body);
        let (records, skipped) = co_occurrence_records(&document);
        log_skipped(&skipped);

        Ok(GraphAssembler::new(self.settings.minimum_amount).assemble(records))
    }

    /// Ranked suggestions for a partial term. An empty or whitespace term
    /// answers immediately without contacting the store.
    pub async fn suggestions(&self, term: &str) -> Vec<Suggestion> {
        let term = term.trim();
        if term.is_empty() {
            return Vec::new();
        }

        let query = self.builder().suggest(term);
        debug!(term, "dispatching suggest query");
        let Some(body) = self.fetch(&query).await else {
            return Vec::new();
        };

        let document = TsvDocument::parse(&body);
        let (suggestions, skipped) = collect_suggestions(&document);
        log_skipped(&skipped);
        suggestions
    }

    /// Distinct predicates present in the store, capped by the query's
    /// LIMIT clause.
    pub async fn predicates(&self) -> Vec<String> {
        let query = self.builder().predicates();
        let Some(body) = self.fetch(&query).await else {
            return Vec::new();
        };
        TsvDocument::parse(&body).column("predicate")
    }

    fn builder(&self) -> QueryBuilder<'_> {
        QueryBuilder::new(self.settings.template, &self.settings.keyword_predicate)
    }

    /// Run one query, mapping every failure to "no rows".
    async fn fetch(&self, query: &str) -> Option<String> {
        match self.client.select(query).await {
            Ok(body) => Some(body),
            Err(err) => {
                warn!(endpoint = %self.client.endpoint(), error = %err, "query endpoint unavailable, treating as empty result");
                None
            }
        }
    }
}

fn log_skipped(skipped: &[SkippedRow]) {
    if skipped.is_empty() {
        return;
    }
    debug!(rows = skipped.len(), first = %skipped[0].error, "dropped rows that failed to parse");
}

#[cfg(test)]
mod tests {
    use super::*;
    use keygraph_core::NodeGroup;

    fn engine_for(server: &mockito::Server, settings: QuerySettings) -> QueryEngine {
        let client =
            SparqlClient::new(server.url(), crate::client::DEFAULT_REQUEST_TIMEOUT).unwrap();
        QueryEngine::new(client, settings)
    }

    #[tokio::test]
    async fn test_graph_built_from_tsv_rows() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/")
            .with_status(200)
            .with_body(
                "?keyword1\t?keyword2\t?amount\n\
                 jazz (genre)\t1920-1929\t5\n\
                 1920-1929\tjazz (genre)\t5\n\
                 jazz (genre)\tswing (style)\tbroken\n",
            )
            .create_async()
            .await;

        let engine = engine_for(&server, QuerySettings::default());
        let graph = engine
            .co_occurrence_graph(&GraphFilter::default())
            .await
            .unwrap();

        assert_eq!(graph.links.len(), 1);
        assert_eq!(graph.links[0].value, 5);
        assert_eq!(graph.nodes.len(), 2);
        assert_eq!(graph.nodes[1].group, NodeGroup::Dated);
    }

    #[tokio::test]
    async fn test_remote_failure_degrades_to_empty_graph() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/")
            .with_status(500)
            .with_body("boom")
            .create_async()
            .await;

        let engine = engine_for(&server, QuerySettings::default());
        let graph = engine
            .co_occurrence_graph(&GraphFilter::default())
            .await
            .unwrap();

        assert!(graph.nodes.is_empty());
        assert!(graph.links.is_empty());
    }

    #[tokio::test]
    async fn test_minimum_amount_applies() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/")
            .with_status(200)
            .with_body("?keyword1\t?keyword2\t?amount\na\tb\t3\na\tc\t1\n")
            .create_async()
            .await;

        let settings = QuerySettings {
            minimum_amount: 2,
            ..Default::default()
        };
        let engine = engine_for(&server, settings);
        let graph = engine
            .co_occurrence_graph(&GraphFilter::default())
            .await
            .unwrap();

        assert_eq!(graph.links.len(), 1);
        assert_eq!(graph.links[0].target, "b");
    }

    #[tokio::test]
    async fn test_invalid_field_is_an_error_without_remote_call() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/")
            .with_status(200)
            .with_body("?keyword1\t?keyword2\t?amount\n")
            .expect(0)
            .create_async()
            .await;

        let engine = engine_for(&server, QuerySettings::default());
        let filter = GraphFilter {
            fields: vec!["no spaces allowed".to_string()],
            ..Default::default()
        };
        let err = engine.co_occurrence_graph(&filter).await.unwrap_err();

        assert!(matches!(err, QueryError::InvalidField(_)));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_empty_suggest_term_skips_remote_call() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/")
            .with_status(200)
            .with_body("?object\t?frequency\n")
            .expect(0)
            .create_async()
            .await;

        let engine = engine_for(&server, QuerySettings::default());
        assert!(engine.suggestions("").await.is_empty());
        assert!(engine.suggestions("   ").await.is_empty());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_suggestions_preserve_remote_order() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/")
            .with_status(200)
            .with_body("?object\t?frequency\ndenarius\t40\nbronze\t12\nas\t3\n")
            .create_async()
            .await;

        let engine = engine_for(&server, QuerySettings::default());
        let suggestions = engine.suggestions("d").await;

        let values: Vec<&str> = suggestions.iter().map(|s| s.value.as_str()).collect();
        assert_eq!(values, vec!["denarius", "bronze", "as"]);
    }

    #[tokio::test]
    async fn test_predicates_parse_and_degrade() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/")
            .with_status(200)
            .with_body("?predicate\nhttp://example.org/a\nhttp://example.org/b\n")
            .create_async()
            .await;

        let engine = engine_for(&server, QuerySettings::default());
        assert_eq!(
            engine.predicates().await,
            vec!["http://example.org/a", "http://example.org/b"]
        );

        let mut down = mockito::Server::new_async().await;
        down.mock("POST", "/").with_status(503).create_async().await;
        let engine = engine_for(&down, QuerySettings::default());
        assert!(engine.predicates().await.is_empty());
    }
}
