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

//! Graph assembly from co-occurrence records.
//!
//! Records describe directed rows; the output graph is undirected. The
//! assembler drops exact duplicate rows, collapses the two orderings of a
//! pair into one edge, applies the minimum-amount threshold, and emits
//! nodes only for edge endpoints, all in first-seen order.

use std::collections::HashSet;

use serde::Serialize;

use crate::group::NodeGroup;
use crate::record::CoOccurrenceRecord;

/// One keyword in the output graph.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct GraphNode {
    pub id: String,
    pub group: NodeGroup,
}

/// One undirected co-occurrence edge. `source`/`target` carry the ordering
/// of the first row that produced the pair.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct GraphEdge {
    pub source: String,
    pub target: String,
    pub value: u64,
}

/// The response payload for graph mode.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct GraphResult {
    pub nodes: Vec<GraphNode>,
    pub links: Vec<GraphEdge>,
}

/// Builds a [`GraphResult`] out of an ordered record stream.
///
/// All working sets are request-scoped locals; assembling the same input
/// twice yields byte-identical serialized output.
#[derive(Debug, Clone, Copy)]
pub struct GraphAssembler {
    minimum_amount: u64,
}

impl GraphAssembler {
    pub fn new(minimum_amount: u64) -> Self {
        Self { minimum_amount }
    }

    /// Fold records into a deduplicated undirected graph.
    ///
    /// Per record, in order: skip exact duplicate rows; skip pairs already
    /// emitted under either ordering (the pair is marked before the
    /// threshold check, so a below-threshold first row retires its pair);
    /// below the threshold nothing is emitted, otherwise the edge plus any
    /// endpoint nodes not seen before.
    pub fn assemble<I>(&self, records: I) -> GraphResult
    where
        I: IntoIterator<Item = CoOccurrenceRecord>,
    {
        let mut seen_rows: HashSet<(String, String, u64)> = HashSet::new();
        let mut emitted_pairs: HashSet<(String, String)> = HashSet::new();
        let mut node_ids: HashSet<String> = HashSet::new();
        let mut nodes = Vec::new();
        let mut links = Vec::new();

        for record in records {
            let signature = (
                record.keyword1.clone(),
                record.keyword2.clone(),
                record.amount,
            );
            if !seen_rows.insert(signature) {
                continue;
            }

            let forward = (record.keyword1.clone(), record.keyword2.clone());
            if emitted_pairs.contains(&forward) {
                continue;
            }
            let reverse = (record.keyword2.clone(), record.keyword1.clone());
            emitted_pairs.insert(forward);
            emitted_pairs.insert(reverse);

            if record.amount < self.minimum_amount {
                continue;
            }

            links.push(GraphEdge {
                source: record.keyword1.clone(),
                target: record.keyword2.clone(),
                value: record.amount,
            });
            if node_ids.insert(record.keyword1.clone()) {
                nodes.push(GraphNode {
                    group: NodeGroup::classify(&record.keyword1),
                    id: record.keyword1,
                });
            }
            if node_ids.insert(record.keyword2.clone()) {
                nodes.push(GraphNode {
                    group: NodeGroup::classify(&record.keyword2),
                    id: record.keyword2,
                });
            }
        }

        GraphResult { nodes, links }
    }
}

impl Default for GraphAssembler {
    fn default() -> Self {
        Self::new(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(keyword1: &str, keyword2: &str, amount: u64) -> CoOccurrenceRecord {
        CoOccurrenceRecord {
            keyword1: keyword1.to_string(),
            keyword2: keyword2.to_string(),
            amount,
        }
    }

    #[test]
    fn test_mirrored_pair_collapses_to_one_edge() {
        let records = vec![
            record("jazz (genre)", "1920-1929", 5),
            record("1920-1929", "jazz (genre)", 5),
        ];
        let graph = GraphAssembler::new(1).assemble(records);

        assert_eq!(graph.links.len(), 1);
        assert_eq!(graph.links[0].source, "jazz (genre)");
        assert_eq!(graph.links[0].target, "1920-1929");
        assert_eq!(graph.links[0].value, 5);

        assert_eq!(graph.nodes.len(), 2);
        assert_eq!(graph.nodes[0].id, "jazz (genre)");
        assert_eq!(graph.nodes[0].group, NodeGroup::Plain);
        assert_eq!(graph.nodes[1].id, "1920-1929");
        assert_eq!(graph.nodes[1].group, NodeGroup::Dated);
    }

    #[test]
    fn test_below_threshold_emits_nothing() {
        let graph = GraphAssembler::new(1).assemble(vec![record("a", "b", 0)]);
        assert!(graph.links.is_empty());
        assert!(graph.nodes.is_empty());
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let graph = GraphAssembler::new(3).assemble(vec![
            record("a", "b", 3),
            record("a", "c", 2),
        ]);
        assert_eq!(graph.links.len(), 1);
        assert_eq!(graph.links[0].value, 3);
        assert_eq!(graph.nodes.len(), 2);
    }

    #[test]
    fn test_exact_duplicate_rows_are_dropped() {
        let graph = GraphAssembler::new(1).assemble(vec![
            record("a", "b", 2),
            record("a", "b", 2),
        ]);
        assert_eq!(graph.links.len(), 1);
        assert_eq!(graph.nodes.len(), 2);
    }

    #[test]
    fn test_first_pair_wins_over_later_amounts() {
        // Distinct rows for the same unordered pair keep the first amount.
        let graph = GraphAssembler::new(1).assemble(vec![
            record("a", "b", 7),
            record("b", "a", 4),
        ]);
        assert_eq!(graph.links.len(), 1);
        assert_eq!(graph.links[0].value, 7);
    }

    #[test]
    fn test_below_threshold_row_retires_its_pair() {
        // The pair is marked before the threshold check, so a later row for
        // the same pair does not resurrect it.
        let graph = GraphAssembler::new(5).assemble(vec![
            record("a", "b", 2),
            record("b", "a", 9),
        ]);
        assert!(graph.links.is_empty());
        assert!(graph.nodes.is_empty());
    }

    #[test]
    fn test_no_isolated_or_duplicate_nodes() {
        let graph = GraphAssembler::new(2).assemble(vec![
            record("a", "b", 3),
            record("b", "c", 2),
            record("c", "d", 1),
            record("a", "c", 4),
        ]);

        let endpoint_count = graph.links.len() * 2;
        assert!(graph.nodes.len() <= endpoint_count);
        for node in &graph.nodes {
            assert!(graph
                .links
                .iter()
                .any(|edge| edge.source == node.id || edge.target == node.id));
        }
        let mut ids: Vec<&str> = graph.nodes.iter().map(|node| node.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), graph.nodes.len());
        assert!(!ids.contains(&"d"));
    }

    #[test]
    fn test_assembly_is_deterministic() {
        let records = vec![
            record("swing (style)", "1930-1939", 6),
            record("1930-1939", "swing (style)", 6),
            record("swing (style)", "big band (ensemble)", 2),
        ];
        let first = GraphAssembler::new(1).assemble(records.clone());
        let second = GraphAssembler::new(1).assemble(records);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn test_empty_input_yields_empty_graph() {
        let graph = GraphAssembler::default().assemble(Vec::new());
        assert_eq!(
            serde_json::to_string(&graph).unwrap(),
            r#"{"nodes":[],"links":[]}"#
        );
    }

    #[test]
    fn test_node_group_follows_each_keyword() {
        let graph = GraphAssembler::new(1).assemble(vec![record("1914-1918", "1939-1945", 2)]);
        assert_eq!(graph.nodes[0].group, NodeGroup::Dated);
        assert_eq!(graph.nodes[1].group, NodeGroup::Dated);
    }
}
