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

//! Request filter model.
//!
//! `RequestParams` is the raw decoded query string; `RequestMode` is the
//! validated form the rest of the pipeline works with. Graph and suggest
//! mode are mutually exclusive and decided exactly once, at construction.

/// Raw query-string input, decoded but not yet interpreted.
///
/// Empty scalar values for `q`/`subject`/`predicate`/`object` count as
/// absent; `suggest` is kept verbatim because its mere presence switches
/// the request into autosuggest mode.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestParams {
    pub q: Option<String>,
    pub subject: Option<String>,
    pub predicate: Option<String>,
    pub object: Option<String>,
    pub suggest: Option<String>,
    pub fields: Vec<String>,
}

/// Validated graph-mode input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GraphFilter {
    /// Substring match against the first keyword value.
    pub free_text: Option<String>,
    /// Substring match against the shared subject.
    pub subject: Option<String>,
    /// Substring match against the shared predicate.
    pub predicate: Option<String>,
    /// Substring match against object values under the shared predicate.
    pub object: Option<String>,
    /// Predicate IRIs the co-occurrence is computed over. Empty means the
    /// configured well-known predicate.
    pub fields: Vec<String>,
    /// Anchor object literal from deployment configuration.
    pub topic: Option<String>,
}

impl GraphFilter {
    /// True when any of the subject/predicate/object substring filters is set.
    pub fn has_component_filters(&self) -> bool {
        self.subject.is_some() || self.predicate.is_some() || self.object.is_some()
    }

    /// The topic anchor to apply, if any. Component filters suppress the
    /// anchor; a free-text filter alone does not.
    pub fn effective_topic(&self) -> Option<&str> {
        if self.has_component_filters() {
            None
        } else {
            self.topic.as_deref()
        }
    }
}

/// One request is either a graph build or an autosuggest lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestMode {
    Graph(GraphFilter),
    Suggest(String),
}

impl RequestMode {
    /// Decide the mode for a request. A `suggest` parameter, even an empty
    /// one, selects autosuggest; everything else feeds the graph filter.
    /// The topic anchor comes from configuration, not from the request.
    pub fn resolve(params: RequestParams, topic: Option<String>) -> Self {
        if let Some(term) = params.suggest {
            return RequestMode::Suggest(term);
        }
        RequestMode::Graph(GraphFilter {
            free_text: params.q,
            subject: params.subject,
            predicate: params.predicate,
            object: params.object,
            fields: params.fields,
            topic,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suggest_presence_selects_suggest_mode() {
        let params = RequestParams {
            q: Some("jazz".to_string()),
            suggest: Some("blu".to_string()),
            ..Default::default()
        };
        let mode = RequestMode::resolve(params, Some("\"music\"@en".to_string()));
        assert_eq!(mode, RequestMode::Suggest("blu".to_string()));
    }

    #[test]
    fn test_empty_suggest_still_selects_suggest_mode() {
        let params = RequestParams {
            suggest: Some(String::new()),
            ..Default::default()
        };
        let mode = RequestMode::resolve(params, None);
        assert_eq!(mode, RequestMode::Suggest(String::new()));
    }

    #[test]
    fn test_graph_mode_carries_configured_topic() {
        let params = RequestParams {
            q: Some("sax".to_string()),
            fields: vec!["http://example.org/keywords".to_string()],
            ..Default::default()
        };
        let mode = RequestMode::resolve(params, Some("\"music\"@en".to_string()));
        match mode {
            RequestMode::Graph(filter) => {
                assert_eq!(filter.free_text.as_deref(), Some("sax"));
                assert_eq!(filter.topic.as_deref(), Some("\"music\"@en"));
                assert_eq!(filter.fields.len(), 1);
            }
            RequestMode::Suggest(_) => panic!("expected graph mode"),
        }
    }

    #[test]
    fn test_component_filters_suppress_topic() {
        let filter = GraphFilter {
            subject: Some("coin".to_string()),
            topic: Some("\"music\"@en".to_string()),
            ..Default::default()
        };
        assert!(filter.has_component_filters());
        assert_eq!(filter.effective_topic(), None);
    }

    #[test]
    fn test_free_text_does_not_suppress_topic() {
        let filter = GraphFilter {
            free_text: Some("jazz".to_string()),
            topic: Some("\"music\"@en".to_string()),
            ..Default::default()
        };
        assert!(!filter.has_component_filters());
        assert_eq!(filter.effective_topic(), Some("\"music\"@en"));
    }
}
