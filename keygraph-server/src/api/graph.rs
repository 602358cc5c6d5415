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

//! Co-occurrence graph endpoint.
//!
//! The query string is decoded by hand: `field` may repeat, and a bare
//! `suggest` parameter (even with an empty value) must be observable as
//! present, neither of which the derive-based `Query` extractor can
//! express.

use axum::{
    extract::{RawQuery, State},
    response::{IntoResponse, Response},
};
use keygraph_core::{RequestMode, RequestParams};
use tracing::debug;
use url::form_urlencoded;

use crate::api::{respond::PrettyJson, ApiError, AppState};

/// GET / - Co-occurrence graph, or autosuggest when `suggest` is present
pub async fn co_occurrence(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> Result<Response, ApiError> {
    let params = parse_request_params(query.as_deref());

    match RequestMode::resolve(params, state.topic.clone()) {
        RequestMode::Suggest(term) => {
            debug!(term, "autosuggest request");
            let suggestions = state.engine.suggestions(&term).await;
            Ok(PrettyJson(suggestions).into_response())
        }
        RequestMode::Graph(filter) => {
            let graph = state
                .engine
                .co_occurrence_graph(&filter)
                .await
                .map_err(|e| ApiError::BadRequest(e.to_string()))?;
            Ok(PrettyJson(graph).into_response())
        }
    }
}

/// Decode the raw query string into request parameters.
///
/// Empty values for the scalar filters count as absent. `suggest` is kept
/// verbatim; presence alone switches the request into autosuggest mode.
pub fn parse_request_params(query: Option<&str>) -> RequestParams {
    let mut params = RequestParams::default();
    let Some(query) = query else {
        return params;
    };

    for (key, value) in form_urlencoded::parse(query.as_bytes()) {
        let value = value.into_owned();
        match key.as_ref() {
            "q" | "subject" | "predicate" | "object" if value.is_empty() => {}
            "q" => params.q = Some(value),
            "subject" => params.subject = Some(value),
            "predicate" => params.predicate = Some(value),
            "object" => params.object = Some(value),
            "suggest" => params.suggest = Some(value),
            "field" => {
                if !value.is_empty() {
                    params.fields.push(value);
                }
            }
            _ => {}
        }
    }

    params
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_scalars_count_as_absent() {
        let params = parse_request_params(Some("q=&subject=&predicate=&object="));
        assert_eq!(params, RequestParams::default());
    }

    #[test]
    fn test_suggest_kept_verbatim() {
        let params = parse_request_params(Some("suggest="));
        assert_eq!(params.suggest.as_deref(), Some(""));

        let params = parse_request_params(Some("suggest=den"));
        assert_eq!(params.suggest.as_deref(), Some("den"));
    }

    #[test]
    fn test_field_repeats() {
        let params = parse_request_params(Some(
            "field=http%3A%2F%2Fa.example%2Fp&field=http%3A%2F%2Fb.example%2Fp&field=",
        ));
        assert_eq!(
            params.fields,
            vec![
                "http://a.example/p".to_string(),
                "http://b.example/p".to_string()
            ]
        );
    }

    #[test]
    fn test_percent_decoding() {
        let params = parse_request_params(Some("q=coin%20hoard&subject=nomisma"));
        assert_eq!(params.q.as_deref(), Some("coin hoard"));
        assert_eq!(params.subject.as_deref(), Some("nomisma"));
    }

    #[test]
    fn test_missing_query_string() {
        assert_eq!(parse_request_params(None), RequestParams::default());
    }

    #[test]
    fn test_unknown_parameters_ignored() {
        let params = parse_request_params(Some("callback=fn&q=jazz"));
        assert_eq!(params.q.as_deref(), Some("jazz"));
        assert!(params.suggest.is_none());
    }
}
