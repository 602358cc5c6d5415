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

//! SPARQL construction from typed clauses.
//!
//! Queries are assembled as lists of clause values and rendered in one
//! place, so user input never reaches the query text except through the
//! string-literal escaper. Configuration-supplied values (the topic
//! literal, field IRIs) are rendered verbatim; field IRIs are validated
//! first.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use keygraph_core::GraphFilter;

/// Upper bound on the distinct-predicate listing.
pub const PREDICATE_LIMIT: usize = 100;

/// Which co-occurrence query shape to render.
///
/// `Topic` anchors on an optional topic literal and keeps the composite-
/// value and component filters. `FreeText` always anchors on the free-text
/// needle (empty when no `q` was given) and drops everything but the
/// self-pair exclusion and the field restriction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryTemplate {
    #[default]
    Topic,
    FreeText,
}

impl FromStr for QueryTemplate {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "topic" => Ok(QueryTemplate::Topic),
            "freetext" | "free-text" => Ok(QueryTemplate::FreeText),
            other => Err(format!("unknown query template {other:?}")),
        }
    }
}

impl fmt::Display for QueryTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryTemplate::Topic => write!(f, "topic"),
            QueryTemplate::FreeText => write!(f, "freetext"),
        }
    }
}

/// Request-level construction failures. Everything here maps to a client
/// error, never a panic.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("field is not a usable predicate IRI: {0:?}")]
    InvalidField(String),
}

/// Renders the three query shapes for one configured deployment.
#[derive(Debug, Clone, Copy)]
pub struct QueryBuilder<'a> {
    template: QueryTemplate,
    keyword_predicate: &'a str,
}

/// A term in a triple pattern position.
#[derive(Debug, Clone)]
enum Term {
    Var(&'static str),
    Iri(String),
    /// Configuration-supplied text spliced as written, e.g. a full RDF
    /// literal with language tag.
    Raw(String),
}

/// One line inside the WHERE block.
#[derive(Debug, Clone)]
enum Clause {
    Triple {
        subject: &'static str,
        predicate: Term,
        object: Term,
    },
    NotEqual(&'static str, &'static str),
    Contains {
        var: &'static str,
        needle: String,
        lowercase: bool,
    },
    PredicateAnyOf(Vec<String>),
    Union(Vec<Clause>, Vec<Clause>),
}

/// A complete SELECT query ready to render.
#[derive(Debug)]
struct SelectQuery {
    projection: &'static str,
    clauses: Vec<Clause>,
    group_by: Option<&'static str>,
    having: Option<&'static str>,
    order_by: Option<&'static str>,
    limit: Option<usize>,
}

impl<'a> QueryBuilder<'a> {
    pub fn new(template: QueryTemplate, keyword_predicate: &'a str) -> Self {
        Self {
            template,
            keyword_predicate,
        }
    }

    /// The pairwise co-occurrence query: two object variables under a
    /// shared subject and predicate, grouped and counted, strongest pairs
    /// first.
    pub fn co_occurrence(&self, filter: &GraphFilter) -> Result<String, QueryError> {
        let fields = self.effective_fields(&filter.fields)?;
        let mut clauses = vec![
            Clause::Triple {
                subject: "?s",
                predicate: Term::Var("?p"),
                object: Term::Var("?keyword1"),
            },
            Clause::Triple {
                subject: "?s",
                predicate: Term::Var("?p"),
                object: Term::Var("?keyword2"),
            },
        ];

        match self.template {
            QueryTemplate::Topic => {
                if let Some(topic) = filter.effective_topic() {
                    clauses.push(Clause::Triple {
                        subject: "?s",
                        predicate: Term::Var("?t"),
                        object: Term::Raw(topic.to_string()),
                    });
                }
                if filter.object.is_some() {
                    clauses.push(Clause::Triple {
                        subject: "?s",
                        predicate: Term::Var("?p"),
                        object: Term::Var("?o"),
                    });
                }
                clauses.push(Clause::NotEqual("?keyword1", "?keyword2"));
                clauses.push(contains("?keyword1", "("));
                clauses.push(contains("?keyword2", "("));
                clauses.push(Clause::PredicateAnyOf(fields));
                if let Some(q) = &filter.free_text {
                    clauses.push(contains("?keyword1", q));
                }
                if let Some(subject) = &filter.subject {
                    clauses.push(contains("?s", subject));
                }
                if let Some(predicate) = &filter.predicate {
                    clauses.push(contains("?p", predicate));
                }
                if let Some(object) = &filter.object {
                    clauses.push(contains("?o", object));
                }
            }
            QueryTemplate::FreeText => {
                clauses.push(Clause::NotEqual("?keyword1", "?keyword2"));
                clauses.push(Clause::PredicateAnyOf(fields));
                clauses.push(contains("?keyword1", filter.free_text.as_deref().unwrap_or("")));
            }
        }

        Ok(SelectQuery {
            projection: "?keyword1 ?keyword2 (COUNT(*) AS ?amount)",
            clauses,
            group_by: Some("?keyword1 ?keyword2"),
            having: None,
            order_by: Some("DESC(?amount)"),
            limit: None,
        }
        .render())
    }

    /// The autosuggest query: keyword values reachable either from subjects
    /// whose identifier contains the term or directly by value match,
    /// ranked by how many distinct subjects carry them.
    pub fn suggest(&self, term: &str) -> String {
        let needle = term.to_lowercase();
        let keywords = Term::Iri(self.keyword_predicate.to_string());
        let by_subject = vec![
            Clause::Triple {
                subject: "?s",
                predicate: keywords.clone(),
                object: Term::Var("?object"),
            },
            contains_lower("?s", &needle),
        ];
        let by_value = vec![
            Clause::Triple {
                subject: "?s",
                predicate: keywords,
                object: Term::Var("?object"),
            },
            contains_lower("?object", &needle),
        ];

        SelectQuery {
            projection: "?object (COUNT(DISTINCT ?s) AS ?frequency)",
            clauses: vec![Clause::Union(by_subject, by_value)],
            group_by: Some("?object"),
            having: Some("(COUNT(DISTINCT ?s) > 0)"),
            order_by: Some("DESC(?frequency)"),
            limit: None,
        }
        .render()
    }

    /// The distinct-predicate listing backing `GET /predicate`.
    pub fn predicates(&self) -> String {
        SelectQuery {
            projection: "DISTINCT ?predicate",
            clauses: vec![Clause::Triple {
                subject: "?s",
                predicate: Term::Var("?predicate"),
                object: Term::Var("?o"),
            }],
            group_by: None,
            having: None,
            order_by: None,
            limit: Some(PREDICATE_LIMIT),
        }
        .render()
    }

    /// Resolve the field restriction: user fields validated as IRIs, or the
    /// configured well-known predicate when none were given.
    fn effective_fields(&self, fields: &[String]) -> Result<Vec<String>, QueryError> {
        if fields.is_empty() {
            return Ok(vec![self.keyword_predicate.to_string()]);
        }
        for field in fields {
            validate_field(field)?;
        }
        Ok(fields.to_vec())
    }
}

fn contains(var: &'static str, needle: &str) -> Clause {
    Clause::Contains {
        var,
        needle: needle.to_string(),
        lowercase: false,
    }
}

fn contains_lower(var: &'static str, needle: &str) -> Clause {
    Clause::Contains {
        var,
        needle: needle.to_string(),
        lowercase: true,
    }
}

/// A field must be splicable between angle brackets without changing the
/// query structure.
fn validate_field(field: &str) -> Result<(), QueryError> {
    let forbidden = |c: char| {
        c.is_whitespace() || matches!(c, '<' | '>' | '"' | '{' | '}' | '|' | '\\' | '^' | '`')
    };
    if field.is_empty() || field.chars().any(forbidden) {
        return Err(QueryError::InvalidField(field.to_string()));
    }
    Ok(())
}

/// Escape text for use inside a double-quoted SPARQL string literal.
fn escape_literal(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            _ => escaped.push(c),
        }
    }
    escaped
}

impl Term {
    fn render(&self) -> String {
        match self {
            Term::Var(name) => (*name).to_string(),
            Term::Iri(iri) => format!("<{iri}>"),
            Term::Raw(text) => text.clone(),
        }
    }
}

impl Clause {
    fn render(&self) -> String {
        match self {
            Clause::Triple {
                subject,
                predicate,
                object,
            } => format!("{} {} {} .", subject, predicate.render(), object.render()),
            Clause::NotEqual(left, right) => format!("FILTER({left} != {right})"),
            Clause::Contains {
                var,
                needle,
                lowercase,
            } => {
                let target = if *lowercase {
                    format!("LCASE(STR({var}))")
                } else {
                    format!("STR({var})")
                };
                format!("FILTER(CONTAINS({}, \"{}\"))", target, escape_literal(needle))
            }
            Clause::PredicateAnyOf(fields) => {
                let alternatives: Vec<String> =
                    fields.iter().map(|field| format!("?p = <{field}>")).collect();
                format!("FILTER({})", alternatives.join(" || "))
            }
            Clause::Union(left, right) => {
                let mut block = String::from("{\n");
                for clause in left {
                    block.push_str("        ");
                    block.push_str(&clause.render());
                    block.push('\n');
                }
                block.push_str("    } UNION {\n");
                for clause in right {
                    block.push_str("        ");
                    block.push_str(&clause.render());
                    block.push('\n');
                }
                block.push_str("    }");
                block
            }
        }
    }
}

impl SelectQuery {
    fn render(&self) -> String {
        let mut query = String::from("SELECT ");
        query.push_str(self.projection);
        query.push_str(" WHERE {\n");
        for clause in &self.clauses {
            query.push_str("    ");
            query.push_str(&clause.render());
            query.push('\n');
        }
        query.push('}');
        if let Some(group_by) = self.group_by {
            query.push_str("\nGROUP BY ");
            query.push_str(group_by);
        }
        if let Some(having) = self.having {
            query.push_str("\nHAVING ");
            query.push_str(having);
        }
        if let Some(order_by) = self.order_by {
            query.push_str("\nORDER BY ");
            query.push_str(order_by);
        }
        if let Some(limit) = self.limit {
            query.push_str("\nLIMIT ");
            query.push_str(&limit.to_string());
        }
        query
    }
}
