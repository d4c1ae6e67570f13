//! Conjunctive pattern queries over a [`Graph`](crate::Graph).
//!
//! A query is a sequence of triple patterns sharing named variables.
//! Evaluation is a straightforward nested-loop join: rows are extended
//! pattern by pattern, in triple insertion order, so results are
//! deterministic for a given graph.

use std::collections::BTreeMap;

use crate::{Graph, Literal, Term, Triple};

/// One position of a triple pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TermPattern {
    /// A named variable, bound on first match and unified afterwards.
    Var(String),
    /// A concrete term that must match exactly.
    Bound(Term),
    /// Matches anything without binding.
    Any,
}

impl TermPattern {
    pub fn var(name: impl Into<String>) -> Self {
        TermPattern::Var(name.into())
    }

    pub fn iri(iri: impl Into<String>) -> Self {
        TermPattern::Bound(Term::Iri(iri.into()))
    }
}

#[derive(Debug, Clone)]
pub struct TriplePattern {
    pub subject: TermPattern,
    pub predicate: TermPattern,
    pub object: TermPattern,
}

impl TriplePattern {
    pub fn new(subject: TermPattern, predicate: TermPattern, object: TermPattern) -> Self {
        Self {
            subject,
            predicate,
            object,
        }
    }
}

/// A row of variable bindings produced by [`Graph::select`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bindings(BTreeMap<String, Term>);

impl Bindings {
    pub fn get(&self, var: &str) -> Option<&Term> {
        self.0.get(var)
    }

    pub fn iri(&self, var: &str) -> Option<&str> {
        self.0.get(var).and_then(Term::as_iri)
    }

    pub fn literal(&self, var: &str) -> Option<&Literal> {
        self.0.get(var).and_then(Term::as_literal)
    }

    fn unify(&mut self, pattern: &TermPattern, term: &Term) -> bool {
        match pattern {
            TermPattern::Any => true,
            TermPattern::Bound(expected) => expected == term,
            TermPattern::Var(name) => match self.0.get(name) {
                Some(existing) => existing == term,
                None => {
                    self.0.insert(name.clone(), term.clone());
                    true
                }
            },
        }
    }

    fn matches(&mut self, pattern: &TriplePattern, triple: &Triple) -> bool {
        self.unify(&pattern.subject, &triple.subject)
            && self.unify(&pattern.predicate, &Term::Iri(triple.predicate.clone()))
            && self.unify(&pattern.object, &triple.object)
    }
}

pub(crate) fn select(graph: &Graph, patterns: &[TriplePattern]) -> Vec<Bindings> {
    let mut rows = vec![Bindings::default()];
    for pattern in patterns {
        let mut next = Vec::new();
        for row in &rows {
            for triple in graph.triples() {
                let mut candidate = row.clone();
                if candidate.matches(pattern, triple) {
                    next.push(candidate);
                }
            }
        }
        rows = next;
        if rows.is_empty() {
            break;
        }
    }
    rows
}

pub(crate) fn ask(graph: &Graph, patterns: &[TriplePattern]) -> bool {
    !select(graph, patterns).is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RdfFormat;

    const SAMPLE: &str = r#"
@prefix ex: <http://example.org/> .
ex:ro ex:aggregates ex:r1, ex:r2 .
ex:r1 a ex:Resource .
ex:r2 a ex:Folder .
ex:p1 ex:proxyFor ex:r1 .
"#;

    fn sample() -> Graph {
        Graph::parse(SAMPLE.as_bytes(), RdfFormat::Turtle).unwrap()
    }

    #[test]
    fn joins_across_patterns() {
        let graph = sample();
        let rows = graph.select(&[
            TriplePattern::new(
                TermPattern::iri("http://example.org/ro"),
                TermPattern::iri("http://example.org/aggregates"),
                TermPattern::var("r"),
            ),
            TriplePattern::new(
                TermPattern::var("r"),
                TermPattern::iri("http://www.w3.org/1999/02/22-rdf-syntax-ns#type"),
                TermPattern::iri("http://example.org/Resource"),
            ),
            TriplePattern::new(
                TermPattern::var("proxy"),
                TermPattern::iri("http://example.org/proxyFor"),
                TermPattern::var("r"),
            ),
        ]);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].iri("r"), Some("http://example.org/r1"));
        assert_eq!(rows[0].iri("proxy"), Some("http://example.org/p1"));
    }

    #[test]
    fn repeated_variable_must_unify() {
        let graph = sample();
        let rows = graph.select(&[
            TriplePattern::new(
                TermPattern::var("x"),
                TermPattern::iri("http://example.org/proxyFor"),
                TermPattern::var("x"),
            ),
        ]);
        assert!(rows.is_empty());
    }

    #[test]
    fn ask_reports_existence() {
        let graph = sample();
        assert!(graph.ask(&[TriplePattern::new(
            TermPattern::iri("http://example.org/ro"),
            TermPattern::iri("http://example.org/aggregates"),
            TermPattern::iri("http://example.org/r2"),
        )]));
        assert!(!graph.ask(&[TriplePattern::new(
            TermPattern::iri("http://example.org/ro"),
            TermPattern::iri("http://example.org/aggregates"),
            TermPattern::iri("http://example.org/r3"),
        )]));
    }

    #[test]
    fn row_order_follows_insertion_order() {
        let graph = sample();
        let rows = graph.select(&[TriplePattern::new(
            TermPattern::iri("http://example.org/ro"),
            TermPattern::iri("http://example.org/aggregates"),
            TermPattern::var("r"),
        )]);
        let targets: Vec<&str> = rows.iter().filter_map(|r| r.iri("r")).collect();
        assert_eq!(
            targets,
            vec!["http://example.org/r1", "http://example.org/r2"]
        );
    }
}
