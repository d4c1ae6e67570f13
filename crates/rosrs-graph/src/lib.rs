//! In-memory RDF graph for the Research Object client (query facade).
//!
//! This crate wraps a parsed semantic document behind two operations the
//! model layer consumes:
//!
//! - "run a pattern query, get variable bindings" ([`Graph::select`],
//!   [`Graph::ask`]), and
//! - point lookups on a known subject ([`Graph::objects`],
//!   [`Graph::first_iri`], [`Graph::types_of`], ...).
//!
//! Parsing uses **Sophia** for the serializations a Research Object
//! service emits: Turtle, RDF/XML (manifests) and N-Triples. Serializing
//! back out is N-Triples only, which is enough to round-trip annotation
//! bodies.

mod query;
mod term;

pub use query::{Bindings, TermPattern, TriplePattern};
pub use term::{Literal, Term};

use sophia::api::source::TripleSource;
use sophia::api::triple::Triple as _;
use std::collections::HashMap;

pub const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";

/// RDF serializations understood by [`Graph::parse`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RdfFormat {
    Turtle,
    RdfXml,
    NTriples,
}

#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("failed to parse {format:?}: {message}")]
    Parse { format: RdfFormat, message: String },
    #[error("unsupported RDF term form: {0}")]
    Term(String),
}

/// One statement. The subject is never a literal; the predicate is
/// always an IRI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Triple {
    pub subject: Term,
    pub predicate: String,
    pub object: Term,
}

/// An ordered set of triples with a subject index.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    triples: Vec<Triple>,
    by_subject: HashMap<Term, Vec<usize>>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a document into a graph. Relative IRIs are not resolved;
    /// service documents are expected to use absolute IRIs throughout.
    pub fn parse(bytes: &[u8], format: RdfFormat) -> Result<Self, GraphError> {
        let reader = std::io::BufReader::new(std::io::Cursor::new(bytes));
        let mut graph = Graph::new();
        match format {
            RdfFormat::Turtle => sophia::turtle::parser::turtle::parse_bufread(reader)
                .try_for_each_triple(|t| {
                    graph.insert_display(&t.s().to_string(), &t.p().to_string(), &t.o().to_string())
                })
                .map_err(|e| GraphError::Parse {
                    format,
                    message: e.to_string(),
                })?,
            RdfFormat::NTriples => sophia::turtle::parser::nt::parse_bufread(reader)
                .try_for_each_triple(|t| {
                    graph.insert_display(&t.s().to_string(), &t.p().to_string(), &t.o().to_string())
                })
                .map_err(|e| GraphError::Parse {
                    format,
                    message: e.to_string(),
                })?,
            RdfFormat::RdfXml => sophia::xml::parser::parse_bufread(reader)
                .try_for_each_triple(|t| {
                    graph.insert_display(&t.s().to_string(), &t.p().to_string(), &t.o().to_string())
                })
                .map_err(|e| GraphError::Parse {
                    format,
                    message: e.to_string(),
                })?,
        }
        Ok(graph)
    }

    fn insert_display(&mut self, s: &str, p: &str, o: &str) -> Result<(), GraphError> {
        let subject = term::parse_term_display(s)?;
        // Non-IRI predicates cannot occur in the vocabularies we query;
        // drop them rather than failing the whole document.
        let Term::Iri(predicate) = term::parse_term_display(p)? else {
            return Ok(());
        };
        let object = term::parse_term_display(o)?;
        self.insert(Triple {
            subject,
            predicate,
            object,
        });
        Ok(())
    }

    pub fn insert(&mut self, triple: Triple) {
        let index = self.triples.len();
        self.by_subject
            .entry(triple.subject.clone())
            .or_default()
            .push(index);
        self.triples.push(triple);
    }

    /// Merge another graph into this one, preserving insertion order.
    pub fn extend(&mut self, other: Graph) {
        for triple in other.triples {
            self.insert(triple);
        }
    }

    pub fn len(&self) -> usize {
        self.triples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    pub fn triples(&self) -> &[Triple] {
        &self.triples
    }

    /// Whether any statement has the given IRI as its subject.
    pub fn describes(&self, subject: &str) -> bool {
        self.by_subject
            .contains_key(&Term::Iri(subject.to_string()))
    }

    /// All objects of `(subject, predicate)`, in insertion order.
    pub fn objects(&self, subject: &str, predicate: &str) -> Vec<&Term> {
        let key = Term::Iri(subject.to_string());
        match self.by_subject.get(&key) {
            Some(indices) => indices
                .iter()
                .map(|&i| &self.triples[i])
                .filter(|t| t.predicate == predicate)
                .map(|t| &t.object)
                .collect(),
            None => Vec::new(),
        }
    }

    pub fn first_iri(&self, subject: &str, predicate: &str) -> Option<&str> {
        self.objects(subject, predicate)
            .into_iter()
            .find_map(Term::as_iri)
    }

    pub fn first_literal(&self, subject: &str, predicate: &str) -> Option<&Literal> {
        self.objects(subject, predicate)
            .into_iter()
            .find_map(Term::as_literal)
    }

    /// The asserted `rdf:type` IRIs of a subject, in assertion order.
    pub fn types_of(&self, subject: &str) -> Vec<&str> {
        self.objects(subject, RDF_TYPE)
            .into_iter()
            .filter_map(Term::as_iri)
            .collect()
    }

    pub fn has_type(&self, subject: &str, type_iri: &str) -> bool {
        self.types_of(subject).contains(&type_iri)
    }

    /// Run a conjunctive pattern query, returning one bindings row per
    /// solution in deterministic (insertion) order.
    pub fn select(&self, patterns: &[TriplePattern]) -> Vec<Bindings> {
        query::select(self, patterns)
    }

    /// Boolean existence query.
    pub fn ask(&self, patterns: &[TriplePattern]) -> bool {
        query::ask(self, patterns)
    }

    /// Serialize the graph as N-Triples, in insertion order.
    pub fn to_ntriples(&self) -> String {
        let mut out = String::new();
        for triple in &self.triples {
            out.push_str(&format!(
                "{} <{}> {} .\n",
                triple.subject, triple.predicate, triple.object
            ));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TURTLE: &str = r#"
@prefix ex: <http://example.org/> .
@prefix dcterms: <http://purl.org/dc/terms/> .
ex:ro a ex:ResearchObject ;
    dcterms:created "2011-12-02T15:02:12Z"^^<http://www.w3.org/2001/XMLSchema#dateTime> ;
    ex:aggregates ex:r1 .
ex:r1 dcterms:title "First"@en .
"#;

    const RDF_XML: &str = r#"<?xml version="1.0"?>
<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
         xmlns:ex="http://example.org/">
  <rdf:Description rdf:about="http://example.org/ro">
    <ex:aggregates rdf:resource="http://example.org/r1"/>
  </rdf:Description>
</rdf:RDF>
"#;

    #[test]
    fn parses_turtle() {
        let graph = Graph::parse(TURTLE.as_bytes(), RdfFormat::Turtle).unwrap();
        assert!(graph.describes("http://example.org/ro"));
        assert!(!graph.describes("http://example.org/nothing"));
        assert_eq!(
            graph.first_iri("http://example.org/ro", "http://example.org/aggregates"),
            Some("http://example.org/r1")
        );
        let created = graph
            .first_literal("http://example.org/ro", "http://purl.org/dc/terms/created")
            .unwrap();
        assert_eq!(created.lexical, "2011-12-02T15:02:12Z");
        assert!(graph.has_type("http://example.org/ro", "http://example.org/ResearchObject"));
    }

    #[test]
    fn parses_rdf_xml() {
        let graph = Graph::parse(RDF_XML.as_bytes(), RdfFormat::RdfXml).unwrap();
        assert_eq!(
            graph.first_iri("http://example.org/ro", "http://example.org/aggregates"),
            Some("http://example.org/r1")
        );
    }

    #[test]
    fn parse_failure_is_reported() {
        let err = Graph::parse(b"@prefix broken", RdfFormat::Turtle).unwrap_err();
        assert!(matches!(err, GraphError::Parse { .. }));
    }

    #[test]
    fn extend_merges_statements() {
        let mut graph = Graph::parse(TURTLE.as_bytes(), RdfFormat::Turtle).unwrap();
        let before = graph.len();
        let other = Graph::parse(
            b"<http://example.org/r1> <http://example.org/p> \"v\" .",
            RdfFormat::NTriples,
        )
        .unwrap();
        graph.extend(other);
        assert_eq!(graph.len(), before + 1);
        assert_eq!(
            graph
                .first_literal("http://example.org/r1", "http://example.org/p")
                .map(|l| l.lexical.as_str()),
            Some("v")
        );
    }

    #[test]
    fn ntriples_round_trip() {
        let graph = Graph::parse(TURTLE.as_bytes(), RdfFormat::Turtle).unwrap();
        let serialized = graph.to_ntriples();
        let reparsed = Graph::parse(serialized.as_bytes(), RdfFormat::NTriples).unwrap();
        assert_eq!(reparsed.len(), graph.len());
        let title = reparsed
            .first_literal("http://example.org/r1", "http://purl.org/dc/terms/title")
            .unwrap();
        assert_eq!(title.lexical, "First");
        assert_eq!(title.language.as_deref(), Some("en"));
    }
}
