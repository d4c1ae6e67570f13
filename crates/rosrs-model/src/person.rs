//! Creator attribution.

use rosrs_graph::{Graph, Term};
use url::Url;

use crate::vocab;

/// A `dcterms:creator` value: an optional identifying URI and an
/// optional `foaf:name`. Embedded by value wherever a creator appears.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Person {
    pub uri: Option<Url>,
    pub name: Option<String>,
}

impl Person {
    /// Build a person from a creator term, looking up `foaf:name` in the
    /// same graph when the creator is identified by IRI. Blank-node
    /// creators carry no usable identity and yield `None`.
    pub fn from_term(term: &Term, graph: &Graph) -> Option<Person> {
        match term {
            Term::Iri(iri) => {
                let name = graph
                    .first_literal(iri, vocab::foaf::NAME)
                    .map(|l| l.lexical.clone());
                Some(Person {
                    uri: Url::parse(iri).ok(),
                    name,
                })
            }
            Term::Literal(lit) => Some(Person {
                uri: None,
                name: Some(lit.lexical.clone()),
            }),
            Term::Blank(_) => None,
        }
    }
}
