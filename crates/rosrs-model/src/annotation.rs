//! Annotations with lazily loaded bodies.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use rosrs_graph::{Graph, Term, Triple};
use url::Url;

use crate::error::{Result, RoError};
use crate::service::RoService;
use crate::{LoadState, Person};

/// An aggregated annotation: a body document attached to one or more
/// target entities. The body is fetched lazily; statement accessors are
/// only valid once it has been loaded.
#[derive(Debug, Clone)]
pub struct Annotation {
    uri: Url,
    body_uri: Url,
    targets: BTreeSet<Url>,
    creator: Option<Person>,
    created: Option<DateTime<Utc>>,
    state: LoadState,
    body: Option<Graph>,
}

impl Annotation {
    pub(crate) fn new(
        uri: Url,
        body_uri: Url,
        targets: BTreeSet<Url>,
        creator: Option<Person>,
        created: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            uri,
            body_uri,
            targets,
            creator,
            created,
            state: LoadState::Unloaded,
            body: None,
        }
    }

    pub fn uri(&self) -> &Url {
        &self.uri
    }

    pub fn body_uri(&self) -> &Url {
        &self.body_uri
    }

    pub fn targets(&self) -> &BTreeSet<Url> {
        &self.targets
    }

    pub fn creator(&self) -> Option<&Person> {
        self.creator.as_ref()
    }

    pub fn created(&self) -> Option<DateTime<Utc>> {
        self.created
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    pub fn is_loaded(&self) -> bool {
        self.state == LoadState::Loaded
    }

    pub(crate) fn add_target(&mut self, target: Url) {
        self.targets.insert(target);
    }

    pub(crate) fn remove_target(&mut self, target: &Url) {
        self.targets.remove(target);
    }

    /// Fetch and parse the body document. A no-op if already loaded.
    pub fn load(&mut self, service: &dyn RoService) -> Result<()> {
        if self.state == LoadState::Loaded {
            return Ok(());
        }
        self.state = LoadState::Loading;
        let result = (|| {
            let doc = service.document(&self.body_uri)?;
            Graph::parse(&doc.bytes, doc.format)
                .map_err(|e| RoError::invalid(&self.body_uri, e.to_string()))
        })();
        match result {
            Ok(graph) => {
                self.body = Some(graph);
                self.state = LoadState::Loaded;
                Ok(())
            }
            Err(e) => {
                self.state = LoadState::Unloaded;
                Err(e)
            }
        }
    }

    /// Use an already-parsed body (e.g. from a command response)
    /// instead of fetching it.
    pub(crate) fn set_body(&mut self, body: Graph) {
        self.body = Some(body);
        self.state = LoadState::Loaded;
    }

    pub fn body_graph(&self) -> Result<&Graph> {
        match (&self.state, &self.body) {
            (LoadState::Loaded, Some(graph)) => Ok(graph),
            _ => Err(RoError::not_loaded("annotation", &self.uri)),
        }
    }

    /// All statements the loaded body asserts.
    pub fn statements(&self) -> Result<&[Triple]> {
        self.body_graph().map(Graph::triples)
    }

    /// Literal values the body asserts for `(subject, property)`.
    pub fn property_values(&self, subject: &Url, property: &str) -> Result<Vec<String>> {
        let graph = self.body_graph()?;
        Ok(graph
            .objects(subject.as_str(), property)
            .into_iter()
            .filter_map(|term| match term {
                Term::Literal(lit) => Some(lit.lexical.clone()),
                _ => None,
            })
            .collect())
    }

    /// The loaded body serialized as N-Triples.
    pub fn body_serialized(&self) -> Result<String> {
        self.body_graph().map(Graph::to_ntriples)
    }
}
