//! Collaborator interfaces: the remote Research Object store and the
//! evolution service.
//!
//! The core only consumes these traits; wire formats, authentication
//! and retry policy are the implementors' concern. Command responses
//! carry enough metadata (created URIs, proxies, links, and for
//! annotations the response body document) for the core to patch its
//! in-memory state without re-fetching the manifest.

use std::collections::BTreeSet;

use rosrs_graph::RdfFormat;
use url::Url;

use crate::evo::JobStatus;

/// A remote call failed or returned an unexpected status.
#[derive(Debug, thiserror::Error)]
#[error("remote call failed: {message}")]
pub struct TransportError {
    pub status: Option<u16>,
    pub message: String,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
        }
    }

    pub fn with_status(status: u16, message: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            message: message.into(),
        }
    }
}

/// A fetched document together with the serialization it arrived in.
#[derive(Debug, Clone)]
pub struct Document {
    pub bytes: Vec<u8>,
    pub format: RdfFormat,
}

#[derive(Debug, Clone)]
pub struct CreatedResource {
    pub uri: Url,
    pub proxy: Url,
}

#[derive(Debug, Clone)]
pub struct CreatedFolder {
    pub uri: Url,
    pub proxy: Url,
    pub resource_map: Url,
}

#[derive(Debug, Clone)]
pub struct CreatedAnnotation {
    pub uri: Url,
    pub body: Url,
    /// Targets echoed by the service; may be empty if it did not echo
    /// them, in which case the requested targets apply.
    pub targets: BTreeSet<Url>,
    /// The annotation body as returned by the command response, so the
    /// caller can parse it instead of re-fetching.
    pub body_document: Option<Document>,
}

/// The Research Object store (manifest fetch plus mutation commands).
/// All calls are blocking; concurrency is the caller's concern.
pub trait RoService: Send + Sync {
    fn manifest(&self, ro: &Url) -> Result<Document, TransportError>;

    /// Fetch any graph document (resource maps, annotation bodies).
    fn document(&self, uri: &Url) -> Result<Document, TransportError>;

    fn create_research_object(&self, id: &str) -> Result<Url, TransportError>;

    fn create_resource(
        &self,
        ro: &Url,
        path: &str,
        content: &[u8],
        content_type: &str,
    ) -> Result<CreatedResource, TransportError>;

    /// Aggregate a reference to a resource external to the store.
    fn aggregate_external(&self, ro: &Url, resource: &Url)
        -> Result<CreatedResource, TransportError>;

    fn create_folder(&self, ro: &Url, path: &str) -> Result<CreatedFolder, TransportError>;

    fn create_annotation(
        &self,
        ro: &Url,
        targets: &BTreeSet<Url>,
        body: &[u8],
        content_type: &str,
    ) -> Result<CreatedAnnotation, TransportError>;

    fn delete(&self, uri: &Url) -> Result<(), TransportError>;
}

/// The evolution service: lineage documents and snapshot/archive jobs.
pub trait EvoService: Send + Sync {
    /// Fetch the lineage document for a research object. This is a
    /// distinct document, not the manifest.
    fn evolution_document(&self, ro: &Url) -> Result<Document, TransportError>;

    fn create_snapshot(
        &self,
        copy_from: &Url,
        target: &str,
        finalize: bool,
    ) -> Result<JobStatus, TransportError>;

    fn create_archive(
        &self,
        copy_from: &Url,
        target: &str,
        finalize: bool,
    ) -> Result<JobStatus, TransportError>;

    /// Poll the remote job once and apply the observed state and reason
    /// to the handle as one unit.
    fn refresh(&self, job: &JobStatus) -> Result<(), TransportError>;
}
