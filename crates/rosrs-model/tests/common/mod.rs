//! In-memory store used by the aggregate tests: serves canned RDF
//! documents, fabricates creation responses, and records every delete.

use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use rosrs_graph::RdfFormat;
use rosrs_model::{
    CreatedAnnotation, CreatedFolder, CreatedResource, Document, EvoService, EvoType, JobState,
    JobStatus, ResearchObject, RoService, TransportError,
};
use url::Url;

pub const RO1: &str = "http://example.org/ro1/";

pub const MANIFEST_TTL: &str = r#"
@prefix ore: <http://www.openarchives.org/ore/terms/> .
@prefix ro: <http://purl.org/wf4ever/ro#> .
@prefix ao: <http://purl.org/ao/> .
@prefix dcterms: <http://purl.org/dc/terms/> .
@prefix foaf: <http://xmlns.com/foaf/0.1/> .
@prefix xsd: <http://www.w3.org/2001/XMLSchema#> .

<http://example.org/ro1/> a ro:ResearchObject ;
    dcterms:creator <http://example.org/users/alice> ;
    dcterms:created "2011-12-02T15:02:12Z"^^xsd:dateTime ;
    ore:aggregates <http://example.org/ro1/r1>,
        <http://example.org/ro1/r1b.txt>,
        <http://example.org/ro1/folder1/>,
        <http://example.org/ro1/.ro/annotations/1> ;
    ro:rootFolder <http://example.org/ro1/folder1/> .

<http://example.org/users/alice> foaf:name "Alice" .

<http://example.org/ro1/r1> a ro:Resource ;
    dcterms:created "2011-12-02T16:01:10Z"^^xsd:dateTime .
<http://example.org/ro1/.ro/proxies/1> ore:proxyFor <http://example.org/ro1/r1> .

<http://example.org/ro1/r1b.txt> a ro:Resource .
<http://example.org/ro1/.ro/proxies/2> ore:proxyFor <http://example.org/ro1/r1b.txt> .

<http://example.org/ro1/folder1/> a ro:Resource, ro:Folder ;
    ore:isDescribedBy <http://example.org/ro1/folder1.ttl> .
<http://example.org/ro1/.ro/proxies/3> ore:proxyFor <http://example.org/ro1/folder1/> .

<http://example.org/ro1/.ro/annotations/1> a ro:AggregatedAnnotation ;
    ao:body <http://example.org/ro1/body1.ttl> ;
    ro:annotatesAggregatedResource <http://example.org/ro1/>, <http://example.org/ro1/r1> .
"#;

pub const FOLDER1_TTL: &str = r#"
@prefix ro: <http://purl.org/wf4ever/ro#> .
@prefix ore: <http://www.openarchives.org/ore/terms/> .

<http://example.org/ro1/folder1.ttl#entry1> a ro:FolderEntry ;
    ore:proxyFor <http://example.org/ro1/r1b.txt> ;
    ro:entryName "r1b.txt" .
"#;

pub const BODY1_TTL: &str = r#"
@prefix dcterms: <http://purl.org/dc/terms/> .

<http://example.org/ro1/> dcterms:title "My research object" .
<http://example.org/ro1/r1> dcterms:description "First result" .
"#;

pub fn url(s: &str) -> Url {
    Url::parse(s).unwrap()
}

#[derive(Default)]
pub struct MockStore {
    documents: Mutex<HashMap<Url, Document>>,
    evo_documents: Mutex<HashMap<Url, Document>>,
    /// Fetches of these URIs answer 404.
    unreachable: Mutex<BTreeSet<Url>>,
    /// Commands against these URIs answer 403.
    rejected: Mutex<BTreeSet<Url>>,
    deleted: Mutex<Vec<Url>>,
    manifest_fetches: AtomicUsize,
    document_fetches: AtomicUsize,
    next_id: AtomicUsize,
    job_outcome: Mutex<Option<(JobState, Option<String>)>>,
}

impl MockStore {
    pub fn new() -> Arc<Self> {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
        Arc::new(Self::default())
    }

    /// A store pre-seeded with the ro1 fixture.
    pub fn with_ro1() -> Arc<Self> {
        let store = Self::new();
        store.put(RO1, MANIFEST_TTL);
        store.put("http://example.org/ro1/folder1.ttl", FOLDER1_TTL);
        store.put("http://example.org/ro1/body1.ttl", BODY1_TTL);
        store
    }

    pub fn put(&self, uri: &str, turtle: &str) {
        self.documents.lock().insert(
            url(uri),
            Document {
                bytes: turtle.as_bytes().to_vec(),
                format: RdfFormat::Turtle,
            },
        );
    }

    pub fn put_evo(&self, ro: &str, turtle: &str) {
        self.evo_documents.lock().insert(
            url(ro),
            Document {
                bytes: turtle.as_bytes().to_vec(),
                format: RdfFormat::Turtle,
            },
        );
    }

    pub fn make_unreachable(&self, uri: &str) {
        self.unreachable.lock().insert(url(uri));
    }

    pub fn reject(&self, uri: &str) {
        self.rejected.lock().insert(url(uri));
    }

    pub fn set_job_outcome(&self, state: JobState, reason: Option<&str>) {
        *self.job_outcome.lock() = Some((state, reason.map(str::to_string)));
    }

    pub fn deleted(&self) -> Vec<Url> {
        self.deleted.lock().clone()
    }

    pub fn manifest_fetches(&self) -> usize {
        self.manifest_fetches.load(Ordering::SeqCst)
    }

    pub fn document_fetches(&self) -> usize {
        self.document_fetches.load(Ordering::SeqCst)
    }

    fn lookup(&self, uri: &Url) -> Result<Document, TransportError> {
        if self.unreachable.lock().contains(uri) {
            return Err(TransportError::with_status(404, format!("<{uri}> not found")));
        }
        self.documents
            .lock()
            .get(uri)
            .cloned()
            .ok_or_else(|| TransportError::with_status(404, format!("<{uri}> not found")))
    }

    fn check_command(&self, uri: &Url) -> Result<(), TransportError> {
        if self.rejected.lock().contains(uri) {
            return Err(TransportError::with_status(403, format!("<{uri}> forbidden")));
        }
        Ok(())
    }

    fn next_id(&self) -> usize {
        self.next_id.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn join(base: &Url, path: &str) -> Result<Url, TransportError> {
        base.join(path)
            .map_err(|e| TransportError::new(e.to_string()))
    }
}

impl RoService for MockStore {
    fn manifest(&self, ro: &Url) -> Result<Document, TransportError> {
        self.manifest_fetches.fetch_add(1, Ordering::SeqCst);
        self.lookup(ro)
    }

    fn document(&self, uri: &Url) -> Result<Document, TransportError> {
        self.document_fetches.fetch_add(1, Ordering::SeqCst);
        self.lookup(uri)
    }

    fn create_research_object(&self, id: &str) -> Result<Url, TransportError> {
        Url::parse(&format!("http://example.org/{id}/"))
            .map_err(|e| TransportError::new(e.to_string()))
    }

    fn create_resource(
        &self,
        ro: &Url,
        path: &str,
        _content: &[u8],
        _content_type: &str,
    ) -> Result<CreatedResource, TransportError> {
        let uri = Self::join(ro, path)?;
        self.check_command(&uri)?;
        let proxy = Self::join(ro, &format!(".ro/proxies/p{}", self.next_id()))?;
        Ok(CreatedResource { uri, proxy })
    }

    fn aggregate_external(
        &self,
        ro: &Url,
        resource: &Url,
    ) -> Result<CreatedResource, TransportError> {
        self.check_command(resource)?;
        let proxy = Self::join(ro, &format!(".ro/proxies/p{}", self.next_id()))?;
        Ok(CreatedResource {
            uri: resource.clone(),
            proxy,
        })
    }

    fn create_folder(&self, ro: &Url, path: &str) -> Result<CreatedFolder, TransportError> {
        let uri = Self::join(ro, &format!("{path}/"))?;
        self.check_command(&uri)?;
        let proxy = Self::join(ro, &format!(".ro/proxies/p{}", self.next_id()))?;
        let resource_map = Self::join(ro, &format!("{path}.ttl"))?;
        Ok(CreatedFolder {
            uri,
            proxy,
            resource_map,
        })
    }

    fn create_annotation(
        &self,
        ro: &Url,
        targets: &BTreeSet<Url>,
        body: &[u8],
        _content_type: &str,
    ) -> Result<CreatedAnnotation, TransportError> {
        let id = self.next_id();
        let uri = Self::join(ro, &format!(".ro/annotations/new-{id}"))?;
        self.check_command(&uri)?;
        let body_uri = Self::join(ro, &format!(".ro/bodies/new-{id}.ttl"))?;
        let document = Document {
            bytes: body.to_vec(),
            format: RdfFormat::Turtle,
        };
        self.documents.lock().insert(body_uri.clone(), document.clone());
        Ok(CreatedAnnotation {
            uri,
            body: body_uri,
            targets: targets.clone(),
            body_document: Some(document),
        })
    }

    fn delete(&self, uri: &Url) -> Result<(), TransportError> {
        self.check_command(uri)?;
        self.deleted.lock().push(uri.clone());
        Ok(())
    }
}

impl EvoService for MockStore {
    fn evolution_document(&self, ro: &Url) -> Result<Document, TransportError> {
        self.evo_documents
            .lock()
            .get(ro)
            .cloned()
            .ok_or_else(|| TransportError::with_status(404, format!("no lineage for <{ro}>")))
    }

    fn create_snapshot(
        &self,
        copy_from: &Url,
        target: &str,
        finalize: bool,
    ) -> Result<JobStatus, TransportError> {
        let job = JobStatus::new(copy_from.clone(), EvoType::Snapshot, finalize);
        job.set_job_uri(Self::join(copy_from, &format!("jobs/{}", self.next_id()))?);
        job.set_target(target);
        job.set_state_and_reason(JobState::Running, None);
        Ok(job)
    }

    fn create_archive(
        &self,
        copy_from: &Url,
        target: &str,
        finalize: bool,
    ) -> Result<JobStatus, TransportError> {
        let job = JobStatus::new(copy_from.clone(), EvoType::Archive, finalize);
        job.set_job_uri(Self::join(copy_from, &format!("jobs/{}", self.next_id()))?);
        job.set_target(target);
        job.set_state_and_reason(JobState::Running, None);
        Ok(job)
    }

    fn refresh(&self, job: &JobStatus) -> Result<(), TransportError> {
        match self.job_outcome.lock().clone() {
            Some((state, reason)) => {
                job.set_state_and_reason(state, reason);
                Ok(())
            }
            None => Ok(()),
        }
    }
}

/// The ro1 aggregate, unloaded, backed by the given store.
pub fn ro1(store: &Arc<MockStore>) -> ResearchObject {
    ResearchObject::new(url(RO1), store.clone(), store.clone())
}
