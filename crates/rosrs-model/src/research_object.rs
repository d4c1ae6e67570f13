//! The research object aggregate.
//!
//! A [`ResearchObject`] owns every entity materialized from its
//! manifest: resources, folders, annotations, the target index and the
//! derived root views. Loading is a single transaction against the
//! remote store; mutations go remote-first and patch local state only
//! after the command succeeds, so a failed call leaves the aggregate
//! exactly as it was.

use std::collections::{BTreeSet, HashMap, VecDeque};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rosrs_graph::Graph;
use url::Url;

use crate::error::{Result, RoError};
use crate::evo::{EvoType, EvolutionInfo, JobStatus};
use crate::extract;
use crate::folder::{Folder, FolderEntry};
use crate::index::AnnotationIndex;
use crate::resource::{display_name, Resource};
use crate::service::{EvoService, RoService};
use crate::{vocab, Annotation, LoadState, Person};

pub struct ResearchObject {
    uri: Url,
    service: Arc<dyn RoService>,
    evo_service: Arc<dyn EvoService>,
    state: LoadState,
    creator: Option<Person>,
    created: Option<DateTime<Utc>>,
    resources: HashMap<Url, Resource>,
    folders: HashMap<Url, Folder>,
    annotations: HashMap<Url, Annotation>,
    index: AnnotationIndex,
    root_folders: Vec<Url>,
    root_resources: Vec<Url>,
    evo_type: Option<EvoType>,
    evolution: Option<EvolutionInfo>,
}

impl std::fmt::Debug for ResearchObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResearchObject")
            .field("uri", &self.uri)
            .field("state", &self.state)
            .field("resources", &self.resources.len())
            .field("folders", &self.folders.len())
            .field("annotations", &self.annotations.len())
            .finish()
    }
}

impl ResearchObject {
    pub fn new(uri: Url, service: Arc<dyn RoService>, evo_service: Arc<dyn EvoService>) -> Self {
        Self {
            uri,
            service,
            evo_service,
            state: LoadState::Unloaded,
            creator: None,
            created: None,
            resources: HashMap::new(),
            folders: HashMap::new(),
            annotations: HashMap::new(),
            index: AnnotationIndex::new(),
            root_folders: Vec::new(),
            root_resources: Vec::new(),
            evo_type: None,
            evolution: None,
        }
    }

    pub fn uri(&self) -> &Url {
        &self.uri
    }

    pub fn name(&self) -> String {
        display_name(&self.uri)
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    pub fn is_loaded(&self) -> bool {
        self.state == LoadState::Loaded
    }

    pub fn creator(&self) -> Option<&Person> {
        self.creator.as_ref()
    }

    pub fn created(&self) -> Option<DateTime<Utc>> {
        self.created
    }

    pub fn evo_type(&self) -> Option<EvoType> {
        self.evo_type
    }

    pub fn evolution(&self) -> Option<&EvolutionInfo> {
        self.evolution.as_ref()
    }

    pub fn evolution_loaded(&self) -> bool {
        self.evolution.is_some()
    }

    // ====================================================================
    // Loading
    // ====================================================================

    /// Fetch the manifest and materialize the aggregate. Idempotent: a
    /// loaded aggregate returns immediately without touching the
    /// network. On failure the previous state is restored and nothing
    /// is committed.
    pub fn load(&mut self) -> Result<()> {
        if self.state == LoadState::Loaded {
            return Ok(());
        }
        let previous = self.state;
        self.state = LoadState::Loading;
        match self.load_inner() {
            Ok(()) => {
                self.state = LoadState::Loaded;
                Ok(())
            }
            Err(e) => {
                self.state = previous;
                Err(e)
            }
        }
    }

    fn load_inner(&mut self) -> Result<()> {
        let doc = self.service.manifest(&self.uri)?;
        let mut graph = Graph::parse(&doc.bytes, doc.format)
            .map_err(|e| RoError::invalid(&self.uri, e.to_string()))?;
        if !graph.describes(self.uri.as_str()) {
            return Err(RoError::invalid(
                &self.uri,
                "manifest does not describe the research object",
            ));
        }

        let creator = extract::creator(&graph, &self.uri);
        let created = extract::created(&graph, &self.uri, &self.uri)?;
        let mut resources = extract::resources(&graph, &self.uri)?;
        let mut folders = extract::folders(&graph, &self.uri)?;
        let (mut annotations, index) = extract::annotations(&graph, &self.uri)?;

        // Annotation body documents are aggregated bookkeeping, not
        // user resources; keep them out of the resource map.
        for annotation in annotations.values() {
            resources.remove(annotation.body_uri());
        }

        // Annotation bodies are best-effort: an unreachable body leaves
        // its annotation unloaded but never fails the aggregate. Loaded
        // bodies are merged into the manifest graph so statements they
        // assert about the research object (its evolution class in
        // particular) are visible below.
        for annotation in annotations.values_mut() {
            match annotation.load(self.service.as_ref()) {
                Ok(()) => {
                    if let Ok(body) = annotation.body_graph() {
                        graph.extend(body.clone());
                    }
                }
                Err(e) => {
                    tracing::warn!(annotation = %annotation.uri(), error = %e, "annotation body not loaded");
                }
            }
        }
        let evo_type = extract::evo_type(&graph, &self.uri);

        // Folder contents are needed to derive the root views, so every
        // folder is loaded up front. An unreachable resource map is a
        // hard failure here.
        for folder in folders.values_mut() {
            let rmap_uri = folder.resource_map().clone();
            let doc = self.service.document(&rmap_uri)?;
            let rmap = Graph::parse(&doc.bytes, doc.format)
                .map_err(|e| RoError::invalid(&rmap_uri, e.to_string()))?;
            folder.set_entries(extract::folder_entries(&rmap, &rmap_uri)?);
        }

        let (root_folders, root_resources) = derive_roots(&resources, &folders);

        self.creator = creator;
        self.created = created;
        self.resources = resources;
        self.folders = folders;
        self.annotations = annotations;
        self.index = index;
        self.root_folders = root_folders;
        self.root_resources = root_resources;
        self.evo_type = evo_type;
        Ok(())
    }

    /// Load a folder's resource map if it is not loaded yet, optionally
    /// descending into entry targets that are themselves aggregated
    /// folders. Cycles between folders terminate via a seen-set.
    pub fn load_folder(&mut self, uri: &Url, recursive: bool) -> Result<()> {
        self.load()?;
        if !self.folders.contains_key(uri) {
            return Err(RoError::UnknownMember {
                uri: uri.clone(),
                member: "folder",
            });
        }
        let mut queue = VecDeque::from([uri.clone()]);
        let mut seen = BTreeSet::new();
        while let Some(next) = queue.pop_front() {
            if !seen.insert(next.clone()) {
                continue;
            }
            let Some(folder) = self.folders.get(&next) else {
                continue;
            };
            let entries = if folder.is_loaded() {
                folder.entries()?.clone()
            } else {
                let rmap_uri = folder.resource_map().clone();
                let doc = self.service.document(&rmap_uri)?;
                let rmap = Graph::parse(&doc.bytes, doc.format)
                    .map_err(|e| RoError::invalid(&rmap_uri, e.to_string()))?;
                let entries = extract::folder_entries(&rmap, &rmap_uri)?;
                if let Some(folder) = self.folders.get_mut(&next) {
                    folder.set_entries(entries.clone());
                }
                entries
            };
            if recursive {
                for entry in &entries {
                    if self.folders.contains_key(entry.target()) {
                        queue.push_back(entry.target().clone());
                    }
                }
            }
        }
        self.recompute_roots();
        Ok(())
    }

    // ====================================================================
    // Views
    // ====================================================================

    /// All aggregated plain resources, keyed by URI. Forces a load.
    pub fn resources(&mut self) -> Result<&HashMap<Url, Resource>> {
        self.load()?;
        Ok(&self.resources)
    }

    /// All aggregated folders, keyed by URI. Forces a load.
    pub fn folders(&mut self) -> Result<&HashMap<Url, Folder>> {
        self.load()?;
        Ok(&self.folders)
    }

    /// All aggregated annotations, keyed by URI. Forces a load.
    pub fn annotations(&mut self) -> Result<&HashMap<Url, Annotation>> {
        self.load()?;
        Ok(&self.annotations)
    }

    pub fn resource(&self, uri: &Url) -> Option<&Resource> {
        self.resources.get(uri)
    }

    pub fn folder(&self, uri: &Url) -> Option<&Folder> {
        self.folders.get(uri)
    }

    pub fn annotation(&self, uri: &Url) -> Option<&Annotation> {
        self.annotations.get(uri)
    }

    /// Folders no loaded folder lists as an entry target, sorted by
    /// display name. Forces a load.
    pub fn root_folders(&mut self) -> Result<Vec<&Folder>> {
        self.load()?;
        Ok(self
            .root_folders
            .iter()
            .filter_map(|uri| self.folders.get(uri))
            .collect())
    }

    /// Resources no loaded folder lists as an entry target, sorted by
    /// display name. Forces a load.
    pub fn root_resources(&mut self) -> Result<Vec<&Resource>> {
        self.load()?;
        Ok(self
            .root_resources
            .iter()
            .filter_map(|uri| self.resources.get(uri))
            .collect())
    }

    /// Entry targets of a folder that are themselves aggregated
    /// folders. The folder must already be loaded.
    pub fn subfolders(&self, folder: &Url) -> Result<Vec<&Folder>> {
        let folder = self.folders.get(folder).ok_or_else(|| RoError::UnknownMember {
            uri: folder.clone(),
            member: "folder",
        })?;
        Ok(folder
            .entries()?
            .iter()
            .filter_map(|entry| self.folders.get(entry.target()))
            .collect())
    }

    /// Entry targets of a folder that are not folders: resource
    /// references, which may dangle (cross-RO entries are tolerated).
    pub fn folder_resources(&self, folder: &Url) -> Result<Vec<&Url>> {
        let folder = self.folders.get(folder).ok_or_else(|| RoError::UnknownMember {
            uri: folder.clone(),
            member: "folder",
        })?;
        Ok(folder
            .entries()?
            .iter()
            .map(FolderEntry::target)
            .filter(|target| !self.folders.contains_key(target))
            .collect())
    }

    /// Annotations whose target set contains `target`. Forces a load.
    pub fn annotations_for(&mut self, target: &Url) -> Result<Vec<&Annotation>> {
        self.load()?;
        Ok(match self.index.annotations_for(target) {
            Some(uris) => uris
                .iter()
                .filter_map(|uri| self.annotations.get(uri))
                .collect(),
            None => Vec::new(),
        })
    }

    /// Literal values asserted for `(target, property)` across every
    /// loaded annotation body targeting `target`. With `merge` the
    /// values of each annotation collapse into one `"; "`-joined
    /// string, one entry per annotation.
    pub fn annotation_property_values(
        &mut self,
        target: &Url,
        property: &str,
        merge: bool,
    ) -> Result<Vec<String>> {
        self.load()?;
        let mut values = Vec::new();
        if let Some(uris) = self.index.annotations_for(target) {
            for uri in uris {
                if let Some(annotation) = self.annotations.get(uri) {
                    if annotation.is_loaded() {
                        let found = annotation.property_values(target, property)?;
                        if merge {
                            if !found.is_empty() {
                                values.push(found.join("; "));
                            }
                        } else {
                            values.extend(found);
                        }
                    }
                }
            }
        }
        Ok(values)
    }

    /// Property values asserted about the research object itself.
    pub fn property_values(&mut self, property: &str, merge: bool) -> Result<Vec<String>> {
        let uri = self.uri.clone();
        self.annotation_property_values(&uri, property, merge)
    }

    // ====================================================================
    // Mutations
    // ====================================================================

    /// Upload and aggregate a new resource. The remote command runs
    /// first; local state is patched only on success.
    pub fn create_resource(
        &mut self,
        path: &str,
        content: &[u8],
        content_type: &str,
    ) -> Result<&Resource> {
        self.load()?;
        let created = self
            .service
            .create_resource(&self.uri, path, content, content_type)?;
        let resource = Resource::new(created.uri.clone(), created.proxy, None, None);
        self.resources.insert(created.uri.clone(), resource);
        self.recompute_roots();
        Ok(&self.resources[&created.uri])
    }

    /// Aggregate a reference to a resource living outside the store.
    pub fn aggregate_external(&mut self, resource: &Url) -> Result<&Resource> {
        self.load()?;
        let created = self.service.aggregate_external(&self.uri, resource)?;
        let resource = Resource::new(created.uri.clone(), created.proxy, None, None);
        self.resources.insert(created.uri.clone(), resource);
        self.recompute_roots();
        Ok(&self.resources[&created.uri])
    }

    /// Create an aggregated folder. The new folder starts loaded and
    /// empty; nothing lists it yet, so it joins the root view.
    pub fn create_folder(&mut self, path: &str) -> Result<&Folder> {
        self.load()?;
        let created = self.service.create_folder(&self.uri, path)?;
        let mut folder = Folder::new(
            created.uri.clone(),
            created.proxy,
            created.resource_map,
            None,
            None,
            false,
        );
        folder.set_entries(BTreeSet::new());
        self.folders.insert(created.uri.clone(), folder);
        self.recompute_roots();
        Ok(&self.folders[&created.uri])
    }

    /// Create an annotation over one or more targets. If the command
    /// response echoes the body document it is parsed in place, saving
    /// the follow-up fetch.
    pub fn annotate(
        &mut self,
        targets: BTreeSet<Url>,
        body: &[u8],
        content_type: &str,
    ) -> Result<&Annotation> {
        self.load()?;
        let created = self
            .service
            .create_annotation(&self.uri, &targets, body, content_type)?;
        let effective = if created.targets.is_empty() {
            targets
        } else {
            created.targets
        };
        let mut annotation = Annotation::new(
            created.uri.clone(),
            created.body,
            effective.clone(),
            None,
            None,
        );
        if let Some(doc) = created.body_document {
            match Graph::parse(&doc.bytes, doc.format) {
                Ok(graph) => annotation.set_body(graph),
                Err(e) => {
                    tracing::warn!(annotation = %created.uri, error = %e, "echoed annotation body not parseable");
                }
            }
        }
        for target in &effective {
            self.index.insert(&created.uri, target);
        }
        self.annotations.insert(created.uri.clone(), annotation);
        Ok(&self.annotations[&created.uri])
    }

    /// Delete an aggregated resource. Annotations targeting it lose the
    /// target; annotations left with no target at all are dropped from
    /// the aggregate.
    pub fn delete_resource(&mut self, uri: &Url) -> Result<()> {
        self.load()?;
        if !self.resources.contains_key(uri) {
            return Err(RoError::UnknownMember {
                uri: uri.clone(),
                member: "resource",
            });
        }
        self.service.delete(uri)?;
        self.resources.remove(uri);
        self.apply_target_removal(uri);
        self.recompute_roots();
        Ok(())
    }

    /// Delete an aggregated folder. Entry targets stay aggregated; they
    /// surface in the root views once nothing else lists them.
    pub fn delete_folder(&mut self, uri: &Url) -> Result<()> {
        self.load()?;
        if !self.folders.contains_key(uri) {
            return Err(RoError::UnknownMember {
                uri: uri.clone(),
                member: "folder",
            });
        }
        self.service.delete(uri)?;
        self.folders.remove(uri);
        self.apply_target_removal(uri);
        self.recompute_roots();
        Ok(())
    }

    /// Delete an annotation, removing it from every target's bucket.
    pub fn delete_annotation(&mut self, uri: &Url) -> Result<()> {
        self.load()?;
        if !self.annotations.contains_key(uri) {
            return Err(RoError::UnknownMember {
                uri: uri.clone(),
                member: "annotation",
            });
        }
        self.service.delete(uri)?;
        self.index.remove_annotation(uri);
        self.annotations.remove(uri);
        Ok(())
    }

    /// Delete the research object itself. On success every local
    /// collection is cleared and the handle flips back to unloaded.
    pub fn delete(&mut self) -> Result<()> {
        self.service.delete(&self.uri)?;
        self.creator = None;
        self.created = None;
        self.resources.clear();
        self.folders.clear();
        self.annotations.clear();
        self.index = AnnotationIndex::new();
        self.root_folders.clear();
        self.root_resources.clear();
        self.evo_type = None;
        self.evolution = None;
        self.state = LoadState::Unloaded;
        Ok(())
    }

    fn apply_target_removal(&mut self, target: &Url) {
        let removal = self.index.remove_target(target);
        for annotation_uri in &removal.touched {
            if let Some(annotation) = self.annotations.get_mut(annotation_uri) {
                annotation.remove_target(target);
            }
        }
        for annotation_uri in &removal.orphaned {
            self.annotations.remove(annotation_uri);
        }
    }

    fn recompute_roots(&mut self) {
        let (root_folders, root_resources) = derive_roots(&self.resources, &self.folders);
        self.root_folders = root_folders;
        self.root_resources = root_resources;
    }

    // ====================================================================
    // Evolution
    // ====================================================================

    /// Fetch the lineage document and populate [`Self::evolution`].
    /// Does not touch the manifest, so lineage is available even when
    /// the aggregate itself cannot be loaded. A document that does not
    /// describe this research object is logged and skipped, leaving the
    /// lineage unset.
    pub fn load_evolution(&mut self) -> Result<()> {
        let doc = self.evo_service.evolution_document(&self.uri)?;
        let graph = Graph::parse(&doc.bytes, doc.format)
            .map_err(|e| RoError::invalid(&self.uri, e.to_string()))?;
        if !graph.describes(self.uri.as_str()) {
            tracing::warn!(ro = %self.uri, "evolution document does not describe this research object");
            return Ok(());
        }
        let subject = self.uri.as_str();
        let mut info = EvolutionInfo {
            evo_type: extract::evo_type(&graph, &self.uri),
            ..EvolutionInfo::default()
        };
        // An archived snapshot carries both provenance predicates; the
        // archive relation wins.
        let live = graph
            .first_iri(subject, vocab::roevo::IS_ARCHIVE_OF)
            .or_else(|| graph.first_iri(subject, vocab::roevo::IS_SNAPSHOT_OF));
        if let Some(live) = live {
            info.live = Some(extract::parse_url(live, &self.uri)?);
        }
        if let Some(previous) = graph.first_iri(subject, vocab::prov::WAS_REVISION_OF) {
            info.previous_snapshot = Some(extract::parse_url(previous, &self.uri)?);
        }
        for term in graph.objects(subject, vocab::roevo::HAS_SNAPSHOT) {
            if let Some(iri) = term.as_iri() {
                info.snapshots.insert(extract::parse_url(iri, &self.uri)?);
            }
        }
        for term in graph.objects(subject, vocab::roevo::HAS_ARCHIVE) {
            if let Some(iri) = term.as_iri() {
                info.archives.insert(extract::parse_url(iri, &self.uri)?);
            }
        }
        // The lineage document is the authority on the evolution class,
        // even when it asserts none.
        self.evo_type = info.evo_type;
        self.evolution = Some(info);
        Ok(())
    }

    /// Submit a snapshot job for this research object. The returned
    /// handle is live; poll it through the evolution service.
    pub fn snapshot(&self, target: &str) -> Result<JobStatus> {
        Ok(self.evo_service.create_snapshot(&self.uri, target, true)?)
    }

    /// Submit an archive job for this research object.
    pub fn archive(&self, target: &str) -> Result<JobStatus> {
        Ok(self.evo_service.create_archive(&self.uri, target, true)?)
    }
}

/// Root views by elimination: every aggregated folder or resource is a
/// root candidate until some loaded folder lists it as an entry target.
/// Both views sort by display name, then URI for ties, so the order is
/// stable across loads.
fn derive_roots(
    resources: &HashMap<Url, Resource>,
    folders: &HashMap<Url, Folder>,
) -> (Vec<Url>, Vec<Url>) {
    let mut candidates: BTreeSet<&Url> = resources.keys().chain(folders.keys()).collect();
    for folder in folders.values() {
        if let Ok(entries) = folder.entries() {
            for entry in entries {
                candidates.remove(entry.target());
            }
        }
    }
    let mut root_folders = Vec::new();
    let mut root_resources = Vec::new();
    for uri in candidates {
        if folders.contains_key(uri) {
            root_folders.push(uri.clone());
        } else {
            root_resources.push(uri.clone());
        }
    }
    let by_name = |a: &Url, b: &Url| display_name(a).cmp(&display_name(b)).then_with(|| a.cmp(b));
    root_folders.sort_by(by_name);
    root_resources.sort_by(by_name);
    (root_folders, root_resources)
}
