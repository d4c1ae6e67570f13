//! Entity extractors: pure functions from manifest (or resource-map)
//! query bindings to typed entities. No network access and no mutation
//! of the aggregate happen here.

use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Utc};
use rosrs_graph::{Graph, Literal, TermPattern, TriplePattern};
use url::Url;

use crate::error::{Result, RoError};
use crate::evo::EvoType;
use crate::folder::{Folder, FolderEntry};
use crate::index::AnnotationIndex;
use crate::resource::{display_name, Resource};
use crate::{vocab, Annotation, Person};

pub(crate) fn parse_url(value: &str, source: &Url) -> Result<Url> {
    Url::parse(value).map_err(|e| RoError::invalid(source, format!("malformed URI <{value}>: {e}")))
}

fn parse_created(literal: &Literal, source: &Url) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(&literal.lexical)
        .map(|d| d.with_timezone(&Utc))
        .map_err(|e| {
            RoError::invalid(
                source,
                format!("malformed dcterms:created {:?}: {e}", literal.lexical),
            )
        })
}

/// `dcterms:creator` of a subject, if any.
pub(crate) fn creator(graph: &Graph, subject: &Url) -> Option<Person> {
    graph
        .objects(subject.as_str(), vocab::dcterms::CREATOR)
        .first()
        .and_then(|term| Person::from_term(term, graph))
}

/// `dcterms:created` of a subject; a malformed value is invalid source
/// data, a missing one is not.
pub(crate) fn created(graph: &Graph, subject: &Url, source: &Url) -> Result<Option<DateTime<Utc>>> {
    match graph.first_literal(subject.as_str(), vocab::dcterms::CREATED) {
        Some(literal) => parse_created(literal, source).map(Some),
        None => Ok(None),
    }
}

/// Aggregated `ro:Resource`s that are not folders, keyed by URI.
pub(crate) fn resources(graph: &Graph, ro: &Url) -> Result<HashMap<Url, Resource>> {
    let patterns = [
        TriplePattern::new(
            TermPattern::iri(ro.as_str()),
            TermPattern::iri(vocab::ore::AGGREGATES),
            TermPattern::var("resource"),
        ),
        TriplePattern::new(
            TermPattern::var("resource"),
            TermPattern::iri(vocab::RDF_TYPE),
            TermPattern::iri(vocab::ro::RESOURCE),
        ),
        TriplePattern::new(
            TermPattern::var("proxy"),
            TermPattern::iri(vocab::ore::PROXY_FOR),
            TermPattern::var("resource"),
        ),
    ];

    let mut out = HashMap::new();
    for row in graph.select(&patterns) {
        let Some(resource_iri) = row.iri("resource") else {
            continue;
        };
        if graph.has_type(resource_iri, vocab::ro::FOLDER) {
            continue;
        }
        let Some(proxy_iri) = row.iri("proxy") else {
            continue;
        };
        let uri = parse_url(resource_iri, ro)?;
        let proxy = parse_url(proxy_iri, ro)?;
        let creator = creator(graph, &uri);
        let created = created(graph, &uri, ro)?;
        out.insert(uri.clone(), Resource::new(uri, proxy, creator, created));
    }
    Ok(out)
}

/// Aggregated `ro:Folder`s with a resource-map link, keyed by URI. Each
/// folder also records whether the manifest explicitly asserts it as the
/// RO's root folder (a separate existence query per folder).
pub(crate) fn folders(graph: &Graph, ro: &Url) -> Result<HashMap<Url, Folder>> {
    let patterns = [
        TriplePattern::new(
            TermPattern::iri(ro.as_str()),
            TermPattern::iri(vocab::ore::AGGREGATES),
            TermPattern::var("folder"),
        ),
        TriplePattern::new(
            TermPattern::var("folder"),
            TermPattern::iri(vocab::RDF_TYPE),
            TermPattern::iri(vocab::ro::FOLDER),
        ),
        TriplePattern::new(
            TermPattern::var("folder"),
            TermPattern::iri(vocab::ore::IS_DESCRIBED_BY),
            TermPattern::var("resourcemap"),
        ),
        TriplePattern::new(
            TermPattern::var("proxy"),
            TermPattern::iri(vocab::ore::PROXY_FOR),
            TermPattern::var("folder"),
        ),
    ];

    let mut out = HashMap::new();
    for row in graph.select(&patterns) {
        let (Some(folder_iri), Some(proxy_iri), Some(rmap_iri)) =
            (row.iri("folder"), row.iri("proxy"), row.iri("resourcemap"))
        else {
            continue;
        };
        let uri = parse_url(folder_iri, ro)?;
        let proxy = parse_url(proxy_iri, ro)?;
        let resource_map = parse_url(rmap_iri, ro)?;
        let creator = creator(graph, &uri);
        let created = created(graph, &uri, ro)?;
        let root_asserted = graph.ask(&[TriplePattern::new(
            TermPattern::iri(ro.as_str()),
            TermPattern::iri(vocab::ro::ROOT_FOLDER),
            TermPattern::iri(folder_iri),
        )]);
        out.insert(
            uri.clone(),
            Folder::new(uri, proxy, resource_map, creator, created, root_asserted),
        );
    }
    Ok(out)
}

/// Aggregated annotations, folded by annotation URI: multiple bindings
/// for one annotation merge their targets into a single entity before
/// anything is inserted into the target-keyed index, so no target
/// bucket ever sees a duplicate.
pub(crate) fn annotations(
    graph: &Graph,
    ro: &Url,
) -> Result<(HashMap<Url, Annotation>, AnnotationIndex)> {
    let patterns = [
        TriplePattern::new(
            TermPattern::iri(ro.as_str()),
            TermPattern::iri(vocab::ore::AGGREGATES),
            TermPattern::var("annotation"),
        ),
        TriplePattern::new(
            TermPattern::var("annotation"),
            TermPattern::iri(vocab::RDF_TYPE),
            TermPattern::iri(vocab::ro::AGGREGATED_ANNOTATION),
        ),
        TriplePattern::new(
            TermPattern::var("annotation"),
            TermPattern::iri(vocab::ao::BODY),
            TermPattern::var("body"),
        ),
        TriplePattern::new(
            TermPattern::var("annotation"),
            TermPattern::iri(vocab::ro::ANNOTATES_AGGREGATED_RESOURCE),
            TermPattern::var("target"),
        ),
    ];

    let mut annotations: HashMap<Url, Annotation> = HashMap::new();
    let mut index = AnnotationIndex::new();
    for row in graph.select(&patterns) {
        let (Some(annotation_iri), Some(target_iri)) = (row.iri("annotation"), row.iri("target"))
        else {
            continue;
        };
        let uri = parse_url(annotation_iri, ro)?;
        let target = parse_url(target_iri, ro)?;
        match annotations.get_mut(&uri) {
            Some(existing) => existing.add_target(target.clone()),
            None => {
                let Some(body_iri) = row.iri("body") else {
                    continue;
                };
                let body = parse_url(body_iri, ro)?;
                let creator = creator(graph, &uri);
                let created = created(graph, &uri, ro)?;
                let targets: BTreeSet<Url> = [target.clone()].into_iter().collect();
                annotations.insert(
                    uri.clone(),
                    Annotation::new(uri.clone(), body, targets, creator, created),
                );
            }
        }
        index.insert(&uri, &target);
    }
    Ok((annotations, index))
}

/// The evolution class among a subject's asserted types. When several
/// are asserted at once the first in statement order is reported; the
/// precedence is deliberately left undefined.
pub(crate) fn evo_type(graph: &Graph, subject: &Url) -> Option<EvoType> {
    for asserted in graph.types_of(subject.as_str()) {
        match asserted {
            vocab::roevo::LIVE_RO => return Some(EvoType::Live),
            vocab::roevo::SNAPSHOT_RO => return Some(EvoType::Snapshot),
            vocab::roevo::ARCHIVED_RO => return Some(EvoType::Archive),
            _ => {}
        }
    }
    None
}

/// Entries of a folder's resource-map document. An entry needs a node
/// typed `ro:FolderEntry` with a `ore:proxyFor` target; the display name
/// falls back to the target's URI-derived name when `ro:entryName` is
/// absent. Blank-node entries are skipped.
pub(crate) fn folder_entries(graph: &Graph, resource_map: &Url) -> Result<BTreeSet<FolderEntry>> {
    let patterns = [
        TriplePattern::new(
            TermPattern::var("entry"),
            TermPattern::iri(vocab::RDF_TYPE),
            TermPattern::iri(vocab::ro::FOLDER_ENTRY),
        ),
        TriplePattern::new(
            TermPattern::var("entry"),
            TermPattern::iri(vocab::ore::PROXY_FOR),
            TermPattern::var("target"),
        ),
    ];

    let mut out = BTreeSet::new();
    for row in graph.select(&patterns) {
        let (Some(entry_iri), Some(target_iri)) = (row.iri("entry"), row.iri("target")) else {
            continue;
        };
        let uri = parse_url(entry_iri, resource_map)?;
        let target = parse_url(target_iri, resource_map)?;
        let name = graph
            .first_literal(entry_iri, vocab::ro::ENTRY_NAME)
            .map(|l| l.lexical.clone())
            .unwrap_or_else(|| display_name(&target));
        out.insert(FolderEntry::new(uri, target, name));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rosrs_graph::RdfFormat;

    const MANIFEST: &str = r#"
@prefix ore: <http://www.openarchives.org/ore/terms/> .
@prefix ro: <http://purl.org/wf4ever/ro#> .
@prefix ao: <http://purl.org/ao/> .
@prefix dcterms: <http://purl.org/dc/terms/> .

<http://example.org/ro1/> a ro:ResearchObject ;
    ore:aggregates <http://example.org/ro1/r1>, <http://example.org/ro1/folder1/>,
        <http://example.org/ro1/.ro/annotations/1> ;
    ro:rootFolder <http://example.org/ro1/folder1/> .

<http://example.org/ro1/r1> a ro:Resource ;
    dcterms:created "2011-12-02T15:02:12Z" .
<http://example.org/ro1/proxies/1> ore:proxyFor <http://example.org/ro1/r1> .

<http://example.org/ro1/folder1/> a ro:Resource, ro:Folder ;
    ore:isDescribedBy <http://example.org/ro1/folder1.ttl> .
<http://example.org/ro1/proxies/2> ore:proxyFor <http://example.org/ro1/folder1/> .

<http://example.org/ro1/.ro/annotations/1> a ro:AggregatedAnnotation ;
    ao:body <http://example.org/ro1/body1.ttl> ;
    ro:annotatesAggregatedResource <http://example.org/ro1/>, <http://example.org/ro1/r1> .
"#;

    fn manifest() -> Graph {
        Graph::parse(MANIFEST.as_bytes(), RdfFormat::Turtle).unwrap()
    }

    fn ro_uri() -> Url {
        Url::parse("http://example.org/ro1/").unwrap()
    }

    #[test]
    fn resources_exclude_folders() {
        let graph = manifest();
        let resources = resources(&graph, &ro_uri()).unwrap();
        assert_eq!(resources.len(), 1);
        let r1 = &resources[&Url::parse("http://example.org/ro1/r1").unwrap()];
        assert_eq!(r1.proxy().as_str(), "http://example.org/ro1/proxies/1");
        assert!(r1.created().is_some());
    }

    #[test]
    fn folders_capture_resource_map_and_root_assertion() {
        let graph = manifest();
        let folders = folders(&graph, &ro_uri()).unwrap();
        assert_eq!(folders.len(), 1);
        let folder = &folders[&Url::parse("http://example.org/ro1/folder1/").unwrap()];
        assert_eq!(
            folder.resource_map().as_str(),
            "http://example.org/ro1/folder1.ttl"
        );
        assert!(folder.is_root_folder_asserted());
    }

    #[test]
    fn multi_target_bindings_fold_into_one_annotation() {
        let graph = manifest();
        let (annotations, index) = annotations(&graph, &ro_uri()).unwrap();
        assert_eq!(annotations.len(), 1);
        let uri = Url::parse("http://example.org/ro1/.ro/annotations/1").unwrap();
        let annotation = &annotations[&uri];
        assert_eq!(annotation.targets().len(), 2);
        for target in ["http://example.org/ro1/", "http://example.org/ro1/r1"] {
            let bucket = index
                .annotations_for(&Url::parse(target).unwrap())
                .unwrap();
            assert_eq!(bucket.len(), 1);
            assert!(bucket.contains(&uri));
        }
    }

    #[test]
    fn malformed_created_is_invalid_source_data() {
        let turtle = r#"
@prefix ore: <http://www.openarchives.org/ore/terms/> .
@prefix ro: <http://purl.org/wf4ever/ro#> .
@prefix dcterms: <http://purl.org/dc/terms/> .
<http://example.org/ro1/> ore:aggregates <http://example.org/ro1/r1> .
<http://example.org/ro1/r1> a ro:Resource ; dcterms:created "yesterday" .
<http://example.org/ro1/proxies/1> ore:proxyFor <http://example.org/ro1/r1> .
"#;
        let graph = Graph::parse(turtle.as_bytes(), RdfFormat::Turtle).unwrap();
        assert!(matches!(
            resources(&graph, &ro_uri()),
            Err(RoError::InvalidData { .. })
        ));
    }

    #[test]
    fn evo_type_scans_asserted_types() {
        let turtle = r#"
@prefix roevo: <http://purl.org/wf4ever/roevo#> .
<http://example.org/ro1/> a roevo:SnapshotRO .
"#;
        let graph = Graph::parse(turtle.as_bytes(), RdfFormat::Turtle).unwrap();
        assert_eq!(evo_type(&graph, &ro_uri()), Some(EvoType::Snapshot));
        assert_eq!(evo_type(&manifest(), &ro_uri()), None);
    }

    #[test]
    fn folder_entries_use_entry_name_or_target_name() {
        let turtle = r#"
@prefix ro: <http://purl.org/wf4ever/ro#> .
@prefix ore: <http://www.openarchives.org/ore/terms/> .
<http://example.org/ro1/folder1/#entry1> a ro:FolderEntry ;
    ore:proxyFor <http://example.org/ro1/r1> ;
    ro:entryName "first.txt" .
<http://example.org/ro1/folder1/#entry2> a ro:FolderEntry ;
    ore:proxyFor <http://example.org/ro1/r2> .
"#;
        let graph = Graph::parse(turtle.as_bytes(), RdfFormat::Turtle).unwrap();
        let rmap = Url::parse("http://example.org/ro1/folder1.ttl").unwrap();
        let entries = folder_entries(&graph, &rmap).unwrap();
        let names: Vec<&str> = entries.iter().map(FolderEntry::name).collect();
        assert_eq!(names, vec!["first.txt", "r2"]);
    }
}
