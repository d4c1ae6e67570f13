//! Vocabulary IRIs queried by the entity extractors.

pub const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";

pub mod ore {
    pub const AGGREGATES: &str = "http://www.openarchives.org/ore/terms/aggregates";
    pub const PROXY_FOR: &str = "http://www.openarchives.org/ore/terms/proxyFor";
    pub const IS_DESCRIBED_BY: &str = "http://www.openarchives.org/ore/terms/isDescribedBy";
}

pub mod ro {
    pub const RESOURCE: &str = "http://purl.org/wf4ever/ro#Resource";
    pub const FOLDER: &str = "http://purl.org/wf4ever/ro#Folder";
    pub const FOLDER_ENTRY: &str = "http://purl.org/wf4ever/ro#FolderEntry";
    pub const AGGREGATED_ANNOTATION: &str = "http://purl.org/wf4ever/ro#AggregatedAnnotation";
    pub const ROOT_FOLDER: &str = "http://purl.org/wf4ever/ro#rootFolder";
    pub const ENTRY_NAME: &str = "http://purl.org/wf4ever/ro#entryName";
    pub const ANNOTATES_AGGREGATED_RESOURCE: &str =
        "http://purl.org/wf4ever/ro#annotatesAggregatedResource";
}

pub mod ao {
    pub const BODY: &str = "http://purl.org/ao/body";
    pub const ANNOTATES_RESOURCE: &str = "http://purl.org/ao/annotatesResource";
}

pub mod dcterms {
    pub const CREATOR: &str = "http://purl.org/dc/terms/creator";
    pub const CREATED: &str = "http://purl.org/dc/terms/created";
}

pub mod foaf {
    pub const NAME: &str = "http://xmlns.com/foaf/0.1/name";
}

pub mod roevo {
    pub const LIVE_RO: &str = "http://purl.org/wf4ever/roevo#LiveRO";
    pub const SNAPSHOT_RO: &str = "http://purl.org/wf4ever/roevo#SnapshotRO";
    pub const ARCHIVED_RO: &str = "http://purl.org/wf4ever/roevo#ArchivedRO";
    pub const IS_SNAPSHOT_OF: &str = "http://purl.org/wf4ever/roevo#isSnapshotOf";
    pub const IS_ARCHIVE_OF: &str = "http://purl.org/wf4ever/roevo#isArchiveOf";
    pub const HAS_SNAPSHOT: &str = "http://purl.org/wf4ever/roevo#hasSnapshot";
    pub const HAS_ARCHIVE: &str = "http://purl.org/wf4ever/roevo#hasArchive";
}

pub mod prov {
    pub const WAS_REVISION_OF: &str = "http://www.w3.org/ns/prov#wasRevisionOf";
}
