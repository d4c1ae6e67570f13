//! Folders and folder entries.

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::hash::{Hash, Hasher};

use chrono::{DateTime, Utc};
use url::Url;

use crate::error::{Result, RoError};
use crate::resource::display_name;
use crate::{LoadState, Person};

/// An aggregated folder: structural metadata from the manifest plus
/// entries lazily populated from its resource-map document.
#[derive(Debug, Clone)]
pub struct Folder {
    uri: Url,
    proxy: Url,
    resource_map: Url,
    creator: Option<Person>,
    created: Option<DateTime<Utc>>,
    root_folder_asserted: bool,
    state: LoadState,
    entries: BTreeSet<FolderEntry>,
}

impl Folder {
    pub(crate) fn new(
        uri: Url,
        proxy: Url,
        resource_map: Url,
        creator: Option<Person>,
        created: Option<DateTime<Utc>>,
        root_folder_asserted: bool,
    ) -> Self {
        Self {
            uri,
            proxy,
            resource_map,
            creator,
            created,
            root_folder_asserted,
            state: LoadState::Unloaded,
            entries: BTreeSet::new(),
        }
    }

    pub fn uri(&self) -> &Url {
        &self.uri
    }

    pub fn proxy(&self) -> &Url {
        &self.proxy
    }

    /// URI of the document describing this folder's contents.
    pub fn resource_map(&self) -> &Url {
        &self.resource_map
    }

    pub fn creator(&self) -> Option<&Person> {
        self.creator.as_ref()
    }

    pub fn created(&self) -> Option<DateTime<Utc>> {
        self.created
    }

    /// The manifest's explicit `ro:rootFolder` assertion. Independent
    /// from the computed root derivation, and not necessarily
    /// consistent with it.
    pub fn is_root_folder_asserted(&self) -> bool {
        self.root_folder_asserted
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    pub fn is_loaded(&self) -> bool {
        self.state == LoadState::Loaded
    }

    /// Entries of the loaded folder. Accessing them before the folder
    /// has been loaded is a contract violation.
    pub fn entries(&self) -> Result<&BTreeSet<FolderEntry>> {
        match self.state {
            LoadState::Loaded => Ok(&self.entries),
            _ => Err(RoError::not_loaded("folder", &self.uri)),
        }
    }

    pub(crate) fn set_entries(&mut self, entries: BTreeSet<FolderEntry>) {
        self.entries = entries;
        self.state = LoadState::Loaded;
    }

    pub fn name(&self) -> String {
        display_name(&self.uri)
    }
}

/// One entry of a folder's resource map. Identity (equality, ordering,
/// hashing) is defined by the entry URI alone: two entries pointing at
/// the same target through different entry nodes are distinct.
#[derive(Debug, Clone)]
pub struct FolderEntry {
    uri: Url,
    target: Url,
    name: String,
}

impl FolderEntry {
    pub fn new(uri: Url, target: Url, name: impl Into<String>) -> Self {
        Self {
            uri,
            target,
            name: name.into(),
        }
    }

    pub fn uri(&self) -> &Url {
        &self.uri
    }

    /// The resource or folder this entry points at.
    pub fn target(&self) -> &Url {
        &self.target
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl PartialEq for FolderEntry {
    fn eq(&self, other: &Self) -> bool {
        self.uri == other.uri
    }
}

impl Eq for FolderEntry {}

impl Hash for FolderEntry {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.uri.hash(state);
    }
}

impl PartialOrd for FolderEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FolderEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.uri.cmp(&other.uri)
    }
}
