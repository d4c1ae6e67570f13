//! Registry of research object handles.
//!
//! Lineage fields are plain URIs; the registry turns them back into
//! aggregates, handing out one handle per URI so two walks through the
//! same lineage share loaded state.

use std::collections::HashMap;
use std::sync::Arc;

use url::Url;

use crate::error::Result;
use crate::evo::EvolutionInfo;
use crate::research_object::ResearchObject;
use crate::service::{EvoService, RoService};

pub struct RoRegistry {
    service: Arc<dyn RoService>,
    evo_service: Arc<dyn EvoService>,
    entries: HashMap<Url, ResearchObject>,
}

impl RoRegistry {
    pub fn new(service: Arc<dyn RoService>, evo_service: Arc<dyn EvoService>) -> Self {
        Self {
            service,
            evo_service,
            entries: HashMap::new(),
        }
    }

    /// The handle for a URI, created unloaded on first sight.
    pub fn research_object(&mut self, uri: &Url) -> &mut ResearchObject {
        self.entries.entry(uri.clone()).or_insert_with(|| {
            ResearchObject::new(uri.clone(), self.service.clone(), self.evo_service.clone())
        })
    }

    /// An already-interned handle, if any.
    pub fn get(&self, uri: &Url) -> Option<&ResearchObject> {
        self.entries.get(uri)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Create a research object in the remote store and intern its
    /// handle.
    pub fn create(&mut self, id: &str) -> Result<&mut ResearchObject> {
        let uri = self.service.create_research_object(id)?;
        Ok(self.research_object(&uri))
    }

    /// Intern a handle for every research object a lineage mentions.
    pub fn intern_lineage(&mut self, info: &EvolutionInfo) {
        let related = info
            .live
            .iter()
            .chain(info.previous_snapshot.iter())
            .chain(info.snapshots.iter())
            .chain(info.archives.iter())
            .cloned()
            .collect::<Vec<_>>();
        for uri in related {
            self.research_object(&uri);
        }
    }
}
