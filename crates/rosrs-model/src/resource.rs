//! Aggregated resources.

use chrono::{DateTime, Utc};
use url::Url;

use crate::Person;

/// A plain aggregated resource (never a folder) together with its
/// aggregation proxy. Owned by the research object that extracted or
/// created it.
#[derive(Debug, Clone)]
pub struct Resource {
    uri: Url,
    proxy: Url,
    creator: Option<Person>,
    created: Option<DateTime<Utc>>,
}

impl Resource {
    pub(crate) fn new(
        uri: Url,
        proxy: Url,
        creator: Option<Person>,
        created: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            uri,
            proxy,
            creator,
            created,
        }
    }

    pub fn uri(&self) -> &Url {
        &self.uri
    }

    pub fn proxy(&self) -> &Url {
        &self.proxy
    }

    pub fn creator(&self) -> Option<&Person> {
        self.creator.as_ref()
    }

    pub fn created(&self) -> Option<DateTime<Utc>> {
        self.created
    }

    pub fn name(&self) -> String {
        display_name(&self.uri)
    }
}

/// Display name of a URI: its last non-empty path segment. Used for the
/// name-sorted root views.
pub fn display_name(uri: &Url) -> String {
    uri.path_segments()
        .and_then(|segments| {
            segments
                .filter(|s| !s.is_empty())
                .last()
                .map(str::to_string)
        })
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| uri.as_str().to_string())
}
