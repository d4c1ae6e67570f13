//! Error taxonomy of the core: transport failures are propagated
//! unmodified, invalid source data aborts extraction, and reading an
//! unloaded entity is a contract violation raised without any network
//! access.

use url::Url;

use crate::service::TransportError;

#[derive(Debug, thiserror::Error)]
pub enum RoError {
    /// A remote call failed; never retried here.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The fetched document does not describe what it must describe.
    #[error("invalid source data in <{source_uri}>: {reason}")]
    InvalidData { source_uri: Url, reason: String },

    /// An accessor was called on an entity that has not been loaded.
    #[error("{entity} <{uri}> is not loaded")]
    NotLoaded { entity: &'static str, uri: Url },

    /// The URI does not refer to an aggregated member of this research
    /// object.
    #[error("<{uri}> is not an aggregated {member} of this research object")]
    UnknownMember { uri: Url, member: &'static str },
}

impl RoError {
    pub(crate) fn invalid(source_uri: &Url, reason: impl Into<String>) -> Self {
        RoError::InvalidData {
            source_uri: source_uri.clone(),
            reason: reason.into(),
        }
    }

    pub(crate) fn not_loaded(entity: &'static str, uri: &Url) -> Self {
        RoError::NotLoaded {
            entity,
            uri: uri.clone(),
        }
    }
}

pub type Result<T> = std::result::Result<T, RoError>;
