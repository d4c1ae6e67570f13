//! Client-side Research Object model.
//!
//! The aggregate here is the [`ResearchObject`]: a typed, in-memory
//! materialization of the RDF manifest a remote store serves for one
//! research object. The crate covers:
//!
//! - loading (manifest fetch, entity extraction, best-effort annotation
//!   bodies, forced folder loads, derived root views),
//! - cascade-consistent mutations (remote command first, local patch
//!   second),
//! - evolution lineage and asynchronous snapshot/archive jobs, and
//! - the [`RoRegistry`] interning one handle per research object URI.
//!
//! The remote store itself sits behind the [`RoService`] and
//! [`EvoService`] traits; an HTTP implementation lives in the client
//! crate.

pub mod vocab;

mod annotation;
mod error;
mod evo;
mod extract;
mod folder;
mod index;
mod person;
mod registry;
mod research_object;
mod resource;
mod service;

pub use annotation::Annotation;
pub use error::{Result, RoError};
pub use evo::{EvoType, EvolutionInfo, JobState, JobStatus};
pub use folder::{Folder, FolderEntry};
pub use index::{AnnotationIndex, TargetRemoval};
pub use person::Person;
pub use registry::RoRegistry;
pub use research_object::ResearchObject;
pub use resource::{display_name, Resource};
pub use service::{
    CreatedAnnotation, CreatedFolder, CreatedResource, Document, EvoService, RoService,
    TransportError,
};

/// Load lifecycle of a lazily materialized entity. `Loading` is
/// observable only while a load is in flight; a failed load falls back
/// to `Unloaded`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Unloaded,
    Loading,
    Loaded,
}
