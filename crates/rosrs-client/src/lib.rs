//! Blocking HTTP bindings for the Research Object services.
//!
//! [`RosrsClient`] implements the store trait
//! ([`RoService`](rosrs_model::RoService)) and [`RoevoClient`] the
//! evolution trait ([`EvoService`](rosrs_model::EvoService)) over
//! **reqwest**. Both speak the services' REST conventions: `Slug` and
//! `Link` headers on creation commands, content negotiation for RDF
//! documents, JSON for job submission and polling.

mod evo;
mod http;
mod link;
mod store;

pub use evo::RoevoClient;
pub use link::{parse_link_header, LinkRelation};
pub use store::RosrsClient;
