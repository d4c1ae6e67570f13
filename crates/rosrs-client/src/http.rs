//! Shared plumbing for the blocking HTTP clients: request execution
//! with optional bearer auth, status checking, and response header
//! helpers.

use reqwest::blocking::{RequestBuilder, Response};
use reqwest::header;
use rosrs_graph::RdfFormat;
use rosrs_model::TransportError;
use url::Url;

use crate::link::{parse_link_header, LinkRelation};

pub(crate) const ACCEPT_RDF: &str =
    "application/rdf+xml, text/turtle;q=0.9, application/n-triples;q=0.8";

/// Send a request, attaching the bearer token when configured, and turn
/// any non-2xx answer into a [`TransportError`] carrying the status and
/// response body.
pub(crate) fn execute(
    request: RequestBuilder,
    token: Option<&str>,
) -> Result<Response, TransportError> {
    let request = match token {
        Some(token) => request.bearer_auth(token),
        None => request,
    };
    let response = request
        .send()
        .map_err(|e| TransportError::new(e.to_string()))?;
    let status = response.status();
    tracing::debug!(url = %response.url(), status = status.as_u16(), "remote call");
    if !status.is_success() {
        let message = response.text().unwrap_or_default();
        return Err(TransportError::with_status(status.as_u16(), message));
    }
    Ok(response)
}

/// The `Location` header of a creation response, parsed as a URL.
pub(crate) fn location(response: &Response) -> Result<Url, TransportError> {
    let value = response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| TransportError::new("response carries no Location header"))?;
    Url::parse(value).map_err(|e| TransportError::new(format!("malformed Location header: {e}")))
}

/// All relations across every `Link` header of a response.
pub(crate) fn collect_links(response: &Response) -> Vec<LinkRelation> {
    response
        .headers()
        .get_all(header::LINK)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(parse_link_header)
        .collect()
}

/// The first link with the given relation, parsed as a URL.
pub(crate) fn required_link(links: &[LinkRelation], rel: &str) -> Result<Url, TransportError> {
    let link = links
        .iter()
        .find(|link| link.rel == rel)
        .ok_or_else(|| TransportError::new(format!("response carries no <{rel}> link")))?;
    Url::parse(&link.target)
        .map_err(|e| TransportError::new(format!("malformed <{rel}> link: {e}")))
}

/// Serialization of a response, from its `Content-Type`. RDF/XML is the
/// services' default when the header is absent or unrecognized.
pub(crate) fn rdf_format_for(content_type: Option<&str>) -> RdfFormat {
    let media = content_type
        .unwrap_or("")
        .split(';')
        .next()
        .unwrap_or("")
        .trim();
    match media {
        "text/turtle" | "application/x-turtle" => RdfFormat::Turtle,
        "application/n-triples" | "text/plain" => RdfFormat::NTriples,
        _ => RdfFormat::RdfXml,
    }
}
