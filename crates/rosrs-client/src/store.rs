//! Blocking HTTP implementation of the Research Object store.

use std::collections::BTreeSet;

use reqwest::header;
use rosrs_model::{
    vocab, CreatedAnnotation, CreatedFolder, CreatedResource, Document, RoService, TransportError,
};
use url::Url;

use crate::http::{
    collect_links, execute, location, rdf_format_for, required_link, ACCEPT_RDF,
};

const PROXY_MIME: &str = "application/vnd.wf4ever.proxy";
const FOLDER_MIME: &str = "application/vnd.wf4ever.folder";

/// HTTP client for one Research Object store. Creation commands address
/// the research object URI; the `Slug` header names the new member and
/// `Link`/`Location` response headers relate it to its proxy and
/// companion documents.
pub struct RosrsClient {
    http: reqwest::blocking::Client,
    base: Url,
    token: Option<String>,
}

impl RosrsClient {
    /// A client for the store rooted at `base`, optionally
    /// authenticating every call with a bearer token.
    pub fn new(base: Url, token: Option<String>) -> Result<Self, TransportError> {
        let http = reqwest::blocking::Client::builder()
            .user_agent(concat!("rosrs-client/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TransportError::new(e.to_string()))?;
        Ok(Self { http, base, token })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    fn fetch(&self, uri: &Url) -> Result<Document, TransportError> {
        let response = execute(
            self.http.get(uri.as_str()).header(header::ACCEPT, ACCEPT_RDF),
            self.token.as_deref(),
        )?;
        let format = rdf_format_for(
            response
                .headers()
                .get(header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok()),
        );
        let bytes = response
            .bytes()
            .map_err(|e| TransportError::new(e.to_string()))?
            .to_vec();
        Ok(Document { bytes, format })
    }
}

/// RDF/XML proxy description posted when aggregating an external
/// resource.
fn proxy_description(resource: &Url) -> String {
    format!(
        concat!(
            "<rdf:RDF xmlns:rdf=\"http://www.w3.org/1999/02/22-rdf-syntax-ns#\"\n",
            "         xmlns:ore=\"http://www.openarchives.org/ore/terms/\">\n",
            "  <ore:Proxy>\n",
            "    <ore:proxyFor rdf:resource=\"{}\"/>\n",
            "  </ore:Proxy>\n",
            "</rdf:RDF>\n"
        ),
        resource
    )
}

impl RoService for RosrsClient {
    fn manifest(&self, ro: &Url) -> Result<Document, TransportError> {
        // Content negotiation on the RO URI redirects to the manifest.
        self.fetch(ro)
    }

    fn document(&self, uri: &Url) -> Result<Document, TransportError> {
        self.fetch(uri)
    }

    fn create_research_object(&self, id: &str) -> Result<Url, TransportError> {
        let response = execute(
            self.http
                .post(self.base.as_str())
                .header("Slug", id)
                .header(header::ACCEPT, ACCEPT_RDF),
            self.token.as_deref(),
        )?;
        location(&response)
    }

    fn create_resource(
        &self,
        ro: &Url,
        path: &str,
        content: &[u8],
        content_type: &str,
    ) -> Result<CreatedResource, TransportError> {
        let response = execute(
            self.http
                .post(ro.as_str())
                .header("Slug", path)
                .header(header::CONTENT_TYPE, content_type)
                .body(content.to_vec()),
            self.token.as_deref(),
        )?;
        let links = collect_links(&response);
        Ok(CreatedResource {
            uri: location(&response)?,
            proxy: required_link(&links, vocab::ore::PROXY_FOR)?,
        })
    }

    fn aggregate_external(
        &self,
        ro: &Url,
        resource: &Url,
    ) -> Result<CreatedResource, TransportError> {
        let response = execute(
            self.http
                .post(ro.as_str())
                .header(header::CONTENT_TYPE, PROXY_MIME)
                .body(proxy_description(resource)),
            self.token.as_deref(),
        )?;
        // The external URI stays the resource's identity; the store only
        // mints the proxy.
        Ok(CreatedResource {
            uri: resource.clone(),
            proxy: location(&response)?,
        })
    }

    fn create_folder(&self, ro: &Url, path: &str) -> Result<CreatedFolder, TransportError> {
        let response = execute(
            self.http
                .post(ro.as_str())
                .header("Slug", path)
                .header(header::CONTENT_TYPE, FOLDER_MIME),
            self.token.as_deref(),
        )?;
        let links = collect_links(&response);
        Ok(CreatedFolder {
            uri: location(&response)?,
            proxy: required_link(&links, vocab::ore::PROXY_FOR)?,
            resource_map: required_link(&links, vocab::ore::IS_DESCRIBED_BY)?,
        })
    }

    fn create_annotation(
        &self,
        ro: &Url,
        targets: &BTreeSet<Url>,
        body: &[u8],
        content_type: &str,
    ) -> Result<CreatedAnnotation, TransportError> {
        let mut request = self
            .http
            .post(ro.as_str())
            .header(header::CONTENT_TYPE, content_type)
            .body(body.to_vec());
        for target in targets {
            request = request.header(
                header::LINK,
                format!("<{target}>; rel=\"{}\"", vocab::ao::ANNOTATES_RESOURCE),
            );
        }
        let response = execute(request, self.token.as_deref())?;
        let links = collect_links(&response);
        let uri = location(&response)?;
        let body_uri = required_link(&links, vocab::ao::BODY)?;
        let mut echoed = BTreeSet::new();
        for link in &links {
            if link.rel == vocab::ao::ANNOTATES_RESOURCE {
                if let Ok(target) = Url::parse(&link.target) {
                    echoed.insert(target);
                }
            }
        }
        let format = rdf_format_for(
            response
                .headers()
                .get(header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok()),
        );
        let bytes = response
            .bytes()
            .map_err(|e| TransportError::new(e.to_string()))?
            .to_vec();
        let body_document = if bytes.is_empty() {
            None
        } else {
            Some(Document { bytes, format })
        };
        Ok(CreatedAnnotation {
            uri,
            body: body_uri,
            targets: echoed,
            body_document,
        })
    }

    fn delete(&self, uri: &Url) -> Result<(), TransportError> {
        execute(self.http.delete(uri.as_str()), self.token.as_deref())?;
        Ok(())
    }
}
