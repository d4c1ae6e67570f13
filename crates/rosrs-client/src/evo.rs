//! Blocking HTTP implementation of the RO evolution service.

use reqwest::header;
use rosrs_model::{Document, EvoService, EvoType, JobState, JobStatus, TransportError};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::http::{execute, location, rdf_format_for, ACCEPT_RDF};

/// JSON body submitted to the job endpoint.
#[derive(Debug, Serialize)]
struct JobRequest<'a> {
    copyfrom: &'a str,
    #[serde(rename = "type")]
    evo_type: EvoType,
    finalize: bool,
    target: &'a str,
}

/// JSON description the service answers job polls with.
#[derive(Debug, Deserialize)]
struct JobDescription {
    target: Option<String>,
    #[serde(rename = "status")]
    state: JobState,
    reason: Option<String>,
}

/// HTTP client for one evolution service. Jobs are submitted to the
/// `jobs` endpoint and polled at the URI the service assigns them;
/// lineage documents come from the `info` endpoint.
pub struct RoevoClient {
    http: reqwest::blocking::Client,
    base: Url,
    token: Option<String>,
}

impl RoevoClient {
    pub fn new(base: Url, token: Option<String>) -> Result<Self, TransportError> {
        let http = reqwest::blocking::Client::builder()
            .user_agent(concat!("rosrs-client/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TransportError::new(e.to_string()))?;
        Ok(Self { http, base, token })
    }

    fn endpoint(&self, path: &str) -> Result<Url, TransportError> {
        self.base
            .join(path)
            .map_err(|e| TransportError::new(format!("malformed endpoint {path}: {e}")))
    }

    fn submit(
        &self,
        copy_from: &Url,
        evo_type: EvoType,
        target: &str,
        finalize: bool,
    ) -> Result<JobStatus, TransportError> {
        let request = JobRequest {
            copyfrom: copy_from.as_str(),
            evo_type,
            finalize,
            target,
        };
        let endpoint = self.endpoint("jobs")?;
        let response = execute(
            self.http.post(endpoint.as_str()).json(&request),
            self.token.as_deref(),
        )?;
        let job = JobStatus::new(copy_from.clone(), evo_type, finalize);
        job.set_job_uri(location(&response)?);
        job.set_target(target);
        job.set_state_and_reason(JobState::Running, None);
        Ok(job)
    }
}

impl EvoService for RoevoClient {
    fn evolution_document(&self, ro: &Url) -> Result<Document, TransportError> {
        let mut endpoint = self.endpoint("info")?;
        endpoint.query_pairs_mut().append_pair("ro", ro.as_str());
        let response = execute(
            self.http
                .get(endpoint.as_str())
                .header(header::ACCEPT, ACCEPT_RDF),
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

    fn create_snapshot(
        &self,
        copy_from: &Url,
        target: &str,
        finalize: bool,
    ) -> Result<JobStatus, TransportError> {
        self.submit(copy_from, EvoType::Snapshot, target, finalize)
    }

    fn create_archive(
        &self,
        copy_from: &Url,
        target: &str,
        finalize: bool,
    ) -> Result<JobStatus, TransportError> {
        self.submit(copy_from, EvoType::Archive, target, finalize)
    }

    /// Poll the job once. State and reason land on the handle as one
    /// unit, so concurrent readers never see them out of step.
    fn refresh(&self, job: &JobStatus) -> Result<(), TransportError> {
        let Some(job_uri) = job.job_uri() else {
            return Err(TransportError::new("job has not been submitted"));
        };
        let response = execute(
            self.http
                .get(job_uri.as_str())
                .header(header::ACCEPT, "application/json"),
            self.token.as_deref(),
        )?;
        let description: JobDescription = response
            .json()
            .map_err(|e| TransportError::new(e.to_string()))?;
        if let Some(target) = description.target {
            job.set_target(target);
        }
        job.set_state_and_reason(description.state, description.reason);
        Ok(())
    }
}
