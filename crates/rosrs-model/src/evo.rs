//! Evolution lineage types and asynchronous job tracking.

use std::collections::BTreeSet;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use url::Url;

/// Evolution class of a research object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvoType {
    Live,
    Snapshot,
    Archive,
}

/// State of an asynchronous snapshot/archive job. `Running` is the only
/// non-terminal state; the remote service, not this client, drives all
/// transitions (including `Cancelled`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    Running,
    Done,
    Cancelled,
    Failed,
    ServiceError,
}

impl JobState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, JobState::Running)
    }
}

#[derive(Debug, Default)]
struct JobRecord {
    job_uri: Option<Url>,
    target: Option<String>,
    state: Option<JobState>,
    reason: Option<String>,
}

/// Thread-safe record of one remote snapshot/archive operation.
///
/// The submission parameters are immutable; the mutable fields live
/// behind a single lock so state and reason are always observed as one
/// coherent unit. Cloning shares the record, so a poller and a reader
/// can hold the same handle from different threads.
#[derive(Debug, Clone)]
pub struct JobStatus {
    copy_from: Url,
    evo_type: EvoType,
    finalize: bool,
    record: Arc<Mutex<JobRecord>>,
}

impl JobStatus {
    /// A fresh handle. The state is unset until the service reports one.
    pub fn new(copy_from: Url, evo_type: EvoType, finalize: bool) -> Self {
        Self {
            copy_from,
            evo_type,
            finalize,
            record: Arc::new(Mutex::new(JobRecord::default())),
        }
    }

    pub fn copy_from(&self) -> &Url {
        &self.copy_from
    }

    pub fn evo_type(&self) -> EvoType {
        self.evo_type
    }

    pub fn finalize(&self) -> bool {
        self.finalize
    }

    pub fn job_uri(&self) -> Option<Url> {
        self.record.lock().job_uri.clone()
    }

    pub fn set_job_uri(&self, uri: Url) {
        self.record.lock().job_uri = Some(uri);
    }

    pub fn target(&self) -> Option<String> {
        self.record.lock().target.clone()
    }

    pub fn set_target(&self, target: impl Into<String>) {
        self.record.lock().target = Some(target.into());
    }

    pub fn state(&self) -> Option<JobState> {
        self.record.lock().state
    }

    pub fn reason(&self) -> Option<String> {
        self.record.lock().reason.clone()
    }

    /// Set state and reason under one lock; readers never observe a
    /// state paired with the reason of a different write.
    pub fn set_state_and_reason(&self, state: JobState, reason: Option<String>) {
        let mut record = self.record.lock();
        record.state = Some(state);
        record.reason = reason;
    }

    /// Read state and reason as the coherent pair they were written as.
    pub fn state_and_reason(&self) -> (Option<JobState>, Option<String>) {
        let record = self.record.lock();
        (record.state, record.reason.clone())
    }
}

/// Lineage of one research object, sourced from the evolution document.
/// Related research objects are held as URIs, not owned handles; resolve
/// them through a [`RoRegistry`](crate::RoRegistry).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EvolutionInfo {
    pub evo_type: Option<EvoType>,
    /// The live RO this one was snapshotted or archived from.
    pub live: Option<Url>,
    pub previous_snapshot: Option<Url>,
    pub snapshots: BTreeSet<Url>,
    pub archives: BTreeSet<Url>,
}
