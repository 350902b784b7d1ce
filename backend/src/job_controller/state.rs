//! Tracks background CSV imports.
//!
//! Upload requests that are too large to import inline are turned into jobs
//! by `services::imports::upload`. The pieces:
//! - `JobsState`: clonable handle to the map of job id to latest
//!   `TaskStatusResponse`, shared with every handler as `web::Data`.
//! - `JobUpdate`: status change pushed by a worker through the channel.
//! - `start_job_updater`: the single task that applies those updates, so
//!   workers never need write access to the map.
//!
//! Finished jobs stay readable for `FINISHED_JOB_TTL`, then are evicted.

use common::jobs::TaskStatusResponse;
use log::debug;
use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::sync::{mpsc, RwLock};

/// How long a completed or failed job can still be polled.
pub const FINISHED_JOB_TTL: Duration = Duration::from_secs(15 * 60);

#[derive(Clone, Debug)]
pub struct JobEntry {
    pub status: TaskStatusResponse,
    finished_at: Option<Instant>,
}

impl JobEntry {
    fn new(status: TaskStatusResponse, now: Instant) -> Self {
        let finished_at = status.is_terminal().then_some(now);
        Self {
            status,
            finished_at,
        }
    }

    fn expired(&self, now: Instant) -> bool {
        self.finished_at
            .is_some_and(|at| now.saturating_duration_since(at) >= FINISHED_JOB_TTL)
    }
}

#[derive(Clone)]
pub struct JobsState {
    /// Latest status per job id. Read by `GET /api/imports/status/{job_id}`,
    /// written by `start_job_updater` and by `register`.
    pub jobs: Arc<RwLock<HashMap<String, JobEntry>>>,

    /// Workers push their `JobUpdate`s here.
    pub tx: mpsc::Sender<JobUpdate>,
}

#[derive(Debug)]
pub struct JobUpdate {
    pub(crate) job_id: String,
    pub(crate) status: TaskStatusResponse,
}

impl JobsState {
    /// Creates the shared state and the receiving end that must be handed to
    /// `start_job_updater`.
    pub fn new(buffer: usize) -> (Self, mpsc::Receiver<JobUpdate>) {
        let (tx, rx) = mpsc::channel(buffer);
        let state = Self {
            jobs: Arc::new(RwLock::new(HashMap::new())),
            tx,
        };
        (state, rx)
    }

    /// Allocates a job id and records it as processing.
    pub async fn register(&self) -> String {
        let job_id = uuid::Uuid::new_v4().to_string();
        let now = Instant::now();
        let mut jobs = self.jobs.write().await;
        evict_expired(&mut jobs, now);
        jobs.insert(
            job_id.clone(),
            JobEntry::new(TaskStatusResponse::processing("Import queued"), now),
        );
        job_id
    }

    pub async fn status(&self, job_id: &str) -> Option<TaskStatusResponse> {
        self.jobs
            .read()
            .await
            .get(job_id)
            .map(|entry| entry.status.clone())
    }

    /// Drops finished jobs older than `FINISHED_JOB_TTL` at `now`. Returns how
    /// many were removed.
    pub async fn evict_finished(&self, now: Instant) -> usize {
        evict_expired(&mut *self.jobs.write().await, now)
    }
}

fn evict_expired(jobs: &mut HashMap<String, JobEntry>, now: Instant) -> usize {
    let before = jobs.len();
    jobs.retain(|_, entry| !entry.expired(now));
    let removed = before - jobs.len();
    if removed > 0 {
        debug!("evicted {} finished jobs", removed);
    }
    removed
}

/// Applies `JobUpdate`s until every sender is gone.
///
/// A job that reached `complete` or `failed` keeps that status; later updates
/// for it are dropped.
pub async fn start_job_updater(state: JobsState, mut rx: mpsc::Receiver<JobUpdate>) {
    while let Some(update) = rx.recv().await {
        let now = Instant::now();
        let mut jobs = state.jobs.write().await;
        match jobs.get(&update.job_id) {
            Some(current) if current.status.is_terminal() => {
                debug!("dropping update for finished job {}", update.job_id);
            }
            _ => {
                jobs.insert(update.job_id, JobEntry::new(update.status, now));
            }
        }
        evict_expired(&mut jobs, now);
    }
}
