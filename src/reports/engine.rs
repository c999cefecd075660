//! Report loading
//!
//! Drives the `Idle → Loading → {Ready | Failed}` cycle. Every load is tagged
//! with a generation number; when a load resolves after a newer one has
//! started its result is dropped and the state is left to the newer load.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::NaiveDate;
use serde::Serialize;

use super::error::{ReportError, ReportResult, LOAD_FAILED_MESSAGE};
use super::fetch::RecordFetcher;
use super::model::ReportModel;
use super::period::ReportPeriod;

/// What a load cycle was asked to produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReportRequest {
    pub period: ReportPeriod,
    /// Date ages are computed against
    pub reference_date: NaiveDate,
}

#[derive(Debug, Clone)]
pub enum ReportState {
    Idle,
    Loading { request: ReportRequest },
    Ready(Arc<ReportModel>),
    Failed { request: ReportRequest, message: String },
}

impl ReportState {
    pub fn name(&self) -> &'static str {
        match self {
            ReportState::Idle => "idle",
            ReportState::Loading { .. } => "loading",
            ReportState::Ready(_) => "ready",
            ReportState::Failed { .. } => "failed",
        }
    }

    /// Period the state refers to, if any
    pub fn period(&self) -> Option<ReportPeriod> {
        match self {
            ReportState::Idle => None,
            ReportState::Loading { request } | ReportState::Failed { request, .. } => {
                Some(request.period)
            }
            ReportState::Ready(model) => Some(model.period()),
        }
    }
}

pub struct ReportEngine {
    fetcher: Arc<dyn RecordFetcher>,
    generation: AtomicU64,
    state: Mutex<ReportState>,
}

impl ReportEngine {
    pub fn new(fetcher: Arc<dyn RecordFetcher>) -> Self {
        Self {
            fetcher,
            generation: AtomicU64::new(0),
            state: Mutex::new(ReportState::Idle),
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, ReportState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn state(&self) -> ReportState {
        self.lock_state().clone()
    }

    /// The loaded model, if the last load succeeded
    pub fn current(&self) -> ReportResult<Arc<ReportModel>> {
        match &*self.lock_state() {
            ReportState::Ready(model) => Ok(model.clone()),
            _ => Err(ReportError::NotReady),
        }
    }

    /// Select a period and load it
    pub async fn load(&self, period: ReportPeriod, today: NaiveDate) -> ReportResult<Arc<ReportModel>> {
        self.run(ReportRequest {
            period,
            reference_date: today,
        })
        .await
    }

    /// Reload the selected period with a fresh reference date
    pub async fn refresh(&self, today: NaiveDate) -> ReportResult<Arc<ReportModel>> {
        let period = self.lock_state().period().ok_or(ReportError::NotReady)?;
        self.load(period, today).await
    }

    /// Re-run a failed load exactly as it was first requested
    pub async fn retry(&self) -> ReportResult<Arc<ReportModel>> {
        let request = match &*self.lock_state() {
            ReportState::Failed { request, .. } => *request,
            _ => return Err(ReportError::NothingToRetry),
        };
        self.run(request).await
    }

    async fn run(&self, request: ReportRequest) -> ReportResult<Arc<ReportModel>> {
        let generation = {
            let mut state = self.lock_state();
            *state = ReportState::Loading { request };
            self.generation.fetch_add(1, Ordering::SeqCst) + 1
        };
        tracing::info!(period = %request.period.label(), generation, "Loading report");

        let range = request.period.resolve();
        let fetched = tokio::try_join!(
            self.fetcher.fetch_dispense_requests(range.start, range.end),
            self.fetcher.fetch_all_profiles(),
        );

        let mut state = self.lock_state();
        if self.generation.load(Ordering::SeqCst) != generation {
            tracing::warn!(period = %request.period.label(), generation, "Discarding superseded report load");
            return Err(ReportError::Superseded);
        }

        match fetched {
            Ok((requests, profiles)) => {
                let model = Arc::new(ReportModel::build(
                    request.period,
                    &requests,
                    &profiles,
                    request.reference_date,
                ));
                tracing::info!(
                    period = %request.period.label(),
                    requests = requests.len(),
                    profiles = profiles.len(),
                    "Report ready"
                );
                *state = ReportState::Ready(model.clone());
                Ok(model)
            }
            Err(e) => {
                tracing::warn!(period = %request.period.label(), error = %e, "Report load failed");
                *state = ReportState::Failed {
                    request,
                    message: LOAD_FAILED_MESSAGE.to_string(),
                };
                Err(e.into())
            }
        }
    }
}
