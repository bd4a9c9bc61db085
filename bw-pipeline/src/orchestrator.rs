//! Region-analysis pipeline run.
//!
//! A run walks `FetchingSeries -> FetchingHistory -> RunningDerivedStages ->
//! Published`. The series and history stages are fatal: their failure moves
//! the run to `Aborted` and nothing is published. The five derived stages are
//! isolated: a failure is recorded in `stage_errors` and the run continues.
//! `ecological` is issued only after the other four have settled and is
//! given whichever of them succeeded.

use crate::config::PipelineConfig;
use crate::progress::{ProgressEvent, RunState, StageOutcome};
use crate::store::SnapshotStore;
use bw_core::client::{EcologicalRequest, RemoteClient};
use bw_core::error::{PipelineError, RemoteError, RemoteResult};
use bw_core::selection::Selection;
use bw_core::series::SeriesParser;
use bw_core::snapshot::AnalysisSnapshot;
use bw_core::stage::Stage;
use log::{debug, error, info, warn};
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::broadcast;

/// Why a run request was ignored before any remote call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    SelectionIncomplete,
    /// A run for the same selection is still in flight
    AlreadyRunning { generation: u64 },
}

#[derive(Debug)]
pub enum RunOutcome {
    Published(Arc<AnalysisSnapshot>),
    /// Nothing ran; `current` is the snapshot already published, if any
    Rejected {
        reason: Rejection,
        current: Option<Arc<AnalysisSnapshot>>,
    },
    /// A fatal stage failed. `snapshot` holds what the run gathered; it was not published.
    Aborted {
        error: PipelineError,
        snapshot: AnalysisSnapshot,
    },
    /// A newer run took over; this run's results were discarded.
    Superseded { generation: u64 },
}

struct ActiveRun {
    selection: Selection,
    generation: u64,
    state: RunState,
    cancelled: Arc<AtomicBool>,
}

#[derive(Default)]
struct RunSlot {
    last_generation: u64,
    active: Option<ActiveRun>,
}

/// Per-invocation state, owned by a single run.
struct RunContext {
    selection: Selection,
    generation: u64,
    cancelled: Arc<AtomicBool>,
    snapshot: AnalysisSnapshot,
}

impl RunContext {
    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Absorb a derived-stage failure into `stage_errors`.
    fn isolate<T>(&mut self, stage: Stage, result: RemoteResult<T>) -> Option<T> {
        debug_assert!(stage.is_isolated(), "{stage} failures are fatal");
        match result {
            Ok(value) => Some(value),
            Err(e) => {
                self.snapshot.stage_errors.insert(stage, e.to_string());
                None
            }
        }
    }
}

pub struct PipelineOrchestrator<C> {
    client: C,
    config: PipelineConfig,
    store: Arc<SnapshotStore>,
    slot: Mutex<RunSlot>,
    events: broadcast::Sender<ProgressEvent>,
}

impl<C: RemoteClient> PipelineOrchestrator<C> {
    pub fn new(client: C, config: PipelineConfig) -> Self {
        Self::with_store(client, config, Arc::new(SnapshotStore::new()))
    }

    /// Build an orchestrator publishing into a store shared with its readers.
    pub fn with_store(client: C, config: PipelineConfig, store: Arc<SnapshotStore>) -> Self {
        let (events, _) = broadcast::channel(config.event_capacity.max(1));
        let last_generation = store.current_generation();
        PipelineOrchestrator {
            client,
            config,
            store,
            slot: Mutex::new(RunSlot {
                last_generation,
                active: None,
            }),
            events,
        }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn store(&self) -> &Arc<SnapshotStore> {
        &self.store
    }

    pub fn current_snapshot(&self) -> Option<Arc<AnalysisSnapshot>> {
        self.store.current()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ProgressEvent> {
        self.events.subscribe()
    }

    /// State of the run in flight, `Idle` when there is none.
    pub fn state(&self) -> RunState {
        self.lock_slot()
            .active
            .as_ref()
            .map(|a| a.state)
            .unwrap_or(RunState::Idle)
    }

    /// Run the pipeline for `selection`.
    ///
    /// A request for a different selection than the one in flight supersedes
    /// it; a request for the same one is rejected.
    pub async fn run(&self, selection: &Selection) -> RunOutcome {
        let ctx = match self.begin(selection) {
            Ok(ctx) => ctx,
            Err(reason) => {
                debug!("Run request for {:?} rejected: {:?}", selection, reason);
                return RunOutcome::Rejected {
                    reason,
                    current: self.store.current(),
                };
            }
        };
        let generation = ctx.generation;
        let outcome = self.execute(ctx).await;
        self.finish(generation);
        outcome
    }

    fn lock_slot(&self) -> MutexGuard<'_, RunSlot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn begin(&self, selection: &Selection) -> Result<RunContext, Rejection> {
        if !selection.is_complete() {
            return Err(Rejection::SelectionIncomplete);
        }
        let mut slot = self.lock_slot();
        if let Some(active) = &slot.active {
            if active.selection == *selection {
                return Err(Rejection::AlreadyRunning {
                    generation: active.generation,
                });
            }
            info!(
                "Run generation {} for {} superseded",
                active.generation,
                active.selection.series_path()
            );
            active.cancelled.store(true, Ordering::SeqCst);
        }
        slot.last_generation += 1;
        let generation = slot.last_generation;
        let cancelled = Arc::new(AtomicBool::new(false));
        slot.active = Some(ActiveRun {
            selection: selection.clone(),
            generation,
            state: RunState::Idle,
            cancelled: Arc::clone(&cancelled),
        });
        info!(
            "Starting run generation {} for {}",
            generation,
            selection.series_path()
        );
        Ok(RunContext {
            selection: selection.clone(),
            generation,
            cancelled,
            snapshot: AnalysisSnapshot::new(selection.clone(), generation),
        })
    }

    fn finish(&self, generation: u64) {
        let mut slot = self.lock_slot();
        if slot.active.as_ref().is_some_and(|a| a.generation == generation) {
            slot.active = None;
        }
    }

    fn enter(&self, generation: u64, state: RunState) {
        if let Some(active) = self.lock_slot().active.as_mut() {
            if active.generation == generation {
                active.state = state;
            }
        }
        let _ = self.events.send(ProgressEvent::StateChanged { generation, state });
    }

    /// Issue one remote call under the stage time budget and report how it settled.
    async fn attempt<T, F>(&self, generation: u64, stage: Stage, call: F) -> RemoteResult<T>
    where
        F: Future<Output = RemoteResult<T>>,
    {
        info!("Generation {}: {} stage started", generation, stage);
        let result = tokio::time::timeout(self.config.stage_timeout, call)
            .await
            .unwrap_or(Err(RemoteError::Timeout));
        let outcome = match &result {
            Ok(_) => StageOutcome::Succeeded,
            Err(e) if stage.is_isolated() => {
                warn!("Generation {}: {} stage failed, continuing: {}", generation, stage, e);
                StageOutcome::Failed(e.to_string())
            }
            Err(e) => {
                error!("Generation {}: {} stage failed: {}", generation, stage, e);
                StageOutcome::Failed(e.to_string())
            }
        };
        let _ = self.events.send(ProgressEvent::StageSettled {
            generation,
            stage,
            outcome,
        });
        result
    }

    fn abort(&self, ctx: RunContext, error: PipelineError) -> RunOutcome {
        warn!("Generation {} aborted: {}", ctx.generation, error);
        self.enter(ctx.generation, RunState::Aborted);
        RunOutcome::Aborted {
            error,
            snapshot: ctx.snapshot,
        }
    }

    fn supersede(&self, ctx: &RunContext) -> RunOutcome {
        debug!("Generation {} discarded after cancellation", ctx.generation);
        self.enter(ctx.generation, RunState::Superseded);
        RunOutcome::Superseded {
            generation: ctx.generation,
        }
    }

    async fn execute(&self, mut ctx: RunContext) -> RunOutcome {
        let generation = ctx.generation;

        self.enter(generation, RunState::FetchingSeries);
        let path = ctx.selection.series_path();
        let result = self
            .attempt(generation, Stage::Series, self.client.fetch_raw_series(&path))
            .await;
        let raw = match result {
            Ok(raw) => raw,
            Err(e) => {
                let error = PipelineError::Fatal {
                    stage: Stage::Series,
                    message: e.to_string(),
                };
                return self.abort(ctx, error);
            }
        };
        if ctx.is_cancelled() {
            return self.supersede(&ctx);
        }
        if raw.trim().is_empty() {
            return self.abort(ctx, PipelineError::NoDataAvailable);
        }
        match SeriesParser::parse(&raw) {
            Ok(rows) => ctx.snapshot.series = rows,
            Err(e) => {
                let error = PipelineError::Fatal {
                    stage: Stage::Series,
                    message: e.to_string(),
                };
                return self.abort(ctx, error);
            }
        }
        debug!(
            "Generation {}: parsed {} series rows",
            generation,
            ctx.snapshot.series.len()
        );

        self.enter(generation, RunState::FetchingHistory);
        let result = self
            .attempt(
                generation,
                Stage::History,
                self.client.fetch_history(&ctx.selection.region),
            )
            .await;
        let history = match result {
            Ok(history) => history,
            Err(e) => {
                let error = PipelineError::Fatal {
                    stage: Stage::History,
                    message: e.to_string(),
                };
                return self.abort(ctx, error);
            }
        };
        ctx.snapshot.history = Some(history.clone());
        if ctx.is_cancelled() {
            return self.supersede(&ctx);
        }

        self.enter(generation, RunState::RunningDerivedStages);
        let result = self
            .attempt(
                generation,
                Stage::Season,
                self.client.fetch_season_analysis(&history, &raw),
            )
            .await;
        let season = ctx.isolate(Stage::Season, result);
        if ctx.is_cancelled() {
            return self.supersede(&ctx);
        }

        let result = self
            .attempt(
                generation,
                Stage::Historical,
                self.client.fetch_historical_analysis(&history, &raw),
            )
            .await;
        let historical = ctx.isolate(Stage::Historical, result);
        if ctx.is_cancelled() {
            return self.supersede(&ctx);
        }

        let result = self
            .attempt(
                generation,
                Stage::Growth,
                self.client.fetch_growth_estimate(&ctx.selection.region, &raw),
            )
            .await;
        let growth = ctx.isolate(Stage::Growth, result);
        if ctx.is_cancelled() {
            return self.supersede(&ctx);
        }

        let result = self
            .attempt(
                generation,
                Stage::Nutrient,
                self.client
                    .fetch_nutrient_profile(&ctx.selection.region, &ctx.selection.year),
            )
            .await;
        let nutrient = ctx.isolate(Stage::Nutrient, result);
        if ctx.is_cancelled() {
            return self.supersede(&ctx);
        }

        // All four upstream analyses have settled at this point.
        let request = EcologicalRequest {
            region: &ctx.selection.region,
            year: &ctx.selection.year,
            history: &history,
            series: &raw,
            season: season.as_ref(),
            historical: historical.as_ref(),
            growth: growth.as_ref(),
            nutrient: nutrient.as_ref(),
        };
        let result = self
            .attempt(
                generation,
                Stage::Ecological,
                self.client.fetch_ecological_assessment(request),
            )
            .await;
        let ecological = ctx.isolate(Stage::Ecological, result);

        ctx.snapshot.season = season;
        ctx.snapshot.historical = historical;
        ctx.snapshot.growth = growth;
        ctx.snapshot.nutrient = nutrient;
        ctx.snapshot.ecological = ecological;

        if ctx.is_cancelled() {
            return self.supersede(&ctx);
        }
        match self.store.publish(ctx.snapshot) {
            Ok(snapshot) => {
                self.enter(generation, RunState::Published);
                RunOutcome::Published(snapshot)
            }
            Err(e) => {
                debug!("Generation {}: {}", generation, e);
                self.enter(generation, RunState::Superseded);
                RunOutcome::Superseded { generation }
            }
        }
    }
}
