use bw_core::stage::Stage;
use serde::Serialize;

/// Lifecycle of one pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    Idle,
    FetchingSeries,
    FetchingHistory,
    RunningDerivedStages,
    Published,
    Aborted,
    /// A newer run took over; nothing from this run is published
    Superseded,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StageOutcome {
    Succeeded,
    Failed(String),
}

/// Progress notification broadcast to observers of the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ProgressEvent {
    StateChanged {
        generation: u64,
        state: RunState,
    },
    StageSettled {
        generation: u64,
        stage: Stage,
        outcome: StageOutcome,
    },
}

impl ProgressEvent {
    pub fn generation(&self) -> u64 {
        match self {
            ProgressEvent::StateChanged { generation, .. }
            | ProgressEvent::StageSettled { generation, .. } => *generation,
        }
    }
}
