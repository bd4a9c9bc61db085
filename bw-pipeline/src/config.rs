use std::time::Duration;

/// Default time budget of a single remote call.
pub const DEFAULT_STAGE_TIMEOUT: Duration = Duration::from_secs(60);

/// Default number of progress events buffered per subscriber.
pub const DEFAULT_EVENT_CAPACITY: usize = 64;

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// A call that has not settled after this long fails as a timeout
    pub stage_timeout: Duration,
    pub event_capacity: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            stage_timeout: DEFAULT_STAGE_TIMEOUT,
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

impl PipelineConfig {
    pub fn with_stage_timeout(mut self, stage_timeout: Duration) -> Self {
        self.stage_timeout = stage_timeout;
        self
    }
}
