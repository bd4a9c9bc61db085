//! Region-analysis enrichment pipeline.
//!
//! [`orchestrator::PipelineOrchestrator`] runs the seven remote stages for a
//! selection and publishes the resulting snapshot into a
//! [`store::SnapshotStore`], which readers poll or observe through progress events.

pub mod config;
pub mod orchestrator;
pub mod progress;
pub mod store;

#[cfg(test)]
mod mock;
