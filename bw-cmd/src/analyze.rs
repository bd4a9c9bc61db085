//! Full region analysis from the command line.

use bw_core::client::RemoteClient;
use bw_core::selection::Selection;
use bw_core::snapshot::AnalysisSnapshot;
use bw_core::stage::Stage;
use bw_pipeline::config::PipelineConfig;
use bw_pipeline::orchestrator::{PipelineOrchestrator, RunOutcome};
use bw_pipeline::progress::{ProgressEvent, StageOutcome};
use log::{info, warn};
use std::path::Path;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::broadcast::Receiver;

/// Run every stage for `selection` and print the published snapshot as JSON.
///
/// Derived-stage failures are reported but do not fail the command; a fatal
/// stage failure does.
pub async fn run_analyze<C: RemoteClient>(
    client: C,
    config: PipelineConfig,
    selection: &Selection,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let orchestrator = PipelineOrchestrator::new(client, config);
    let progress = tokio::spawn(log_progress(orchestrator.subscribe()));

    info!("Analyzing {}", selection.series_path());
    let outcome = orchestrator.run(selection).await;
    drop(orchestrator);
    if let Err(e) = progress.await {
        warn!("Progress logger stopped: {}", e);
    }

    let snapshot = match outcome {
        RunOutcome::Published(snapshot) => snapshot,
        RunOutcome::Aborted { error, .. } => anyhow::bail!(error),
        RunOutcome::Rejected { reason, .. } => anyhow::bail!("run rejected: {:?}", reason),
        RunOutcome::Superseded { generation } => {
            anyhow::bail!("run superseded by generation {}", generation)
        }
    };

    info!(
        "Generation {} published with {:?}",
        snapshot.generation,
        completed_stages(&snapshot)
    );
    for (stage, message) in &snapshot.stage_errors {
        warn!("{} unavailable: {}", stage, message);
    }
    let json = render_snapshot(&snapshot)?;
    if let Some(path) = output {
        std::fs::write(path, &json)?;
        info!("Snapshot written to {}", path.display());
    }
    println!("{}", json);
    Ok(())
}

async fn log_progress(mut events: Receiver<ProgressEvent>) {
    loop {
        match events.recv().await {
            Ok(ProgressEvent::StateChanged { generation, state }) => {
                info!("[{}] {:?}", generation, state);
            }
            Ok(ProgressEvent::StageSettled {
                generation,
                stage,
                outcome,
            }) => match outcome {
                StageOutcome::Succeeded => info!("[{}] {} ok", generation, stage),
                StageOutcome::Failed(message) => {
                    warn!("[{}] {} failed: {}", generation, stage, message)
                }
            },
            Err(RecvError::Lagged(skipped)) => warn!("Missed {} progress events", skipped),
            Err(RecvError::Closed) => break,
        }
    }
}

fn render_snapshot(snapshot: &AnalysisSnapshot) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(snapshot)?)
}

/// Stages whose result made it into the snapshot, for the summary line.
fn completed_stages(snapshot: &AnalysisSnapshot) -> Vec<Stage> {
    [Stage::Series, Stage::History]
        .into_iter()
        .chain(Stage::DERIVED)
        .filter(|stage| snapshot.has(*stage))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use bw_core::series::SeriesParser;

    #[test]
    fn test_completed_stages() {
        let selection = Selection::new("India", "Kerala", "Munnar", "2024");
        let mut snapshot = AnalysisSnapshot::new(selection, 1);
        snapshot.series = SeriesParser::parse("Date,NDVI\n2024-01-05,0.31\n").unwrap();
        assert_eq!(completed_stages(&snapshot), vec![Stage::Series]);
    }

    #[test]
    fn test_render_snapshot() {
        let selection = Selection::new("India", "Kerala", "Munnar", "2024");
        let snapshot = AnalysisSnapshot::new(selection, 3);
        let json: serde_json::Value =
            serde_json::from_str(&render_snapshot(&snapshot).unwrap()).unwrap();
        assert_eq!(json["generation"], 3);
        assert_eq!(json["selection"]["region"], "Munnar");
    }
}
