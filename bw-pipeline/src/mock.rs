//! Scripted in-memory [`RemoteClient`] for orchestrator tests.

use async_trait::async_trait;
use bw_core::client::{EcologicalRequest, RemoteClient};
use bw_core::contents::Contents;
use bw_core::error::{RemoteError, RemoteResult};
use bw_core::payload::{
    EcologicalAssessment, GrowthEstimate, HistoricalAnalysis, HistoryRecord, NutrientProfile,
    SeasonAnalysis, WeatherForecast,
};
use bw_core::prompt;
use bw_core::selection::Selection;
use bw_core::stage::Stage;
use chrono::NaiveDate;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

pub const SAMPLE_SERIES: &str = include_str!("../../fixtures/sample_series.csv");
pub const SAMPLE_HISTORY: &str = include_str!("../../fixtures/sample_history.json");

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Started { stage: Stage, seq: u64 },
    Settled { stage: Stage, seq: u64 },
}

#[derive(Default)]
pub struct ScriptedClient {
    failures: HashMap<Stage, RemoteError>,
    delays: HashMap<Stage, Duration>,
    series_bodies: HashMap<String, String>,
    series_delays: HashMap<String, Duration>,
    seq: AtomicU64,
    calls: Mutex<Vec<Call>>,
    series_paths: Mutex<Vec<String>>,
    ecological_prompt: Mutex<Option<String>>,
}

impl ScriptedClient {
    /// Every stage answers immediately with fixture data.
    pub fn healthy() -> Self {
        Self::default()
    }

    pub fn failing(mut self, stage: Stage, error: RemoteError) -> Self {
        self.failures.insert(stage, error);
        self
    }

    pub fn delayed(mut self, stage: Stage, delay: Duration) -> Self {
        self.delays.insert(stage, delay);
        self
    }

    pub fn with_series(mut self, selection: &Selection, body: &str) -> Self {
        self.series_bodies
            .insert(selection.series_path(), body.to_string());
        self
    }

    pub fn with_series_delay(mut self, selection: &Selection, delay: Duration) -> Self {
        self.series_delays.insert(selection.series_path(), delay);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn started_order(&self) -> Vec<Stage> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Started { stage, .. } => Some(stage),
                Call::Settled { .. } => None,
            })
            .collect()
    }

    pub fn series_paths(&self) -> Vec<String> {
        self.series_paths.lock().unwrap().clone()
    }

    pub fn ecological_prompt(&self) -> Option<Value> {
        self.ecological_prompt
            .lock()
            .unwrap()
            .as_deref()
            .map(|p| serde_json::from_str(p).unwrap())
    }

    fn log(&self, call: impl FnOnce(u64) -> Call) {
        let seq = self.seq.fetch_add(1, Ordering::SeqCst);
        self.calls.lock().unwrap().push(call(seq));
    }

    async fn respond<T>(&self, stage: Stage, delay: Option<Duration>, value: T) -> RemoteResult<T> {
        self.log(|seq| Call::Started { stage, seq });
        let delay = delay.or_else(|| self.delays.get(&stage).copied());
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let result = match self.failures.get(&stage) {
            Some(error) => Err(error.clone()),
            None => Ok(value),
        };
        self.log(|seq| Call::Settled { stage, seq });
        result
    }
}

#[async_trait]
impl RemoteClient for ScriptedClient {
    async fn fetch_contents(&self) -> RemoteResult<Contents> {
        Ok(Contents::default())
    }

    async fn fetch_raw_series(&self, path: &str) -> RemoteResult<String> {
        self.series_paths.lock().unwrap().push(path.to_string());
        let body = self
            .series_bodies
            .get(path)
            .cloned()
            .unwrap_or_else(|| SAMPLE_SERIES.to_string());
        let delay = self.series_delays.get(path).copied();
        self.respond(Stage::Series, delay, body).await
    }

    async fn fetch_history(&self, _region: &str) -> RemoteResult<HistoryRecord> {
        let history = HistoryRecord(serde_json::from_str(SAMPLE_HISTORY).unwrap());
        self.respond(Stage::History, None, history).await
    }

    async fn fetch_season_analysis(
        &self,
        _history: &HistoryRecord,
        _series: &str,
    ) -> RemoteResult<SeasonAnalysis> {
        let season = SeasonAnalysis(json!({"BOS": {"date": "01-07"}, "Length_of_Bloom": {"days": 46}}));
        self.respond(Stage::Season, None, season).await
    }

    async fn fetch_historical_analysis(
        &self,
        _history: &HistoryRecord,
        _series: &str,
    ) -> RemoteResult<HistoricalAnalysis> {
        let historical = HistoricalAnalysis(json!({"Average_Bloom_Length": {"days": 44}}));
        self.respond(Stage::Historical, None, historical).await
    }

    async fn fetch_growth_estimate(
        &self,
        _region: &str,
        _series: &str,
    ) -> RemoteResult<GrowthEstimate> {
        let growth = GrowthEstimate(json!({"vegetation_growth_percentage": 12.5}));
        self.respond(Stage::Growth, None, growth).await
    }

    async fn fetch_nutrient_profile(
        &self,
        region: &str,
        year: &str,
    ) -> RemoteResult<NutrientProfile> {
        let nutrient = NutrientProfile(json!({"location": region, "year": year, "nitrogen": "medium"}));
        self.respond(Stage::Nutrient, None, nutrient).await
    }

    async fn fetch_ecological_assessment(
        &self,
        request: EcologicalRequest<'_>,
    ) -> RemoteResult<EcologicalAssessment> {
        *self.ecological_prompt.lock().unwrap() = Some(prompt::ecological_prompt(&request));
        let ecological = EcologicalAssessment(json!({"invasive_risk": "low"}));
        self.respond(Stage::Ecological, None, ecological).await
    }

    async fn fetch_weather(&self, region: &str, date: NaiveDate) -> RemoteResult<WeatherForecast> {
        Ok(WeatherForecast(json!({"region": region, "date": date})))
    }
}
