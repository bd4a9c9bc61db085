use crate::contents::Contents;
use crate::error::RemoteResult;
use crate::payload::{
    EcologicalAssessment, GrowthEstimate, HistoricalAnalysis, HistoryRecord, NutrientProfile,
    SeasonAnalysis, WeatherForecast,
};
use async_trait::async_trait;
use chrono::NaiveDate;

/// Context of the ecological assessment request.
///
/// Analyses that did not succeed are `None` and still sent, so the request
/// keeps one shape whatever the upstream outcome.
#[derive(Debug, Clone, Copy)]
pub struct EcologicalRequest<'a> {
    pub region: &'a str,
    pub year: &'a str,
    pub history: &'a HistoryRecord,
    pub series: &'a str,
    pub season: Option<&'a SeasonAnalysis>,
    pub historical: Option<&'a HistoricalAnalysis>,
    pub growth: Option<&'a GrowthEstimate>,
    pub nutrient: Option<&'a NutrientProfile>,
}

/// Transport to the remote analytics service.
///
/// Each call is a single request/response with no retry; the caller decides
/// what a failure means. Implemented by `HttpClient` (feature `api`) and by
/// scripted clients in tests.
#[async_trait]
pub trait RemoteClient: Send + Sync {
    async fn fetch_contents(&self) -> RemoteResult<Contents>;

    /// Raw series body for `{year}/{country}/{county}/{region}`. An empty body means no data.
    async fn fetch_raw_series(&self, path: &str) -> RemoteResult<String>;

    async fn fetch_history(&self, region: &str) -> RemoteResult<HistoryRecord>;

    async fn fetch_season_analysis(
        &self,
        history: &HistoryRecord,
        series: &str,
    ) -> RemoteResult<SeasonAnalysis>;

    async fn fetch_historical_analysis(
        &self,
        history: &HistoryRecord,
        series: &str,
    ) -> RemoteResult<HistoricalAnalysis>;

    async fn fetch_growth_estimate(&self, region: &str, series: &str)
        -> RemoteResult<GrowthEstimate>;

    async fn fetch_nutrient_profile(&self, region: &str, year: &str)
        -> RemoteResult<NutrientProfile>;

    async fn fetch_ecological_assessment(
        &self,
        request: EcologicalRequest<'_>,
    ) -> RemoteResult<EcologicalAssessment>;

    /// Forecast for `region` as seen from `date`. Not part of a pipeline run.
    async fn fetch_weather(&self, region: &str, date: NaiveDate) -> RemoteResult<WeatherForecast>;
}
