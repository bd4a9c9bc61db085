//! HTTP implementation of [`RemoteClient`] over the bloomwatch analytics service.

use crate::client::{EcologicalRequest, RemoteClient};
use crate::contents::Contents;
use crate::error::{RemoteError, RemoteResult};
use crate::payload::{
    EcologicalAssessment, GrowthEstimate, HistoricalAnalysis, HistoryRecord, NutrientProfile,
    SeasonAnalysis, WeatherForecast,
};
use crate::prompt;
use async_trait::async_trait;
use chrono::NaiveDate;
use log::{debug, warn};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Public deployment of the analytics service.
pub const DEFAULT_BASE_URL: &str = "https://victowolf-bloomwatch.hf.space";

/// Raw series files are stored as CSV under their selection path.
pub const SERIES_FILE_EXTENSION: &str = ".csv";

/// Connection settings for [`HttpClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub request_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(60),
        }
    }
}

impl From<reqwest::Error> for RemoteError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            RemoteError::Timeout
        } else if e.is_decode() {
            RemoteError::Decode(e.to_string())
        } else if let Some(status) = e.status() {
            RemoteError::Status(status.as_u16())
        } else {
            RemoteError::Transport(e.to_string())
        }
    }
}

pub struct HttpClient {
    client: Client,
    base_url: String,
}

impl HttpClient {
    pub fn new(config: &ClientConfig) -> RemoteResult<Self> {
        let client = Client::builder().timeout(config.request_timeout).build()?;
        Ok(HttpClient {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint)
    }

    async fn get(&self, endpoint: &str, query: &[(&str, &str)]) -> RemoteResult<Response> {
        let url = self.url(endpoint);
        debug!("GET {} {:?}", url, query);
        let response = self.client.get(&url).query(query).send().await?;
        check_status(endpoint, response)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&str, &str)],
    ) -> RemoteResult<T> {
        Ok(self.get(endpoint, query).await?.json::<T>().await?)
    }

    async fn post_prompt<T: DeserializeOwned>(&self, endpoint: &str, prompt: String) -> RemoteResult<T> {
        let url = self.url(endpoint);
        debug!("POST {} ({} byte prompt)", url, prompt.len());
        let response = self
            .client
            .post(&url)
            .form(&[("prompt", prompt)])
            .send()
            .await?;
        Ok(check_status(endpoint, response)?.json::<T>().await?)
    }
}

fn check_status(endpoint: &str, response: Response) -> RemoteResult<Response> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        warn!("Bad response status for {}: {}", endpoint, status);
        Err(RemoteError::Status(status.as_u16()))
    }
}

#[async_trait]
impl RemoteClient for HttpClient {
    async fn fetch_contents(&self) -> RemoteResult<Contents> {
        self.get_json("contents", &[]).await
    }

    async fn fetch_raw_series(&self, path: &str) -> RemoteResult<String> {
        let file_path = format!("{path}{SERIES_FILE_EXTENSION}");
        let response = self.get("read", &[("file_path", file_path.as_str())]).await?;
        Ok(response.text().await?)
    }

    async fn fetch_history(&self, region: &str) -> RemoteResult<HistoryRecord> {
        self.get_json("history", &[("region", region)]).await
    }

    async fn fetch_season_analysis(
        &self,
        history: &HistoryRecord,
        series: &str,
    ) -> RemoteResult<SeasonAnalysis> {
        self.post_prompt("seasonA", prompt::history_series_prompt(history, series))
            .await
    }

    async fn fetch_historical_analysis(
        &self,
        history: &HistoryRecord,
        series: &str,
    ) -> RemoteResult<HistoricalAnalysis> {
        self.post_prompt("historicalA", prompt::history_series_prompt(history, series))
            .await
    }

    async fn fetch_growth_estimate(
        &self,
        region: &str,
        series: &str,
    ) -> RemoteResult<GrowthEstimate> {
        self.post_prompt("estimation", prompt::growth_prompt(region, series))
            .await
    }

    async fn fetch_nutrient_profile(
        &self,
        region: &str,
        year: &str,
    ) -> RemoteResult<NutrientProfile> {
        self.post_prompt("nutrientA", prompt::nutrient_prompt(region, year))
            .await
    }

    async fn fetch_ecological_assessment(
        &self,
        request: EcologicalRequest<'_>,
    ) -> RemoteResult<EcologicalAssessment> {
        self.post_prompt("ecologicalA", prompt::ecological_prompt(&request))
            .await
    }

    async fn fetch_weather(&self, region: &str, date: NaiveDate) -> RemoteResult<WeatherForecast> {
        self.post_prompt("weather", prompt::weather_prompt(region, &date))
            .await
    }
}
