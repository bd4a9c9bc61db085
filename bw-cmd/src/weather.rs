//! Weather outlook for a single region.

use bw_core::client::RemoteClient;
use chrono::{Local, NaiveDate};
use log::info;

/// Print the forecast for `region` as JSON. `date` defaults to today.
pub async fn run_weather<C: RemoteClient>(
    client: &C,
    region: &str,
    date: Option<NaiveDate>,
) -> anyhow::Result<()> {
    let date = date.unwrap_or_else(|| Local::now().date_naive());
    info!("Fetching weather for {} as of {}", region, date);
    let forecast = client.fetch_weather(region, date).await?;
    println!("{}", serde_json::to_string_pretty(&forecast)?);
    Ok(())
}
