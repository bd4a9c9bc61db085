//! Request bodies of the derived-analysis endpoints.
//!
//! Every analysis endpoint takes a single text `prompt`; these functions
//! assemble it from the upstream context of a run.

use crate::client::EcologicalRequest;
use crate::payload::HistoryRecord;
use bw_utils::dates::format_date;
use chrono::NaiveDate;
use serde_json::{json, Value};

/// Prompt shared by the season and historical analyses: history then series.
pub fn history_series_prompt(history: &HistoryRecord, series: &str) -> String {
    let mut prompt = history.serialized();
    prompt.push_str(series);
    prompt
}

pub fn growth_prompt(region: &str, series: &str) -> String {
    format!("{region}{series}")
}

pub fn nutrient_prompt(region: &str, year: &str) -> String {
    json!({ "location": region, "year": year }).to_string()
}

pub fn ecological_prompt(request: &EcologicalRequest<'_>) -> String {
    fn or_null<T: serde::Serialize>(payload: Option<&T>) -> Value {
        payload
            .and_then(|p| serde_json::to_value(p).ok())
            .unwrap_or(Value::Null)
    }
    json!({
        "region": request.region,
        "year": request.year,
        "History": request.history.serialized(),
        "csv_data": request.series,
        "Season_Analysis": or_null(request.season),
        "Historical_Analysis": or_null(request.historical),
        "Year_estimation": or_null(request.growth),
        "Nutrient_Analysis": or_null(request.nutrient),
    })
    .to_string()
}

pub fn weather_prompt(region: &str, date: &NaiveDate) -> String {
    json!({ "region": region, "current_date": format_date(date) }).to_string()
}
