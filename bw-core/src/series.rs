use crate::error::ParseError;
use bw_utils::dates::parse_series_date;
use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord, Trim};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Vegetation and climate parameters charted by default.
pub const PARAM_KEYS: [&str; 8] = ["NDVI", "RCC", "YCC", "BCC", "ExG", "PAR", "NDWI", "LST_K"];

/// Name of the date column (matched case-insensitively).
pub const DATE_COLUMN: &str = "Date";

/// Optional event annotation columns of a raw series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventTag {
    Bloom,
    Season,
}

impl EventTag {
    pub const ALL: [EventTag; 2] = [EventTag::Bloom, EventTag::Season];

    pub fn column(&self) -> &'static str {
        match self {
            EventTag::Bloom => "bloom_tag",
            EventTag::Season => "season_tag",
        }
    }
}

/// One time-stamped observation of a raw series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSeriesRow {
    pub date: NaiveDate,
    /// Numeric parameters keyed by column name
    pub values: BTreeMap<String, f64>,
    pub bloom_tag: Option<String>,
    pub season_tag: Option<String>,
}

impl RawSeriesRow {
    pub fn value(&self, key: &str) -> Option<f64> {
        self.values.get(key).copied()
    }

    pub fn tag(&self, tag: EventTag) -> Option<&str> {
        match tag {
            EventTag::Bloom => self.bloom_tag.as_deref(),
            EventTag::Season => self.season_tag.as_deref(),
        }
    }
}

enum Column {
    Date,
    Tag(EventTag),
    Param(String),
}

impl Column {
    fn classify(header: &str) -> Column {
        if header.eq_ignore_ascii_case(DATE_COLUMN) {
            return Column::Date;
        }
        EventTag::ALL
            .into_iter()
            .find(|t| header.eq_ignore_ascii_case(t.column()))
            .map(Column::Tag)
            .unwrap_or_else(|| Column::Param(header.to_string()))
    }
}

/// Parses the delimited raw series payload into rows, in file order.
pub struct SeriesParser;

impl SeriesParser {
    /// Parse a raw series body. The header row names the columns; empty lines are skipped.
    ///
    /// Numeric cells that do not parse are read as `0.0`.
    pub fn parse(raw_text: &str) -> Result<Vec<RawSeriesRow>, ParseError> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(raw_text.trim_start().as_bytes());
        let headers = rdr.headers()?.clone();
        if headers.iter().all(str::is_empty) {
            return Err(ParseError::MissingHeader);
        }
        let columns: Vec<Column> = headers.iter().map(Column::classify).collect();
        if !columns.iter().any(|c| matches!(c, Column::Date)) {
            return Err(ParseError::MissingDateColumn);
        }

        let mut rows = Vec::new();
        for record in rdr.records() {
            let record = record?;
            if is_blank(&record) {
                continue;
            }
            let line = record.position().map(|p| p.line()).unwrap_or_default();
            if record.len() != columns.len() {
                return Err(ParseError::FieldCountMismatch {
                    line,
                    expected: columns.len(),
                    found: record.len(),
                });
            }
            rows.push(Self::to_row(&columns, &record, line)?);
        }
        Ok(rows)
    }

    fn to_row(columns: &[Column], record: &StringRecord, line: u64) -> Result<RawSeriesRow, ParseError> {
        let mut date = None;
        let mut values = BTreeMap::new();
        let mut bloom_tag = None;
        let mut season_tag = None;
        for (column, cell) in columns.iter().zip(record.iter()) {
            match column {
                Column::Date => {
                    date = Some(parse_series_date(cell).ok_or_else(|| ParseError::InvalidDate {
                        line,
                        value: cell.to_string(),
                    })?);
                }
                Column::Tag(tag) => {
                    let value = (!cell.is_empty()).then(|| cell.to_string());
                    match tag {
                        EventTag::Bloom => bloom_tag = value,
                        EventTag::Season => season_tag = value,
                    }
                }
                Column::Param(name) => {
                    values.insert(name.clone(), parse_number(cell));
                }
            }
        }
        let date = date.ok_or(ParseError::MissingDateColumn)?;
        Ok(RawSeriesRow {
            date,
            values,
            bloom_tag,
            season_tag,
        })
    }
}

fn is_blank(record: &StringRecord) -> bool {
    record.len() == 1 && record.get(0).is_some_and(str::is_empty)
}

fn parse_number(ess: &str) -> f64 {
    let ess_lowered = ess.trim().to_lowercase();
    match ess_lowered.as_str() {
        "null" | "" | "n/a" | "na" => 0f64,
        s => s
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .unwrap_or_default(),
    }
}
