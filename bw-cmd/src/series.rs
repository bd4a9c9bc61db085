//! Fetch one raw series and print it as a chart-ready table.

use bw_core::client::RemoteClient;
use bw_core::selection::Selection;
use bw_core::series::{EventTag, RawSeriesRow, SeriesParser, PARAM_KEYS};
use bw_data::events::event_markers;
use bw_data::normalization::normalize;
use bw_utils::dates::{axis_label, format_date};
use log::info;

pub async fn run_series<C: RemoteClient>(
    client: &C,
    selection: &Selection,
    raw: bool,
) -> anyhow::Result<()> {
    let path = selection.series_path();
    info!("Fetching series {}", path);
    let body = client.fetch_raw_series(&path).await?;
    let rows = series_rows(&path, &body)?;
    info!("Parsed {} rows", rows.len());

    for tag in EventTag::ALL {
        for marker in event_markers(&rows, tag) {
            info!("{} {} on {}", tag.column(), marker.label, format_date(&marker.date));
        }
    }

    let rows = if raw { rows } else { normalize(&rows, &PARAM_KEYS) };
    print!("{}", series_table(&rows)?);
    Ok(())
}

/// Parse a fetched body; an empty body or a header without rows means no data.
fn series_rows(path: &str, body: &str) -> anyhow::Result<Vec<RawSeriesRow>> {
    if body.trim().is_empty() {
        anyhow::bail!("no data available for {}", path);
    }
    let rows = SeriesParser::parse(body)?;
    if rows.is_empty() {
        anyhow::bail!("no data available for {}", path);
    }
    Ok(rows)
}

/// CSV with an axis-label column in front of the parameter and tag columns.
fn series_table(rows: &[RawSeriesRow]) -> anyhow::Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    let mut header = vec!["Date", "Label"];
    header.extend(PARAM_KEYS);
    header.extend(EventTag::ALL.iter().map(|t| t.column()));
    writer.write_record(&header)?;

    for row in rows {
        let mut record = vec![format_date(&row.date), axis_label(&row.date)];
        record.extend(
            PARAM_KEYS
                .iter()
                .map(|key| row.value(key).map(|v| format!("{:.2}", v)).unwrap_or_default()),
        );
        record.extend(
            EventTag::ALL
                .iter()
                .map(|tag| row.tag(*tag).unwrap_or_default().to_string()),
        );
        writer.write_record(&record)?;
    }
    let bytes = writer.into_inner().map_err(|e| anyhow::anyhow!("{}", e))?;
    Ok(String::from_utf8(bytes)?)
}
