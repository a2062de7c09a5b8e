//! `hunter time-range`: the cached word-graph date window and its weeks.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tabled::Tabled;

use hunter_core::{SyncSession, TimeRange, WeeklyBucket};

use crate::cli::{GlobalOpts, TimeRangeArgs};
use crate::error::CliError;
use crate::output::{self, paint};

#[derive(Tabled)]
struct BucketRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Start")]
    start: String,
    #[tabled(rename = "End")]
    end: String,
    #[tabled(rename = "Label")]
    label: String,
}

impl From<(usize, &WeeklyBucket)> for BucketRow {
    fn from((i, w): (usize, &WeeklyBucket)) -> Self {
        Self {
            index: i + 1,
            start: w.start_date.to_string(),
            end: w.end_date.to_string(),
            label: w.label.clone(),
        }
    }
}

#[derive(Serialize)]
struct TimeRangeReport {
    #[serde(flatten)]
    range: TimeRange,
    fetched_at: Option<DateTime<Utc>>,
    weeks: Vec<WeeklyBucket>,
}

pub async fn handle(
    args: &TimeRangeArgs,
    session: &SyncSession,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let store = session.time_range();
    let range = store
        .get_or_fetch(args.refresh)
        .await
        .map_err(|e| CliError::from_request(e, session.api().endpoints().api_base().as_str()))?;

    let report = TimeRangeReport {
        range,
        fetched_at: i64::try_from(store.fetched_at())
            .ok()
            .and_then(DateTime::from_timestamp_millis),
        weeks: store.weekly_buckets().collect(),
    };

    let color = output::should_color(global.color);
    let out = output::render_single(global.output, &report, |r| render_summary(r, color))?;
    output::print_output(&out);
    Ok(())
}

fn render_summary(report: &TimeRangeReport, color: bool) -> String {
    let Some((start, end)) = report.range.bounds() else {
        return paint(
            "Time range unavailable: the backend returned incomplete dates",
            color,
            output::yellow,
        );
    };

    let header = format!(
        "{} {start} ~ {end}  {}",
        paint("Time range:", color, output::green),
        paint(&format!("({} weeks)", report.weeks.len()), color, output::dim),
    );
    let rows: Vec<BucketRow> = report.weeks.iter().enumerate().map(BucketRow::from).collect();
    format!("{header}\n{}", output::render_table(&rows))
}
